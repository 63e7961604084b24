use super::{EnrichError, EnrichmentPass, NodeVisitor, Visit, walk};
use crate::document::{AttrKey, Attributes, DataAttr, Document, NodeId, NodeKind};
use blogmark_core::RenderDiagnostics;

/// Code-block language rendered as a diagram.
pub const DIAGRAM_LANGUAGE: &str = "mermaid";

const LOADING_TEXT: &str = "Loading diagram...";

/// Replaces `pre > code.language-mermaid` blocks with a placeholder that a
/// client-side renderer picks up from `data-mermaid`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiagramPlaceholders;

struct PlaceholderBuilder;

/// Diagram source of a `pre` element, if its first child is a diagram `code` block.
fn diagram_source(doc: &Document, pre: NodeId) -> Option<String> {
    let code = *doc.children(pre).first()?;
    let element = doc.as_element(code)?;
    if element.tag != "code" {
        return None;
    }
    let language_class = format!("language-{}", DIAGRAM_LANGUAGE);
    let is_diagram = element
        .attrs
        .classes()
        .any(|class| class == language_class || class == DIAGRAM_LANGUAGE);
    if !is_diagram {
        return None;
    }
    match doc.children(code).first().and_then(|id| doc.node(*id)) {
        Some(node) => match &node.kind {
            NodeKind::Text(text) => Some(text.clone()),
            _ => None,
        },
        // An empty fence still gets a placeholder.
        None => Some(String::new()),
    }
}

impl NodeVisitor for PlaceholderBuilder {
    fn visit(
        &mut self,
        doc: &mut Document,
        id: NodeId,
        _diagnostics: &mut RenderDiagnostics,
    ) -> Result<Visit, EnrichError> {
        if !doc.as_element(id).is_some_and(|el| el.tag == "pre") {
            return Ok(Visit::Continue);
        }
        let Some(source) = diagram_source(doc, id) else {
            return Ok(Visit::Skip);
        };

        let loading_text = doc.text(LOADING_TEXT);
        let loading = doc.element(
            "pre",
            Attributes::new().with(AttrKey::Class, "mermaid-loading"),
        );
        doc.append(loading, loading_text)?;
        let placeholder = doc.element(
            "div",
            Attributes::new()
                .with(AttrKey::Class, "mermaid-placeholder")
                .with(AttrKey::Data(DataAttr::Mermaid), source),
        );
        doc.append(placeholder, loading)?;
        Ok(Visit::Replace(placeholder))
    }
}

impl EnrichmentPass for DiagramPlaceholders {
    fn name(&self) -> &'static str {
        "diagrams"
    }

    fn apply(
        &self,
        mut doc: Document,
        diagnostics: &mut RenderDiagnostics,
    ) -> Result<Document, EnrichError> {
        walk(&mut doc, self.name(), &mut PlaceholderBuilder, diagnostics)?;
        Ok(doc)
    }
}
