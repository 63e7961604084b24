use super::{EnrichError, EnrichmentPass, NodeVisitor, Visit, walk};
use crate::document::{AttrKey, Attributes, Document, NodeId, NodeKind};
use blogmark_core::RenderDiagnostics;

/// Wraps the content of every heading that has an `id` in a self-link.
///
/// Headings without an id, or that already contain a link, are left alone.
#[derive(Debug, Clone)]
pub struct HeadingAnchors {
    class: String,
}

impl HeadingAnchors {
    /// Anchors carry `class` (the default pipeline uses `"anchor"`).
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
        }
    }
}

impl Default for HeadingAnchors {
    fn default() -> Self {
        Self::new("anchor")
    }
}

struct AnchorWrapper<'a> {
    class: &'a str,
}

impl NodeVisitor for AnchorWrapper<'_> {
    fn visit(
        &mut self,
        doc: &mut Document,
        id: NodeId,
        _diagnostics: &mut RenderDiagnostics,
    ) -> Result<Visit, EnrichError> {
        let Some(element) = doc.as_element(id) else {
            return Ok(Visit::Continue);
        };
        if !element.is_heading() {
            return Ok(Visit::Continue);
        }
        let Some(heading_id) = element.attrs.get(&AttrKey::Id).map(str::to_string) else {
            return Ok(Visit::Skip);
        };
        let contains_link = doc.any_descendant(id, &|node| {
            matches!(&node.kind, NodeKind::Element(el) if el.tag == "a")
        });
        if contains_link {
            log::debug!("Heading #{} already contains a link, not wrapping", heading_id);
            return Ok(Visit::Skip);
        }

        let mut attrs = Attributes::new().with(AttrKey::Href, format!("#{}", heading_id));
        if !self.class.is_empty() {
            attrs.set(AttrKey::Class, self.class);
        }
        let anchor = doc.element("a", attrs);
        let content = doc.children(id).to_vec();
        doc.set_children(anchor, content)?;
        doc.set_children(id, vec![anchor])?;
        Ok(Visit::Skip)
    }
}

impl EnrichmentPass for HeadingAnchors {
    fn name(&self) -> &'static str {
        "heading-anchors"
    }

    fn apply(
        &self,
        mut doc: Document,
        diagnostics: &mut RenderDiagnostics,
    ) -> Result<Document, EnrichError> {
        let mut wrapper = AnchorWrapper { class: &self.class };
        walk(&mut doc, self.name(), &mut wrapper, diagnostics)?;
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::HeadingIds;
    use crate::renderer::{mdast_to_document, to_html};
    use blogmark_core::{ParseOptions, parse_mdast};

    fn apply(input: &str) -> String {
        let root = parse_mdast(input, &ParseOptions::default()).unwrap();
        let mut diagnostics = RenderDiagnostics::new();
        let doc = HeadingIds
            .apply(mdast_to_document(&root), &mut diagnostics)
            .unwrap();
        let doc = HeadingAnchors::default().apply(doc, &mut diagnostics).unwrap();
        to_html(&doc)
    }

    #[test]
    fn wraps_heading_content() {
        assert_eq!(
            apply("## Install *now*"),
            "<h2 id=\"install-now\"><a href=\"#install-now\" class=\"anchor\">Install <em>now</em></a></h2>"
        );
    }

    #[test]
    fn headings_with_links_are_not_nested() {
        assert_eq!(
            apply("## See [docs](https://example.com)"),
            "<h2 id=\"see-docs\">See <a href=\"https://example.com\">docs</a></h2>"
        );
    }

    #[test]
    fn headings_without_ids_are_skipped() {
        let root = parse_mdast("## Plain", &ParseOptions::default()).unwrap();
        let doc = HeadingAnchors::default()
            .apply(mdast_to_document(&root), &mut RenderDiagnostics::new())
            .unwrap();
        assert_eq!(to_html(&doc), "<h2>Plain</h2>");
    }

    #[test]
    fn custom_class() {
        let root = parse_mdast("# T", &ParseOptions::default()).unwrap();
        let mut diagnostics = RenderDiagnostics::new();
        let doc = HeadingIds
            .apply(mdast_to_document(&root), &mut diagnostics)
            .unwrap();
        let doc = HeadingAnchors::new("heading-link")
            .apply(doc, &mut diagnostics)
            .unwrap();
        assert!(to_html(&doc).contains("class=\"heading-link\""));
    }
}
