use super::{EnrichError, EnrichmentPass, NodeVisitor, Visit, walk};
use crate::document::{AttrKey, Document, NodeId};
use blogmark_core::{RenderDiagnostics, Slugger};

/// Gives every heading without an `id` a unique slug of its text.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadingIds;

struct IdAssigner {
    slugger: Slugger,
}

impl NodeVisitor for IdAssigner {
    fn visit(
        &mut self,
        doc: &mut Document,
        id: NodeId,
        _diagnostics: &mut RenderDiagnostics,
    ) -> Result<Visit, EnrichError> {
        if !doc.as_element(id).is_some_and(|el| el.is_heading()) {
            return Ok(Visit::Continue);
        }

        let text = doc.text_content(id);
        let element = doc.as_element_mut(id).ok_or(EnrichError::ElementExpected(id))?;
        match element.attrs.get(&AttrKey::Id) {
            Some(existing) if !existing.is_empty() => self.slugger.reserve(existing),
            _ => {
                let slug = self.slugger.next_id(&text);
                element.attrs.set(AttrKey::Id, slug);
            }
        }
        Ok(Visit::Skip)
    }
}

impl EnrichmentPass for HeadingIds {
    fn name(&self) -> &'static str {
        "heading-ids"
    }

    fn apply(
        &self,
        mut doc: Document,
        diagnostics: &mut RenderDiagnostics,
    ) -> Result<Document, EnrichError> {
        let mut assigner = IdAssigner {
            slugger: Slugger::new(),
        };
        walk(&mut doc, self.name(), &mut assigner, diagnostics)?;
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{mdast_to_document, to_html};
    use blogmark_core::{ParseOptions, parse_mdast};

    fn apply(input: &str) -> String {
        let root = parse_mdast(input, &ParseOptions::default()).unwrap();
        let doc = HeadingIds
            .apply(mdast_to_document(&root), &mut RenderDiagnostics::new())
            .unwrap();
        to_html(&doc)
    }

    #[test]
    fn ids_are_slugs() {
        assert_eq!(
            apply("## Getting Started"),
            "<h2 id=\"getting-started\">Getting Started</h2>"
        );
    }

    #[test]
    fn duplicates_are_suffixed_across_levels() {
        let html = apply("# Setup\n\n## Setup\n\n### Setup");
        assert!(html.contains("<h1 id=\"setup\">"));
        assert!(html.contains("<h2 id=\"setup-2\">"));
        assert!(html.contains("<h3 id=\"setup-3\">"));
    }

    #[test]
    fn inline_markup_contributes_text() {
        assert_eq!(
            apply("## Using `cargo` *fast*"),
            "<h2 id=\"using-cargo-fast\">Using <code>cargo</code> <em>fast</em></h2>"
        );
    }

    #[test]
    fn empty_slug_falls_back() {
        assert!(apply("## ???").contains("id=\"heading\""));
    }

    #[test]
    fn existing_ids_are_kept_and_reserved() {
        let mut doc = Document::new();
        let root = doc.root();
        let first = doc.element(
            "h2",
            crate::document::Attributes::new().with(AttrKey::Id, "intro"),
        );
        let second = doc.element("h2", crate::document::Attributes::new());
        let text = doc.text("Intro");
        doc.append(second, text).unwrap();
        doc.set_children(root, vec![first, second]).unwrap();

        let doc = HeadingIds.apply(doc, &mut RenderDiagnostics::new()).unwrap();
        assert_eq!(doc.as_element(first).unwrap().attrs.get(&AttrKey::Id), Some("intro"));
        assert_eq!(doc.as_element(second).unwrap().attrs.get(&AttrKey::Id), Some("intro-2"));
    }
}
