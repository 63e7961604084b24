//! Document-tree enrichment passes.
//!
//! Each pass consumes the tree and hands back the rewritten tree. A failure
//! on one node is logged, recorded as a diagnostic and skipped; only
//! structural damage (a dangling id) fails the whole pass.

mod autolink;
mod diagrams;
mod heading_ids;
mod images;

pub use autolink::HeadingAnchors;
pub use diagrams::{DIAGRAM_LANGUAGE, DiagramPlaceholders};
pub use heading_ids::HeadingIds;
pub use images::{ImageHandler, ImageSource, MISSING_IMAGE_PLACEHOLDER, classify_image_source};

use crate::document::{Document, DocumentError, NodeId};
use blogmark_core::{BlogmarkError, RenderDiagnostics};
use thiserror::Error;

/// Errors raised while enriching a document tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnrichError {
    /// The arena is inconsistent.
    #[error(transparent)]
    Document(#[from] DocumentError),
    /// A node that must be an element was something else.
    #[error("expected an element at node {0}")]
    ElementExpected(NodeId),
    /// A pass-specific failure.
    #[error("{pass}: {message}")]
    Pass {
        /// Pass name.
        pass: &'static str,
        /// What went wrong.
        message: String,
    },
}

impl From<EnrichError> for BlogmarkError {
    fn from(err: EnrichError) -> Self {
        BlogmarkError::render_error(err.to_string())
    }
}

/// A rewrite over the whole document tree.
pub trait EnrichmentPass: Send + Sync {
    /// Short name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Rewrites the tree.
    fn apply(
        &self,
        doc: Document,
        diagnostics: &mut RenderDiagnostics,
    ) -> Result<Document, EnrichError>;
}

/// What the walker does after visiting a node.
pub(crate) enum Visit {
    /// Descend into the node's children.
    Continue,
    /// Leave the subtree alone.
    Skip,
    /// Swap the node for another (already allocated) node.
    Replace(NodeId),
}

/// Per-node callback driven by [`walk`].
pub(crate) trait NodeVisitor {
    fn visit(
        &mut self,
        doc: &mut Document,
        id: NodeId,
        diagnostics: &mut RenderDiagnostics,
    ) -> Result<Visit, EnrichError>;

    /// Called after `visit` failed on `id`; the node stays in place.
    fn recover(&mut self, _doc: &mut Document, _id: NodeId, _error: &EnrichError) {}
}

/// Pre-order walk below the root.
pub(crate) fn walk<V: NodeVisitor>(
    doc: &mut Document,
    pass: &'static str,
    visitor: &mut V,
    diagnostics: &mut RenderDiagnostics,
) -> Result<(), EnrichError> {
    let root = doc.root();
    walk_children(doc, root, pass, visitor, diagnostics)
}

fn walk_children<V: NodeVisitor>(
    doc: &mut Document,
    parent: NodeId,
    pass: &'static str,
    visitor: &mut V,
    diagnostics: &mut RenderDiagnostics,
) -> Result<(), EnrichError> {
    let children = doc.get(parent)?.children.clone();
    for (index, child) in children.into_iter().enumerate() {
        doc.get(child)?;
        match visitor.visit(doc, child, diagnostics) {
            Ok(Visit::Continue) => walk_children(doc, child, pass, visitor, diagnostics)?,
            Ok(Visit::Skip) => {}
            Ok(Visit::Replace(replacement)) => doc.replace_child(parent, index, replacement)?,
            Err(err) => {
                log::error!("Error in {} at node {}: {}", pass, child, err);
                diagnostics.add_error_in(pass, err.to_string());
                visitor.recover(doc, child, &err);
            }
        }
    }
    Ok(())
}

/// Runs `passes` in order.
pub fn run_passes(
    passes: &[Box<dyn EnrichmentPass>],
    mut doc: Document,
    diagnostics: &mut RenderDiagnostics,
) -> Result<Document, EnrichError> {
    for pass in passes {
        log::debug!("Running enrichment pass {}", pass.name());
        doc = pass.apply(doc, diagnostics)?;
    }
    Ok(doc)
}
