#![deny(missing_docs)]
//! blogmark enhancement pipeline: embeds, document tree, enrichment passes and outline.

/// Arena document tree and attribute vocabulary.
pub mod document;
/// Enrichment passes over the document tree.
pub mod enrich;
/// Pipeline configuration.
pub mod options;
/// Outline extraction from rendered HTML.
pub mod outline;
/// Pipeline orchestration and the degradation ladder.
pub mod pipeline;
/// Markdown AST to document tree, document tree to HTML.
pub mod renderer;
/// Markdown AST transforms (embed syntaxes).
pub mod transform;

pub use document::{AttrKey, Attributes, DataAttr, Document, DocumentError, NodeId, NodeKind};
pub use enrich::{
    DiagramPlaceholders, EnrichError, EnrichmentPass, HeadingAnchors, HeadingIds, ImageHandler,
    ImageSource, classify_image_source,
};
pub use options::Options;
pub use outline::{HeadingRecord, extract_headings};
pub use pipeline::{
    EnhancedPost, Pipeline, PostMeta, RenderMode, RenderedContent, enhance_post, error_block,
    render_markdown,
};
pub use renderer::{mdast_to_document, to_html};
pub use transform::{AsciinemaConfig, AsciinemaTransform, EmbedError};
