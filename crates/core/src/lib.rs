#![deny(missing_docs)]
//! blogmark core: markdown parsing, front-matter extraction, slugs and reading time.

/// Core error and diagnostic types.
pub mod error;
/// YAML frontmatter extraction helpers.
pub mod frontmatter;
/// Markdown parsing utilities and extension hooks.
pub mod parse;
/// Reading-time estimation.
pub mod reading_time;
/// Slug and heading-id generation.
pub mod slug;

pub use error::{
    BlogmarkError, ErrorSeverity, RecoverableError, RenderDiagnostics, RenderWarning,
    SourceLocation,
};
pub use frontmatter::{
    FrontMatter, FrontmatterError, FrontmatterExtraction, SplitDocument, extract_frontmatter,
    split_document,
};
pub use parse::{
    AstTransform, ParseOptions, ParserPipeline, parse_mdast, parse_mdast_with_options,
    to_basic_html,
};
pub use reading_time::{ReadingTimeResult, WORDS_PER_MINUTE, estimate};
pub use slug::{FALLBACK_HEADING_ID, Slugger, heading_id, slugify};
