//! Markdown AST to document tree, and document tree to HTML.

mod convert;
pub mod serialize;

pub use convert::mdast_to_document;
pub use serialize::{start_tag, to_html};
