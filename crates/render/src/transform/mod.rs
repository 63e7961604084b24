//! Markdown AST transforms run before conversion.
//!
//! - `asciinema`: terminal-recording blocks and shortcodes become embed markers.

/// Terminal-recording embed preprocessor.
pub mod asciinema;

pub use asciinema::{AsciinemaConfig, AsciinemaTransform, EmbedError};
