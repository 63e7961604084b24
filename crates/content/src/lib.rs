#![deny(missing_docs)]
//! blogmark content: post storage, listing, slugs and batch rendering.

/// Parallel batch rendering.
pub mod batch;
/// Store configuration.
pub mod config;
/// Content errors.
pub mod error;
/// File-backed post storage.
pub mod store;

pub use batch::{BatchInput, BatchOptions, BatchReport, BatchResult, BatchStats, render_batch};
pub use config::ContentConfig;
pub use error::ContentError;
pub use store::{ContentKind, ContentStore, LoadedPost, PostSummary, slugify_title};
