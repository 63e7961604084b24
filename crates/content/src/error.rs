use crate::store::ContentKind;
use blogmark_core::FrontmatterError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading content.
#[derive(Debug, Error)]
pub enum ContentError {
    /// No source exists for the slug. Callers typically answer with a 404.
    #[error("{kind} post not found: {slug}")]
    NotFound {
        /// Content kind that was searched.
        kind: ContentKind,
        /// Requested slug.
        slug: String,
    },
    /// The source exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File or directory being read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The front-matter block is malformed.
    #[error("invalid front-matter in {}: {source}", path.display())]
    Frontmatter {
        /// Offending file.
        path: PathBuf,
        /// Underlying error.
        source: FrontmatterError,
    },
}

impl ContentError {
    /// Returns true for [`ContentError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, ContentError::NotFound { .. })
    }
}
