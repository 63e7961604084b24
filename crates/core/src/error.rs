use thiserror::Error;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Optional file path
    pub file: Option<String>,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            file: None,
            line,
            column,
        }
    }

    /// Create a source location with file information
    pub fn with_file(file: String, line: usize, column: usize) -> Self {
        Self {
            file: Some(file),
            line,
            column,
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}:{}:{}", file, self.line, self.column)
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// Errors that can occur while turning a post body into HTML.
#[derive(Debug, Error)]
pub enum BlogmarkError {
    /// markdown-rs parser error surfaced through the adapter.
    #[error("Parse error at {location}: {message}")]
    MarkdownAdapter {
        /// Error message
        message: String,
        /// Source location
        location: SourceLocation,
    },
    /// Rendering error while building or serializing the document tree.
    #[error("Render error: {message}")]
    RenderError {
        /// Error message
        message: String,
    },}

impl BlogmarkError {
    /// Create a render error
    pub fn render_error(message: impl Into<String>) -> Self {
        Self::RenderError {
            message: message.into(),
        }
    }
}

/// Non-fatal findings that degrade output but never abort a render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderWarning {
    /// An image element had no usable `src`; a placeholder was substituted.
    MissingImageSource,
    /// An image element had no alt text.
    MissingAltText {
        /// The image source, for locating the offender.
        src: String,
    },
    /// A terminal-recording block had no cast id; an error notice was substituted.
    EmbedMissingCastId {
        /// Where the block started, when known.
        location: Option<SourceLocation>,
    },
}

impl std::fmt::Display for RenderWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderWarning::MissingImageSource => write!(f, "image found without src attribute"),
            RenderWarning::MissingAltText { src } => write!(f, "image missing alt text: {}", src),
            RenderWarning::EmbedMissingCastId { location } => match location {
                Some(location) => write!(f, "asciinema block missing cast-id at {}", location),
                None => write!(f, "asciinema block missing cast-id"),
            },
        }
    }
}

/// Recoverable error information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoverableError {
    /// Stage that recovered (e.g. `"images"`, `"embeds"`, `"pipeline"`).
    pub stage: String,
    /// Error message
    pub message: String,
    /// Error severity
    pub severity: ErrorSeverity,
}

/// Error severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Error that was recovered from
    Error,
    /// Warning that doesn't prevent rendering
    Warning,
}

impl RecoverableError {
    /// Create a new recoverable error
    pub fn error(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            message: message.into(),
            severity: ErrorSeverity::Error,
        }
    }

    /// Create a new warning
    pub fn warning(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            message: message.into(),
            severity: ErrorSeverity::Warning,
        }
    }
}

impl std::fmt::Display for RecoverableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            ErrorSeverity::Error => "error",
            ErrorSeverity::Warning => "warning",
        };
        write!(f, "{} in {}: {}", severity, self.stage, self.message)
    }
}

/// Collection of render diagnostics (warnings and recoverable errors)
#[derive(Debug, Clone, Default)]
pub struct RenderDiagnostics {
    /// List of non-fatal warnings
    pub warnings: Vec<RenderWarning>,
    /// List of recoverable errors
    pub errors: Vec<RecoverableError>,
}

impl RenderDiagnostics {
    /// Create a new empty diagnostics collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning to the diagnostics collection
    pub fn add_warning(&mut self, warning: RenderWarning) {
        self.warnings.push(warning);
    }

    /// Add a recoverable error to the diagnostics collection
    pub fn add_error(&mut self, error: RecoverableError) {
        self.errors.push(error);
    }

    /// Record an error recovered by `stage`.
    pub fn add_error_in(&mut self, stage: impl Into<String>, message: impl Into<String>) {
        self.errors.push(RecoverableError::error(stage, message));
    }

    /// Moves every entry of `other` into this collection.
    pub fn extend(&mut self, other: RenderDiagnostics) {
        self.warnings.extend(other.warnings);
        self.errors.extend(other.errors);
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Check if there are any diagnostics
    pub fn has_any(&self) -> bool {
        self.has_warnings() || self.has_errors()
    }

    /// Get total count of all diagnostics
    pub fn count(&self) -> usize {
        self.warnings.len() + self.errors.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_display_with_and_without_file() {
        assert_eq!(SourceLocation::new(3, 7).to_string(), "3:7");
        assert_eq!(
            SourceLocation::with_file("post.md".into(), 1, 2).to_string(),
            "post.md:1:2"
        );
    }

    #[test]
    fn diagnostics_counts() {
        let mut diagnostics = RenderDiagnostics::new();
        assert!(!diagnostics.has_any());

        diagnostics.add_warning(RenderWarning::MissingImageSource);
        diagnostics.add_error_in("images", "boom");
        assert!(diagnostics.has_warnings());
        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.count(), 2);
        assert_eq!(diagnostics.errors[0].to_string(), "error in images: boom");
    }

    #[test]
    fn extend_merges_entries() {
        let mut first = RenderDiagnostics::new();
        first.add_warning(RenderWarning::MissingImageSource);
        let mut second = RenderDiagnostics::new();
        second.add_error(RecoverableError::warning("outline", "odd markup"));

        first.extend(second);
        assert_eq!(first.count(), 2);
        assert_eq!(first.errors[0].severity, ErrorSeverity::Warning);
    }
}
