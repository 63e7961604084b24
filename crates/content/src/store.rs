//! File-backed post storage.

use crate::config::ContentConfig;
use crate::error::ContentError;
use blogmark_core::{FrontMatter, extract_frontmatter, slugify, split_document};
use blogmark_render::{EnhancedPost, Pipeline};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Kind of content, each stored in its own directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Long-form posts.
    Blog,
    /// Short "today I learned" notes.
    Til,
}

impl ContentKind {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Blog => "blog",
            ContentKind::Til => "til",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A post read from disk and rendered.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedPost {
    /// Slug the post was requested by.
    pub slug: String,
    /// Directory it came from.
    pub kind: ContentKind,
    /// Rendered post.
    #[serde(flatten)]
    pub post: EnhancedPost,
}

/// Listing entry: front-matter only, no rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostSummary {
    /// File stem.
    pub slug: String,
    /// Parsed front-matter.
    #[serde(flatten)]
    pub meta: FrontMatter,
}

/// Slug for a new post title. Empty when the title has no ASCII letters or digits.
pub fn slugify_title(title: &str) -> String {
    slugify(title)
}

/// Reads and renders posts below a content root.
pub struct ContentStore {
    config: ContentConfig,
    pipeline: Pipeline,
}

impl ContentStore {
    /// Opens a store; the pipeline is built once and shared by every render.
    pub fn new(config: ContentConfig) -> Self {
        let pipeline = Pipeline::new(config.render.clone());
        Self { config, pipeline }
    }

    /// Store with the default layout below `root`.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self::new(ContentConfig::with_root(root))
    }

    /// Configuration in use.
    pub fn config(&self) -> &ContentConfig {
        &self.config
    }

    /// Pipeline used for every render.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Directory holding posts of `kind`.
    pub fn dir(&self, kind: ContentKind) -> PathBuf {
        let sub = match kind {
            ContentKind::Blog => &self.config.blog_dir,
            ContentKind::Til => &self.config.til_dir,
        };
        self.config.root.join(sub)
    }

    /// Source path for `slug`, or `None` when the slug cannot name a file in the directory.
    pub fn path_for(&self, slug: &str, kind: ContentKind) -> Option<PathBuf> {
        let unsafe_slug = slug.is_empty()
            || slug.starts_with('.')
            || slug.contains(['/', '\\'])
            || slug.contains("..");
        if unsafe_slug {
            return None;
        }
        Some(
            self.dir(kind)
                .join(format!("{}.{}", slug, self.config.extension)),
        )
    }

    /// Returns true if a source file exists for `slug`.
    pub fn exists(&self, slug: &str, kind: ContentKind) -> bool {
        self.path_for(slug, kind).is_some_and(|path| path.is_file())
    }

    /// Reads, splits and renders one post.
    pub fn load(&self, slug: &str, kind: ContentKind) -> Result<LoadedPost, ContentError> {
        let not_found = || ContentError::NotFound {
            kind,
            slug: slug.to_string(),
        };
        let path = self.path_for(slug, kind).ok_or_else(not_found)?;
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Err(not_found()),
            Err(source) => return Err(ContentError::Io { path, source }),
        };
        let split = split_document(&raw)
            .map_err(|source| ContentError::Frontmatter {
                path: path.clone(),
                source,
            })?;

        log::debug!("Rendering {} post {}", kind, slug);
        Ok(LoadedPost {
            slug: slug.to_string(),
            kind,
            post: self.pipeline.enhance(split.meta, split.body),
        })
    }

    /// Renders a source that has not been written to disk (e.g. a preview).
    pub fn render_source(&self, raw: &str) -> Result<EnhancedPost, blogmark_core::FrontmatterError> {
        let split = split_document(raw)?;
        Ok(self.pipeline.enhance(split.meta, split.body))
    }

    /// Slugs of every source file of `kind`, sorted. A missing directory lists as empty.
    pub fn slugs(&self, kind: ContentKind) -> Result<Vec<String>, ContentError> {
        let dir = self.dir(kind);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::debug!("No {} directory at {}", kind, dir.display());
                return Ok(Vec::new());
            }
            Err(source) => return Err(ContentError::Io { path: dir, source }),
        };

        let mut slugs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| ContentError::Io {
                path: dir.clone(),
                source,
            })?;
            if let Some(slug) = self.slug_of(&entry.path()) {
                slugs.push(slug);
            }
        }
        slugs.sort();
        Ok(slugs)
    }

    fn slug_of(&self, path: &Path) -> Option<String> {
        if !path.is_file() {
            return None;
        }
        let extension = path.extension()?.to_str()?;
        if extension != self.config.extension {
            return None;
        }
        path.file_stem()?.to_str().map(str::to_string)
    }

    /// Front-matter of every post of `kind`, newest first (ties by slug).
    ///
    /// Posts with unreadable or malformed front-matter are skipped with a warning.
    pub fn list(&self, kind: ContentKind) -> Result<Vec<PostSummary>, ContentError> {
        let mut summaries = Vec::new();
        for slug in self.slugs(kind)? {
            match self.read_summary(&slug, kind) {
                Ok(summary) => summaries.push(summary),
                Err(err) => log::warn!("Skipping {} post {} in listing: {}", kind, slug, err),
            }
        }
        summaries.sort_by(|a, b| b.meta.date.cmp(&a.meta.date).then_with(|| a.slug.cmp(&b.slug)));
        Ok(summaries)
    }

    fn read_summary(&self, slug: &str, kind: ContentKind) -> Result<PostSummary, ContentError> {
        let path = self.path_for(slug, kind).ok_or_else(|| ContentError::NotFound {
            kind,
            slug: slug.to_string(),
        })?;
        let raw = fs::read_to_string(&path).map_err(|source| ContentError::Io {
            path: path.clone(),
            source,
        })?;
        let meta = extract_frontmatter(&raw)
            .and_then(|extraction| extraction.front_matter())
            .map_err(|source| ContentError::Frontmatter { path, source })?;
        Ok(PostSummary {
            slug: slug.to_string(),
            meta,
        })
    }

    /// Slug for a new post titled `title` that no existing file of `kind` uses.
    ///
    /// The bare slug is tried first, then `-1`, `-2`, ... An empty slug becomes `untitled`.
    pub fn unique_slug(&self, title: &str, kind: ContentKind) -> String {
        let mut base = slugify_title(title);
        if base.is_empty() {
            base = "untitled".to_string();
        }
        let mut candidate = base.clone();
        let mut counter = 1;
        while self.exists(&candidate, kind) {
            candidate = format!("{}-{}", base, counter);
            counter += 1;
        }
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names() {
        assert_eq!(ContentKind::Blog.to_string(), "blog");
        assert_eq!(serde_json::to_string(&ContentKind::Til).unwrap(), "\"til\"");
    }

    #[test]
    fn traversal_slugs_have_no_path() {
        let store = ContentStore::open("/srv/content");
        assert_eq!(
            store.path_for("hello", ContentKind::Blog),
            Some(PathBuf::from("/srv/content/blog/hello.md"))
        );
        for slug in ["", "../secret", "a/b", "a\\b", ".hidden", "x..y"] {
            assert_eq!(store.path_for(slug, ContentKind::Blog), None, "{slug}");
        }
    }

    #[test]
    fn title_slugs() {
        assert_eq!(slugify_title("Hello, World!"), "hello-world");
        assert_eq!(slugify_title("  Rust_2024 Edition  "), "rust-2024-edition");
    }

    #[test]
    fn traversal_load_is_not_found() {
        let store = ContentStore::open("/nonexistent");
        let err = store.load("../etc/passwd", ContentKind::Til).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "til post not found: ../etc/passwd");
    }
}
