//! Content store configuration.

use blogmark_render::Options;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where posts live and how they render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Directory holding one sub-directory per content kind.
    pub root: PathBuf,
    /// Sub-directory of blog posts.
    #[serde(alias = "blogDir")]
    pub blog_dir: String,
    /// Sub-directory of TIL notes.
    #[serde(alias = "tilDir")]
    pub til_dir: String,
    /// File extension of post sources, without the dot.
    pub extension: String,
    /// Pipeline options used for every post.
    pub render: Options,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("content"),
            blog_dir: "blog".to_string(),
            til_dir: "til".to_string(),
            extension: "md".to_string(),
            render: Options::default(),
        }
    }
}

impl ContentConfig {
    /// Default layout below `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ContentConfig::default();
        assert_eq!(config.root, PathBuf::from("content"));
        assert_eq!(config.blog_dir, "blog");
        assert_eq!(config.til_dir, "til");
        assert_eq!(config.extension, "md");
    }

    #[test]
    fn partial_json() {
        let config: ContentConfig =
            serde_json::from_str(r#"{"root": "/srv/site", "tilDir": "notes"}"#).unwrap();
        assert_eq!(config.root, PathBuf::from("/srv/site"));
        assert_eq!(config.til_dir, "notes");
        assert_eq!(config.blog_dir, "blog");
        assert!(config.render.enable_heading_ids);
    }
}
