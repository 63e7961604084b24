//! Pipeline configuration.

use blogmark_core::ParseOptions;
use serde::{Deserialize, Serialize};

/// Switches and parameters for the enhancement pipeline.
///
/// Every stage is on by default; field aliases accept camelCase so the same
/// JSON a front end sends can be deserialized directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Rewrite terminal-recording blocks and shortcodes.
    #[serde(alias = "enableEmbeds")]
    pub enable_embeds: bool,
    /// Give headings slug ids.
    #[serde(alias = "enableHeadingIds")]
    pub enable_heading_ids: bool,
    /// Wrap heading content in self-links.
    #[serde(alias = "enableHeadingAnchors")]
    pub enable_heading_anchors: bool,
    /// Class on heading self-links.
    #[serde(alias = "anchorClass")]
    pub anchor_class: String,
    /// Classify and rewrite images.
    #[serde(alias = "enableImageHandling")]
    pub enable_image_handling: bool,
    /// Placeholder width for local images.
    #[serde(alias = "placeholderWidth")]
    pub placeholder_width: u32,
    /// Placeholder height for local images.
    #[serde(alias = "placeholderHeight")]
    pub placeholder_height: u32,
    /// Replace diagram code blocks with placeholders.
    #[serde(alias = "enableDiagrams")]
    pub enable_diagrams: bool,
    /// Markdown dialect.
    pub parse: ParseOptions,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            enable_embeds: true,
            enable_heading_ids: true,
            enable_heading_anchors: true,
            anchor_class: "anchor".to_string(),
            enable_image_handling: true,
            placeholder_width: 800,
            placeholder_height: 600,
            enable_diagrams: true,
            parse: ParseOptions::default(),
        }
    }
}

impl Options {
    /// Plain conversion: every enrichment stage off.
    pub fn plain() -> Self {
        Self {
            enable_embeds: false,
            enable_heading_ids: false,
            enable_heading_anchors: false,
            enable_image_handling: false,
            enable_diagrams: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_everything() {
        let options = Options::default();
        assert!(options.enable_embeds && options.enable_heading_ids);
        assert!(options.enable_heading_anchors && options.enable_image_handling);
        assert!(options.enable_diagrams);
        assert_eq!(options.anchor_class, "anchor");
        assert_eq!((options.placeholder_width, options.placeholder_height), (800, 600));
    }

    #[test]
    fn deserializes_camel_case_with_defaults() {
        let options: Options =
            serde_json::from_str(r#"{"enableDiagrams": false, "anchorClass": "hash"}"#).unwrap();
        assert!(!options.enable_diagrams);
        assert_eq!(options.anchor_class, "hash");
        assert!(options.enable_embeds);
        assert!(options.parse.gfm);
    }
}
