//! Reading-time estimation from raw markdown.
//!
//! Markup is stripped by sequential textual substitution rather than a full
//! parse, so the estimate is independent of the rendering pipeline.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Average adult reading speed used for the estimate.
pub const WORDS_PER_MINUTE: usize = 225;

/// Estimated reading time for a post body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingTimeResult {
    /// Rounded minutes, never below one.
    pub minutes: usize,
    /// Words counted after stripping markup.
    pub words: usize,
    /// Display form, e.g. `"5 min read"`.
    pub text: String,
}

impl ReadingTimeResult {
    /// Builds the result for a word count.
    pub fn from_words(words: usize) -> Self {
        let minutes = minutes_for(words);
        Self {
            minutes,
            words,
            text: format!("{} min read", minutes),
        }
    }
}

/// Estimates reading time for raw markdown. Never fails; empty input is one minute.
pub fn estimate(raw_markdown: &str) -> ReadingTimeResult {
    let plain = strip_markdown_and_html(raw_markdown);
    ReadingTimeResult::from_words(count_words(&plain))
}

fn minutes_for(words: usize) -> usize {
    let minutes = (words as f64 / WORDS_PER_MINUTE as f64).round() as usize;
    minutes.max(1)
}

fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

static RE_HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static RE_IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\([^)]*\)").unwrap());
static RE_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap());
static RE_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#{1,6}\s+").unwrap());
static RE_STRONG_STARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static RE_STRONG_UNDERSCORES: Lazy<Regex> = Lazy::new(|| Regex::new(r"__(.*?)__").unwrap());
static RE_EM_STAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.*?)\*").unwrap());
static RE_EM_UNDERSCORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"_(.*?)_").unwrap());
static RE_CODE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```[\s\S]*?```").unwrap());
static RE_INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]*)`").unwrap());
static RE_BLOCKQUOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^>\s+").unwrap());
static RE_RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[-*_]{3,}\s*$").unwrap());
static RE_BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*[-*+]\s+").unwrap());
static RE_ORDERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*\d+\.\s+").unwrap());

/// Strips markup in a fixed order: tags before images, images before links
/// (an image is a `!` followed by link syntax), emphasis before code fences.
fn strip_markdown_and_html(content: &str) -> String {
    let text = RE_HTML_TAG.replace_all(content, "");
    let text = RE_IMAGE.replace_all(&text, "$1");
    let text = RE_LINK.replace_all(&text, "$1");
    let text = RE_HEADING.replace_all(&text, "");
    let text = RE_STRONG_STARS.replace_all(&text, "$1");
    let text = RE_STRONG_UNDERSCORES.replace_all(&text, "$1");
    let text = RE_EM_STAR.replace_all(&text, "$1");
    let text = RE_EM_UNDERSCORE.replace_all(&text, "$1");
    let text = RE_CODE_FENCE.replace_all(&text, "");
    let text = RE_INLINE_CODE.replace_all(&text, "$1");
    let text = RE_BLOCKQUOTE.replace_all(&text, "");
    let text = RE_RULE.replace_all(&text, "");
    let text = RE_BULLET.replace_all(&text, "");
    let text = RE_ORDERED.replace_all(&text, "");
    text.into_owned()
}
