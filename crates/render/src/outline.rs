//! Table-of-contents extraction from rendered HTML.
//!
//! Works on the final HTML string rather than the tree so it also sees
//! headings that arrived as raw markup. Only level 2 and 3 headings are
//! collected; a heading must open and close on the same line.

use blogmark_core::Slugger;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static RE_HEADING_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<h([23])(?:\s+id="([^"]*)")?[^>]*>"#).expect("valid heading regex")
});
static RE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</?[a-zA-Z][^>]*>").expect("valid tag regex"));

/// One outline entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingRecord {
    /// Anchor id, unique within the outline.
    pub id: String,
    /// Heading text with markup removed.
    pub text: String,
    /// 2 or 3.
    pub level: u8,
}

/// Removes every tag, keeping the text between them.
pub fn strip_tags(html: &str) -> String {
    RE_TAG.replace_all(html, "").into_owned()
}

/// Collects level-2 and level-3 headings in document order.
///
/// An existing `id` (when it is the first attribute) is reused; otherwise
/// the id is derived from the text. Ids are made unique with `-2`, `-3`, ...
/// suffixes. Headings whose text is empty are skipped.
pub fn extract_headings(html: &str) -> Vec<HeadingRecord> {
    let mut slugger = Slugger::new();
    let mut headings = Vec::new();
    let mut cursor = 0;

    while let Some(captures) = RE_HEADING_OPEN.captures_at(html, cursor) {
        let (Some(open), Some(level)) = (captures.get(0), captures.get(1)) else {
            break;
        };
        let Some(inner) = heading_inner(html, open.end(), level.as_str()) else {
            // No closing tag on this line; try again past this `<`.
            cursor = open.start() + 1;
            continue;
        };
        cursor = inner.end + level.len() + "</h>".len();

        let text = decode(strip_tags(&html[inner.clone()]).trim());
        if text.is_empty() {
            log::debug!("Skipping empty heading at byte {}", open.start());
            continue;
        }

        let candidate = match captures.get(2).map(|id| decode(id.as_str())) {
            Some(id) if !id.is_empty() => id,
            _ => blogmark_core::heading_id(&text),
        };
        headings.push(HeadingRecord {
            id: slugger.claim(&candidate),
            text,
            level: if level.as_str() == "2" { 2 } else { 3 },
        });
    }

    headings
}

/// Byte range of the heading content, up to the matching close tag on the same line.
fn heading_inner(html: &str, start: usize, level: &str) -> Option<std::ops::Range<usize>> {
    let rest = &html[start..];
    let line_end = rest
        .find(['\n', '\r', '\u{2028}', '\u{2029}'])
        .unwrap_or(rest.len());
    let line = rest[..line_end].to_ascii_lowercase();
    let close = format!("</h{}>", level);
    let offset = line.find(&close)?;
    Some(start..start + offset)
}

fn decode(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, text: &str, level: u8) -> HeadingRecord {
        HeadingRecord {
            id: id.to_string(),
            text: text.to_string(),
            level,
        }
    }

    #[test]
    fn collects_levels_two_and_three() {
        let html = "<h1>Title</h1><h2 id=\"a\">A</h2><h3 id=\"b\">B</h3><h4>C</h4>";
        assert_eq!(
            extract_headings(html),
            vec![record("a", "A", 2), record("b", "B", 3)]
        );
    }

    #[test]
    fn derives_and_dedupes_ids() {
        let html = "<h2>Setup</h2>\n<h2>Setup</h2>\n<h3>Setup</h3>";
        let ids: Vec<_> = extract_headings(html).into_iter().map(|h| h.id).collect();
        assert_eq!(ids, vec!["setup", "setup-2", "setup-3"]);
    }

    #[test]
    fn strips_nested_markup() {
        let html = "<h2 id=\"intro\"><a href=\"#intro\" class=\"anchor\">Intro to <code>cargo</code></a></h2>";
        assert_eq!(extract_headings(html), vec![record("intro", "Intro to cargo", 2)]);
    }

    #[test]
    fn decodes_entities() {
        let html = "<h2 id=\"qa\">Q &amp; A &lt;3</h2>";
        assert_eq!(extract_headings(html), vec![record("qa", "Q & A <3", 2)]);
    }

    #[test]
    fn skips_empty_headings() {
        assert!(extract_headings("<h2><span></span>  </h2>").is_empty());
    }

    #[test]
    fn id_must_be_first_attribute() {
        let html = "<h2 class=\"x\" id=\"custom\">Named</h2>";
        assert_eq!(extract_headings(html), vec![record("named", "Named", 2)]);
    }

    #[test]
    fn case_insensitive_tags() {
        assert_eq!(
            extract_headings("<H2 ID=\"up\">Upper</H2>"),
            vec![record("up", "Upper", 2)]
        );
    }

    #[test]
    fn multiline_headings_are_ignored() {
        let html = "<h2>Broken\nacross lines</h2><h3>Fine</h3>";
        assert_eq!(extract_headings(html), vec![record("fine", "Fine", 3)]);
    }

    #[test]
    fn no_headings() {
        assert!(extract_headings("<p>just text</p>").is_empty());
        assert!(extract_headings("").is_empty());
    }
}
