//! Terminal-recording embeds.
//!
//! Two source forms become an inert `div.asciinema-embed` marker carrying
//! `data-*` configuration for a client-side player:
//!
//! - a fenced block with language `asciinema` whose body is `key: value` lines
//! - an inline shortcode `[asciinema:ID]` or `[asciinema:ID:THEME:SPEED]`
//!
//! Faults are isolated: a block or a single shortcode that cannot be
//! converted is logged and left as written.

use crate::document::{AttrKey, Attributes, DataAttr};
use crate::renderer::serialize::start_tag;
use blogmark_core::{AstTransform, RenderDiagnostics, RenderWarning, SourceLocation};
use markdown::mdast::{self, Node};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Code-fence language that marks an embed block.
pub const ASCIINEMA_LANGUAGE: &str = "asciinema";

/// Class of the emitted marker element.
pub const EMBED_CLASS: &str = "asciinema-embed";

const DEFAULT_THEME: &str = "monokai";
const DEFAULT_SPEED: f64 = 1.0;

const MISSING_CAST_ID_NOTICE: &str = "<div class=\"asciinema-error\"><p><strong>Error:</strong> Asciinema block missing cast-id</p></div>";

static RE_SHORTCODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[asciinema:([^\]]+)\]").expect("valid shortcode regex"));

/// Errors that stop a single embed from being converted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmbedError {
    /// Cast ids are restricted to `[A-Za-z0-9._-]`.
    #[error("invalid cast id {0:?}")]
    InvalidCastId(String),
}

/// Player configuration for one embed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AsciinemaConfig {
    /// Recording identifier. Empty means "missing".
    pub cast_id: String,
    /// Player colour theme.
    pub theme: Option<String>,
    /// Playback speed multiplier.
    pub speed: Option<f64>,
    /// Start playing on load.
    pub auto_play: bool,
    /// Restart when finished.
    pub loop_playback: bool,
    /// Terminal width in columns.
    pub cols: Option<u32>,
    /// Terminal height in rows.
    pub rows: Option<u32>,
}

impl AsciinemaConfig {
    /// Parses the `key: value` body of an embed block. Unknown keys are ignored.
    pub fn from_block(body: &str) -> Self {
        let mut config = AsciinemaConfig::default();
        for line in body.trim().lines() {
            let mut parts = line.split(':').map(str::trim);
            let key = parts.next().unwrap_or_default();
            let Some(value) = parts.next() else {
                continue;
            };
            match key {
                "cast-id" | "castId" => config.cast_id = value.to_string(),
                "theme" => config.theme = Some(value.to_string()),
                "speed" => config.speed = value.parse().ok(),
                "autoPlay" | "auto-play" => config.auto_play = value == "true",
                "loop" => config.loop_playback = value == "true",
                "cols" => config.cols = value.parse().ok(),
                "rows" => config.rows = value.parse().ok(),
                _ => log::debug!("Ignoring unknown asciinema option {:?}", key),
            }
        }
        config
    }

    /// Parses the colon-separated parameters of a shortcode (`ID[:THEME[:SPEED]]`).
    pub fn from_shortcode(params: &str) -> Self {
        let mut parts = params.split(':');
        let cast_id = parts.next().unwrap_or_default().to_string();
        let theme = parts
            .next()
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_THEME)
            .to_string();
        let speed = match parts.next() {
            Some(raw) if !raw.is_empty() => raw.parse().ok(),
            _ => Some(DEFAULT_SPEED),
        };
        AsciinemaConfig {
            cast_id,
            theme: Some(theme),
            speed,
            ..AsciinemaConfig::default()
        }
    }

    /// Fails when the cast id holds characters outside `[A-Za-z0-9._-]`.
    pub fn validate(&self) -> Result<(), EmbedError> {
        let valid = self
            .cast_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if valid {
            Ok(())
        } else {
            Err(EmbedError::InvalidCastId(self.cast_id.clone()))
        }
    }

    /// Marker attributes. Zero, unparsable and false values are omitted.
    pub fn attributes(&self) -> Attributes {
        let mut attrs = Attributes::new()
            .with(AttrKey::Class, EMBED_CLASS)
            .with(AttrKey::Data(DataAttr::CastId), self.cast_id.as_str());
        if let Some(theme) = self.theme.as_deref().filter(|t| !t.is_empty()) {
            attrs.set(AttrKey::Data(DataAttr::Theme), theme);
        }
        if let Some(speed) = self.speed.filter(|s| s.is_finite() && *s != 0.0) {
            attrs.set(AttrKey::Data(DataAttr::Speed), speed.to_string());
        }
        if self.auto_play {
            attrs.set(AttrKey::Data(DataAttr::AutoPlay), "true");
        }
        if self.loop_playback {
            attrs.set(AttrKey::Data(DataAttr::Loop), "true");
        }
        if let Some(cols) = self.cols.filter(|c| *c != 0) {
            attrs.set(AttrKey::Data(DataAttr::Cols), cols.to_string());
        }
        if let Some(rows) = self.rows.filter(|r| *r != 0) {
            attrs.set(AttrKey::Data(DataAttr::Rows), rows.to_string());
        }
        attrs
    }

    /// Marker markup: an empty `div` carrying the configuration.
    pub fn to_html(&self) -> String {
        format!("{}</div>", start_tag("div", &self.attributes()))
    }
}

/// Rewrites embed blocks and shortcodes into raw marker HTML.
#[derive(Debug, Default, Clone, Copy)]
pub struct AsciinemaTransform;

impl AstTransform for AsciinemaTransform {
    fn transform(&self, root: &mut Node, diagnostics: &mut RenderDiagnostics) {
        if let Some(children) = root.children_mut() {
            rewrite_blocks(children, diagnostics);
            rewrite_shortcodes(children, diagnostics);
        }
    }
}

fn rewrite_blocks(children: &mut [Node], diagnostics: &mut RenderDiagnostics) {
    for child in children.iter_mut() {
        let replacement = match &*child {
            Node::Code(code) if code.lang.as_deref() == Some(ASCIINEMA_LANGUAGE) => {
                Some(block_replacement(code, diagnostics))
            }
            _ => None,
        };
        match replacement {
            Some(Ok(html)) => *child = html,
            Some(Err(err)) => {
                log::error!("Error processing asciinema block: {}", err);
                diagnostics.add_error_in("embeds", err.to_string());
            }
            None => {
                if let Some(grandchildren) = child.children_mut() {
                    rewrite_blocks(grandchildren, diagnostics);
                }
            }
        }
    }
}

fn block_replacement(
    code: &mdast::Code,
    diagnostics: &mut RenderDiagnostics,
) -> Result<Node, EmbedError> {
    let config = AsciinemaConfig::from_block(&code.value);
    let value = if config.cast_id.is_empty() {
        log::warn!("Asciinema block missing cast-id");
        diagnostics.add_warning(RenderWarning::EmbedMissingCastId {
            location: code
                .position
                .as_ref()
                .map(|p| SourceLocation::new(p.start.line, p.start.column)),
        });
        MISSING_CAST_ID_NOTICE.to_string()
    } else {
        config.validate()?;
        config.to_html()
    };
    Ok(Node::Html(mdast::Html {
        value,
        position: code.position.clone(),
    }))
}

fn rewrite_shortcodes(children: &mut Vec<Node>, diagnostics: &mut RenderDiagnostics) {
    let mut rewritten = Vec::with_capacity(children.len());
    for mut child in children.drain(..) {
        let split = match &child {
            Node::Text(text) if RE_SHORTCODE.is_match(&text.value) => {
                Some(split_shortcodes(&text.value, diagnostics))
            }
            _ => None,
        };
        match split {
            Some(parts) => rewritten.extend(parts),
            None => {
                if let Some(grandchildren) = child.children_mut() {
                    rewrite_shortcodes(grandchildren, diagnostics);
                }
                match lift_lone_embeds(&mut child) {
                    Some(embeds) => rewritten.extend(embeds),
                    None => rewritten.push(child),
                }
            }
        }
    }
    *children = rewritten;
}

/// Splits text around every shortcode. Shortcodes with an empty or invalid id stay literal.
fn split_shortcodes(text: &str, diagnostics: &mut RenderDiagnostics) -> Vec<Node> {
    let mut parts = Vec::new();
    let mut last = 0;
    for captures in RE_SHORTCODE.captures_iter(text) {
        let (Some(whole), Some(params)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let config = AsciinemaConfig::from_shortcode(params.as_str());
        if config.cast_id.is_empty() {
            continue;
        }
        if let Err(err) = config.validate() {
            log::error!("Error processing asciinema shortcode: {}", err);
            diagnostics.add_error_in("embeds", err.to_string());
            continue;
        }

        if whole.start() > last {
            parts.push(text_node(&text[last..whole.start()]));
        }
        parts.push(Node::Html(mdast::Html {
            value: config.to_html(),
            position: None,
        }));
        last = whole.end();
    }
    if last < text.len() {
        parts.push(text_node(&text[last..]));
    }
    parts
}

fn text_node(value: &str) -> Node {
    Node::Text(mdast::Text {
        value: value.to_string(),
        position: None,
    })
}

/// A paragraph holding nothing but embed markers (and whitespace) is replaced
/// by the markers, so the block-level `div` is not nested inside `p`.
fn lift_lone_embeds(node: &mut Node) -> Option<Vec<Node>> {
    let Node::Paragraph(paragraph) = node else {
        return None;
    };
    let mut has_embed = false;
    for child in &paragraph.children {
        match child {
            Node::Html(html) if is_embed_marker(&html.value) => has_embed = true,
            Node::Text(text) if text.value.trim().is_empty() => {}
            _ => return None,
        }
    }
    if !has_embed {
        return None;
    }
    Some(
        std::mem::take(&mut paragraph.children)
            .into_iter()
            .filter(|child| matches!(child, Node::Html(_)))
            .collect(),
    )
}

fn is_embed_marker(html: &str) -> bool {
    html.starts_with(&format!("<div class=\"{}\"", EMBED_CLASS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogmark_core::{ParseOptions, parse_mdast};

    fn transformed(input: &str) -> (Node, RenderDiagnostics) {
        let mut root = parse_mdast(input, &ParseOptions::default()).unwrap();
        let mut diagnostics = RenderDiagnostics::new();
        AsciinemaTransform.transform(&mut root, &mut diagnostics);
        (root, diagnostics)
    }

    fn html_values(node: &Node) -> Vec<String> {
        let mut found = Vec::new();
        collect_html(node, &mut found);
        found
    }

    fn collect_html(node: &Node, found: &mut Vec<String>) {
        if let Node::Html(html) = node {
            found.push(html.value.clone());
        }
        if let Some(children) = node.children() {
            for child in children {
                collect_html(child, found);
            }
        }
    }

    #[test]
    fn block_with_full_config() {
        let input = "```asciinema\ncast-id: abc123\ntheme: solarized\nspeed: 1.5\nautoPlay: true\nloop: false\ncols: 80\nrows: 0\n```";
        let (root, diagnostics) = transformed(input);
        assert_eq!(
            html_values(&root),
            vec![
                "<div class=\"asciinema-embed\" data-cast-id=\"abc123\" data-theme=\"solarized\" data-speed=\"1.5\" data-auto-play=\"true\" data-cols=\"80\"></div>"
            ]
        );
        assert!(!diagnostics.has_any());
    }

    #[test]
    fn block_without_cast_id_becomes_notice() {
        let (root, diagnostics) = transformed("intro\n\n```asciinema\ntheme: dracula\n```");
        assert_eq!(html_values(&root), vec![MISSING_CAST_ID_NOTICE.to_string()]);
        assert!(matches!(
            diagnostics.warnings.as_slice(),
            [RenderWarning::EmbedMissingCastId { location: Some(loc) }] if loc.line == 3
        ));
    }

    #[test]
    fn invalid_block_is_left_alone() {
        let (root, diagnostics) = transformed("```asciinema\ncast-id: \"><script>\n```");
        assert!(html_values(&root).is_empty());
        assert!(matches!(root.children().unwrap()[0], Node::Code(_)));
        assert_eq!(diagnostics.errors.len(), 1);
        assert_eq!(diagnostics.errors[0].stage, "embeds");
    }

    #[test]
    fn shortcode_defaults() {
        let (root, _) = transformed("Watch [asciinema:xyz] now");
        assert_eq!(
            html_values(&root),
            vec![
                "<div class=\"asciinema-embed\" data-cast-id=\"xyz\" data-theme=\"monokai\" data-speed=\"1\"></div>"
            ]
        );
        let Node::Paragraph(p) = &root.children().unwrap()[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(p.children.len(), 3);
        assert!(matches!(&p.children[0], Node::Text(t) if t.value == "Watch "));
        assert!(matches!(&p.children[2], Node::Text(t) if t.value == " now"));
    }

    #[test]
    fn shortcode_with_theme_and_speed() {
        let (root, _) = transformed("[asciinema:a1:dracula:2]");
        assert_eq!(
            html_values(&root),
            vec![
                "<div class=\"asciinema-embed\" data-cast-id=\"a1\" data-theme=\"dracula\" data-speed=\"2\"></div>"
            ]
        );
    }

    #[test]
    fn lone_shortcode_is_lifted_out_of_paragraph() {
        let (root, _) = transformed("[asciinema:solo]");
        assert!(matches!(root.children().unwrap()[0], Node::Html(_)));
    }

    #[test]
    fn shortcode_in_code_is_untouched() {
        let (root, _) = transformed("`[asciinema:abc]`\n\n```\n[asciinema:abc]\n```");
        assert!(html_values(&root).is_empty());
    }

    #[test]
    fn unparsable_speed_is_omitted() {
        let config = AsciinemaConfig::from_shortcode("id:monokai:fast");
        assert_eq!(config.speed, None);
        assert!(!config.to_html().contains("data-speed"));
    }

    #[test]
    fn multiple_shortcodes_in_one_text() {
        let parts = split_shortcodes(
            "a [asciinema:one] b [asciinema:two] c",
            &mut RenderDiagnostics::new(),
        );
        assert_eq!(parts.len(), 5);
    }

    #[test]
    fn empty_id_stays_literal() {
        let config = AsciinemaConfig::from_shortcode(":monokai");
        assert!(config.cast_id.is_empty());
        let parts = split_shortcodes("[asciinema::monokai]", &mut RenderDiagnostics::new());
        assert!(matches!(parts.as_slice(), [Node::Text(t)] if t.value == "[asciinema::monokai]"));
    }

    #[test]
    fn invalid_shortcode_does_not_block_its_neighbours() {
        let (root, diagnostics) = transformed("See [asciinema:good1] and [asciinema:bad id] here");
        assert_eq!(
            html_values(&root),
            vec![
                "<div class=\"asciinema-embed\" data-cast-id=\"good1\" data-theme=\"monokai\" data-speed=\"1\"></div>"
            ]
        );
        let Node::Paragraph(p) = &root.children().unwrap()[0] else {
            panic!("expected paragraph");
        };
        assert!(matches!(&p.children[0], Node::Text(t) if t.value == "See "));
        assert!(
            matches!(&p.children[2], Node::Text(t) if t.value == " and [asciinema:bad id] here")
        );
        assert_eq!(diagnostics.errors.len(), 1);
        assert_eq!(diagnostics.errors[0].stage, "embeds");
    }
}
