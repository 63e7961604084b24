//! Markdown parsing utilities and extension hooks.

use crate::{BlogmarkError, RenderDiagnostics, SourceLocation};
use markdown::mdast::Node;
use markdown::message::{Message, Place};
use serde::{Deserialize, Serialize};

/// Parser options for building markdown-rs parse options.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Enable GitHub Flavored Markdown constructs.
    pub gfm: bool,
    /// Enable YAML frontmatter parsing.
    pub frontmatter: bool,
    /// Enable indented code blocks.
    pub code_indented: bool,
    /// Allow raw HTML nodes in the AST.
    #[serde(alias = "rawHtml")]
    pub raw_html: bool,
    /// Enable math constructs ($inline$ and $$block$$).
    pub math: bool,
    /// Enable MDX JSX and expression constructs.
    pub mdx: bool,
}

impl ParseOptions {
    /// Blog defaults: GFM on, trusted raw HTML passes through.
    pub const fn markdown() -> Self {
        Self {
            gfm: true,
            frontmatter: true,
            code_indented: true,
            raw_html: true,
            math: false,
            mdx: false,
        }
    }

    /// MDX-flavoured defaults (JSX and expressions enabled, raw HTML off).
    pub const fn mdx() -> Self {
        Self {
            gfm: true,
            frontmatter: true,
            code_indented: false,
            raw_html: false,
            math: false,
            mdx: true,
        }
    }

    /// Convert to markdown-rs `ParseOptions`.
    pub fn to_markdown(self) -> markdown::ParseOptions {
        let mut constructs = markdown::Constructs {
            frontmatter: self.frontmatter,
            code_indented: self.code_indented,
            html_flow: self.raw_html,
            html_text: self.raw_html,
            ..Default::default()
        };

        if self.gfm {
            constructs.gfm_autolink_literal = true;
            constructs.gfm_footnote_definition = true;
            constructs.gfm_label_start_footnote = true;
            constructs.gfm_strikethrough = true;
            constructs.gfm_table = true;
            constructs.gfm_task_list_item = true;
        }

        if self.mdx {
            constructs.mdx_expression_flow = true;
            constructs.mdx_expression_text = true;
            constructs.mdx_jsx_flow = true;
            constructs.mdx_jsx_text = true;
        }

        if self.math {
            constructs.math_flow = true;
            constructs.math_text = true;
        }

        markdown::ParseOptions {
            constructs,
            math_text_single_dollar: self.math,
            ..markdown::ParseOptions::default()
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::markdown()
    }
}

/// Trait for rewriting the parsed MDAST before it is converted to HTML.
pub trait AstTransform: Send + Sync {
    /// Mutate the parsed markdown AST in place, recording non-fatal findings.
    fn transform(&self, root: &mut Node, diagnostics: &mut RenderDiagnostics);
}

impl<F> AstTransform for F
where
    F: Fn(&mut Node, &mut RenderDiagnostics) + Send + Sync,
{
    fn transform(&self, root: &mut Node, diagnostics: &mut RenderDiagnostics) {
        (self)(root, diagnostics)
    }
}

/// Configurable parsing pipeline with optional AST transforms.
pub struct ParserPipeline {
    options: ParseOptions,
    ast_transforms: Vec<Box<dyn AstTransform>>,
}

impl ParserPipeline {
    /// Create a new pipeline from core parse options.
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            ast_transforms: Vec::new(),
        }
    }

    /// Add an AST transform.
    pub fn add_ast_transform<T: AstTransform + 'static>(&mut self, transform: T) {
        self.ast_transforms.push(Box::new(transform));
    }

    /// Returns the options this pipeline parses with.
    pub fn options(&self) -> ParseOptions {
        self.options
    }

    /// Parse markdown into MDAST and run every transform in order.
    pub fn parse(
        &self,
        input: &str,
        diagnostics: &mut RenderDiagnostics,
    ) -> Result<Node, BlogmarkError> {
        // markdown-rs options hold MDX callbacks that are not `Sync`; build them per call.
        let mut root = parse_mdast_with_options(input, &self.options.to_markdown())?;
        for transform in &self.ast_transforms {
            transform.transform(&mut root, diagnostics);
        }

        Ok(root)
    }
}

/// Parse markdown into an MDAST tree using core options.
pub fn parse_mdast(input: &str, options: &ParseOptions) -> Result<Node, BlogmarkError> {
    parse_mdast_with_options(input, &options.to_markdown())
}

/// Parse markdown into an MDAST tree using markdown-rs `ParseOptions`.
pub fn parse_mdast_with_options(
    input: &str,
    options: &markdown::ParseOptions,
) -> Result<Node, BlogmarkError> {
    markdown::to_mdast(input, options).map_err(|err| BlogmarkError::MarkdownAdapter {
        message: err.to_string(),
        location: message_location(&err),
    })
}

/// Converts markdown straight to HTML with no enrichment (degraded rendering).
pub fn to_basic_html(input: &str, options: &ParseOptions) -> Result<String, BlogmarkError> {
    let options = markdown::Options {
        parse: options.to_markdown(),
        compile: markdown::CompileOptions {
            allow_dangerous_html: true,
            ..markdown::CompileOptions::gfm()
        },
    };
    markdown::to_html_with_options(input, &options).map_err(|err| {
        BlogmarkError::MarkdownAdapter {
            message: err.to_string(),
            location: message_location(&err),
        }
    })
}

fn message_location(message: &Message) -> SourceLocation {
    match &message.place {
        Some(place) => match place.as_ref() {
            Place::Point(point) => SourceLocation::new(point.line, point.column),
            Place::Position(position) => {
                SourceLocation::new(position.start.line, position.start.column)
            }
        },
        None => SourceLocation::new(1, 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_headings_and_code() {
        let root = parse_mdast("## Title\n\n```rust\nfn main() {}\n```", &ParseOptions::default())
            .unwrap();
        let children = root.children().unwrap();
        assert!(matches!(children[0], Node::Heading(_)));
        assert!(matches!(children[1], Node::Code(_)));
    }

    #[test]
    fn raw_html_is_kept_by_default() {
        let root = parse_mdast("<div class=\"x\">hi</div>", &ParseOptions::default()).unwrap();
        let children = root.children().unwrap();
        assert!(matches!(children[0], Node::Html(_)));
    }

    #[test]
    fn transforms_run_in_order() {
        let mut pipeline = ParserPipeline::new(ParseOptions::default());
        pipeline.add_ast_transform(|root: &mut Node, _: &mut RenderDiagnostics| {
            if let Some(children) = root.children_mut() {
                children.clear();
            }
        });
        pipeline.add_ast_transform(|root: &mut Node, diagnostics: &mut RenderDiagnostics| {
            let empty = root.children().is_some_and(|c| c.is_empty());
            if empty {
                diagnostics.add_error_in("test", "cleared");
            }
        });

        let mut diagnostics = RenderDiagnostics::new();
        let root = pipeline.parse("# Hi", &mut diagnostics).unwrap();
        assert!(root.children().unwrap().is_empty());
        assert_eq!(diagnostics.errors.len(), 1);
    }

    #[test]
    fn parser_pipeline_is_thread_safe() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ParserPipeline>();
        assert_send_sync::<ParseOptions>();
    }

    #[test]
    fn basic_html_conversion() {
        let html = to_basic_html("## A\n\n<span>raw</span>", &ParseOptions::default()).unwrap();
        assert!(html.contains("<h2>A</h2>"));
        assert!(html.contains("<span>raw</span>"));
    }

    #[test]
    fn unclosed_mdx_expression_is_an_error() {
        let err = parse_mdast("a {b", &ParseOptions::mdx()).unwrap_err();
        assert!(matches!(err, BlogmarkError::MarkdownAdapter { .. }));
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: ParseOptions = serde_json::from_str(r#"{"rawHtml": false}"#).unwrap();
        assert!(!options.raw_html);
        assert!(options.gfm);
    }
}
