//! The enhancement pipeline.
//!
//! `parse → embed transform → document tree → enrichment passes → HTML → outline`.
//! Rendering never fails: when enrichment breaks the pipeline falls back to a
//! plain markdown conversion, and when that breaks too it emits an error block
//! holding the escaped source.

use crate::document::Document;
use crate::enrich::{
    DiagramPlaceholders, EnrichmentPass, HeadingAnchors, HeadingIds, ImageHandler, run_passes,
};
use crate::options::Options;
use crate::outline::{HeadingRecord, extract_headings};
use crate::renderer::{mdast_to_document, to_html};
use crate::transform::AsciinemaTransform;
use blogmark_core::{
    BlogmarkError, FrontMatter, ParserPipeline, ReadingTimeResult, RenderDiagnostics, estimate,
    to_basic_html,
};
use serde::{Deserialize, Serialize};

/// Which rung of the degradation ladder produced the HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RenderMode {
    /// Full pipeline.
    Enriched,
    /// Plain markdown conversion, no enrichment.
    Basic,
    /// Inline error block with the escaped source.
    ErrorBlock,
}

/// Output of [`Pipeline::render`].
#[derive(Debug, Clone)]
pub struct RenderedContent {
    /// Rendered HTML, trusted markup.
    pub html: String,
    /// Level 2 and 3 headings of `html`.
    pub headings: Vec<HeadingRecord>,
    /// How `html` was produced.
    pub mode: RenderMode,
    /// Warnings and recovered errors.
    pub diagnostics: RenderDiagnostics,
}

/// Front-matter plus the computed reading time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMeta {
    /// Author-supplied metadata.
    #[serde(flatten)]
    pub front_matter: FrontMatter,
    /// Estimated reading time of the body.
    pub reading_time: ReadingTimeResult,
}

/// A post ready for a page template.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedPost {
    /// Metadata.
    pub meta: PostMeta,
    /// Rendered body.
    pub content_html: String,
    /// Outline of the body.
    pub headings: Vec<HeadingRecord>,
    /// Findings collected while rendering.
    #[serde(skip)]
    pub diagnostics: RenderDiagnostics,
}

/// A configured pipeline. Holds no per-document state and can be shared across threads.
pub struct Pipeline {
    options: Options,
    parser: ParserPipeline,
    passes: Vec<Box<dyn EnrichmentPass>>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

impl Pipeline {
    /// Builds the pipeline the options describe.
    pub fn new(options: Options) -> Self {
        let mut passes: Vec<Box<dyn EnrichmentPass>> = Vec::new();
        if options.enable_heading_ids {
            passes.push(Box::new(HeadingIds));
        }
        if options.enable_heading_anchors {
            passes.push(Box::new(HeadingAnchors::new(options.anchor_class.clone())));
        }
        if options.enable_image_handling {
            passes.push(Box::new(ImageHandler::new(
                options.placeholder_width,
                options.placeholder_height,
            )));
        }
        if options.enable_diagrams {
            passes.push(Box::new(DiagramPlaceholders));
        }
        Self::with_passes(options, passes)
    }

    /// Builds a pipeline with an explicit pass list, ignoring the pass switches in `options`.
    pub fn with_passes(options: Options, passes: Vec<Box<dyn EnrichmentPass>>) -> Self {
        let mut parser = ParserPipeline::new(options.parse);
        if options.enable_embeds {
            parser.add_ast_transform(AsciinemaTransform);
        }
        Self {
            options,
            parser,
            passes,
        }
    }

    /// The options this pipeline was built from.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Names of the enrichment passes, in run order.
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }

    /// Parses and enriches `body` into a document tree.
    pub fn document(
        &self,
        body: &str,
        diagnostics: &mut RenderDiagnostics,
    ) -> Result<Document, BlogmarkError> {
        let root = self.parser.parse(body, diagnostics)?;
        let doc = mdast_to_document(&root);
        Ok(run_passes(&self.passes, doc, diagnostics)?)
    }

    /// Renders `body`, walking down the degradation ladder on failure.
    pub fn render(&self, body: &str) -> RenderedContent {
        let mut diagnostics = RenderDiagnostics::new();
        let (html, mode) = match self.document(body, &mut diagnostics) {
            Ok(doc) => (to_html(&doc), RenderMode::Enriched),
            Err(err) => {
                log::error!("Enhanced rendering failed, using basic conversion: {}", err);
                diagnostics.add_error_in("pipeline", err.to_string());
                match to_basic_html(body, &self.options.parse) {
                    Ok(html) => (html, RenderMode::Basic),
                    Err(err) => {
                        log::error!("Basic conversion failed, emitting error block: {}", err);
                        diagnostics.add_error_in("basic", err.to_string());
                        (error_block(body), RenderMode::ErrorBlock)
                    }
                }
            }
        };
        let headings = extract_headings(&html);
        RenderedContent {
            html,
            headings,
            mode,
            diagnostics,
        }
    }

    /// Renders a post body and attaches reading time to its metadata.
    pub fn enhance(&self, front_matter: FrontMatter, body: &str) -> EnhancedPost {
        let reading_time = estimate(body);
        let rendered = self.render(body);
        EnhancedPost {
            meta: PostMeta {
                front_matter,
                reading_time,
            },
            content_html: rendered.html,
            headings: rendered.headings,
            diagnostics: rendered.diagnostics,
        }
    }
}

/// Last-resort output: the escaped source inside a visible notice.
pub fn error_block(raw: &str) -> String {
    format!(
        "<div class=\"render-error\"><p><strong>Error:</strong> This content could not be rendered.</p><pre>{}</pre></div>",
        html_escape::encode_text(raw)
    )
}

/// Renders `body` with default options.
pub fn render_markdown(body: &str) -> RenderedContent {
    Pipeline::default().render(body)
}

/// Enhances a post with default options.
pub fn enhance_post(front_matter: FrontMatter, body: &str) -> EnhancedPost {
    Pipeline::default().enhance(front_matter, body)
}
