use super::{EnrichError, EnrichmentPass, NodeVisitor, Visit, walk};
use crate::document::{AttrKey, DataAttr, Document, NodeId};
use blogmark_core::{RenderDiagnostics, RenderWarning};

/// Inline SVG shown in place of an image with no source.
pub const MISSING_IMAGE_PLACEHOLDER: &str = "data:image/svg+xml,%3Csvg xmlns=\"http://www.w3.org/2000/svg\" width=\"400\" height=\"300\"%3E%3Crect fill=\"%23ddd\" width=\"400\" height=\"300\"/%3E%3Ctext x=\"50%25\" y=\"50%25\" text-anchor=\"middle\" fill=\"%23999\"%3EImage not found%3C/text%3E%3C/svg%3E";

const MISSING_IMAGE_ALT: &str = "Missing image";
const CLOUDINARY_HOST: &str = "cloudinary.com";

/// Where an image is served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// Site-relative or relative path, handed to the host's image optimizer.
    Local,
    /// Absolute `http(s)` or protocol-relative URL.
    External,
    /// External URL on the Cloudinary CDN.
    Cloudinary,
}

/// Classifies an image source by its prefix.
pub fn classify_image_source(src: &str) -> ImageSource {
    let external = ["http://", "https://", "//"]
        .iter()
        .any(|prefix| src.starts_with(prefix));
    if external {
        if src.contains(CLOUDINARY_HOST) {
            ImageSource::Cloudinary
        } else {
            ImageSource::External
        }
    } else {
        ImageSource::Local
    }
}

/// Rewrites `img` elements for lazy loading and host-side optimization.
///
/// Local images lose `src` in favour of `data-src` plus `data-next-image`
/// and placeholder dimensions; external images get `loading="lazy"`; an
/// image without a source becomes an inline placeholder.
#[derive(Debug, Clone, Copy)]
pub struct ImageHandler {
    width: u32,
    height: u32,
}

impl ImageHandler {
    /// Local images get `width` x `height` placeholder dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for ImageHandler {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

impl NodeVisitor for ImageHandler {
    fn visit(
        &mut self,
        doc: &mut Document,
        id: NodeId,
        diagnostics: &mut RenderDiagnostics,
    ) -> Result<Visit, EnrichError> {
        if !doc.as_element(id).is_some_and(|el| el.tag == "img") {
            return Ok(Visit::Continue);
        }
        let attrs = &mut doc
            .as_element_mut(id)
            .ok_or(EnrichError::ElementExpected(id))?
            .attrs;

        let src = attrs
            .get(&AttrKey::Src)
            .filter(|src| !src.trim().is_empty())
            .map(str::to_string);
        let alt = attrs.get(&AttrKey::Alt).unwrap_or_default().to_string();

        let Some(src) = src else {
            log::warn!("Image found without src attribute");
            diagnostics.add_warning(RenderWarning::MissingImageSource);
            attrs.set(AttrKey::Src, MISSING_IMAGE_PLACEHOLDER);
            attrs.set(AttrKey::Alt, MISSING_IMAGE_ALT);
            attrs.set(AttrKey::Data(DataAttr::Error), "missing-src");
            return Ok(Visit::Skip);
        };

        if alt.is_empty() {
            log::warn!("Image missing alt text: {}", src);
            diagnostics.add_warning(RenderWarning::MissingAltText { src: src.clone() });
        }
        attrs.set(AttrKey::Alt, alt);

        match classify_image_source(&src) {
            ImageSource::Local => {
                attrs.remove(&AttrKey::Src);
                attrs.set(AttrKey::Data(DataAttr::NextImage), "true");
                attrs.set(AttrKey::Data(DataAttr::Src), src);
                attrs.set(AttrKey::Loading, "lazy");
                attrs.set(AttrKey::Width, self.width.to_string());
                attrs.set(AttrKey::Height, self.height.to_string());
            }
            ImageSource::External => {
                attrs.set(AttrKey::Loading, "lazy");
            }
            ImageSource::Cloudinary => {
                attrs.set(AttrKey::Loading, "lazy");
                attrs.set(AttrKey::Data(DataAttr::Cloudinary), "true");
            }
        }
        Ok(Visit::Skip)
    }

    fn recover(&mut self, doc: &mut Document, id: NodeId, _error: &EnrichError) {
        if let Some(element) = doc.as_element_mut(id) {
            element
                .attrs
                .set(AttrKey::Data(DataAttr::Error), "processing-failed");
        }
    }
}

impl EnrichmentPass for ImageHandler {
    fn name(&self) -> &'static str {
        "images"
    }

    fn apply(
        &self,
        mut doc: Document,
        diagnostics: &mut RenderDiagnostics,
    ) -> Result<Document, EnrichError> {
        let mut handler = *self;
        walk(&mut doc, self.name(), &mut handler, diagnostics)?;
        Ok(doc)
    }
}
