//! PNG export of whiteboard documents.

use inkboard_core::Document;
use thiserror::Error;
use tiny_skia::Pixmap;

use crate::painter::Painter;

/// Suggested filename for the download sink.
pub const EXPORT_FILE_NAME: &str = "canvas-notes.png";

/// Render errors surfaced to the caller. Everything else in this crate
/// degrades silently.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Surface unavailable: {0}")]
    Surface(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

pub type RenderResult<T> = Result<T, RenderError>;

impl Painter {
    /// Rasterize the document onto an offscreen surface and encode it as
    /// PNG bytes.
    ///
    /// Opaque white background, elements only (no grid, no selection, no
    /// overlay). Image elements are decoded before the final pass so the
    /// export never ships skipped bitmaps.
    pub fn export_png(
        &mut self,
        document: &Document,
        width: u32,
        height: u32,
    ) -> RenderResult<Vec<u8>> {
        let mut pixmap = Pixmap::new(width, height)
            .ok_or_else(|| RenderError::Surface(format!("cannot allocate {width}x{height}")))?;

        self.render_elements(&mut pixmap, document);
        if self.process_pending(document) > 0 {
            self.render_elements(&mut pixmap, document);
        }

        pixmap
            .encode_png()
            .map_err(|e| RenderError::Encode(e.to_string()))
    }
}

/// One-shot export with a fresh painter, for headless callers.
pub fn export_png(document: &Document, width: u32, height: u32) -> RenderResult<Vec<u8>> {
    Painter::new().export_png(document, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkboard_core::{image_data, Element, ElementKind, Rgba, StyleDefaults, Theme};
    use kurbo::Point;

    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    fn rectangle_doc() -> Document {
        let style = StyleDefaults::for_theme(Theme::Light);
        let mut el = Element::new(ElementKind::Rectangle, Point::new(10.0, 10.0), &style);
        el.width = 50.0;
        el.height = 30.0;
        el.stroke = Rgba::black();
        Document::new().add(el)
    }

    #[test]
    fn test_export_produces_png_bytes() {
        let bytes = export_png(&rectangle_doc(), 100, 100).unwrap();
        assert!(bytes.len() > PNG_MAGIC.len());
        assert_eq!(&bytes[..8], &PNG_MAGIC);
    }

    #[test]
    fn test_export_is_deterministic_for_a_document() {
        let doc = rectangle_doc();
        let first = export_png(&doc, 120, 90).unwrap();
        let second = export_png(&doc, 120, 90).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_export_differs_between_seeds() {
        let doc = rectangle_doc();
        // Re-rolling just the seed must change the sketch jitter.
        let mut el = doc.elements()[0].clone();
        el.seed = el.seed.wrapping_add(1);
        let reseeded = Document::new().add(el);

        let first = export_png(&doc, 100, 100).unwrap();
        let second = export_png(&reseeded, 100, 100).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_zero_size_surface_is_an_error() {
        let err = export_png(&rectangle_doc(), 0, 100).unwrap_err();
        assert!(matches!(err, RenderError::Surface(_)));
    }

    #[test]
    fn test_export_includes_image_elements() {
        let mut bitmap = tiny_skia::Pixmap::new(2, 2).unwrap();
        bitmap.fill(tiny_skia::Color::from_rgba8(0, 128, 255, 255));
        let src = image_data::encode_data_url(&bitmap.encode_png().unwrap()).unwrap();

        let style = StyleDefaults::for_theme(Theme::Light);
        let mut el = Element::new(ElementKind::Image, Point::new(5.0, 5.0), &style);
        el.width = 40.0;
        el.height = 40.0;
        el.src = Some(src);
        let with_image = Document::new().add(el);

        let exported = export_png(&with_image, 60, 60).unwrap();
        let blank = export_png(&Document::new(), 60, 60).unwrap();
        assert_ne!(exported, blank);
    }

    #[test]
    fn test_empty_document_exports_plain_white() {
        let bytes = export_png(&Document::new(), 50, 50).unwrap();
        assert_eq!(&bytes[..8], &PNG_MAGIC);
        let mut decoded = Pixmap::decode_png(&bytes).unwrap();
        assert!(decoded
            .pixels_mut()
            .iter()
            .all(|p| p.red() == 255 && p.green() == 255 && p.blue() == 255));
    }
}
