//! Glyph rasterization for text elements.
//!
//! Text draws through whatever sans font the host system provides; when
//! none can be found the rasterizer falls back to a placeholder box so a
//! document full of text still renders something meaningful.

use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont};
use inkboard_core::Rgba;
use kurbo::Point;
use tiny_skia::{Paint, PathBuilder, Pixmap, PremultipliedColorU8, Stroke, Transform};

/// Overrides the font probe with an explicit file path.
const FONT_ENV: &str = "INKBOARD_FONT";

/// Common sans-serif locations, most specific platforms first.
const FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Advance estimate per character when measuring without a font.
const FALLBACK_ADVANCE: f32 = 0.55;

pub(crate) struct TextRasterizer {
    font: Option<FontArc>,
}

impl TextRasterizer {
    pub(crate) fn new() -> Self {
        let font = load_font();
        if font.is_none() {
            log::warn!("No usable system font found; text elements render as placeholder boxes");
        }
        Self { font }
    }

    /// Draw a single line of text with its baseline starting at `origin`,
    /// in surface pixels.
    pub(crate) fn draw(
        &self,
        pixmap: &mut Pixmap,
        text: &str,
        origin: Point,
        px_size: f32,
        color: Rgba,
    ) {
        if text.is_empty() || px_size <= 0.0 {
            return;
        }
        let Some(font) = &self.font else {
            self.draw_placeholder(pixmap, text, origin, px_size, color);
            return;
        };

        let scaled = font.as_scaled(PxScale::from(px_size));
        let baseline = origin.y as f32;
        let mut caret = origin.x as f32;
        let mut prev: Option<GlyphId> = None;

        for ch in text.chars() {
            if ch.is_control() {
                continue;
            }
            let gid = font.glyph_id(ch);
            if let Some(prev) = prev {
                caret += scaled.kern(prev, gid);
            }
            let glyph = gid.with_scale_and_position(px_size, ab_glyph::point(caret, baseline));
            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    blend_pixel(
                        pixmap,
                        bounds.min.x as i32 + gx as i32,
                        bounds.min.y as i32 + gy as i32,
                        color,
                        coverage,
                    );
                });
            }
            caret += scaled.h_advance(gid);
            prev = Some(gid);
        }
    }

    /// Advance width of a line at the given pixel size.
    pub(crate) fn measure(&self, text: &str, px_size: f32) -> f32 {
        match &self.font {
            Some(font) => {
                let scaled = font.as_scaled(PxScale::from(px_size));
                let mut width = 0.0;
                let mut prev: Option<GlyphId> = None;
                for ch in text.chars() {
                    if ch.is_control() {
                        continue;
                    }
                    let gid = font.glyph_id(ch);
                    if let Some(prev) = prev {
                        width += scaled.kern(prev, gid);
                    }
                    width += scaled.h_advance(gid);
                    prev = Some(gid);
                }
                width
            }
            None => text.chars().count() as f32 * px_size * FALLBACK_ADVANCE,
        }
    }

    /// Outline box roughly where the text would sit.
    fn draw_placeholder(
        &self,
        pixmap: &mut Pixmap,
        text: &str,
        origin: Point,
        px_size: f32,
        color: Rgba,
    ) {
        let width = self.measure(text, px_size).max(px_size * 0.5);
        let Some(rect) = tiny_skia::Rect::from_xywh(
            origin.x as f32,
            origin.y as f32 - px_size * 0.8,
            width,
            px_size,
        ) else {
            return;
        };
        let path = PathBuilder::from_rect(rect);
        let mut paint = Paint::default();
        paint.set_color_rgba8(color.r, color.g, color.b, color.a);
        paint.anti_alias = true;
        pixmap.stroke_path(
            &path,
            &paint,
            &Stroke {
                width: 1.0,
                ..Stroke::default()
            },
            Transform::identity(),
            None,
        );
    }
}

fn load_font() -> Option<FontArc> {
    let candidates = std::env::var(FONT_ENV)
        .ok()
        .into_iter()
        .chain(FONT_PATHS.iter().map(|p| (*p).to_string()));
    for path in candidates {
        let Ok(bytes) = std::fs::read(&path) else {
            continue;
        };
        match FontArc::try_from_vec(bytes) {
            Ok(font) => {
                log::debug!("Loaded text font from {}", path);
                return Some(font);
            }
            Err(e) => log::debug!("Skipping font {}: {}", path, e),
        }
    }
    None
}

/// Source-over blend of a straight-alpha color into the premultiplied
/// surface, weighted by glyph coverage.
fn blend_pixel(pixmap: &mut Pixmap, x: i32, y: i32, color: Rgba, coverage: f32) {
    if coverage <= 0.0 {
        return;
    }
    let width = pixmap.width() as i32;
    let height = pixmap.height() as i32;
    if x < 0 || y < 0 || x >= width || y >= height {
        return;
    }
    let idx = (y * width + x) as usize;
    let src_a = coverage.min(1.0) * (color.a as f32 / 255.0);
    let inv = 1.0 - src_a;

    let pixels = pixmap.pixels_mut();
    let dst = pixels[idx];
    let a = (255.0 * src_a + dst.alpha() as f32 * inv).round() as u8;
    let r = ((color.r as f32 * src_a + dst.red() as f32 * inv).round() as u8).min(a);
    let g = ((color.g as f32 * src_a + dst.green() as f32 * inv).round() as u8).min(a);
    let b = ((color.b as f32 * src_a + dst.blue() as f32 * inv).round() as u8).min(a);
    if let Some(out) = PremultipliedColorU8::from_rgba(r, g, b, a) {
        pixels[idx] = out;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white_pixmap(w: u32, h: u32) -> Pixmap {
        let mut pixmap = Pixmap::new(w, h).unwrap();
        pixmap.fill(tiny_skia::Color::WHITE);
        pixmap
    }

    #[test]
    fn test_measure_grows_with_text() {
        let rasterizer = TextRasterizer::new();
        let short = rasterizer.measure("Hi", 20.0);
        let long = rasterizer.measure("Hi there", 20.0);
        assert!(long > short);
        assert!(short > 0.0);
    }

    #[test]
    fn test_draw_marks_pixels() {
        // Holds with or without a system font: glyphs and the placeholder
        // box both touch the surface.
        let rasterizer = TextRasterizer::new();
        let mut pixmap = white_pixmap(120, 40);
        let before = pixmap.data().to_vec();
        rasterizer.draw(&mut pixmap, "Ag", Point::new(5.0, 30.0), 20.0, Rgba::black());
        assert_ne!(pixmap.data(), before.as_slice());
    }

    #[test]
    fn test_empty_text_draws_nothing() {
        let rasterizer = TextRasterizer::new();
        let mut pixmap = white_pixmap(40, 40);
        let before = pixmap.data().to_vec();
        rasterizer.draw(&mut pixmap, "", Point::new(5.0, 30.0), 20.0, Rgba::black());
        assert_eq!(pixmap.data(), before.as_slice());
    }

    #[test]
    fn test_blend_pixel_ignores_out_of_bounds() {
        let mut pixmap = white_pixmap(4, 4);
        blend_pixel(&mut pixmap, -1, 2, Rgba::black(), 1.0);
        blend_pixel(&mut pixmap, 2, 100, Rgba::black(), 1.0);
        blend_pixel(&mut pixmap, 1, 1, Rgba::black(), 1.0);
        let px = pixmap.pixels_mut()[1 * 4 + 1];
        assert_eq!(px.red(), 0);
        assert_eq!(px.alpha(), 255);
    }
}
