//! Content and overlay passes over CPU pixmaps.
//!
//! The content pass clears the surface, lays down the dot grid, then
//! draws every document element in z-order under the viewport transform.
//! The overlay pass draws only the laser trail and runs on its own clock;
//! it never forces a content repaint.

use std::collections::HashMap;

use inkboard_core::{
    image_data, Document, Element, ElementId, ElementKind, LaserTrail, Rgba, Theme, Viewport,
};
use kurbo::{BezPath, PathEl, Point, Shape};
use tiny_skia::{
    FillRule, FilterQuality, Mask, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, StrokeDash,
    Transform,
};

use crate::outline::{self, OutlineOptions};
use crate::sketch;
use crate::text::TextRasterizer;

/// Grid spacing in document units.
const GRID_GAP: f64 = 20.0;
const GRID_DOT_RADIUS: f64 = 1.0;
/// Below this on-screen spacing the dots smear together; skip the grid.
const GRID_MIN_SPACING_PX: f64 = 4.0;

/// Arrow head wing length in screen pixels, fixed across zoom levels.
const ARROW_HEAD_LENGTH: f64 = 20.0;

const LASER_GLOW: Rgba = Rgba::new(255, 0, 0, 128);
const LASER_CORE: Rgba = Rgba::new(255, 255, 255, 204);

enum CachedImage {
    Decoded(Pixmap),
    /// Source failed to decode; drawn as a placeholder, never retried.
    Failed,
}

/// Rasterizes documents onto [`Pixmap`] surfaces.
///
/// Holds the decoded-image cache and the glyph rasterizer across frames;
/// everything else is handed in per call.
pub struct Painter {
    images: HashMap<ElementId, CachedImage>,
    pending: Vec<ElementId>,
    text: TextRasterizer,
}

impl Default for Painter {
    fn default() -> Self {
        Self::new()
    }
}

impl Painter {
    pub fn new() -> Self {
        Self {
            images: HashMap::new(),
            pending: Vec::new(),
            text: TextRasterizer::new(),
        }
    }

    /// Content pass: background, grid, then elements in z-order.
    ///
    /// Image elements whose bitmap is not yet decoded are skipped and
    /// recorded; drive [`Painter::process_pending`] afterwards and redraw
    /// once if it reports progress.
    pub fn render_content(
        &mut self,
        pixmap: &mut Pixmap,
        document: &Document,
        viewport: &Viewport,
        theme: Theme,
    ) {
        pixmap.fill(background(theme));
        self.pending.clear();
        self.draw_grid(pixmap, viewport, theme);
        for element in document.elements() {
            self.draw_element(pixmap, element, viewport);
        }
    }

    /// Element-only pass on a white background, used for export.
    pub fn render_elements(&mut self, pixmap: &mut Pixmap, document: &Document) {
        pixmap.fill(tiny_skia::Color::WHITE);
        self.pending.clear();
        let viewport = Viewport::new();
        for element in document.elements() {
            self.draw_element(pixmap, element, &viewport);
        }
    }

    /// Overlay pass: just the laser trail on a transparent surface.
    ///
    /// Expired points are pruned by the session tick; an empty or
    /// single-point trail leaves the overlay blank.
    pub fn render_overlay(&self, pixmap: &mut Pixmap, trail: &LaserTrail, viewport: &Viewport) {
        pixmap.fill(tiny_skia::Color::TRANSPARENT);
        if !trail.renderable() {
            return;
        }

        let points: Vec<Point> = trail
            .points()
            .iter()
            .map(|p| viewport.doc_to_screen(p.position))
            .collect();

        // Same ribbon twice: a wide translucent red glow under a narrow
        // near-white core reads as a laser dot trail.
        let glow_opts = OutlineOptions::laser();
        let core_opts = OutlineOptions {
            size: glow_opts.size * 0.5,
            ..OutlineOptions::laser()
        };
        for (opts, color) in [(glow_opts, LASER_GLOW), (core_opts, LASER_CORE)] {
            let ribbon = outline::stroke_outline(&points, Some(0.5), &opts);
            let Some(path) = to_skia_path(&outline::outline_path(&ribbon)) else {
                continue;
            };
            pixmap.fill_path(
                &path,
                &paint_for(color),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    /// Number of image elements skipped by the last content pass.
    pub fn pending_decodes(&self) -> usize {
        self.pending.len()
    }

    /// Decode every image source recorded by the last pass.
    ///
    /// Returns how many entered the cache (decoded or marked failed); a
    /// nonzero return means one catch-up redraw will show them.
    pub fn process_pending(&mut self, document: &Document) -> usize {
        let ids = std::mem::take(&mut self.pending);
        let mut resolved = 0;
        for id in ids {
            if self.images.contains_key(&id) {
                continue;
            }
            let Some(src) = document.get(id).and_then(|el| el.src.as_deref()) else {
                continue;
            };
            let entry = match image_data::decode_data_url(src).and_then(|bytes| decode_image(&bytes))
            {
                Some(bitmap) => CachedImage::Decoded(bitmap),
                None => {
                    log::warn!("Image element {} failed to decode", id);
                    CachedImage::Failed
                }
            };
            self.images.insert(id, entry);
            resolved += 1;
        }
        resolved
    }

    fn draw_element(&mut self, pixmap: &mut Pixmap, element: &Element, viewport: &Viewport) {
        match element.kind {
            ElementKind::Rectangle | ElementKind::Ellipse | ElementKind::Diamond => {
                self.draw_shape(pixmap, element, viewport)
            }
            ElementKind::Line => self.draw_line(pixmap, element, viewport),
            ElementKind::Arrow => self.draw_arrow(pixmap, element, viewport),
            ElementKind::Freehand => self.draw_freehand(pixmap, element, viewport),
            ElementKind::Text => self.draw_text(pixmap, element, viewport),
            ElementKind::Image => self.draw_image(pixmap, element, viewport),
        }
    }

    /// Closed shapes: optional fill first, sketchy stroke on top.
    fn draw_shape(&self, pixmap: &mut Pixmap, element: &Element, viewport: &Viewport) {
        let Some(path) = base_path(element) else {
            return;
        };
        let ts = to_transform(viewport);
        let zoom = viewport.scale;

        if let Some(fill) = element.fill {
            let color = fill.with_opacity(element.opacity);
            match sketch::pattern_lines(element.bounds(), element.fill_pattern) {
                None => {
                    let fill_path =
                        sketch::roughen(&path, element.roughness * 0.3, zoom, element.seed, 0);
                    if let Some(skia_path) = to_skia_path(&fill_path) {
                        pixmap.fill_path(
                            &skia_path,
                            &paint_for(color),
                            FillRule::Winding,
                            ts,
                            None,
                        );
                    }
                }
                Some(lines) => {
                    let lines =
                        sketch::roughen(&lines, element.roughness * 0.3, zoom, element.seed, 0);
                    let mask = silhouette_mask(pixmap, element, &path, ts);
                    if let Some(skia_lines) = to_skia_path(&lines) {
                        let stroke = Stroke {
                            width: (element.stroke_width * 0.5).max(0.5) as f32,
                            ..Stroke::default()
                        };
                        pixmap.stroke_path(
                            &skia_lines,
                            &paint_for(color),
                            &stroke,
                            ts,
                            mask.as_ref(),
                        );
                    }
                }
            }
        }

        self.stroke_sketchy(pixmap, &path, element, viewport, true);
    }

    fn draw_line(&self, pixmap: &mut Pixmap, element: &Element, viewport: &Viewport) {
        if let Some(path) = base_path(element) {
            self.stroke_sketchy(pixmap, &path, element, viewport, true);
        }
    }

    fn draw_arrow(&self, pixmap: &mut Pixmap, element: &Element, viewport: &Viewport) {
        let Some(shaft) = base_path(element) else {
            return;
        };
        self.stroke_sketchy(pixmap, &shaft, element, viewport, true);

        if element.width.abs() + element.height.abs() < f64::EPSILON {
            return;
        }
        // Two wings at +/-30 degrees off the shaft, sized in screen pixels
        // so heads stay readable at any zoom.
        let len = ARROW_HEAD_LENGTH / viewport.scale;
        let angle = element.height.atan2(element.width);
        let end = Point::new(element.x + element.width, element.y + element.height);
        for side in [-1.0, 1.0] {
            let theta = angle + side * std::f64::consts::FRAC_PI_6;
            let wing = Point::new(end.x - len * theta.cos(), end.y - len * theta.sin());
            let mut path = BezPath::new();
            path.move_to(end);
            path.line_to(wing);
            // Heads ignore the dash pattern, like the shaft's joints would.
            self.stroke_sketchy(pixmap, &path, element, viewport, false);
        }
    }

    fn draw_freehand(&self, pixmap: &mut Pixmap, element: &Element, viewport: &Viewport) {
        if element.points.is_empty() {
            return;
        }
        let opts = OutlineOptions::freehand(element.stroke_width);
        let ribbon = outline::stroke_outline(&element.points, None, &opts);
        let Some(path) = to_skia_path(&outline::outline_path(&ribbon)) else {
            return;
        };
        pixmap.fill_path(
            &path,
            &paint_for(element.stroke.with_opacity(element.opacity)),
            FillRule::Winding,
            to_transform(viewport),
            None,
        );
    }

    fn draw_text(&self, pixmap: &mut Pixmap, element: &Element, viewport: &Viewport) {
        let Some(text) = element.text.as_deref() else {
            return;
        };
        if text.is_empty() {
            return;
        }
        let px_size = ((element.stroke_width * 10.0 + 10.0) * viewport.scale) as f32;
        let origin = viewport.doc_to_screen(Point::new(element.x, element.y));
        self.text.draw(
            pixmap,
            text,
            origin,
            px_size,
            element.stroke.with_opacity(element.opacity),
        );
    }

    fn draw_image(&mut self, pixmap: &mut Pixmap, element: &Element, viewport: &Viewport) {
        let ts = to_transform(viewport);
        if element.src.is_none() {
            self.draw_image_placeholder(pixmap, element, ts);
            return;
        }
        match self.images.get(&element.id) {
            Some(CachedImage::Decoded(bitmap)) => {
                let bounds = element.bounds();
                if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
                    return;
                }
                let sx = bounds.width() / bitmap.width() as f64;
                let sy = bounds.height() / bitmap.height() as f64;
                let transform = ts
                    .pre_translate(bounds.x0 as f32, bounds.y0 as f32)
                    .pre_scale(sx as f32, sy as f32);
                let paint = PixmapPaint {
                    opacity: ((element.opacity / 100.0).clamp(0.0, 1.0)) as f32,
                    quality: FilterQuality::Bilinear,
                    ..PixmapPaint::default()
                };
                pixmap.draw_pixmap(0, 0, bitmap.as_ref(), &paint, transform, None);
            }
            Some(CachedImage::Failed) => self.draw_image_placeholder(pixmap, element, ts),
            None => self.pending.push(element.id),
        }
    }

    /// Gray box with an X for images that have no usable bitmap.
    fn draw_image_placeholder(&self, pixmap: &mut Pixmap, element: &Element, ts: Transform) {
        let bounds = element.bounds();
        if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            return;
        }
        let Some(box_path) = to_skia_path(&bounds.to_path(0.1)) else {
            return;
        };
        pixmap.fill_path(
            &box_path,
            &paint_for(Rgba::new(200, 200, 200, 255).with_opacity(element.opacity)),
            FillRule::Winding,
            ts,
            None,
        );

        let mut cross = PathBuilder::new();
        cross.move_to(bounds.x0 as f32, bounds.y0 as f32);
        cross.line_to(bounds.x1 as f32, bounds.y1 as f32);
        cross.move_to(bounds.x1 as f32, bounds.y0 as f32);
        cross.line_to(bounds.x0 as f32, bounds.y1 as f32);
        let stroke = Stroke {
            width: 2.0,
            ..Stroke::default()
        };
        if let Some(cross) = cross.finish() {
            pixmap.stroke_path(
                &cross,
                &paint_for(Rgba::new(150, 150, 150, 255).with_opacity(element.opacity)),
                &stroke,
                ts,
                None,
            );
        }
        pixmap.stroke_path(
            &box_path,
            &paint_for(Rgba::new(100, 100, 100, 255).with_opacity(element.opacity)),
            &stroke,
            ts,
            None,
        );
    }

    /// Jittered stroke, doubled when roughness is on so the lines read as
    /// hand-drawn. Clean single stroke at roughness zero.
    fn stroke_sketchy(
        &self,
        pixmap: &mut Pixmap,
        path: &BezPath,
        element: &Element,
        viewport: &Viewport,
        dashed: bool,
    ) {
        let paint = paint_for(element.stroke.with_opacity(element.opacity));
        let mut stroke = Stroke {
            width: element.stroke_width as f32,
            ..Stroke::default()
        };
        if dashed {
            if let Some(intervals) = sketch::dash_intervals(element.stroke_style) {
                stroke.dash = StrokeDash::new(intervals, 0.0);
            }
        }
        let ts = to_transform(viewport);

        if element.roughness > 0.0 {
            for pass in 0..2 {
                let rough =
                    sketch::roughen(path, element.roughness, viewport.scale, element.seed, pass);
                if let Some(skia_path) = to_skia_path(&rough) {
                    pixmap.stroke_path(&skia_path, &paint, &stroke, ts, None);
                }
            }
        } else if let Some(skia_path) = to_skia_path(path) {
            pixmap.stroke_path(&skia_path, &paint, &stroke, ts, None);
        }
    }

    /// Dot grid fixed in document space; scales with zoom like the page
    /// itself. Lighter on dark backgrounds.
    fn draw_grid(&self, pixmap: &mut Pixmap, viewport: &Viewport, theme: Theme) {
        if GRID_GAP * viewport.scale < GRID_MIN_SPACING_PX {
            return;
        }
        let top_left = viewport.screen_to_doc(Point::ZERO);
        let bottom_right =
            viewport.screen_to_doc(Point::new(pixmap.width() as f64, pixmap.height() as f64));
        let start_x = (top_left.x / GRID_GAP).floor() * GRID_GAP;
        let start_y = (top_left.y / GRID_GAP).floor() * GRID_GAP;

        let mut pb = PathBuilder::new();
        let mut x = start_x;
        while x <= bottom_right.x + GRID_GAP {
            let mut y = start_y;
            while y <= bottom_right.y + GRID_GAP {
                pb.push_circle(x as f32, y as f32, GRID_DOT_RADIUS as f32);
                y += GRID_GAP;
            }
            x += GRID_GAP;
        }
        let Some(dots) = pb.finish() else {
            return;
        };

        let mut paint = Paint::default();
        paint.anti_alias = true;
        match theme {
            Theme::Dark => paint.set_color_rgba8(255, 255, 255, 13),
            Theme::Light => paint.set_color_rgba8(0, 0, 0, 26),
        }
        pixmap.fill_path(&dots, &paint, FillRule::Winding, to_transform(viewport), None);
    }
}

/// Geometry for an element's silhouette, in document space.
///
/// Lines and arrows use the raw extents rather than normalized bounds;
/// a drag up and to the left must keep its direction.
fn base_path(element: &Element) -> Option<BezPath> {
    let bounds = element.bounds();
    match element.kind {
        ElementKind::Rectangle => Some(bounds.to_path(0.1)),
        ElementKind::Ellipse => Some(
            kurbo::Ellipse::new(
                bounds.center(),
                (bounds.width() / 2.0, bounds.height() / 2.0),
                0.0,
            )
            .to_path(0.1),
        ),
        ElementKind::Diamond => {
            let center = bounds.center();
            let mut path = BezPath::new();
            path.move_to((center.x, bounds.y0));
            path.line_to((bounds.x1, center.y));
            path.line_to((center.x, bounds.y1));
            path.line_to((bounds.x0, center.y));
            path.close_path();
            Some(path)
        }
        ElementKind::Line | ElementKind::Arrow => {
            let mut path = BezPath::new();
            path.move_to((element.x, element.y));
            path.line_to((element.x + element.width, element.y + element.height));
            Some(path)
        }
        _ => None,
    }
}

/// Rasterized silhouette for clipping pattern fills. Rectangles skip the
/// mask: their pattern lines are already clipped to the bounds.
fn silhouette_mask(
    pixmap: &Pixmap,
    element: &Element,
    path: &BezPath,
    ts: Transform,
) -> Option<Mask> {
    if element.kind == ElementKind::Rectangle {
        return None;
    }
    let skia_path = to_skia_path(path)?;
    let mut mask = Mask::new(pixmap.width(), pixmap.height())?;
    mask.fill_path(&skia_path, FillRule::Winding, true, ts);
    Some(mask)
}

fn to_transform(viewport: &Viewport) -> Transform {
    Transform::from_row(
        viewport.scale as f32,
        0.0,
        0.0,
        viewport.scale as f32,
        viewport.offset.x as f32,
        viewport.offset.y as f32,
    )
}

fn to_skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for el in path.elements().iter().copied() {
        match el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p2) => pb.quad_to(p1.x as f32, p1.y as f32, p2.x as f32, p2.y as f32),
            PathEl::CurveTo(p1, p2, p3) => pb.cubic_to(
                p1.x as f32,
                p1.y as f32,
                p2.x as f32,
                p2.y as f32,
                p3.x as f32,
                p3.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

fn paint_for(color: Rgba) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn background(theme: Theme) -> tiny_skia::Color {
    match theme {
        Theme::Light => tiny_skia::Color::from_rgba8(250, 250, 250, 255),
        Theme::Dark => tiny_skia::Color::from_rgba8(24, 24, 27, 255),
    }
}

/// Straight-alpha RGBA bytes into a premultiplied pixmap.
fn decode_image(bytes: &[u8]) -> Option<Pixmap> {
    let decoded = image::load_from_memory(bytes).ok()?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut pixmap = Pixmap::new(width, height)?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = tiny_skia::ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}
