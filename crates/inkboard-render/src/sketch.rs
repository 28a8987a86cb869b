//! Seeded sketchy path effects.
//!
//! Shape outlines are jittered with a deterministic RNG so an element
//! renders with identical wobble every frame; the per-element seed is
//! stored in the document, never regenerated here.

use inkboard_core::{FillPattern, StrokeStyle};
use kurbo::{BezPath, PathEl, Point, Rect};

/// Spacing between pattern fill lines, in document units.
const FILL_GAP: f64 = 4.0;
/// Pattern fill lines run along this diagonal.
const FILL_ANGLE_DEG: f64 = -45.0;
/// Large prime stride so the second sketch pass gets an unrelated sequence.
const PASS_SEED_STEP: u32 = 99_991;

/// Seeded xorshift32 generator for the jitter offsets.
pub(crate) struct SketchRng {
    state: u32,
}

impl SketchRng {
    pub(crate) fn new(seed: u32) -> Self {
        // xorshift sticks at zero
        Self { state: seed.max(1) }
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform value in [-1, 1].
    fn next_f64(&mut self) -> f64 {
        (self.next_u32() as f64 / u32::MAX as f64) * 2.0 - 1.0
    }

    /// Uniform offset in [-amount, amount].
    pub(crate) fn offset(&mut self, amount: f64) -> f64 {
        self.next_f64() * amount
    }
}

/// Dash intervals for a stroke style, in document units.
pub(crate) fn dash_intervals(style: StrokeStyle) -> Option<Vec<f32>> {
    match style {
        StrokeStyle::Solid => None,
        StrokeStyle::Dashed => Some(vec![10.0, 5.0]),
        StrokeStyle::Dotted => Some(vec![2.0, 5.0]),
    }
}

/// Jitter a path into a hand-drawn version of itself.
///
/// Line segments bow toward a randomly offset midpoint and their endpoints
/// overshoot slightly; curve control points wobble. The amplitude shrinks
/// with the square root of the zoom so the effect reads the same at any
/// magnification. `pass` selects an unrelated random sequence, letting the
/// caller lay a second stroke over the first for the double-line sketch
/// look.
pub(crate) fn roughen(path: &BezPath, roughness: f64, zoom: f64, seed: u32, pass: u32) -> BezPath {
    if roughness <= 0.0 {
        return path.clone();
    }

    let scale = 1.0 / zoom.sqrt();
    let max_offset = roughness * 2.0 * scale;
    let bowing = roughness;

    let mut rng = SketchRng::new(seed.wrapping_add(pass.wrapping_mul(PASS_SEED_STEP)));

    let mut result = BezPath::new();
    let mut last = Point::ZERO;

    for el in path.elements().iter().copied() {
        match el {
            PathEl::MoveTo(p) => {
                result.move_to(Point::new(
                    p.x + rng.offset(max_offset),
                    p.y + rng.offset(max_offset),
                ));
                last = p;
            }
            PathEl::LineTo(p) => {
                let dx = p.x - last.x;
                let dy = p.y - last.y;
                let len = (dx * dx + dy * dy).sqrt();

                // Bow grows with segment length.
                let bow = rng.offset(bowing * roughness * len / 200.0) * scale;
                let (perp_x, perp_y) = if len > 0.001 {
                    (-dy / len, dx / len)
                } else {
                    (0.0, 0.0)
                };

                let mid = Point::new(
                    (last.x + p.x) / 2.0 + perp_x * bow,
                    (last.y + p.y) / 2.0 + perp_y * bow,
                );
                let end = Point::new(
                    p.x + rng.offset(max_offset),
                    p.y + rng.offset(max_offset),
                );
                result.quad_to(mid, end);
                last = p;
            }
            PathEl::QuadTo(p1, p2) => {
                result.quad_to(
                    Point::new(
                        p1.x + rng.offset(max_offset * 0.7),
                        p1.y + rng.offset(max_offset * 0.7),
                    ),
                    Point::new(p2.x + rng.offset(max_offset), p2.y + rng.offset(max_offset)),
                );
                last = p2;
            }
            PathEl::CurveTo(p1, p2, p3) => {
                result.curve_to(
                    Point::new(
                        p1.x + rng.offset(max_offset * 0.5),
                        p1.y + rng.offset(max_offset * 0.5),
                    ),
                    Point::new(
                        p2.x + rng.offset(max_offset * 0.5),
                        p2.y + rng.offset(max_offset * 0.5),
                    ),
                    Point::new(p3.x + rng.offset(max_offset), p3.y + rng.offset(max_offset)),
                );
                last = p3;
            }
            PathEl::ClosePath => {
                // The wobbled start point keeps the closing corner from
                // lining up exactly, which is the look we want.
                result.close_path();
            }
        }
    }

    result
}

/// Build the line work for a pattern fill across `bounds`.
///
/// Lines are laid out at a fixed diagonal, clipped to the bounding box;
/// the painter masks them to the actual silhouette for non-rectangular
/// shapes. Returns `None` for [`FillPattern::Solid`], which has no line
/// work.
pub(crate) fn pattern_lines(bounds: Rect, pattern: FillPattern) -> Option<BezPath> {
    match pattern {
        FillPattern::Solid => None,
        FillPattern::Hachure => {
            let segments = hachure_segments(bounds, FILL_ANGLE_DEG);
            let mut path = BezPath::new();
            for (a, b) in &segments {
                path.move_to(*a);
                path.line_to(*b);
            }
            Some(path)
        }
        FillPattern::Zigzag => {
            // Alternating hachure directions chain into one stroke with
            // short connectors between neighboring lines.
            let segments = hachure_segments(bounds, FILL_ANGLE_DEG);
            let mut path = BezPath::new();
            for (i, (a, b)) in segments.iter().enumerate() {
                if i == 0 {
                    path.move_to(*a);
                } else {
                    path.line_to(*a);
                }
                path.line_to(*b);
            }
            Some(path)
        }
        FillPattern::CrossHatch => {
            let mut path = BezPath::new();
            for angle in [FILL_ANGLE_DEG, -FILL_ANGLE_DEG] {
                for (a, b) in hachure_segments(bounds, angle) {
                    path.move_to(a);
                    path.line_to(b);
                }
            }
            Some(path)
        }
    }
}

/// Parallel diagonal segments covering `bounds`, clipped to it.
///
/// Consecutive segments alternate direction so chaining them end to end
/// (the zigzag fill) produces short connectors instead of long jumps.
fn hachure_segments(bounds: Rect, angle_deg: f64) -> Vec<(Point, Point)> {
    let width = bounds.width();
    let height = bounds.height();
    if width <= 0.0 || height <= 0.0 {
        return Vec::new();
    }

    let rad = angle_deg.to_radians();
    let (sin, cos) = rad.sin_cos();
    let diagonal = (width * width + height * height).sqrt();
    let count = (diagonal / FILL_GAP).ceil() as i64;

    let center = bounds.center();
    let mut segments = Vec::new();
    for i in -count..=count {
        let offset = i as f64 * FILL_GAP;
        // Perpendicular offset from center, then extend along the line
        // direction past both sides of the box.
        let base = Point::new(center.x - sin * offset, center.y + cos * offset);
        let along = kurbo::Vec2::new(cos * diagonal, sin * diagonal);
        let a = base - along;
        let b = base + along;
        if let Some((a, b)) = clip_segment(a, b, bounds) {
            if i.rem_euclid(2) == 0 {
                segments.push((a, b));
            } else {
                segments.push((b, a));
            }
        }
    }
    segments
}

/// Cohen-Sutherland segment/rectangle clip.
fn clip_segment(a: Point, b: Point, rect: Rect) -> Option<(Point, Point)> {
    const INSIDE: u8 = 0;
    const LEFT: u8 = 1;
    const RIGHT: u8 = 2;
    const BOTTOM: u8 = 4;
    const TOP: u8 = 8;

    fn outcode(p: Point, rect: Rect) -> u8 {
        let mut code = INSIDE;
        if p.x < rect.x0 {
            code |= LEFT;
        } else if p.x > rect.x1 {
            code |= RIGHT;
        }
        if p.y < rect.y0 {
            code |= TOP;
        } else if p.y > rect.y1 {
            code |= BOTTOM;
        }
        code
    }

    let (mut a, mut b) = (a, b);
    let mut code_a = outcode(a, rect);
    let mut code_b = outcode(b, rect);

    loop {
        if code_a | code_b == 0 {
            return Some((a, b));
        }
        if code_a & code_b != 0 {
            return None;
        }

        let out = if code_a != 0 { code_a } else { code_b };
        let p = if out & TOP != 0 {
            Point::new(a.x + (b.x - a.x) * (rect.y0 - a.y) / (b.y - a.y), rect.y0)
        } else if out & BOTTOM != 0 {
            Point::new(a.x + (b.x - a.x) * (rect.y1 - a.y) / (b.y - a.y), rect.y1)
        } else if out & RIGHT != 0 {
            Point::new(rect.x1, a.y + (b.y - a.y) * (rect.x1 - a.x) / (b.x - a.x))
        } else {
            Point::new(rect.x0, a.y + (b.y - a.y) * (rect.x0 - a.x) / (b.x - a.x))
        };

        if out == code_a {
            a = p;
            code_a = outcode(a, rect);
        } else {
            b = p;
            code_b = outcode(b, rect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Shape;

    fn sample_path() -> BezPath {
        Rect::new(10.0, 10.0, 60.0, 40.0).to_path(0.1)
    }

    #[test]
    fn test_roughen_is_deterministic_per_seed() {
        let path = sample_path();
        let a = roughen(&path, 1.0, 1.0, 42, 0);
        let b = roughen(&path, 1.0, 1.0, 42, 0);
        assert_eq!(a.elements(), b.elements());
    }

    #[test]
    fn test_roughen_differs_between_seeds_and_passes() {
        let path = sample_path();
        let base = roughen(&path, 1.0, 1.0, 42, 0);
        let other_seed = roughen(&path, 1.0, 1.0, 43, 0);
        let other_pass = roughen(&path, 1.0, 1.0, 42, 1);
        assert_ne!(base.elements(), other_seed.elements());
        assert_ne!(base.elements(), other_pass.elements());
    }

    #[test]
    fn test_zero_roughness_returns_clean_path() {
        let path = sample_path();
        let clean = roughen(&path, 0.0, 1.0, 42, 0);
        assert_eq!(clean.elements(), path.elements());
    }

    #[test]
    fn test_roughen_stays_near_source() {
        // Offsets are bounded by roughness * 2 at zoom 1.
        let path = sample_path();
        let rough = roughen(&path, 1.0, 1.0, 7, 0);
        for (orig, wobbled) in path.elements().iter().zip(rough.elements()) {
            if let (PathEl::MoveTo(a), PathEl::MoveTo(b)) = (orig, wobbled) {
                assert!((a.x - b.x).abs() <= 2.0);
                assert!((a.y - b.y).abs() <= 2.0);
            }
        }
    }

    #[test]
    fn test_dash_intervals() {
        assert_eq!(dash_intervals(StrokeStyle::Solid), None);
        assert_eq!(dash_intervals(StrokeStyle::Dashed), Some(vec![10.0, 5.0]));
        assert_eq!(dash_intervals(StrokeStyle::Dotted), Some(vec![2.0, 5.0]));
    }

    #[test]
    fn test_hachure_segments_clipped_to_bounds() {
        let bounds = Rect::new(0.0, 0.0, 50.0, 30.0);
        let segments = hachure_segments(bounds, FILL_ANGLE_DEG);
        assert!(!segments.is_empty());
        for (a, b) in segments {
            for p in [a, b] {
                assert!(p.x >= bounds.x0 - 1e-6 && p.x <= bounds.x1 + 1e-6);
                assert!(p.y >= bounds.y0 - 1e-6 && p.y <= bounds.y1 + 1e-6);
            }
        }
    }

    #[test]
    fn test_cross_hatch_doubles_line_work() {
        let bounds = Rect::new(0.0, 0.0, 40.0, 40.0);
        let hachure = pattern_lines(bounds, FillPattern::Hachure).unwrap();
        let cross = pattern_lines(bounds, FillPattern::CrossHatch).unwrap();
        assert!(cross.elements().len() > hachure.elements().len());
    }

    #[test]
    fn test_solid_pattern_has_no_line_work() {
        let bounds = Rect::new(0.0, 0.0, 40.0, 40.0);
        assert!(pattern_lines(bounds, FillPattern::Solid).is_none());
    }

    #[test]
    fn test_degenerate_bounds_produce_no_segments() {
        assert!(hachure_segments(Rect::new(5.0, 5.0, 5.0, 25.0), FILL_ANGLE_DEG).is_empty());
    }

    #[test]
    fn test_clip_segment_rejects_outside_lines() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(clip_segment(Point::new(-5.0, -5.0), Point::new(-1.0, -1.0), rect).is_none());
        let kept = clip_segment(Point::new(-5.0, 5.0), Point::new(15.0, 5.0), rect).unwrap();
        assert_eq!(kept.0, Point::new(0.0, 5.0));
        assert_eq!(kept.1, Point::new(10.0, 5.0));
    }
}
