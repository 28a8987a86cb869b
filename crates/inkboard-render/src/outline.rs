//! Variable-width outlines for freehand ink and the laser trail.
//!
//! A pointer path plus a pressure channel becomes a closed polygon that
//! the painter fills solid, following the perfect-freehand construction:
//! streamline the raw points, derive a per-point radius from pressure
//! (simulated from speed when the device reports none), then offset left
//! and right along the normals and stitch both sides into one loop.

use kurbo::{BezPath, Point, Vec2};

/// How fast simulated pressure tracks pointer speed.
const PRESSURE_RATE: f64 = 0.275;
/// Segments used to outline a single-point dot.
const DOT_SEGMENTS: usize = 16;

pub(crate) struct OutlineOptions {
    /// Full stroke width at neutral pressure, in the caller's units.
    pub size: f64,
    /// 0 keeps the width constant; 1 lets pressure swing it fully.
    pub thinning: f64,
    /// Merge distance factor for nearly coincident input points.
    pub smoothing: f64,
    /// Input low-pass strength; higher values trail the pointer more.
    pub streamline: f64,
    /// Pinch both ends to a point.
    pub taper: bool,
}

impl OutlineOptions {
    pub(crate) fn freehand(stroke_width: f64) -> Self {
        Self {
            size: stroke_width * 4.0 + 4.0,
            thinning: 0.5,
            smoothing: 0.5,
            streamline: 0.5,
            taper: false,
        }
    }

    pub(crate) fn laser() -> Self {
        Self {
            size: 16.0,
            thinning: 0.7,
            smoothing: 0.5,
            streamline: 0.5,
            taper: true,
        }
    }
}

/// Build the closed outline polygon for a stroke spine.
///
/// `pressure` supplies a constant pen pressure; `None` simulates one from
/// pointer speed. Returns an empty vector for empty input and a small
/// circular outline for a single point.
pub(crate) fn stroke_outline(
    points: &[Point],
    pressure: Option<f64>,
    opts: &OutlineOptions,
) -> Vec<Point> {
    if points.is_empty() {
        return Vec::new();
    }

    let spine = streamlined(points, opts);
    if spine.len() == 1 {
        return dot_outline(spine[0], stroke_radius(opts, pressure.unwrap_or(0.5)));
    }

    let pressures = match pressure {
        Some(p) => vec![p; spine.len()],
        None => simulated_pressures(&spine, opts.size),
    };

    // Cumulative arc length, for the end tapers.
    let mut run = Vec::with_capacity(spine.len());
    let mut total = 0.0;
    run.push(0.0);
    for w in spine.windows(2) {
        total += (w[1] - w[0]).hypot();
        run.push(total);
    }
    let taper_len = opts.size;

    let mut left = Vec::with_capacity(spine.len());
    let mut right = Vec::with_capacity(spine.len());
    for (i, &p) in spine.iter().enumerate() {
        let mut radius = stroke_radius(opts, pressures[i]);
        if opts.taper && total > 0.0 {
            let head = (run[i] / taper_len).min(1.0);
            let tail = ((total - run[i]) / taper_len).min(1.0);
            radius *= head.min(tail);
        }
        let normal = normal_at(&spine, i);
        left.push(p + normal * radius);
        right.push(p - normal * radius);
    }

    // Left side forward, right side back. Blunt ends get a synthetic tip
    // point beyond the spine so the quadratic smoothing rounds a cap.
    let mut outline = Vec::with_capacity(left.len() + right.len() + 2);
    if !opts.taper {
        outline.push(spine[0] - direction(&spine, 0) * stroke_radius(opts, pressures[0]));
    }
    outline.extend(left);
    if !opts.taper {
        let last = spine.len() - 1;
        outline.push(spine[last] + direction(&spine, last) * stroke_radius(opts, pressures[last]));
    }
    outline.extend(right.into_iter().rev());
    outline
}

/// Closed path through an outline polygon, each segment a quadratic with
/// the polygon point as control and the midpoint to the next as endpoint.
pub(crate) fn outline_path(outline: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    if outline.len() < 3 {
        return path;
    }
    path.move_to(outline[0]);
    for (i, &p) in outline.iter().enumerate() {
        let next = outline[(i + 1) % outline.len()];
        path.quad_to(p, p.midpoint(next));
    }
    path.close_path();
    path
}

fn stroke_radius(opts: &OutlineOptions, pressure: f64) -> f64 {
    opts.size * (0.5 - opts.thinning * (0.5 - pressure))
}

/// Low-pass the raw points and merge ones closer than the smoothing gap.
/// The first point passes through untouched and the last input always
/// contributes an output point, so short strokes never collapse.
fn streamlined(points: &[Point], opts: &OutlineOptions) -> Vec<Point> {
    let t = (1.0 - opts.streamline).max(0.15);
    let min_gap = opts.size * opts.smoothing * 0.25;

    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for (i, &raw) in points.iter().enumerate() {
        let p = match out.last().copied() {
            Some(prev) => prev.lerp(raw, t),
            None => raw,
        };
        if let Some(prev) = out.last().copied() {
            if i + 1 < points.len() && (p - prev).hypot() < min_gap {
                continue;
            }
        }
        out.push(p);
    }
    out
}

/// Pressure from speed: fast segments thin the stroke, slow ones thicken
/// it, eased toward the target so width changes stay gradual.
fn simulated_pressures(spine: &[Point], size: f64) -> Vec<f64> {
    let mut pressures = Vec::with_capacity(spine.len());
    let mut pressure = 0.5;
    pressures.push(pressure);
    for w in spine.windows(2) {
        let speed = ((w[1] - w[0]).hypot() / size).min(1.0);
        let target = 1.0 - speed;
        pressure = (pressure + (target - pressure) * (speed * PRESSURE_RATE)).min(1.0);
        pressures.push(pressure);
    }
    pressures
}

fn direction(spine: &[Point], i: usize) -> Vec2 {
    let v = if i + 1 < spine.len() {
        spine[i + 1] - spine[i]
    } else {
        spine[i] - spine[i - 1]
    };
    normalize(v)
}

/// Unit normal at a spine point, from the averaged adjacent directions.
fn normal_at(spine: &[Point], i: usize) -> Vec2 {
    let d = if i == 0 || i + 1 == spine.len() {
        direction(spine, i)
    } else {
        normalize(direction(spine, i - 1) + direction(spine, i))
    };
    Vec2::new(-d.y, d.x)
}

fn normalize(v: Vec2) -> Vec2 {
    let len = v.hypot();
    if len > 1e-12 {
        v / len
    } else {
        Vec2::new(1.0, 0.0)
    }
}

fn dot_outline(center: Point, radius: f64) -> Vec<Point> {
    let radius = radius.max(0.5);
    (0..DOT_SEGMENTS)
        .map(|i| {
            let theta = (i as f64 / DOT_SEGMENTS as f64) * std::f64::consts::TAU;
            Point::new(
                center.x + theta.cos() * radius,
                center.y + theta.sin() * radius,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_spine(n: usize, step: f64) -> Vec<Point> {
        (0..n).map(|i| Point::new(i as f64 * step, 0.0)).collect()
    }

    #[test]
    fn test_option_presets() {
        let freehand = OutlineOptions::freehand(2.0);
        assert_eq!(freehand.size, 12.0);
        assert!(!freehand.taper);
        let laser = OutlineOptions::laser();
        assert_eq!(laser.size, 16.0);
        assert!(laser.taper);
    }

    #[test]
    fn test_stroke_radius_scales_with_pressure() {
        let opts = OutlineOptions::laser();
        assert_eq!(stroke_radius(&opts, 0.5), 8.0);
        assert!(stroke_radius(&opts, 1.0) > stroke_radius(&opts, 0.0));
    }

    #[test]
    fn test_empty_input_gives_empty_outline() {
        let opts = OutlineOptions::freehand(2.0);
        assert!(stroke_outline(&[], None, &opts).is_empty());
    }

    #[test]
    fn test_single_point_gives_dot() {
        let opts = OutlineOptions::freehand(2.0);
        let outline = stroke_outline(&[Point::new(5.0, 5.0)], None, &opts);
        assert_eq!(outline.len(), DOT_SEGMENTS);
        for p in outline {
            assert!((p - Point::new(5.0, 5.0)).hypot() <= opts.size * 0.75 + 1e-9);
        }
    }

    #[test]
    fn test_outline_stays_within_radius_of_spine() {
        let opts = OutlineOptions::freehand(2.0);
        let points = straight_spine(10, 10.0);
        let spine = streamlined(&points, &opts);
        let outline = stroke_outline(&points, None, &opts);
        assert!(outline.len() >= 4);
        let max_radius = opts.size * 0.75 + 1e-9;
        for p in outline {
            let dist = spine
                .iter()
                .map(|s| (p - *s).hypot())
                .fold(f64::INFINITY, f64::min);
            assert!(dist <= max_radius, "outline point {dist} beyond radius");
        }
    }

    #[test]
    fn test_taper_pinches_the_ends() {
        let opts = OutlineOptions::laser();
        let spine = straight_spine(20, 10.0);
        let outline = stroke_outline(&spine, Some(0.5), &opts);
        // With tapering the first outline point sits on the spine start.
        assert!((outline[0] - spine[0]).hypot() < 1e-9);
        assert!((*outline.last().unwrap() - spine[0]).hypot() < 1e-9);
    }

    #[test]
    fn test_streamline_merges_dense_points() {
        let opts = OutlineOptions::laser();
        let dense: Vec<Point> = (0..200).map(|i| Point::new(i as f64 * 0.1, 0.0)).collect();
        let spine = streamlined(&dense, &opts);
        assert!(spine.len() < dense.len() / 4);
        assert_eq!(spine[0], dense[0]);
    }

    #[test]
    fn test_outline_path_is_closed() {
        let opts = OutlineOptions::freehand(1.0);
        let outline = stroke_outline(&straight_spine(5, 10.0), None, &opts);
        let path = outline_path(&outline);
        assert!(matches!(path.elements().last(), Some(kurbo::PathEl::ClosePath)));
        // One move, one quad per outline point, one close.
        assert_eq!(path.elements().len(), outline.len() + 2);
    }
}
