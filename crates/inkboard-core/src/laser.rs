//! Transient laser-pointer trail.

use kurbo::Point;
use std::time::{Duration, Instant};

/// How long a trail point stays visible.
pub const TRAIL_WINDOW: Duration = Duration::from_millis(1000);

/// A timestamped trail point in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaserPoint {
    pub position: Point,
    pub at: Instant,
}

/// Recent laser-pointer positions, pruned by age each frame.
///
/// Lives beside the document, never inside it: the trail is not part of
/// history, persistence, or export.
#[derive(Debug, Clone, Default)]
pub struct LaserTrail {
    points: Vec<LaserPoint>,
}

impl LaserTrail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, position: Point) {
        self.push_at(position, Instant::now());
    }

    pub fn push_at(&mut self, position: Point, at: Instant) {
        self.points.push(LaserPoint { position, at });
    }

    /// Drop points older than [`TRAIL_WINDOW`].
    pub fn prune(&mut self, now: Instant) {
        self.points
            .retain(|p| now.saturating_duration_since(p.at) <= TRAIL_WINDOW);
    }

    pub fn points(&self) -> &[LaserPoint] {
        &self.points
    }

    /// A trail needs at least two live points to draw.
    pub fn renderable(&self) -> bool {
        self.points.len() >= 2
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_expire_after_window() {
        let mut trail = LaserTrail::new();
        let t0 = Instant::now();
        trail.push_at(Point::new(0.0, 0.0), t0);
        trail.push_at(Point::new(5.0, 5.0), t0 + Duration::from_millis(600));

        trail.prune(t0 + Duration::from_millis(900));
        assert_eq!(trail.points().len(), 2);

        trail.prune(t0 + Duration::from_millis(1200));
        assert_eq!(trail.points().len(), 1);

        trail.prune(t0 + Duration::from_millis(2000));
        assert!(trail.is_empty());
    }

    #[test]
    fn test_renderable_needs_two_points() {
        let mut trail = LaserTrail::new();
        let t0 = Instant::now();
        assert!(!trail.renderable());
        trail.push_at(Point::new(0.0, 0.0), t0);
        assert!(!trail.renderable());
        trail.push_at(Point::new(1.0, 1.0), t0);
        assert!(trail.renderable());
    }
}
