//! Viewport transform for pan and zoom.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest allowed scale.
pub const MIN_SCALE: f64 = 0.1;
/// Largest allowed scale.
pub const MAX_SCALE: f64 = 10.0;

/// Wheel delta to scale conversion.
const WHEEL_ZOOM_FACTOR: f64 = 0.001;
/// Pinch distance delta to scale conversion.
const PINCH_ZOOM_FACTOR: f64 = 0.005;
/// Scale change per zoom button press.
const STEP_ZOOM: f64 = 0.1;

/// Pan/zoom state mapping document space to screen space:
/// `screen = document * scale + offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Pan offset in screen coordinates.
    pub offset: Vec2,
    /// Zoom level (1.0 = 100%), clamped to [`MIN_SCALE`]..=[`MAX_SCALE`].
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// The affine transform renderers apply to document-space geometry.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    pub fn screen_to_doc(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.offset.x) / self.scale,
            (screen.y - self.offset.y) / self.scale,
        )
    }

    pub fn doc_to_screen(&self, doc: Point) -> Point {
        Point::new(
            doc.x * self.scale + self.offset.x,
            doc.y * self.scale + self.offset.y,
        )
    }

    /// Pan by a raw screen-space delta. No scale compensation; panning is
    /// linear in screen pixels at every zoom level.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom from a wheel event; positive `delta_y` (scrolling down) zooms
    /// out.
    pub fn zoom_wheel(&mut self, delta_y: f64) {
        self.set_scale(self.scale - delta_y * WHEEL_ZOOM_FACTOR);
    }

    /// Zoom from a pinch gesture, driven by the frame-over-frame change in
    /// the distance between two touches.
    pub fn zoom_pinch(&mut self, distance_delta: f64) {
        self.set_scale(self.scale + distance_delta * PINCH_ZOOM_FACTOR);
    }

    /// Zoom one button step in (+) or out (-).
    pub fn zoom_step(&mut self, direction: f64) {
        self.set_scale(self.scale + direction.signum() * STEP_ZOOM);
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_round_trip() {
        let mut vp = Viewport::new();
        vp.offset = Vec2::new(120.0, -40.0);
        vp.scale = 2.5;

        let doc = Point::new(33.0, 71.0);
        let screen = vp.doc_to_screen(doc);
        assert_eq!(screen, Point::new(33.0 * 2.5 + 120.0, 71.0 * 2.5 - 40.0));
        let back = vp.screen_to_doc(screen);
        assert!((back.x - doc.x).abs() < 1e-9);
        assert!((back.y - doc.y).abs() < 1e-9);
    }

    #[test]
    fn test_transform_agrees_with_mapping() {
        let mut vp = Viewport::new();
        vp.offset = Vec2::new(7.0, 9.0);
        vp.scale = 0.5;
        let doc = Point::new(10.0, 20.0);
        assert_eq!(vp.transform() * doc, vp.doc_to_screen(doc));
    }

    #[test]
    fn test_pan_inverse_restores_viewport() {
        let mut vp = Viewport::new();
        let before = vp;
        vp.pan(Vec2::new(35.0, -12.0));
        vp.pan(Vec2::new(-35.0, 12.0));
        assert_eq!(vp, before);
    }

    #[test]
    fn test_pan_ignores_scale() {
        let mut vp = Viewport::new();
        vp.scale = 4.0;
        vp.pan(Vec2::new(10.0, 0.0));
        assert_eq!(vp.offset, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn test_scale_stays_clamped_under_any_sequence() {
        let mut vp = Viewport::new();
        for _ in 0..10_000 {
            vp.zoom_wheel(500.0);
        }
        assert_eq!(vp.scale, MIN_SCALE);

        for _ in 0..10_000 {
            vp.zoom_pinch(900.0);
        }
        assert_eq!(vp.scale, MAX_SCALE);

        vp.zoom_wheel(-3.0);
        assert!(vp.scale <= MAX_SCALE);
    }

    #[test]
    fn test_wheel_direction() {
        let mut vp = Viewport::new();
        vp.zoom_wheel(-100.0);
        assert!((vp.scale - 1.1).abs() < 1e-9);
        vp.zoom_wheel(100.0);
        assert!((vp.scale - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_step_buttons() {
        let mut vp = Viewport::new();
        vp.zoom_step(1.0);
        assert!((vp.scale - 1.1).abs() < 1e-9);
        vp.zoom_step(-1.0);
        vp.zoom_step(-1.0);
        assert!((vp.scale - 0.9).abs() < 1e-9);
    }
}
