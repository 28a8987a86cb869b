//! Element definitions for the whiteboard document.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// Shared identifier for grouped elements.
pub type GroupId = Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// Alpha scaled by an opacity percentage (0..=100).
    pub fn with_opacity(self, opacity: f64) -> Self {
        let a = (self.a as f64 * (opacity / 100.0).clamp(0.0, 1.0)) as u8;
        Self { a, ..self }
    }
}

/// Stroke style for outlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

/// Fill pattern for closed shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FillPattern {
    /// Solid fill color.
    Solid,
    /// Parallel diagonal lines.
    #[default]
    Hachure,
    /// Zigzag pattern.
    Zigzag,
    /// Cross-hatched lines.
    CrossHatch,
}

/// Discriminant for the drawable element kinds.
///
/// Only kinds that can live in a document appear here; transient interaction
/// modes (eraser, laser, selection) are [`crate::tools::Tool`] variants and
/// never produce elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Rectangle,
    Ellipse,
    Diamond,
    Line,
    Arrow,
    Freehand,
    Text,
    Image,
}

/// Generate a random seed for new elements.
/// Uses a counter + hash approach so seeds are unique without a time source.
pub(crate) fn generate_seed() -> u32 {
    use std::sync::atomic::{AtomicU32, Ordering};

    static SEED_COUNTER: AtomicU32 = AtomicU32::new(1);

    let counter = SEED_COUNTER.fetch_add(1, Ordering::Relaxed);

    // splitmix32-style finalizer for better distribution
    let mut x = counter.wrapping_mul(0x9E3779B9);
    x ^= x >> 16;
    x = x.wrapping_mul(0x85EBCA6B);
    x ^= x >> 13;
    x = x.wrapping_mul(0xC2B2AE35);
    x ^= x >> 16;
    x
}

fn default_opacity() -> f64 {
    100.0
}

fn default_roughness() -> f64 {
    1.0
}

fn default_stroke_width() -> f64 {
    2.0
}

/// A single drawable unit in the document.
///
/// `width`/`height` may be negative while a shape is dragged up or left;
/// consumers normalize through [`Element::bounds`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
    /// Position in document coordinates.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Stroke color.
    pub stroke: Rgba,
    /// Fill color (None = no fill).
    #[serde(default)]
    pub fill: Option<Rgba>,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
    #[serde(default)]
    pub stroke_style: StrokeStyle,
    #[serde(default)]
    pub fill_pattern: FillPattern,
    /// Overall opacity as a percentage (0 = transparent, 100 = opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Jitter amplitude for the sketchy renderer; 0 draws clean lines.
    #[serde(default = "default_roughness")]
    pub roughness: f64,
    /// Random seed fixed at creation so jitter is stable across redraws.
    #[serde(default = "generate_seed")]
    pub seed: u32,
    /// Rotation in radians. Reserved; currently always 0.
    #[serde(default)]
    pub angle: f64,
    /// Path points for freehand strokes (document space, absolute).
    #[serde(default)]
    pub points: Vec<Point>,
    /// Content for text elements.
    #[serde(default)]
    pub text: Option<String>,
    /// Group membership; equal ids form a group.
    #[serde(default)]
    pub group_id: Option<GroupId>,
    /// Bitmap source for image elements, as a base64 data URL.
    #[serde(default)]
    pub src: Option<String>,
}

impl Element {
    /// Create an element of the given kind at a position, styled from the
    /// session's current defaults. Extents start at zero; freehand strokes
    /// start with the origin as their first path point.
    pub fn new(kind: ElementKind, position: Point, style: &StyleDefaults) -> Self {
        let points = if kind == ElementKind::Freehand {
            vec![position]
        } else {
            Vec::new()
        };
        Self {
            id: Uuid::new_v4(),
            kind,
            x: position.x,
            y: position.y,
            width: 0.0,
            height: 0.0,
            stroke: style.stroke,
            fill: style.fill,
            stroke_width: style.stroke_width,
            stroke_style: style.stroke_style,
            fill_pattern: style.fill_pattern,
            opacity: style.opacity,
            roughness: style.roughness,
            seed: generate_seed(),
            angle: 0.0,
            points,
            text: if kind == ElementKind::Text {
                Some(String::new())
            } else {
                None
            },
            group_id: None,
            src: None,
        }
    }

    /// Normalized bounding box; min/max-normalizes negative extents.
    pub fn bounds(&self) -> Rect {
        let x0 = self.x.min(self.x + self.width);
        let x1 = self.x.max(self.x + self.width);
        let y0 = self.y.min(self.y + self.height);
        let y1 = self.y.max(self.y + self.height);
        Rect::new(x0, y0, x1, y1)
    }

    /// Whether a document-space point falls inside the bounding box
    /// (closed on all edges).
    pub fn contains(&self, point: Point) -> bool {
        let b = self.bounds();
        point.x >= b.x0 && point.x <= b.x1 && point.y >= b.y0 && point.y <= b.y1
    }

    /// Translate the element, including freehand path points.
    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
        for p in &mut self.points {
            *p += delta;
        }
    }

    /// Append a freehand path point, growing x/y/width/height to the
    /// point cloud's bounding box so hit tests cover the whole stroke.
    pub fn push_point(&mut self, point: Point) {
        self.points.push(point);
        let mut min = point;
        let mut max = point;
        for p in &self.points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        self.x = min.x;
        self.y = min.y;
        self.width = max.x - min.x;
        self.height = max.y - min.y;
    }

    /// Merge a partial update into this element.
    pub fn apply(&mut self, patch: &ElementPatch) {
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
        if let Some(stroke) = patch.stroke {
            self.stroke = stroke;
        }
        if let Some(fill) = patch.fill {
            self.fill = fill;
        }
        if let Some(stroke_width) = patch.stroke_width {
            self.stroke_width = stroke_width;
        }
        if let Some(stroke_style) = patch.stroke_style {
            self.stroke_style = stroke_style;
        }
        if let Some(fill_pattern) = patch.fill_pattern {
            self.fill_pattern = fill_pattern;
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = opacity.clamp(0.0, 100.0);
        }
        if let Some(roughness) = patch.roughness {
            self.roughness = roughness.max(0.0);
        }
        if let Some(ref text) = patch.text {
            self.text = Some(text.clone());
        }
        if let Some(ref points) = patch.points {
            self.points = points.clone();
        }
    }
}

/// Partial element update; `None` fields are left untouched.
///
/// `fill` is doubly optional: `Some(None)` clears the fill, `None` keeps it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub stroke: Option<Rgba>,
    pub fill: Option<Option<Rgba>>,
    pub stroke_width: Option<f64>,
    pub stroke_style: Option<StrokeStyle>,
    pub fill_pattern: Option<FillPattern>,
    pub opacity: Option<f64>,
    pub roughness: Option<f64>,
    pub text: Option<String>,
    pub points: Option<Vec<Point>>,
}

/// UI theme; decides the default stroke color and grid dot contrast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Style applied to newly created elements, kept in sync with the last
/// selected element so consecutive shapes share a look.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleDefaults {
    pub stroke: Rgba,
    pub fill: Option<Rgba>,
    pub stroke_width: f64,
    pub stroke_style: StrokeStyle,
    pub fill_pattern: FillPattern,
    pub opacity: f64,
    pub roughness: f64,
}

impl StyleDefaults {
    /// Defaults for a theme: white stroke on dark, black on light.
    pub fn for_theme(theme: Theme) -> Self {
        let stroke = match theme {
            Theme::Dark => Rgba::white(),
            Theme::Light => Rgba::black(),
        };
        Self {
            stroke,
            fill: None,
            stroke_width: 2.0,
            stroke_style: StrokeStyle::default(),
            fill_pattern: FillPattern::default(),
            opacity: 100.0,
            roughness: 1.0,
        }
    }

    /// Adopt an existing element's style.
    pub fn from_element(element: &Element) -> Self {
        Self {
            stroke: element.stroke,
            fill: element.fill,
            stroke_width: element.stroke_width,
            stroke_style: element.stroke_style,
            fill_pattern: element.fill_pattern,
            opacity: element.opacity,
            roughness: element.roughness,
        }
    }

    /// Merge the style fields of a patch into the defaults.
    pub fn apply(&mut self, patch: &ElementPatch) {
        if let Some(stroke) = patch.stroke {
            self.stroke = stroke;
        }
        if let Some(fill) = patch.fill {
            self.fill = fill;
        }
        if let Some(stroke_width) = patch.stroke_width {
            self.stroke_width = stroke_width;
        }
        if let Some(stroke_style) = patch.stroke_style {
            self.stroke_style = stroke_style;
        }
        if let Some(fill_pattern) = patch.fill_pattern {
            self.fill_pattern = fill_pattern;
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = opacity.clamp(0.0, 100.0);
        }
        if let Some(roughness) = patch.roughness {
            self.roughness = roughness.max(0.0);
        }
    }
}
