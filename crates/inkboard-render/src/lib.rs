//! Inkboard Render Library
//!
//! CPU rasterization for inkboard documents: the sketchy content pass,
//! the laser overlay pass, and PNG export, all on `tiny-skia` pixmaps so
//! rendering and export run headless.

mod export;
mod outline;
mod painter;
mod sketch;
mod text;

pub use export::{export_png, RenderError, RenderResult, EXPORT_FILE_NAME};
pub use painter::Painter;
