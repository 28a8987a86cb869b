//! Inkboard Core Library
//!
//! Platform-agnostic data structures and interaction logic for the
//! inkboard whiteboard: a flat z-ordered element document, full-snapshot
//! undo/redo, a pan/zoom viewport, the pointer/keyboard state machine, the
//! transient laser trail, and keyed snapshot persistence.

pub mod document;
pub mod editor;
pub mod element;
pub mod history;
pub mod image_data;
pub mod input;
pub mod laser;
pub mod storage;
pub mod tools;
pub mod viewport;

pub use document::{Document, ZOrder, DUPLICATE_OFFSET};
pub use editor::{Action, Editor, KeyOutcome};
pub use element::{
    Element, ElementId, ElementKind, ElementPatch, FillPattern, GroupId, Rgba, StrokeStyle,
    StyleDefaults, Theme,
};
pub use history::{History, HISTORY_LIMIT};
pub use input::{ClickCounter, Key, KeyInput, Modifiers, MouseButton, PointerInput};
pub use laser::{LaserPoint, LaserTrail, TRAIL_WINDOW};
pub use storage::{FileStore, MemoryStore, SnapshotStore, StorageError, SNAPSHOT_KEY};
pub use tools::Tool;
pub use viewport::{Viewport, MAX_SCALE, MIN_SCALE};
