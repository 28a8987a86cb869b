//! Normalized input events.
//!
//! Hosts translate their native mouse/touch/keyboard events into these
//! types; the editor never sees platform event structs.

use kurbo::Point;
use std::time::{Duration, Instant};

/// Maximum delay between clicks to count as a double-click.
const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(500);
/// Maximum pointer travel between clicks to count as a double-click.
const DOUBLE_CLICK_DISTANCE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseButton {
    #[default]
    Left,
    Middle,
    Right,
}

/// Keyboard modifier state accompanying an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// The platform primary shortcut modifier (ctrl, or cmd on macOS).
    pub fn primary(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A pointer event normalized to a single screen-space coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    /// Position in screen coordinates.
    pub position: Point,
    pub button: MouseButton,
    pub modifiers: Modifiers,
    /// Consecutive click count (2 = double-click).
    pub click_count: u8,
}

impl PointerInput {
    pub fn new(position: Point, button: MouseButton, modifiers: Modifiers) -> Self {
        Self {
            position,
            button,
            modifiers,
            click_count: 1,
        }
    }

    /// Plain left-button press at a position.
    pub fn left(position: Point) -> Self {
        Self::new(position, MouseButton::Left, Modifiers::default())
    }

    pub fn middle(position: Point) -> Self {
        Self::new(position, MouseButton::Middle, Modifiers::default())
    }

    /// A single touch contact, mapped to a plain left press.
    pub fn touch(position: Point) -> Self {
        Self::left(position)
    }

    pub fn with_shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }

    pub fn with_clicks(mut self, count: u8) -> Self {
        self.click_count = count;
        self
    }
}

/// Keys the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A printable character, lowercased by the host.
    Character(char),
    Delete,
    Backspace,
    Escape,
}

/// A key press with its modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyInput {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn character(c: char) -> Self {
        Self::new(Key::Character(c), Modifiers::default())
    }

    /// Character key with the primary modifier held.
    pub fn primary(c: char) -> Self {
        Self::new(
            Key::Character(c),
            Modifiers {
                ctrl: true,
                ..Default::default()
            },
        )
    }

    pub fn with_shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }
}

/// Derives click counts for hosts without native double-click events.
#[derive(Debug, Default)]
pub struct ClickCounter {
    last: Option<(Point, Instant)>,
}

impl ClickCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a press; returns 2 when it lands within the double-click
    /// window and travel distance of the previous one, else 1.
    pub fn register(&mut self, position: Point, now: Instant) -> u8 {
        let is_double = self.last.is_some_and(|(prev, at)| {
            now.saturating_duration_since(at) <= DOUBLE_CLICK_WINDOW
                && (position - prev).hypot() <= DOUBLE_CLICK_DISTANCE
        });
        if is_double {
            self.last = None;
            2
        } else {
            self.last = Some((position, now));
            1
        }
    }
}
