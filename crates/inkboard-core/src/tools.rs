//! Tool palette.

use crate::element::ElementKind;

/// The active interaction mode.
///
/// Eraser and laser are transient interpreters over the pointer stream;
/// they never create elements. Image is selected by the host's file intake
/// and ignores pointer-downs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Selection,
    Rectangle,
    Ellipse,
    Diamond,
    Line,
    Arrow,
    Freehand,
    Text,
    Eraser,
    Laser,
    Image,
}

impl Tool {
    /// Tool bound to a bare letter shortcut. Arrow and image have none.
    pub fn from_shortcut(c: char) -> Option<Tool> {
        match c {
            'v' => Some(Tool::Selection),
            'r' => Some(Tool::Rectangle),
            'c' => Some(Tool::Ellipse),
            'd' => Some(Tool::Diamond),
            'l' => Some(Tool::Line),
            'p' => Some(Tool::Freehand),
            't' => Some(Tool::Text),
            'e' => Some(Tool::Eraser),
            'z' => Some(Tool::Laser),
            _ => None,
        }
    }

    /// The element kind a pointer-down with this tool creates, if any.
    pub fn element_kind(&self) -> Option<ElementKind> {
        match self {
            Tool::Rectangle => Some(ElementKind::Rectangle),
            Tool::Ellipse => Some(ElementKind::Ellipse),
            Tool::Diamond => Some(ElementKind::Diamond),
            Tool::Line => Some(ElementKind::Line),
            Tool::Arrow => Some(ElementKind::Arrow),
            Tool::Freehand => Some(ElementKind::Freehand),
            Tool::Text => Some(ElementKind::Text),
            Tool::Selection | Tool::Eraser | Tool::Laser | Tool::Image => None,
        }
    }

    /// Whether drawing with this tool only interprets the pointer stream
    /// without touching the document structure directly.
    pub fn is_transient(&self) -> bool {
        matches!(self, Tool::Eraser | Tool::Laser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortcuts() {
        assert_eq!(Tool::from_shortcut('v'), Some(Tool::Selection));
        assert_eq!(Tool::from_shortcut('p'), Some(Tool::Freehand));
        assert_eq!(Tool::from_shortcut('z'), Some(Tool::Laser));
        assert_eq!(Tool::from_shortcut('a'), None);
        assert_eq!(Tool::from_shortcut('x'), None);
    }

    #[test]
    fn test_transient_tools_create_nothing() {
        assert!(Tool::Eraser.is_transient());
        assert!(Tool::Laser.is_transient());
        assert_eq!(Tool::Eraser.element_kind(), None);
        assert_eq!(Tool::Laser.element_kind(), None);
        assert_eq!(Tool::Image.element_kind(), None);
    }
}
