//! The editing session: one owner for document, selection, viewport,
//! history, and the pointer/keyboard state machine.

use crate::document::{Document, ZOrder};
use crate::element::{Element, ElementId, ElementKind, ElementPatch, StyleDefaults, Theme};
use crate::history::History;
use crate::image_data;
use crate::input::{Key, KeyInput, MouseButton, PointerInput};
use crate::laser::LaserTrail;
use crate::storage::{SnapshotStore, StorageError, SNAPSHOT_KEY};
use crate::tools::Tool;
use crate::viewport::Viewport;
use kurbo::{Point, Size};
use std::time::Instant;

/// Edge length of a freshly imported image element, in document units.
const IMPORTED_IMAGE_SIZE: f64 = 200.0;

/// Gesture state between pointer-down and pointer-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    #[default]
    Idle,
    Drawing,
    Moving,
    Panning,
}

/// What a key press asks of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Handled internally or ignored.
    None,
    /// Escape: the host should close the board.
    RequestClose,
}

/// An interactive whiteboard session.
///
/// All state lives on one logical thread; events mutate it directly and a
/// revision counter tells hosts when a redraw is due. Committed mutations
/// go to history and, when a store is attached, to persistence.
pub struct Editor {
    document: Document,
    history: History,
    viewport: Viewport,
    selection: Vec<ElementId>,
    tool: Tool,
    style: StyleDefaults,
    theme: Theme,
    action: Action,
    /// Document-space anchor for moving.
    move_anchor: Point,
    /// Screen-space anchor for panning.
    pan_anchor: Point,
    editing_text: Option<ElementId>,
    laser: LaserTrail,
    last_pinch_distance: Option<f64>,
    viewport_size: Size,
    store: Option<Box<dyn SnapshotStore>>,
    revision: u64,
}

impl Editor {
    /// Start an empty session without persistence.
    pub fn new(theme: Theme) -> Self {
        Self::build(theme, Document::new(), None)
    }

    /// Start a session backed by a snapshot store, rehydrating the stored
    /// document. A missing or unreadable snapshot starts empty.
    pub fn with_store(theme: Theme, store: Box<dyn SnapshotStore>) -> Self {
        let document = match store.load(SNAPSHOT_KEY) {
            Ok(doc) => doc,
            Err(StorageError::NotFound(_)) => Document::new(),
            Err(e) => {
                log::warn!("Discarding unreadable snapshot: {}", e);
                Document::new()
            }
        };
        Self::build(theme, document, Some(store))
    }

    fn build(theme: Theme, document: Document, store: Option<Box<dyn SnapshotStore>>) -> Self {
        let history = History::new(document.clone());
        Self {
            document,
            history,
            viewport: Viewport::new(),
            selection: Vec::new(),
            tool: Tool::default(),
            style: StyleDefaults::for_theme(theme),
            theme,
            action: Action::default(),
            move_anchor: Point::ZERO,
            pan_anchor: Point::ZERO,
            editing_text: None,
            laser: LaserTrail::new(),
            last_pinch_distance: None,
            viewport_size: Size::new(800.0, 600.0),
            store,
            revision: 0,
        }
    }

    // --- state access ---

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> &[ElementId] {
        &self.selection
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
        self.bump();
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Switch the theme. The themed default stroke follows along unless
    /// the user already picked a color of their own.
    pub fn set_theme(&mut self, theme: Theme) {
        if self.style.stroke == StyleDefaults::for_theme(self.theme).stroke {
            self.style.stroke = StyleDefaults::for_theme(theme).stroke;
        }
        self.theme = theme;
        self.bump();
    }

    pub fn style(&self) -> &StyleDefaults {
        &self.style
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn laser(&self) -> &LaserTrail {
        &self.laser
    }

    pub fn editing_text(&self) -> Option<ElementId> {
        self.editing_text
    }

    /// Monotonic counter; changes whenever a redraw could be needed.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn set_viewport_size(&mut self, size: Size) {
        self.viewport_size = size;
        self.bump();
    }

    // --- pointer state machine ---

    pub fn pointer_down(&mut self, input: PointerInput) {
        if self.editing_text.is_some() {
            return;
        }
        match input.button {
            MouseButton::Middle => {
                self.action = Action::Panning;
                self.pan_anchor = input.position;
                self.bump();
                return;
            }
            MouseButton::Right => return,
            MouseButton::Left => {}
        }

        let doc_pos = self.viewport.screen_to_doc(input.position);
        match self.tool {
            Tool::Selection => self.selection_pointer_down(doc_pos, input),
            Tool::Image => {}
            Tool::Eraser | Tool::Laser => {
                self.action = Action::Drawing;
                self.bump();
            }
            Tool::Text => {
                let element = Element::new(ElementKind::Text, doc_pos, &self.style);
                let id = element.id;
                self.document = self.document.add(element);
                self.editing_text = Some(id);
                self.bump();
            }
            _ => {
                if let Some(kind) = self.tool.element_kind() {
                    let element = Element::new(kind, doc_pos, &self.style);
                    let id = element.id;
                    self.document = self.document.add(element);
                    self.selection = vec![id];
                    self.action = Action::Drawing;
                    self.bump();
                }
            }
        }
    }

    fn selection_pointer_down(&mut self, doc_pos: Point, input: PointerInput) {
        let hit = self.document.hit_test(doc_pos).map(|el| (el.id, el.kind));
        let Some((id, kind)) = hit else {
            // Miss: drop the selection (shift keeps it) and start panning.
            if !input.modifiers.shift {
                self.selection.clear();
            }
            self.action = Action::Panning;
            self.pan_anchor = input.position;
            self.bump();
            return;
        };

        if kind == ElementKind::Text && input.click_count >= 2 {
            self.editing_text = Some(id);
            self.bump();
            return;
        }

        let members = self.document.expand_group(id);
        if input.modifiers.shift {
            // Toggle the element/group; the gesture stays idle.
            if self.selection.contains(&id) {
                self.selection.retain(|sel| !members.contains(sel));
            } else {
                for member in members {
                    if !self.selection.contains(&member) {
                        self.selection.push(member);
                    }
                }
            }
        } else {
            if !self.selection.contains(&id) {
                self.selection = members;
            }
            self.action = Action::Moving;
            self.move_anchor = doc_pos;
        }
        self.sync_style_from_selection();
        self.bump();
    }

    pub fn pointer_move(&mut self, input: PointerInput) {
        match self.action {
            Action::Panning => {
                self.viewport.pan(input.position - self.pan_anchor);
                self.pan_anchor = input.position;
                self.bump();
            }
            Action::Moving => {
                let doc_pos = self.viewport.screen_to_doc(input.position);
                let delta = doc_pos - self.move_anchor;
                if !self.selection.is_empty() {
                    let ids = self.selection.clone();
                    self.document.translate_all(&ids, delta);
                    self.bump();
                }
                self.move_anchor = doc_pos;
            }
            Action::Drawing => {
                let doc_pos = self.viewport.screen_to_doc(input.position);
                match self.tool {
                    Tool::Laser => {
                        self.laser.push(doc_pos);
                        self.bump();
                    }
                    Tool::Eraser => self.erase_at(doc_pos),
                    Tool::Freehand => {
                        if let Some(el) = self.document.last_mut() {
                            el.push_point(doc_pos);
                            self.bump();
                        }
                    }
                    _ => {
                        if let Some(el) = self.document.last_mut() {
                            el.width = doc_pos.x - el.x;
                            el.height = doc_pos.y - el.y;
                            self.bump();
                        }
                    }
                }
            }
            Action::Idle => {}
        }
    }

    pub fn pointer_up(&mut self) {
        match self.action {
            // Laser never touched the document and the eraser commits per
            // deletion, so neither gets a gesture-end entry.
            Action::Drawing if !self.tool.is_transient() => self.commit(),
            Action::Moving => self.commit(),
            _ => {}
        }
        self.action = Action::Idle;
        self.bump();
    }

    fn erase_at(&mut self, doc_pos: Point) {
        if let Some(hit) = self.document.hit_test(doc_pos) {
            let id = hit.id;
            self.document = self.document.delete_elements(&[id]);
            self.selection.retain(|sel| *sel != id);
            self.commit();
        }
    }

    fn sync_style_from_selection(&mut self) {
        if let Some(last) = self.selection.last().and_then(|id| self.document.get(*id)) {
            self.style = StyleDefaults::from_element(last);
        }
    }

    // --- wheel, touch, frame tick ---

    pub fn wheel(&mut self, delta_y: f64) {
        self.viewport.zoom_wheel(delta_y);
        self.bump();
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_step(1.0);
        self.bump();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_step(-1.0);
        self.bump();
    }

    pub fn touch_start(&mut self, touches: &[Point]) {
        if touches.len() >= 2 {
            self.last_pinch_distance = Some((touches[0] - touches[1]).hypot());
        } else if let [point] = touches {
            self.pointer_down(PointerInput::touch(*point));
        }
    }

    pub fn touch_move(&mut self, touches: &[Point]) {
        if touches.len() >= 2 {
            let distance = (touches[0] - touches[1]).hypot();
            if let Some(previous) = self.last_pinch_distance {
                self.viewport.zoom_pinch(distance - previous);
            }
            self.last_pinch_distance = Some(distance);
            self.bump();
        } else if let [point] = touches {
            self.pointer_move(PointerInput::touch(*point));
        }
    }

    pub fn touch_end(&mut self, remaining: &[Point]) {
        if remaining.len() < 2 {
            self.last_pinch_distance = None;
        }
        if remaining.is_empty() {
            self.pointer_up();
        }
    }

    /// Per-frame upkeep: expire laser points.
    pub fn tick(&mut self, now: Instant) {
        let before = self.laser.points().len();
        self.laser.prune(now);
        if self.laser.points().len() != before {
            self.bump();
        }
    }

    // --- keyboard ---

    pub fn key_pressed(&mut self, input: KeyInput) -> KeyOutcome {
        if self.editing_text.is_some() {
            return KeyOutcome::None;
        }
        match input.key {
            Key::Escape => return KeyOutcome::RequestClose,
            Key::Delete | Key::Backspace => self.delete_selection(),
            Key::Character(c) => {
                let c = c.to_ascii_lowercase();
                if input.modifiers.primary() {
                    match c {
                        'z' if input.modifiers.shift => self.redo(),
                        'z' => self.undo(),
                        'y' => self.redo(),
                        'd' => self.duplicate_selection(),
                        'g' if input.modifiers.shift => self.ungroup_selection(),
                        'g' => self.group_selection(),
                        _ => {}
                    }
                } else if let Some(tool) = Tool::from_shortcut(c) {
                    self.tool = tool;
                    self.selection.clear();
                    self.bump();
                }
            }
        }
        KeyOutcome::None
    }

    // --- history ---

    pub fn undo(&mut self) {
        if let Some(doc) = self.history.undo() {
            self.document = doc;
            self.prune_selection();
            self.persist();
            self.bump();
        }
    }

    pub fn redo(&mut self) {
        if let Some(doc) = self.history.redo() {
            self.document = doc;
            self.prune_selection();
            self.persist();
            self.bump();
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn prune_selection(&mut self) {
        let document = &self.document;
        self.selection.retain(|id| document.contains(*id));
    }

    /// Record the current document in history and persist it.
    fn commit(&mut self) {
        self.history.commit(&self.document);
        self.persist();
        self.bump();
    }

    fn persist(&self) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(SNAPSHOT_KEY, &self.document) {
                log::warn!("Failed to persist snapshot: {}", e);
            }
        }
    }

    fn bump(&mut self) {
        self.revision += 1;
    }

    // --- selection operations ---

    pub fn delete_selection(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        self.document = self.document.delete_elements(&self.selection);
        self.selection.clear();
        self.commit();
    }

    pub fn duplicate_selection(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        let (document, clones) = self.document.duplicate_elements(&self.selection);
        self.document = document;
        self.selection = clones;
        self.commit();
    }

    pub fn group_selection(&mut self) {
        if self.selection.len() < 2 {
            return;
        }
        self.document = self.document.group(&self.selection);
        self.commit();
    }

    pub fn ungroup_selection(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        self.document = self.document.ungroup(&self.selection);
        self.commit();
    }

    pub fn bring_selection_to_front(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        self.document = self.document.reorder(&self.selection, ZOrder::Front);
        self.commit();
    }

    pub fn send_selection_to_back(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        self.document = self.document.reorder(&self.selection, ZOrder::Back);
        self.commit();
    }

    /// Apply a style patch to the selection and to the defaults for new
    /// elements. With nothing selected only the defaults change.
    pub fn apply_style(&mut self, patch: &ElementPatch) {
        self.style.apply(patch);
        if self.selection.is_empty() {
            self.bump();
            return;
        }
        for id in self.selection.clone() {
            self.document = self.document.update_element(id, patch);
        }
        self.commit();
    }

    /// Empty the board and drop the stored snapshot.
    pub fn clear(&mut self) {
        self.document = Document::new();
        self.selection.clear();
        self.editing_text = None;
        self.history.commit(&self.document);
        if let Some(store) = &self.store {
            if let Err(e) = store.delete(SNAPSHOT_KEY) {
                log::warn!("Failed to delete stored snapshot: {}", e);
            }
        }
        self.bump();
    }

    // --- text editing ---

    /// Finish the active text edit. Blank content deletes the element;
    /// anything else is stored on it. Either way the result is committed.
    pub fn commit_text_edit(&mut self, content: &str) {
        let Some(id) = self.editing_text.take() else {
            return;
        };
        if content.trim().is_empty() {
            self.document = self.document.delete_elements(&[id]);
            self.selection.retain(|sel| *sel != id);
        } else {
            let patch = ElementPatch {
                text: Some(content.to_string()),
                ..Default::default()
            };
            self.document = self.document.update_element(id, &patch);
        }
        self.commit();
    }

    // --- image intake ---

    /// Add an uploaded bitmap as an image element centered in the viewport.
    /// Unrecognizable payloads are skipped; returns whether an element was
    /// created.
    pub fn import_image(&mut self, bytes: &[u8]) -> bool {
        let Some(src) = image_data::encode_data_url(bytes) else {
            log::warn!("Ignoring upload: not a recognizable bitmap");
            return false;
        };
        let center = self.viewport.screen_to_doc(Point::new(
            self.viewport_size.width / 2.0,
            self.viewport_size.height / 2.0,
        ));
        let origin = Point::new(
            center.x - IMPORTED_IMAGE_SIZE / 2.0,
            center.y - IMPORTED_IMAGE_SIZE / 2.0,
        );
        let mut element = Element::new(ElementKind::Image, origin, &self.style);
        element.width = IMPORTED_IMAGE_SIZE;
        element.height = IMPORTED_IMAGE_SIZE;
        element.src = Some(src);
        let id = element.id;
        self.document = self.document.add(element);
        self.selection = vec![id];
        self.tool = Tool::Selection;
        self.commit();
        true
    }
}
