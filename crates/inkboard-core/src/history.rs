//! Full-snapshot undo/redo history.

use crate::document::Document;

/// Maximum number of retained snapshots; older entries are evicted.
pub const HISTORY_LIMIT: usize = 50;

/// Linear history of document snapshots with a cursor.
///
/// Entries are deep copies: callers get clones back and can never corrupt
/// retained state through them. The viewport is deliberately absent; pan
/// and zoom are not undoable.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Document>,
    cursor: usize,
}

impl History {
    /// Seed the history with the session's starting document so the first
    /// undo returns to it.
    pub fn new(initial: Document) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
        }
    }

    /// Record a snapshot: drops any redo tail past the cursor, appends, and
    /// evicts the oldest entry beyond [`HISTORY_LIMIT`].
    pub fn commit(&mut self, document: &Document) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(document.clone());
        if self.entries.len() > HISTORY_LIMIT {
            self.entries.remove(0);
        }
        self.cursor = self.entries.len() - 1;
    }

    /// Step back; `None` at the oldest retained entry.
    pub fn undo(&mut self) -> Option<Document> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.entries[self.cursor].clone())
    }

    /// Step forward; `None` when no redo tail exists.
    pub fn redo(&mut self) -> Option<Document> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.entries[self.cursor].clone())
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
