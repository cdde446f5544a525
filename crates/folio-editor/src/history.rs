//! Linear undo/redo over whole-document snapshots.
//!
//! Snapshots are explicit: the session takes one before each structural
//! change. Taking a new snapshot invalidates the redo stack. The undo stack
//! is bounded; the oldest snapshot is dropped first.

use std::collections::VecDeque;

use folio_types::Document;

use crate::config::DEFAULT_HISTORY_LIMIT;

#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<Document>,
    redo: Vec<Document>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    /// Create a history keeping at most `limit` undo snapshots.
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::with_capacity(limit.min(64)),
            redo: Vec::new(),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    /// Record `current` as the state to return to, and drop forward history.
    pub fn snapshot(&mut self, current: &Document) {
        self.undo.push_back(current.clone());
        while self.undo.len() > self.limit {
            self.undo.pop_front();
        }
        self.redo.clear();
    }

    /// Step back. `current` goes onto the redo stack; the returned document
    /// becomes the new current state.
    pub fn undo(&mut self, current: &Document) -> Option<Document> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current.clone());
        Some(previous)
    }

    /// Step forward again after an undo.
    pub fn redo(&mut self, current: &Document) -> Option<Document> {
        let next = self.redo.pop()?;
        self.undo.push_back(current.clone());
        while self.undo.len() > self.limit {
            self.undo.pop_front();
        }
        Some(next)
    }
}
