#![forbid(unsafe_code)]

//! Bounded undo/redo stacks.
//!
//! ```text
//! push(e3)            undo()              push(e4)  <-- new branch
//! undo: [e1, e2, e3]  undo: [e1, e2]      undo: [e1, e2, e4]
//! redo: []            redo: [e3]          redo: []
//! ```
//!
//! # Invariants
//!
//! 1. `undo_depth() <= max_depth` after every push.
//! 2. Pushing clears the redo stack.

use std::collections::VecDeque;

use crate::transaction::HistoryEntry;

/// Undo and redo stacks of [`HistoryEntry`] values.
#[derive(Debug)]
pub struct History {
    undo_stack: VecDeque<HistoryEntry>,
    redo_stack: VecDeque<HistoryEntry>,
    max_depth: usize,
}

impl History {
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Record an already-applied entry and start a new branch.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.redo_stack.clear();
        self.undo_stack.push_back(entry);
        while self.undo_stack.len() > self.max_depth {
            if let Some(evicted) = self.undo_stack.pop_front() {
                tracing::warn!(
                    target: "paneweave.history",
                    evicted = %evicted.description(),
                    max_depth = self.max_depth,
                    "undo history full; evicting oldest entry"
                );
            }
        }
    }

    pub(crate) fn pop_undo(&mut self) -> Option<HistoryEntry> {
        self.undo_stack.pop_back()
    }

    pub(crate) fn pop_redo(&mut self) -> Option<HistoryEntry> {
        self.redo_stack.pop_back()
    }

    pub(crate) fn push_undo_keep_redo(&mut self, entry: HistoryEntry) {
        self.undo_stack.push_back(entry);
    }

    pub(crate) fn push_redo(&mut self, entry: HistoryEntry) {
        self.redo_stack.push_back(entry);
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Descriptions of undoable entries, most recent first.
    pub fn undo_descriptions(&self, limit: usize) -> Vec<String> {
        self.undo_stack
            .iter()
            .rev()
            .take(limit)
            .map(HistoryEntry::description)
            .collect()
    }

    /// Descriptions of redoable entries, most recent first.
    pub fn redo_descriptions(&self, limit: usize) -> Vec<String> {
        self.redo_stack
            .iter()
            .rev()
            .take(limit)
            .map(HistoryEntry::description)
            .collect()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
