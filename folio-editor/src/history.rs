//! Bounded undo history.

use crate::state::Draft;
use folio_babel::{EditorMode, UnifiedContent};
use std::collections::VecDeque;

/// Everything needed to put the editor back where it was.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub mode: EditorMode,
    pub draft: Draft,
    pub content: UnifiedContent,
}

/// Snapshots, newest last. The oldest entry is dropped once `limit` is reached.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    entries: VecDeque<Snapshot>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit.min(64)),
            limit,
        }
    }

    pub fn push(&mut self, snapshot: Snapshot) {
        if self.limit == 0 {
            return;
        }
        if self.entries.back() == Some(&snapshot) {
            return;
        }
        while self.entries.len() >= self.limit {
            self.entries.pop_front();
        }
        self.entries.push_back(snapshot);
    }

    pub fn pop(&mut self) -> Option<Snapshot> {
        self.entries.pop_back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
