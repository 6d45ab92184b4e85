//! Undo/redo functionality
//!
//! Stack of full snapshots rather than a command log: grouping and CSG
//! composition have no cheap inverse, and editor scenes are small. Large
//! scenes would want structural sharing behind the same contract.

use std::collections::VecDeque;

use shared::{ElementId, ElementMap};

use super::SceneState;
use crate::state::settings::DEFAULT_HISTORY_CAPACITY;

/// Deep copy of the element table and selection
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub elements: ElementMap,
    pub selection: Vec<ElementId>,
}

/// Bounded undo/redo stacks, oldest entries evicted first
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: VecDeque<Snapshot>,
    redo_stack: VecDeque<Snapshot>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl History {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Record the state before a mutation. Invalidates redo.
    pub fn record(&mut self, snapshot: Snapshot) {
        Self::push_bounded(&mut self.undo_stack, snapshot, self.capacity);
        self.redo_stack.clear();
    }

    /// Swap `current` for the newest undo entry
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let prev = self.undo_stack.pop_back()?;
        Self::push_bounded(&mut self.redo_stack, current, self.capacity);
        Some(prev)
    }

    /// Swap `current` for the newest redo entry
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo_stack.pop_back()?;
        Self::push_bounded(&mut self.undo_stack, current, self.capacity);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn push_bounded(stack: &mut VecDeque<Snapshot>, snapshot: Snapshot, capacity: usize) {
        stack.push_back(snapshot);
        while stack.len() > capacity {
            stack.pop_front();
        }
    }
}

impl SceneState {
    /// Capture the current table and selection
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            elements: self.elements.clone(),
            selection: self.selection.all().to_vec(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.elements = snapshot.elements;
        self.selection.set(snapshot.selection);
        self.version += 1;
    }

    /// Save current state to undo stack
    pub(crate) fn save_undo(&mut self) {
        let snapshot = self.snapshot();
        self.history.record(snapshot);
    }

    /// Undo last change
    pub fn undo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.undo(current) {
            Some(prev) => {
                self.restore(prev);
                tracing::debug!("undo ({} left)", self.history.undo_len());
                true
            }
            None => false,
        }
    }

    /// Redo last undone change
    pub fn redo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.redo(current) {
            Some(next) => {
                self.restore(next);
                tracing::debug!("redo ({} left)", self.history.redo_len());
                true
            }
            None => false,
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }
}
