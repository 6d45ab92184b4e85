//! Scene state management
//!
//! This module provides the normalized element table with hierarchy, CSG,
//! clipboard and undo/redo operations. Every mutating operation saves an
//! undo snapshot before it touches the table; precondition misses return
//! early without recording anything.

mod align_ops;
mod clipboard_ops;
mod display;
mod element_ops;
mod hierarchy_ops;
mod history;
mod persistence;

pub use clipboard_ops::Clipboard;
pub use display::{element_display_name, kind_icon, short_id};
pub use history::{History, Snapshot};

use std::collections::{HashMap, HashSet, VecDeque};

use shared::{ElementId, ElementMap, SceneElement};

use super::selection::SelectionState;
use super::settings::EditorSettings;

/// Element table, selection, clipboard and undo/redo history
#[derive(Debug, Clone, Default)]
pub struct SceneState {
    /// Current element table
    pub(crate) elements: ElementMap,
    /// Current selection, snapshotted together with the table
    pub(crate) selection: SelectionState,
    /// Last copied subtree
    pub(crate) clipboard: Option<Clipboard>,
    /// Undo/redo snapshots
    pub(crate) history: History,
    pub(crate) settings: EditorSettings,
    /// Monotonically increasing version counter for cache invalidation
    pub(crate) version: u64,
}

impl SceneState {
    /// Empty scene using the given settings
    pub fn with_settings(settings: EditorSettings) -> Self {
        Self {
            history: History::with_capacity(settings.history_capacity),
            settings,
            ..Default::default()
        }
    }

    /// Current scene version (increments on every mutation)
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Read view of the element table
    pub fn elements(&self) -> &ElementMap {
        &self.elements
    }

    /// Get an element by ID
    pub fn get(&self, id: &str) -> Option<&SceneElement> {
        self.elements.get(id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn clipboard(&self) -> Option<&Clipboard> {
        self.clipboard.as_ref()
    }

    /// Replace the selection. Selection changes are not undoable.
    pub fn set_selection(&mut self, ids: Vec<ElementId>) {
        let ids = ids
            .into_iter()
            .filter(|id| self.elements.contains_key(id))
            .collect();
        self.selection.set(ids);
    }

    /// Shift+click toggle of one element
    pub fn toggle_selection(&mut self, id: &str) {
        if self.elements.contains_key(id) {
            self.selection.toggle(id.to_string());
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn set_alignment_mode(&mut self, enabled: bool) -> bool {
        self.selection.set_alignment_mode(enabled)
    }

    /// All element IDs sorted by `(order, id)`
    pub fn ordered_ids(&self) -> Vec<ElementId> {
        ordered_ids(&self.elements)
    }

    /// Largest order in use, if any
    pub(crate) fn max_order(&self) -> Option<i64> {
        self.elements.values().map(|e| e.order).max()
    }

    /// Order for the next appended element
    pub(crate) fn next_order(&self) -> i64 {
        self.max_order().map_or(0, |m| (m + 1).max(0))
    }

    /// Bump version without saving undo
    pub fn notify_mutated(&mut self) {
        self.version += 1;
    }
}

pub(crate) fn new_id() -> ElementId {
    uuid::Uuid::new_v4().to_string()
}

/// IDs sorted by `(order, id)`; the id breaks ties deterministically
pub fn ordered_ids(elements: &ElementMap) -> Vec<ElementId> {
    let mut items: Vec<&SceneElement> = elements.values().collect();
    items.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
    items.into_iter().map(|e| e.id.clone()).collect()
}

/// The given ids plus all of their transitive children, found by chasing
/// `parent_id`. Unknown ids are skipped; the result has no duplicates and
/// lists the requested ids first.
pub fn descendant_closure(elements: &ElementMap, ids: &[ElementId]) -> Vec<ElementId> {
    let mut by_parent: HashMap<&str, Vec<&SceneElement>> = HashMap::new();
    for el in elements.values() {
        if let Some(parent) = el.parent_id.as_deref() {
            by_parent.entry(parent).or_default().push(el);
        }
    }
    for children in by_parent.values_mut() {
        children.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut result = Vec::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    for id in ids {
        if let Some((key, _)) = elements.get_key_value(id.as_str()) {
            if seen.insert(key.as_str()) {
                result.push(key.clone());
                queue.push_back(key.as_str());
            }
        }
    }
    while let Some(id) = queue.pop_front() {
        for child in by_parent.get(id).into_iter().flatten() {
            if seen.insert(child.id.as_str()) {
                result.push(child.id.clone());
                queue.push_back(child.id.as_str());
            }
        }
    }
    result
}

/// Unlink `id` from its container, both ways. The element becomes a root.
pub(crate) fn detach_from_parent(elements: &mut ElementMap, id: &str) {
    let parent = elements.get_mut(id).and_then(|el| el.parent_id.take());
    if let Some(parent) = parent {
        if let Some(children) = elements.get_mut(&parent).and_then(|p| p.kind.children_mut()) {
            children.retain(|c| c != id);
        }
    }
}

/// Whether `id` is currently an operand of a subtraction
pub(crate) fn is_subtraction_operand(elements: &ElementMap, id: &str) -> bool {
    elements
        .get(id)
        .and_then(|el| el.parent_id.as_deref())
        .and_then(|p| elements.get(p))
        .is_some_and(|p| matches!(p.kind, shared::ElementKind::Subtraction { .. }))
}

/// Distinct ids that exist in the table, in the given order
pub(crate) fn existing_unique(elements: &ElementMap, ids: &[ElementId]) -> Vec<ElementId> {
    let mut seen = HashSet::new();
    ids.iter()
        .filter(|id| elements.contains_key(id.as_str()) && seen.insert(id.as_str()))
        .cloned()
        .collect()
}
