use shared::ElementId;

/// Element selection state (supports multi-select)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    /// Selected element IDs (in order of selection)
    selected: Vec<ElementId>,
    /// Align toolbar is active; only meaningful with two or more selected
    alignment_mode: bool,
}

impl SelectionState {
    /// Primary (first) selected element
    pub fn primary(&self) -> Option<&ElementId> {
        self.selected.first()
    }

    /// All selected elements
    pub fn all(&self) -> &[ElementId] {
        &self.selected
    }

    /// Check if an element is selected
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|s| s == id)
    }

    /// Replace the selection wholesale. Duplicates keep their first position.
    pub fn set(&mut self, ids: Vec<ElementId>) {
        self.selected.clear();
        for id in ids {
            if !self.selected.contains(&id) {
                self.selected.push(id);
            }
        }
        self.sync_alignment_mode();
    }

    /// Select a single element (clears previous selection)
    pub fn select(&mut self, id: ElementId) {
        self.selected.clear();
        self.selected.push(id);
        self.sync_alignment_mode();
    }

    /// Toggle selection (Shift+click behavior)
    pub fn toggle(&mut self, id: ElementId) {
        if let Some(pos) = self.selected.iter().position(|s| s == &id) {
            self.selected.remove(pos);
        } else {
            self.selected.push(id);
        }
        self.sync_alignment_mode();
    }

    /// Drop the given ids, keeping the order of the rest
    pub fn remove_ids(&mut self, ids: &[ElementId]) {
        self.selected.retain(|s| !ids.contains(s));
        self.sync_alignment_mode();
    }

    /// Clear all selection
    pub fn clear(&mut self) {
        self.selected.clear();
        self.sync_alignment_mode();
    }

    /// Number of selected elements
    pub fn count(&self) -> usize {
        self.selected.len()
    }

    pub fn alignment_mode(&self) -> bool {
        self.alignment_mode
    }

    /// Enter or leave alignment mode. Entering needs at least two selected.
    pub fn set_alignment_mode(&mut self, enabled: bool) -> bool {
        self.alignment_mode = enabled && self.selected.len() >= 2;
        self.alignment_mode
    }

    fn sync_alignment_mode(&mut self) {
        if self.selected.len() < 2 {
            self.alignment_mode = false;
        }
    }
}
