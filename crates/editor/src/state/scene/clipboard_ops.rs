//! Copy, paste and duplicate

use std::collections::{HashMap, HashSet};

use glam::DVec3;
use shared::{ElementId, ElementMap, SceneElement};

use super::{descendant_closure, existing_unique, new_id, ordered_ids, SceneState};
use crate::math::world_transform;

/// Deep copy of a selection and everything below it, with original ids
#[derive(Debug, Clone, PartialEq)]
pub struct Clipboard {
    /// Copied elements sorted by `(order, id)`. Elements whose parent was
    /// not copied are stored as roots with their world transform.
    pub elements: Vec<SceneElement>,
    /// Top-level ids as they were selected
    pub roots: Vec<ElementId>,
}

impl Clipboard {
    /// Capture `ids` and their descendant closure. `None` if nothing matches.
    pub fn capture(elements: &ElementMap, ids: &[ElementId]) -> Option<Self> {
        let roots = existing_unique(elements, ids);
        if roots.is_empty() {
            return None;
        }
        let closure = descendant_closure(elements, &roots);
        let members: HashSet<&str> = closure.iter().map(String::as_str).collect();

        let mut copied = Vec::with_capacity(closure.len());
        for id in ordered_ids(elements) {
            if !members.contains(id.as_str()) {
                continue;
            }
            let Some(source) = elements.get(&id) else {
                continue;
            };
            let mut element = source.clone();
            let parent_copied = element
                .parent_id
                .as_deref()
                .is_some_and(|p| members.contains(p));
            if !parent_copied && element.parent_id.is_some() {
                if let Some(world) = world_transform(elements, &id) {
                    world.apply_to(&mut element);
                }
                element.parent_id = None;
            }
            if let Some(children) = element.kind.children_mut() {
                children.retain(|c| members.contains(c.as_str()));
            }
            copied.push(element);
        }

        Some(Self {
            elements: copied,
            roots,
        })
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl SceneState {
    /// Put the given elements and their descendants on the clipboard.
    /// Returns the number of copied elements.
    pub fn copy(&mut self, ids: &[ElementId]) -> usize {
        match Clipboard::capture(&self.elements, ids) {
            Some(clipboard) => {
                let count = clipboard.len();
                tracing::debug!("copied {} element(s)", count);
                self.clipboard = Some(clipboard);
                count
            }
            None => 0,
        }
    }

    /// Insert a fresh copy of the clipboard and select its top-level elements
    pub fn paste(&mut self) -> Vec<ElementId> {
        match self.clipboard.clone() {
            Some(clipboard) if !clipboard.is_empty() => self.insert_copies(&clipboard),
            _ => Vec::new(),
        }
    }

    /// Copy-and-paste in one step without touching the clipboard
    pub fn duplicate(&mut self, ids: &[ElementId]) -> Vec<ElementId> {
        match Clipboard::capture(&self.elements, ids) {
            Some(source) => self.insert_copies(&source),
            None => Vec::new(),
        }
    }

    /// Insert `source` under new ids, remapping parent and child references,
    /// nudged by the paste offset and ordered after everything present.
    ///
    /// The offset is added to every element's stored (local) position, nested
    /// ones included. A pasted container therefore moves by one offset while
    /// its members move by the offset composed through their parent chain.
    fn insert_copies(&mut self, source: &Clipboard) -> Vec<ElementId> {
        self.save_undo();

        let id_map: HashMap<&str, ElementId> = source
            .elements
            .iter()
            .map(|e| (e.id.as_str(), new_id()))
            .collect();
        let offset = DVec3::from_array(self.settings.paste_offset);
        let mut order = self.next_order();

        for original in &source.elements {
            let Some(fresh) = id_map.get(original.id.as_str()) else {
                continue;
            };
            let mut element = original.clone();
            element.id = fresh.clone();
            element.parent_id = original
                .parent_id
                .as_deref()
                .and_then(|p| id_map.get(p))
                .cloned();
            if let Some(children) = element.kind.children_mut() {
                *children = children
                    .iter()
                    .filter_map(|c| id_map.get(c.as_str()).cloned())
                    .collect();
            }
            element.position = (DVec3::from_array(element.position) + offset).to_array();
            element.order = order;
            order += 1;
            self.elements.insert(element.id.clone(), element);
        }

        let roots: Vec<ElementId> = source
            .roots
            .iter()
            .filter_map(|r| id_map.get(r.as_str()).cloned())
            .collect();
        self.selection.set(roots.clone());

        tracing::debug!("inserted {} copied element(s)", source.len());
        self.version += 1;
        roots
    }
}
