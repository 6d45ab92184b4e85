//! Element CRUD, ordering and whole-scene replacement

use std::collections::HashSet;

use rand::Rng;
use shared::{
    ElementId, ElementKind, ElementMap, ElementPatch, PrimitiveKind, SceneElement,
    CORNER_RADIUS_RANGE, TUBE_THICKNESS_RANGE,
};

use super::{descendant_closure, new_id, SceneState};

impl SceneState {
    /// Add a primitive at the origin (plus jitter) and select it
    pub fn add(&mut self, kind: PrimitiveKind) -> ElementId {
        let count = self
            .elements
            .values()
            .filter(|e| e.kind.primitive() == Some(kind))
            .count();
        let name = format!("{} {}", kind.label(), count + 1);
        let color = self.settings.color_for(kind);
        self.insert_root(name, kind.into_kind(), color)
    }

    /// Add an imported mesh. `mesh_source` is stored verbatim.
    pub fn add_imported_mesh(&mut self, name: impl Into<String>, mesh_source: String) -> ElementId {
        let color = self.settings.mesh_color.clone();
        self.insert_root(name.into(), ElementKind::Mesh { mesh_source }, color)
    }

    fn insert_root(&mut self, name: String, kind: ElementKind, color: String) -> ElementId {
        self.save_undo();

        let id = new_id();
        let mut element = SceneElement::new(id.clone(), name, kind, self.next_order());
        element.position = self.jitter();
        element.color = color;

        tracing::debug!("add {} '{}' ({})", element.kind.label(), element.name, id);
        self.elements.insert(id.clone(), element);
        self.selection.select(id.clone());
        self.version += 1;
        id
    }

    /// Small random X/Z offset so stacked additions don't fully overlap
    fn jitter(&self) -> [f64; 3] {
        let range = self.settings.add_jitter;
        if range <= 0.0 {
            return [0.0; 3];
        }
        let mut rng = rand::rng();
        [
            rng.random_range(-range..=range),
            0.0,
            rng.random_range(-range..=range),
        ]
    }

    /// Merge the set fields of `patch` into an element.
    ///
    /// Returns `false` without touching history when the id is unknown.
    /// Shape attributes are clamped and ignored on kinds that lack them.
    /// A patch that leaves the element unchanged records no history.
    pub fn update(&mut self, id: &str, patch: ElementPatch) -> bool {
        let Some(current) = self.elements.get(id) else {
            return false;
        };
        let mut element = current.clone();
        if let Some(name) = patch.name {
            element.name = name;
        }
        if let Some(position) = patch.position {
            element.position = position;
        }
        if let Some(rotation) = patch.rotation {
            element.rotation = rotation;
        }
        if let Some(scale) = patch.scale {
            element.scale = scale;
        }
        if let Some(color) = patch.color {
            element.color = color;
        }
        match &mut element.kind {
            ElementKind::Box { corner_radius } => {
                if let Some(r) = patch.corner_radius {
                    *corner_radius = Some(r.clamp(CORNER_RADIUS_RANGE.0, CORNER_RADIUS_RANGE.1));
                }
            }
            ElementKind::Torus { tube_thickness } => {
                if let Some(t) = patch.tube_thickness {
                    *tube_thickness = Some(t.clamp(TUBE_THICKNESS_RANGE.0, TUBE_THICKNESS_RANGE.1));
                }
            }
            _ => {}
        }
        if element == *current {
            return true;
        }

        self.save_undo();
        self.elements.insert(id.to_string(), element);
        self.version += 1;
        true
    }

    /// Remove elements together with all their descendants.
    ///
    /// Removed ids are dropped from the selection and from the member lists
    /// of surviving containers. Returns the removed ids.
    pub fn remove(&mut self, ids: &[ElementId]) -> Vec<ElementId> {
        let closure = descendant_closure(&self.elements, ids);
        if closure.is_empty() {
            return closure;
        }
        self.save_undo();

        for id in &closure {
            self.elements.remove(id);
        }
        let removed: HashSet<&str> = closure.iter().map(String::as_str).collect();
        for element in self.elements.values_mut() {
            if let Some(children) = element.kind.children_mut() {
                children.retain(|c| !removed.contains(c.as_str()));
            }
        }
        self.selection.remove_ids(&closure);

        tracing::debug!("removed {} element(s)", closure.len());
        self.version += 1;
        closure
    }

    /// Move `active_id` to sit immediately before `over_id` in the global
    /// order, then renumber every element 0..N-1.
    pub fn reorder(&mut self, active_id: &str, over_id: &str) -> bool {
        if active_id == over_id
            || !self.elements.contains_key(active_id)
            || !self.elements.contains_key(over_id)
        {
            return false;
        }
        self.save_undo();

        let mut sequence = self.ordered_ids();
        sequence.retain(|id| id != active_id);
        let target = sequence
            .iter()
            .position(|id| id == over_id)
            .unwrap_or(sequence.len());
        sequence.insert(target, active_id.to_string());

        for (index, id) in sequence.iter().enumerate() {
            if let Some(element) = self.elements.get_mut(id) {
                element.order = index as i64;
            }
        }
        self.version += 1;
        true
    }

    /// Replace the whole table.
    ///
    /// Elements without an order get sequential values after the current
    /// maximum, in id order. Selection, clipboard and history are reset.
    pub fn load_scene(&mut self, elements: ElementMap) {
        let mut table = ElementMap::with_capacity(elements.len());
        for (key, element) in elements {
            if key != element.id {
                tracing::warn!("element keyed as '{}' has id '{}'; using the id", key, element.id);
            }
            table.insert(element.id.clone(), element);
        }

        let mut next = table
            .values()
            .filter(|e| e.has_order())
            .map(|e| e.order + 1)
            .max()
            .unwrap_or(0);
        let mut unordered: Vec<ElementId> = table
            .values()
            .filter(|e| !e.has_order())
            .map(|e| e.id.clone())
            .collect();
        unordered.sort();
        for id in unordered {
            if let Some(element) = table.get_mut(&id) {
                element.order = next;
                next += 1;
            }
        }

        tracing::info!("loaded scene with {} element(s)", table.len());
        self.elements = table;
        self.reset_session();
    }

    /// Empty the table and reset selection, clipboard and history
    pub fn reset_scene(&mut self) {
        self.elements.clear();
        self.reset_session();
    }

    fn reset_session(&mut self) {
        self.selection.clear();
        self.clipboard = None;
        self.history.clear();
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::settings::EditorSettings;

    fn scene() -> SceneState {
        SceneState::with_settings(EditorSettings {
            add_jitter: 0.0,
            ..Default::default()
        })
    }

    #[test]
    fn test_add_assigns_name_order_and_selection() {
        let mut s = scene();
        let a = s.add(PrimitiveKind::Box);
        let b = s.add(PrimitiveKind::Box);
        let c = s.add(PrimitiveKind::Sphere);
        assert_eq!(s.get(&a).unwrap().name, "Box 1");
        assert_eq!(s.get(&b).unwrap().name, "Box 2");
        assert_eq!(s.get(&c).unwrap().name, "Sphere 1");
        assert_eq!(s.get(&c).unwrap().order, 2);
        assert_eq!(s.selection().all(), &[c]);
    }

    #[test]
    fn test_add_jitter_stays_in_range() {
        let mut s = SceneState::default();
        for _ in 0..20 {
            let id = s.add(PrimitiveKind::Cone);
            let p = s.get(&id).unwrap().position;
            assert!(p[0].abs() <= 0.5 && p[2].abs() <= 0.5);
            assert_eq!(p[1], 0.0);
        }
    }

    #[test]
    fn test_add_imported_mesh_keeps_source() {
        let mut s = scene();
        let id = s.add_imported_mesh("teapot", "v 1 2 3\n".to_string());
        let el = s.get(&id).unwrap();
        assert_eq!(el.name, "teapot");
        assert_eq!(el.kind, ElementKind::Mesh { mesh_source: "v 1 2 3\n".to_string() });
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut s = scene();
        s.add(PrimitiveKind::Box);
        let undo_before = s.history.undo_len();
        assert!(!s.update("nope", ElementPatch::transform([1.0; 3], [0.0; 3], [1.0; 3])));
        assert_eq!(s.history.undo_len(), undo_before);
    }

    #[test]
    fn test_update_clamps_shape_attributes() {
        let mut s = scene();
        let b = s.add(PrimitiveKind::Box);
        let t = s.add(PrimitiveKind::Torus);
        s.update(&b, ElementPatch { corner_radius: Some(2.0), ..Default::default() });
        s.update(&t, ElementPatch { tube_thickness: Some(0.0), ..Default::default() });
        assert_eq!(s.get(&b).unwrap().kind, ElementKind::Box { corner_radius: Some(0.5) });
        assert_eq!(s.get(&t).unwrap().kind, ElementKind::Torus { tube_thickness: Some(0.05) });
    }

    #[test]
    fn test_update_without_effect_records_nothing() {
        let mut s = scene();
        let sphere = s.add(PrimitiveKind::Sphere);
        let b = s.add(PrimitiveKind::Box);
        let undo_before = s.history.undo_len();
        let version = s.version();

        assert!(s.update(&sphere, ElementPatch { corner_radius: Some(0.2), ..Default::default() }));
        assert!(s.update(&sphere, ElementPatch { tube_thickness: Some(0.2), ..Default::default() }));
        assert!(s.update(&b, ElementPatch::default()));
        let position = s.get(&b).unwrap().position;
        assert!(s.update(&b, ElementPatch { position: Some(position), ..Default::default() }));

        assert_eq!(s.history.undo_len(), undo_before);
        assert_eq!(s.version(), version);
        assert_eq!(s.get(&sphere).unwrap().kind, ElementKind::Sphere);
    }

    #[test]
    fn test_update_merges_only_given_fields() {
        let mut s = scene();
        let id = s.add(PrimitiveKind::Sphere);
        s.update(&id, ElementPatch { name: Some("Ball".into()), ..Default::default() });
        s.update(&id, ElementPatch { color: Some("#000000".into()), ..Default::default() });
        let el = s.get(&id).unwrap();
        assert_eq!(el.name, "Ball");
        assert_eq!(el.color, "#000000");
        assert_eq!(el.scale, [1.0; 3]);
    }

    #[test]
    fn test_reorder_moves_before_target_and_renumbers() {
        let mut s = scene();
        let a = s.add(PrimitiveKind::Box);
        let b = s.add(PrimitiveKind::Box);
        let c = s.add(PrimitiveKind::Box);
        assert!(s.reorder(&c, &a));
        assert_eq!(s.ordered_ids(), vec![c.clone(), a.clone(), b.clone()]);
        assert_eq!(s.get(&c).unwrap().order, 0);
        assert_eq!(s.get(&a).unwrap().order, 1);
        assert_eq!(s.get(&b).unwrap().order, 2);
    }

    #[test]
    fn test_reorder_same_or_missing_is_noop() {
        let mut s = scene();
        let a = s.add(PrimitiveKind::Box);
        let undo_before = s.history.undo_len();
        assert!(!s.reorder(&a, &a));
        assert!(!s.reorder(&a, "missing"));
        assert_eq!(s.history.undo_len(), undo_before);
    }

    #[test]
    fn test_load_scene_normalizes_missing_orders() {
        let mut s = scene();
        s.add(PrimitiveKind::Box);
        let mut elements = ElementMap::new();
        for (id, order) in [("z", -1), ("k", 4), ("a", -1)] {
            elements.insert(id.to_string(), SceneElement::new(id, id, ElementKind::Cone, order));
        }
        s.load_scene(elements);
        assert_eq!(s.get("k").unwrap().order, 4);
        assert_eq!(s.get("a").unwrap().order, 5);
        assert_eq!(s.get("z").unwrap().order, 6);
        assert!(!s.can_undo());
        assert_eq!(s.selection().count(), 0);
    }

    #[test]
    fn test_reset_scene_clears_everything() {
        let mut s = scene();
        let id = s.add(PrimitiveKind::Box);
        s.copy(&[id]);
        s.reset_scene();
        assert!(s.is_empty());
        assert!(s.clipboard().is_none());
        assert!(!s.can_undo());
    }
}
