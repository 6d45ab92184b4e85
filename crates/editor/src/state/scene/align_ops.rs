//! Alignment of the selection along one axis

use glam::DVec3;
use shared::ElementId;

use super::{descendant_closure, existing_unique, SceneState};
use crate::math::{combined_aabb, world_delta_to_local, AlignAnchor, Axis};

/// World-space moves below this size are skipped
const ALIGN_EPSILON: f64 = 1e-9;

impl SceneState {
    /// Line up the selected elements on the `anchor` side of their combined
    /// bounds along `axis`.
    ///
    /// Bounds come from leaf descendants only. Each directly selected element
    /// is moved by a world delta expressed in its parent's local space.
    /// Returns `false` when fewer than two elements are selected or nothing
    /// has bounds; no history is recorded when nothing needs to move.
    pub fn align(&mut self, axis: Axis, anchor: AlignAnchor) -> bool {
        let selected = existing_unique(&self.elements, self.selection.all());
        if selected.len() < 2 {
            return false;
        }
        let closure = descendant_closure(&self.elements, &selected);
        let Some(combined) = combined_aabb(&self.elements, &closure) else {
            return false;
        };
        let target = combined.anchor(axis, anchor);

        let moves: Vec<(ElementId, DVec3)> = selected
            .iter()
            .filter_map(|id| {
                let own_ids = descendant_closure(&self.elements, std::slice::from_ref(id));
                let own = combined_aabb(&self.elements, &own_ids)?;
                let delta = target - own.anchor(axis, anchor);
                if delta.abs() < ALIGN_EPSILON {
                    return None;
                }
                let element = self.elements.get(id)?;
                let local = world_delta_to_local(&self.elements, element, axis.unit() * delta);
                Some((id.clone(), local))
            })
            .collect();

        if moves.is_empty() {
            return true;
        }
        self.save_undo();
        for (id, local) in &moves {
            if let Some(element) = self.elements.get_mut(id) {
                let moved = DVec3::from_array(element.position) + *local;
                element.position = moved.to_array();
            }
        }
        tracing::debug!("aligned {} element(s) on {:?} {:?}", moves.len(), axis, anchor);
        self.version += 1;
        true
    }
}
