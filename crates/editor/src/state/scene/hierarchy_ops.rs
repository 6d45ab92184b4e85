//! Grouping, ungrouping and CSG subtraction
//!
//! New containers are created at root. Their members are rewritten from
//! world space: translation is rebased onto the container, rotation and
//! scale keep their world values as-is.

use glam::DVec3;
use shared::{ElementId, ElementKind, ElementMap, SceneElement};

use super::{
    descendant_closure, detach_from_parent, existing_unique, is_subtraction_operand, new_id,
    SceneState,
};
use crate::math::{combined_aabb, world_transform, Transform};

impl SceneState {
    /// Wrap two or more elements in a new group centered on their bounds.
    ///
    /// Returns `None` (and changes nothing) with fewer than two usable ids or
    /// when any of them is a subtraction operand.
    pub fn group(&mut self, ids: &[ElementId]) -> Option<ElementId> {
        let members = existing_unique(&self.elements, ids);
        if members.len() < 2 {
            tracing::debug!("group: need at least 2 elements, got {}", members.len());
            return None;
        }
        if members.iter().any(|id| is_subtraction_operand(&self.elements, id)) {
            tracing::warn!("group: refusing to take operands out of a subtraction");
            return None;
        }

        let closure = descendant_closure(&self.elements, &members);
        let center = combined_aabb(&self.elements, &closure)
            .map(|b| b.center())
            .unwrap_or_else(|| world_center(&self.elements, &members));

        self.save_undo();
        let group_id = new_id();
        let order = self.next_order();
        let name = format!("Group {}", self.count_kind(|k| k.is_group()) + 1);
        let mut group = SceneElement::new(
            group_id.clone(),
            name,
            ElementKind::Group { children: members.clone() },
            order,
        );
        group.position = center.to_array();

        self.adopt(&group_id, &members, center, |world, _| world);
        self.elements.insert(group_id.clone(), group);
        self.selection.set(vec![group_id.clone()]);

        tracing::debug!("grouped {} element(s) into {}", members.len(), group_id);
        self.version += 1;
        Some(group_id)
    }

    /// Dissolve every selected group, moving its children to root with their
    /// world transforms. Non-group ids carry over into the new selection.
    pub fn ungroup(&mut self, ids: &[ElementId]) -> Vec<ElementId> {
        let targets = existing_unique(&self.elements, ids);
        let has_group = targets
            .iter()
            .any(|id| self.elements.get(id).is_some_and(|e| e.kind.is_group()));
        if !has_group {
            return Vec::new();
        }
        self.save_undo();

        let mut selection = Vec::new();
        for id in targets {
            let children = match self.elements.get(&id).map(|e| &e.kind) {
                Some(ElementKind::Group { children }) => children.clone(),
                Some(_) => {
                    selection.push(id);
                    continue;
                }
                None => continue,
            };

            let worlds: Vec<(ElementId, Transform)> = children
                .iter()
                .filter_map(|c| world_transform(&self.elements, c).map(|w| (c.clone(), w)))
                .collect();
            for (child, world) in worlds {
                if let Some(element) = self.elements.get_mut(&child) {
                    world.apply_to(element);
                    element.parent_id = None;
                }
                selection.push(child);
            }

            detach_from_parent(&mut self.elements, &id);
            self.elements.remove(&id);
            tracing::debug!("ungrouped {}", id);
        }

        self.selection.set(selection.clone());
        self.version += 1;
        selection
    }

    /// Combine exactly two primitives into a subtraction. The operand with
    /// the lower `(order, id)` is the base; the other is cut away from it.
    pub fn subtract(&mut self, ids: &[ElementId]) -> Option<ElementId> {
        let operands = existing_unique(&self.elements, ids);
        if operands.len() != 2 {
            tracing::debug!("subtract: need exactly 2 elements, got {}", operands.len());
            return None;
        }
        let mut pair: Vec<&SceneElement> = operands
            .iter()
            .filter_map(|id| self.elements.get(id))
            .filter(|e| e.kind.primitive().is_some())
            .collect();
        if pair.len() != 2 {
            tracing::debug!("subtract: operands must be primitive shapes");
            return None;
        }
        if operands.iter().any(|id| is_subtraction_operand(&self.elements, id)) {
            tracing::warn!("subtract: element is already an operand");
            return None;
        }
        pair.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        let ordered: Vec<ElementId> = pair.iter().map(|e| e.id.clone()).collect();

        let center = combined_aabb(&self.elements, &ordered)
            .map(|b| b.center())
            .unwrap_or_else(|| world_center(&self.elements, &ordered));

        self.save_undo();
        let sub_id = new_id();
        let order = self.next_order();
        let name = format!(
            "Subtraction {}",
            self.count_kind(|k| matches!(k, ElementKind::Subtraction { .. })) + 1
        );
        let mut subtraction = SceneElement::new(
            sub_id.clone(),
            name,
            ElementKind::Subtraction { children: ordered.clone() },
            order,
        );
        subtraction.position = center.to_array();

        self.adopt(&sub_id, &ordered, center, |world, local| Transform {
            position: world.position,
            rotation: local.rotation,
            scale: local.scale,
        });
        self.elements.insert(sub_id.clone(), subtraction);
        self.selection.set(vec![sub_id.clone()]);

        tracing::debug!("subtraction {} = {} - {}", sub_id, ordered[0], ordered[1]);
        self.version += 1;
        Some(sub_id)
    }

    /// Reparent `members` under a new root container at `center`.
    ///
    /// `pick` chooses the stored transform from (world, local); its position
    /// is then rebased by subtracting `center`.
    fn adopt<F>(&mut self, container: &str, members: &[ElementId], center: DVec3, pick: F)
    where
        F: Fn(Transform, Transform) -> Transform,
    {
        let rewritten: Vec<(ElementId, Transform)> = members
            .iter()
            .filter_map(|id| {
                let local = Transform::of(self.elements.get(id)?);
                let world = world_transform(&self.elements, id)?;
                let mut next = pick(world, local);
                next.position = (DVec3::from_array(world.position) - center).to_array();
                Some((id.clone(), next))
            })
            .collect();

        for (id, transform) in rewritten {
            detach_from_parent(&mut self.elements, &id);
            if let Some(element) = self.elements.get_mut(&id) {
                transform.apply_to(element);
                element.parent_id = Some(container.to_string());
            }
        }
    }

    fn count_kind(&self, pred: impl Fn(&ElementKind) -> bool) -> usize {
        self.elements.values().filter(|e| pred(&e.kind)).count()
    }
}

/// Mean world position, used when nothing in the set has bounds
fn world_center(elements: &ElementMap, ids: &[ElementId]) -> DVec3 {
    let positions: Vec<DVec3> = ids
        .iter()
        .filter_map(|id| world_transform(elements, id))
        .map(|w| DVec3::from_array(w.position))
        .collect();
    if positions.is_empty() {
        return DVec3::ZERO;
    }
    positions.iter().copied().sum::<DVec3>() / positions.len() as f64
}
