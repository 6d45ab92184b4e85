//! Transform composition and bounding extents
//!
//! Element transforms are stored as position / Euler XYZ rotation / scale,
//! local to the parent. Everything here is a pure function of the element
//! table.

use glam::{DMat4, DQuat, DVec3, EulerRot};
use serde::{Deserialize, Serialize};
use shared::{ElementId, ElementKind, ElementMap, PrimitiveKind, SceneElement};

/// Scale components smaller than this are treated as degenerate
const MIN_SCALE: f64 = 1e-9;

/// Coordinate axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(&self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn unit(&self) -> DVec3 {
        match self {
            Axis::X => DVec3::X,
            Axis::Y => DVec3::Y,
            Axis::Z => DVec3::Z,
        }
    }
}

/// Which side of a bounding box an alignment targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignAnchor {
    Min,
    Max,
    Center,
}

/// Position / rotation / scale triple, either local or world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: [f64; 3],
    /// Euler XYZ, radians
    pub rotation: [f64; 3],
    pub scale: [f64; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

impl Transform {
    /// Local transform stored on an element
    pub fn of(element: &SceneElement) -> Self {
        Self {
            position: element.position,
            rotation: element.rotation,
            scale: element.scale,
        }
    }

    pub fn quat(&self) -> DQuat {
        let [x, y, z] = self.rotation;
        DQuat::from_euler(EulerRot::XYZ, x, y, z)
    }

    pub fn matrix(&self) -> DMat4 {
        DMat4::from_scale_rotation_translation(
            DVec3::from_array(self.scale),
            self.quat(),
            DVec3::from_array(self.position),
        )
    }

    pub fn from_matrix(m: &DMat4) -> Self {
        let (scale, rotation, translation) = m.to_scale_rotation_translation();
        let (x, y, z) = rotation.to_euler(EulerRot::XYZ);
        Self {
            position: translation.to_array(),
            rotation: [x, y, z],
            scale: scale.to_array(),
        }
    }

    /// Write this transform into an element's stored fields
    pub fn apply_to(&self, element: &mut SceneElement) {
        element.position = self.position;
        element.rotation = self.rotation;
        element.scale = self.scale;
    }
}

/// Ancestor chain of `id`, root first, ending with `id` itself.
///
/// Stops at a missing parent or when the chain grows longer than the table,
/// which only happens with corrupted (cyclic) input.
fn ancestor_chain<'a>(elements: &'a ElementMap, id: &str) -> Vec<&'a SceneElement> {
    let mut chain = Vec::new();
    let mut current = elements.get(id);
    while let Some(el) = current {
        if chain.len() > elements.len() {
            break;
        }
        chain.push(el);
        current = el.parent_id.as_deref().and_then(|p| elements.get(p));
    }
    chain.reverse();
    chain
}

/// World matrix of an element, composed through its parent chain
pub fn world_matrix(elements: &ElementMap, id: &str) -> DMat4 {
    ancestor_chain(elements, id)
        .iter()
        .fold(DMat4::IDENTITY, |acc, el| acc * Transform::of(el).matrix())
}

/// World matrix of an element's parent (identity for roots)
pub fn parent_world_matrix(elements: &ElementMap, element: &SceneElement) -> DMat4 {
    match element.parent_id.as_deref() {
        Some(parent) if elements.contains_key(parent) => world_matrix(elements, parent),
        _ => DMat4::IDENTITY,
    }
}

/// World transform of an element.
///
/// Root elements return their stored values untouched so that Euler angles
/// are not renormalized by a matrix round trip.
pub fn world_transform(elements: &ElementMap, id: &str) -> Option<Transform> {
    let element = elements.get(id)?;
    let has_parent = element
        .parent_id
        .as_deref()
        .is_some_and(|p| elements.contains_key(p));
    if !has_parent {
        return Some(Transform::of(element));
    }
    Some(Transform::from_matrix(&world_matrix(elements, id)))
}

/// Convert a world-space translation into the local space of `element`'s parent.
///
/// Applies the inverse parent rotation, then the inverse parent scale.
pub fn world_delta_to_local(elements: &ElementMap, element: &SceneElement, delta: DVec3) -> DVec3 {
    let parent = parent_world_matrix(elements, element);
    let (scale, rotation, _) = parent.to_scale_rotation_translation();
    let rotated = rotation.inverse() * delta;
    DVec3::new(
        divide_scale(rotated.x, scale.x),
        divide_scale(rotated.y, scale.y),
        divide_scale(rotated.z, scale.z),
    )
}

fn divide_scale(value: f64, scale: f64) -> f64 {
    if scale.abs() < MIN_SCALE {
        0.0
    } else {
        value / scale
    }
}

/// Half-size of a unit primitive along each axis. Containers have no own geometry.
pub fn half_extents(kind: &ElementKind) -> Option<DVec3> {
    let extents = match kind {
        ElementKind::Group { .. } | ElementKind::Subtraction { .. } => return None,
        ElementKind::Mesh { .. } => DVec3::splat(0.5),
        other => match other.primitive()? {
            PrimitiveKind::Box => DVec3::splat(0.5),
            PrimitiveKind::Sphere => DVec3::splat(0.5),
            PrimitiveKind::Cylinder => DVec3::splat(0.5),
            PrimitiveKind::Torus => DVec3::new(0.5, 0.5, 0.2),
            PrimitiveKind::Cone => DVec3::splat(0.5),
            PrimitiveKind::Pyramid => DVec3::splat(0.5),
            PrimitiveKind::Heart => DVec3::new(0.5, 0.5, 0.25),
            PrimitiveKind::Star => DVec3::new(0.5, 0.5, 0.2),
        },
    };
    Some(extents)
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    pub fn from_center_half(center: DVec3, half: DVec3) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Coordinate of the box at `anchor` along `axis`
    pub fn anchor(&self, axis: Axis, anchor: AlignAnchor) -> f64 {
        let i = axis.index();
        match anchor {
            AlignAnchor::Min => self.min[i],
            AlignAnchor::Max => self.max[i],
            AlignAnchor::Center => self.center()[i],
        }
    }
}

/// World-space box of a single leaf element, using the half-extent table
/// scaled by world scale. `None` for containers and unknown ids.
pub fn leaf_aabb(elements: &ElementMap, id: &str) -> Option<Aabb> {
    let element = elements.get(id)?;
    let half = half_extents(&element.kind)?;
    let world = world_transform(elements, id)?;
    let scale = DVec3::from_array(world.scale).abs();
    Some(Aabb::from_center_half(
        DVec3::from_array(world.position),
        half * scale,
    ))
}

/// Combined box over the given ids. Containers contribute nothing of their
/// own, so callers pass a descendant closure.
pub fn combined_aabb<'a, I>(elements: &ElementMap, ids: I) -> Option<Aabb>
where
    I: IntoIterator<Item = &'a ElementId>,
{
    ids.into_iter()
        .filter_map(|id| leaf_aabb(elements, id))
        .reduce(|acc, b| acc.union(&b))
}
