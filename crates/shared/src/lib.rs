use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier of a scene element
pub type ElementId = String;

/// Element table keyed by id. Ordering lives in `SceneElement::order`.
pub type ElementMap = HashMap<ElementId, SceneElement>;

/// Project file format version understood by this build
pub const PROJECT_VERSION: u32 = 1;

/// Order value used when a loaded element carries none
pub const UNASSIGNED_ORDER: i64 = -1;

/// Corner radius range for boxes
pub const CORNER_RADIUS_RANGE: (f64, f64) = (0.0, 0.5);

/// Tube thickness range for tori
pub const TUBE_THICKNESS_RANGE: (f64, f64) = (0.05, 0.95);

fn unassigned_order() -> i64 {
    UNASSIGNED_ORDER
}

fn default_scale() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

fn default_color() -> String {
    "#9ca3af".to_string()
}

/// Primitive shapes that can be added directly from the toolbar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Box,
    Sphere,
    Cylinder,
    Torus,
    Cone,
    Pyramid,
    Heart,
    Star,
}

impl PrimitiveKind {
    /// All primitive shapes, in toolbar order
    pub fn all() -> &'static [PrimitiveKind] {
        &[
            PrimitiveKind::Box,
            PrimitiveKind::Sphere,
            PrimitiveKind::Cylinder,
            PrimitiveKind::Torus,
            PrimitiveKind::Cone,
            PrimitiveKind::Pyramid,
            PrimitiveKind::Heart,
            PrimitiveKind::Star,
        ]
    }

    /// Human-readable label, used for generated names
    pub fn label(&self) -> &'static str {
        match self {
            PrimitiveKind::Box => "Box",
            PrimitiveKind::Sphere => "Sphere",
            PrimitiveKind::Cylinder => "Cylinder",
            PrimitiveKind::Torus => "Torus",
            PrimitiveKind::Cone => "Cone",
            PrimitiveKind::Pyramid => "Pyramid",
            PrimitiveKind::Heart => "Heart",
            PrimitiveKind::Star => "Star",
        }
    }

    /// Element kind with shape attributes left at their defaults
    pub fn into_kind(self) -> ElementKind {
        match self {
            PrimitiveKind::Box => ElementKind::Box { corner_radius: None },
            PrimitiveKind::Sphere => ElementKind::Sphere,
            PrimitiveKind::Cylinder => ElementKind::Cylinder,
            PrimitiveKind::Torus => ElementKind::Torus { tube_thickness: None },
            PrimitiveKind::Cone => ElementKind::Cone,
            PrimitiveKind::Pyramid => ElementKind::Pyramid,
            PrimitiveKind::Heart => ElementKind::Heart,
            PrimitiveKind::Star => ElementKind::Star,
        }
    }
}

/// What an element is. Containers carry their authoritative member list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ElementKind {
    Box {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        corner_radius: Option<f64>,
    },
    Sphere,
    Cylinder,
    Torus {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tube_thickness: Option<f64>,
    },
    Cone,
    Pyramid,
    Heart,
    Star,
    /// Imported mesh; the source text is never interpreted by the store
    Mesh { mesh_source: String },
    /// Pure hierarchy container
    Group {
        #[serde(default)]
        children: Vec<ElementId>,
    },
    /// CSG container: `children[0]` minus `children[1]`
    Subtraction {
        #[serde(default)]
        children: Vec<ElementId>,
    },
}

impl ElementKind {
    /// Primitive shape of this kind, if it is one
    pub fn primitive(&self) -> Option<PrimitiveKind> {
        match self {
            ElementKind::Box { .. } => Some(PrimitiveKind::Box),
            ElementKind::Sphere => Some(PrimitiveKind::Sphere),
            ElementKind::Cylinder => Some(PrimitiveKind::Cylinder),
            ElementKind::Torus { .. } => Some(PrimitiveKind::Torus),
            ElementKind::Cone => Some(PrimitiveKind::Cone),
            ElementKind::Pyramid => Some(PrimitiveKind::Pyramid),
            ElementKind::Heart => Some(PrimitiveKind::Heart),
            ElementKind::Star => Some(PrimitiveKind::Star),
            ElementKind::Mesh { .. } | ElementKind::Group { .. } | ElementKind::Subtraction { .. } => None,
        }
    }

    /// Group or subtraction
    pub fn is_container(&self) -> bool {
        matches!(self, ElementKind::Group { .. } | ElementKind::Subtraction { .. })
    }

    pub fn is_group(&self) -> bool {
        matches!(self, ElementKind::Group { .. })
    }

    /// Member list of a container
    pub fn children(&self) -> Option<&[ElementId]> {
        match self {
            ElementKind::Group { children } | ElementKind::Subtraction { children } => Some(children),
            _ => None,
        }
    }

    /// Mutable member list of a container
    pub fn children_mut(&mut self) -> Option<&mut Vec<ElementId>> {
        match self {
            ElementKind::Group { children } | ElementKind::Subtraction { children } => Some(children),
            _ => None,
        }
    }

    /// Short tag used in names and logs
    pub fn label(&self) -> &'static str {
        match self {
            ElementKind::Mesh { .. } => "Mesh",
            ElementKind::Group { .. } => "Group",
            ElementKind::Subtraction { .. } => "Subtraction",
            other => other.primitive().map(|p| p.label()).unwrap_or("Element"),
        }
    }
}

/// A node of the scene graph; the only persisted entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneElement {
    pub id: ElementId,
    pub name: String,
    #[serde(flatten)]
    pub kind: ElementKind,
    /// Global sequencing key; negative means not yet assigned
    #[serde(default = "unassigned_order")]
    pub order: i64,
    #[serde(default)]
    pub position: [f64; 3],
    /// Euler angles in radians, XYZ order
    #[serde(default)]
    pub rotation: [f64; 3],
    #[serde(default = "default_scale")]
    pub scale: [f64; 3],
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ElementId>,
}

impl SceneElement {
    /// Root element with identity transform
    pub fn new(id: impl Into<ElementId>, name: impl Into<String>, kind: ElementKind, order: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            order,
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
            color: default_color(),
            parent_id: None,
        }
    }

    pub fn has_order(&self) -> bool {
        self.order >= 0
    }
}

/// Partial update merged into an element. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tube_thickness: Option<f64>,
}

impl ElementPatch {
    /// Patch carrying a full transform, as committed at the end of a gizmo drag
    pub fn transform(position: [f64; 3], rotation: [f64; 3], scale: [f64; 3]) -> Self {
        Self {
            position: Some(position),
            rotation: Some(rotation),
            scale: Some(scale),
            ..Default::default()
        }
    }
}

/// Exported/imported project file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFile {
    pub version: u32,
    pub name: String,
    pub elements: ElementMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Record exchanged with the persistence layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredScene {
    pub id: String,
    pub name: String,
    pub elements: ElementMap,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
