//! Scene export builder
//!
//! Reconstructs a renderable tree from the normalized element table:
//! elements are grouped by parent, siblings sorted by `(order, id)`, and
//! each node carries its resolved geometry, local transform and children.
//! Integrity problems are collected per node; the node and its subtree are
//! left out while the rest of the scene still builds.

use std::collections::{HashMap, HashSet};

use shared::{ElementId, ElementKind, ElementMap, SceneElement};

use crate::error::BuildError;
use crate::mesh::{MeshCodec, MeshData};

/// Torus tube thickness when none is set
pub const DEFAULT_TUBE_THICKNESS: f64 = 0.3;

/// Resolved geometry of a node
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Rounded when `corner_radius > 0`
    Box { corner_radius: f64 },
    Sphere,
    Cylinder,
    Torus { tube_thickness: f64 },
    Cone,
    Pyramid,
    Heart,
    Star,
    Mesh(MeshData),
    /// No own geometry
    Group,
    /// `children[0]` minus `children[1]`
    Subtraction,
}

/// One node of the export tree
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub id: ElementId,
    pub name: String,
    pub geometry: Geometry,
    pub position: [f64; 3],
    pub rotation: [f64; 3],
    pub scale: [f64; 3],
    pub color: String,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    /// Depth-first search for a node by id
    pub fn find(&self, id: &str) -> Option<&SceneNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    /// Number of nodes in this subtree
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::count).sum::<usize>()
    }
}

/// Result of a build: the root nodes plus per-element failures
#[derive(Debug, Clone, Default)]
pub struct SceneBuild {
    pub roots: Vec<SceneNode>,
    pub errors: HashMap<ElementId, BuildError>,
}

impl SceneBuild {
    pub fn find(&self, id: &str) -> Option<&SceneNode> {
        self.roots.iter().find_map(|r| r.find(id))
    }

    pub fn node_count(&self) -> usize {
        self.roots.iter().map(SceneNode::count).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

struct Builder<'a> {
    elements: &'a ElementMap,
    codec: &'a dyn MeshCodec,
    by_parent: HashMap<Option<&'a str>, Vec<&'a SceneElement>>,
    visited: HashSet<&'a str>,
    errors: HashMap<ElementId, BuildError>,
}

impl<'a> Builder<'a> {
    fn children_of(&mut self, parent: Option<&'a str>) -> Vec<SceneNode> {
        let items = self.by_parent.get(&parent).cloned().unwrap_or_default();
        items
            .into_iter()
            .filter_map(|el| self.node(el))
            .collect()
    }

    fn node(&mut self, element: &'a SceneElement) -> Option<SceneNode> {
        if !self.visited.insert(element.id.as_str()) {
            return None;
        }
        let children = self.children_of(Some(element.id.as_str()));

        let geometry = match self.geometry(element, &children) {
            Ok(geometry) => geometry,
            Err(e) => {
                self.errors.insert(element.id.clone(), e);
                return None;
            }
        };

        Some(SceneNode {
            id: element.id.clone(),
            name: element.name.clone(),
            geometry,
            position: element.position,
            rotation: element.rotation,
            scale: element.scale,
            color: element.color.clone(),
            children,
        })
    }

    fn geometry(&self, element: &SceneElement, children: &[SceneNode]) -> Result<Geometry, BuildError> {
        let geometry = match &element.kind {
            ElementKind::Mesh { mesh_source } => {
                let mesh = self.codec.decode(mesh_source).map_err(|source| BuildError::Mesh {
                    id: element.id.clone(),
                    source,
                })?;
                Geometry::Mesh(mesh)
            }
            ElementKind::Group { children: listed } => {
                self.check_listed(element, listed)?;
                Geometry::Group
            }
            ElementKind::Subtraction { children: listed } => {
                if listed.len() != 2 {
                    return Err(BuildError::OperandCount {
                        id: element.id.clone(),
                        count: listed.len(),
                    });
                }
                self.check_listed(element, listed)?;
                if children.len() != 2 {
                    return Err(BuildError::OperandCount {
                        id: element.id.clone(),
                        count: children.len(),
                    });
                }
                Geometry::Subtraction
            }
            ElementKind::Box { corner_radius } => Geometry::Box {
                corner_radius: corner_radius.unwrap_or(0.0),
            },
            ElementKind::Torus { tube_thickness } => Geometry::Torus {
                tube_thickness: tube_thickness.unwrap_or(DEFAULT_TUBE_THICKNESS),
            },
            ElementKind::Sphere => Geometry::Sphere,
            ElementKind::Cylinder => Geometry::Cylinder,
            ElementKind::Cone => Geometry::Cone,
            ElementKind::Pyramid => Geometry::Pyramid,
            ElementKind::Heart => Geometry::Heart,
            ElementKind::Star => Geometry::Star,
        };
        Ok(geometry)
    }

    fn check_listed(&self, element: &SceneElement, listed: &[ElementId]) -> Result<(), BuildError> {
        match listed.iter().find(|c| !self.elements.contains_key(c.as_str())) {
            Some(child) => Err(BuildError::MissingChild {
                id: element.id.clone(),
                child: child.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Build the export tree for `elements`, decoding meshes with `codec`
pub fn build_scene(elements: &ElementMap, codec: &dyn MeshCodec) -> SceneBuild {
    let mut by_parent: HashMap<Option<&str>, Vec<&SceneElement>> = HashMap::new();
    let mut errors = HashMap::new();
    for element in elements.values() {
        match element.parent_id.as_deref() {
            Some(parent) if !elements.contains_key(parent) => {
                errors.insert(
                    element.id.clone(),
                    BuildError::MissingParent {
                        id: element.id.clone(),
                        parent: parent.to_string(),
                    },
                );
            }
            parent => by_parent.entry(parent).or_default().push(element),
        }
    }
    for siblings in by_parent.values_mut() {
        siblings.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
    }

    let mut builder = Builder {
        elements,
        codec,
        by_parent,
        visited: HashSet::new(),
        errors,
    };
    let roots = builder.children_of(None);

    // Anything neither reached from a root nor already reported hangs off a cycle
    for element in elements.values() {
        if !builder.visited.contains(element.id.as_str()) && !builder.errors.contains_key(&element.id) {
            builder
                .errors
                .insert(element.id.clone(), BuildError::Cycle { id: element.id.clone() });
        }
    }

    for error in builder.errors.values() {
        tracing::warn!("build: {error}");
    }
    SceneBuild {
        roots,
        errors: builder.errors,
    }
}
