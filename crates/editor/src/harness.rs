//! Headless harness for programmatic scene manipulation.
//!
//! Owns the store, the mesh codec and the last export build. The command
//! protocol and integration tests drive the editor through it.

use std::collections::HashMap;

use shared::{ElementId, ElementMap, ElementPatch, PrimitiveKind, SceneElement};

use crate::build::{build_scene, SceneBuild, SceneNode};
use crate::error::{BuildError, ProjectError};
use crate::math::world_transform;
use crate::mesh::ObjCodec;
use crate::state::scene::SceneState;
use crate::state::settings::EditorSettings;

/// Headless harness: store, codec and last build
pub struct TestHarness {
    pub scene: SceneState,
    codec: ObjCodec,
    last_build: SceneBuild,
}

impl TestHarness {
    /// Empty harness. New elements land exactly at the origin.
    pub fn new() -> Self {
        Self::with_settings(EditorSettings {
            add_jitter: 0.0,
            ..Default::default()
        })
    }

    pub fn with_settings(settings: EditorSettings) -> Self {
        Self {
            scene: SceneState::with_settings(settings),
            codec: ObjCodec,
            last_build: SceneBuild::default(),
        }
    }

    // ── Scene manipulation ────────────────────────────────────

    /// Add a primitive and return its id
    pub fn add(&mut self, kind: PrimitiveKind) -> ElementId {
        self.scene.add(kind)
    }

    /// Add a primitive and move it. Takes two undo steps unless it spawned at `pos`.
    pub fn add_at(&mut self, kind: PrimitiveKind, pos: [f64; 3]) -> ElementId {
        let id = self.scene.add(kind);
        self.scene.update(
            &id,
            ElementPatch {
                position: Some(pos),
                ..Default::default()
            },
        );
        id
    }

    /// Import an OBJ source as a mesh element
    pub fn import_mesh(&mut self, name: &str, source: &str) -> ElementId {
        self.scene.add_imported_mesh(name, source.to_string())
    }

    /// Replace the scene with a prepared table
    pub fn load_elements(&mut self, elements: impl IntoIterator<Item = SceneElement>) {
        let table: ElementMap = elements.into_iter().map(|e| (e.id.clone(), e)).collect();
        self.scene.load_scene(table);
    }

    /// Load a project file from JSON
    pub fn load_scene_json(&mut self, json: &str) -> Result<(), ProjectError> {
        self.scene.import_project_json(json).map(|_| ())
    }

    /// Export the current scene as project JSON
    pub fn export_scene_json(&self, name: &str) -> String {
        serde_json::to_string_pretty(&self.scene.export_project(name)).unwrap_or_default()
    }

    /// Remove an element and its subtree
    pub fn remove(&mut self, id: &str) -> Vec<ElementId> {
        self.scene.remove(&[id.to_string()])
    }

    pub fn undo(&mut self) -> bool {
        self.scene.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.scene.redo()
    }

    /// Clear the entire scene, history and build
    pub fn reset(&mut self) {
        self.scene.reset_scene();
        self.last_build = SceneBuild::default();
    }

    // ── Selection ─────────────────────────────────────────────

    pub fn select<S: AsRef<str>>(&mut self, ids: &[S]) {
        self.scene
            .set_selection(ids.iter().map(|id| id.as_ref().to_string()).collect());
    }

    pub fn selected(&self) -> Vec<ElementId> {
        self.scene.selection().all().to_vec()
    }

    pub fn clear_selection(&mut self) {
        self.scene.clear_selection();
    }

    // ── Build + inspection ────────────────────────────────────

    /// Rebuild the export tree from the current table
    pub fn build(&mut self) -> &SceneBuild {
        self.last_build = build_scene(self.scene.elements(), &self.codec);
        &self.last_build
    }

    pub fn last_build(&self) -> &SceneBuild {
        &self.last_build
    }

    /// Node of the last build
    pub fn node(&self, id: &str) -> Option<&SceneNode> {
        self.last_build.find(id)
    }

    /// Errors of the last build
    pub fn errors(&self) -> &HashMap<ElementId, BuildError> {
        &self.last_build.errors
    }

    pub fn element_count(&self) -> usize {
        self.scene.len()
    }

    pub fn element(&self, id: &str) -> Option<&SceneElement> {
        self.scene.get(id)
    }

    /// Number of root elements in the table
    pub fn root_count(&self) -> usize {
        self.scene
            .elements()
            .values()
            .filter(|e| e.parent_id.is_none())
            .count()
    }

    pub fn world_position(&self, id: &str) -> Option<[f64; 3]> {
        world_transform(self.scene.elements(), id).map(|t| t.position)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
