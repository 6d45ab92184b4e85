//! Project import/export and autosave

use shared::{ProjectFile, StoredScene};

use super::SceneState;
use crate::error::{ProjectError, StorageError};
use crate::project::{export_project, import_project};

impl SceneState {
    /// Snapshot the table as a project file
    pub fn export_project(&self, name: impl Into<String>) -> ProjectFile {
        export_project(name, &self.elements, None)
    }

    /// Validate and load a project file. On error the scene is left untouched.
    pub fn import_project_json(&mut self, json: &str) -> Result<ProjectFile, ProjectError> {
        let project = import_project(json)?;
        self.load_scene(project.elements.clone());
        tracing::info!("imported project '{}'", project.name);
        Ok(project)
    }

    /// Load a record coming back from the persistence layer
    pub fn load_stored(&mut self, stored: &StoredScene) {
        self.load_scene(stored.elements.clone());
    }

    /// Get autosave file path
    fn autosave_path() -> Option<std::path::PathBuf> {
        directories::ProjectDirs::from("com", "scene-editor", "scene-editor")
            .map(|dirs| dirs.data_dir().join("autosave.json"))
    }

    /// Save scene to autosave file
    pub fn autosave(&self) -> Result<(), StorageError> {
        let path = Self::autosave_path().ok_or(StorageError::Unavailable)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.export_project("Autosave"))?;
        std::fs::write(&path, json)?;
        tracing::debug!("autosaved to {}", path.display());
        Ok(())
    }

    /// Load scene from autosave file
    pub fn load_autosave() -> Option<ProjectFile> {
        let path = Self::autosave_path()?;
        let json = std::fs::read_to_string(&path).ok()?;
        match import_project(&json) {
            Ok(project) => Some(project),
            Err(e) => {
                tracing::warn!("ignoring autosave at {}: {e}", path.display());
                None
            }
        }
    }

    /// Check if autosave file exists
    pub fn has_autosave() -> bool {
        Self::autosave_path()
            .map(|p| p.exists())
            .unwrap_or(false)
    }
}
