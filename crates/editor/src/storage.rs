//! Scene persistence backends

use std::path::{Path, PathBuf};

use chrono::Utc;
use shared::{ElementMap, StoredScene};

use crate::error::StorageError;

/// Where saved scenes live. Failures never touch the in-memory store.
pub trait SceneStorage {
    /// Create or overwrite a scene. `created_at` is kept from an existing record.
    fn save(&mut self, id: &str, name: &str, elements: &ElementMap) -> Result<StoredScene, StorageError>;

    fn load(&self, id: &str) -> Result<StoredScene, StorageError>;

    /// All stored scenes, most recently updated first
    fn list(&self) -> Result<Vec<StoredScene>, StorageError>;

    fn delete(&mut self, id: &str) -> Result<(), StorageError>;
}

/// One JSON file per scene inside a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Storage under the platform data directory
    pub fn default_location() -> Result<Self, StorageError> {
        directories::ProjectDirs::from("com", "scene-editor", "scene-editor")
            .map(|dirs| Self::new(dirs.data_dir().join("scenes")))
            .ok_or(StorageError::Unavailable)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, StorageError> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidId(id.to_string()));
        }
        Ok(self.root.join(format!("{id}.json")))
    }
}

impl SceneStorage for FileStorage {
    fn save(&mut self, id: &str, name: &str, elements: &ElementMap) -> Result<StoredScene, StorageError> {
        let path = self.path_for(id)?;
        std::fs::create_dir_all(&self.root)?;

        let now = Utc::now();
        let created_at = match self.load(id) {
            Ok(existing) => existing.created_at,
            Err(StorageError::NotFound(_)) => now,
            Err(e) => return Err(e),
        };
        let record = StoredScene {
            id: id.to_string(),
            name: name.to_string(),
            elements: elements.clone(),
            created_at,
            updated_at: now,
        };
        std::fs::write(&path, serde_json::to_string_pretty(&record)?)?;
        tracing::info!("saved scene '{}' to {}", name, path.display());
        Ok(record)
    }

    fn load(&self, id: &str) -> Result<StoredScene, StorageError> {
        let path = self.path_for(id)?;
        let json = match std::fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(id.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&json)?)
    }

    fn list(&self) -> Result<Vec<StoredScene>, StorageError> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut scenes = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let json = std::fs::read_to_string(&path)?;
            match serde_json::from_str::<StoredScene>(&json) {
                Ok(scene) => scenes.push(scene),
                Err(e) => tracing::warn!("skipping unreadable scene {}: {e}", path.display()),
            }
        }
        scenes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(scenes)
    }

    fn delete(&mut self, id: &str) -> Result<(), StorageError> {
        let path = self.path_for(id)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
