//! Editor settings

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shared::PrimitiveKind;

use crate::error::StorageError;

/// Default number of undo steps kept
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Tuning knobs for store behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Maximum number of snapshots on each history stack
    pub history_capacity: usize,
    /// Offset applied to every pasted or duplicated element
    pub paste_offset: [f64; 3],
    /// Random X/Z offset range (±) for newly added elements
    pub add_jitter: f64,
    /// Write the scene to the autosave file after each command batch
    pub autosave: bool,
    /// Color given to new elements, per primitive
    pub default_colors: HashMap<PrimitiveKind, String>,
    /// Color given to imported meshes
    pub mesh_color: String,
}

impl Default for EditorSettings {
    fn default() -> Self {
        let default_colors = [
            (PrimitiveKind::Box, "#3b82f6"),
            (PrimitiveKind::Sphere, "#ef4444"),
            (PrimitiveKind::Cylinder, "#22c55e"),
            (PrimitiveKind::Torus, "#f59e0b"),
            (PrimitiveKind::Cone, "#a855f7"),
            (PrimitiveKind::Pyramid, "#14b8a6"),
            (PrimitiveKind::Heart, "#ec4899"),
            (PrimitiveKind::Star, "#eab308"),
        ]
        .into_iter()
        .map(|(kind, color)| (kind, color.to_string()))
        .collect();

        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            paste_offset: [0.5, 0.0, 0.5],
            add_jitter: 0.5,
            autosave: false,
            default_colors,
            mesh_color: "#9ca3af".to_string(),
        }
    }
}

impl EditorSettings {
    fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "scene-editor", "scene-editor")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Whether a settings file has been written yet
    pub fn exists() -> bool {
        Self::config_path().is_some_and(|path| path.exists())
    }

    /// Load settings from the config dir, or return default if not found
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed settings at {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save settings to the config dir
    pub fn save(&self) -> Result<(), StorageError> {
        let path = Self::config_path().ok_or(StorageError::Unavailable)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), StorageError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        tracing::debug!("Settings written to {}", path.display());
        Ok(())
    }

    /// Color for a new primitive
    pub fn color_for(&self, kind: PrimitiveKind) -> String {
        self.default_colors
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| self.mesh_color.clone())
    }
}
