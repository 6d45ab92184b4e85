//! Project file import/export
//!
//! Format: `{"version": 1, "name", "elements", "createdAt"?, "updatedAt"?}`.
//! Import validates field by field so the caller gets a message that names
//! the problem instead of a bare serde error.

use chrono::{DateTime, Utc};
use serde_json::Value;
use shared::{ElementMap, ProjectFile, PROJECT_VERSION};

use crate::error::ProjectError;

/// Parse and validate a project file
pub fn import_project(json: &str) -> Result<ProjectFile, ProjectError> {
    let value: Value = serde_json::from_str(json)?;
    let Value::Object(mut map) = value else {
        return Err(ProjectError::NotAnObject);
    };

    let version = map
        .get("version")
        .ok_or(ProjectError::MissingField("version"))?;
    let version = version.as_u64().ok_or_else(|| ProjectError::InvalidField {
        field: "version",
        reason: format!("expected an integer, got {version}"),
    })?;
    if version != u64::from(PROJECT_VERSION) {
        return Err(ProjectError::UnsupportedVersion {
            found: version,
            expected: PROJECT_VERSION,
        });
    }

    let name = match map.remove("name") {
        Some(Value::String(name)) => name,
        Some(other) => {
            return Err(ProjectError::InvalidField {
                field: "name",
                reason: format!("expected a string, got {other}"),
            })
        }
        None => return Err(ProjectError::MissingField("name")),
    };

    let elements = map
        .remove("elements")
        .ok_or(ProjectError::MissingField("elements"))?;
    let elements: ElementMap =
        serde_json::from_value(elements).map_err(|e| ProjectError::InvalidField {
            field: "elements",
            reason: e.to_string(),
        })?;

    let created_at = timestamp(&mut map, "createdAt")?;
    let updated_at = timestamp(&mut map, "updatedAt")?;

    Ok(ProjectFile {
        version: PROJECT_VERSION,
        name,
        elements,
        created_at,
        updated_at,
    })
}

fn timestamp(
    map: &mut serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<Option<DateTime<Utc>>, ProjectError> {
    match map.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| ProjectError::InvalidField {
                field,
                reason: e.to_string(),
            }),
    }
}

/// Build a project file for the given table, stamped now
pub fn export_project(
    name: impl Into<String>,
    elements: &ElementMap,
    created_at: Option<DateTime<Utc>>,
) -> ProjectFile {
    let now = Utc::now();
    ProjectFile {
        version: PROJECT_VERSION,
        name: name.into(),
        elements: elements.clone(),
        created_at: Some(created_at.unwrap_or(now)),
        updated_at: Some(now),
    }
}
