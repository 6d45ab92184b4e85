//! Error types surfaced to callers.
//!
//! Precondition misses on store operations are not errors; they come back as
//! `false` / `None` / empty results.

use shared::ElementId;
use thiserror::Error;

/// Project file could not be imported
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("project file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("project file must be a JSON object")]
    NotAnObject,
    #[error("project file is missing the '{0}' field")]
    MissingField(&'static str),
    #[error("unsupported project version {found} (expected {expected})")]
    UnsupportedVersion { found: u64, expected: u32 },
    #[error("invalid '{field}' field: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Persistence layer failure
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("no storage location available on this system")]
    Unavailable,
    #[error("scene '{0}' not found")]
    NotFound(String),
    #[error("invalid scene id '{0}'")]
    InvalidId(String),
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored scene is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Mesh source text could not be decoded
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshError {
    #[error("invalid OBJ source: {0}")]
    Obj(String),
    #[error("mesh has no faces")]
    Empty,
}

/// Data-integrity problem found while building the export tree
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuildError {
    #[error("subtraction {id} has {count} operand(s), expected 2")]
    OperandCount { id: ElementId, count: usize },
    #[error("element {id} references missing parent {parent}")]
    MissingParent { id: ElementId, parent: ElementId },
    #[error("container {id} lists missing child {child}")]
    MissingChild { id: ElementId, child: ElementId },
    #[error("element {id} is part of a parent cycle")]
    Cycle { id: ElementId },
    #[error("mesh {id} could not be decoded: {source}")]
    Mesh { id: ElementId, source: MeshError },
}
