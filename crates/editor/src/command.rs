//! JSON command protocol.
//!
//! One tagged object per store operation, so a script or agent can drive
//! the editor headlessly. Ids-taking commands fall back to the current
//! selection when `ids` is omitted.

use serde::{Deserialize, Serialize};
use serde_json::json;
use shared::{ElementId, ElementPatch, PrimitiveKind};

use crate::harness::TestHarness;
use crate::math::{AlignAnchor, Axis};
use crate::state::scene::element_display_name;

/// A command the editor can execute.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum AgentCommand {
    /// Add a primitive, optionally moving it afterwards
    Add {
        kind: PrimitiveKind,
        #[serde(default)]
        position: Option<[f64; 3]>,
    },
    /// Add an imported mesh from OBJ text
    ImportMesh { name: String, source: String },
    /// Merge a partial update into one element
    Update { id: ElementId, patch: ElementPatch },
    /// Remove elements and their descendants
    Remove {
        #[serde(default)]
        ids: Vec<ElementId>,
    },
    /// Move `active` to sit before `over`
    Reorder { active: ElementId, over: ElementId },
    Group {
        #[serde(default)]
        ids: Vec<ElementId>,
    },
    Ungroup {
        #[serde(default)]
        ids: Vec<ElementId>,
    },
    /// `ids[0]`/`ids[1]` become operands by `(order, id)`
    Subtract {
        #[serde(default)]
        ids: Vec<ElementId>,
    },
    /// Align the current selection
    Align { axis: Axis, anchor: AlignAnchor },
    /// Replace the selection.
    Select { ids: Vec<ElementId> },
    /// Shift-click toggle of one element.
    Toggle { id: ElementId },
    /// Clear selection.
    ClearSelection,
    SetAlignmentMode { enabled: bool },
    Copy {
        #[serde(default)]
        ids: Vec<ElementId>,
    },
    Paste,
    Duplicate {
        #[serde(default)]
        ids: Vec<ElementId>,
    },
    /// Undo the last operation.
    Undo,
    /// Redo the last undone operation.
    Redo,
    /// Clear the entire scene.
    Reset,
    /// List all elements in order.
    Inspect,
    /// Export the scene as a project file.
    ExportScene {
        #[serde(default = "default_project_name")]
        name: String,
    },
    /// Build the export tree and report its size and errors.
    Build,
}

fn default_project_name() -> String {
    "Untitled".to_string()
}

/// Response from executing a command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResponse {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    fn ok_with_data(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: None,
        }
    }
}

/// Explicit ids, or the selection when none were given
fn targets(harness: &TestHarness, ids: Vec<ElementId>) -> Vec<ElementId> {
    if ids.is_empty() {
        harness.selected()
    } else {
        ids
    }
}

/// Execute a single command on the harness.
pub fn execute_command(harness: &mut TestHarness, cmd: AgentCommand) -> CommandResponse {
    match cmd {
        AgentCommand::Add { kind, position } => {
            let id = match position {
                Some(pos) => harness.add_at(kind, pos),
                None => harness.add(kind),
            };
            CommandResponse::ok_with_data(json!({ "id": id }))
        }

        AgentCommand::ImportMesh { name, source } => {
            let id = harness.import_mesh(&name, &source);
            CommandResponse::ok_with_data(json!({ "id": id }))
        }

        AgentCommand::Update { id, patch } => {
            if harness.scene.update(&id, patch) {
                CommandResponse::ok()
            } else {
                CommandResponse::err(format!("no element with id {id}"))
            }
        }

        AgentCommand::Remove { ids } => {
            let ids = targets(harness, ids);
            let removed = harness.scene.remove(&ids);
            CommandResponse::ok_with_data(json!({ "removed": removed }))
        }

        AgentCommand::Reorder { active, over } => {
            if harness.scene.reorder(&active, &over) {
                CommandResponse::ok()
            } else {
                CommandResponse::err(format!("cannot move {active} before {over}"))
            }
        }

        AgentCommand::Group { ids } => {
            let ids = targets(harness, ids);
            match harness.scene.group(&ids) {
                Some(id) => CommandResponse::ok_with_data(json!({ "id": id })),
                None => CommandResponse::err(
                    "group needs at least 2 elements, none of them subtraction operands",
                ),
            }
        }

        AgentCommand::Ungroup { ids } => {
            let ids = targets(harness, ids);
            let selected = harness.scene.ungroup(&ids);
            CommandResponse::ok_with_data(json!({ "selected": selected }))
        }

        AgentCommand::Subtract { ids } => {
            let ids = targets(harness, ids);
            match harness.scene.subtract(&ids) {
                Some(id) => CommandResponse::ok_with_data(json!({ "id": id })),
                None => CommandResponse::err("subtract needs exactly 2 primitive elements"),
            }
        }

        AgentCommand::Align { axis, anchor } => {
            let aligned = harness.scene.align(axis, anchor);
            CommandResponse::ok_with_data(json!({ "aligned": aligned }))
        }

        AgentCommand::Select { ids } => {
            harness.scene.set_selection(ids);
            CommandResponse::ok_with_data(json!({ "selected": harness.selected() }))
        }

        AgentCommand::Toggle { id } => {
            harness.scene.toggle_selection(&id);
            CommandResponse::ok_with_data(json!({ "selected": harness.selected() }))
        }

        AgentCommand::ClearSelection => {
            harness.clear_selection();
            CommandResponse::ok()
        }

        AgentCommand::SetAlignmentMode { enabled } => {
            let active = harness.scene.set_alignment_mode(enabled);
            CommandResponse::ok_with_data(json!({ "alignment_mode": active }))
        }

        AgentCommand::Copy { ids } => {
            let ids = targets(harness, ids);
            let copied = harness.scene.copy(&ids);
            CommandResponse::ok_with_data(json!({ "copied": copied }))
        }

        AgentCommand::Paste => {
            let pasted = harness.scene.paste();
            CommandResponse::ok_with_data(json!({ "pasted": pasted }))
        }

        AgentCommand::Duplicate { ids } => {
            let ids = targets(harness, ids);
            let created = harness.scene.duplicate(&ids);
            CommandResponse::ok_with_data(json!({ "created": created }))
        }

        AgentCommand::Undo => {
            let success = harness.undo();
            CommandResponse::ok_with_data(json!({ "undone": success }))
        }

        AgentCommand::Redo => {
            let success = harness.redo();
            CommandResponse::ok_with_data(json!({ "redone": success }))
        }

        AgentCommand::Reset => {
            harness.reset();
            CommandResponse::ok()
        }

        AgentCommand::Inspect => inspect(harness),

        AgentCommand::ExportScene { name } => {
            let json = harness.export_scene_json(&name);
            CommandResponse::ok_with_data(json!({ "project_json": json }))
        }

        AgentCommand::Build => {
            let build = harness.build();
            let errors: serde_json::Map<String, serde_json::Value> = build
                .errors
                .iter()
                .map(|(id, e)| (id.clone(), json!(e.to_string())))
                .collect();
            CommandResponse::ok_with_data(json!({
                "root_count": build.roots.len(),
                "node_count": build.node_count(),
                "errors": errors,
            }))
        }
    }
}

fn inspect(harness: &TestHarness) -> CommandResponse {
    let scene = &harness.scene;
    let elements: Vec<serde_json::Value> = scene
        .ordered_ids()
        .iter()
        .filter_map(|id| scene.get(id))
        .map(|el| {
            json!({
                "id": el.id,
                "name": el.name,
                "display": element_display_name(el),
                "type": el.kind.label(),
                "order": el.order,
                "parent_id": el.parent_id,
                "position": el.position,
                "selected": scene.selection().is_selected(&el.id),
            })
        })
        .collect();
    CommandResponse::ok_with_data(json!({
        "element_count": elements.len(),
        "elements": elements,
        "selected": scene.selection().all(),
        "alignment_mode": scene.selection().alignment_mode(),
        "can_undo": scene.can_undo(),
        "can_redo": scene.can_redo(),
    }))
}

/// Parse and execute a single JSON command string.
pub fn execute_json(harness: &mut TestHarness, json: &str) -> Result<CommandResponse, String> {
    let cmd: AgentCommand =
        serde_json::from_str(json).map_err(|e| format!("Invalid command JSON: {e}"))?;
    Ok(execute_command(harness, cmd))
}

/// Parse and execute multiple JSON commands (array).
pub fn execute_json_batch(
    harness: &mut TestHarness,
    json: &str,
) -> Result<Vec<CommandResponse>, String> {
    let cmds: Vec<AgentCommand> =
        serde_json::from_str(json).map_err(|e| format!("Invalid commands JSON: {e}"))?;
    Ok(cmds
        .into_iter()
        .map(|cmd| execute_command(harness, cmd))
        .collect())
}
