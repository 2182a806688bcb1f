//! JSON command protocol for driving the engine headlessly.

use serde::{Deserialize, Serialize};
use shared::{BodyTransform, Dimensions, RigidBody};

use crate::error::Result;
use crate::harness::TestHarness;
use crate::session::ResizeHandle;
use crate::snap::Axis;

/// A command the engine can execute.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum AgentCommand {
    /// Create a new body. A generated ID is used unless `id` is given.
    CreateBody {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        name: String,
        dimensions: Dimensions,
        #[serde(default)]
        transform: BodyTransform,
        #[serde(default)]
        group_id: Option<String>,
    },
    /// Remove one body; undoable
    DeleteBody { id: String },
    /// Copy bodies, shifted by `offset`
    Duplicate {
        ids: Vec<String>,
        #[serde(default)]
        offset: [f64; 3],
    },
    /// Move bodies (and their groups) by `delta` without snapping
    Translate { ids: Vec<String>, delta: [f64; 3] },
    /// Interactive drag with snapping. Empty `ids` drags the selection.
    Drag {
        #[serde(default)]
        ids: Vec<String>,
        from: [f64; 3],
        path: Vec<[f64; 3]>,
        #[serde(default)]
        axis: Option<Axis>,
        #[serde(default)]
        precision: bool,
    },
    /// Interactive rotation about a world axis through the pivot
    Rotate {
        #[serde(default)]
        ids: Vec<String>,
        axis: Axis,
        from: [f64; 3],
        to: [f64; 3],
        #[serde(default)]
        precision: bool,
    },
    /// Interactive face-handle resize
    Resize {
        id: String,
        handle: ResizeHandle,
        from: [f64; 3],
        to: [f64; 3],
        #[serde(default)]
        precision: bool,
    },
    /// Step back one history batch
    Undo,
    /// Reapply the most recently undone batch
    Redo,
    /// Replace the selection
    Select { ids: Vec<String> },
    ClearSelection,
    /// Bodies with their transforms and collision flags, plus history depth
    Inspect,
    /// Current collision set.
    Collisions,
    /// Scene serialized the same way `--scene` files are read
    ExportScene,
}

/// One response per command, in request order
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

impl From<Result<serde_json::Value>> for CommandResponse {
    fn from(result: Result<serde_json::Value>) -> Self {
        match result {
            Ok(data) => Self::ok_with_data(data),
            Err(e) => {
                tracing::warn!("Command failed: {e}");
                Self::err(e.to_string())
            }
        }
    }
}

fn ids_or_selection(harness: &TestHarness, ids: Vec<String>) -> Vec<String> {
    if ids.is_empty() {
        harness.selection.all().to_vec()
    } else {
        ids
    }
}

/// Run one command. Failures become `success: false` responses.
pub fn execute_command(harness: &mut TestHarness, cmd: AgentCommand) -> CommandResponse {
    match cmd {
        AgentCommand::CreateBody {
            id,
            name,
            dimensions,
            transform,
            group_id,
        } => {
            let id = id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let mut body = RigidBody::new(id, dimensions);
            if !name.is_empty() {
                body.name = name;
            }
            body.set_transform(transform);
            body.group_id = group_id;
            harness
                .add_body(body)
                .map(|id| serde_json::json!({ "id": id }))
                .into()
        }

        AgentCommand::DeleteBody { id } => harness
            .delete_body(&id)
            .map(|removed| serde_json::json!({ "removed": removed }))
            .into(),

        AgentCommand::Duplicate { ids, offset } => {
            let ids = ids_or_selection(harness, ids);
            harness
                .scene
                .duplicate(&ids, offset)
                .map(|created| serde_json::json!({ "created": created }))
                .into()
        }

        AgentCommand::Translate { ids, delta } => {
            let ids = ids_or_selection(harness, ids);
            harness
                .scene
                .translate(&ids, delta)
                .map(|moved| serde_json::json!({ "moved": moved }))
                .into()
        }

        AgentCommand::Drag {
            ids,
            from,
            path,
            axis,
            precision,
        } => {
            let ids = ids_or_selection(harness, ids);
            harness
                .drag(&ids, from, &path, axis, precision)
                .and_then(|report| Ok(serde_json::to_value(report)?))
                .into()
        }

        AgentCommand::Rotate {
            ids,
            axis,
            from,
            to,
            precision,
        } => {
            let ids = ids_or_selection(harness, ids);
            harness
                .rotate(&ids, axis, from, to, precision)
                .and_then(|report| Ok(serde_json::to_value(report)?))
                .into()
        }

        AgentCommand::Resize {
            id,
            handle,
            from,
            to,
            precision,
        } => harness
            .resize(&id, handle, from, to, precision)
            .and_then(|report| Ok(serde_json::to_value(report)?))
            .into(),

        AgentCommand::Undo => {
            let success = harness.undo();
            CommandResponse::ok_with_data(serde_json::json!({ "undone": success }))
        }

        AgentCommand::Redo => {
            let success = harness.redo();
            CommandResponse::ok_with_data(serde_json::json!({ "redone": success }))
        }

        AgentCommand::Select { ids } => {
            harness.clear_selection();
            for id in &ids {
                harness.selection.toggle(id.clone());
            }
            CommandResponse::ok_with_data(serde_json::json!({ "selected": ids }))
        }

        AgentCommand::ClearSelection => {
            harness.clear_selection();
            CommandResponse::ok()
        }

        AgentCommand::Inspect => {
            let collisions = harness.collisions();
            let bodies: Vec<serde_json::Value> = harness
                .scene
                .bodies()
                .iter()
                .map(|body| {
                    serde_json::json!({
                        "id": body.id,
                        "name": body.name,
                        "dimensions": body.dimensions,
                        "position": body.position,
                        "rotation": body.rotation,
                        "group_id": body.group_id,
                        "colliding": collisions.is_body_colliding(&body.id),
                    })
                })
                .collect();
            CommandResponse::ok_with_data(serde_json::json!({
                "body_count": bodies.len(),
                "bodies": bodies,
                "can_undo": harness.scene.can_undo(),
                "can_redo": harness.scene.can_redo(),
            }))
        }

        AgentCommand::Collisions => {
            let set = harness.collisions();
            CommandResponse::ok_with_data(serde_json::json!({
                "pairs": set.records(),
                "bodies": set.colliding_bodies(),
                "groups": set.colliding_groups(),
            }))
        }

        AgentCommand::ExportScene => harness
            .export_scene_json()
            .map(|json| serde_json::json!({ "scene_json": json }))
            .into(),
    }
}

pub fn execute_json(harness: &mut TestHarness, json: &str) -> Result<CommandResponse> {
    let cmd: AgentCommand = serde_json::from_str(json)?;
    Ok(execute_command(harness, cmd))
}

/// Run a JSON array of commands. Only a malformed batch is an `Err`;
/// individual command failures are reported in their responses.
pub fn execute_json_batch(harness: &mut TestHarness, json: &str) -> Result<Vec<CommandResponse>> {
    let cmds: Vec<AgentCommand> = serde_json::from_str(json)?;
    Ok(cmds
        .into_iter()
        .map(|cmd| execute_command(harness, cmd))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    #[test]
    fn test_command_serde_undo() {
        let json = r#"{"command": "undo"}"#;
        let cmd: AgentCommand = serde_json::from_str(json).unwrap();
        assert!(matches!(cmd, AgentCommand::Undo));
    }

    #[test]
    fn test_command_serde_drag() {
        let json = r#"{"command": "drag", "ids": ["a"], "from": [0, 0, 0], "path": [[10, 0, 0]], "axis": "XZ"}"#;
        let cmd: AgentCommand = serde_json::from_str(json).unwrap();
        match cmd {
            AgentCommand::Drag { ids, axis, precision, .. } => {
                assert_eq!(ids, vec!["a".to_string()]);
                assert_eq!(axis, Some(Axis::XZ));
                assert!(!precision);
            }
            _ => panic!("Expected Drag"),
        }
    }

    #[test]
    fn test_command_serde_resize() {
        let json = r#"{"command": "resize", "id": "a", "handle": {"axis": "Y", "positive": false}, "from": [0, 0, 0], "to": [0, -5, 0]}"#;
        let cmd: AgentCommand = serde_json::from_str(json).unwrap();
        match cmd {
            AgentCommand::Resize { handle, .. } => {
                assert_eq!(handle, ResizeHandle::new(Axis::Y, false));
            }
            _ => panic!("Expected Resize"),
        }
    }

    #[test]
    fn test_execute_create_body() {
        let mut h = TestHarness::new();
        let resp = execute_command(
            &mut h,
            AgentCommand::CreateBody {
                id: None,
                name: "Shelf".into(),
                dimensions: Dimensions::new(564.0, 18.0, 560.0),
                transform: BodyTransform::default(),
                group_id: Some("cab".into()),
            },
        );
        assert!(resp.success);
        let id = resp.data.unwrap()["id"].as_str().unwrap().to_string();
        assert_eq!(h.body(&id).unwrap().group_id.as_deref(), Some("cab"));
    }

    #[test]
    fn test_execute_error_is_response() {
        let mut h = TestHarness::new();
        let resp = execute_command(&mut h, AgentCommand::DeleteBody { id: "ghost".into() });
        assert!(!resp.success);
        assert!(resp.error.unwrap().contains("ghost"));
    }

    #[test]
    fn test_execute_invalid_json() {
        let mut h = TestHarness::new();
        let err = execute_json(&mut h, "not json").unwrap_err();
        assert!(matches!(err, EngineError::InvalidCommand(_)));
    }
}
