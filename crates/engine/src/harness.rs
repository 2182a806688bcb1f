//! Headless test harness for programmatic scene manipulation.
//!
//! Wraps an [`EditorState`] and replays whole pointer interactions
//! (press, moves with a frame tick after each, release) in one call.

use std::ops::{Deref, DerefMut};

use shared::{BodyId, BodyTransform, Dimensions, RigidBody, Scene};

use crate::collision::CollisionSet;
use crate::error::Result;
use crate::session::{CommitReport, PointerInput, ResizeHandle, TransformKind};
use crate::snap::Axis;
use crate::state::{EditorState, EngineSettings};
use crate::validation::BodyValidator;

/// Headless test harness — owns the editor state, no rendering
pub struct TestHarness {
    state: EditorState,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for TestHarness {
    type Target = EditorState;

    fn deref(&self) -> &EditorState {
        &self.state
    }
}

impl DerefMut for TestHarness {
    fn deref_mut(&mut self) -> &mut EditorState {
        &mut self.state
    }
}

impl TestHarness {
    /// Create a new empty harness with default settings (the settings file is not read).
    pub fn new() -> Self {
        Self::with_settings(EngineSettings::default())
    }

    pub fn with_settings(settings: EngineSettings) -> Self {
        Self {
            state: EditorState::new(settings),
        }
    }

    // ── Scene manipulation ────────────────────────────────────

    /// Create a panel and return its ID
    pub fn create_panel(&mut self, name: &str, dims: [f64; 3], pos: [f64; 3]) -> Result<BodyId> {
        self.state.scene.create_body(
            name.to_string(),
            Dimensions::from_array(dims),
            BodyTransform::at(pos),
        )
    }

    /// Add a body with a fixed ID
    pub fn add_body(&mut self, body: RigidBody) -> Result<BodyId> {
        self.state.scene.insert_body(body)
    }

    /// Load a scene (replaces current)
    pub fn load_scene(&mut self, scene: Scene) {
        self.state.scene.set_scene(scene);
        self.state.selection.clear();
    }

    /// Load a scene from JSON string
    pub fn load_scene_json(&mut self, json: &str) -> Result<()> {
        let scene: Scene = serde_json::from_str(json)?;
        self.load_scene(scene);
        Ok(())
    }

    /// Export the current scene as JSON
    pub fn export_scene_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.state.scene.scene)?)
    }

    /// Delete a body by ID
    pub fn delete_body(&mut self, body_id: &str) -> Result<Vec<BodyId>> {
        let removed = self.state.scene.remove_body(body_id)?;
        self.state.prune_selection();
        Ok(removed)
    }

    pub fn clear_selection(&mut self) {
        self.state.selection.clear();
    }

    // ── Interactions ──────────────────────────────────────────

    /// Replay a translate drag: press at `from`, one frame per point in `path`, release.
    pub fn drag(
        &mut self,
        ids: &[BodyId],
        from: [f64; 3],
        path: &[[f64; 3]],
        axis: Option<Axis>,
        precision: bool,
    ) -> Result<CommitReport> {
        self.interact(ids, TransformKind::Translate, from, path, axis, precision)
    }

    /// Replay a rotation about `axis` through the pivot
    pub fn rotate(
        &mut self,
        ids: &[BodyId],
        axis: Axis,
        from: [f64; 3],
        to: [f64; 3],
        precision: bool,
    ) -> Result<CommitReport> {
        self.interact(ids, TransformKind::Rotate { axis }, from, &[to], None, precision)
    }

    /// Replay a face-handle resize
    pub fn resize(
        &mut self,
        id: &str,
        handle: ResizeHandle,
        from: [f64; 3],
        to: [f64; 3],
        precision: bool,
    ) -> Result<CommitReport> {
        let ids = [id.to_string()];
        self.interact(&ids, TransformKind::Resize { handle }, from, &[to], None, precision)
    }

    fn interact(
        &mut self,
        ids: &[BodyId],
        kind: TransformKind,
        from: [f64; 3],
        path: &[[f64; 3]],
        axis: Option<Axis>,
        precision: bool,
    ) -> Result<CommitReport> {
        let state = &mut self.state;
        state.controller.begin(&mut state.scene, ids, kind, from)?;
        for point in path {
            let input = PointerInput {
                point: *point,
                ray: None,
                constraint: axis,
                precision,
            };
            if let Err(e) = state.pointer_move(input) {
                state.cancel()?;
                return Err(e);
            }
            state.frame();
        }
        state.release()
    }

    // ── Queries ───────────────────────────────────────────────

    /// Number of bodies in the scene
    pub fn body_count(&self) -> usize {
        self.state.scene.bodies().len()
    }

    pub fn body(&self, id: &str) -> Option<&RigidBody> {
        self.state.scene.get_body(id)
    }

    pub fn collisions(&self) -> &CollisionSet {
        self.state.scene.collisions()
    }

    /// Get a validator for a body
    pub fn validate_body(&self, id: &str) -> Option<BodyValidator<'_>> {
        self.body(id).map(BodyValidator::new)
    }
}
