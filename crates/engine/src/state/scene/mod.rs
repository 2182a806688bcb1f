//! Scene state management
//!
//! This module provides the authoritative body collection with batched,
//! undoable updates and the last computed collision set.

mod body_ops;
mod history;
mod transform_ops;

use std::collections::HashSet;

use shared::{BodyId, RigidBody, Scene};

use crate::collision::{detect_collisions, CollisionSet};
use crate::error::{EngineError, Result};
use crate::history::{BatchTarget, HistoryRecorder, StateMap};

/// What the history stores per body: `None` means "does not exist"
pub type BodySnapshot = Option<RigidBody>;

/// Scene state with bodies and undo/redo history
#[derive(Default)]
pub struct SceneState {
    /// Current scene with bodies
    pub scene: Scene,
    /// Batched undo/redo history
    pub(crate) history: HistoryRecorder<BodySnapshot>,
    /// Monotonically increasing version counter for cache invalidation
    pub(crate) version: u64,
    /// Collision set of the persisted bodies, refreshed after every mutation
    collisions: CollisionSet,
}

impl SceneState {
    /// Empty scene with a custom undo depth
    pub fn with_history_depth(max_depth: usize) -> Self {
        Self {
            history: HistoryRecorder::new(max_depth),
            ..Self::default()
        }
    }

    /// Current scene version (increments on every mutation)
    pub fn version(&self) -> u64 {
        self.version
    }

    /// All persisted bodies
    pub fn bodies(&self) -> &[RigidBody] {
        &self.scene.bodies
    }

    /// Get a body by ID
    pub fn get_body(&self, body_id: &str) -> Option<&RigidBody> {
        self.scene.body(body_id)
    }

    /// Get mutable body by ID
    pub(crate) fn get_body_mut(&mut self, body_id: &str) -> Option<&mut RigidBody> {
        self.scene.bodies.iter_mut().find(|b| b.id == body_id)
    }

    /// Body by ID or `UnknownBody`
    pub fn require_body(&self, body_id: &str) -> Result<&RigidBody> {
        self.get_body(body_id)
            .ok_or_else(|| EngineError::UnknownBody(body_id.to_string()))
    }

    /// Replace the whole scene. History is cleared and the group table is
    /// rebuilt from the bodies' group ids.
    pub fn set_scene(&mut self, mut scene: Scene) {
        tracing::info!("Loaded scene with {} bodies", scene.bodies.len());
        scene.sync_groups();
        self.scene = scene;
        self.history.clear();
        self.version += 1;
        self.refresh_collisions();
    }

    /// Collision set as of the last mutation
    pub fn collisions(&self) -> &CollisionSet {
        &self.collisions
    }

    /// Re-run collision detection on the persisted bodies
    pub fn refresh_collisions(&mut self) -> &CollisionSet {
        self.collisions = detect_collisions(&self.scene.bodies);
        &self.collisions
    }

    /// Bump version without recording history
    pub fn notify_mutated(&mut self) {
        self.version += 1;
    }

    /// Expand a selection so that picking one part of a group picks the whole group.
    ///
    /// Order follows the input, members follow the group table, duplicates
    /// are dropped.
    pub fn expand_to_groups(&self, ids: &[BodyId]) -> Result<Vec<BodyId>> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for id in ids {
            self.require_body(id)?;
            let members = match self.scene.group_of(id) {
                Some(group) => group.members.clone(),
                None => vec![id.clone()],
            };
            for member in members {
                if seen.insert(member.clone()) {
                    out.push(member);
                }
            }
        }
        Ok(out)
    }

    /// Snapshot of the given ids as they are now (missing ids map to `None`)
    pub(crate) fn snapshot(&self, ids: &[BodyId]) -> StateMap<BodySnapshot> {
        ids.iter()
            .map(|id| (id.clone(), self.get_body(id).cloned()))
            .collect()
    }
}

impl BatchTarget<BodySnapshot> for Scene {
    fn apply_states(&mut self, states: &StateMap<BodySnapshot>) {
        for (id, state) in states {
            match state {
                Some(body) => self.upsert_body(body.clone()),
                None => {
                    self.remove_body(id);
                }
            }
        }
    }
}
