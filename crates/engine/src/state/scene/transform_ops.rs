//! Batched transform updates

use shared::{BodyId, BodyPatch, RigidBody};

use super::SceneState;
use crate::error::{EngineError, Result};
use crate::history::ActionKind;
use crate::validation::BodyValidator;

impl SceneState {
    /// Apply `[{id, patch}]` atomically: either every body updates or none does.
    ///
    /// Unknown IDs and patches that would leave a body malformed reject the
    /// whole batch. Does not touch history.
    pub fn apply_patches(&mut self, patches: &[BodyPatch]) -> Result<()> {
        let mut patched: Vec<RigidBody> = Vec::with_capacity(patches.len());
        for patch in patches {
            let mut body = self.require_body(&patch.id)?.clone();
            patch.apply_to(&mut body);
            BodyValidator::new(&body).check()?;
            patched.push(body);
        }

        for body in patched {
            if let Some(slot) = self.get_body_mut(&body.id) {
                *slot = body;
            }
        }
        self.version += 1;
        Ok(())
    }

    /// Open a history batch over `ids`, snapshotting their current state
    pub fn begin_batch(&mut self, kind: ActionKind, ids: &[BodyId]) -> Result<u64> {
        let before = self.snapshot(ids);
        self.history.begin(kind, ids.to_vec(), before)
    }

    /// Write the patches, refresh collisions once and seal the open batch.
    ///
    /// No patches means nothing changed: the batch closes without an undo
    /// entry and `Ok(false)` is returned. A rejected patch set discards the
    /// batch.
    pub fn commit_batch(&mut self, patches: &[BodyPatch]) -> Result<bool> {
        if !self.history.is_open() {
            return Err(EngineError::NoOpenBatch);
        }
        let patches: Vec<&BodyPatch> = patches.iter().filter(|p| !p.is_empty()).collect();
        if patches.is_empty() {
            return self.history.commit(Default::default());
        }

        let owned: Vec<BodyPatch> = patches.into_iter().cloned().collect();
        if let Err(e) = self.apply_patches(&owned) {
            self.history.discard()?;
            return Err(e);
        }
        self.refresh_collisions();

        let ids: Vec<BodyId> = owned.iter().map(|p| p.id.clone()).collect();
        let after = self.snapshot(&ids);
        self.history.commit(after)
    }

    /// Close the open batch without writing anything
    pub fn discard_batch(&mut self) -> Result<()> {
        self.history.discard()
    }

    /// Programmatic translation of bodies (expanded to their groups) as one undoable step
    pub fn translate(&mut self, ids: &[BodyId], delta: [f64; 3]) -> Result<Vec<BodyId>> {
        let targets = self.expand_to_groups(ids)?;
        if delta == [0.0; 3] {
            return Ok(Vec::new());
        }
        let patches: Vec<BodyPatch> = targets
            .iter()
            .map(|id| {
                let body = self.require_body(id)?;
                let mut position = body.position;
                for (p, d) in position.iter_mut().zip(delta) {
                    *p += d;
                }
                Ok(BodyPatch {
                    id: id.clone(),
                    position: Some(position),
                    rotation: None,
                    dimensions: None,
                })
            })
            .collect::<Result<_>>()?;

        self.begin_batch(ActionKind::Translate, &targets)?;
        self.commit_batch(&patches)?;
        Ok(targets)
    }
}
