//! History batch recorder: atomic, undoable transactions.
//!
//! A batch wraps one whole user action (a drag, a duplicate, a delete) with
//! before/after snapshots of every affected id. The recorder never looks
//! inside the snapshots; it only moves them between stacks and hands them to
//! a [`BatchTarget`] to apply.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use shared::BodyId;

use crate::error::{EngineError, Result};

/// What kind of user action a batch records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Create,
    Translate,
    Rotate,
    Resize,
    Duplicate,
    Delete,
}

/// Snapshot per body id
pub type StateMap<S> = BTreeMap<BodyId, S>;

/// One sealed (or in-flight) transaction
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryBatch<S> {
    pub id: u64,
    pub kind: ActionKind,
    pub targets: Vec<BodyId>,
    pub before: StateMap<S>,
    pub after: StateMap<S>,
}

/// Receiver of snapshot maps on undo/redo
pub trait BatchTarget<S> {
    /// Apply every state in the map. Must be all-or-nothing.
    fn apply_states(&mut self, states: &StateMap<S>);
}

/// Undo/redo stacks plus at most one open batch
#[derive(Debug)]
pub struct HistoryRecorder<S> {
    open: Option<HistoryBatch<S>>,
    undo_stack: Vec<HistoryBatch<S>>,
    redo_stack: Vec<HistoryBatch<S>>,
    max_depth: usize,
    next_id: u64,
}

impl<S> Default for HistoryRecorder<S> {
    fn default() -> Self {
        Self::new(100)
    }
}

impl<S> HistoryRecorder<S> {
    pub fn new(max_depth: usize) -> Self {
        Self {
            open: None,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
            next_id: 1,
        }
    }

    /// Open a batch. Rejected while another batch is open; the open one is untouched.
    pub fn begin(&mut self, kind: ActionKind, targets: Vec<BodyId>, before: StateMap<S>) -> Result<u64> {
        if let Some(open) = &self.open {
            tracing::warn!("Rejected {kind:?} batch: {:?} batch {} still open", open.kind, open.id);
            return Err(EngineError::BatchAlreadyOpen { open: open.kind });
        }
        let id = self.next_id;
        self.next_id += 1;
        tracing::debug!("Begin {kind:?} batch {id} ({} targets)", targets.len());
        self.open = Some(HistoryBatch {
            id,
            kind,
            targets,
            before,
            after: StateMap::new(),
        });
        Ok(id)
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn open_kind(&self) -> Option<ActionKind> {
        self.open.as_ref().map(|b| b.kind)
    }

    /// Seal the open batch and push it. Clears the redo stack.
    ///
    /// An empty `after` map closes the batch without pushing anything and
    /// returns `Ok(false)`.
    pub fn commit(&mut self, after: StateMap<S>) -> Result<bool> {
        let mut batch = self.open.take().ok_or(EngineError::NoOpenBatch)?;
        if after.is_empty() {
            tracing::debug!("Dropped empty {:?} batch {}", batch.kind, batch.id);
            return Ok(false);
        }
        batch.after = after;
        tracing::info!("Committed {:?} batch {}", batch.kind, batch.id);
        self.undo_stack.push(batch);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
        Ok(true)
    }

    /// Throw the open batch away
    pub fn discard(&mut self) -> Result<()> {
        let batch = self.open.take().ok_or(EngineError::NoOpenBatch)?;
        tracing::debug!("Discarded {:?} batch {}", batch.kind, batch.id);
        Ok(())
    }

    /// `begin` + `commit` for actions that have no preview phase
    pub fn record(
        &mut self,
        kind: ActionKind,
        targets: Vec<BodyId>,
        before: StateMap<S>,
        after: StateMap<S>,
    ) -> Result<bool> {
        self.begin(kind, targets, before)?;
        self.commit(after)
    }

    /// Apply the most recent batch's `before` states and move it to the redo stack.
    /// No-op on an empty stack or while a batch is open.
    pub fn undo(&mut self, target: &mut impl BatchTarget<S>) -> Option<ActionKind> {
        if self.open.is_some() {
            tracing::warn!("Undo ignored while a batch is open");
            return None;
        }
        let batch = self.undo_stack.pop()?;
        target.apply_states(&batch.before);
        let kind = batch.kind;
        tracing::info!("Undo {kind:?} batch {}", batch.id);
        self.redo_stack.push(batch);
        Some(kind)
    }

    /// Mirror of [`undo`](Self::undo): reapply `after`.
    pub fn redo(&mut self, target: &mut impl BatchTarget<S>) -> Option<ActionKind> {
        if self.open.is_some() {
            tracing::warn!("Redo ignored while a batch is open");
            return None;
        }
        let batch = self.redo_stack.pop()?;
        target.apply_states(&batch.after);
        let kind = batch.kind;
        tracing::info!("Redo {kind:?} batch {}", batch.id);
        self.undo_stack.push(batch);
        Some(kind)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Most recent committed batch
    pub fn last(&self) -> Option<&HistoryBatch<S>> {
        self.undo_stack.last()
    }

    pub fn clear(&mut self) {
        self.open = None;
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
