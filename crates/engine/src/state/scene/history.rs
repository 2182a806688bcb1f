//! Undo/redo functionality

use super::SceneState;
use crate::history::ActionKind;

impl SceneState {
    /// Undo last change. Returns the kind of the undone batch.
    pub fn undo(&mut self) -> Option<ActionKind> {
        let kind = self.history.undo(&mut self.scene)?;
        self.version += 1;
        self.refresh_collisions();
        Some(kind)
    }

    /// Redo last undone change
    pub fn redo(&mut self) -> Option<ActionKind> {
        let kind = self.history.redo(&mut self.scene)?;
        self.version += 1;
        self.refresh_collisions();
        Some(kind)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Whether a history batch is in flight
    pub fn has_open_batch(&self) -> bool {
        self.history.is_open()
    }
}
