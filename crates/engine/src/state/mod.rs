pub mod scene;
pub mod selection;
pub mod settings;

pub use scene::SceneState;
pub use selection::SelectionState;
pub use settings::{EngineSettings, GridSettings, HistorySettings, SessionSettings, SnapSettings};

use shared::BodyId;

use crate::error::{EngineError, Result};
use crate::session::{
    CommitReport, PointerInput, PreviewFrame, TransformController, TransformKind,
};

/// Combined editor state: the scene, what is selected, and the running session
pub struct EditorState {
    pub scene: SceneState,
    pub selection: SelectionState,
    pub settings: EngineSettings,
    pub controller: TransformController,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(EngineSettings::load())
    }
}

impl EditorState {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            scene: SceneState::with_history_depth(settings.history.max_depth),
            selection: SelectionState::default(),
            settings,
            controller: TransformController::default(),
        }
    }

    /// Press on the current selection
    pub fn begin_on_selection(&mut self, kind: TransformKind, start: [f64; 3]) -> Result<()> {
        let ids: Vec<BodyId> = self.selection.all().to_vec();
        if ids.is_empty() {
            return Err(EngineError::EmptySelection);
        }
        self.controller.begin(&mut self.scene, &ids, kind, start)
    }

    pub fn pointer_move(&mut self, input: PointerInput) -> Result<()> {
        self.controller.pointer_move(input)
    }

    /// Render tick
    pub fn frame(&mut self) -> Option<PreviewFrame> {
        self.controller.on_frame(&self.scene, &self.settings)
    }

    pub fn release(&mut self) -> Result<CommitReport> {
        self.controller.release(&mut self.scene, &self.settings)
    }

    pub fn cancel(&mut self) -> Result<()> {
        self.controller.cancel(&mut self.scene)
    }

    /// Undo, refused while a session is running
    pub fn undo(&mut self) -> bool {
        if self.controller.is_active() {
            return false;
        }
        let undone = self.scene.undo().is_some();
        self.prune_selection();
        undone
    }

    pub fn redo(&mut self) -> bool {
        if self.controller.is_active() {
            return false;
        }
        let redone = self.scene.redo().is_some();
        self.prune_selection();
        redone
    }

    /// Forget selected ids that no longer exist
    pub fn prune_selection(&mut self) {
        let scene = &self.scene;
        self.selection.retain(|id| scene.get_body(id).is_some());
    }
}
