use shared::BodyId;

/// Body selection state (supports multi-select)
#[derive(Debug, Default)]
pub struct SelectionState {
    /// Selected body IDs (in order of selection)
    selected: Vec<BodyId>,
    /// Version counter for selection changes
    pub version: u64,
}

impl SelectionState {
    /// Primary (first) selected body
    pub fn primary(&self) -> Option<&BodyId> {
        self.selected.first()
    }

    /// All selected bodies
    pub fn all(&self) -> &[BodyId] {
        &self.selected
    }

    /// Check if a body is selected
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|s| s == id)
    }

    /// Select a single body (clears previous selection)
    pub fn select(&mut self, id: BodyId) {
        self.selected.clear();
        self.selected.push(id);
        self.version += 1;
    }

    /// Toggle selection (Ctrl+click behavior)
    pub fn toggle(&mut self, id: BodyId) {
        if let Some(pos) = self.selected.iter().position(|s| s == &id) {
            self.selected.remove(pos);
        } else {
            self.selected.push(id);
        }
        self.version += 1;
    }

    /// Clear all selection
    pub fn clear(&mut self) {
        self.selected.clear();
        self.version += 1;
    }

    /// Drop IDs that no longer exist
    pub fn retain(&mut self, exists: impl Fn(&str) -> bool) {
        let before = self.selected.len();
        self.selected.retain(|id| exists(id));
        if self.selected.len() != before {
            self.version += 1;
        }
    }

    /// Number of selected bodies
    pub fn count(&self) -> usize {
        self.selected.len()
    }

    /// Multi-body (rigid group) mode needs at least two bodies
    pub fn is_multi(&self) -> bool {
        self.selected.len() >= 2
    }
}
