/// Coalesces input events between rendered frames.
///
/// Only the most recent event survives until the next frame takes it.
#[derive(Debug)]
pub struct FrameGate<T> {
    pending: Option<T>,
    coalesced: u64,
}

impl<T> Default for FrameGate<T> {
    fn default() -> Self {
        Self {
            pending: None,
            coalesced: 0,
        }
    }
}

impl<T> FrameGate<T> {
    /// Queue an event, superseding any event not yet taken
    pub fn push(&mut self, event: T) {
        if self.pending.replace(event).is_some() {
            self.coalesced += 1;
        }
    }

    /// Take the latest event for this frame
    pub fn take(&mut self) -> Option<T> {
        self.pending.take()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Events dropped because a newer one arrived in the same frame
    pub fn coalesced(&self) -> u64 {
        self.coalesced
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}
