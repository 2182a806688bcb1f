//! Error types for the engine.
//!
//! Snapping misses, empty undo stacks and collisions are not errors; they are
//! reported through return values. Everything here is a rejected request.

use thiserror::Error;

use crate::history::ActionKind;

/// Engine error type
#[derive(Error, Debug)]
pub enum EngineError {
    /// Referenced body does not exist in the scene
    #[error("Unknown body: {0}")]
    UnknownBody(String),

    /// Body has zero, negative or non-finite dimensions or transform values
    #[error("Malformed body {id}: {reason}")]
    MalformedBody {
        /// The offending body id.
        id: String,
        /// Which check failed.
        reason: String,
    },

    /// A history batch is already open
    #[error("A {open:?} batch is already open")]
    BatchAlreadyOpen {
        /// Kind of the batch that is still in flight.
        open: ActionKind,
    },

    /// Commit or discard without an open batch
    #[error("No history batch is open")]
    NoOpenBatch,

    /// A transform session is already running
    #[error("A transform session is already active")]
    SessionActive,

    /// Pointer input arrived without a running session
    #[error("No transform session is active")]
    NoActiveSession,

    /// Nothing to operate on
    #[error("Selection is empty")]
    EmptySelection,

    /// Command JSON could not be parsed
    #[error("Invalid command JSON: {0}")]
    InvalidCommand(#[from] serde_json::Error),

    /// Settings file could not be written
    #[error("Settings I/O error: {0}")]
    SettingsIo(#[from] std::io::Error),

    /// Settings could not be encoded or decoded as JSON
    #[error("Settings format error: {0}")]
    SettingsFormat(serde_json::Error),
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, EngineError>;
