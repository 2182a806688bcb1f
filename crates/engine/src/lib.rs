// Library crate: the snapping, collision and history engine plus the headless
// harness and JSON command interface. The binary is a thin CLI over it.

pub mod collision;
pub mod command;
pub mod error;
pub mod fixtures;
pub mod geometry;
pub mod harness;
pub mod history;
pub mod session;
pub mod snap;
pub mod state;
pub mod validation;

pub use error::{EngineError, Result};
