//! Interactive transform sessions: translate, rotate and resize with live preview.

mod controller;
pub mod drag_plane;
mod frame;
pub mod inference;
pub mod preview;
pub mod resize;

pub use controller::{
    CommitReport, PointerInput, SessionPhase, TransformController, TransformKind,
};
pub use drag_plane::{DragPlane, PointerRay, Ray};
pub use frame::FrameGate;
pub use preview::{PreviewEntry, PreviewFrame, PreviewMap};
pub use resize::ResizeHandle;
