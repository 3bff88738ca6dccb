//! Input handling: platform-agnostic event types and the pointer/touch
//! state machine that feeds the camera controller.

/// Platform-agnostic input events.
pub mod event;
/// Interaction state machine and pointer tracking.
pub mod state;

pub use event::{InputEvent, MouseButton, TouchPoint};
pub use state::{ClickActions, InputResponse, InteractionState, PointerTracker};
