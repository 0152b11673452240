//! State machine module
//!
//! Contains the FSM implementation for the upload job lifecycle.

mod events;
mod states;
mod transitions;

pub use events::JobEvent;
pub use states::JobState;
pub use transitions::{StateMachine, StateTransition, TransitionError};
