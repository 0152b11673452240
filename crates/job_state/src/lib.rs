//! job_state - State machine for the upload job lifecycle
//!
//! This crate provides the FSM driving a job from file acceptance through
//! encoding, submission, and synthetic progress to a terminal outcome.

pub mod machine;

// Re-export commonly used types
pub use machine::{JobEvent, JobState, StateMachine, StateTransition, TransitionError};
