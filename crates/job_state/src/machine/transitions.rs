//! State transitions - FSM transition logic
//!
//! Implements the state machine that handles event-driven state transitions.

use thiserror::Error;

use super::events::JobEvent;
use super::states::JobState;

/// Error type for invalid state transitions.
#[derive(Error, Debug, Clone)]
pub enum TransitionError {
    #[error("Invalid transition from {from:?} with event {event}")]
    InvalidTransition { from: JobState, event: String },

    #[error("State machine is in terminal state: {0:?}")]
    TerminalState(JobState),
}

/// Represents a state transition result.
#[derive(Debug, Clone)]
pub struct StateTransition {
    /// The state before the transition.
    pub from: JobState,
    /// The state after the transition.
    pub to: JobState,
    /// The event that triggered the transition.
    pub event: JobEvent,
    /// Whether the state actually changed.
    pub changed: bool,
}

/// State machine for managing upload job state transitions.
#[derive(Debug, Clone)]
pub struct StateMachine {
    /// Current state.
    current_state: JobState,
    /// Transition history (limited).
    history: Vec<StateTransition>,
    /// Max history entries to keep.
    max_history: usize,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    /// Create a new state machine in Idle state.
    pub fn new() -> Self {
        Self {
            current_state: JobState::Idle,
            history: Vec::new(),
            max_history: 50,
        }
    }

    /// Create a state machine with a specific initial state.
    pub fn with_state(state: JobState) -> Self {
        Self {
            current_state: state,
            history: Vec::new(),
            max_history: 50,
        }
    }

    /// Get the current state.
    pub fn state(&self) -> &JobState {
        &self.current_state
    }

    /// Get the transition history.
    pub fn history(&self) -> &[StateTransition] {
        &self.history
    }

    /// Handle an event and transition to a new state.
    pub fn handle_event(&mut self, event: JobEvent) -> StateTransition {
        let old_state = self.current_state.clone();
        let new_state = self.compute_next_state(&old_state, &event);
        let changed = old_state != new_state;

        self.current_state = new_state.clone();

        let transition = StateTransition {
            from: old_state,
            to: new_state,
            event,
            changed,
        };

        // Add to history
        self.history.push(transition.clone());
        if self.history.len() > self.max_history {
            self.history.remove(0);
        }

        transition
    }

    /// Compute the next state given current state and event.
    ///
    /// Invariants enforced here:
    /// - terminal states never transition again;
    /// - progress is monotone: a tick lower than the current value is ignored;
    /// - 100% is never reached through a tick, only through `ServiceSucceeded`.
    fn compute_next_state(&self, state: &JobState, event: &JobEvent) -> JobState {
        use JobEvent::*;
        use JobState::*;

        // Terminal states accept nothing.
        if state.is_terminal() {
            return state.clone();
        }

        match (state, event) {
            // ========== Acceptance and Encoding ==========
            (Idle, FileAccepted) => Encoding,

            (Encoding, EncodeFinished) => Submitted,
            (Encoding, EncodeFailed { error }) => Self::failed(error),

            // ========== Submission ==========
            (Submitted, RequestDispatched) => InProgress { progress: 0 },
            (Submitted, ServiceFailed { error }) => Self::failed(error),

            // ========== In Flight ==========
            (InProgress { progress }, ProgressTicked { percent }) => {
                // Synthetic and monotone; never 100 while in flight.
                let capped = (*percent).min(99);
                if capped > *progress {
                    InProgress { progress: capped }
                } else {
                    state.clone()
                }
            }
            (InProgress { .. }, ServiceSucceeded) => Completed,
            (InProgress { .. }, ServiceFailed { error }) => Self::failed(error),

            // ========== Default: No transition ==========
            _ => state.clone(),
        }
    }

    fn failed(error: &str) -> JobState {
        JobState::Failed {
            error_message: error.to_string(),
            failed_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Check if a transition is valid without executing it.
    pub fn can_transition(&self, event: &JobEvent) -> bool {
        let next = self.compute_next_state(&self.current_state, event);
        next != self.current_state
    }
}
