//! Job events - Defines events that trigger state transitions

use serde::{Deserialize, Serialize};

/// Defines the events that can trigger state transitions in the FSM.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum JobEvent {
    // ========== User Events ==========
    /// A file (or batch) passed initial acceptance and the job started.
    FileAccepted,

    // ========== Encode Events ==========
    /// All source files were encoded successfully.
    EncodeFinished,

    /// Encoding failed; the job is over before any network call.
    EncodeFailed { error: String },

    // ========== Submit Events ==========
    /// The request was handed to the transport.
    RequestDispatched,

    /// A synthetic progress value was published. Values are a client-side
    /// approximation and never authoritative.
    ProgressTicked { percent: u8 },

    /// The backend responded with `success: true`.
    ServiceSucceeded,

    /// The backend rejected the job, the probe failed, or the transport
    /// errored out.
    ServiceFailed { error: String },
}

impl JobEvent {
    /// Check if this event carries a failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::EncodeFailed { .. } | Self::ServiceFailed { .. })
    }
}
