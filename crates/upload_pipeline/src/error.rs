//! Pipeline error taxonomy
//!
//! Every failure the orchestrator can produce, each terminal for its job.
//! Encode-time failures never reach the network; submit-time failures carry
//! the backend classification through unchanged.

use backend_client::BackendError;
use pixel_core::EncodeError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The input failed encoder validation; no network call was made.
    #[error("invalid input: {0}")]
    InputInvalid(#[from] EncodeError),

    /// The job was submitted without any source file.
    #[error("no source file attached to job")]
    MissingSource,

    /// A submit-time failure from the backend client.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The backend returned a different number of results than images were
    /// submitted. Positional reconciliation would mispair results, so the
    /// whole batch fails.
    #[error("backend returned {actual} result(s) for {expected} submitted image(s)")]
    ResultMismatch { expected: usize, actual: usize },
}

/// Coarse classification attached to failure notifications, mirroring the
/// error taxonomy without dragging error payloads through channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InputInvalid,
    ServiceUnavailable,
    ProcessingRejected,
    NetworkError,
    Timeout,
    InvalidResponse,
    ResultMismatch,
}

impl PipelineError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::InputInvalid(_) | Self::MissingSource => FailureKind::InputInvalid,
            Self::Backend(BackendError::ServiceUnavailable { .. }) => {
                FailureKind::ServiceUnavailable
            }
            Self::Backend(BackendError::ProcessingRejected { .. }) => {
                FailureKind::ProcessingRejected
            }
            Self::Backend(BackendError::NetworkError(_)) => FailureKind::NetworkError,
            Self::Backend(BackendError::Timeout { .. }) => FailureKind::Timeout,
            Self::Backend(BackendError::InvalidResponse(_)) => FailureKind::InvalidResponse,
            Self::ResultMismatch { .. } => FailureKind::ResultMismatch,
        }
    }

    /// The inline message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend(BackendError::ServiceUnavailable { .. }) => {
                "The AI backend is currently unavailable. Please try again in a moment."
                    .to_string()
            }
            other => other.to_string(),
        }
    }
}
