//! Submit-time error taxonomy
//!
//! Every variant is terminal for the job it belongs to; nothing here is
//! retried automatically.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend is unreachable or its health probe did not report healthy.
    #[error("AI backend is unavailable: {reason}")]
    ServiceUnavailable { reason: String },

    /// The backend answered but rejected the job; the message is the
    /// service-provided text when available.
    #[error("{message}")]
    ProcessingRejected { message: String },

    /// The transport failed mid-request for a reason other than a timeout.
    #[error("network error talking to backend: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The request exceeded the configured timeout.
    #[error("backend did not respond within {seconds}s")]
    Timeout { seconds: u64 },

    /// The backend returned a body this client cannot interpret.
    #[error("invalid response from backend: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    /// Map a transport-level error, separating timeouts and connection
    /// refusals from the generic network case.
    pub(crate) fn from_transport(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                seconds: timeout_secs,
            }
        } else if err.is_connect() {
            Self::ServiceUnavailable {
                reason: err.to_string(),
            }
        } else {
            Self::NetworkError(err)
        }
    }
}
