//! Job states - Defines all possible states of an upload job

use serde::{Deserialize, Serialize};

/// Defines the possible states of an upload job's lifecycle.
///
/// `Completed` and `Failed` are terminal: no further transitions occur and
/// the only recourse after `Failed` is submitting a new job.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// The job exists but nothing has started.
    Idle,

    /// The source file(s) are being converted to base64.
    Encoding,

    /// The request has been built and handed to the transport.
    Submitted,

    /// Awaiting the backend response; `progress` is the last synthetic
    /// progress value published for this job (never 100 here).
    InProgress { progress: u8 },

    /// The backend returned a successful result.
    Completed,

    /// Terminal failure; the message is user-facing.
    Failed {
        error_message: String,
        failed_at: String, // ISO timestamp
    },
}

impl Default for JobState {
    fn default() -> Self {
        JobState::Idle
    }
}

impl JobState {
    /// Check if this is a terminal state (no more transitions expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed { .. })
    }

    /// Check if the job is actively being worked on.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::Encoding | Self::Submitted | Self::InProgress { .. }
        )
    }

    /// The synthetic progress to display for this state.
    pub fn progress_percent(&self) -> u8 {
        match self {
            Self::Idle | Self::Encoding | Self::Submitted => 0,
            Self::InProgress { progress } => *progress,
            Self::Completed => 100,
            Self::Failed { .. } => 0,
        }
    }

    /// Get a human-readable description of the current state.
    pub fn description(&self) -> &str {
        match self {
            Self::Idle => "Ready",
            Self::Encoding => "Preparing photo",
            Self::Submitted => "Uploading photo",
            Self::InProgress { .. } => "Enhancing with AI",
            Self::Completed => "Done",
            Self::Failed { .. } => "Failed",
        }
    }
}
