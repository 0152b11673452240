//! Observer notifications published while a job runs
//!
//! Per job: zero or more `Progress` updates in non-decreasing order, then
//! exactly one terminal update (`Completed` or `Failed`), always last.

use pixel_core::ProcessingOutcome;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FailureKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobUpdate {
    /// Synthetic progress; a client-side approximation, never a measure of
    /// true backend completion.
    Progress { job_id: Uuid, percent: u8 },

    Completed {
        job_id: Uuid,
        outcome: ProcessingOutcome,
    },

    Failed {
        job_id: Uuid,
        kind: FailureKind,
        message: String,
    },
}

impl JobUpdate {
    pub fn job_id(&self) -> Uuid {
        match self {
            Self::Progress { job_id, .. }
            | Self::Completed { job_id, .. }
            | Self::Failed { job_id, .. } => *job_id,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Failed { .. })
    }
}
