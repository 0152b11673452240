//! upload_pipeline - Drives an upload job from file selection to a terminal result
//!
//! The orchestrator performs encode, an optional health probe, and exactly one
//! backend request per job, publishing synthetic progress to registered
//! observers along the way. There is no cancellation and no automatic retry;
//! the only recovery from a failed job is submitting a new one.

pub mod error;
pub mod orchestrator;
pub mod progress;
pub mod session;
pub mod tracking;
pub mod updates;

pub use error::{FailureKind, PipelineError};
pub use orchestrator::Orchestrator;
pub use progress::ProgressSchedule;
pub use session::EnhanceSession;
pub use tracking::UsageReporter;
pub use updates::JobUpdate;
