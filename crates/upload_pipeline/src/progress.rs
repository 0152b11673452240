//! Synthetic progress schedule
//!
//! The backend offers no progress channel, so the pipeline fabricates one:
//! a fixed sequence of percentages published on a fixed cadence while the
//! request is in flight. The values are for UI responsiveness only and MUST
//! NOT be read as a measure of backend completion. 100 is never part of the
//! schedule; it is published once, by the orchestrator, on success.

use std::time::Duration;

/// Default steps, matching the product's original timer pattern
/// (started / analyzing / processing / finalizing).
const DEFAULT_STEPS: [u8; 4] = [10, 30, 60, 90];

const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct ProgressSchedule {
    steps: Vec<u8>,
    interval: Duration,
}

impl Default for ProgressSchedule {
    fn default() -> Self {
        Self {
            steps: DEFAULT_STEPS.to_vec(),
            interval: DEFAULT_INTERVAL,
        }
    }
}

impl ProgressSchedule {
    /// A custom schedule. Steps above 99 are clamped so the schedule can
    /// never fake completion; out-of-order steps are sorted.
    pub fn new(mut steps: Vec<u8>, interval: Duration) -> Self {
        for step in &mut steps {
            *step = (*step).min(99);
        }
        steps.sort_unstable();
        Self { steps, interval }
    }

    /// No synthetic ticks at all; only the terminal 100 (or nothing) is
    /// published. Useful for deterministic tests.
    pub fn silent() -> Self {
        Self {
            steps: Vec::new(),
            interval: Duration::ZERO,
        }
    }

    /// The default steps on a zero-length cadence, for tests that want the
    /// full sequence without waiting on timers.
    pub fn immediate() -> Self {
        Self {
            steps: DEFAULT_STEPS.to_vec(),
            interval: Duration::ZERO,
        }
    }

    pub fn steps(&self) -> &[u8] {
        &self.steps
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}
