//! usage_service - HTTP service recording PixelFly usage events
//!
//! Receives fire-and-forget tracking posts from the client pipeline and
//! serves aggregate statistics. Tracking is best-effort telemetry: the stats
//! endpoint never errors, it degrades to zeros instead.

pub mod controllers;
pub mod error;
pub mod server;
pub mod store;

pub use error::AppError;
pub use server::run;
pub use store::{UsageStats, UsageStore};
