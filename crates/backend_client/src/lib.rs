//! backend_client - HTTP client for the PixelFly AI processing backend
//!
//! The backend is an opaque HTTP service exposing `GET /health`,
//! `POST /api/enhance` and `POST /api/watermark`. This crate owns the wire
//! types, the submit-time error taxonomy, and the one-request-per-call
//! contract: no automatic retries, explicit per-request timeout.

pub mod backend_trait;
pub mod client;
pub mod error;
pub mod models;

pub use backend_trait::ProcessingBackend;
pub use client::BackendClient;
pub use error::BackendError;
pub use models::{
    EnhanceRequest, EnhanceResponse, HealthResponse, WatermarkParams, WatermarkRequest,
    WatermarkResponse,
};
