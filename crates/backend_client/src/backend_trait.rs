use async_trait::async_trait;

use crate::error::BackendError;
use crate::models::{EnhanceRequest, EnhanceResponse, WatermarkRequest, WatermarkResponse};

/// Seam between the orchestrator and the real backend, so pipeline logic can
/// be exercised against a mock.
#[async_trait]
pub trait ProcessingBackend: Send + Sync {
    /// Liveness probe; `Ok(())` means the service reported healthy.
    async fn health(&self) -> Result<(), BackendError>;

    async fn enhance(&self, request: &EnhanceRequest) -> Result<EnhanceResponse, BackendError>;

    async fn watermark(
        &self,
        request: &WatermarkRequest,
    ) -> Result<WatermarkResponse, BackendError>;
}
