use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use pixel_core::PipelineConfig;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::backend_trait::ProcessingBackend;
use crate::error::BackendError;
use crate::models::{
    EnhanceRequest, EnhanceResponse, HealthResponse, WatermarkRequest, WatermarkResponse,
};

/// HTTP client for the AI processing backend.
///
/// One outbound request per call: no middleware, no automatic retries. The
/// timeout applies to the whole request including the response body.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
    timeout_secs: u64,
}

impl BackendClient {
    pub fn new(config: &PipelineConfig) -> Result<Self, BackendError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(BackendError::NetworkError)?;
        Ok(Self {
            http,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Turn a non-2xx response into the error taxonomy: 5xx means the
    /// service is down, anything else is a rejection whose body may carry
    /// the service's own error text.
    async fn error_for_status(response: Response) -> BackendError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return BackendError::ServiceUnavailable {
                reason: format!("Backend error: {status}"),
            };
        }
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
            .unwrap_or_else(|| format!("Backend error: {status}"));
        BackendError::ProcessingRejected { message }
    }

    async fn parse_body<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }

    async fn post_json<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, BackendError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {url}");
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::from_transport(e, self.timeout_secs))?;

        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }
        Self::parse_body(response).await
    }
}

#[async_trait]
impl ProcessingBackend for BackendClient {
    async fn health(&self) -> Result<(), BackendError> {
        let url = format!("{}/health", self.base_url);
        debug!("GET {url}");
        let response = self.http.get(&url).send().await.map_err(|e| {
            warn!("health probe failed: {e}");
            // Any probe failure, timeout included, classifies as unavailable.
            BackendError::ServiceUnavailable {
                reason: e.to_string(),
            }
        })?;

        if !response.status().is_success() {
            return Err(BackendError::ServiceUnavailable {
                reason: format!("Backend error: {}", response.status()),
            });
        }

        let health: HealthResponse = Self::parse_body(response).await?;
        if health.is_healthy() {
            Ok(())
        } else {
            Err(BackendError::ServiceUnavailable {
                reason: format!("backend reported status {:?}", health.status),
            })
        }
    }

    async fn enhance(&self, request: &EnhanceRequest) -> Result<EnhanceResponse, BackendError> {
        info!(
            "submitting enhancement for user {} ({} chars of image data)",
            request.user_id,
            request.image_base64.len()
        );
        let response: EnhanceResponse = self.post_json("/api/enhance", request).await?;
        if !response.success {
            let message = response
                .error
                .clone()
                .unwrap_or_else(|| "Enhancement failed".to_string());
            return Err(BackendError::ProcessingRejected { message });
        }
        Ok(response)
    }

    async fn watermark(
        &self,
        request: &WatermarkRequest,
    ) -> Result<WatermarkResponse, BackendError> {
        info!(
            "submitting watermark batch of {} image(s) for user {}",
            request.image_base64_list.len(),
            request.user_id
        );
        let response: WatermarkResponse = self.post_json("/api/watermark", request).await?;
        if !response.success {
            let message = response
                .error
                .clone()
                .unwrap_or_else(|| "Watermarking failed".to_string());
            return Err(BackendError::ProcessingRejected { message });
        }
        Ok(response)
    }
}
