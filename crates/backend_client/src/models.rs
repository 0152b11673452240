//! Wire types for the processing backend
//!
//! Field names mirror the backend's JSON exactly (snake_case Python service).

use pixel_core::WatermarkOptions;
use serde::{Deserialize, Serialize};

/// `GET /health` response; the service is usable iff `status == "healthy"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// `POST /api/enhance` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhanceRequest {
    pub user_id: String,
    pub enhancement_type: String,
    pub return_format: String,
    pub image_base64: String,
}

/// `POST /api/enhance` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhanceResponse {
    pub success: bool,
    #[serde(default)]
    pub enhanced_base64: Option<String>,
    #[serde(default)]
    pub enhanced_url: Option<String>,
    #[serde(default)]
    pub processing_time: f64,
    #[serde(default)]
    pub enhancements_applied: Vec<String>,
    #[serde(default)]
    pub original_filename: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Watermark parameters as the backend expects them. `opacity` is 0.0 - 1.0
/// on the wire (the UI slider's percent is divided down before this point).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatermarkParams {
    pub text: String,
    pub position: String,
    pub opacity: f64,
    pub color: String,
    pub style: String,
    pub size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
}

impl From<&WatermarkOptions> for WatermarkParams {
    fn from(opts: &WatermarkOptions) -> Self {
        Self {
            text: opts.text.clone(),
            position: opts.position.clone(),
            opacity: opts.opacity,
            color: opts.color.clone(),
            style: opts.style.clone(),
            size: opts.size.clone(),
            font_size: None,
        }
    }
}

/// `POST /api/watermark` request body. The backend caps the list at 3 images.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatermarkRequest {
    pub user_id: String,
    pub image_base64_list: Vec<String>,
    pub watermark_config: WatermarkParams,
    pub return_format: String,
}

/// `POST /api/watermark` response body. Results are positional: entry `i`
/// corresponds to `image_base64_list[i]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatermarkResponse {
    pub success: bool,
    #[serde(default)]
    pub watermarked_base64: Vec<String>,
    #[serde(default)]
    pub watermarked_urls: Vec<String>,
    #[serde(default)]
    pub processing_time: f64,
    #[serde(default)]
    pub processed_count: usize,
    #[serde(default)]
    pub error: Option<String>,
}
