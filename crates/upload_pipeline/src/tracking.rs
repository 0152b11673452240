//! Fire-and-forget usage reporting
//!
//! After a job reaches a terminal state, the orchestrator posts a counter
//! record to the tracking API. Failures are logged and never affect the
//! job; the whole reporter is absent when no tracking URL is configured.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

/// Tracking calls get a short leash so a slow tracking API can never hold
/// up anything that awaits the spawned task.
const TRACKING_TIMEOUT: Duration = Duration::from_secs(2);

/// Record for `POST /api/track/enhancement`. Field names are the tracking
/// API's camelCase wire names.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancementRecord {
    pub user_id: String,
    pub filename: Option<String>,
    pub file_size: Option<u64>,
    pub processing_time: f64,
    pub enhancement_type: String,
    pub success: bool,
}

/// Record for `POST /api/track/watermark`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatermarkRecord {
    pub user_id: String,
    pub filename: Option<String>,
    pub file_size: Option<u64>,
    pub processing_time: f64,
    pub watermark_text: Option<String>,
    pub watermark_style: Option<String>,
    pub watermark_position: Option<String>,
    pub photo_count: usize,
    pub success: bool,
}

#[derive(Debug, Clone)]
pub struct UsageReporter {
    http: reqwest::Client,
    base_url: String,
}

impl UsageReporter {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = match reqwest::Client::builder().timeout(TRACKING_TIMEOUT).build() {
            Ok(client) => client,
            Err(err) => {
                warn!("tracking client builder failed, using a default client without the tracking timeout: {err}");
                reqwest::Client::new()
            }
        };
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn report_enhancement(&self, record: EnhancementRecord) -> tokio::task::JoinHandle<()> {
        self.post("/api/track/enhancement", record)
    }

    pub fn report_watermark(&self, record: WatermarkRecord) -> tokio::task::JoinHandle<()> {
        self.post("/api/track/watermark", record)
    }

    fn post<T: Serialize + Send + 'static>(
        &self,
        path: &str,
        record: T,
    ) -> tokio::task::JoinHandle<()> {
        let url = format!("{}{}", self.base_url, path);
        let http = self.http.clone();
        tokio::spawn(async move {
            match http.post(&url).json(&record).send().await {
                Ok(response) if response.status().is_success() => {
                    debug!("tracked usage via {url}");
                }
                Ok(response) => {
                    warn!("usage tracking returned {} for {url}", response.status());
                }
                Err(err) => {
                    warn!("usage tracking failed for {url}: {err}");
                }
            }
        })
    }
}
