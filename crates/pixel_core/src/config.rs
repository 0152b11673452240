//! Runtime configuration: `pixelfly.toml` overlaid with environment variables.

use serde::{Deserialize, Serialize};

const CONFIG_FILE_PATH: &str = "pixelfly.toml";

const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn parse_bool_env(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Base URL of the AI processing backend.
    pub backend_url: String,
    /// Per-request timeout for backend calls.
    pub timeout_secs: u64,
    /// Base URL of the usage-tracking API; reporting is disabled when unset.
    #[serde(default)]
    pub tracking_url: Option<String>,
    /// Skip the pre-flight `/health` probe before submitting.
    #[serde(default)]
    pub skip_health_check: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        let mut config = PipelineConfig {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            tracking_url: None,
            skip_health_check: false,
        };

        if std::path::Path::new(CONFIG_FILE_PATH).exists() {
            if let Ok(content) = std::fs::read_to_string(CONFIG_FILE_PATH) {
                if let Ok(file_config) = toml::from_str::<PipelineConfig>(&content) {
                    config = file_config;
                }
            }
        }

        if let Ok(url) = std::env::var("PIXELFLY_BACKEND_URL") {
            config.backend_url = url;
        }
        if let Ok(url) = std::env::var("PIXELFLY_TRACKING_URL") {
            config.tracking_url = Some(url);
        }
        if let Ok(secs) = std::env::var("PIXELFLY_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse::<u64>() {
                config.timeout_secs = secs;
            }
        }
        if let Ok(skip) = std::env::var("PIXELFLY_SKIP_HEALTH_CHECK") {
            config.skip_health_check = parse_bool_env(&skip);
        }
        config
    }
}
