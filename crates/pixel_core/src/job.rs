//! Job types - one user-initiated image submission and its outcome
//!
//! An `UploadJob` is created when the user selects or drops files and is
//! discarded when the page session ends; nothing here persists across jobs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::encoder::EncodeError;

/// The two operations the backend performs.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Enhance,
    Watermark,
}

/// A user-supplied image before encoding: raw bytes plus the declared
/// MIME type. Owned exclusively by its job until encoded.
#[derive(Clone, Debug)]
pub struct SourceImage {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SourceImage {
    pub fn new(
        filename: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            filename: filename.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read an image from disk, guessing the MIME type from the extension.
    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self, EncodeError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| EncodeError::ReadFailure(e.to_string()))?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let mime_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_string();
        Ok(Self {
            filename,
            mime_type,
            bytes,
        })
    }

    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }
}

/// Parameters for a single-photo enhancement request.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EnhanceOptions {
    pub enhancement_type: String,
    pub return_format: String,
}

impl Default for EnhanceOptions {
    fn default() -> Self {
        Self {
            enhancement_type: "auto".to_string(),
            return_format: "base64".to_string(),
        }
    }
}

/// Watermark rendering parameters. Plain values only; all interpretation
/// happens in the backend.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WatermarkOptions {
    pub text: String,
    pub position: String,
    /// 0.0 - 1.0
    pub opacity: f64,
    pub color: String,
    pub style: String,
    pub size: String,
    pub protection_level: String,
}

impl Default for WatermarkOptions {
    fn default() -> Self {
        Self {
            text: "© PixelFly".to_string(),
            position: "smart_adaptive".to_string(),
            opacity: 0.8,
            color: "white".to_string(),
            style: "modern_glass".to_string(),
            size: "medium".to_string(),
            protection_level: "basic".to_string(),
        }
    }
}

/// Operation-specific configuration attached to a job.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum JobConfig {
    Enhance(EnhanceOptions),
    Watermark(WatermarkOptions),
}

impl JobConfig {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Enhance(_) => OperationKind::Enhance,
            Self::Watermark(_) => OperationKind::Watermark,
        }
    }
}

/// One in-flight user submission: 1..=N source images plus the operation
/// configuration. State tracking lives in the `job_state` crate; the
/// orchestrator owns the mutation of both.
#[derive(Clone, Debug)]
pub struct UploadJob {
    pub id: Uuid,
    pub sources: Vec<SourceImage>,
    pub config: JobConfig,
    pub created_at: DateTime<Utc>,
}

impl UploadJob {
    pub fn enhance(source: SourceImage, options: EnhanceOptions) -> Self {
        Self {
            id: Uuid::new_v4(),
            sources: vec![source],
            config: JobConfig::Enhance(options),
            created_at: Utc::now(),
        }
    }

    pub fn watermark(sources: Vec<SourceImage>, options: WatermarkOptions) -> Self {
        Self {
            id: Uuid::new_v4(),
            sources,
            config: JobConfig::Watermark(options),
            created_at: Utc::now(),
        }
    }

    pub fn operation(&self) -> OperationKind {
        self.config.kind()
    }

    /// Filenames in submission order; batch results are zipped back against
    /// this list by position.
    pub fn filenames(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.filename.clone()).collect()
    }
}

/// Where a processed image lives: inline base64 or a remote URL.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImagePayload {
    Base64 { data: String },
    Url { url: String },
}

/// One output image paired back to the filename it was submitted under.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ProcessedImage {
    pub filename: String,
    pub payload: ImagePayload,
}

/// The successful terminal payload of a job. A job carries either this or
/// an error message, never both.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ProcessingOutcome {
    pub images: Vec<ProcessedImage>,
    /// Seconds, as reported by the backend.
    pub processing_time: f64,
    pub enhancements_applied: Vec<String>,
    pub processed_count: usize,
}
