//! Encoder - deterministic binary-to-base64 transform for transport
//!
//! The only validation in the whole pipeline lives here: MIME type must be
//! `image/*` and the payload must fit under the configured ceiling. The
//! transform itself is pure and safe to run concurrently for batch jobs.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::job::SourceImage;

/// 8 MiB, the product-wide upload ceiling.
pub const MAX_IMAGE_BYTES: usize = 8 * 1024 * 1024;

/// Watermark batches are capped at 3 images by the backend.
pub const MAX_BATCH_IMAGES: usize = 3;

/// Encode-time failures. All of these are terminal for the job and occur
/// before any network traffic.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    #[error("unsupported file type {mime:?}: only image/* files are accepted")]
    UnsupportedType { mime: String },

    #[error("file is too large ({size} bytes, limit {limit} bytes)")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("failed to read file: {0}")]
    ReadFailure(String),

    #[error("too many images in one batch ({count}, limit {limit})")]
    BatchTooLarge { count: usize, limit: usize },
}

/// Size and batch ceilings for the encoder.
#[derive(Debug, Clone, Copy)]
pub struct EncoderLimits {
    pub max_bytes: usize,
    pub max_batch: usize,
}

impl Default for EncoderLimits {
    fn default() -> Self {
        Self {
            max_bytes: MAX_IMAGE_BYTES,
            max_batch: MAX_BATCH_IMAGES,
        }
    }
}

/// A transport-safe encoding of a source image. The payload carries no
/// data-URL prefix; `as_data_url` re-adds one for rendering.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EncodedImage {
    pub filename: String,
    pub mime_type: String,
    pub payload: String,
    pub byte_len: usize,
}

impl EncodedImage {
    pub fn as_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.payload)
    }

    pub fn decode(&self) -> Result<Vec<u8>, EncodeError> {
        BASE64
            .decode(&self.payload)
            .map_err(|e| EncodeError::ReadFailure(e.to_string()))
    }
}

/// Encode raw bytes without validation, for previews and already-validated
/// payloads.
pub fn encode_bytes(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// Decode a base64 payload, tolerating a data-URL prefix.
pub fn decode_payload(payload: &str) -> Result<Vec<u8>, EncodeError> {
    BASE64
        .decode(strip_data_url(payload))
        .map_err(|e| EncodeError::ReadFailure(e.to_string()))
}

/// Strip a `data:<mime>;base64,` prefix if present. Payloads arriving from
/// the backend or from transcript entries may carry one.
pub fn strip_data_url(payload: &str) -> &str {
    if payload.starts_with("data:") {
        payload.split_once(',').map(|(_, b)| b).unwrap_or(payload)
    } else {
        payload
    }
}

/// Stateless base64 encoder with configurable ceilings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Encoder {
    limits: EncoderLimits,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: EncoderLimits) -> Self {
        Self { limits }
    }

    /// Validate and encode a single source image.
    pub fn encode(&self, source: &SourceImage) -> Result<EncodedImage, EncodeError> {
        if !source.mime_type.starts_with("image/") {
            return Err(EncodeError::UnsupportedType {
                mime: source.mime_type.clone(),
            });
        }
        if source.bytes.len() > self.limits.max_bytes {
            return Err(EncodeError::PayloadTooLarge {
                size: source.bytes.len(),
                limit: self.limits.max_bytes,
            });
        }
        Ok(EncodedImage {
            filename: source.filename.clone(),
            mime_type: source.mime_type.clone(),
            payload: BASE64.encode(&source.bytes),
            byte_len: source.bytes.len(),
        })
    }

    /// Encode a batch in submission order. The whole batch is rejected if
    /// any single image is invalid or the batch exceeds the cap.
    pub fn encode_batch(&self, sources: &[SourceImage]) -> Result<Vec<EncodedImage>, EncodeError> {
        if sources.len() > self.limits.max_batch {
            return Err(EncodeError::BatchTooLarge {
                count: sources.len(),
                limit: self.limits.max_batch,
            });
        }
        sources.iter().map(|s| self.encode(s)).collect()
    }
}
