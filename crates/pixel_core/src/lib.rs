//! pixel_core - Core types for the PixelFly processing pipeline
//!
//! This crate provides the foundational types used across the pipeline crates:
//! - `job` - UploadJob, operation configs, processing outcomes
//! - `encoder` - base64 encoding of source images with validation
//! - `message` - append-only conversation transcript for the enhance flow
//! - `config` - runtime configuration (TOML file + environment)

pub mod config;
pub mod encoder;
pub mod job;
pub mod message;

// Re-export commonly used types
pub use config::PipelineConfig;
pub use encoder::{EncodeError, EncodedImage, Encoder, EncoderLimits};
pub use job::{
    EnhanceOptions, ImagePayload, JobConfig, OperationKind, ProcessedImage, ProcessingOutcome,
    SourceImage, UploadJob, WatermarkOptions,
};
pub use message::{EntryBody, ImageRef, Role, Transcript, TranscriptEntry};
