//! Enhance session - conversational wrapper around the orchestrator
//!
//! Owns the transcript for one user sitting. Each submission appends the
//! user's image entry and an assistant placeholder, runs the job, and
//! resolves the placeholder in place with the result or the failure text.

use std::sync::Arc;

use backend_client::{BackendError, ProcessingBackend};
use pixel_core::encoder::encode_bytes;
use pixel_core::{
    EnhanceOptions, EntryBody, ImagePayload, ImageRef, ProcessedImage, Role, SourceImage,
    Transcript, UploadJob,
};
use uuid::Uuid;

use crate::error::PipelineError;
use crate::orchestrator::Orchestrator;

pub const PROCESSING_LABEL: &str = "Enhancing with AI...";

pub struct EnhanceSession<B: ProcessingBackend> {
    orchestrator: Arc<Orchestrator<B>>,
    transcript: Transcript,
    user_id: String,
}

impl<B: ProcessingBackend> EnhanceSession<B> {
    pub fn new(orchestrator: Arc<Orchestrator<B>>, user_id: impl Into<String>) -> Self {
        Self {
            orchestrator,
            transcript: Transcript::new(),
            user_id: user_id.into(),
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Submit one photo for enhancement, recording the exchange in the
    /// transcript. The placeholder is resolved exactly once, with either the
    /// enhancement entry or the failure text.
    pub async fn submit_photo(
        &mut self,
        source: SourceImage,
        options: EnhanceOptions,
    ) -> Result<ProcessedImage, PipelineError> {
        self.transcript.push(
            Role::User,
            EntryBody::Image {
                source: ImageRef::Base64 {
                    data: encode_bytes(&source.bytes),
                    media_type: source.mime_type.clone(),
                },
                alt_text: Some(source.filename.clone()),
            },
        );
        let placeholder = self.transcript.push_placeholder(PROCESSING_LABEL);

        let filename = source.filename.clone();
        let job = UploadJob::enhance(source, options);
        let result = self.orchestrator.submit(&job, &self.user_id).await;
        self.record_outcome(placeholder, &filename, result)
    }

    /// Re-run enhancement on a prior result ("enhance again"), as a fresh
    /// job with its own transcript exchange.
    pub async fn enhance_again(
        &mut self,
        image: &ProcessedImage,
        options: EnhanceOptions,
    ) -> Result<ProcessedImage, PipelineError> {
        let source = Orchestrator::<B>::source_from_result(image)?;
        self.submit_photo(source, options).await
    }

    fn record_outcome(
        &mut self,
        placeholder: Uuid,
        filename: &str,
        result: Result<pixel_core::ProcessingOutcome, PipelineError>,
    ) -> Result<ProcessedImage, PipelineError> {
        match result {
            Ok(outcome) => {
                let Some(image) = outcome.images.into_iter().next() else {
                    let err = PipelineError::Backend(BackendError::InvalidResponse(
                        "success response carried no enhanced image".into(),
                    ));
                    self.transcript.resolve_placeholder(
                        placeholder,
                        EntryBody::Text {
                            text: err.user_message(),
                        },
                    );
                    return Err(err);
                };
                self.transcript.resolve_placeholder(
                    placeholder,
                    EntryBody::Enhancement {
                        source: match &image.payload {
                            ImagePayload::Base64 { data } => ImageRef::Base64 {
                                data: data.clone(),
                                media_type: "image/jpeg".to_string(),
                            },
                            ImagePayload::Url { url } => ImageRef::Url { url: url.clone() },
                        },
                        original_filename: filename.to_string(),
                        processing_time: outcome.processing_time,
                        enhancements_applied: outcome.enhancements_applied,
                    },
                );
                Ok(image)
            }
            Err(err) => {
                self.transcript.resolve_placeholder(
                    placeholder,
                    EntryBody::Text {
                        text: err.user_message(),
                    },
                );
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use backend_client::{EnhanceRequest, WatermarkRequest};
    use pixel_core::PipelineConfig;

    use crate::progress::ProgressSchedule;

    struct FixedBackend {
        response: Result<backend_client::EnhanceResponse, &'static str>,
    }

    #[async_trait]
    impl ProcessingBackend for FixedBackend {
        async fn health(&self) -> Result<(), BackendError> {
            Ok(())
        }

        async fn enhance(
            &self,
            _request: &EnhanceRequest,
        ) -> Result<backend_client::EnhanceResponse, BackendError> {
            self.response
                .clone()
                .map_err(|m| BackendError::ProcessingRejected { message: m.into() })
        }

        async fn watermark(
            &self,
            _request: &WatermarkRequest,
        ) -> Result<backend_client::WatermarkResponse, BackendError> {
            unreachable!("sessions only enhance")
        }
    }

    fn session_with(backend: FixedBackend) -> EnhanceSession<FixedBackend> {
        let config = PipelineConfig {
            backend_url: "http://unused".into(),
            timeout_secs: 1,
            tracking_url: None,
            skip_health_check: true,
        };
        let orchestrator =
            Orchestrator::new(backend, &config).with_schedule(ProgressSchedule::silent());
        EnhanceSession::new(Arc::new(orchestrator), "user-1")
    }

    fn enhance_ok() -> backend_client::EnhanceResponse {
        backend_client::EnhanceResponse {
            success: true,
            enhanced_base64: Some(encode_bytes(b"result")),
            enhanced_url: None,
            processing_time: 0.5,
            enhancements_applied: vec!["sharpness".into()],
            original_filename: None,
            error: None,
        }
    }

    #[tokio::test]
    async fn success_resolves_placeholder_with_enhancement() {
        let mut session = session_with(FixedBackend {
            response: Ok(enhance_ok()),
        });
        let source = SourceImage::new("photo.jpg", "image/jpeg", b"bytes".to_vec());
        let image = session
            .submit_photo(source, EnhanceOptions::default())
            .await
            .unwrap();
        assert_eq!(image.filename, "photo.jpg");

        let entries = session.transcript().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].role, Role::User);
        assert!(matches!(
            entries[1].body,
            EntryBody::Enhancement { ref original_filename, .. }
                if original_filename == "photo.jpg"
        ));
    }

    #[tokio::test]
    async fn failure_resolves_placeholder_with_error_text() {
        let mut session = session_with(FixedBackend {
            response: Err("image too dark to enhance"),
        });
        let source = SourceImage::new("photo.jpg", "image/jpeg", b"bytes".to_vec());
        assert!(session
            .submit_photo(source, EnhanceOptions::default())
            .await
            .is_err());

        let entries = session.transcript().entries();
        assert_eq!(entries.len(), 2);
        assert!(matches!(
            entries[1].body,
            EntryBody::Text { ref text } if text == "image too dark to enhance"
        ));
        assert!(!entries[1].is_placeholder());
    }

    #[tokio::test]
    async fn each_submission_appends_a_new_exchange() {
        let mut session = session_with(FixedBackend {
            response: Ok(enhance_ok()),
        });
        for name in ["a.jpg", "b.jpg"] {
            let source = SourceImage::new(name, "image/jpeg", b"x".to_vec());
            session
                .submit_photo(source, EnhanceOptions::default())
                .await
                .unwrap();
        }
        assert_eq!(session.transcript().entries().len(), 4);
    }

    #[test]
    fn empty_outcome_resolves_placeholder_with_error() {
        let mut session = session_with(FixedBackend {
            response: Ok(enhance_ok()),
        });
        let placeholder = session.transcript.push_placeholder(PROCESSING_LABEL);

        let outcome = pixel_core::ProcessingOutcome {
            images: Vec::new(),
            processing_time: 0.5,
            enhancements_applied: Vec::new(),
            processed_count: 0,
        };
        let err = session
            .record_outcome(placeholder, "photo.jpg", Ok(outcome))
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::FailureKind::InvalidResponse);
        assert!(matches!(
            session.transcript.entries()[0].body,
            EntryBody::Text { .. }
        ));
    }

    #[tokio::test]
    async fn enhance_again_records_derived_filename() {
        let mut session = session_with(FixedBackend {
            response: Ok(enhance_ok()),
        });
        let prior = ProcessedImage {
            filename: "photo.jpg".into(),
            payload: ImagePayload::Base64 {
                data: encode_bytes(b"previous"),
            },
        };
        let image = session
            .enhance_again(&prior, EnhanceOptions::default())
            .await
            .unwrap();
        assert_eq!(image.filename, "enhanced-photo.jpg");
    }
}
