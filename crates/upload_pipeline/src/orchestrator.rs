//! Processing Orchestrator
//!
//! Drives a job from file acceptance to a terminal result: encode, optional
//! health probe, one backend request. Progress is published to registered
//! observers on a synthetic schedule while the request is in flight; the
//! terminal notification is always the last one per job.

use std::future::Future;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use backend_client::{
    BackendError, EnhanceRequest, ProcessingBackend, WatermarkParams, WatermarkRequest,
};
use job_state::{JobEvent, JobState, StateMachine};
use pixel_core::encoder::{decode_payload, strip_data_url};
use pixel_core::{
    EncodedImage, Encoder, EnhanceOptions, ImagePayload, JobConfig, PipelineConfig,
    ProcessedImage, ProcessingOutcome, SourceImage, UploadJob,
};
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::PipelineError;
use crate::progress::ProgressSchedule;
use crate::tracking::{EnhancementRecord, UsageReporter, WatermarkRecord};
use crate::updates::JobUpdate;

pub struct Orchestrator<B: ProcessingBackend> {
    backend: Arc<B>,
    encoder: Encoder,
    schedule: ProgressSchedule,
    skip_health_check: bool,
    reporter: Option<UsageReporter>,
    observers: StdMutex<Vec<mpsc::UnboundedSender<JobUpdate>>>,
}

impl<B: ProcessingBackend> Orchestrator<B> {
    pub fn new(backend: B, config: &PipelineConfig) -> Self {
        Self {
            backend: Arc::new(backend),
            encoder: Encoder::new(),
            schedule: ProgressSchedule::default(),
            skip_health_check: config.skip_health_check,
            reporter: config.tracking_url.as_deref().map(UsageReporter::new),
            observers: StdMutex::new(Vec::new()),
        }
    }

    pub fn with_schedule(mut self, schedule: ProgressSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Register an observer. Observers whose receiver is dropped are pruned
    /// on the next notification.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<JobUpdate> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.observers.lock().expect("observer lock").push(tx);
        rx
    }

    fn notify(&self, update: JobUpdate) {
        let mut observers = self.observers.lock().expect("observer lock");
        observers.retain(|tx| tx.send(update.clone()).is_ok());
    }

    /// Drive a job to its terminal state.
    ///
    /// Exactly one of the following holds afterwards: the returned value is
    /// `Ok` and observers saw `Progress(100)` then `Completed`, or it is
    /// `Err` and observers saw `Failed` with the matching kind. There is no
    /// cancellation and no automatic retry; resubmission is a new job.
    pub async fn submit(
        &self,
        job: &UploadJob,
        user_id: &str,
    ) -> Result<ProcessingOutcome, PipelineError> {
        let job_id = job.id;
        let mut machine = StateMachine::new();
        machine.handle_event(JobEvent::FileAccepted);

        let result = self.run(job, user_id, &mut machine).await;

        match &result {
            Ok(outcome) => {
                machine.handle_event(JobEvent::ServiceSucceeded);
                info!(
                    "job {job_id} completed in {:.2}s ({} image(s))",
                    outcome.processing_time, outcome.processed_count
                );
                self.notify(JobUpdate::Progress {
                    job_id,
                    percent: 100,
                });
                self.notify(JobUpdate::Completed {
                    job_id,
                    outcome: outcome.clone(),
                });
            }
            Err(err) => {
                let message = err.user_message();
                // Failures during encoding never touched the network and
                // take the encode path through the FSM.
                let event = if machine.state() == &JobState::Encoding {
                    JobEvent::EncodeFailed {
                        error: message.clone(),
                    }
                } else {
                    JobEvent::ServiceFailed {
                        error: message.clone(),
                    }
                };
                machine.handle_event(event);
                info!("job {job_id} failed: {message}");
                self.notify(JobUpdate::Failed {
                    job_id,
                    kind: err.kind(),
                    message,
                });
            }
        }
        debug_assert!(machine.state().is_terminal());

        self.report_usage(job, user_id, &result);
        result
    }

    /// Create a follow-up job whose source is a prior result image
    /// ("enhance again"). Only inline base64 results can be resubmitted.
    pub async fn enhance_again(
        &self,
        image: &ProcessedImage,
        options: EnhanceOptions,
        user_id: &str,
    ) -> Result<ProcessingOutcome, PipelineError> {
        let source = Self::source_from_result(image)?;
        let job = UploadJob::enhance(source, options);
        self.submit(&job, user_id).await
    }

    pub fn source_from_result(image: &ProcessedImage) -> Result<SourceImage, PipelineError> {
        match &image.payload {
            ImagePayload::Base64 { data } => {
                let bytes = decode_payload(data)?;
                // The backend always re-encodes results as JPEG.
                Ok(SourceImage::new(
                    format!("enhanced-{}", image.filename),
                    "image/jpeg",
                    bytes,
                ))
            }
            ImagePayload::Url { .. } => Err(PipelineError::InputInvalid(
                pixel_core::EncodeError::ReadFailure(
                    "result image is a remote URL; only inline results can be re-enhanced".into(),
                ),
            )),
        }
    }

    async fn run(
        &self,
        job: &UploadJob,
        user_id: &str,
        machine: &mut StateMachine,
    ) -> Result<ProcessingOutcome, PipelineError> {
        let job_id = job.id;
        if job.sources.is_empty() {
            return Err(PipelineError::MissingSource);
        }

        // Encode; enhancement takes the first file, watermarking the batch.
        let encoded = match &job.config {
            JobConfig::Enhance(_) => vec![self.encoder.encode(&job.sources[0])?],
            JobConfig::Watermark(_) => self.encoder.encode_batch(&job.sources)?,
        };
        machine.handle_event(JobEvent::EncodeFinished);
        debug!("job {job_id}: encoded {} image(s)", encoded.len());

        if !self.skip_health_check {
            self.backend.health().await?;
        }

        machine.handle_event(JobEvent::RequestDispatched);
        self.notify(JobUpdate::Progress { job_id, percent: 0 });

        match &job.config {
            JobConfig::Enhance(opts) => {
                let request = EnhanceRequest {
                    user_id: user_id.to_string(),
                    enhancement_type: opts.enhancement_type.clone(),
                    return_format: opts.return_format.clone(),
                    image_base64: encoded[0].payload.clone(),
                };
                let response = self
                    .await_with_progress(self.backend.enhance(&request), machine, job_id)
                    .await?;
                Self::reconcile_enhancement(&encoded[0], response)
            }
            JobConfig::Watermark(opts) => {
                let request = WatermarkRequest {
                    user_id: user_id.to_string(),
                    image_base64_list: encoded.iter().map(|e| e.payload.clone()).collect(),
                    watermark_config: WatermarkParams::from(opts),
                    return_format: "base64".to_string(),
                };
                let response = self
                    .await_with_progress(self.backend.watermark(&request), machine, job_id)
                    .await?;
                Self::reconcile_watermarks(&encoded, response)
            }
        }
    }

    /// Await the backend call, publishing the synthetic schedule while it is
    /// pending. Ticks stop the moment the request resolves, so the terminal
    /// notification is always last.
    async fn await_with_progress<T>(
        &self,
        fut: impl Future<Output = Result<T, BackendError>>,
        machine: &mut StateMachine,
        job_id: Uuid,
    ) -> Result<T, BackendError> {
        tokio::pin!(fut);
        let steps = self.schedule.steps().to_vec();
        let mut next = 0usize;
        loop {
            if next >= steps.len() {
                return fut.await;
            }
            tokio::select! {
                result = &mut fut => return result,
                _ = tokio::time::sleep(self.schedule.interval()) => {
                    let transition = machine.handle_event(JobEvent::ProgressTicked {
                        percent: steps[next],
                    });
                    next += 1;
                    if transition.changed {
                        self.notify(JobUpdate::Progress {
                            job_id,
                            percent: machine.state().progress_percent(),
                        });
                    }
                }
            }
        }
    }

    fn reconcile_enhancement(
        encoded: &EncodedImage,
        response: backend_client::EnhanceResponse,
    ) -> Result<ProcessingOutcome, PipelineError> {
        let payload = if let Some(data) = response.enhanced_base64 {
            ImagePayload::Base64 {
                data: strip_data_url(&data).to_string(),
            }
        } else if let Some(url) = response.enhanced_url {
            ImagePayload::Url { url }
        } else {
            return Err(BackendError::InvalidResponse(
                "success response carried no enhanced image".into(),
            )
            .into());
        };
        Ok(ProcessingOutcome {
            images: vec![ProcessedImage {
                filename: encoded.filename.clone(),
                payload,
            }],
            processing_time: response.processing_time,
            enhancements_applied: response.enhancements_applied,
            processed_count: 1,
        })
    }

    /// Zip batch results back against the submitted filenames by position.
    /// A length mismatch would silently mispair results, so it fails the
    /// whole batch instead.
    fn reconcile_watermarks(
        encoded: &[EncodedImage],
        response: backend_client::WatermarkResponse,
    ) -> Result<ProcessingOutcome, PipelineError> {
        let results: Vec<ImagePayload> = if !response.watermarked_base64.is_empty() {
            response
                .watermarked_base64
                .iter()
                .map(|data| ImagePayload::Base64 {
                    data: strip_data_url(data).to_string(),
                })
                .collect()
        } else {
            response
                .watermarked_urls
                .iter()
                .map(|url| ImagePayload::Url { url: url.clone() })
                .collect()
        };

        if results.len() != encoded.len() {
            return Err(PipelineError::ResultMismatch {
                expected: encoded.len(),
                actual: results.len(),
            });
        }

        let images = encoded
            .iter()
            .zip(results)
            .map(|(e, payload)| ProcessedImage {
                filename: e.filename.clone(),
                payload,
            })
            .collect();

        Ok(ProcessingOutcome {
            images,
            processing_time: response.processing_time,
            enhancements_applied: Vec::new(),
            processed_count: response.processed_count,
        })
    }

    fn report_usage(
        &self,
        job: &UploadJob,
        user_id: &str,
        result: &Result<ProcessingOutcome, PipelineError>,
    ) {
        let Some(reporter) = &self.reporter else {
            return;
        };
        let first = job.sources.first();
        let processing_time = result.as_ref().map(|o| o.processing_time).unwrap_or(0.0);
        match &job.config {
            JobConfig::Enhance(opts) => {
                reporter.report_enhancement(EnhancementRecord {
                    user_id: user_id.to_string(),
                    filename: first.map(|s| s.filename.clone()),
                    file_size: first.map(|s| s.byte_len() as u64),
                    processing_time,
                    enhancement_type: opts.enhancement_type.clone(),
                    success: result.is_ok(),
                });
            }
            JobConfig::Watermark(opts) => {
                reporter.report_watermark(WatermarkRecord {
                    user_id: user_id.to_string(),
                    filename: first.map(|s| s.filename.clone()),
                    file_size: first.map(|s| s.byte_len() as u64),
                    processing_time,
                    watermark_text: Some(opts.text.clone()),
                    watermark_style: Some(opts.style.clone()),
                    watermark_position: Some(opts.position.clone()),
                    photo_count: job.sources.len(),
                    success: result.is_ok(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted backend for exercising the orchestrator without HTTP.
    #[derive(Default)]
    struct ScriptedBackend {
        healthy: bool,
        enhance_calls: AtomicUsize,
        watermark_calls: AtomicUsize,
        enhance_response: Option<backend_client::EnhanceResponse>,
        watermark_response: Option<backend_client::WatermarkResponse>,
    }

    #[async_trait]
    impl ProcessingBackend for ScriptedBackend {
        async fn health(&self) -> Result<(), BackendError> {
            if self.healthy {
                Ok(())
            } else {
                Err(BackendError::ServiceUnavailable {
                    reason: "connection refused".into(),
                })
            }
        }

        async fn enhance(
            &self,
            _request: &EnhanceRequest,
        ) -> Result<backend_client::EnhanceResponse, BackendError> {
            self.enhance_calls.fetch_add(1, Ordering::SeqCst);
            self.enhance_response
                .clone()
                .ok_or(BackendError::ProcessingRejected {
                    message: "not scripted".into(),
                })
        }

        async fn watermark(
            &self,
            _request: &WatermarkRequest,
        ) -> Result<backend_client::WatermarkResponse, BackendError> {
            self.watermark_calls.fetch_add(1, Ordering::SeqCst);
            self.watermark_response
                .clone()
                .ok_or(BackendError::ProcessingRejected {
                    message: "not scripted".into(),
                })
        }
    }

    fn test_config() -> PipelineConfig {
        PipelineConfig {
            backend_url: "http://unused".into(),
            timeout_secs: 1,
            tracking_url: None,
            skip_health_check: false,
        }
    }

    fn jpeg(name: &str, bytes: &[u8]) -> SourceImage {
        SourceImage::new(name, "image/jpeg", bytes.to_vec())
    }

    fn scripted_enhance_ok() -> backend_client::EnhanceResponse {
        backend_client::EnhanceResponse {
            success: true,
            enhanced_base64: Some(pixel_core::encoder::encode_bytes(b"enhanced")),
            enhanced_url: None,
            processing_time: 1.23,
            enhancements_applied: vec!["sharpness".into(), "color_balance".into()],
            original_filename: None,
            error: None,
        }
    }

    #[tokio::test]
    async fn unsupported_type_fails_without_backend_call() {
        let backend = ScriptedBackend {
            healthy: true,
            ..Default::default()
        };
        let orchestrator = Orchestrator::new(backend, &test_config())
            .with_schedule(ProgressSchedule::silent());
        let mut updates = orchestrator.subscribe();

        let job = UploadJob::enhance(
            SourceImage::new("doc.pdf", "application/pdf", vec![0; 8]),
            EnhanceOptions::default(),
        );
        let err = orchestrator.submit(&job, "anonymous").await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::InputInvalid);
        assert_eq!(
            orchestrator.backend.enhance_calls.load(Ordering::SeqCst),
            0
        );

        let update = updates.recv().await.unwrap();
        assert!(matches!(
            update,
            JobUpdate::Failed {
                kind: FailureKind::InputInvalid,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn unhealthy_backend_blocks_submission() {
        let backend = ScriptedBackend {
            healthy: false,
            enhance_response: Some(scripted_enhance_ok()),
            ..Default::default()
        };
        let orchestrator = Orchestrator::new(backend, &test_config())
            .with_schedule(ProgressSchedule::silent());

        let job = UploadJob::enhance(jpeg("photo.jpg", b"bytes"), EnhanceOptions::default());
        let err = orchestrator.submit(&job, "anonymous").await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::ServiceUnavailable);
        // The enhance endpoint was never reached.
        assert_eq!(
            orchestrator.backend.enhance_calls.load(Ordering::SeqCst),
            0
        );
    }

    #[tokio::test]
    async fn happy_path_publishes_monotone_progress_ending_at_100() {
        let backend = ScriptedBackend {
            healthy: true,
            enhance_response: Some(scripted_enhance_ok()),
            ..Default::default()
        };
        let orchestrator = Orchestrator::new(backend, &test_config())
            .with_schedule(ProgressSchedule::immediate());
        let mut updates = orchestrator.subscribe();

        let job = UploadJob::enhance(jpeg("photo.jpg", b"bytes"), EnhanceOptions::default());
        let outcome = orchestrator.submit(&job, "user-1").await.unwrap();
        assert!((outcome.processing_time - 1.23).abs() < 1e-9);
        assert_eq!(outcome.enhancements_applied.len(), 2);

        let mut percents = Vec::new();
        let mut terminal = None;
        while let Ok(update) = updates.try_recv() {
            match update {
                JobUpdate::Progress { percent, .. } => percents.push(percent),
                other => terminal = Some(other),
            }
        }
        assert!(percents.windows(2).all(|w| w[0] <= w[1]), "{percents:?}");
        assert_eq!(percents.last(), Some(&100));
        assert!(matches!(terminal, Some(JobUpdate::Completed { .. })));
    }

    #[tokio::test]
    async fn failed_job_never_reaches_100() {
        let backend = ScriptedBackend {
            healthy: true,
            enhance_response: None, // scripted rejection
            ..Default::default()
        };
        let orchestrator = Orchestrator::new(backend, &test_config())
            .with_schedule(ProgressSchedule::silent());
        let mut updates = orchestrator.subscribe();

        let job = UploadJob::enhance(jpeg("photo.jpg", b"bytes"), EnhanceOptions::default());
        assert!(orchestrator.submit(&job, "anonymous").await.is_err());

        let mut saw_100 = false;
        let mut last = None;
        while let Ok(update) = updates.try_recv() {
            if let JobUpdate::Progress { percent, .. } = &update {
                saw_100 |= *percent == 100;
            }
            last = Some(update);
        }
        assert!(!saw_100);
        assert!(matches!(last, Some(JobUpdate::Failed { .. })));
    }

    #[tokio::test]
    async fn batch_results_zip_by_position() {
        let backend = ScriptedBackend {
            healthy: true,
            watermark_response: Some(backend_client::WatermarkResponse {
                success: true,
                watermarked_base64: vec!["YQ==".into(), "Yg==".into(), "Yw==".into()],
                watermarked_urls: Vec::new(),
                processing_time: 3.6,
                processed_count: 3,
                error: None,
            }),
            ..Default::default()
        };
        let orchestrator = Orchestrator::new(backend, &test_config())
            .with_schedule(ProgressSchedule::silent());

        let job = UploadJob::watermark(
            vec![jpeg("a.jpg", b"1"), jpeg("b.jpg", b"2"), jpeg("c.jpg", b"3")],
            Default::default(),
        );
        let outcome = orchestrator.submit(&job, "anonymous").await.unwrap();
        let names: Vec<_> = outcome.images.iter().map(|i| i.filename.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg", "c.jpg"]);
        assert_eq!(
            outcome.images[1].payload,
            ImagePayload::Base64 { data: "Yg==".into() }
        );
        assert_eq!(outcome.processed_count, 3);
    }

    #[tokio::test]
    async fn short_batch_response_fails_instead_of_mispairing() {
        let backend = ScriptedBackend {
            healthy: true,
            watermark_response: Some(backend_client::WatermarkResponse {
                success: true,
                watermarked_base64: vec!["YQ==".into(), "Yg==".into()],
                watermarked_urls: Vec::new(),
                processing_time: 2.4,
                processed_count: 2,
                error: None,
            }),
            ..Default::default()
        };
        let orchestrator = Orchestrator::new(backend, &test_config())
            .with_schedule(ProgressSchedule::silent());

        let job = UploadJob::watermark(
            vec![jpeg("a.jpg", b"1"), jpeg("b.jpg", b"2"), jpeg("c.jpg", b"3")],
            Default::default(),
        );
        let err = orchestrator.submit(&job, "anonymous").await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ResultMismatch {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[tokio::test]
    async fn oversized_batch_is_rejected_before_submit() {
        let backend = ScriptedBackend {
            healthy: true,
            ..Default::default()
        };
        let orchestrator = Orchestrator::new(backend, &test_config())
            .with_schedule(ProgressSchedule::silent());

        let sources: Vec<_> = (0..4).map(|i| jpeg(&format!("{i}.jpg"), b"x")).collect();
        let job = UploadJob::watermark(sources, Default::default());
        let err = orchestrator.submit(&job, "anonymous").await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::InputInvalid);
        assert_eq!(
            orchestrator.backend.watermark_calls.load(Ordering::SeqCst),
            0
        );
    }

    #[tokio::test]
    async fn enhance_again_builds_job_from_prior_result() {
        let backend = ScriptedBackend {
            healthy: true,
            enhance_response: Some(scripted_enhance_ok()),
            ..Default::default()
        };
        let orchestrator = Orchestrator::new(backend, &test_config())
            .with_schedule(ProgressSchedule::silent());

        let prior = ProcessedImage {
            filename: "photo.jpg".into(),
            payload: ImagePayload::Base64 {
                data: pixel_core::encoder::encode_bytes(b"previous result"),
            },
        };
        let outcome = orchestrator
            .enhance_again(&prior, EnhanceOptions::default(), "user-1")
            .await
            .unwrap();
        assert_eq!(outcome.images[0].filename, "enhanced-photo.jpg");
        assert_eq!(
            orchestrator.backend.enhance_calls.load(Ordering::SeqCst),
            1
        );
    }

    #[tokio::test]
    async fn url_results_cannot_be_re_enhanced() {
        let prior = ProcessedImage {
            filename: "photo.jpg".into(),
            payload: ImagePayload::Url {
                url: "https://cdn.example/photo.jpg".into(),
            },
        };
        let err = Orchestrator::<ScriptedBackend>::source_from_result(&prior).unwrap_err();
        assert_eq!(err.kind(), FailureKind::InputInvalid);
    }
}
