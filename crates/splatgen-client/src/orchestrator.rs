//! Polling job orchestrator
//!
//! Drives one generation job through its lifecycle: upload, generate,
//! poll until terminal, fetch the artifact. The session is an explicit
//! state machine; every poll replaces the stored snapshot wholesale,
//! and once a terminal snapshot lands the session latches: later
//! snapshots and further polling are ignored until `reset`.

use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use splatgen_core::models::{JobSnapshot, JobStatus, UploadedImage};

use crate::ports::JobBackend;
use crate::retry::ApiError;

/// Where the session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Uploading,
    Queued,
    Processing,
    Complete,
    Error,
}

impl SessionPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Complete | SessionPhase::Error)
    }
}

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("no image has been uploaded yet")]
    NoImage,
    #[error("no job is in flight")]
    NoJob,
    #[error("the finished job did not include an artifact URL")]
    MissingArtifact,
    #[error("polling was cancelled")]
    Cancelled,
}

/// One image-to-splat job, start to finish.
pub struct JobSession<B: JobBackend> {
    backend: B,
    poll_interval: Duration,
    image: Option<UploadedImage>,
    job: Option<JobSnapshot>,
    phase: SessionPhase,
    last_error: Option<String>,
}

impl<B: JobBackend> JobSession<B> {
    pub fn new(backend: B, poll_interval: Duration) -> Self {
        Self {
            backend,
            poll_interval,
            image: None,
            job: None,
            phase: SessionPhase::Idle,
            last_error: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn image(&self) -> Option<&UploadedImage> {
        self.image.as_ref()
    }

    pub fn job(&self) -> Option<&JobSnapshot> {
        self.job.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Upload an image and remember its handle. On failure the session
    /// returns to Idle with the error surfaced, ready for another try;
    /// Error is reserved for a job that ended badly.
    pub async fn upload(&mut self, filename: &str, data: Vec<u8>) -> Result<&UploadedImage, OrchestratorError> {
        self.phase = SessionPhase::Uploading;
        match self.backend.upload(filename, data).await {
            Ok(image) => {
                tracing::info!(image_id = %image.image_id, "image uploaded");
                self.image = Some(image);
                self.phase = SessionPhase::Idle;
                self.image.as_ref().ok_or(OrchestratorError::NoImage)
            }
            Err(err) => {
                self.last_error = Some(err.to_string());
                self.phase = SessionPhase::Idle;
                Err(err.into())
            }
        }
    }

    /// Kick off generation for the uploaded image.
    pub async fn generate(&mut self) -> Result<&JobSnapshot, OrchestratorError> {
        let image_id = self
            .image
            .as_ref()
            .map(|i| i.image_id.clone())
            .ok_or(OrchestratorError::NoImage)?;
        match self.backend.generate(&image_id).await {
            Ok(snapshot) => {
                tracing::info!(job_id = %snapshot.job_id, "generation started");
                self.apply_snapshot(snapshot);
                self.job.as_ref().ok_or(OrchestratorError::NoJob)
            }
            Err(err) => {
                self.last_error = Some(err.to_string());
                self.phase = SessionPhase::Idle;
                Err(err.into())
            }
        }
    }

    /// Replace the stored snapshot and derive the phase from it.
    ///
    /// Returns false when the session has already latched terminal;
    /// the snapshot is dropped in that case.
    pub fn apply_snapshot(&mut self, snapshot: JobSnapshot) -> bool {
        if self.phase.is_terminal() {
            tracing::debug!(job_id = %snapshot.job_id, "dropping snapshot after terminal state");
            return false;
        }
        self.phase = match snapshot.status {
            JobStatus::Complete => SessionPhase::Complete,
            JobStatus::Error => {
                self.last_error = Some(
                    snapshot
                        .error
                        .clone()
                        .unwrap_or_else(|| "generation failed".to_string()),
                );
                SessionPhase::Error
            }
            _ if snapshot.is_queued() => SessionPhase::Queued,
            _ => SessionPhase::Processing,
        };
        self.job = Some(snapshot);
        true
    }

    /// Poll the job until it reaches a terminal state. `on_update` runs
    /// after every accepted snapshot, terminal included.
    pub async fn poll_until_terminal<F>(
        &mut self,
        cancel: &CancellationToken,
        mut on_update: F,
    ) -> Result<JobSnapshot, OrchestratorError>
    where
        F: FnMut(&JobSnapshot),
    {
        let job_id = self
            .job
            .as_ref()
            .map(|j| j.job_id.clone())
            .ok_or(OrchestratorError::NoJob)?;

        while !self.phase.is_terminal() {
            tokio::select! {
                _ = cancel.cancelled() => return Err(OrchestratorError::Cancelled),
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
            // The in-flight request races the token too: a response that
            // lands after cancellation is dropped, never applied.
            let polled = tokio::select! {
                _ = cancel.cancelled() => return Err(OrchestratorError::Cancelled),
                polled = self.backend.status(&job_id) => polled,
            };
            match polled {
                Ok(snapshot) => {
                    if self.apply_snapshot(snapshot.clone()) {
                        on_update(&snapshot);
                    }
                }
                Err(err) => {
                    // The transport already retried; a failure here is final.
                    self.fail(err.to_string());
                    return Err(err.into());
                }
            }
        }
        self.job.clone().ok_or(OrchestratorError::NoJob)
    }

    /// Download the finished artifact bytes.
    pub async fn fetch_artifact(&self) -> Result<Bytes, OrchestratorError> {
        let job = self.job.as_ref().ok_or(OrchestratorError::NoJob)?;
        if self.phase != SessionPhase::Complete {
            return Err(OrchestratorError::NoJob);
        }
        let url = job
            .artifact_url
            .as_deref()
            .ok_or(OrchestratorError::MissingArtifact)?;
        Ok(self.backend.fetch_artifact(url).await?)
    }

    /// Drop all local job state. Never touches the service; a remote
    /// job keeps running if one was in flight.
    pub fn reset(&mut self) {
        self.image = None;
        self.job = None;
        self.phase = SessionPhase::Idle;
        self.last_error = None;
    }

    fn fail(&mut self, message: String) {
        self.last_error = Some(message);
        self.phase = SessionPhase::Error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use splatgen_core::models::JobStatus;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    fn snapshot(status: JobStatus) -> JobSnapshot {
        JobSnapshot {
            job_id: "job-1".to_string(),
            image_id: Some("img-1".to_string()),
            status,
            status_detail: None,
            progress: None,
            queue_position: None,
            estimated_wait_seconds: None,
            artifact_url: None,
            processing_time_ms: None,
            error: None,
        }
    }

    fn not_found() -> ApiError {
        ApiError {
            status: 404,
            user_message: "The requested resource was not found.".to_string(),
            retryable: false,
            retry_after_seconds: None,
        }
    }

    /// Scripted backend: status() pops pre-loaded results in order.
    struct MockBackend {
        statuses: Mutex<VecDeque<Result<JobSnapshot, ApiError>>>,
        status_calls: AtomicU32,
        initial: JobSnapshot,
        fail_upload: bool,
        /// Simulated round-trip time for each status call.
        status_delay: Duration,
    }

    impl MockBackend {
        fn new(initial: JobSnapshot, statuses: Vec<Result<JobSnapshot, ApiError>>) -> Self {
            Self {
                statuses: Mutex::new(statuses.into()),
                status_calls: AtomicU32::new(0),
                initial,
                fail_upload: false,
                status_delay: Duration::ZERO,
            }
        }
    }

    #[async_trait]
    impl JobBackend for MockBackend {
        async fn upload(&self, filename: &str, data: Vec<u8>) -> Result<UploadedImage, ApiError> {
            if self.fail_upload {
                return Err(not_found());
            }
            Ok(UploadedImage {
                image_id: "img-1".to_string(),
                filename: filename.to_string(),
                width: 640,
                height: 480,
                size: data.len() as u64,
            })
        }

        async fn generate(&self, _image_id: &str) -> Result<JobSnapshot, ApiError> {
            Ok(self.initial.clone())
        }

        async fn status(&self, _job_id: &str) -> Result<JobSnapshot, ApiError> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            if self.status_delay > Duration::ZERO {
                tokio::time::sleep(self.status_delay).await;
            }
            self.statuses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(not_found()))
        }

        async fn fetch_artifact(&self, _artifact_url: &str) -> Result<Bytes, ApiError> {
            Ok(Bytes::from_static(b"ply\n"))
        }
    }

    async fn session_with(
        statuses: Vec<Result<JobSnapshot, ApiError>>,
    ) -> JobSession<MockBackend> {
        let mut initial = snapshot(JobStatus::Queued);
        initial.queue_position = Some(2);
        let backend = MockBackend::new(initial, statuses);
        let mut session = JobSession::new(backend, Duration::from_millis(100));
        session.upload("room.jpg", vec![1, 2, 3]).await.unwrap();
        session.generate().await.unwrap();
        session
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_walks_queued_processing_complete() {
        let mut complete = snapshot(JobStatus::Complete);
        complete.artifact_url = Some("/api/download/job-1/splat.ply".to_string());
        let mut session = session_with(vec![
            Ok(snapshot(JobStatus::Processing)),
            Ok(complete),
        ])
        .await;
        assert_eq!(session.phase(), SessionPhase::Queued);

        let mut seen = Vec::new();
        let cancel = CancellationToken::new();
        let last = session
            .poll_until_terminal(&cancel, |snap| seen.push(snap.status))
            .await
            .unwrap();

        assert_eq!(session.phase(), SessionPhase::Complete);
        assert_eq!(seen, vec![JobStatus::Processing, JobStatus::Complete]);
        assert_eq!(last.artifact_url.as_deref(), Some("/api/download/job-1/splat.ply"));
        assert_eq!(session.backend.status_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_stops_at_terminal_snapshot() {
        let mut session = session_with(vec![Ok(snapshot(JobStatus::Complete))]).await;
        let cancel = CancellationToken::new();
        session.poll_until_terminal(&cancel, |_| {}).await.unwrap();

        // One poll was enough; the loop must not have kept going into
        // the backend's fallback error.
        assert_eq!(session.backend.status_calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.phase(), SessionPhase::Complete);
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_latch_drops_late_snapshots() {
        let mut session = session_with(vec![Ok(snapshot(JobStatus::Complete))]).await;
        let cancel = CancellationToken::new();
        session.poll_until_terminal(&cancel, |_| {}).await.unwrap();

        let accepted = session.apply_snapshot(snapshot(JobStatus::Processing));
        assert!(!accepted);
        assert_eq!(session.phase(), SessionPhase::Complete);
        assert_eq!(session.job().unwrap().status, JobStatus::Complete);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_snapshot_is_terminal_with_detail() {
        let mut failed = snapshot(JobStatus::Error);
        failed.error = Some("CUDA out of memory".to_string());
        let mut session = session_with(vec![Ok(failed)]).await;
        let cancel = CancellationToken::new();
        let last = session.poll_until_terminal(&cancel, |_| {}).await.unwrap();

        assert_eq!(session.phase(), SessionPhase::Error);
        assert_eq!(last.status, JobStatus::Error);
        assert_eq!(session.last_error(), Some("CUDA out of memory"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_failure_enters_error_phase() {
        let mut session = session_with(vec![Err(not_found())]).await;
        let cancel = CancellationToken::new();
        let err = session.poll_until_terminal(&cancel, |_| {}).await.unwrap_err();

        assert!(matches!(err, OrchestratorError::Api(_)));
        assert_eq!(session.phase(), SessionPhase::Error);
        assert!(session.last_error().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_polling() {
        let mut session = session_with(vec![Ok(snapshot(JobStatus::Processing))]).await;
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = session.poll_until_terminal(&cancel, |_| {}).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::Cancelled));
        // Cancellation is not a failure; the session keeps its state.
        assert_eq!(session.phase(), SessionPhase::Queued);
        assert_eq!(session.backend.status_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_drops_in_flight_response() {
        let mut initial = snapshot(JobStatus::Queued);
        initial.queue_position = Some(2);
        let mut backend = MockBackend::new(initial, vec![Ok(snapshot(JobStatus::Processing))]);
        // The response is still in flight when the token fires.
        backend.status_delay = Duration::from_millis(1000);
        let mut session = JobSession::new(backend, Duration::from_millis(100));
        session.upload("room.jpg", vec![1, 2, 3]).await.unwrap();
        session.generate().await.unwrap();

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            trigger.cancel();
        });

        let err = session.poll_until_terminal(&cancel, |_| {}).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::Cancelled));
        // The status call went out but its response was never applied.
        assert_eq!(session.backend.status_calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.phase(), SessionPhase::Queued);
        assert_eq!(session.job().unwrap().status, JobStatus::Queued);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_artifact_requires_completion() {
        let session = session_with(vec![]).await;
        let err = session.fetch_artifact().await.unwrap_err();
        assert!(matches!(err, OrchestratorError::NoJob));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_artifact_after_completion() {
        let mut complete = snapshot(JobStatus::Complete);
        complete.artifact_url = Some("/api/download/job-1/splat.ply".to_string());
        let mut session = session_with(vec![Ok(complete)]).await;
        let cancel = CancellationToken::new();
        session.poll_until_terminal(&cancel, |_| {}).await.unwrap();

        let bytes = session.fetch_artifact().await.unwrap();
        assert_eq!(&bytes[..], b"ply\n");
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_is_local_only() {
        let mut session = session_with(vec![Ok(snapshot(JobStatus::Complete))]).await;
        let cancel = CancellationToken::new();
        session.poll_until_terminal(&cancel, |_| {}).await.unwrap();
        let calls_before = session.backend.status_calls.load(Ordering::SeqCst);

        session.reset();

        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.job().is_none());
        assert!(session.image().is_none());
        assert!(session.last_error().is_none());
        assert_eq!(session.backend.status_calls.load(Ordering::SeqCst), calls_before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_upload_failure_returns_to_idle() {
        let mut backend = MockBackend::new(snapshot(JobStatus::Queued), vec![]);
        backend.fail_upload = true;
        let mut session = JobSession::new(backend, Duration::from_millis(100));

        let err = session.upload("room.jpg", vec![1]).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::Api(_)));
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.last_error().is_some());
        assert!(session.image().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_requires_upload() {
        let backend = MockBackend::new(snapshot(JobStatus::Queued), vec![]);
        let mut session = JobSession::new(backend, Duration::from_millis(100));
        let err = session.generate().await.unwrap_err();
        assert!(matches!(err, OrchestratorError::NoImage));
    }
}
