//! Port definitions for the job backend
//!
//! The orchestrator only ever talks to the service through this trait,
//! so its state machine can be exercised against a scripted backend in
//! tests.

use async_trait::async_trait;
use bytes::Bytes;

use splatgen_core::models::{JobSnapshot, UploadedImage};

use crate::retry::ApiError;

/// The remote generation service, as seen by the orchestrator.
#[async_trait]
pub trait JobBackend: Send + Sync {
    /// Upload an image; returns its handle on success.
    async fn upload(&self, filename: &str, data: Vec<u8>) -> Result<UploadedImage, ApiError>;

    /// Start generation for an uploaded image; the returned snapshot
    /// may already be queued.
    async fn generate(&self, image_id: &str) -> Result<JobSnapshot, ApiError>;

    /// Fetch the current job snapshot.
    async fn status(&self, job_id: &str) -> Result<JobSnapshot, ApiError>;

    /// Download the finished artifact.
    async fn fetch_artifact(&self, artifact_url: &str) -> Result<Bytes, ApiError>;
}
