//! HTTP client for the generation service
//!
//! Every job endpoint goes through [`crate::retry::call_with_retry`]
//! with a per-endpoint policy. The health check is the one exception:
//! it reports what it sees on the first attempt so the caller can show
//! an accurate online/busy/offline verdict immediately.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart;
use serde::de::DeserializeOwned;

use splatgen_core::config::ClientConfig;
use splatgen_core::models::{
    HealthReport, JobSnapshot, MeshConvertRequest, MeshConvertResponse, UploadedImage,
};

use crate::ports::JobBackend;
use crate::retry::{call_with_retry, ApiError, RequestFailure, RetryPolicy};

/// Verdict from the health endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum HealthStatus {
    /// Service answered; the report body may be absent on older builds.
    Online(Option<HealthReport>),
    /// Service answered 429: alive but shedding load.
    RateLimited,
    Offline,
}

/// Client for the splat generation service.
#[derive(Debug, Clone)]
pub struct SplatApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl SplatApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.value))
            .build()
            .map_err(|e| {
                ApiError::from_failure(RequestFailure::network(e.to_string()), false)
            })?;
        Ok(Self {
            http,
            base_url: config.base_url.value.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve a path against the configured base. Absolute URLs (the
    /// service sometimes returns them for artifacts) pass through.
    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    /// One-shot health probe; never retried.
    pub async fn health(&self) -> HealthStatus {
        let response = match self.http.get(self.url("/api/health")).send().await {
            Ok(response) => response,
            Err(_) => return HealthStatus::Offline,
        };
        match response.status().as_u16() {
            429 => HealthStatus::RateLimited,
            code if (200..300).contains(&code) => {
                HealthStatus::Online(response.json::<HealthReport>().await.ok())
            }
            _ => HealthStatus::Offline,
        }
    }

    /// Ask the service to rebuild a finished splat as a triangle mesh.
    pub async fn convert_mesh(
        &self,
        request: &MeshConvertRequest,
    ) -> Result<MeshConvertResponse, ApiError> {
        let policy = RetryPolicy::conversion();
        call_with_retry(&policy, || {
            let pending = self
                .http
                .post(self.url("/api/mesh/convert"))
                .json(request);
            async move {
                let response = pending.send().await.map_err(transport_failure)?;
                decode_json(response).await
            }
        })
        .await
    }

    /// Download a converted mesh by its server-relative URL.
    pub async fn download_mesh(&self, download_url: &str) -> Result<Bytes, ApiError> {
        self.fetch_bytes(download_url, RetryPolicy::download()).await
    }

    async fn fetch_bytes(&self, path: &str, policy: RetryPolicy) -> Result<Bytes, ApiError> {
        let url = self.url(path);
        call_with_retry(&policy, || {
            let pending = self.http.get(&url);
            async move {
                let response = pending.send().await.map_err(transport_failure)?;
                let response = check_status(response).await?;
                response.bytes().await.map_err(transport_failure)
            }
        })
        .await
    }
}

#[async_trait]
impl JobBackend for SplatApiClient {
    async fn upload(&self, filename: &str, data: Vec<u8>) -> Result<UploadedImage, ApiError> {
        let policy = RetryPolicy::upload();
        // The form is consumed per request, so rebuild it each attempt.
        call_with_retry(&policy, || {
            let part = multipart::Part::bytes(data.clone()).file_name(filename.to_string());
            let form = multipart::Form::new().part("file", part);
            let pending = self.http.post(self.url("/api/upload")).multipart(form);
            async move {
                let response = pending.send().await.map_err(transport_failure)?;
                decode_json(response).await
            }
        })
        .await
    }

    async fn generate(&self, image_id: &str) -> Result<JobSnapshot, ApiError> {
        let policy = RetryPolicy::upload();
        let body = serde_json::json!({ "imageId": image_id });
        call_with_retry(&policy, || {
            let pending = self.http.post(self.url("/api/generate")).json(&body);
            async move {
                let response = pending.send().await.map_err(transport_failure)?;
                decode_json(response).await
            }
        })
        .await
    }

    async fn status(&self, job_id: &str) -> Result<JobSnapshot, ApiError> {
        let policy = RetryPolicy::poll();
        let url = self.url(&format!("/api/status/{}", job_id));
        call_with_retry(&policy, || {
            let pending = self.http.get(&url);
            async move {
                let response = pending.send().await.map_err(transport_failure)?;
                decode_json(response).await
            }
        })
        .await
    }

    async fn fetch_artifact(&self, artifact_url: &str) -> Result<Bytes, ApiError> {
        self.fetch_bytes(artifact_url, RetryPolicy::download()).await
    }
}

fn transport_failure(error: reqwest::Error) -> RequestFailure {
    RequestFailure::network(error.to_string())
}

/// Turn a non-2xx response into a failure, capturing the Retry-After
/// hint when the server sends one.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, RequestFailure> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    let message = response.text().await.unwrap_or_default();
    Err(RequestFailure {
        status: Some(status.as_u16()),
        message,
        retry_after,
    })
}

async fn decode_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, RequestFailure> {
    let response = check_status(response).await?;
    response.json::<T>().await.map_err(transport_failure)
}
