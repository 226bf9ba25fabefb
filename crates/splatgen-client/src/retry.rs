//! Classified-retry transport
//!
//! Wraps any remote call in an exponential-backoff retry loop. Each
//! attempt's failure is classified against the policy's retryable
//! status set; once retries are exhausted (or the failure is not
//! retryable) the caller receives an [`ApiError`] carrying a canned
//! user-facing message, so UI layers never need their own status-code
//! logic.

use std::time::Duration;

use thiserror::Error;

/// Status codes worth retrying: rate limits, transient server errors,
/// cold starts, and gateway timeouts.
pub const DEFAULT_RETRYABLE: &[u16] = &[429, 500, 503, 504];

/// Pseudo-status for transport-level failures (connection refused,
/// DNS, timed out before any response).
pub const STATUS_NO_CONNECTION: u16 = 0;

/// Retry configuration for one call site.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub retryable: &'static [u16],
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self { max_retries, base_delay, retryable: DEFAULT_RETRYABLE }
    }

    /// Image upload: generous, the first call a user ever makes.
    pub fn upload() -> Self {
        Self::new(3, Duration::from_secs(5))
    }

    /// Status poll: the orchestrator re-polls anyway, keep it short.
    pub fn poll() -> Self {
        Self::new(2, Duration::from_secs(3))
    }

    /// Artifact download.
    pub fn download() -> Self {
        Self::new(2, Duration::from_secs(3))
    }

    /// Remote mesh conversion: slow endpoint, back off harder.
    pub fn conversion() -> Self {
        Self::new(2, Duration::from_secs(10))
    }

    fn is_retryable(&self, status: Option<u16>) -> bool {
        match status {
            // No response at all: network-level failure, retryable.
            None => true,
            Some(code) => self.retryable.contains(&code),
        }
    }

    /// Pure exponential backoff: base * 2^attempt. The server's
    /// retry-after hint is advisory display data and never feeds in.
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

/// Outcome of a single attempt, before classification.
#[derive(Debug, Clone)]
pub struct RequestFailure {
    /// HTTP status, or None when no response arrived.
    pub status: Option<u16>,
    pub message: String,
    /// Server-provided Retry-After hint, seconds.
    pub retry_after: Option<u64>,
}

impl RequestFailure {
    pub fn network(message: impl Into<String>) -> Self {
        Self { status: None, message: message.into(), retry_after: None }
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self { status: Some(status), message: message.into(), retry_after: None }
    }
}

/// Classified error raised once the retry policy gives up.
#[derive(Debug, Clone, Error)]
#[error("{user_message}")]
pub struct ApiError {
    pub status: u16,
    pub user_message: String,
    pub retryable: bool,
    /// Advisory wait hint for display; not used to schedule retries.
    pub retry_after_seconds: Option<u64>,
}

impl ApiError {
    pub fn from_failure(failure: RequestFailure, retryable: bool) -> Self {
        let status = failure.status.unwrap_or(STATUS_NO_CONNECTION);
        Self {
            status,
            user_message: user_message(status),
            retryable,
            retry_after_seconds: failure.retry_after.or_else(|| default_retry_after(status)),
        }
    }
}

/// Fixed status → user message table.
pub fn user_message(status: u16) -> String {
    match status {
        429 => "The service is busy right now. Please wait 30-60 seconds and try again.".to_string(),
        503 => "The service is starting up (cold start). Please wait 1-2 minutes.".to_string(),
        504 => "The request timed out. The queue may be large; try again shortly.".to_string(),
        500 => "The service hit an internal error. Please try again.".to_string(),
        413 => "That file is too large for the service to accept.".to_string(),
        404 => "The requested resource was not found.".to_string(),
        STATUS_NO_CONNECTION => "Could not reach the service. Check your connection.".to_string(),
        code => format!("The service returned an unexpected error (HTTP {}).", code),
    }
}

/// Status-specific default wait hints when the server sends none.
fn default_retry_after(status: u16) -> Option<u64> {
    match status {
        429 => Some(30),
        503 => Some(60),
        _ => None,
    }
}

/// Run `operation` under `policy`, retrying retryable failures with
/// exponential backoff. Backoff sleeps are local to this call chain and
/// never block unrelated tasks.
pub async fn call_with_retry<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, RequestFailure>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(failure) => {
                let retryable = policy.is_retryable(failure.status);
                if retryable && attempt < policy.max_retries {
                    let delay = policy.delay_for_attempt(attempt);
                    tracing::debug!(
                        status = ?failure.status,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "retrying after transient failure"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                } else {
                    return Err(ApiError::from_failure(failure, retryable));
                }
            }
        }
    }
}
