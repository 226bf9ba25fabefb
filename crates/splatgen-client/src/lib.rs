//! splatgen client - transport, service API, and job orchestration
//!
//! Everything needed to drive the remote generation service:
//! a classified-retry transport, the reqwest-backed API client, and the
//! polling job orchestrator built on top of both.

pub mod api;
pub mod orchestrator;
pub mod ports;
pub mod retry;

pub use api::{HealthStatus, SplatApiClient};
pub use orchestrator::{JobSession, OrchestratorError, SessionPhase};
pub use ports::JobBackend;
pub use retry::{ApiError, RetryPolicy};
