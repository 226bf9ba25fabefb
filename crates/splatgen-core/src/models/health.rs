use serde::{Deserialize, Serialize};

/// Liveness report from the service health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub active_jobs: Option<u32>,
    #[serde(default)]
    pub queued_jobs: Option<u32>,
}
