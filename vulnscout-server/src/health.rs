//! Health check reporting.

use serde::{Deserialize, Serialize};

/// Response body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `"ok"` while the server accepts requests.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Seconds since the server started.
    pub uptime_secs: u64,
    /// Number of retained scan jobs.
    pub jobs: usize,
}

impl HealthResponse {
    /// Healthy report for the given uptime and job count.
    pub fn ok(uptime_secs: u64, jobs: usize) -> Self {
        Self {
            status: "ok".to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            uptime_secs,
            jobs,
        }
    }

    /// Whether the reported status is healthy.
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
