//! Scan execution backends
//!
//! [`LocalBackend`] runs jobs on an in-process [`ScanJobManager`];
//! [`RemoteBackend`] submits them to a vulnscout server over HTTP.
//! [`run_scan`] drives either one: submit, poll status until terminal, fetch the report.

use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use vulnscout_engine::{JobStatus, JobStatusView, JobTicket, ScanJobManager, ScanReport, ScanRequest};
use vulnscout_server::HealthResponse;

use crate::error::CliError;

/// Interval between status polls.
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Where scan jobs are executed.
pub trait ScanBackend {
    /// Submit a scan request.
    fn submit(&self, request: ScanRequest)
    -> impl Future<Output = Result<JobTicket, CliError>> + Send;

    /// Current status of a job.
    fn status(&self, id: &str) -> impl Future<Output = Result<JobStatusView, CliError>> + Send;

    /// Report of a completed job.
    fn report(&self, id: &str) -> impl Future<Output = Result<ScanReport, CliError>> + Send;
}

/// Submit `request` and wait for its report.
///
/// With `verbose`, progress log lines are streamed to stderr as they appear.
pub async fn run_scan<B: ScanBackend>(
    backend: &B,
    request: ScanRequest,
    timeout: Duration,
    verbose: bool,
    poll: Duration,
) -> Result<ScanReport, CliError> {
    let ticket = backend.submit(request).await?;
    debug!(job_id = %ticket.id, dependencies = ?ticket.dependency_count, "scan submitted");
    if verbose {
        match ticket.dependency_count {
            Some(count) => eprintln!("job {} accepted ({count} dependencies)", ticket.id),
            None => eprintln!("job {} accepted", ticket.id),
        }
    }

    let wait = async {
        let mut tail = LogTail::default();
        loop {
            let view = backend.status(&ticket.id).await?;
            if verbose {
                for line in tail.fresh_lines(&view.progress.log) {
                    eprintln!("{line}");
                }
            }
            match view.status {
                JobStatus::Scanning => tokio::time::sleep(poll).await,
                JobStatus::Completed => return backend.report(&ticket.id).await,
                JobStatus::Error => {
                    return Err(CliError::ScanFailed(
                        view.error.unwrap_or_else(|| "unknown error".to_owned()),
                    ));
                }
            }
        }
    };

    tokio::time::timeout(timeout, wait)
        .await
        .map_err(|_| CliError::Timeout(timeout.as_secs()))?
}

/// Tracks which progress log lines were already printed.
///
/// The job log is a bounded window, so position is recovered from the
/// last printed line rather than a running index.
#[derive(Debug, Default)]
pub struct LogTail {
    last: Option<String>,
}

impl LogTail {
    /// Lines of `log` not yet returned by a previous call.
    pub fn fresh_lines(&mut self, log: &VecDeque<String>) -> Vec<String> {
        let start = match &self.last {
            Some(last) => log.iter().rposition(|line| line == last).map_or(0, |i| i + 1),
            None => 0,
        };
        let fresh: Vec<String> = log.iter().skip(start).cloned().collect();
        if let Some(line) = fresh.last() {
            self.last = Some(line.clone());
        }
        fresh
    }
}

// --- local ---

/// In-process backend.
pub struct LocalBackend {
    manager: ScanJobManager,
}

impl LocalBackend {
    pub fn new(manager: ScanJobManager) -> Self {
        Self { manager }
    }
}

impl ScanBackend for LocalBackend {
    async fn submit(&self, request: ScanRequest) -> Result<JobTicket, CliError> {
        Ok(self.manager.create(request).await?)
    }

    async fn status(&self, id: &str) -> Result<JobStatusView, CliError> {
        Ok(self.manager.status(id).await?)
    }

    async fn report(&self, id: &str) -> Result<ScanReport, CliError> {
        self.manager
            .report(id)
            .await?
            .ok_or_else(|| CliError::ScanFailed(format!("job {id} completed without a report")))
    }
}

// --- remote ---

/// HTTP API backend.
pub struct RemoteBackend {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl RemoteBackend {
    /// Client for the server at `base_url` with a per-request `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CliError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("vulnscout-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Query `GET /health`.
    pub async fn health(&self) -> Result<HealthResponse, CliError> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;
        decode(response).await
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, CliError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.client.get(&url).send().await?;
        decode(response).await
    }
}

/// Decode a JSON body, turning non-2xx responses into [`CliError::Remote`].
async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, CliError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|e| e.message)
        .unwrap_or(body);
    Err(CliError::Remote(format!("{status}: {message}")))
}

impl ScanBackend for RemoteBackend {
    async fn submit(&self, request: ScanRequest) -> Result<JobTicket, CliError> {
        let (path, body) = match request {
            ScanRequest::Package {
                ecosystem,
                package,
                version,
                deep,
            } => (
                "/api/scan",
                json!({
                    "ecosystem": ecosystem.as_str(),
                    "package": package,
                    "version": version,
                    "deep": deep,
                }),
            ),
            ScanRequest::Manifest {
                file_name,
                content,
                deep,
            } => (
                "/api/scan/file",
                json!({ "fileName": file_name, "content": content, "deep": deep }),
            ),
        };

        let url = format!("{}{path}", self.base_url);
        let response = self.client.post(&url).json(&body).send().await?;
        decode(response).await
    }

    async fn status(&self, id: &str) -> Result<JobStatusView, CliError> {
        self.get(&format!("/api/scan/{id}/status")).await
    }

    async fn report(&self, id: &str) -> Result<ScanReport, CliError> {
        self.get(&format!("/api/scan/{id}")).await
    }
}
