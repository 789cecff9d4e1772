//! 스캔 작업 관리자
//!
//! [`ScanJobManager`]는 요청을 검증해 작업을 만들고, 별도 태스크에서 파이프라인을
//! 실행한 뒤 결과를 저장소에 기록합니다.
//!
//! # 격리
//!
//! 파이프라인은 작업마다 독립된 tokio 태스크에서 실행됩니다. 태스크가 패닉하거나
//! 제한 시간을 넘기면 해당 작업만 `error`로 끝나고 다른 작업과 서버는 영향을 받지 않습니다.
//!
//! # 정리
//!
//! [`sweep`](ScanJobManager::sweep)은 TTL이 지난 작업을 먼저 지우고, 남은 작업이
//! `max_jobs`를 넘으면 가장 오래된 작업부터 제거합니다.
//! [`spawn_sweeper`](ScanJobManager::spawn_sweeper)는 이를 주기적으로 실행합니다.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use metrics::{counter, gauge, histogram};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use vulnscout_core::metrics as m;
use vulnscout_core::types::Severity;

use super::store::{InMemoryJobStore, JobStore};
use super::{JobStatus, JobStatusView, JobTicket, ScanJob};
use crate::engine::{ScanEngine, ScanOutcome, ScanProgress};
use crate::error::ScanError;
use crate::types::{ScanReport, ScanRequest};

/// 스캔 작업 관리자
///
/// 복제 비용이 낮으며 (내부 `Arc`), 복제본은 같은 저장소와 엔진을 공유합니다.
pub struct ScanJobManager<S: JobStore = InMemoryJobStore> {
    engine: Arc<ScanEngine>,
    store: Arc<S>,
}

impl<S: JobStore> Clone for ScanJobManager<S> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: JobStore> std::fmt::Debug for ScanJobManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanJobManager").finish_non_exhaustive()
    }
}

impl ScanJobManager<InMemoryJobStore> {
    /// 메모리 저장소를 사용하는 관리자를 생성합니다.
    pub fn in_memory(engine: Arc<ScanEngine>) -> Self {
        Self::new(engine, Arc::new(InMemoryJobStore::new()))
    }
}

impl<S: JobStore> ScanJobManager<S> {
    /// 새 관리자를 생성합니다.
    pub fn new(engine: Arc<ScanEngine>, store: Arc<S>) -> Self {
        Self { engine, store }
    }

    /// 스캔 엔진
    pub fn engine(&self) -> &ScanEngine {
        &self.engine
    }

    /// 작업 저장소
    pub fn store(&self) -> &S {
        &self.store
    }

    /// 요청을 검증하고 작업을 접수합니다.
    ///
    /// 검증에 실패하면 작업을 만들지 않고 에러를 반환합니다. 성공하면 즉시
    /// `scanning` 상태의 티켓을 반환하고 파이프라인은 백그라운드에서 실행됩니다.
    pub async fn create(&self, request: ScanRequest) -> Result<JobTicket, ScanError> {
        let dependency_count = self.engine.validate(&request)?;
        let id = Uuid::new_v4().to_string();
        let kind = request.kind();

        self.store.insert(ScanJob::new(id.clone(), request.clone())).await;
        counter!(m::SCANS_STARTED_TOTAL, m::LABEL_KIND => kind).increment(1);
        gauge!(m::JOBS_RETAINED).set(self.store.len().await as f64);
        info!(job_id = %id, kind, dependency_count, "scan job accepted");

        tokio::spawn(run_job(
            Arc::clone(&self.engine),
            Arc::clone(&self.store),
            id.clone(),
            request,
        ));

        Ok(JobTicket {
            id,
            status: JobStatus::Scanning,
            dependency_count,
        })
    }

    /// 작업 레코드를 반환합니다.
    ///
    /// TTL이 지난 작업은 정리 전이라도 없는 것으로 취급합니다.
    pub async fn get(&self, id: &str) -> Result<ScanJob, ScanError> {
        let job = self
            .store
            .get(id)
            .await
            .ok_or_else(|| ScanError::JobNotFound(id.to_owned()))?;

        if self.is_expired(&job, Utc::now()) {
            self.store.remove(id).await;
            counter!(m::JOBS_EVICTED_TOTAL).increment(1);
            debug!(job_id = %id, "expired job evicted on access");
            return Err(ScanError::JobNotFound(id.to_owned()));
        }
        Ok(job)
    }

    /// 상태와 진행 상황을 반환합니다.
    pub async fn status(&self, id: &str) -> Result<JobStatusView, ScanError> {
        Ok(self.get(id).await?.status_view())
    }

    /// 완료된 보고서를 반환합니다. 아직 실행 중이거나 실패했으면 `None`입니다.
    pub async fn report(&self, id: &str) -> Result<Option<ScanReport>, ScanError> {
        Ok(self.get(id).await?.result)
    }

    /// 작업이 종료 상태가 될 때까지 `poll` 간격으로 기다립니다.
    pub async fn wait(&self, id: &str, poll: Duration) -> Result<ScanJob, ScanError> {
        loop {
            let job = self.get(id).await?;
            if job.status.is_terminal() {
                return Ok(job);
            }
            tokio::time::sleep(poll).await;
        }
    }

    /// 보관 중인 작업 수
    pub async fn job_count(&self) -> usize {
        self.store.len().await
    }

    /// 만료 및 초과 작업을 제거하고 제거한 수를 반환합니다.
    pub async fn sweep(&self) -> usize {
        self.sweep_at(Utc::now()).await
    }

    /// `now` 기준으로 정리합니다.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        let max_jobs = self.engine.config().max_jobs;
        let (expired, mut live): (Vec<ScanJob>, Vec<ScanJob>) = self
            .store
            .list()
            .await
            .into_iter()
            .partition(|job| self.is_expired(job, now));

        let mut evicted = 0;
        for job in &expired {
            if self.store.remove(&job.id).await.is_some() {
                evicted += 1;
            }
        }

        if live.len() > max_jobs {
            live.sort_by_key(|job| job.created_at);
            let overflow = live.len() - max_jobs;
            for job in live.iter().take(overflow) {
                if self.store.remove(&job.id).await.is_some() {
                    evicted += 1;
                }
            }
        }

        let retained = self.store.len().await;
        if evicted > 0 {
            counter!(m::JOBS_EVICTED_TOTAL).increment(evicted as u64);
            info!(evicted, expired = expired.len(), retained, "scan jobs swept");
        }
        gauge!(m::JOBS_RETAINED).set(retained as f64);
        evicted
    }

    /// 주기적 정리 태스크를 시작합니다.
    ///
    /// `cancel`이 발동되면 종료합니다.
    pub fn spawn_sweeper(&self, interval: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        let manager = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // 첫 tick은 즉시 완료됨
            ticker.tick().await;
            info!(interval_secs = interval.as_secs(), "job sweeper started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        manager.sweep().await;
                    }
                    _ = cancel.cancelled() => {
                        info!("job sweeper stopped");
                        break;
                    }
                }
            }
        })
    }

    fn is_expired(&self, job: &ScanJob, now: DateTime<Utc>) -> bool {
        let ttl = chrono::Duration::from_std(self.engine.config().job_ttl())
            .unwrap_or(chrono::Duration::MAX);
        now.signed_duration_since(job.created_at) > ttl
    }
}

/// 파이프라인을 실행하고 결과를 기록합니다.
async fn run_job<S: JobStore>(
    engine: Arc<ScanEngine>,
    store: Arc<S>,
    id: String,
    request: ScanRequest,
) {
    let started = Instant::now();
    let kind = request.kind();
    let timeout = engine.config().job_timeout();
    let log_lines = engine.config().progress_log_lines;

    let (tx, rx) = mpsc::unbounded_channel();
    let task = {
        let engine = Arc::clone(&engine);
        let id = id.clone();
        tokio::spawn(async move { engine.run(&id, &request, Some(tx)).await })
    };
    let abort = task.abort_handle();

    let execution = async {
        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) if join_error.is_panic() => {
                Err(ScanError::ScanExecution("scan task panicked".to_owned()))
            }
            Ok(Err(_)) => Err(ScanError::ScanExecution("scan task cancelled".to_owned())),
            Err(_) => {
                abort.abort();
                Err(ScanError::Timeout {
                    secs: timeout.as_secs(),
                })
            }
        }
    };
    let (result, ()) = tokio::join!(execution, forward_progress(rx, store.as_ref(), &id, log_lines));

    let elapsed = started.elapsed().as_secs_f64();
    histogram!(m::SCAN_DURATION_SECONDS).record(elapsed);

    match result {
        Ok(outcome) => complete(store.as_ref(), &id, outcome, kind, elapsed, log_lines).await,
        Err(e) => {
            counter!(m::SCANS_FAILED_TOTAL, m::LABEL_KIND => kind).increment(1);
            error!(job_id = %id, kind, error = %e, elapsed_secs = elapsed, "scan job failed");
            let message = e.to_string();
            store
                .update(&id, move |job| {
                    job.status = JobStatus::Error;
                    job.error = Some(message.clone());
                    job.progress.push_log(format!("error: {message}"), log_lines);
                    job.updated_at = Utc::now();
                })
                .await;
        }
    }
}

async fn complete<S: JobStore>(
    store: &S,
    id: &str,
    outcome: ScanOutcome,
    kind: &'static str,
    elapsed: f64,
    log_lines: usize,
) {
    let ScanOutcome {
        report,
        sub_reports,
    } = outcome;

    for sub in sub_reports {
        let request = ScanRequest::Package {
            ecosystem: sub.target.ecosystem,
            package: sub.target.package.clone().unwrap_or_default(),
            version: sub.target.version.clone(),
            deep: true,
        };
        store.insert(ScanJob::completed_child(id, request, sub)).await;
    }

    for severity in Severity::ALL_DESC {
        let count = report.summary.get(severity);
        if count > 0 {
            counter!(m::VULNERABILITIES_FOUND_TOTAL, m::LABEL_SEVERITY => severity.as_str())
                .increment(count as u64);
        }
    }
    counter!(m::SCANS_COMPLETED_TOTAL, m::LABEL_KIND => kind).increment(1);
    info!(
        job_id = %id,
        kind,
        score = report.score,
        vulnerabilities = report.summary.total,
        dependencies = report.dependencies.len(),
        elapsed_secs = elapsed,
        "scan job completed"
    );

    let summary = format!(
        "completed: {} vulnerabilities in {} dependencies, score {}",
        report.summary.total,
        report.dependencies.len(),
        report.score
    );
    let updated = store
        .update(id, move |job| {
            job.status = JobStatus::Completed;
            job.progress.current = job.progress.current.max(job.progress.total);
            job.progress.push_log(summary, log_lines);
            job.result = Some(report);
            job.updated_at = Utc::now();
        })
        .await;
    if !updated {
        warn!(job_id = %id, "job evicted before completion, result dropped");
    }
}

/// 진행 이벤트를 작업 레코드에 반영합니다. 송신 측이 닫히면 끝납니다.
async fn forward_progress<S: JobStore>(
    mut rx: mpsc::UnboundedReceiver<ScanProgress>,
    store: &S,
    id: &str,
    log_lines: usize,
) {
    while let Some(event) = rx.recv().await {
        store
            .update(id, move |job| {
                let progress = &mut job.progress;
                progress.current = event.current;
                progress.total = event.total;
                if event.current_package.is_some() {
                    progress.current_package = event.current_package;
                }
                progress.push_log(event.message, log_lines);
                job.updated_at = Utc::now();
            })
            .await;
    }
}
