//! 비동기 스캔 작업 관리
//!
//! 스캔은 작업(job)으로 접수되어 백그라운드에서 실행됩니다. 호출자는 작업 ID로
//! 상태와 진행 상황을 폴링하고, 완료 후 보고서를 조회합니다.
//!
//! # 상태 전이
//!
//! ```text
//! create() --> scanning --+--> completed (result 설정)
//!                         +--> error     (error 설정)
//! ```
//!
//! 종료 상태는 다시 바뀌지 않습니다. 작업은 TTL이 지나거나 저장소가 최대 개수를
//! 넘으면 제거됩니다.
//!
//! - [`JobStore`]: 작업 저장소 trait
//! - [`InMemoryJobStore`]: 프로세스 메모리 저장소
//! - [`ScanJobManager`]: 작업 생성, 실행, 조회, 정리

pub mod manager;
pub mod store;

pub use manager::ScanJobManager;
pub use store::{InMemoryJobStore, JobStore};

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ScanReport, ScanRequest};

/// 작업 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// 실행 중
    Scanning,
    /// 보고서 생성 완료
    Completed,
    /// 실패
    Error,
}

impl JobStatus {
    /// 종료 상태 여부
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Scanning)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scanning => write!(f, "scanning"),
            Self::Completed => write!(f, "completed"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// 작업 진행 상황
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobProgress {
    /// 처리한 단위 수
    pub current: usize,
    /// 전체 단위 수
    pub total: usize,
    /// 현재 처리 중인 패키지
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_package: Option<String>,
    /// 최근 로그 (오래된 줄부터)
    #[serde(default)]
    pub log: VecDeque<String>,
}

impl JobProgress {
    /// 로그를 추가하고 최근 `max_lines`줄만 유지합니다.
    pub fn push_log(&mut self, line: String, max_lines: usize) {
        self.log.push_back(line);
        while self.log.len() > max_lines {
            self.log.pop_front();
        }
    }
}

/// 스캔 작업 레코드
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanJob {
    /// 작업 ID (UUID v4, 하위 작업은 `{부모}-dep-{인덱스}`)
    pub id: String,
    /// 현재 상태
    pub status: JobStatus,
    /// 원본 요청
    pub request: ScanRequest,
    /// 생성 시각
    pub created_at: DateTime<Utc>,
    /// 마지막 변경 시각
    pub updated_at: DateTime<Utc>,
    /// 진행 상황
    #[serde(default)]
    pub progress: JobProgress,
    /// 완료 보고서
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ScanReport>,
    /// 실패 메시지
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// deep 매니페스트 스캔의 부모 작업 ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl ScanJob {
    /// `scanning` 상태의 새 작업을 생성합니다.
    pub fn new(id: impl Into<String>, request: ScanRequest) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            status: JobStatus::Scanning,
            request,
            created_at: now,
            updated_at: now,
            progress: JobProgress::default(),
            result: None,
            error: None,
            parent_id: None,
        }
    }

    /// 보고서를 가진 `completed` 상태의 하위 작업을 생성합니다.
    pub fn completed_child(parent_id: &str, request: ScanRequest, report: ScanReport) -> Self {
        let mut job = Self::new(report.id.clone(), request);
        job.status = JobStatus::Completed;
        job.parent_id = Some(parent_id.to_owned());
        job.result = Some(report);
        job
    }

    /// 보고서를 제외한 상태 요약
    pub fn status_view(&self) -> JobStatusView {
        JobStatusView {
            id: self.id.clone(),
            status: self.status,
            progress: self.progress.clone(),
            error: self.error.clone(),
            parent_id: self.parent_id.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// 상태 조회 응답
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusView {
    /// 작업 ID
    pub id: String,
    /// 현재 상태
    pub status: JobStatus,
    /// 진행 상황
    pub progress: JobProgress,
    /// 실패 메시지
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// 부모 작업 ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// 생성 시각
    pub created_at: DateTime<Utc>,
    /// 마지막 변경 시각
    pub updated_at: DateTime<Utc>,
}

/// 작업 접수 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobTicket {
    /// 작업 ID
    pub id: String,
    /// 접수 시점 상태 (항상 `scanning`)
    pub status: JobStatus,
    /// 매니페스트 요청의 의존성 수
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_count: Option<usize>,
}
