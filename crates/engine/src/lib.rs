#![doc = include_str!("../README.md")]
//!
//! # 모듈 구조
//!
//! - [`error`]: 엔진 에러 타입 (`ScanError`)
//! - [`config`]: 엔진 설정 (`EngineConfig`, 빌더)
//! - [`types`]: 도메인 타입 (`Dependency`, `Vulnerability`, `ScanReport`, `ScanRequest`)
//! - [`version`]: 버전 비교
//! - [`http`]: 레지스트리/어드바이저리 HTTP 클라이언트
//! - [`manifest`]: 매니페스트 파서 (`ManifestDetector`)
//! - [`resolver`]: 생태계별 의존성 해석 (`ResolverRegistry`)
//! - [`advisory`]: 취약점 조회 (`OsvClient`)
//! - [`score`]: 보안 점수
//! - [`remediation`]: 업그레이드 권고 (`RemediationEngine`)
//! - [`export`]: JSON, Markdown, SARIF, 표 내보내기
//! - [`engine`]: 스캔 오케스트레이터 (`ScanEngine`)
//! - [`job`]: 비동기 작업 관리 (`ScanJobManager`)
//!
//! # 아키텍처
//!
//! ```text
//! ScanRequest --> ScanJobManager::create --> tokio::spawn
//!                                               |
//!                                          ScanEngine::run
//!                                               |
//!              ManifestDetector --> ResolverRegistry (BFS) --> AdvisoryClient
//!                                               |
//!                             calculate_score + RemediationEngine
//!                                               |
//!                                  ScanReport --> JobStore --> export
//! ```

pub mod advisory;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod http;
pub mod job;
pub mod manifest;
pub mod remediation;
pub mod resolver;
pub mod score;
pub mod types;
pub mod version;

// --- Public API Re-exports ---

// 오케스트레이터
pub use engine::{ScanEngine, ScanEngineBuilder, ScanOutcome, ScanProgress};

// 작업 관리
pub use job::{
    InMemoryJobStore, JobProgress, JobStatus, JobStatusView, JobStore, JobTicket, ScanJob,
    ScanJobManager,
};

// 설정
pub use config::{EngineConfig, EngineConfigBuilder};

// 에러
pub use error::ScanError;

// 타입
pub use types::{
    BreakingChange, BreakingChangeSource, Dependency, Ecosystem, Remediation, ScanReport,
    ScanRequest, ScanTarget, SeverityCounts, UnresolvedNode, Vulnerability,
};

// 구성 요소
pub use advisory::{AdvisoryClient, DynAdvisoryClient, OsvClient};
pub use export::{ExportFormat, export};
pub use manifest::{ManifestDetector, ParsedManifest, parse_manifest};
pub use remediation::RemediationEngine;
pub use resolver::{EcosystemResolver, Resolution, ResolverRegistry};
pub use score::calculate_score;
