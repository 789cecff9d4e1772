//! vulnscout 공통 기반 크레이트
//!
//! 엔진, HTTP 서버, CLI가 공유하는 타입을 정의합니다.
//!
//! - [`error`]: 최상위 에러 타입 (`VulnscoutError`)과 도메인 에러
//! - [`config`]: `vulnscout.toml` 설정 로딩 및 환경변수 오버라이드
//! - [`types`]: 심각도(`Severity`) 등 공통 도메인 타입
//! - [`metrics`]: Prometheus 메트릭 이름 상수와 설명 등록

pub mod config;
pub mod error;
pub mod metrics;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, ScanFailure, VulnscoutError};

// 설정
pub use config::VulnscoutConfig;

// 도메인 타입
pub use types::Severity;
