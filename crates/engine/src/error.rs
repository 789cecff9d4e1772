//! 엔진 에러 타입
//!
//! [`ScanError`]는 엔진 내에서 발생할 수 있는 모든 에러를 나타냅니다.
//! `From<ScanError> for VulnscoutError` 구현을 통해 `?` 연산자로
//! 상위 에러 타입으로 전파됩니다.
//!
//! # 전파 정책
//!
//! - **사전 검증** (`UnsupportedManifest`, `ManifestParse`, `Validation`):
//!   작업 생성 전에 호출자에게 바로 반환됩니다.
//! - **노드 단위 실패** (`RegistryFetch`, `AdvisoryQuery`): 해당 노드에서 흡수되고
//!   스캔은 부분 결과로 계속됩니다.
//! - **실행 실패** (`ScanExecution`, `Timeout`): 작업을 `error` 상태로 종료합니다.

use vulnscout_core::error::{ScanFailure, VulnscoutError};

/// 엔진 도메인 에러
#[derive(Debug, Clone, thiserror::Error)]
pub enum ScanError {
    /// 파일 이름이 알려진 매니페스트 패턴과 일치하지 않음
    #[error("unsupported manifest: {file_name}")]
    UnsupportedManifest {
        /// 요청된 파일 이름
        file_name: String,
    },

    /// 매니페스트 내용 파싱 실패
    #[error("manifest parse error: {file_name}: {reason}")]
    ManifestParse {
        /// 파싱 대상 파일 이름
        file_name: String,
        /// 실패 사유
        reason: String,
    },

    /// 요청 값 검증 실패
    #[error("validation error: {field}: {reason}")]
    Validation {
        /// 문제가 된 필드
        field: String,
        /// 실패 사유
        reason: String,
    },

    /// 레지스트리 조회 실패 (노드 단위로 흡수됨)
    #[error("registry fetch error: {url}: {reason}")]
    RegistryFetch {
        /// 요청 URL
        url: String,
        /// 실패 사유
        reason: String,
    },

    /// 어드바이저리 서비스 조회 실패 (빈 결과로 흡수됨)
    #[error("advisory query error: {0}")]
    AdvisoryQuery(String),

    /// 파이프라인 실행 중 처리되지 않은 실패
    #[error("scan execution error: {0}")]
    ScanExecution(String),

    /// 작업 전체 타임아웃 초과
    #[error("scan timed out after {secs}s")]
    Timeout {
        /// 적용된 타임아웃 (초)
        secs: u64,
    },

    /// 보고서 내보내기 실패
    #[error("export error: {0}")]
    Export(String),

    /// 존재하지 않거나 만료된 작업
    #[error("scan job not found: {0}")]
    JobNotFound(String),

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },
}

impl ScanError {
    /// 검증 에러를 생성합니다.
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_owned(),
            reason: reason.into(),
        }
    }

    /// 작업 시작 전에 호출자에게 반환되어야 하는 에러인지 여부
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedManifest { .. } | Self::ManifestParse { .. } | Self::Validation { .. }
        )
    }
}

impl From<ScanError> for VulnscoutError {
    fn from(err: ScanError) -> Self {
        let failure = match err {
            ScanError::UnsupportedManifest { .. } | ScanError::ManifestParse { .. } => {
                ScanFailure::ManifestParse(err.to_string())
            }
            ScanError::Validation { .. } | ScanError::JobNotFound(_) | ScanError::Config { .. } => {
                ScanFailure::Validation(err.to_string())
            }
            ScanError::RegistryFetch { .. }
            | ScanError::AdvisoryQuery(_)
            | ScanError::ScanExecution(_)
            | ScanError::Export(_)
            | ScanError::Timeout { .. } => ScanFailure::Execution(err.to_string()),
        };
        VulnscoutError::Scan(failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_errors_are_preflight() {
        let err = ScanError::UnsupportedManifest {
            file_name: "build.gradle".to_owned(),
        };
        assert!(err.is_preflight());
        let err = ScanError::ManifestParse {
            file_name: "package.json".to_owned(),
            reason: "expected value at line 1".to_owned(),
        };
        assert!(err.is_preflight());
        assert!(ScanError::validation("package", "must not be empty").is_preflight());
    }

    #[test]
    fn node_level_errors_are_not_preflight() {
        let err = ScanError::RegistryFetch {
            url: "https://registry.npmjs.org/left-pad/latest".to_owned(),
            reason: "HTTP 404".to_owned(),
        };
        assert!(!err.is_preflight());
        assert!(!ScanError::Timeout { secs: 30 }.is_preflight());
    }

    #[test]
    fn converts_to_core_manifest_failure() {
        let err: VulnscoutError = ScanError::ManifestParse {
            file_name: "package.json".to_owned(),
            reason: "invalid json".to_owned(),
        }
        .into();
        match err {
            VulnscoutError::Scan(ScanFailure::ManifestParse(msg)) => {
                assert!(msg.contains("package.json"));
            }
            other => panic!("unexpected conversion: {other:?}"),
        }
    }

    #[test]
    fn converts_timeout_to_execution_failure() {
        let err: VulnscoutError = ScanError::Timeout { secs: 5 }.into();
        assert!(matches!(
            err,
            VulnscoutError::Scan(ScanFailure::Execution(_))
        ));
        assert!(err.to_string().contains("timed out after 5s"));
    }

    #[test]
    fn display_formats() {
        let err = ScanError::validation("ecosystem", "unknown ecosystem 'cargo'");
        assert_eq!(
            err.to_string(),
            "validation error: ecosystem: unknown ecosystem 'cargo'"
        );
    }
}
