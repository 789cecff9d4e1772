//! 엔진 설정
//!
//! [`EngineConfig`]는 core의 [`VulnscoutConfig`](vulnscout_core::config::VulnscoutConfig)에서
//! 레지스트리, 어드바이저리, 권고, 작업 관련 섹션을 모아 엔진 전용 평면 구조로 만든 것입니다.
//!
//! # 사용 예시
//!
//! ```
//! use vulnscout_engine::EngineConfig;
//!
//! let config = EngineConfig::default();
//! config.validate().unwrap();
//!
//! use vulnscout_engine::EngineConfigBuilder;
//!
//! let config = EngineConfigBuilder::new()
//!     .osv_url("http://127.0.0.1:8080")
//!     .max_concurrency(4)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.max_concurrency, 4);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use vulnscout_core::config::VulnscoutConfig;

use crate::error::ScanError;
use crate::types::Ecosystem;

/// 타임아웃 상한 (초)
const MAX_TIMEOUT_SECS: u64 = 3600;
/// 레벨당 동시 요청 상한
const MAX_CONCURRENCY: usize = 64;
/// 진행 로그 보관 줄 수 상한
const MAX_PROGRESS_LOG_LINES: usize = 1000;

/// 엔진 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    // --- 레지스트리 ---
    /// PyPI 기본 URL
    pub pypi_url: String,
    /// npm 레지스트리 기본 URL
    pub npm_url: String,
    /// Maven 저장소 기본 URL
    pub maven_url: String,
    /// Go 모듈 프록시 기본 URL
    pub go_proxy_url: String,
    /// RubyGems 기본 URL
    pub rubygems_url: String,
    /// 레지스트리 요청 타임아웃 (초)
    pub http_timeout_secs: u64,
    /// 한 레벨에서 동시에 조회할 최대 노드 수
    pub max_concurrency: usize,
    /// HTTP User-Agent
    pub user_agent: String,

    // --- 어드바이저리 ---
    /// OSV 호환 어드바이저리 서비스 URL
    pub osv_url: String,
    /// 어드바이저리 요청 타임아웃 (초)
    pub advisory_timeout_secs: u64,
    /// 버전 없이 조회한 뒤 범위를 직접 평가할지 여부
    pub client_side_matching: bool,

    // --- 권고 ---
    /// breaking change 데이터셋 파일 경로 (None이면 내장 데이터셋)
    pub dataset_path: Option<String>,
    /// 체인지로그 조회 여부
    pub changelog_enabled: bool,
    /// 체인지로그 원문 호스트
    pub changelog_base_url: String,
    /// 체인지로그 요청 타임아웃 (초)
    pub changelog_timeout_secs: u64,

    // --- 작업 ---
    /// 작업 보관 시간 (초)
    pub job_ttl_secs: u64,
    /// 만료 작업 정리 주기 (초)
    pub sweep_interval_secs: u64,
    /// 보관할 최대 작업 수
    pub max_jobs: usize,
    /// 작업당 실행 제한 시간 (초)
    pub job_timeout_secs: u64,
    /// 진행 로그 보관 줄 수
    pub progress_log_lines: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_core(&VulnscoutConfig::default())
    }
}

impl EngineConfig {
    /// core 설정에서 엔진 설정을 생성합니다.
    ///
    /// 빈 `dataset_path`는 내장 데이터셋 사용을 의미합니다.
    pub fn from_core(core: &VulnscoutConfig) -> Self {
        let registry = &core.registry;
        let remediation = &core.remediation;
        let jobs = &core.jobs;

        Self {
            pypi_url: trim_url(&registry.pypi_url),
            npm_url: trim_url(&registry.npm_url),
            maven_url: trim_url(&registry.maven_url),
            go_proxy_url: trim_url(&registry.go_proxy_url),
            rubygems_url: trim_url(&registry.rubygems_url),
            http_timeout_secs: registry.http_timeout_secs,
            max_concurrency: registry.max_concurrency,
            user_agent: registry.user_agent.clone(),
            osv_url: trim_url(&core.advisory.osv_url),
            advisory_timeout_secs: core.advisory.timeout_secs,
            client_side_matching: core.advisory.client_side_matching,
            dataset_path: (!remediation.dataset_path.is_empty())
                .then(|| remediation.dataset_path.clone()),
            changelog_enabled: remediation.changelog_enabled,
            changelog_base_url: trim_url(&remediation.changelog_base_url),
            changelog_timeout_secs: remediation.timeout_secs,
            job_ttl_secs: jobs.ttl_secs,
            sweep_interval_secs: jobs.sweep_interval_secs,
            max_jobs: jobs.max_jobs,
            job_timeout_secs: jobs.job_timeout_secs,
            progress_log_lines: jobs.progress_log_lines,
        }
    }

    /// 생태계의 레지스트리 기본 URL을 반환합니다.
    pub fn registry_url(&self, ecosystem: Ecosystem) -> &str {
        match ecosystem {
            Ecosystem::PyPi => &self.pypi_url,
            Ecosystem::Npm => &self.npm_url,
            Ecosystem::Maven => &self.maven_url,
            Ecosystem::Go => &self.go_proxy_url,
            Ecosystem::RubyGems => &self.rubygems_url,
        }
    }

    /// 작업 보관 시간
    pub fn job_ttl(&self) -> Duration {
        Duration::from_secs(self.job_ttl_secs)
    }

    /// 작업 실행 제한 시간
    pub fn job_timeout(&self) -> Duration {
        Duration::from_secs(self.job_timeout_secs)
    }

    /// 정리 주기
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// 설정 값의 유효성을 검증합니다.
    ///
    /// # 검증 규칙
    ///
    /// - 모든 URL: `http://` 또는 `https://`로 시작
    /// - 타임아웃: 1-3600초
    /// - `max_concurrency`: 1-64
    /// - `job_ttl_secs`, `sweep_interval_secs`, `max_jobs`: 1 이상
    /// - `progress_log_lines`: 1-1000
    pub fn validate(&self) -> Result<(), ScanError> {
        let urls = [
            ("pypi_url", &self.pypi_url),
            ("npm_url", &self.npm_url),
            ("maven_url", &self.maven_url),
            ("go_proxy_url", &self.go_proxy_url),
            ("rubygems_url", &self.rubygems_url),
            ("osv_url", &self.osv_url),
            ("changelog_base_url", &self.changelog_base_url),
        ];
        for (field, url) in urls {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(config_error(
                    field,
                    format!("'{url}' must start with http:// or https://"),
                ));
            }
        }

        let timeouts = [
            ("http_timeout_secs", self.http_timeout_secs),
            ("advisory_timeout_secs", self.advisory_timeout_secs),
            ("changelog_timeout_secs", self.changelog_timeout_secs),
            ("job_timeout_secs", self.job_timeout_secs),
        ];
        for (field, secs) in timeouts {
            if secs == 0 || secs > MAX_TIMEOUT_SECS {
                return Err(config_error(field, format!("must be 1-{MAX_TIMEOUT_SECS}")));
            }
        }

        if self.max_concurrency == 0 || self.max_concurrency > MAX_CONCURRENCY {
            return Err(config_error(
                "max_concurrency",
                format!("must be 1-{MAX_CONCURRENCY}"),
            ));
        }

        if self.job_ttl_secs == 0 {
            return Err(config_error("job_ttl_secs", "must be greater than 0"));
        }
        if self.sweep_interval_secs == 0 {
            return Err(config_error("sweep_interval_secs", "must be greater than 0"));
        }
        if self.max_jobs == 0 {
            return Err(config_error("max_jobs", "must be greater than 0"));
        }

        if self.progress_log_lines == 0 || self.progress_log_lines > MAX_PROGRESS_LOG_LINES {
            return Err(config_error(
                "progress_log_lines",
                format!("must be 1-{MAX_PROGRESS_LOG_LINES}"),
            ));
        }

        if let Some(path) = &self.dataset_path {
            if path.trim().is_empty() {
                return Err(config_error("dataset_path", "must not be blank"));
            }
        }

        Ok(())
    }
}

fn config_error(field: &str, reason: impl Into<String>) -> ScanError {
    ScanError::Config {
        field: field.to_owned(),
        reason: reason.into(),
    }
}

fn trim_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_owned()
}

/// [`EngineConfig`] 빌더
///
/// 테스트에서 모의 레지스트리 주소를 주입할 때 주로 사용합니다.
#[derive(Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// 기본값을 가진 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 한 생태계의 레지스트리 URL을 설정합니다.
    pub fn registry_url(mut self, ecosystem: Ecosystem, url: impl AsRef<str>) -> Self {
        let url = trim_url(url.as_ref());
        match ecosystem {
            Ecosystem::PyPi => self.config.pypi_url = url,
            Ecosystem::Npm => self.config.npm_url = url,
            Ecosystem::Maven => self.config.maven_url = url,
            Ecosystem::Go => self.config.go_proxy_url = url,
            Ecosystem::RubyGems => self.config.rubygems_url = url,
        }
        self
    }

    /// 모든 레지스트리 URL을 한 주소로 설정합니다.
    pub fn all_registries(mut self, url: impl AsRef<str>) -> Self {
        for ecosystem in Ecosystem::ALL {
            self = self.registry_url(ecosystem, url.as_ref());
        }
        self
    }

    /// 어드바이저리 서비스 URL을 설정합니다.
    pub fn osv_url(mut self, url: impl AsRef<str>) -> Self {
        self.config.osv_url = trim_url(url.as_ref());
        self
    }

    /// 체인지로그 호스트를 설정합니다.
    pub fn changelog_base_url(mut self, url: impl AsRef<str>) -> Self {
        self.config.changelog_base_url = trim_url(url.as_ref());
        self
    }

    /// 체인지로그 조회 여부를 설정합니다.
    pub fn changelog_enabled(mut self, enabled: bool) -> Self {
        self.config.changelog_enabled = enabled;
        self
    }

    /// breaking change 데이터셋 경로를 설정합니다.
    pub fn dataset_path(mut self, path: impl Into<String>) -> Self {
        self.config.dataset_path = Some(path.into());
        self
    }

    /// 클라이언트 측 범위 평가 여부를 설정합니다.
    pub fn client_side_matching(mut self, enabled: bool) -> Self {
        self.config.client_side_matching = enabled;
        self
    }

    /// 레벨당 동시 요청 수를 설정합니다.
    pub fn max_concurrency(mut self, max: usize) -> Self {
        self.config.max_concurrency = max;
        self
    }

    /// 레지스트리 요청 타임아웃을 설정합니다.
    pub fn http_timeout_secs(mut self, secs: u64) -> Self {
        self.config.http_timeout_secs = secs;
        self
    }

    /// 작업 보관 시간을 설정합니다.
    pub fn job_ttl_secs(mut self, secs: u64) -> Self {
        self.config.job_ttl_secs = secs;
        self
    }

    /// 작업 실행 제한 시간을 설정합니다.
    pub fn job_timeout_secs(mut self, secs: u64) -> Self {
        self.config.job_timeout_secs = secs;
        self
    }

    /// 최대 작업 수를 설정합니다.
    pub fn max_jobs(mut self, max: usize) -> Self {
        self.config.max_jobs = max;
        self
    }

    /// 진행 로그 보관 줄 수를 설정합니다.
    pub fn progress_log_lines(mut self, lines: usize) -> Self {
        self.config.progress_log_lines = lines;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    ///
    /// # Errors
    ///
    /// 유효성 검증 실패 시 `ScanError::Config` 반환
    pub fn build(self) -> Result<EngineConfig, ScanError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = EngineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.npm_url, "https://registry.npmjs.org");
        assert_eq!(config.osv_url, "https://api.osv.dev");
        assert!(config.dataset_path.is_none());
    }

    #[test]
    fn from_core_preserves_values() {
        let mut core = VulnscoutConfig::default();
        core.registry.pypi_url = "http://pypi.internal/".to_owned();
        core.registry.max_concurrency = 3;
        core.advisory.client_side_matching = true;
        core.remediation.dataset_path = "/etc/vulnscout/breaking.json".to_owned();
        core.jobs.ttl_secs = 120;

        let config = EngineConfig::from_core(&core);
        assert_eq!(config.pypi_url, "http://pypi.internal");
        assert_eq!(config.max_concurrency, 3);
        assert!(config.client_side_matching);
        assert_eq!(
            config.dataset_path.as_deref(),
            Some("/etc/vulnscout/breaking.json")
        );
        assert_eq!(config.job_ttl(), Duration::from_secs(120));
    }

    #[test]
    fn registry_url_per_ecosystem() {
        let config = EngineConfigBuilder::new()
            .registry_url(Ecosystem::Go, "http://127.0.0.1:9000/")
            .build()
            .unwrap();
        assert_eq!(config.registry_url(Ecosystem::Go), "http://127.0.0.1:9000");
        assert_eq!(config.registry_url(Ecosystem::Npm), "https://registry.npmjs.org");
    }

    #[test]
    fn validate_rejects_non_http_url() {
        let err = EngineConfigBuilder::new()
            .osv_url("ftp://osv.example")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("osv_url"));
    }

    #[test]
    fn validate_rejects_zero_concurrency() {
        assert!(EngineConfigBuilder::new().max_concurrency(0).build().is_err());
        assert!(EngineConfigBuilder::new().max_concurrency(65).build().is_err());
    }

    #[test]
    fn validate_rejects_zero_timeouts() {
        assert!(EngineConfigBuilder::new().http_timeout_secs(0).build().is_err());
        assert!(EngineConfigBuilder::new().job_timeout_secs(0).build().is_err());
    }

    #[test]
    fn validate_rejects_zero_job_limits() {
        assert!(EngineConfigBuilder::new().job_ttl_secs(0).build().is_err());
        assert!(EngineConfigBuilder::new().max_jobs(0).build().is_err());
        assert!(EngineConfigBuilder::new().progress_log_lines(0).build().is_err());
    }
}
