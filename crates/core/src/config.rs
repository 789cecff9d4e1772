//! 설정 관리: vulnscout.toml 파싱 및 런타임 설정
//!
//! [`VulnscoutConfig`]는 엔진, 서버, CLI의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`VULNSCOUT_REGISTRY_NPM_URL=...` 형식)
//! 3. 설정 파일 (`vulnscout.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), vulnscout_core::error::VulnscoutError> {
//! use vulnscout_core::config::VulnscoutConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = VulnscoutConfig::load("vulnscout.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = VulnscoutConfig::parse("[jobs]\nttl_secs = 600")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, VulnscoutError};

/// 타임아웃 설정 상한 (초)
const MAX_TIMEOUT_SECS: u64 = 3600;
/// 동시 레지스트리 요청 상한
const MAX_CONCURRENCY: usize = 64;

/// vulnscout 통합 설정
///
/// `vulnscout.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 컴포넌트는 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VulnscoutConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 패키지 레지스트리 설정
    #[serde(default)]
    pub registry: RegistryConfig,
    /// 취약점 어드바이저리 서비스 설정
    #[serde(default)]
    pub advisory: AdvisoryConfig,
    /// 업그레이드 권고 설정
    #[serde(default)]
    pub remediation: RemediationConfig,
    /// 스캔 작업 관리 설정
    #[serde(default)]
    pub jobs: JobsConfig,
    /// HTTP API 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// Prometheus 메트릭 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl VulnscoutConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    /// 3. 유효성 검증
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, VulnscoutError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일이 없으면 기본값에 환경변수만 적용합니다.
    ///
    /// CLI처럼 설정 파일이 선택 사항인 실행 환경에서 사용합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, VulnscoutError> {
        match Self::from_file(path.as_ref()).await {
            Ok(mut config) => {
                config.apply_env_overrides();
                config.validate()?;
                Ok(config)
            }
            Err(VulnscoutError::Config(ConfigError::FileNotFound { .. })) => {
                let mut config = Self::default();
                config.apply_env_overrides();
                config.validate()?;
                Ok(config)
            }
            Err(e) => Err(e),
        }
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, VulnscoutError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                VulnscoutError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                VulnscoutError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, VulnscoutError> {
        toml::from_str(toml_str).map_err(|e| {
            VulnscoutError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `VULNSCOUT_{SECTION}_{FIELD}`
    /// 예: `VULNSCOUT_ADVISORY_OSV_URL=http://localhost:8080`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "VULNSCOUT_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "VULNSCOUT_GENERAL_LOG_FORMAT");

        // Registry
        override_string(&mut self.registry.pypi_url, "VULNSCOUT_REGISTRY_PYPI_URL");
        override_string(&mut self.registry.npm_url, "VULNSCOUT_REGISTRY_NPM_URL");
        override_string(&mut self.registry.maven_url, "VULNSCOUT_REGISTRY_MAVEN_URL");
        override_string(
            &mut self.registry.go_proxy_url,
            "VULNSCOUT_REGISTRY_GO_PROXY_URL",
        );
        override_string(
            &mut self.registry.rubygems_url,
            "VULNSCOUT_REGISTRY_RUBYGEMS_URL",
        );
        override_u64(
            &mut self.registry.http_timeout_secs,
            "VULNSCOUT_REGISTRY_HTTP_TIMEOUT_SECS",
        );
        override_usize(
            &mut self.registry.max_concurrency,
            "VULNSCOUT_REGISTRY_MAX_CONCURRENCY",
        );
        override_string(&mut self.registry.user_agent, "VULNSCOUT_REGISTRY_USER_AGENT");

        // Advisory
        override_string(&mut self.advisory.osv_url, "VULNSCOUT_ADVISORY_OSV_URL");
        override_u64(
            &mut self.advisory.timeout_secs,
            "VULNSCOUT_ADVISORY_TIMEOUT_SECS",
        );
        override_bool(
            &mut self.advisory.client_side_matching,
            "VULNSCOUT_ADVISORY_CLIENT_SIDE_MATCHING",
        );

        // Remediation
        override_string(
            &mut self.remediation.dataset_path,
            "VULNSCOUT_REMEDIATION_DATASET_PATH",
        );
        override_bool(
            &mut self.remediation.changelog_enabled,
            "VULNSCOUT_REMEDIATION_CHANGELOG_ENABLED",
        );
        override_string(
            &mut self.remediation.changelog_base_url,
            "VULNSCOUT_REMEDIATION_CHANGELOG_BASE_URL",
        );

        // Jobs
        override_u64(&mut self.jobs.ttl_secs, "VULNSCOUT_JOBS_TTL_SECS");
        override_u64(
            &mut self.jobs.sweep_interval_secs,
            "VULNSCOUT_JOBS_SWEEP_INTERVAL_SECS",
        );
        override_usize(&mut self.jobs.max_jobs, "VULNSCOUT_JOBS_MAX_JOBS");
        override_u64(
            &mut self.jobs.job_timeout_secs,
            "VULNSCOUT_JOBS_JOB_TIMEOUT_SECS",
        );
        override_usize(
            &mut self.jobs.progress_log_lines,
            "VULNSCOUT_JOBS_PROGRESS_LOG_LINES",
        );

        // Server
        override_string(&mut self.server.bind_addr, "VULNSCOUT_SERVER_BIND_ADDR");
        override_u16(&mut self.server.port, "VULNSCOUT_SERVER_PORT");
        override_u16(&mut self.server.https_port, "VULNSCOUT_SERVER_HTTPS_PORT");
        override_string(
            &mut self.server.tls_cert_path,
            "VULNSCOUT_SERVER_TLS_CERT_PATH",
        );
        override_string(&mut self.server.tls_key_path, "VULNSCOUT_SERVER_TLS_KEY_PATH");
        override_usize(
            &mut self.server.max_body_bytes,
            "VULNSCOUT_SERVER_MAX_BODY_BYTES",
        );
        override_csv(
            &mut self.server.cors_origins,
            "VULNSCOUT_SERVER_CORS_ORIGINS",
        );

        // Metrics
        override_bool(&mut self.metrics.enabled, "VULNSCOUT_METRICS_ENABLED");
        override_string(
            &mut self.metrics.listen_addr,
            "VULNSCOUT_METRICS_LISTEN_ADDR",
        );
        override_u16(&mut self.metrics.port, "VULNSCOUT_METRICS_PORT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), VulnscoutError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        // 외부 엔드포인트 URL 검증
        let urls = [
            ("registry.pypi_url", &self.registry.pypi_url),
            ("registry.npm_url", &self.registry.npm_url),
            ("registry.maven_url", &self.registry.maven_url),
            ("registry.go_proxy_url", &self.registry.go_proxy_url),
            ("registry.rubygems_url", &self.registry.rubygems_url),
            ("advisory.osv_url", &self.advisory.osv_url),
            (
                "remediation.changelog_base_url",
                &self.remediation.changelog_base_url,
            ),
        ];
        for (field, url) in urls {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(invalid(field, "must be an http(s) URL".to_owned()));
            }
        }

        let timeouts = [
            ("registry.http_timeout_secs", self.registry.http_timeout_secs),
            ("advisory.timeout_secs", self.advisory.timeout_secs),
            ("remediation.timeout_secs", self.remediation.timeout_secs),
            ("jobs.job_timeout_secs", self.jobs.job_timeout_secs),
        ];
        for (field, secs) in timeouts {
            if secs == 0 || secs > MAX_TIMEOUT_SECS {
                return Err(invalid(field, format!("must be 1-{MAX_TIMEOUT_SECS}")));
            }
        }

        if self.registry.max_concurrency == 0 || self.registry.max_concurrency > MAX_CONCURRENCY {
            return Err(invalid(
                "registry.max_concurrency",
                format!("must be 1-{MAX_CONCURRENCY}"),
            ));
        }

        if self.jobs.ttl_secs == 0 {
            return Err(invalid("jobs.ttl_secs", "must be greater than 0".to_owned()));
        }
        if self.jobs.sweep_interval_secs == 0 {
            return Err(invalid(
                "jobs.sweep_interval_secs",
                "must be greater than 0".to_owned(),
            ));
        }
        if self.jobs.max_jobs == 0 {
            return Err(invalid("jobs.max_jobs", "must be greater than 0".to_owned()));
        }
        if self.jobs.progress_log_lines == 0 {
            return Err(invalid(
                "jobs.progress_log_lines",
                "must be greater than 0".to_owned(),
            ));
        }

        if self.server.max_body_bytes == 0 {
            return Err(invalid(
                "server.max_body_bytes",
                "must be greater than 0".to_owned(),
            ));
        }

        if self.metrics.enabled && self.metrics.endpoint != "/metrics" {
            return Err(invalid(
                "metrics.endpoint",
                "only '/metrics' is supported".to_owned(),
            ));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: String) -> VulnscoutError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 패키지 레지스트리 설정
///
/// 테스트나 사내 미러를 위해 각 레지스트리의 기본 URL을 바꿀 수 있습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// PyPI JSON API 기본 URL
    pub pypi_url: String,
    /// npm 레지스트리 기본 URL
    pub npm_url: String,
    /// Maven 저장소 기본 URL
    pub maven_url: String,
    /// Go 모듈 프록시 기본 URL
    pub go_proxy_url: String,
    /// RubyGems 기본 URL
    pub rubygems_url: String,
    /// 레지스트리 요청별 타임아웃 (초)
    pub http_timeout_secs: u64,
    /// 같은 깊이의 노드를 동시에 조회하는 최대 개수
    pub max_concurrency: usize,
    /// HTTP User-Agent 헤더
    pub user_agent: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            pypi_url: "https://pypi.org".to_owned(),
            npm_url: "https://registry.npmjs.org".to_owned(),
            maven_url: "https://repo1.maven.org/maven2".to_owned(),
            go_proxy_url: "https://proxy.golang.org".to_owned(),
            rubygems_url: "https://rubygems.org".to_owned(),
            http_timeout_secs: 15,
            max_concurrency: 8,
            user_agent: concat!("vulnscout/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

/// 취약점 어드바이저리 서비스 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisoryConfig {
    /// OSV 호환 쿼리 API 기본 URL
    pub osv_url: String,
    /// 쿼리별 타임아웃 (초)
    pub timeout_secs: u64,
    /// 버전 없이 조회하고 영향 범위를 클라이언트에서 판정할지 여부
    ///
    /// 버전 사전 필터링을 하지 않는 미러를 쓸 때 켭니다.
    pub client_side_matching: bool,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            osv_url: "https://api.osv.dev".to_owned(),
            timeout_secs: 15,
            client_side_matching: false,
        }
    }
}

/// 업그레이드 권고 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemediationConfig {
    /// breaking change 데이터셋 경로 (비어 있으면 내장 데이터셋 사용)
    pub dataset_path: String,
    /// 체인지로그 조회 활성화 여부
    pub changelog_enabled: bool,
    /// 소스 호스팅 raw 콘텐츠 기본 URL
    pub changelog_base_url: String,
    /// 체인지로그 요청별 타임아웃 (초)
    pub timeout_secs: u64,
}

impl Default for RemediationConfig {
    fn default() -> Self {
        Self {
            dataset_path: String::new(),
            changelog_enabled: true,
            changelog_base_url: "https://raw.githubusercontent.com".to_owned(),
            timeout_secs: 10,
        }
    }
}

/// 스캔 작업 관리 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JobsConfig {
    /// 작업 보존 기간 (초)
    pub ttl_secs: u64,
    /// 만료 작업 정리 주기 (초)
    pub sweep_interval_secs: u64,
    /// 보존할 최대 작업 수
    pub max_jobs: usize,
    /// 작업 하나의 전체 타임아웃 (초)
    pub job_timeout_secs: u64,
    /// 진행 상황에 노출할 최근 로그 줄 수
    pub progress_log_lines: usize,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 30 * 60,
            sweep_interval_secs: 60,
            max_jobs: 500,
            job_timeout_secs: 600,
            progress_log_lines: 50,
        }
    }
}

/// HTTP API 서버 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인드 주소
    pub bind_addr: String,
    /// HTTP 포트
    pub port: u16,
    /// HTTPS 포트
    pub https_port: u16,
    /// TLS 인증서 PEM 경로
    pub tls_cert_path: String,
    /// TLS 개인키 PEM 경로
    pub tls_key_path: String,
    /// 요청 본문 최대 크기 (바이트)
    pub max_body_bytes: usize,
    /// 허용할 CORS origin 목록 (비어 있으면 모두 허용)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_owned(),
            port: 3000,
            https_port: 3443,
            tls_cert_path: String::new(),
            tls_key_path: String::new(),
            max_body_bytes: 5 * 1024 * 1024,
            cors_origins: Vec::new(),
        }
    }
}

/// Prometheus 메트릭 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 수신 주소
    pub listen_addr: String,
    /// 수신 포트
    pub port: u16,
    /// 스크랩 경로
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9100,
            endpoint: "/metrics".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u16(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_values() {
        let config = VulnscoutConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.jobs.ttl_secs, 1800);
        assert_eq!(config.jobs.sweep_interval_secs, 60);
        assert_eq!(config.advisory.osv_url, "https://api.osv.dev");
        assert!(!config.advisory.client_side_matching);
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn default_config_passes_validation() {
        let config = VulnscoutConfig::default();
        config.validate().unwrap();
    }

    #[test]
    fn from_str_empty_toml_uses_defaults() {
        let config = VulnscoutConfig::parse("").unwrap();
        assert_eq!(config.registry.npm_url, "https://registry.npmjs.org");
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn from_str_partial_toml_merges_with_defaults() {
        let toml = r#"
[registry]
npm_url = "http://localhost:4873"
max_concurrency = 4

[jobs]
ttl_secs = 600
"#;
        let config = VulnscoutConfig::parse(toml).unwrap();
        assert_eq!(config.registry.npm_url, "http://localhost:4873");
        assert_eq!(config.registry.max_concurrency, 4);
        // pypi_url은 기본값 유지
        assert_eq!(config.registry.pypi_url, "https://pypi.org");
        assert_eq!(config.jobs.ttl_secs, 600);
        assert_eq!(config.jobs.max_jobs, 500);
    }

    #[test]
    fn from_str_invalid_toml_returns_error() {
        let result = VulnscoutConfig::parse("invalid = [[[toml");
        assert!(matches!(
            result,
            Err(VulnscoutError::Config(ConfigError::ParseFailed { .. }))
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = VulnscoutConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_non_http_registry_url() {
        let mut config = VulnscoutConfig::default();
        config.registry.maven_url = "ftp://repo.example.com".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("registry.maven_url"));
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = VulnscoutConfig::default();
        config.advisory.timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("advisory.timeout_secs"));
    }

    #[test]
    fn validate_rejects_excessive_concurrency() {
        let mut config = VulnscoutConfig::default();
        config.registry.max_concurrency = 1000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_max_jobs() {
        let mut config = VulnscoutConfig::default();
        config.jobs.max_jobs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("jobs.max_jobs"));
    }

    #[test]
    fn validate_rejects_custom_metrics_endpoint_when_enabled() {
        let mut config = VulnscoutConfig::default();
        config.metrics.enabled = true;
        config.metrics.endpoint = "/stats".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_override_string() {
        let mut val = "original".to_owned();
        // SAFETY: 고유한 키만 사용하므로 다른 테스트와 충돌하지 않습니다.
        unsafe { std::env::set_var("TEST_VULNSCOUT_STR", "overridden") };
        override_string(&mut val, "TEST_VULNSCOUT_STR");
        assert_eq!(val, "overridden");
        unsafe { std::env::remove_var("TEST_VULNSCOUT_STR") };
    }

    #[test]
    fn env_override_bool_invalid_keeps_original() {
        let mut val = false;
        // SAFETY: 고유한 키만 사용하므로 다른 테스트와 충돌하지 않습니다.
        unsafe { std::env::set_var("TEST_VULNSCOUT_BOOL_BAD", "not-a-bool") };
        override_bool(&mut val, "TEST_VULNSCOUT_BOOL_BAD");
        assert!(!val);
        unsafe { std::env::remove_var("TEST_VULNSCOUT_BOOL_BAD") };
    }

    #[test]
    fn env_override_u16_valid() {
        let mut val = 3000u16;
        // SAFETY: 고유한 키만 사용하므로 다른 테스트와 충돌하지 않습니다.
        unsafe { std::env::set_var("TEST_VULNSCOUT_U16", "8080") };
        override_u16(&mut val, "TEST_VULNSCOUT_U16");
        assert_eq!(val, 8080);
        unsafe { std::env::remove_var("TEST_VULNSCOUT_U16") };
    }

    #[test]
    fn env_override_csv_skips_empty_entries() {
        let mut val = Vec::new();
        // SAFETY: 고유한 키만 사용하므로 다른 테스트와 충돌하지 않습니다.
        unsafe { std::env::set_var("TEST_VULNSCOUT_CSV", "https://a.example, ,https://b.example") };
        override_csv(&mut val, "TEST_VULNSCOUT_CSV");
        assert_eq!(val, vec!["https://a.example", "https://b.example"]);
        unsafe { std::env::remove_var("TEST_VULNSCOUT_CSV") };
    }

    #[test]
    fn env_override_missing_var_keeps_original() {
        let mut val = 42u64;
        override_u64(&mut val, "TEST_VULNSCOUT_NONEXISTENT_12345");
        assert_eq!(val, 42);
    }

    #[test]
    fn config_serialize_roundtrip() {
        let config = VulnscoutConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = VulnscoutConfig::parse(&toml_str).unwrap();
        assert_eq!(config.registry.go_proxy_url, parsed.registry.go_proxy_url);
        assert_eq!(config.jobs.max_jobs, parsed.jobs.max_jobs);
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let result = VulnscoutConfig::from_file("/nonexistent/path/vulnscout.toml").await;
        assert!(matches!(
            result,
            Err(VulnscoutError::Config(ConfigError::FileNotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn load_or_default_without_file_uses_defaults() {
        let config = VulnscoutConfig::load_or_default("/nonexistent/path/vulnscout.toml")
            .await
            .unwrap();
        assert_eq!(config.jobs.ttl_secs, 1800);
    }
}
