//! 에러 타입: 도메인별 에러 정의

/// vulnscout 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum VulnscoutError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 스캔 처리 에러
    #[error("scan error: {0}")]
    Scan(#[from] ScanFailure),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 스캔 처리 에러
///
/// 엔진 크레이트의 세부 에러는 이 분류로 축약되어 상위로 전파됩니다.
#[derive(Debug, thiserror::Error)]
pub enum ScanFailure {
    /// 매니페스트를 인식하지 못했거나 내용이 잘못됨
    #[error("manifest error: {0}")]
    ManifestParse(String),

    /// 요청 값 검증 실패 (생태계, 형식, 필수 필드)
    #[error("validation error: {0}")]
    Validation(String),

    /// 스캔 실행 중 실패 (타임아웃 포함)
    #[error("execution error: {0}")]
    Execution(String),
}

impl ScanFailure {
    /// 작업 시작 전에 거부된 에러인지 여부
    ///
    /// HTTP 계층은 이 값으로 4xx/5xx를 구분합니다.
    pub fn is_preflight(&self) -> bool {
        matches!(self, Self::ManifestParse(_) | Self::Validation(_))
    }
}
