//! CLI-specific error types and exit code mapping

use vulnscout_core::error::VulnscoutError;
use vulnscout_engine::ScanError;

/// CLI-specific error type.
///
/// `exit_code()` separates "the scan found something" from "the scan could not run".
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The report contains critical or high severity vulnerabilities.
    #[error("found {critical} critical and {high} high severity vulnerabilities")]
    Findings { critical: usize, high: usize },

    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// The scan job ended in the error state.
    #[error("scan failed: {0}")]
    ScanFailed(String),

    /// The scan did not finish within `--timeout`.
    #[error("scan did not finish within {0}s")]
    Timeout(u64),

    /// The remote server could not be reached or rejected the request.
    #[error("server error: {0}")]
    Remote(String),

    /// `/health` answered with a non-ok status.
    #[error("server unhealthy: status '{0}'")]
    Unhealthy(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from vulnscout-core.
    #[error("{0}")]
    Core(#[from] VulnscoutError),

    /// Scan engine error.
    #[error("{0}")]
    Scan(#[from] ScanError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                   |
    /// |------|-------------------------------------------|
    /// | 0    | Success, no critical/high findings        |
    /// | 1    | Critical or high vulnerabilities present  |
    /// | 2    | Operational failure                       |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Findings { .. } => 1,
            _ => 2,
        }
    }
}

impl From<reqwest::Error> for CliError {
    fn from(e: reqwest::Error) -> Self {
        Self::Remote(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_findings() {
        let err = CliError::Findings {
            critical: 1,
            high: 0,
        };
        assert_eq!(err.exit_code(), 1, "findings should return exit code 1");
    }

    #[test]
    fn test_exit_code_operational_errors() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let errors = [
            CliError::Config("bad toml".to_owned()),
            CliError::Command("unknown ecosystem".to_owned()),
            CliError::ScanFailed("scan task panicked".to_owned()),
            CliError::Timeout(30),
            CliError::Remote("connection refused".to_owned()),
            CliError::Unhealthy("degraded".to_owned()),
            CliError::Io(io_err),
            CliError::Scan(ScanError::validation("package", "must not be empty")),
        ];
        for err in errors {
            assert_eq!(err.exit_code(), 2, "{err} should return exit code 2");
        }
    }

    #[test]
    fn test_error_display_findings() {
        let err = CliError::Findings {
            critical: 2,
            high: 3,
        };
        assert_eq!(
            err.to_string(),
            "found 2 critical and 3 high severity vulnerabilities"
        );
    }

    #[test]
    fn test_from_core_error() {
        use vulnscout_core::error::ConfigError;
        let core_err = VulnscoutError::Config(ConfigError::FileNotFound {
            path: "vulnscout.toml".to_owned(),
        });
        let cli_err: CliError = core_err.into();
        assert!(matches!(cli_err, CliError::Core(_)));
        assert_eq!(cli_err.exit_code(), 2);
    }
}
