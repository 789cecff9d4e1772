//! Command handlers -- one module per subcommand

pub mod file;
pub mod health;
pub mod scan;
pub mod server;

use std::time::Duration;

use vulnscout_core::VulnscoutConfig;
use vulnscout_engine::{ScanReport, ScanRequest};

use crate::backend::{LocalBackend, POLL_INTERVAL, RemoteBackend, run_scan};
use crate::cli::RunArgs;
use crate::error::CliError;
use crate::output::OutputWriter;

/// Run `request` locally or against `--server`, print the report, and
/// turn critical/high findings into [`CliError::Findings`].
pub(crate) async fn run_and_render(
    request: ScanRequest,
    run: &RunArgs,
    config: &VulnscoutConfig,
) -> Result<(), CliError> {
    let timeout = Duration::from_secs(run.timeout);

    let report = match &run.server {
        Some(url) => {
            tracing::info!(server = %url, kind = request.kind(), "submitting scan to server");
            let backend = RemoteBackend::new(url, timeout)?;
            run_scan(&backend, request, timeout, run.verbose, POLL_INTERVAL).await?
        }
        None => {
            tracing::info!(kind = request.kind(), "running scan in-process");
            let manager = vulnscout_server::build_manager(config)
                .await
                .map_err(|e| CliError::Config(format!("{e:#}")))?;
            let backend = LocalBackend::new(manager);
            run_scan(&backend, request, timeout, run.verbose, POLL_INTERVAL).await?
        }
    };

    OutputWriter::new(run.output).render_report(&report)?;
    check_findings(&report)
}

fn check_findings(report: &ScanReport) -> Result<(), CliError> {
    if report.summary.has_critical_or_high() {
        return Err(CliError::Findings {
            critical: report.summary.critical,
            high: report.summary.high,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use vulnscout_engine::{Ecosystem, ScanTarget, SeverityCounts};

    use super::*;

    fn report_with(summary: SeverityCounts) -> ScanReport {
        ScanReport {
            id: "r".to_owned(),
            target: ScanTarget {
                ecosystem: Ecosystem::Go,
                package: Some("golang.org/x/text".to_owned()),
                version: None,
                file_name: None,
            },
            scanned_at: "2026-01-01T00:00:00Z".parse().unwrap(),
            score: 100,
            summary,
            dependencies: vec![],
            vulnerabilities: vec![],
            remediations: vec![],
            unresolved: vec![],
        }
    }

    #[test]
    fn medium_and_low_findings_exit_clean() {
        let summary = SeverityCounts {
            medium: 3,
            low: 5,
            total: 8,
            ..SeverityCounts::default()
        };
        assert!(check_findings(&report_with(summary)).is_ok());
    }

    #[test]
    fn high_findings_exit_one() {
        let summary = SeverityCounts {
            high: 2,
            total: 2,
            ..SeverityCounts::default()
        };
        let err = check_findings(&report_with(summary)).unwrap_err();
        assert_eq!(err.exit_code(), 1);
        assert!(matches!(err, CliError::Findings { critical: 0, high: 2 }));
    }
}
