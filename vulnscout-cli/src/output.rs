//! Output formatting for reports and status payloads
//!
//! All stdout output flows through [`OutputWriter`]; progress and logs go to stderr.

use std::io::Write;

use colored::Colorize;
use serde::Serialize;
use vulnscout_core::types::Severity;
use vulnscout_engine::{ExportFormat, ScanReport, export};
use vulnscout_server::HealthResponse;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Writes CLI output in the selected format.
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render a scan report to stdout.
    pub fn render_report(&self, report: &ScanReport) -> Result<(), CliError> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.write_report(report, &mut handle)
    }

    /// Render a scan report to `w`.
    pub fn write_report(&self, report: &ScanReport, w: &mut dyn Write) -> Result<(), CliError> {
        let exported = match self.format {
            OutputFormat::Summary => {
                ReportSummary(report).render_text(w)?;
                return Ok(());
            }
            OutputFormat::Table => export(report, ExportFormat::Table)?,
            OutputFormat::Json => export(report, ExportFormat::Json)?,
            OutputFormat::Markdown => export(report, ExportFormat::Markdown)?,
            OutputFormat::Sarif => export(report, ExportFormat::Sarif)?,
        };
        w.write_all(exported.as_bytes())?;
        if !exported.ends_with('\n') {
            writeln!(w)?;
        }
        Ok(())
    }

    /// Render any payload to stdout: JSON for `json`, text otherwise.
    pub fn render<T: Render + Serialize>(&self, payload: &T) -> Result<(), CliError> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut handle, payload)?;
                writeln!(handle)?;
            }
            _ => payload.render_text(&mut handle)?,
        }
        Ok(())
    }
}

/// Human-readable text rendering.
pub trait Render {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()>;
}

/// Score, counts and upgrade hints of a report.
pub struct ReportSummary<'a>(pub &'a ScanReport);

impl Render for ReportSummary<'_> {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        let report = self.0;
        let summary = &report.summary;

        writeln!(w, "Target: {}", report.target.to_string().bold())?;

        let score = format!("{}/100", report.score);
        let score = match report.score {
            90..=100 => score.green().bold(),
            70..=89 => score.yellow().bold(),
            _ => score.red().bold(),
        };
        writeln!(w, "Score:  {score}")?;
        writeln!(w, "Dependencies: {}", report.dependencies.len())?;

        let counts = format!(
            "{} total (C:{} H:{} M:{} L:{})",
            summary.total, summary.critical, summary.high, summary.medium, summary.low
        );
        if summary.total > 0 {
            writeln!(w, "Vulnerabilities: {}", counts.red().bold())?;
        } else {
            writeln!(w, "Vulnerabilities: {}", counts.green().bold())?;
        }

        for rem in &report.remediations {
            let breaking = if rem.is_breaking {
                " (breaking)".yellow().to_string()
            } else {
                String::new()
            };
            writeln!(
                w,
                "  {} {} {} -> {}{}",
                severity_label(rem.risk_level),
                rem.package,
                rem.current_version,
                rem.target_version,
                breaking
            )?;
        }

        if !report.unresolved.is_empty() {
            writeln!(
                w,
                "{}",
                format!("{} dependencies could not be resolved", report.unresolved.len()).dimmed()
            )?;
        }
        Ok(())
    }
}

fn severity_label(severity: Severity) -> colored::ColoredString {
    let label = format!("[{severity}]");
    match severity {
        Severity::Critical => label.red().bold(),
        Severity::High => label.red(),
        Severity::Medium => label.yellow(),
        Severity::Low => label.normal(),
    }
}

impl Render for HealthResponse {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        let status = if self.is_ok() {
            self.status.green().bold()
        } else {
            self.status.red().bold()
        };
        writeln!(w, "Status:  {status}")?;
        writeln!(w, "Version: {}", self.version)?;
        writeln!(w, "Uptime:  {}s", self.uptime_secs)?;
        writeln!(w, "Jobs:    {}", self.jobs)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// express@4.17.1 with one critical finding in qs
    fn report() -> ScanReport {
        serde_json::from_value(serde_json::json!({
            "id": "job-1",
            "target": { "ecosystem": "npm", "package": "express", "version": "4.17.1" },
            "scannedAt": "2026-01-01T00:00:00Z",
            "score": 75,
            "summary": { "critical": 1, "high": 0, "medium": 0, "low": 0, "total": 1 },
            "dependencies": [
                { "name": "express", "version": "4.17.1", "ecosystem": "npm", "direct": true, "vulnerabilityCount": 0 },
                { "name": "qs", "version": "6.7.0", "ecosystem": "npm", "direct": false,
                  "parent": "express", "vulnerabilityCount": 1, "maxSeverity": "critical" }
            ],
            "vulnerabilities": [{
                "id": "GHSA-hrpp-h998-j3pp",
                "severity": "critical",
                "cvss": 9.8,
                "package": "qs",
                "installedVersion": "6.7.0",
                "fixedVersion": "6.7.3",
                "description": "qs prototype pollution",
                "references": []
            }],
            "remediations": [{
                "id": "REM-001",
                "package": "qs",
                "ecosystem": "npm",
                "currentVersion": "6.7.0",
                "targetVersion": "6.7.3",
                "vulnerabilitiesFixed": ["GHSA-hrpp-h998-j3pp"],
                "riskLevel": "critical",
                "isBreaking": false
            }]
        }))
        .expect("fixture should deserialize")
    }

    fn render(format: OutputFormat) -> String {
        colored::control::set_override(false);
        let mut buffer = Vec::new();
        OutputWriter::new(format)
            .write_report(&report(), &mut buffer)
            .expect("rendering should succeed");
        String::from_utf8(buffer).expect("valid UTF-8")
    }

    #[test]
    fn test_summary_output() {
        let output = render(OutputFormat::Summary);
        assert!(output.contains("Target: express@4.17.1 (npm)"), "{output}");
        assert!(output.contains("Score:  75/100"));
        assert!(output.contains("Dependencies: 2"));
        assert!(output.contains("1 total (C:1 H:0 M:0 L:0)"));
        assert!(output.contains("[Critical] qs 6.7.0 -> 6.7.3"));
    }

    #[test]
    fn test_json_output_is_the_report() {
        let output = render(OutputFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&output).expect("valid JSON");
        assert_eq!(parsed["id"], "job-1");
        assert_eq!(parsed["score"], 75);
    }

    #[test]
    fn test_table_and_sarif_outputs() {
        let table = render(OutputFormat::Table);
        assert!(table.contains("GHSA-hrpp-h998-j3pp"));
        assert!(table.ends_with('\n'));

        let sarif: serde_json::Value =
            serde_json::from_str(&render(OutputFormat::Sarif)).expect("valid SARIF JSON");
        assert_eq!(sarif["version"], "2.1.0");
    }

    #[test]
    fn test_health_text() {
        colored::control::set_override(false);
        let mut buffer = Vec::new();
        HealthResponse::ok(42, 3)
            .render_text(&mut buffer)
            .expect("text rendering should succeed");
        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("Status:  ok"));
        assert!(output.contains("Uptime:  42s"));
        assert!(output.contains("Jobs:    3"));
    }
}
