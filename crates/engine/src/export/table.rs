//! 평문 표 내보내기

use crate::types::ScanReport;

const HEADERS: [&str; 5] = ["ID", "SEVERITY", "PACKAGE", "INSTALLED", "FIXED"];

/// 보고서를 고정폭 평문 표로 렌더링합니다.
pub fn generate(report: &ScanReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("Target: {}\n", report.target));
    out.push_str(&format!("Score:  {}/100\n", report.score));
    out.push_str(&format!(
        "Found:  {} vulnerabilities ({} critical, {} high, {} medium, {} low) in {} dependencies\n",
        report.summary.total,
        report.summary.critical,
        report.summary.high,
        report.summary.medium,
        report.summary.low,
        report.dependencies.len(),
    ));

    if !report.vulnerabilities.is_empty() {
        let rows: Vec<[String; 5]> = report
            .vulnerabilities
            .iter()
            .map(|v| {
                [
                    v.id.clone(),
                    v.severity.to_string(),
                    v.package.clone(),
                    v.installed_version.clone(),
                    v.fixed_version.clone().unwrap_or_else(|| "-".to_owned()),
                ]
            })
            .collect();
        out.push('\n');
        render(&mut out, &HEADERS, &rows);
    }

    if !report.remediations.is_empty() {
        let rows: Vec<[String; 4]> = report
            .remediations
            .iter()
            .map(|r| {
                [
                    r.package.clone(),
                    format!("{} -> {}", r.current_version, r.target_version),
                    r.risk_level.to_string(),
                    if r.is_breaking { "yes" } else { "no" }.to_owned(),
                ]
            })
            .collect();
        out.push('\n');
        render(&mut out, &["PACKAGE", "UPGRADE", "RISK", "BREAKING"], &rows);
    }

    if !report.unresolved.is_empty() {
        out.push_str(&format!("\nUnresolved: {} dependencies\n", report.unresolved.len()));
        for node in &report.unresolved {
            out.push_str(&format!("  {}: {}\n", node.package, node.reason));
        }
    }

    out
}

fn render<const N: usize>(out: &mut String, headers: &[&str; N], rows: &[[String; N]]) {
    let mut widths = headers.map(str::len);
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(c, w)| format!("{c:<w$}"))
            .collect();
        format!("{}\n", padded.join("  ").trim_end())
    };

    out.push_str(&line(headers.to_vec()));
    let separators: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&line(separators.iter().map(String::as_str).collect()));
    for row in rows {
        out.push_str(&line(row.iter().map(String::as_str).collect()));
    }
}
