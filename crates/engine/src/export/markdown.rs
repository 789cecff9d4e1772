//! Markdown 내보내기

use vulnscout_core::types::Severity;

use crate::types::ScanReport;

/// 보고서를 Markdown 문서로 렌더링합니다.
pub fn generate(report: &ScanReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("# Vulnerability Report: {}\n\n", report.target));
    out.push_str(&format!("- **Scan ID**: `{}`\n", report.id));
    out.push_str(&format!(
        "- **Scanned at**: {}\n",
        report.scanned_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!("- **Security score**: {}/100\n", report.score));
    out.push_str(&format!("- **Dependencies**: {}\n\n", report.dependencies.len()));

    out.push_str("## Summary\n\n");
    out.push_str("| Severity | Count |\n|----------|-------|\n");
    for severity in Severity::ALL_DESC {
        out.push_str(&format!("| {severity} | {} |\n", report.summary.get(severity)));
    }
    out.push_str(&format!("| **Total** | **{}** |\n\n", report.summary.total));

    out.push_str("## Vulnerabilities\n\n");
    if report.vulnerabilities.is_empty() {
        out.push_str("No known vulnerabilities found.\n\n");
    }
    for vuln in &report.vulnerabilities {
        out.push_str(&format!("### {} ({})\n\n", vuln.id, vuln.severity));
        out.push_str(&format!(
            "- **Package**: `{}@{}`\n",
            vuln.package, vuln.installed_version
        ));
        if let Some(cvss) = vuln.cvss {
            out.push_str(&format!("- **CVSS**: {cvss:.1}\n"));
        }
        match &vuln.fixed_version {
            Some(fixed) => out.push_str(&format!("- **Fixed in**: `{fixed}`\n")),
            None => out.push_str("- **Fixed in**: _no fix available_\n"),
        }
        if !vuln.aliases.is_empty() {
            out.push_str(&format!("- **Aliases**: {}\n", vuln.aliases.join(", ")));
        }
        if !vuln.description.is_empty() {
            out.push_str(&format!("\n{}\n", vuln.description));
        }
        if !vuln.references.is_empty() {
            out.push_str("\n**References**\n\n");
            for url in &vuln.references {
                out.push_str(&format!("- <{url}>\n"));
            }
        }
        out.push('\n');
    }

    if !report.remediations.is_empty() {
        out.push_str("## Remediations\n\n");
        out.push_str("| Package | Current | Target | Risk | Breaking | Fixes |\n");
        out.push_str("|---------|---------|--------|------|----------|-------|\n");
        for rem in &report.remediations {
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                cell(&rem.package),
                cell(&rem.current_version),
                cell(&rem.target_version),
                rem.risk_level,
                if rem.is_breaking { "yes" } else { "no" },
                cell(&rem.vulnerabilities_fixed.join(", ")),
            ));
        }
        out.push('\n');

        for rem in report.remediations.iter().filter(|r| r.is_breaking) {
            out.push_str(&format!(
                "### Breaking upgrade: {} {} -> {}\n\n",
                rem.package, rem.current_version, rem.target_version
            ));
            for change in &rem.breaking_changes {
                out.push_str(&format!("- {}\n", change.description));
            }
            if let Some(url) = &rem.migration_guide_url {
                out.push_str(&format!("\nMigration guide: <{url}>\n"));
            }
            out.push('\n');
        }
    }

    if !report.unresolved.is_empty() {
        out.push_str("## Unresolved Dependencies\n\n");
        for node in &report.unresolved {
            let version = node.version.as_deref().unwrap_or("latest");
            out.push_str(&format!("- `{}@{version}`: {}\n", node.package, node.reason));
        }
        out.push('\n');
    }

    out
}

/// 표 셀 안의 `|`와 줄바꿈을 이스케이프합니다.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::fixture::sample_report;
    use crate::types::UnresolvedNode;

    #[test]
    fn markdown_sections() {
        let md = generate(&sample_report());
        assert!(md.starts_with("# Vulnerability Report: express@4.17.1 (npm)"));
        assert!(md.contains("| Critical | 1 |"));
        assert!(md.contains("| **Total** | **3** |"));
        assert!(md.contains("### GHSA-jf85-cpcp-j695 (Critical)"));
        assert!(md.contains("- **CVSS**: 9.1"));
        assert!(md.contains("- **Aliases**: CVE-2019-10744"));
        assert!(md.contains("_no fix available_"));
        assert!(md.contains("| lodash | 4.17.15 | 4.17.21 | Critical | no | GHSA-jf85-cpcp-j695 |"));
        assert!(!md.contains("## Unresolved"));
    }

    #[test]
    fn markdown_lists_unresolved_nodes() {
        let mut report = sample_report();
        report.unresolved.push(UnresolvedNode {
            package: "left-pad".to_owned(),
            version: None,
            parent: Some("express".to_owned()),
            reason: "HTTP 404".to_owned(),
        });
        let md = generate(&report);
        assert!(md.contains("- `left-pad@latest`: HTTP 404"));
    }

    #[test]
    fn clean_report() {
        let mut report = sample_report();
        report.vulnerabilities.clear();
        report.remediations.clear();
        let md = generate(&report);
        assert!(md.contains("No known vulnerabilities found."));
        assert!(!md.contains("## Remediations"));
    }

    #[test]
    fn cell_escapes_pipes() {
        assert_eq!(cell("a|b\nc"), "a\\|b c");
    }
}
