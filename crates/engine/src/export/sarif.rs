//! SARIF 2.1.0 내보내기
//!
//! [SARIF](https://docs.oasis-open.org/sarif/sarif/v2.1.0/sarif-v2.1.0.html) 2.1.0 문서를 생성합니다.
//!
//! - 규칙(rule): 고유한 취약점 ID마다 하나
//! - 결과(result): 취약점 항목마다 하나
//! - 레벨: critical/high -> `error`, medium -> `warning`, low -> `note`
//! - `security-severity`: CVSS 점수, 없으면 심각도별 기본값

use std::collections::HashMap;

use serde::Serialize;
use vulnscout_core::types::Severity;

use crate::error::ScanError;
use crate::types::{ScanReport, Vulnerability};

const SARIF_SCHEMA: &str = "https://json.schemastore.org/sarif-2.1.0.json";
const SARIF_VERSION: &str = "2.1.0";
const TOOL_NAME: &str = "vulnscout";
const TOOL_URI: &str = "https://github.com/vulnscout/vulnscout";
const FINGERPRINT_KEY: &str = "vulnscout/v1";

#[derive(Serialize)]
struct SarifLog {
    #[serde(rename = "$schema")]
    schema: &'static str,
    version: &'static str,
    runs: Vec<SarifRun>,
}

#[derive(Serialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Serialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifDriver {
    name: &'static str,
    version: &'static str,
    information_uri: &'static str,
    rules: Vec<SarifRule>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRule {
    id: String,
    name: String,
    short_description: SarifMessage,
    #[serde(skip_serializing_if = "Option::is_none")]
    help_uri: Option<String>,
    default_configuration: SarifConfiguration,
    properties: SarifRuleProperties,
}

#[derive(Serialize)]
struct SarifConfiguration {
    level: &'static str,
}

#[derive(Serialize)]
struct SarifRuleProperties {
    #[serde(rename = "security-severity")]
    security_severity: String,
    tags: Vec<String>,
}

#[derive(Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifResult {
    rule_id: String,
    rule_index: usize,
    level: &'static str,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
    partial_fingerprints: HashMap<&'static str, String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifLocation {
    logical_locations: Vec<SarifLogicalLocation>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifLogicalLocation {
    fully_qualified_name: String,
    kind: &'static str,
}

/// 심각도에 대응하는 SARIF 레벨
pub fn level(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical | Severity::High => "error",
        Severity::Medium => "warning",
        Severity::Low => "note",
    }
}

/// CVSS 점수가 없을 때 사용하는 `security-severity` 기본값
pub fn default_security_severity(severity: Severity) -> f64 {
    match severity {
        Severity::Critical => 9.5,
        Severity::High => 8.0,
        Severity::Medium => 5.5,
        Severity::Low => 2.0,
    }
}

/// 보고서에서 SARIF 2.1.0 JSON을 생성합니다.
pub fn generate(report: &ScanReport) -> Result<String, ScanError> {
    let mut rule_index: HashMap<&str, usize> = HashMap::new();
    let mut rules = Vec::new();
    for vuln in &report.vulnerabilities {
        if rule_index.contains_key(vuln.id.as_str()) {
            continue;
        }
        rule_index.insert(&vuln.id, rules.len());
        rules.push(rule(vuln));
    }

    let results = report
        .vulnerabilities
        .iter()
        .map(|vuln| {
            let ecosystem = report
                .dependencies
                .iter()
                .find(|d| d.name == vuln.package)
                .map_or(report.target.ecosystem, |d| d.ecosystem);
            let coordinate = format!("{}@{}", vuln.package, vuln.installed_version);
            let message = match &vuln.fixed_version {
                Some(fixed) => format!(
                    "{coordinate} is affected by {} ({}). Upgrade to {fixed}.",
                    vuln.id, vuln.severity
                ),
                None => format!(
                    "{coordinate} is affected by {} ({}). No fixed version is available.",
                    vuln.id, vuln.severity
                ),
            };

            SarifResult {
                rule_id: vuln.id.clone(),
                rule_index: rule_index.get(vuln.id.as_str()).copied().unwrap_or_default(),
                level: level(vuln.severity),
                message: SarifMessage { text: message },
                locations: vec![SarifLocation {
                    logical_locations: vec![SarifLogicalLocation {
                        fully_qualified_name: format!("{}:{coordinate}", ecosystem.as_str()),
                        kind: "package",
                    }],
                }],
                partial_fingerprints: HashMap::from([(
                    FINGERPRINT_KEY,
                    format!("{}:{coordinate}", vuln.id),
                )]),
            }
        })
        .collect();

    let log = SarifLog {
        schema: SARIF_SCHEMA,
        version: SARIF_VERSION,
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: TOOL_NAME,
                    version: env!("CARGO_PKG_VERSION"),
                    information_uri: TOOL_URI,
                    rules,
                },
            },
            results,
        }],
    };

    serde_json::to_string_pretty(&log)
        .map_err(|e| ScanError::Export(format!("SARIF serialization failed: {e}")))
}

fn rule(vuln: &Vulnerability) -> SarifRule {
    let score = vuln
        .cvss
        .unwrap_or_else(|| default_security_severity(vuln.severity));
    let description = if vuln.description.is_empty() {
        vuln.id.clone()
    } else {
        vuln.description.clone()
    };

    SarifRule {
        id: vuln.id.clone(),
        name: vuln.id.clone(),
        short_description: SarifMessage { text: description },
        help_uri: vuln.references.first().cloned(),
        default_configuration: SarifConfiguration {
            level: level(vuln.severity),
        },
        properties: SarifRuleProperties {
            security_severity: format!("{score:.1}"),
            tags: vec!["security".to_owned(), vuln.severity.as_str().to_owned()],
        },
    }
}
