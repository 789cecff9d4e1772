//! JSON 내보내기

use crate::error::ScanError;
use crate::types::ScanReport;

/// 보고서를 들여쓰기된 JSON으로 직렬화합니다.
pub fn generate(report: &ScanReport) -> Result<String, ScanError> {
    serde_json::to_string_pretty(report)
        .map_err(|e| ScanError::Export(format!("JSON serialization failed: {e}")))
}
