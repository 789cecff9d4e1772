//! 보고서 내보내기
//!
//! 완료된 [`ScanReport`]를 외부 호출 없이 문자열로 직렬화합니다.
//!
//! - [`json`]: 구조 그대로의 JSON (camelCase)
//! - [`markdown`]: 요약, 취약점별 섹션, 권고 표
//! - [`sarif`]: SARIF 2.1.0 (코드 리뷰/보안 도구 연동)
//! - [`table`]: 터미널용 평문 표

pub mod json;
pub mod markdown;
pub mod sarif;
pub mod table;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ScanError;
use crate::types::ScanReport;

/// 내보내기 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// JSON
    Json,
    /// Markdown
    Markdown,
    /// SARIF 2.1.0 JSON
    Sarif,
    /// 평문 표
    Table,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Markdown => write!(f, "markdown"),
            Self::Sarif => write!(f, "sarif"),
            Self::Table => write!(f, "table"),
        }
    }
}

impl ExportFormat {
    /// 문자열에서 형식을 파싱합니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "markdown" | "md" => Some(Self::Markdown),
            "sarif" => Some(Self::Sarif),
            "table" | "text" | "txt" => Some(Self::Table),
            _ => None,
        }
    }

    /// HTTP 응답 Content-Type
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Markdown => "text/markdown; charset=utf-8",
            Self::Sarif => "application/sarif+json",
            Self::Table => "text/plain; charset=utf-8",
        }
    }

    /// 다운로드 파일 확장자
    pub fn file_extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "md",
            Self::Sarif => "sarif",
            Self::Table => "txt",
        }
    }
}

/// 보고서를 지정한 형식으로 직렬화합니다.
pub fn export(report: &ScanReport, format: ExportFormat) -> Result<String, ScanError> {
    match format {
        ExportFormat::Json => json::generate(report),
        ExportFormat::Markdown => Ok(markdown::generate(report)),
        ExportFormat::Sarif => sarif::generate(report),
        ExportFormat::Table => Ok(table::generate(report)),
    }
}
