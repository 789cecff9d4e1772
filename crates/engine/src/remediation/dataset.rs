//! 큐레이션된 breaking change 데이터셋
//!
//! 기본 데이터셋은 `data/breaking_changes.json`을 바이너리에 포함합니다.
//! `remediation.dataset_path`를 지정하면 해당 파일로 교체합니다.
//!
//! 조회 키는 `(생태계, 패키지, 대상 버전)`이며, 정확히 일치하는 항목이 없으면
//! 같은 메이저 버전의 항목을 사용합니다. 패키지 이름은 대소문자를 구분하지 않습니다.

use std::path::Path;

use serde::Deserialize;

use crate::error::ScanError;
use crate::types::Ecosystem;
use crate::version::{compare_versions, major_component};

const EMBEDDED_DATASET: &str = include_str!("../../data/breaking_changes.json");

/// 데이터셋 항목
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetEntry {
    /// 생태계
    pub ecosystem: Ecosystem,
    /// 패키지 이름
    pub package: String,
    /// breaking change가 도입된 버전
    pub version: String,
    /// 변경 내용
    #[serde(default)]
    pub changes: Vec<String>,
    /// 마이그레이션 가이드
    #[serde(default)]
    pub migration_guide_url: Option<String>,
}

#[derive(Deserialize)]
struct DatasetFile {
    #[serde(default)]
    entries: Vec<DatasetEntry>,
}

/// breaking change 데이터셋
#[derive(Debug, Clone, Default)]
pub struct BreakingChangeDataset {
    entries: Vec<DatasetEntry>,
}

impl BreakingChangeDataset {
    /// 바이너리에 포함된 기본 데이터셋을 로드합니다.
    pub fn embedded() -> Result<Self, ScanError> {
        Self::parse(EMBEDDED_DATASET, "embedded")
    }

    /// 파일에서 데이터셋을 로드합니다.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ScanError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ScanError::Config {
                field: "remediation.dataset_path".to_owned(),
                reason: format!("{}: {e}", path.display()),
            })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// JSON 문자열에서 데이터셋을 파싱합니다.
    pub fn parse(json: &str, source: &str) -> Result<Self, ScanError> {
        let file: DatasetFile = serde_json::from_str(json).map_err(|e| ScanError::Config {
            field: "remediation.dataset_path".to_owned(),
            reason: format!("{source}: {e}"),
        })?;
        Ok(Self {
            entries: file.entries,
        })
    }

    /// 항목 목록으로 데이터셋을 만듭니다.
    pub fn from_entries(entries: Vec<DatasetEntry>) -> Self {
        Self { entries }
    }

    /// 항목 수
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 대상 버전에 해당하는 항목을 찾습니다.
    pub fn lookup(
        &self,
        ecosystem: Ecosystem,
        package: &str,
        target_version: &str,
    ) -> Option<&DatasetEntry> {
        let mut candidates = self
            .entries
            .iter()
            .filter(|e| e.ecosystem == ecosystem && e.package.eq_ignore_ascii_case(package));

        let exact = candidates
            .clone()
            .find(|e| compare_versions(&e.version, target_version).is_eq());
        if exact.is_some() {
            return exact;
        }

        let major = major_component(target_version)?;
        candidates.find(|e| major_component(&e.version) == Some(major))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_dataset_loads() {
        let dataset = BreakingChangeDataset::embedded().unwrap();
        assert!(!dataset.is_empty());
        let entry = dataset.lookup(Ecosystem::Npm, "express", "5.0.0").unwrap();
        assert!(entry.migration_guide_url.is_some());
        assert!(!entry.changes.is_empty());
    }

    #[test]
    fn lookup_falls_back_to_same_major() {
        let dataset = BreakingChangeDataset::embedded().unwrap();
        let entry = dataset.lookup(Ecosystem::PyPi, "Django", "4.2.7").unwrap();
        assert_eq!(entry.version, "4.0.0");
        assert!(dataset.lookup(Ecosystem::PyPi, "django", "5.0.0").is_none());
    }

    #[test]
    fn lookup_is_scoped_by_ecosystem() {
        let dataset = BreakingChangeDataset::embedded().unwrap();
        assert!(dataset.lookup(Ecosystem::RubyGems, "express", "5.0.0").is_none());
    }

    #[test]
    fn exact_match_wins_over_major() {
        let dataset = BreakingChangeDataset::from_entries(vec![
            DatasetEntry {
                ecosystem: Ecosystem::Npm,
                package: "pkg".to_owned(),
                version: "2.0.0".to_owned(),
                changes: vec!["major".to_owned()],
                migration_guide_url: None,
            },
            DatasetEntry {
                ecosystem: Ecosystem::Npm,
                package: "pkg".to_owned(),
                version: "2.1.0".to_owned(),
                changes: vec!["minor".to_owned()],
                migration_guide_url: None,
            },
        ]);
        assert_eq!(
            dataset.lookup(Ecosystem::Npm, "pkg", "2.1").unwrap().changes,
            vec!["minor"]
        );
        assert_eq!(
            dataset.lookup(Ecosystem::Npm, "pkg", "2.5.0").unwrap().changes,
            vec!["major"]
        );
    }

    #[test]
    fn invalid_dataset_is_config_error() {
        let err = BreakingChangeDataset::parse("{not json", "test.json").unwrap_err();
        assert!(matches!(err, ScanError::Config { .. }));
    }

    #[tokio::test]
    async fn dataset_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.json");
        tokio::fs::write(
            &path,
            r#"{"entries":[{"ecosystem":"go","package":"github.com/x/y","version":"2.0.0","changes":["api renamed"]}]}"#,
        )
        .await
        .unwrap();
        let dataset = BreakingChangeDataset::from_file(&path).await.unwrap();
        assert_eq!(dataset.len(), 1);

        let missing = BreakingChangeDataset::from_file(dir.path().join("nope.json")).await;
        assert!(missing.is_err());
    }
}
