//! 업그레이드 권고 생성
//!
//! 취약점을 패키지별로 묶어(처음 등장한 순서) 수정 버전이 있는 패키지마다 권고를 하나 만듭니다.
//!
//! - 대상 버전: 수정 버전 중 의미론적으로 가장 높은 버전
//! - 위험도: 패키지 취약점 중 최고 심각도
//! - breaking 판정: 현재 버전과 대상 버전의 선행 숫자 컴포넌트가 다르면 breaking
//!
//! breaking 업그레이드는 두 단계로 보강합니다.
//!
//! 1. [`dataset::BreakingChangeDataset`]에서 `(생태계, 패키지, 대상 버전)` 조회
//! 2. 데이터셋에 없으면 [`changelog::ChangelogClient`]로 저장소 체인지로그 조회
//!
//! 두 단계 모두 실패해도 권고 자체는 생성됩니다.

pub mod changelog;
pub mod dataset;

use std::collections::HashMap;

use tracing::debug;

use crate::config::EngineConfig;
use crate::error::ScanError;
use crate::types::{BreakingChange, BreakingChangeSource, Dependency, Remediation, Vulnerability};
use crate::version::{major_component, max_version};

use self::changelog::ChangelogClient;
use self::dataset::BreakingChangeDataset;

/// 업그레이드 권고 엔진
pub struct RemediationEngine {
    dataset: BreakingChangeDataset,
    changelog: Option<ChangelogClient>,
}

impl RemediationEngine {
    /// 데이터셋과 (선택적) 체인지로그 클라이언트로 엔진을 생성합니다.
    pub fn new(dataset: BreakingChangeDataset, changelog: Option<ChangelogClient>) -> Self {
        Self { dataset, changelog }
    }

    /// 설정에 따라 데이터셋을 로드하고 엔진을 생성합니다.
    ///
    /// `dataset_path`가 없으면 내장 데이터셋을, `changelog_enabled`가 false면
    /// 체인지로그 조회 없이 동작합니다.
    pub async fn from_config(config: &EngineConfig) -> Result<Self, ScanError> {
        let dataset = match &config.dataset_path {
            Some(path) => BreakingChangeDataset::from_file(path).await?,
            None => BreakingChangeDataset::embedded()?,
        };
        let changelog = if config.changelog_enabled {
            Some(ChangelogClient::new(config)?)
        } else {
            None
        };
        Ok(Self::new(dataset, changelog))
    }

    /// 취약점과 의존성 목록으로 권고를 생성합니다.
    pub async fn generate(
        &self,
        vulnerabilities: &[Vulnerability],
        dependencies: &[Dependency],
    ) -> Vec<Remediation> {
        let mut remediations = Vec::new();

        for (package, vulns) in group_by_package(vulnerabilities) {
            let fixed: Vec<&Vulnerability> =
                vulns.iter().copied().filter(|v| v.fixed_version.is_some()).collect();
            let Some(target) = max_version(fixed.iter().filter_map(|v| v.fixed_version.as_deref()))
            else {
                continue;
            };

            let current = vulns[0].installed_version.clone();
            let dependency = dependencies
                .iter()
                .find(|d| d.name == package && d.version == current)
                .or_else(|| dependencies.iter().find(|d| d.name == package));
            let ecosystem = dependency.map(|d| d.ecosystem);

            let is_breaking = matches!(
                (major_component(&current), major_component(target)),
                (Some(a), Some(b)) if a != b
            );

            let mut remediation = Remediation {
                id: format!("REM-{:03}", remediations.len() + 1),
                package: package.to_owned(),
                ecosystem,
                current_version: current,
                target_version: target.to_owned(),
                vulnerabilities_fixed: fixed.iter().map(|v| v.id.clone()).collect(),
                risk_level: vulns.iter().map(|v| v.severity).max().unwrap_or_default(),
                is_breaking,
                breaking_changes: Vec::new(),
                migration_guide_url: None,
            };

            if is_breaking {
                self.enrich(&mut remediation, dependency).await;
            }
            remediations.push(remediation);
        }

        remediations
    }

    async fn enrich(&self, remediation: &mut Remediation, dependency: Option<&Dependency>) {
        if let Some(ecosystem) = remediation.ecosystem {
            if let Some(entry) =
                self.dataset
                    .lookup(ecosystem, &remediation.package, &remediation.target_version)
            {
                remediation.breaking_changes = entry
                    .changes
                    .iter()
                    .map(|c| BreakingChange {
                        description: c.clone(),
                        source: BreakingChangeSource::Curated,
                    })
                    .collect();
                remediation.migration_guide_url = entry.migration_guide_url.clone();
                return;
            }
        }

        let (Some(client), Some(repository)) = (
            &self.changelog,
            dependency.and_then(|d| d.repository.as_deref()),
        ) else {
            return;
        };
        let lines = client
            .breaking_changes(repository, &remediation.target_version)
            .await;
        debug!(
            package = %remediation.package,
            target = %remediation.target_version,
            found = lines.len(),
            "changelog enrichment"
        );
        remediation.breaking_changes = lines
            .into_iter()
            .map(|description| BreakingChange {
                description,
                source: BreakingChangeSource::Changelog,
            })
            .collect();
    }
}

/// 패키지 이름으로 묶습니다. 패키지 순서는 처음 등장한 순서입니다.
fn group_by_package(vulnerabilities: &[Vulnerability]) -> Vec<(&str, Vec<&Vulnerability>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&Vulnerability>)> = Vec::new();

    for vuln in vulnerabilities {
        match index.get(vuln.package.as_str()) {
            Some(&i) => groups[i].1.push(vuln),
            None => {
                index.insert(&vuln.package, groups.len());
                groups.push((&vuln.package, vec![vuln]));
            }
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remediation::dataset::DatasetEntry;
    use crate::types::Ecosystem;
    use vulnscout_core::types::Severity;

    fn vuln(id: &str, package: &str, installed: &str, severity: Severity, fixed: Option<&str>) -> Vulnerability {
        Vulnerability {
            id: id.to_owned(),
            severity,
            cvss: None,
            package: package.to_owned(),
            installed_version: installed.to_owned(),
            fixed_version: fixed.map(str::to_owned),
            description: String::new(),
            references: vec![],
            aliases: vec![],
        }
    }

    fn dep(name: &str, version: &str, ecosystem: Ecosystem) -> Dependency {
        Dependency {
            name: name.to_owned(),
            version: version.to_owned(),
            ecosystem,
            direct: true,
            parent: None,
            vulnerability_count: 0,
            max_severity: None,
            repository: None,
        }
    }

    fn engine(entries: Vec<DatasetEntry>) -> RemediationEngine {
        RemediationEngine::new(BreakingChangeDataset::from_entries(entries), None)
    }

    #[tokio::test]
    async fn groups_by_package_and_picks_semantic_max() {
        let vulns = vec![
            vuln("GHSA-1", "lodash", "4.17.15", Severity::High, Some("4.17.19")),
            vuln("GHSA-2", "minimist", "1.2.0", Severity::Low, Some("1.2.6")),
            vuln("GHSA-3", "lodash", "4.17.15", Severity::Critical, Some("4.17.21")),
            vuln("GHSA-4", "lodash", "4.17.15", Severity::Medium, None),
        ];
        let deps = vec![dep("lodash", "4.17.15", Ecosystem::Npm), dep("minimist", "1.2.0", Ecosystem::Npm)];

        let rems = engine(vec![]).generate(&vulns, &deps).await;
        assert_eq!(rems.len(), 2);

        let lodash = &rems[0];
        assert_eq!(lodash.id, "REM-001");
        assert_eq!(lodash.package, "lodash");
        assert_eq!(lodash.target_version, "4.17.21");
        assert_eq!(lodash.vulnerabilities_fixed, vec!["GHSA-1", "GHSA-3"]);
        assert_eq!(lodash.risk_level, Severity::Critical);
        assert_eq!(lodash.ecosystem, Some(Ecosystem::Npm));
        assert!(!lodash.is_breaking);

        assert_eq!(rems[1].package, "minimist");
    }

    #[tokio::test]
    async fn semantic_not_lexicographic_target() {
        let vulns = vec![
            vuln("A", "pkg", "1.0.0", Severity::High, Some("1.2.0")),
            vuln("B", "pkg", "1.0.0", Severity::High, Some("1.10.0")),
        ];
        let rems = engine(vec![]).generate(&vulns, &[]).await;
        assert_eq!(rems[0].target_version, "1.10.0");
        assert_eq!(rems[0].ecosystem, None);
    }

    #[tokio::test]
    async fn skips_packages_without_fix() {
        let vulns = vec![vuln("A", "pkg", "1.0.0", Severity::Critical, None)];
        assert!(engine(vec![]).generate(&vulns, &[]).await.is_empty());
    }

    #[tokio::test]
    async fn breaking_upgrade_uses_curated_dataset() {
        let vulns = vec![vuln("A", "express", "4.17.1", Severity::High, Some("5.0.0"))];
        let deps = vec![dep("express", "4.17.1", Ecosystem::Npm)];
        let entries = vec![DatasetEntry {
            ecosystem: Ecosystem::Npm,
            package: "express".to_owned(),
            version: "5.0.0".to_owned(),
            changes: vec!["app.del() removed".to_owned()],
            migration_guide_url: Some("https://expressjs.com/en/guide/migrating-5.html".to_owned()),
        }];

        let rems = engine(entries).generate(&vulns, &deps).await;
        let rem = &rems[0];
        assert!(rem.is_breaking);
        assert_eq!(rem.breaking_changes.len(), 1);
        assert_eq!(rem.breaking_changes[0].source, BreakingChangeSource::Curated);
        assert!(rem.migration_guide_url.is_some());
    }

    #[tokio::test]
    async fn breaking_without_sources_is_still_reported() {
        let vulns = vec![vuln("A", "pkg", "1.9.0", Severity::Medium, Some("2.0.1"))];
        let deps = vec![dep("pkg", "1.9.0", Ecosystem::PyPi)];
        let rems = engine(vec![]).generate(&vulns, &deps).await;
        assert!(rems[0].is_breaking);
        assert!(rems[0].breaking_changes.is_empty());
        assert!(rems[0].migration_guide_url.is_none());
    }

    #[test]
    fn grouping_preserves_first_seen_order() {
        let vulns = vec![
            vuln("1", "b", "1", Severity::Low, None),
            vuln("2", "a", "1", Severity::Low, None),
            vuln("3", "b", "1", Severity::Low, None),
        ];
        let groups = group_by_package(&vulns);
        let names: Vec<_> = groups.iter().map(|(p, v)| (*p, v.len())).collect();
        assert_eq!(names, vec![("b", 2), ("a", 1)]);
    }
}
