//! 스캔 오케스트레이터
//!
//! [`ScanEngine`]은 매니페스트 파서, 레지스트리, 어드바이저리 클라이언트, 권고 엔진을 묶어
//! 요청 하나를 [`ScanReport`]로 만듭니다. 작업 저장소와는 독립적이며,
//! 비동기 작업 관리는 [`ScanJobManager`](crate::job::ScanJobManager)가 담당합니다.
//!
//! # 파이프라인
//!
//! ```text
//! ScanRequest::Package  --> ResolverRegistry::resolve --------------------+
//!                                                                         |
//! ScanRequest::Manifest --> ManifestDetector --+--> deep: 의존성별 전체 해석 --+--> Resolution
//!                                              +--> shallow: 의존성별 단일 노드 -+        |
//!                                                                                   v
//!                                     SeverityCounts + calculate_score + RemediationEngine
//!                                                                                   |
//!                                                                               ScanReport
//! ```

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::advisory::{DynAdvisoryClient, OsvClient};
use crate::config::EngineConfig;
use crate::error::ScanError;
use crate::manifest::{ManifestDetector, ParsedManifest};
use crate::remediation::RemediationEngine;
use crate::resolver::maven::split_coordinate;
use crate::resolver::{LevelProgress, Resolution, ResolveOptions, ResolverRegistry};
use crate::score::calculate_score;
use crate::types::{Ecosystem, ScanReport, ScanRequest, ScanTarget, SeverityCounts};

/// 파이프라인 진행 이벤트
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanProgress {
    /// 처리한 단위 수
    pub current: usize,
    /// 전체 단위 수 (알려진 범위)
    pub total: usize,
    /// 현재 처리 중인 패키지
    pub current_package: Option<String>,
    /// 로그 한 줄
    pub message: String,
}

/// 진행 이벤트 송신 채널
pub type ProgressSender = mpsc::UnboundedSender<ScanProgress>;

/// 스캔 결과
///
/// deep 매니페스트 스캔은 의존성별 하위 보고서를 함께 반환합니다.
/// 하위 보고서 ID는 `{부모 ID}-dep-{인덱스}`입니다.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// 최종 보고서
    pub report: ScanReport,
    /// 하위 스캔 보고서 (deep 매니페스트 스캔)
    pub sub_reports: Vec<ScanReport>,
}

/// 스캔 오케스트레이터
pub struct ScanEngine {
    config: EngineConfig,
    detector: ManifestDetector,
    registry: ResolverRegistry,
    advisory: Box<dyn DynAdvisoryClient>,
    remediation: RemediationEngine,
}

impl ScanEngine {
    /// 빌더를 생성합니다.
    pub fn builder() -> ScanEngineBuilder {
        ScanEngineBuilder::new()
    }

    /// 엔진 설정
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 요청을 사전 검증합니다.
    ///
    /// 매니페스트 요청은 파싱까지 수행하며 의존성 수를 반환합니다.
    pub fn validate(&self, request: &ScanRequest) -> Result<Option<usize>, ScanError> {
        match request {
            ScanRequest::Package {
                ecosystem,
                package,
                version,
                ..
            } => {
                validate_package_name(*ecosystem, package)?;
                if version.as_deref().is_some_and(|v| v.trim().is_empty()) {
                    return Err(ScanError::validation("version", "must not be blank"));
                }
                Ok(None)
            }
            ScanRequest::Manifest {
                file_name, content, ..
            } => {
                let parsed = self.detector.parse(content, file_name)?;
                Ok(Some(parsed.dependencies.len()))
            }
        }
    }

    /// 요청 종류에 따라 스캔을 실행합니다.
    pub async fn run(
        &self,
        id: &str,
        request: &ScanRequest,
        progress: Option<ProgressSender>,
    ) -> Result<ScanOutcome, ScanError> {
        match request {
            ScanRequest::Package {
                ecosystem,
                package,
                version,
                deep,
            } => {
                let report = self
                    .scan_package(id, *ecosystem, package, version.as_deref(), *deep, progress)
                    .await?;
                Ok(ScanOutcome {
                    report,
                    sub_reports: Vec::new(),
                })
            }
            ScanRequest::Manifest {
                file_name,
                content,
                deep,
            } => self.scan_manifest(id, file_name, content, *deep, progress).await,
        }
    }

    /// 패키지 좌표 하나를 스캔합니다.
    ///
    /// `deep`이면 해석된 깊이마다 진행 이벤트를 보냅니다.
    pub async fn scan_package(
        &self,
        id: &str,
        ecosystem: Ecosystem,
        package: &str,
        version: Option<&str>,
        deep: bool,
        progress: Option<ProgressSender>,
    ) -> Result<ScanReport, ScanError> {
        validate_package_name(ecosystem, package)?;
        let package = package.trim();
        info!(scan_id = %id, ecosystem = %ecosystem, package, version, "package scan started");

        let options = self.resolve_options();
        let resolution = match progress.filter(|_| deep) {
            Some(sink) => {
                let (level_tx, level_rx) = mpsc::unbounded_channel();
                let (resolution, ()) = tokio::join!(
                    self.registry.resolve(
                        ecosystem,
                        self.advisory.as_ref(),
                        package,
                        version,
                        options,
                        Some(level_tx),
                    ),
                    forward_levels(level_rx, sink),
                );
                resolution?
            }
            None => {
                self.registry
                    .resolve(ecosystem, self.advisory.as_ref(), package, version, options, None)
                    .await?
            }
        };

        let resolved_version = resolution
            .dependencies
            .first()
            .map(|root| root.version.clone())
            .or_else(|| version.map(str::to_owned));
        let target = ScanTarget {
            ecosystem,
            package: Some(package.to_owned()),
            version: resolved_version,
            file_name: None,
        };
        Ok(self.build_report(id, target, resolution).await)
    }

    /// 매니페스트 파일을 스캔합니다.
    ///
    /// - `deep = true`: 의존성마다 전체 그래프를 해석하고 하위 보고서를 만든 뒤 합칩니다.
    /// - `deep = false`: 의존성마다 노드 하나만 해석합니다.
    pub async fn scan_manifest(
        &self,
        id: &str,
        file_name: &str,
        content: &str,
        deep: bool,
        progress: Option<ProgressSender>,
    ) -> Result<ScanOutcome, ScanError> {
        let parsed = self.detector.parse(content, file_name)?;
        info!(
            scan_id = %id,
            file_name,
            ecosystem = %parsed.ecosystem,
            dependencies = parsed.dependencies.len(),
            deep,
            "manifest scan started"
        );

        let (resolution, sub_reports) = if deep {
            self.resolve_manifest_deep(id, &parsed, progress.as_ref()).await?
        } else {
            (self.resolve_manifest_shallow(&parsed, progress.as_ref()).await?, Vec::new())
        };

        let target = ScanTarget {
            ecosystem: parsed.ecosystem,
            package: None,
            version: None,
            file_name: Some(parsed.file_name.clone()),
        };
        Ok(ScanOutcome {
            report: self.build_report(id, target, resolution).await,
            sub_reports,
        })
    }

    /// 레지스트리에 공개된 버전을 오름차순으로 반환합니다.
    pub async fn versions(
        &self,
        ecosystem: Ecosystem,
        package: &str,
    ) -> Result<Vec<String>, ScanError> {
        validate_package_name(ecosystem, package)?;
        self.registry.list_versions(ecosystem, package.trim()).await
    }

    async fn resolve_manifest_deep(
        &self,
        id: &str,
        parsed: &ParsedManifest,
        progress: Option<&ProgressSender>,
    ) -> Result<(Resolution, Vec<ScanReport>), ScanError> {
        let total = parsed.dependencies.len();
        let options = self.resolve_options();
        let mut rollup = Resolution::default();
        let mut sub_reports = Vec::with_capacity(total);

        for (index, dep) in parsed.dependencies.iter().enumerate() {
            let label = coordinate(&dep.name, dep.version.as_deref());
            emit(
                progress,
                index,
                total,
                &dep.name,
                format!("[{}/{total}] scanning {label}", index + 1),
            );

            let resolution = self
                .registry
                .resolve(
                    parsed.ecosystem,
                    self.advisory.as_ref(),
                    &dep.name,
                    dep.version.as_deref(),
                    options,
                    None,
                )
                .await?;

            let target = ScanTarget {
                ecosystem: parsed.ecosystem,
                package: Some(dep.name.clone()),
                version: resolution
                    .dependencies
                    .first()
                    .map(|root| root.version.clone())
                    .or_else(|| dep.version.clone()),
                file_name: None,
            };
            let sub_id = format!("{id}-dep-{index}");
            let sub_report = self.build_report(&sub_id, target, resolution.clone()).await;
            emit(
                progress,
                index + 1,
                total,
                &dep.name,
                format!(
                    "[{}/{total}] {label}: {} dependencies, {} vulnerabilities",
                    index + 1,
                    sub_report.dependencies.len(),
                    sub_report.vulnerabilities.len()
                ),
            );

            rollup.merge(resolution);
            sub_reports.push(sub_report);
        }

        Ok((rollup, sub_reports))
    }

    async fn resolve_manifest_shallow(
        &self,
        parsed: &ParsedManifest,
        progress: Option<&ProgressSender>,
    ) -> Result<Resolution, ScanError> {
        let total = parsed.dependencies.len();
        let concurrency = self.config.max_concurrency.max(1);
        let ecosystem = parsed.ecosystem;

        // tokio::spawn 대상 Future이므로 항목은 소유한 값으로 순회합니다.
        let mut results = stream::iter(parsed.dependencies.iter().cloned().map(|dep| async move {
            let resolution = self
                .registry
                .resolve_shallow(
                    ecosystem,
                    self.advisory.as_ref(),
                    &dep.name,
                    dep.version.as_deref(),
                )
                .await;
            (dep, resolution)
        }))
        .buffered(concurrency);

        let mut rollup = Resolution::default();
        let mut done = 0;
        while let Some((dep, resolution)) = results.next().await {
            let resolution = resolution?;
            done += 1;
            let found = resolution.vulnerabilities.len();
            emit(
                progress,
                done,
                total,
                &dep.name,
                format!(
                    "[{done}/{total}] {}: {found} vulnerabilities",
                    coordinate(&dep.name, dep.version.as_deref())
                ),
            );
            rollup.merge(resolution);
        }
        Ok(rollup)
    }

    async fn build_report(&self, id: &str, target: ScanTarget, resolution: Resolution) -> ScanReport {
        let Resolution {
            dependencies,
            vulnerabilities,
            unresolved,
        } = resolution;

        let summary = SeverityCounts::from_vulnerabilities(&vulnerabilities);
        let score = calculate_score(&summary, dependencies.len());
        let remediations = self
            .remediation
            .generate(&vulnerabilities, &dependencies)
            .await;

        debug!(
            scan_id = %id,
            dependencies = dependencies.len(),
            vulnerabilities = summary.total,
            unresolved = unresolved.len(),
            score,
            "report assembled"
        );

        ScanReport {
            id: id.to_owned(),
            target,
            scanned_at: Utc::now(),
            score,
            summary,
            dependencies,
            vulnerabilities,
            remediations,
            unresolved,
        }
    }

    fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            max_concurrency: self.config.max_concurrency,
            depth_limit: None,
        }
    }
}

fn validate_package_name(ecosystem: Ecosystem, package: &str) -> Result<(), ScanError> {
    if package.trim().is_empty() {
        return Err(ScanError::validation("package", "must not be empty"));
    }
    if ecosystem == Ecosystem::Maven {
        split_coordinate(package.trim())?;
    }
    Ok(())
}

fn coordinate(name: &str, version: Option<&str>) -> String {
    format!("{name}@{}", version.unwrap_or("latest"))
}

fn emit(
    progress: Option<&ProgressSender>,
    current: usize,
    total: usize,
    package: &str,
    message: String,
) {
    if let Some(tx) = progress {
        let _ = tx.send(ScanProgress {
            current,
            total,
            current_package: Some(package.to_owned()),
            message,
        });
    }
}

/// 레벨 진행 보고를 스캔 진행 이벤트로 변환합니다.
async fn forward_levels(mut levels: mpsc::UnboundedReceiver<LevelProgress>, sink: ProgressSender) {
    while let Some(level) = levels.recv().await {
        let message = format!(
            "depth {}: {} resolved, {} pending",
            level.depth, level.resolved, level.pending
        );
        let _ = sink.send(ScanProgress {
            current: level.resolved,
            total: level.resolved + level.pending,
            current_package: level.last_package,
            message,
        });
    }
}

/// [`ScanEngine`] 빌더
///
/// 지정하지 않은 구성 요소는 설정에서 생성합니다.
#[derive(Default)]
pub struct ScanEngineBuilder {
    config: EngineConfig,
    registry: Option<ResolverRegistry>,
    advisory: Option<Box<dyn DynAdvisoryClient>>,
    remediation: Option<RemediationEngine>,
}

impl ScanEngineBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 엔진 설정을 지정합니다.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// 레지스트리 모음을 지정합니다.
    pub fn registry(mut self, registry: ResolverRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// 어드바이저리 클라이언트를 지정합니다.
    pub fn advisory(mut self, advisory: Box<dyn DynAdvisoryClient>) -> Self {
        self.advisory = Some(advisory);
        self
    }

    /// 권고 엔진을 지정합니다.
    pub fn remediation(mut self, remediation: RemediationEngine) -> Self {
        self.remediation = Some(remediation);
        self
    }

    /// 엔진을 빌드합니다.
    ///
    /// # Errors
    ///
    /// 설정 검증 실패, HTTP 클라이언트 생성 실패, 데이터셋 로드 실패 시 에러를 반환합니다.
    pub async fn build(self) -> Result<ScanEngine, ScanError> {
        self.config.validate()?;

        let registry = match self.registry {
            Some(registry) => registry,
            None => ResolverRegistry::from_config(&self.config)?,
        };
        let advisory = match self.advisory {
            Some(advisory) => advisory,
            None => Box::new(OsvClient::new(&self.config)?),
        };
        let remediation = match self.remediation {
            Some(remediation) => remediation,
            None => RemediationEngine::from_config(&self.config).await?,
        };

        Ok(ScanEngine {
            config: self.config,
            detector: ManifestDetector::new(),
            registry,
            advisory,
            remediation,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! 목 레지스트리와 목 어드바이저리로 구성한 엔진

    use crate::advisory::mock::MockAdvisoryClient;
    use crate::remediation::dataset::BreakingChangeDataset;
    use crate::resolver::mock::MockResolver;

    use super::*;

    pub async fn engine_with(resolvers: Vec<MockResolver>, advisory: MockAdvisoryClient) -> ScanEngine {
        engine_from(EngineConfig::default(), resolvers, Box::new(advisory)).await
    }

    pub async fn engine_from(
        config: EngineConfig,
        resolvers: Vec<MockResolver>,
        advisory: Box<dyn DynAdvisoryClient>,
    ) -> ScanEngine {
        let mut registry = ResolverRegistry::new();
        for resolver in resolvers {
            registry.register(Box::new(resolver));
        }
        ScanEngine::builder()
            .config(config)
            .registry(registry)
            .advisory(advisory)
            .remediation(RemediationEngine::new(BreakingChangeDataset::default(), None))
            .build()
            .await
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use vulnscout_core::types::Severity;

    use super::test_support::engine_with;
    use super::*;
    use crate::advisory::mock::MockAdvisoryClient;
    use crate::resolver::mock::MockResolver;

    fn pypi_requests() -> MockResolver {
        MockResolver::new(Ecosystem::PyPi, 1)
            .with_package("requests", "2.31.0", &["urllib3", "idna", "certifi"])
            .with_package("urllib3", "2.0.7", &["brotli"])
            .with_package("idna", "3.4", &[])
            .with_package("certifi", "2023.7.22", &[])
    }

    #[tokio::test]
    async fn clean_package_scores_100() {
        let engine = engine_with(vec![pypi_requests()], MockAdvisoryClient::new()).await;
        let report = engine
            .scan_package("job-a", Ecosystem::PyPi, "requests", None, false, None)
            .await
            .unwrap();

        assert_eq!(report.score, 100);
        assert_eq!(report.summary, SeverityCounts::default());
        assert_eq!(report.dependencies.len(), 4);
        assert_eq!(report.target.version.as_deref(), Some("2.31.0"));
        // PyPI 깊이 1: urllib3의 자식은 따라가지 않음
        assert!(report.dependencies.iter().all(|d| d.name != "brotli"));
    }

    #[tokio::test]
    async fn single_critical_scores_75() {
        let advisory = MockAdvisoryClient::new().with_vuln(
            "urllib3",
            "2.0.7",
            "GHSA-v845-jxx5-vc9f",
            Severity::Critical,
            Some("2.0.8"),
        );
        let engine = engine_with(vec![pypi_requests()], advisory).await;
        let report = engine
            .scan_package("job-b", Ecosystem::PyPi, "requests", None, false, None)
            .await
            .unwrap();

        assert_eq!(report.score, 75);
        assert_eq!(report.summary.critical, 1);
        assert_eq!(report.remediations.len(), 1);
        assert_eq!(report.remediations[0].target_version, "2.0.8");
    }

    #[tokio::test]
    async fn large_graph_gets_dependency_penalty() {
        let children: Vec<String> = (0..149).map(|i| format!("dep-{i}")).collect();
        let child_refs: Vec<&str> = children.iter().map(String::as_str).collect();
        let mut resolver = MockResolver::new(Ecosystem::Npm, 3).with_package("big", "1.0.0", &child_refs);
        for child in &children {
            resolver = resolver.with_package(child, "1.0.0", &[]);
        }
        let engine = engine_with(vec![resolver], MockAdvisoryClient::new()).await;
        let report = engine
            .scan_package("job-c", Ecosystem::Npm, "big", None, false, None)
            .await
            .unwrap();

        assert_eq!(report.dependencies.len(), 150);
        assert_eq!(report.score, 99);
    }

    #[tokio::test]
    async fn deep_package_scan_reports_levels() {
        let engine = engine_with(vec![pypi_requests()], MockAdvisoryClient::new()).await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        engine
            .scan_package("job-d", Ecosystem::PyPi, "requests", None, true, Some(tx))
            .await
            .unwrap();

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].message, "depth 0: 1 resolved, 3 pending");
        assert_eq!(events[1].current, 4);
        assert_eq!(events[1].total, 4);
    }

    #[tokio::test]
    async fn shallow_manifest_resolves_single_nodes() {
        let resolver = MockResolver::new(Ecosystem::PyPi, 1)
            .with_package("foo", "1.2.3", &["transitive"])
            .with_package("bar", "2.0", &[])
            .with_package("transitive", "0.1.0", &[]);
        let advisory = MockAdvisoryClient::new().with_vuln("foo", "1.2.3", "PYSEC-1", Severity::High, None);
        let engine = engine_with(vec![resolver], advisory).await;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let outcome = engine
            .scan_manifest(
                "job-m",
                "requirements.txt",
                "foo==1.2.3\n# comment\nbar>=2.0\n",
                false,
                Some(tx),
            )
            .await
            .unwrap();

        let report = outcome.report;
        assert!(outcome.sub_reports.is_empty());
        assert_eq!(report.target.file_name.as_deref(), Some("requirements.txt"));
        let names: Vec<_> = report.dependencies.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["foo", "bar"]);
        assert_eq!(report.summary.high, 1);
        assert_eq!(report.score, 85);

        let mut last = None;
        while let Ok(event) = rx.try_recv() {
            last = Some(event);
        }
        let last = last.unwrap();
        assert_eq!((last.current, last.total), (2, 2));
    }

    #[tokio::test]
    async fn deep_manifest_rolls_up_sub_scans() {
        let resolver = MockResolver::new(Ecosystem::Npm, 3)
            .with_package("express", "4.17.1", &["body-parser", "qs"])
            .with_package("koa", "2.14.0", &["qs"])
            .with_package("body-parser", "1.19.0", &["qs"])
            .with_package("qs", "6.7.0", &[]);
        let advisory = MockAdvisoryClient::new()
            .with_vuln("qs", "6.7.0", "GHSA-hrpp-h998-j3pp", Severity::High, Some("6.7.3"))
            .with_vuln("express", "4.17.1", "GHSA-rv95-896h-c2vc", Severity::Medium, Some("4.19.2"));
        let engine = engine_with(vec![resolver], advisory).await;

        let manifest = r#"{"dependencies":{"express":"^4.17.1","koa":"2.14.0"}}"#;
        let outcome = engine
            .scan_manifest("parent", "package.json", manifest, true, None)
            .await
            .unwrap();

        assert_eq!(outcome.sub_reports.len(), 2);
        assert_eq!(outcome.sub_reports[0].id, "parent-dep-0");
        assert_eq!(outcome.sub_reports[1].id, "parent-dep-1");
        assert_eq!(outcome.sub_reports[1].vulnerabilities.len(), 1);

        let report = outcome.report;
        let ids: Vec<_> = report.vulnerabilities.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["GHSA-rv95-896h-c2vc", "GHSA-hrpp-h998-j3pp"]);
        let keys: Vec<_> = report.dependencies.iter().map(|d| d.key()).collect();
        assert_eq!(
            keys,
            vec!["express@4.17.1", "body-parser@1.19.0", "qs@6.7.0", "koa@2.14.0"]
        );
    }

    #[tokio::test]
    async fn root_failure_yields_empty_report() {
        let resolver = MockResolver::new(Ecosystem::RubyGems, 2).with_failure("rails");
        let engine = engine_with(vec![resolver], MockAdvisoryClient::new()).await;
        let report = engine
            .scan_package("job-f", Ecosystem::RubyGems, "rails", Some("7.0.0"), false, None)
            .await
            .unwrap();

        assert!(report.dependencies.is_empty());
        assert_eq!(report.unresolved.len(), 1);
        assert_eq!(report.target.version.as_deref(), Some("7.0.0"));
        assert_eq!(report.score, 100);
    }

    #[tokio::test]
    async fn validation_errors() {
        let engine = engine_with(vec![pypi_requests()], MockAdvisoryClient::new()).await;
        let blank = ScanRequest::Package {
            ecosystem: Ecosystem::PyPi,
            package: "  ".to_owned(),
            version: None,
            deep: false,
        };
        assert!(matches!(engine.validate(&blank), Err(ScanError::Validation { .. })));

        let unsupported = ScanRequest::Manifest {
            file_name: "build.gradle".to_owned(),
            content: String::new(),
            deep: false,
        };
        assert!(matches!(
            engine.validate(&unsupported),
            Err(ScanError::UnsupportedManifest { .. })
        ));

        let manifest = ScanRequest::Manifest {
            file_name: "requirements.txt".to_owned(),
            content: "foo==1.0\nbar\n".to_owned(),
            deep: false,
        };
        assert_eq!(engine.validate(&manifest).unwrap(), Some(2));
    }

    #[tokio::test]
    async fn maven_package_requires_group_and_artifact() {
        let engine = engine_with(vec![pypi_requests()], MockAdvisoryClient::new()).await;
        for package in ["junit", "junit:", ":junit"] {
            let request = ScanRequest::Package {
                ecosystem: Ecosystem::Maven,
                package: package.to_owned(),
                version: Some("4.12".to_owned()),
                deep: false,
            };
            let err = engine.validate(&request).unwrap_err();
            assert!(err.is_preflight(), "{package} should be rejected before scanning");
        }

        let valid = ScanRequest::Package {
            ecosystem: Ecosystem::Maven,
            package: "junit:junit".to_owned(),
            version: Some("4.12".to_owned()),
            deep: false,
        };
        assert_eq!(engine.validate(&valid).unwrap(), None);
    }

    #[tokio::test]
    async fn unregistered_ecosystem_is_validation_error() {
        let engine = engine_with(vec![pypi_requests()], MockAdvisoryClient::new()).await;
        let err = engine
            .scan_package("job", Ecosystem::Go, "golang.org/x/net", None, false, None)
            .await
            .unwrap_err();
        assert!(err.is_preflight());
    }

    #[tokio::test]
    async fn versions_are_sorted() {
        let resolver = MockResolver::new(Ecosystem::Npm, 3)
            .with_package("lodash", "4.17.21", &[])
            .with_package("lodash", "4.2.0", &[])
            .with_package("lodash", "4.17.4", &[]);
        let engine = engine_with(vec![resolver], MockAdvisoryClient::new()).await;
        let versions = engine.versions(Ecosystem::Npm, "lodash").await.unwrap();
        assert_eq!(versions, vec!["4.2.0", "4.17.4", "4.17.21"]);
    }
}
