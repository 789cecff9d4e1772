//! 의존성 해석 -- 레지스트리 조회와 BFS 그래프 탐색
//!
//! [`EcosystemResolver`] trait은 레지스트리에서 한 노드(패키지 버전과 직계 의존성)를
//! 가져오는 방법만 정의합니다. 그래프 탐색은 [`resolve_graph`] 하나로 모든 생태계에
//! 공통 적용됩니다.
//!
//! # 탐색 규칙
//!
//! - 루트(깊이 0) -> 깊이 1 -> 깊이 2 순서의 BFS. 같은 레벨은 제출 순서대로 결과를 소비합니다.
//! - 한 레벨의 노드는 `max_concurrency`개까지 동시에 조회합니다.
//! - `name@version` 방문 집합은 레벨 사이에서 조정 태스크만 변경합니다.
//! - 깊이 `d`의 노드는 `d <= max_depth`이면 결과에 포함되고, `d < max_depth`일 때만 자식을 큐에 넣습니다.
//! - 노드 조회 실패는 해당 노드와 하위 트리만 버리고 `unresolved`에 기록합니다.
//!
//! # 생태계별 구현
//!
//! | 생태계 | 구현 | 깊이 |
//! |--------|------|------|
//! | PyPI | [`pypi::PypiResolver`] | 1 |
//! | npm | [`npm::NpmResolver`] | 3 |
//! | Maven | [`maven::MavenResolver`] | 2 |
//! | Go | [`go::GoResolver`] | 0 |
//! | RubyGems | [`rubygems::RubyGemsResolver`] | 2 |

pub mod go;
pub mod maven;
pub mod npm;
pub mod pypi;
pub mod rubygems;

use std::collections::{HashMap, HashSet};
use std::future::Future;

use futures::stream::{self, StreamExt};
use metrics::counter;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use vulnscout_core::metrics as m;

use crate::advisory::DynAdvisoryClient;
use crate::config::EngineConfig;
use crate::error::ScanError;
use crate::types::{BoxFuture, Dependency, Ecosystem, UnresolvedNode, Vulnerability};
use crate::version::sort_versions;

/// 레지스트리에서 가져온 한 노드
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryNode {
    /// 레지스트리가 보고한 패키지 이름
    pub name: String,
    /// 해석된 구체 버전
    pub version: String,
    /// 따라갈 직계 의존성
    pub dependencies: Vec<ChildEdge>,
    /// 소스 저장소 URL
    pub repository: Option<String>,
}

/// 자식 의존성 간선
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEdge {
    /// 패키지 이름
    pub name: String,
    /// 요청 버전 (None이면 최신)
    pub version: Option<String>,
}

impl ChildEdge {
    /// 최신 버전으로 해석할 간선을 생성합니다.
    pub fn latest(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }
}

/// 생태계별 레지스트리 조회 trait
pub trait EcosystemResolver: Send + Sync {
    /// 담당 생태계
    fn ecosystem(&self) -> Ecosystem;

    /// 탐색 최대 깊이 (루트 = 0)
    fn max_depth(&self) -> usize;

    /// 한 노드를 조회합니다. `version`이 None이면 최신 버전을 조회합니다.
    fn fetch_node(
        &self,
        name: &str,
        version: Option<&str>,
    ) -> impl Future<Output = Result<RegistryNode, ScanError>> + Send;

    /// 레지스트리에 공개된 모든 버전을 반환합니다 (정렬 전).
    fn list_versions(&self, name: &str)
    -> impl Future<Output = Result<Vec<String>, ScanError>> + Send;
}

/// dyn-compatible 레지스트리 trait
///
/// `EcosystemResolver`는 RPITIT를 사용하므로 `dyn EcosystemResolver`가 불가합니다.
/// [`ResolverRegistry`]는 이 trait으로 생태계별 구현을 보관합니다.
pub trait DynResolver: Send + Sync {
    /// 담당 생태계
    fn ecosystem(&self) -> Ecosystem;

    /// 탐색 최대 깊이
    fn max_depth(&self) -> usize;

    /// 한 노드를 조회합니다.
    fn fetch_node<'a>(
        &'a self,
        name: &'a str,
        version: Option<&'a str>,
    ) -> BoxFuture<'a, Result<RegistryNode, ScanError>>;

    /// 공개된 모든 버전을 반환합니다.
    fn list_versions<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Vec<String>, ScanError>>;
}

impl<T: EcosystemResolver> DynResolver for T {
    fn ecosystem(&self) -> Ecosystem {
        EcosystemResolver::ecosystem(self)
    }

    fn max_depth(&self) -> usize {
        EcosystemResolver::max_depth(self)
    }

    fn fetch_node<'a>(
        &'a self,
        name: &'a str,
        version: Option<&'a str>,
    ) -> BoxFuture<'a, Result<RegistryNode, ScanError>> {
        Box::pin(EcosystemResolver::fetch_node(self, name, version))
    }

    fn list_versions<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Vec<String>, ScanError>> {
        Box::pin(EcosystemResolver::list_versions(self, name))
    }
}

/// 해석 결과
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// BFS 순서의 의존성 (루트 먼저)
    pub dependencies: Vec<Dependency>,
    /// ID 기준으로 중복 제거된 취약점
    pub vulnerabilities: Vec<Vulnerability>,
    /// 해석 중 버려진 노드
    pub unresolved: Vec<UnresolvedNode>,
}

impl Resolution {
    /// 다른 해석 결과를 합칩니다.
    ///
    /// 의존성은 `name@version`, 취약점은 ID 기준으로 처음 등장한 항목을 유지합니다.
    pub fn merge(&mut self, other: Resolution) {
        let mut dep_keys: HashSet<String> = self.dependencies.iter().map(Dependency::key).collect();
        let mut vuln_ids: HashSet<String> =
            self.vulnerabilities.iter().map(|v| v.id.clone()).collect();

        for dep in other.dependencies {
            if dep_keys.insert(dep.key()) {
                self.dependencies.push(dep);
            }
        }
        for vuln in other.vulnerabilities {
            if vuln_ids.insert(vuln.id.clone()) {
                self.vulnerabilities.push(vuln);
            }
        }
        self.unresolved.extend(other.unresolved);
    }
}

/// 탐색 옵션
#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions {
    /// 한 레벨의 동시 조회 수
    pub max_concurrency: usize,
    /// 생태계 기본 깊이보다 얕게 제한할 때 사용
    pub depth_limit: Option<usize>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            depth_limit: None,
        }
    }
}

impl ResolveOptions {
    /// 루트 노드만 해석하는 옵션
    pub fn shallow(max_concurrency: usize) -> Self {
        Self {
            max_concurrency,
            depth_limit: Some(0),
        }
    }
}

/// 레벨 단위 진행 보고
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelProgress {
    /// 방금 끝난 깊이
    pub depth: usize,
    /// 지금까지 해석된 노드 수
    pub resolved: usize,
    /// 다음 레벨에 대기 중인 노드 수
    pub pending: usize,
    /// 이 레벨의 마지막 노드
    pub last_package: Option<String>,
}

/// 큐에 대기 중인 노드
struct Pending {
    name: String,
    version: Option<String>,
    parent: Option<String>,
}

/// 의존성 그래프를 BFS로 해석합니다.
///
/// 노드 조회 실패는 흡수되므로 항상 결과를 반환합니다. 루트 조회가 실패하면
/// 의존성 목록은 비어 있고 `unresolved`에 루트가 기록됩니다.
pub async fn resolve_graph(
    resolver: &dyn DynResolver,
    advisory: &dyn DynAdvisoryClient,
    name: &str,
    version: Option<&str>,
    options: ResolveOptions,
    progress: Option<mpsc::UnboundedSender<LevelProgress>>,
) -> Resolution {
    let ecosystem = resolver.ecosystem();
    let max_depth = options
        .depth_limit
        .map_or(resolver.max_depth(), |limit| limit.min(resolver.max_depth()));
    let concurrency = options.max_concurrency.max(1);

    let mut resolution = Resolution::default();
    let mut visited: HashSet<String> = HashSet::new();
    let mut requested: HashSet<String> = HashSet::new();
    let mut vuln_ids: HashSet<String> = HashSet::new();

    requested.insert(request_key(name, version));
    let mut level = vec![Pending {
        name: name.to_owned(),
        version: version.map(str::to_owned),
        parent: None,
    }];
    let mut depth = 0;

    while !level.is_empty() {
        let fetched: Vec<(Pending, Result<RegistryNode, ScanError>)> =
            stream::iter(level.into_iter().map(|pending| async move {
                counter!(m::REGISTRY_REQUESTS_TOTAL, m::LABEL_ECOSYSTEM => ecosystem.as_str())
                    .increment(1);
                let result = resolver
                    .fetch_node(&pending.name, pending.version.as_deref())
                    .await;
                (pending, result)
            }))
            .buffered(concurrency)
            .collect()
            .await;

        let mut accepted = Vec::new();
        for (pending, result) in fetched {
            match result {
                Ok(node) => {
                    if visited.insert(format!("{}@{}", node.name, node.version)) {
                        accepted.push((pending, node));
                    }
                }
                Err(e) => {
                    counter!(m::REGISTRY_FAILURES_TOTAL, m::LABEL_ECOSYSTEM => ecosystem.as_str())
                        .increment(1);
                    warn!(
                        ecosystem = %ecosystem,
                        package = %pending.name,
                        depth,
                        error = %e,
                        "dropping unresolvable dependency node"
                    );
                    resolution.unresolved.push(UnresolvedNode {
                        package: pending.name,
                        version: pending.version,
                        parent: pending.parent,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let audited: Vec<(Pending, RegistryNode, Vec<Vulnerability>)> =
            stream::iter(accepted.into_iter().map(|(pending, node)| async move {
                let vulns = advisory.query(&node.name, ecosystem, &node.version).await;
                (pending, node, vulns)
            }))
            .buffered(concurrency)
            .collect()
            .await;

        let mut next = Vec::new();
        let mut last_package = None;
        for (pending, node, vulns) in audited {
            resolution.dependencies.push(Dependency {
                name: node.name.clone(),
                version: node.version.clone(),
                ecosystem,
                direct: depth <= 1,
                parent: pending.parent,
                vulnerability_count: vulns.len(),
                max_severity: vulns.iter().map(|v| v.severity).max(),
                repository: node.repository,
            });
            for vuln in vulns {
                if vuln_ids.insert(vuln.id.clone()) {
                    resolution.vulnerabilities.push(vuln);
                }
            }

            if depth < max_depth {
                for child in node.dependencies {
                    if requested.insert(request_key(&child.name, child.version.as_deref())) {
                        next.push(Pending {
                            name: child.name,
                            version: child.version,
                            parent: Some(node.name.clone()),
                        });
                    }
                }
            }
            last_package = Some(format!("{}@{}", node.name, node.version));
        }

        debug!(
            ecosystem = %ecosystem,
            depth,
            resolved = resolution.dependencies.len(),
            pending = next.len(),
            "dependency level resolved"
        );
        if let Some(tx) = &progress {
            // 수신 측이 먼저 끝난 경우 보고만 생략
            let _ = tx.send(LevelProgress {
                depth,
                resolved: resolution.dependencies.len(),
                pending: next.len(),
                last_package,
            });
        }

        level = next;
        depth += 1;
    }

    resolution
}

fn request_key(name: &str, version: Option<&str>) -> String {
    format!("{name}@{}", version.unwrap_or("latest"))
}

/// 생태계별 레지스트리 모음
///
/// 생태계 값으로 구현을 찾아 위임하므로 호출 측에 생태계별 분기가 없습니다.
#[derive(Default)]
pub struct ResolverRegistry {
    resolvers: HashMap<Ecosystem, Box<dyn DynResolver>>,
}

impl ResolverRegistry {
    /// 빈 레지스트리를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 설정된 레지스트리 주소로 다섯 생태계의 구현을 모두 등록합니다.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ScanError> {
        let mut registry = Self::new();
        registry.register(Box::new(pypi::PypiResolver::new(config)?));
        registry.register(Box::new(npm::NpmResolver::new(config)?));
        registry.register(Box::new(maven::MavenResolver::new(config)?));
        registry.register(Box::new(go::GoResolver::new(config)?));
        registry.register(Box::new(rubygems::RubyGemsResolver::new(config)?));
        Ok(registry)
    }

    /// 구현을 등록합니다. 같은 생태계의 기존 구현은 교체됩니다.
    pub fn register(&mut self, resolver: Box<dyn DynResolver>) {
        self.resolvers.insert(resolver.ecosystem(), resolver);
    }

    /// 생태계의 구현을 반환합니다.
    pub fn get(&self, ecosystem: Ecosystem) -> Result<&dyn DynResolver, ScanError> {
        self.resolvers
            .get(&ecosystem)
            .map(|r| r.as_ref())
            .ok_or_else(|| {
                ScanError::validation("ecosystem", format!("no resolver registered for {ecosystem}"))
            })
    }

    /// 등록된 생태계 목록
    pub fn ecosystems(&self) -> Vec<Ecosystem> {
        let mut list: Vec<_> = self.resolvers.keys().copied().collect();
        list.sort();
        list
    }

    /// 생태계 깊이 제한까지 그래프를 해석합니다.
    pub async fn resolve(
        &self,
        ecosystem: Ecosystem,
        advisory: &dyn DynAdvisoryClient,
        name: &str,
        version: Option<&str>,
        options: ResolveOptions,
        progress: Option<mpsc::UnboundedSender<LevelProgress>>,
    ) -> Result<Resolution, ScanError> {
        let resolver = self.get(ecosystem)?;
        Ok(resolve_graph(resolver, advisory, name, version, options, progress).await)
    }

    /// 루트 노드 하나만 해석합니다 (얕은 매니페스트 스캔용).
    pub async fn resolve_shallow(
        &self,
        ecosystem: Ecosystem,
        advisory: &dyn DynAdvisoryClient,
        name: &str,
        version: Option<&str>,
    ) -> Result<Resolution, ScanError> {
        let resolver = self.get(ecosystem)?;
        Ok(resolve_graph(
            resolver,
            advisory,
            name,
            version,
            ResolveOptions::shallow(1),
            None,
        )
        .await)
    }

    /// 공개된 버전을 의미론적 오름차순으로 반환합니다.
    pub async fn list_versions(
        &self,
        ecosystem: Ecosystem,
        name: &str,
    ) -> Result<Vec<String>, ScanError> {
        let resolver = self.get(ecosystem)?;
        let mut versions = resolver.list_versions(name).await?;
        versions.dedup();
        sort_versions(&mut versions);
        versions.dedup();
        Ok(versions)
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! 테스트용 인메모리 레지스트리

    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// `(name, version)` -> 자식 목록으로 구성된 가짜 레지스트리
    pub struct MockResolver {
        ecosystem: Ecosystem,
        max_depth: usize,
        /// 이름별 (버전, 자식 목록) -- 첫 항목이 최신
        packages: HashMap<String, Vec<(String, Vec<ChildEdge>)>>,
        failing: HashSet<String>,
        fetches: AtomicUsize,
    }

    impl MockResolver {
        pub fn new(ecosystem: Ecosystem, max_depth: usize) -> Self {
            Self {
                ecosystem,
                max_depth,
                packages: HashMap::new(),
                failing: HashSet::new(),
                fetches: AtomicUsize::new(0),
            }
        }

        /// 패키지 버전과 최신 버전 자식 목록을 등록합니다.
        pub fn with_package(mut self, name: &str, version: &str, children: &[&str]) -> Self {
            let edges = children.iter().map(|c| ChildEdge::latest(*c)).collect();
            self.packages
                .entry(name.to_owned())
                .or_default()
                .push((version.to_owned(), edges));
            self
        }

        /// 조회 시 실패할 패키지를 등록합니다.
        pub fn with_failure(mut self, name: &str) -> Self {
            self.failing.insert(name.to_owned());
            self
        }

        pub fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    impl EcosystemResolver for MockResolver {
        fn ecosystem(&self) -> Ecosystem {
            self.ecosystem
        }

        fn max_depth(&self) -> usize {
            self.max_depth
        }

        async fn fetch_node(
            &self,
            name: &str,
            version: Option<&str>,
        ) -> Result<RegistryNode, ScanError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let not_found = || ScanError::RegistryFetch {
                url: format!("mock://{name}"),
                reason: "HTTP 404".to_owned(),
            };
            if self.failing.contains(name) {
                return Err(not_found());
            }
            let versions = self.packages.get(name).ok_or_else(not_found)?;
            let (resolved, children) = match version {
                Some(v) => versions.iter().find(|(ver, _)| ver == v).ok_or_else(not_found)?,
                None => versions.first().ok_or_else(not_found)?,
            };
            Ok(RegistryNode {
                name: name.to_owned(),
                version: resolved.clone(),
                dependencies: children.clone(),
                repository: None,
            })
        }

        async fn list_versions(&self, name: &str) -> Result<Vec<String>, ScanError> {
            Ok(self
                .packages
                .get(name)
                .map(|v| v.iter().map(|(ver, _)| ver.clone()).collect())
                .unwrap_or_default())
        }
    }
}
