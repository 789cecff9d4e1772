//! 취약점 어드바이저리 조회
//!
//! [`AdvisoryClient`] trait은 `(패키지, 생태계, 버전)`에 대한 취약점 목록을 반환합니다.
//! 조회 실패는 호출자에게 전파되지 않고 빈 목록으로 흡수됩니다 (경고 로그와 메트릭 기록).
//!
//! - [`OsvClient`]: OSV 호환 `POST /v1/query` 구현
//! - [`osv`]: 응답 모델과 정규화
//! - [`cvss`]: CVSS v3 벡터 점수 계산
//! - [`range`]: 클라이언트 측 영향 범위 평가

pub mod cvss;
pub mod osv;
pub mod range;

use std::future::Future;

use metrics::counter;
use tracing::{debug, warn};

use vulnscout_core::metrics as m;

use crate::config::EngineConfig;
use crate::error::ScanError;
use crate::http;
use crate::types::{BoxFuture, Ecosystem, Vulnerability};
use crate::version::strip_v;

use self::osv::{OsvPackage, OsvQuery, OsvQueryResponse};

/// 한 조회에서 따라갈 최대 페이지 수
const MAX_PAGES: usize = 10;

/// 어드바이저리 조회 trait
///
/// 구현체는 실패를 스스로 흡수하고 빈 목록을 반환해야 합니다.
pub trait AdvisoryClient: Send + Sync {
    /// 패키지 버전에 해당하는 취약점을 조회합니다.
    fn query(
        &self,
        package: &str,
        ecosystem: Ecosystem,
        version: &str,
    ) -> impl Future<Output = Vec<Vulnerability>> + Send;
}

/// dyn-compatible 어드바이저리 trait
///
/// `AdvisoryClient`는 RPITIT를 사용하므로 `dyn AdvisoryClient`가 불가합니다.
pub trait DynAdvisoryClient: Send + Sync {
    /// 패키지 버전에 해당하는 취약점을 조회합니다.
    fn query<'a>(
        &'a self,
        package: &'a str,
        ecosystem: Ecosystem,
        version: &'a str,
    ) -> BoxFuture<'a, Vec<Vulnerability>>;
}

impl<T: AdvisoryClient> DynAdvisoryClient for T {
    fn query<'a>(
        &'a self,
        package: &'a str,
        ecosystem: Ecosystem,
        version: &'a str,
    ) -> BoxFuture<'a, Vec<Vulnerability>> {
        Box::pin(AdvisoryClient::query(self, package, ecosystem, version))
    }
}

/// OSV 호환 어드바이저리 클라이언트
pub struct OsvClient {
    http: reqwest::Client,
    query_url: String,
    client_side_matching: bool,
}

impl OsvClient {
    /// 엔진 설정으로 클라이언트를 생성합니다.
    pub fn new(config: &EngineConfig) -> Result<Self, ScanError> {
        Ok(Self {
            http: http::build_client(&config.user_agent, config.advisory_timeout_secs)?,
            query_url: format!("{}/v1/query", config.osv_url),
            client_side_matching: config.client_side_matching,
        })
    }

    /// 모든 페이지를 조회하여 정규화된 목록을 반환합니다.
    pub async fn fetch(
        &self,
        package: &str,
        ecosystem: Ecosystem,
        version: &str,
    ) -> Result<Vec<Vulnerability>, ScanError> {
        let query_version = match ecosystem {
            Ecosystem::Go => strip_v(version),
            _ => version,
        };

        let mut found = Vec::new();
        let mut page_token = None;

        for _ in 0..MAX_PAGES {
            let body = OsvQuery {
                package: OsvPackage {
                    name: package,
                    ecosystem: ecosystem.osv_name(),
                },
                version: (!self.client_side_matching).then_some(query_version),
                page_token: page_token.take(),
            };

            let response = http::send(self.http.post(&self.query_url).json(&body), &self.query_url)
                .await
                .map_err(|e| ScanError::AdvisoryQuery(e.to_string()))?;
            let page: OsvQueryResponse = response
                .json()
                .await
                .map_err(|e| ScanError::AdvisoryQuery(format!("invalid response: {e}")))?;

            for osv in &page.vulns {
                if self.client_side_matching
                    && !range::is_affected(&osv.affected, package, query_version)
                {
                    continue;
                }
                found.push(osv.normalize(package, version));
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(found)
    }
}

impl AdvisoryClient for OsvClient {
    async fn query(&self, package: &str, ecosystem: Ecosystem, version: &str) -> Vec<Vulnerability> {
        counter!(m::ADVISORY_QUERIES_TOTAL, m::LABEL_ECOSYSTEM => ecosystem.as_str()).increment(1);

        match self.fetch(package, ecosystem, version).await {
            Ok(vulns) => {
                debug!(
                    package,
                    version,
                    ecosystem = %ecosystem,
                    count = vulns.len(),
                    "advisory query completed"
                );
                vulns
            }
            Err(e) => {
                warn!(
                    package,
                    version,
                    ecosystem = %ecosystem,
                    error = %e,
                    "advisory query failed, treating as no vulnerabilities"
                );
                counter!(m::ADVISORY_FAILURES_TOTAL, m::LABEL_ECOSYSTEM => ecosystem.as_str())
                    .increment(1);
                Vec::new()
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::mock::MockAdvisoryClient;
    use super::*;
    use vulnscout_core::types::Severity;

    #[tokio::test]
    async fn dyn_client_dispatches_to_impl() {
        let client = MockAdvisoryClient::new().with_vuln(
            "lodash",
            "4.17.20",
            "GHSA-1",
            Severity::High,
            Some("4.17.21"),
        );
        let dyn_client: &dyn DynAdvisoryClient = &client;
        let vulns = dyn_client.query("lodash", Ecosystem::Npm, "4.17.20").await;
        assert_eq!(vulns.len(), 1);
        assert!(dyn_client.query("lodash", Ecosystem::Npm, "4.17.21").await.is_empty());
        assert_eq!(client.calls(), vec!["lodash@4.17.20", "lodash@4.17.21"]);
    }

    #[tokio::test]
    async fn unreachable_service_yields_empty_list() {
        let config = crate::config::EngineConfigBuilder::new()
            .osv_url("http://127.0.0.1:9")
            .build()
            .unwrap();
        let client = OsvClient::new(&config).unwrap();
        let vulns = AdvisoryClient::query(&client, "lodash", Ecosystem::Npm, "4.17.20").await;
        assert!(vulns.is_empty());
    }
}
