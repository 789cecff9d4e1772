//! npm 레지스트리
//!
//! - 노드: `GET {npm}/{name}/{version|latest}`
//! - 버전 목록: `GET {npm}/{name}`의 `versions` 키
//!
//! 이름과 버전은 경로 세그먼트로 퍼센트 인코딩합니다 (`@scope/name` -> `%40scope%2Fname`).
//! 모든 전이 간선은 `latest`로 해석하며 탐색 깊이는 3입니다.

use std::collections::BTreeMap;

use serde::Deserialize;
use urlencoding::encode;

use crate::config::EngineConfig;
use crate::error::ScanError;
use crate::http;
use crate::resolver::{ChildEdge, EcosystemResolver, RegistryNode};
use crate::types::Ecosystem;

const NPM_MAX_DEPTH: usize = 3;

/// npm 레지스트리
pub struct NpmResolver {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct NpmVersionDocument {
    name: String,
    version: String,
    #[serde(default)]
    dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    repository: Option<NpmRepository>,
}

/// `repository` 필드는 문자열 또는 `{ type, url }` 객체
#[derive(Deserialize)]
#[serde(untagged)]
enum NpmRepository {
    Url(String),
    Object {
        #[serde(default)]
        url: Option<String>,
    },
}

#[derive(Deserialize)]
struct NpmPackument {
    #[serde(default)]
    versions: BTreeMap<String, serde_json::Value>,
}

impl NpmResolver {
    /// 엔진 설정으로 레지스트리를 생성합니다.
    pub fn new(config: &EngineConfig) -> Result<Self, ScanError> {
        Ok(Self {
            http: http::build_client(&config.user_agent, config.http_timeout_secs)?,
            base_url: config.npm_url.clone(),
        })
    }
}

impl EcosystemResolver for NpmResolver {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Npm
    }

    fn max_depth(&self) -> usize {
        NPM_MAX_DEPTH
    }

    async fn fetch_node(&self, name: &str, version: Option<&str>) -> Result<RegistryNode, ScanError> {
        let url = format!(
            "{}/{}/{}",
            self.base_url,
            encode(name),
            encode(version.unwrap_or("latest"))
        );
        let doc: NpmVersionDocument = http::get_json(&self.http, &url).await?;

        let repository = doc.repository.and_then(|r| match r {
            NpmRepository::Url(url) => Some(url),
            NpmRepository::Object { url } => url,
        });

        Ok(RegistryNode {
            name: doc.name,
            version: doc.version,
            dependencies: doc.dependencies.into_keys().map(ChildEdge::latest).collect(),
            repository,
        })
    }

    async fn list_versions(&self, name: &str) -> Result<Vec<String>, ScanError> {
        let url = format!("{}/{}", self.base_url, encode(name));
        let packument: NpmPackument = http::get_json(&self.http, &url).await?;
        Ok(packument.versions.into_keys().collect())
    }
}
