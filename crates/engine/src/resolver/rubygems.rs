//! RubyGems 레지스트리
//!
//! - 최신: `GET {rubygems}/api/v1/gems/{name}.json`
//! - 특정 버전: `GET {rubygems}/api/v2/rubygems/{name}/versions/{version}.json`
//! - 버전 목록: `GET {rubygems}/api/v1/versions/{name}.json`
//!
//! runtime 의존성만 따라가며 항상 최신 버전으로 해석합니다. 탐색 깊이는 2입니다.

use serde::Deserialize;
use urlencoding::encode;

use crate::config::EngineConfig;
use crate::error::ScanError;
use crate::http;
use crate::resolver::{ChildEdge, EcosystemResolver, RegistryNode};
use crate::types::Ecosystem;

const RUBYGEMS_MAX_DEPTH: usize = 2;

/// RubyGems 레지스트리
pub struct RubyGemsResolver {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct GemDocument {
    name: String,
    version: String,
    #[serde(default)]
    dependencies: GemDependencies,
    #[serde(default)]
    source_code_uri: Option<String>,
    #[serde(default)]
    homepage_uri: Option<String>,
}

#[derive(Default, Deserialize)]
struct GemDependencies {
    #[serde(default)]
    runtime: Vec<GemDependency>,
}

#[derive(Deserialize)]
struct GemDependency {
    name: String,
}

#[derive(Deserialize)]
struct GemVersion {
    number: String,
}

impl RubyGemsResolver {
    /// 엔진 설정으로 레지스트리를 생성합니다.
    pub fn new(config: &EngineConfig) -> Result<Self, ScanError> {
        Ok(Self {
            http: http::build_client(&config.user_agent, config.http_timeout_secs)?,
            base_url: config.rubygems_url.clone(),
        })
    }
}

impl EcosystemResolver for RubyGemsResolver {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::RubyGems
    }

    fn max_depth(&self) -> usize {
        RUBYGEMS_MAX_DEPTH
    }

    async fn fetch_node(&self, name: &str, version: Option<&str>) -> Result<RegistryNode, ScanError> {
        let gem = encode(name);
        let url = match version {
            Some(v) => format!(
                "{}/api/v2/rubygems/{gem}/versions/{}.json",
                self.base_url,
                encode(v)
            ),
            None => format!("{}/api/v1/gems/{gem}.json", self.base_url),
        };
        let doc: GemDocument = http::get_json(&self.http, &url).await?;

        let repository = doc
            .source_code_uri
            .filter(|u| !u.is_empty())
            .or(doc.homepage_uri.filter(|u| u.contains("github.com")));

        Ok(RegistryNode {
            name: doc.name,
            version: doc.version,
            dependencies: doc
                .dependencies
                .runtime
                .into_iter()
                .map(|d| ChildEdge::latest(d.name))
                .collect(),
            repository,
        })
    }

    async fn list_versions(&self, name: &str) -> Result<Vec<String>, ScanError> {
        let url = format!("{}/api/v1/versions/{}.json", self.base_url, encode(name));
        let versions: Vec<GemVersion> = http::get_json(&self.http, &url).await?;
        Ok(versions.into_iter().map(|v| v.number).collect())
    }
}
