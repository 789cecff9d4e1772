//! Go 모듈 프록시
//!
//! - 특정 버전: `GET {proxy}/{module}/@v/{version}.info`
//! - 최신: `GET {proxy}/{module}/@latest`
//! - 버전 목록: `GET {proxy}/{module}/@v/list` (줄 단위 텍스트)
//!
//! 모듈 경로의 대문자는 `!` + 소문자로 이스케이프합니다 (`github.com/Azure/x` -> `github.com/!azure/x`).
//! 프록시는 의존성 그래프를 제공하지 않으므로 루트 노드 하나만 해석합니다.

use serde::Deserialize;

use crate::config::EngineConfig;
use crate::error::ScanError;
use crate::http;
use crate::resolver::{EcosystemResolver, RegistryNode};
use crate::types::Ecosystem;

/// Go 모듈 프록시
pub struct GoResolver {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct VersionInfo {
    #[serde(rename = "Version")]
    version: String,
}

impl GoResolver {
    /// 엔진 설정으로 프록시 클라이언트를 생성합니다.
    pub fn new(config: &EngineConfig) -> Result<Self, ScanError> {
        Ok(Self {
            http: http::build_client(&config.user_agent, config.http_timeout_secs)?,
            base_url: config.go_proxy_url.clone(),
        })
    }
}

impl EcosystemResolver for GoResolver {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Go
    }

    fn max_depth(&self) -> usize {
        0
    }

    async fn fetch_node(&self, name: &str, version: Option<&str>) -> Result<RegistryNode, ScanError> {
        let module = escape_module_path(name);
        let url = match version {
            Some(v) => format!("{}/{module}/@v/{}.info", self.base_url, escape_module_path(v)),
            None => format!("{}/{module}/@latest", self.base_url),
        };
        let info: VersionInfo = http::get_json(&self.http, &url).await?;

        Ok(RegistryNode {
            name: name.to_owned(),
            version: info.version,
            dependencies: Vec::new(),
            repository: repository_url(name),
        })
    }

    async fn list_versions(&self, name: &str) -> Result<Vec<String>, ScanError> {
        let url = format!("{}/{}/@v/list", self.base_url, escape_module_path(name));
        let body = http::get_text(&self.http, &url).await?;
        Ok(body
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_owned)
            .collect())
    }
}

/// 모듈 프록시 경로 규칙: 대문자 -> `!` + 소문자
pub fn escape_module_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii_uppercase() {
            out.push('!');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// `github.com/owner/repo[/...]` 모듈이면 저장소 URL을 만듭니다.
fn repository_url(module: &str) -> Option<String> {
    let mut parts = module.split('/');
    let (host, owner, repo) = (parts.next()?, parts.next()?, parts.next()?);
    (host == "github.com").then(|| format!("https://github.com/{owner}/{repo}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_uppercase() {
        assert_eq!(
            escape_module_path("github.com/Azure/azure-sdk-for-go"),
            "github.com/!azure/azure-sdk-for-go"
        );
        assert_eq!(
            escape_module_path("github.com/BurntSushi/toml"),
            "github.com/!burnt!sushi/toml"
        );
        assert_eq!(escape_module_path("golang.org/x/net"), "golang.org/x/net");
    }

    #[test]
    fn repository_for_github_modules() {
        assert_eq!(
            repository_url("github.com/gin-gonic/gin/v2").as_deref(),
            Some("https://github.com/gin-gonic/gin")
        );
        assert_eq!(repository_url("golang.org/x/net"), None);
    }
}
