//! PyPI JSON API 레지스트리
//!
//! - 노드: `GET {pypi}/pypi/{name}/json` (최신) 또는 `GET {pypi}/pypi/{name}/{version}/json`
//! - 버전 목록: `GET {pypi}/pypi/{name}/json`의 `releases` 키
//!
//! `requires_dist` 중 `extra ==` 마커가 붙은 선택 의존성은 따라가지 않으며,
//! 자식은 항상 최신 버전으로 해석합니다. 탐색 깊이는 직계 의존성(1)까지입니다.

use std::collections::HashMap;

use serde::Deserialize;
use urlencoding::encode;

use crate::config::EngineConfig;
use crate::error::ScanError;
use crate::http;
use crate::resolver::{ChildEdge, EcosystemResolver, RegistryNode};
use crate::types::Ecosystem;

/// PyPI 탐색 깊이
const PYPI_MAX_DEPTH: usize = 1;

/// 저장소 URL로 간주하는 `project_urls` 키 (소문자 비교)
const REPOSITORY_KEYS: [&str; 6] = [
    "source",
    "source code",
    "repository",
    "code",
    "github",
    "homepage",
];

/// PyPI 레지스트리
pub struct PypiResolver {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct PypiResponse {
    info: PypiInfo,
    #[serde(default)]
    releases: HashMap<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct PypiInfo {
    name: String,
    version: String,
    #[serde(default)]
    requires_dist: Option<Vec<String>>,
    #[serde(default)]
    project_urls: Option<HashMap<String, String>>,
    #[serde(default)]
    home_page: Option<String>,
}

impl PypiResolver {
    /// 엔진 설정으로 레지스트리를 생성합니다.
    pub fn new(config: &EngineConfig) -> Result<Self, ScanError> {
        Ok(Self {
            http: http::build_client(&config.user_agent, config.http_timeout_secs)?,
            base_url: config.pypi_url.clone(),
        })
    }

    fn project_url(&self, name: &str, version: Option<&str>) -> String {
        match version {
            Some(v) => format!(
                "{}/pypi/{}/{}/json",
                self.base_url,
                encode(name),
                encode(v)
            ),
            None => format!("{}/pypi/{}/json", self.base_url, encode(name)),
        }
    }
}

impl EcosystemResolver for PypiResolver {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::PyPi
    }

    fn max_depth(&self) -> usize {
        PYPI_MAX_DEPTH
    }

    async fn fetch_node(&self, name: &str, version: Option<&str>) -> Result<RegistryNode, ScanError> {
        let url = self.project_url(name, version);
        let response: PypiResponse = http::get_json(&self.http, &url).await?;
        let info = response.info;

        let dependencies = info
            .requires_dist
            .unwrap_or_default()
            .iter()
            .filter_map(|req| requirement_name(req))
            .map(ChildEdge::latest)
            .collect();
        let repository = repository_url(info.project_urls.as_ref(), info.home_page.as_deref());

        Ok(RegistryNode {
            name: info.name,
            version: info.version,
            dependencies,
            repository,
        })
    }

    async fn list_versions(&self, name: &str) -> Result<Vec<String>, ScanError> {
        let url = self.project_url(name, None);
        let response: PypiResponse = http::get_json(&self.http, &url).await?;
        Ok(response.releases.into_keys().collect())
    }
}

/// `requires_dist` 항목에서 패키지 이름을 추출합니다. 선택(extra) 의존성은 None.
///
/// `"urllib3 (<3,>=1.21.1)"` -> `Some("urllib3")`,
/// `"PySocks!=1.5.7; extra == \"socks\""` -> `None`
fn requirement_name(requirement: &str) -> Option<String> {
    let (spec, marker) = match requirement.split_once(';') {
        Some((spec, marker)) => (spec, marker),
        None => (requirement, ""),
    };
    let compact: String = marker.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.contains("extra==") {
        return None;
    }

    let name: String = spec
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    (!name.is_empty()).then_some(name)
}

/// 저장소로 보이는 URL을 고릅니다. GitHub URL을 우선합니다.
fn repository_url(
    project_urls: Option<&HashMap<String, String>>,
    home_page: Option<&str>,
) -> Option<String> {
    let mut candidates: Vec<(&str, &str)> = project_urls
        .map(|urls| urls.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect())
        .unwrap_or_default();
    // HashMap 순서에 의존하지 않도록 키 우선순위로 정렬
    candidates.sort_by_key(|(key, _)| {
        let key = key.to_lowercase();
        REPOSITORY_KEYS
            .iter()
            .position(|k| *k == key)
            .unwrap_or(REPOSITORY_KEYS.len())
    });

    candidates
        .iter()
        .map(|(_, url)| *url)
        .chain(home_page)
        .find(|url| url.contains("github.com"))
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requirement_names() {
        assert_eq!(
            requirement_name("urllib3 (<3,>=1.21.1)").as_deref(),
            Some("urllib3")
        );
        assert_eq!(
            requirement_name("charset-normalizer<4,>=2").as_deref(),
            Some("charset-normalizer")
        );
        assert_eq!(
            requirement_name("idna<4,>=2.5; python_version >= \"3\"").as_deref(),
            Some("idna")
        );
        assert_eq!(
            requirement_name("PySocks!=1.5.7,>=1.5.6; extra == \"socks\""),
            None
        );
        assert_eq!(requirement_name("chardet; extra=='use_chardet'"), None);
    }

    #[test]
    fn repository_prefers_source_key() {
        let urls = HashMap::from([
            (
                "Documentation".to_owned(),
                "https://requests.readthedocs.io".to_owned(),
            ),
            (
                "Source".to_owned(),
                "https://github.com/psf/requests".to_owned(),
            ),
        ]);
        assert_eq!(
            repository_url(Some(&urls), None).as_deref(),
            Some("https://github.com/psf/requests")
        );
        assert_eq!(
            repository_url(None, Some("https://github.com/pallets/flask")).as_deref(),
            Some("https://github.com/pallets/flask")
        );
        assert_eq!(repository_url(None, Some("https://example.org")), None);
    }

    #[test]
    fn project_urls_with_and_without_version() {
        let config = EngineConfig::default();
        let resolver = PypiResolver::new(&config).unwrap();
        assert_eq!(
            resolver.project_url("requests", None),
            "https://pypi.org/pypi/requests/json"
        );
        assert_eq!(
            resolver.project_url("requests", Some("2.19.0")),
            "https://pypi.org/pypi/requests/2.19.0/json"
        );
    }
}
