//! Maven Central 레지스트리
//!
//! 좌표 `groupId:artifactId`의 groupId는 `.`을 `/`로 바꿔 경로로 사용합니다.
//!
//! - 최신 버전/버전 목록: `GET {maven}/{group}/{artifact}/maven-metadata.xml`
//! - POM: `GET {maven}/{group}/{artifact}/{version}/{artifact}-{version}.pom`
//!
//! compile 스코프(또는 스코프 미지정)이면서 optional이 아닌 의존성만 따라갑니다.
//! 버전은 POM 안의 프로퍼티와 dependencyManagement로 치환하고, 치환되지 않으면 최신으로 해석합니다.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::config::EngineConfig;
use crate::error::ScanError;
use crate::http;
use crate::manifest::maven::PomDocument;
use crate::resolver::{ChildEdge, EcosystemResolver, RegistryNode};
use crate::types::Ecosystem;

const MAVEN_MAX_DEPTH: usize = 2;

/// Maven 레지스트리
pub struct MavenResolver {
    http: reqwest::Client,
    base_url: String,
}

/// `maven-metadata.xml`에서 필요한 값
#[derive(Debug, Default, PartialEq, Eq)]
pub struct MavenMetadata {
    /// `<versioning><release>`
    pub release: Option<String>,
    /// `<versioning><latest>`
    pub latest: Option<String>,
    /// `<versioning><versions><version>` (문서 순서)
    pub versions: Vec<String>,
}

impl MavenMetadata {
    /// metadata XML을 파싱합니다.
    pub fn parse(xml: &str) -> Result<Self, String> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut meta = MavenMetadata::default();
        let mut current: Option<String> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    current = Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                }
                Ok(Event::End(_)) => current = None,
                Ok(Event::Text(t)) => {
                    let text = t.unescape().map_err(|e| e.to_string())?.trim().to_owned();
                    if text.is_empty() {
                        continue;
                    }
                    match current.as_deref() {
                        Some("release") => meta.release = Some(text),
                        Some("latest") => meta.latest = Some(text),
                        Some("version") => meta.versions.push(text),
                        _ => {}
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(format!(
                        "XML parse error at position {}: {e}",
                        reader.error_position()
                    ));
                }
                Ok(_) => {}
            }
        }
        Ok(meta)
    }

    /// release -> latest -> 마지막 version 순서로 최신 버전을 고릅니다.
    pub fn newest(&self) -> Option<&str> {
        self.release
            .as_deref()
            .or(self.latest.as_deref())
            .or(self.versions.last().map(String::as_str))
    }
}

impl MavenResolver {
    /// 엔진 설정으로 레지스트리를 생성합니다.
    pub fn new(config: &EngineConfig) -> Result<Self, ScanError> {
        Ok(Self {
            http: http::build_client(&config.user_agent, config.http_timeout_secs)?,
            base_url: config.maven_url.clone(),
        })
    }

    async fn metadata(&self, name: &str) -> Result<MavenMetadata, ScanError> {
        let (group, artifact) = split_coordinate(name)?;
        let url = format!(
            "{}/{}/{artifact}/maven-metadata.xml",
            self.base_url,
            group.replace('.', "/")
        );
        let body = http::get_text(&self.http, &url).await?;
        MavenMetadata::parse(&body).map_err(|reason| ScanError::RegistryFetch { url, reason })
    }
}

impl EcosystemResolver for MavenResolver {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Maven
    }

    fn max_depth(&self) -> usize {
        MAVEN_MAX_DEPTH
    }

    async fn fetch_node(&self, name: &str, version: Option<&str>) -> Result<RegistryNode, ScanError> {
        let (group, artifact) = split_coordinate(name)?;
        let version = match version {
            Some(v) => v.to_owned(),
            None => {
                let meta = self.metadata(name).await?;
                meta.newest()
                    .map(str::to_owned)
                    .ok_or_else(|| ScanError::RegistryFetch {
                        url: format!("{}/{}", self.base_url, group.replace('.', "/")),
                        reason: format!("no versions published for {name}"),
                    })?
            }
        };

        let url = pom_url(&self.base_url, group, artifact, &version);
        let body = http::get_text(&self.http, &url).await?;
        let pom = PomDocument::parse(&body)
            .map_err(|reason| ScanError::RegistryFetch { url, reason })?;

        let dependencies = pom
            .dependencies
            .iter()
            .filter(|d| d.is_runtime_edge())
            .map(|d| ChildEdge {
                name: d.coordinate(),
                version: pom.effective_version(d),
            })
            .collect();

        Ok(RegistryNode {
            name: name.to_owned(),
            version,
            dependencies,
            repository: pom.scm_url,
        })
    }

    async fn list_versions(&self, name: &str) -> Result<Vec<String>, ScanError> {
        Ok(self.metadata(name).await?.versions)
    }
}

pub(crate) fn split_coordinate(name: &str) -> Result<(&str, &str), ScanError> {
    match name.split_once(':') {
        Some((group, artifact)) if !group.is_empty() && !artifact.is_empty() => {
            Ok((group, artifact))
        }
        _ => Err(ScanError::validation(
            "package",
            format!("maven package must be groupId:artifactId, got '{name}'"),
        )),
    }
}

fn pom_url(base: &str, group: &str, artifact: &str, version: &str) -> String {
    format!(
        "{base}/{}/{artifact}/{version}/{artifact}-{version}.pom",
        group.replace('.', "/")
    )
}
