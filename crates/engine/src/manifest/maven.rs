//! pom.xml 파서
//!
//! `<project><dependencies><dependency>` 블록에서 `groupId:artifactId`와 버전을 추출합니다.
//! `${prop}` 버전은 `<properties>`와 `project.version`으로 치환하고, 버전이 없는 의존성은
//! `<dependencyManagement>`에 선언된 버전을 사용합니다. 치환할 수 없으면 `None`입니다.
//!
//! 프로필, 부모 POM 상속, BOM import는 해석하지 않습니다.
//! [`PomDocument`]는 레지스트리에서 받은 POM을 해석할 때도 사용됩니다.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::ScanError;
use crate::manifest::{ManifestDependency, ManifestParser};
use crate::types::Ecosystem;

/// pom.xml 파서
#[derive(Debug, Default)]
pub struct PomParser;

impl PomParser {
    /// 새 파서를 생성합니다.
    pub fn new() -> Self {
        Self
    }
}

impl ManifestParser for PomParser {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Maven
    }

    fn can_parse(&self, file_name: &str) -> bool {
        file_name == "pom.xml"
    }

    fn parse(&self, content: &str, file_name: &str) -> Result<Vec<ManifestDependency>, ScanError> {
        let pom = PomDocument::parse(content).map_err(|reason| ScanError::ManifestParse {
            file_name: file_name.to_owned(),
            reason,
        })?;

        Ok(pom
            .dependencies
            .iter()
            .map(|dep| ManifestDependency {
                name: dep.coordinate(),
                version: pom.effective_version(dep),
                dev: dep.scope.as_deref() == Some("test"),
            })
            .collect())
    }
}

/// POM에 선언된 의존성 한 건
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PomDependency {
    /// groupId
    pub group_id: String,
    /// artifactId
    pub artifact_id: String,
    /// 선언된 버전 (치환 전)
    pub version: Option<String>,
    /// scope (compile, test, provided, runtime, system, import)
    pub scope: Option<String>,
    /// `<optional>true</optional>` 여부
    pub optional: bool,
}

impl PomDependency {
    /// `groupId:artifactId` 좌표
    pub fn coordinate(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }

    /// compile 스코프(또는 스코프 미지정)이며 optional이 아닌지 여부
    pub fn is_runtime_edge(&self) -> bool {
        !self.optional && matches!(self.scope.as_deref(), None | Some("compile"))
    }
}

/// 해석된 POM 문서
#[derive(Debug, Clone, Default)]
pub struct PomDocument {
    /// `<project><version>` (없으면 `<parent><version>`)
    pub project_version: Option<String>,
    /// `<properties>` 값
    pub properties: HashMap<String, String>,
    /// `<dependencies>` 항목 (선언 순서)
    pub dependencies: Vec<PomDependency>,
    /// `<dependencyManagement>` 항목
    pub managed: Vec<PomDependency>,
    /// `<scm><url>`
    pub scm_url: Option<String>,
}

impl PomDocument {
    /// XML 문자열을 파싱합니다.
    ///
    /// # Errors
    ///
    /// XML 구문 오류 시 사유 문자열을 반환합니다.
    pub fn parse(xml: &str) -> Result<Self, String> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut doc = PomDocument::default();
        let mut parent_version = None;
        let mut path: Vec<String> = Vec::new();
        let mut current = PomDependency::default();

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    if name == "dependency" {
                        current = PomDependency::default();
                    }
                    path.push(name);
                }
                Ok(Event::End(_)) => {
                    let closed = path.pop();
                    if closed.as_deref() == Some("dependency") {
                        let dep = std::mem::take(&mut current);
                        if !dep.group_id.is_empty() && !dep.artifact_id.is_empty() {
                            match section(&path) {
                                Section::Dependencies => doc.dependencies.push(dep),
                                Section::Managed => doc.managed.push(dep),
                                Section::Other => {}
                            }
                        }
                    }
                }
                Ok(Event::Text(t)) => {
                    let text = t.unescape().map_err(|e| e.to_string())?.trim().to_owned();
                    if text.is_empty() {
                        continue;
                    }
                    let segments: Vec<&str> = path.iter().map(String::as_str).collect();
                    match segments.as_slice() {
                        ["project", "version"] => doc.project_version = Some(text),
                        ["project", "parent", "version"] => parent_version = Some(text),
                        ["project", "properties", key] => {
                            doc.properties.insert((*key).to_owned(), text);
                        }
                        ["project", "scm", "url"] => doc.scm_url = Some(text),
                        [.., "dependency", field] => match *field {
                            "groupId" => current.group_id = text,
                            "artifactId" => current.artifact_id = text,
                            "version" => current.version = Some(text),
                            "scope" => current.scope = Some(text),
                            "optional" => current.optional = text.eq_ignore_ascii_case("true"),
                            _ => {}
                        },
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

        if doc.project_version.is_none() {
            doc.project_version = parent_version;
        }
        Ok(doc)
    }

    /// 의존성의 실제 버전을 계산합니다.
    ///
    /// 선언된 버전이 없으면 dependencyManagement에서 찾고, `${..}` 참조를 치환합니다.
    pub fn effective_version(&self, dep: &PomDependency) -> Option<String> {
        let declared = dep.version.clone().or_else(|| {
            self.managed
                .iter()
                .find(|m| m.group_id == dep.group_id && m.artifact_id == dep.artifact_id)
                .and_then(|m| m.version.clone())
        })?;
        self.interpolate(&declared)
    }

    /// `${prop}` 참조를 치환합니다. 범위 표기(`[1.0,2.0)`)는 하한을 사용합니다.
    pub fn interpolate(&self, raw: &str) -> Option<String> {
        let mut value = raw.trim().to_owned();

        // 프로퍼티가 다른 프로퍼티를 참조하는 경우를 위해 몇 단계까지 반복
        for _ in 0..4 {
            let Some(start) = value.find("${") else {
                break;
            };
            let end = start + value[start..].find('}')?;
            let key = &value[start + 2..end];
            let replacement = match key {
                "project.version" | "pom.version" | "version" => self.project_version.clone()?,
                other => self.properties.get(other)?.clone(),
            };
            value.replace_range(start..=end, &replacement);
        }

        if value.contains("${") {
            return None;
        }
        let value = range_lower_bound(&value);
        (!value.is_empty()).then(|| value.to_owned())
    }
}

enum Section {
    Dependencies,
    Managed,
    Other,
}

/// `dependency` 요소를 닫은 직후의 경로로 소속 섹션을 판별합니다.
fn section(path: &[String]) -> Section {
    let segments: Vec<&str> = path.iter().map(String::as_str).collect();
    match segments.as_slice() {
        ["project", "dependencies"] => Section::Dependencies,
        ["project", "dependencyManagement", "dependencies"] => Section::Managed,
        _ => Section::Other,
    }
}

fn range_lower_bound(value: &str) -> &str {
    if !value.starts_with(['[', '(']) {
        return value;
    }
    value[1..]
        .split(',')
        .next()
        .unwrap_or_default()
        .trim_end_matches([']', ')'])
        .trim()
}
