//! 매니페스트 파서 -- requirements.txt, package.json, go.mod, Gemfile, pom.xml
//!
//! [`ManifestParser`] trait은 각 매니페스트 형식의 파서가 구현해야 하는 인터페이스입니다.
//! [`ManifestDetector`]는 파일 이름으로 적합한 파서를 찾아 파싱을 위임합니다.
//!
//! # 지원 형식
//!
//! - `requirements*.txt` -- [`RequirementsParser`](requirements::RequirementsParser)
//! - `package.json`, `package-lock.json` -- [`NpmManifestParser`](npm::NpmManifestParser)
//! - `go.mod`, `go.sum` -- [`GoModParser`](gomod::GoModParser)
//! - `Gemfile`, `Gemfile.lock` -- [`GemfileParser`](gemfile::GemfileParser)
//! - `pom.xml` -- [`PomParser`](maven::PomParser)
//!
//! Gemfile과 pom.xml은 전체 파서가 아니라 흔한 선언 형태만 패턴으로 추출합니다.
//! 중첩/조건부 블록(프로필, 부모 POM 상속, `if` 블록 등)은 지원하지 않습니다.

pub mod gemfile;
pub mod gomod;
pub mod maven;
pub mod npm;
pub mod requirements;

use serde::{Deserialize, Serialize};

use crate::error::ScanError;
use crate::types::Ecosystem;

/// 매니페스트에 선언된 의존성 한 건
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestDependency {
    /// 패키지 이름
    pub name: String,
    /// 고정 버전 (None이면 레지스트리 최신 버전으로 해석)
    pub version: Option<String>,
    /// 개발 전용 의존성 여부
    #[serde(default)]
    pub dev: bool,
}

impl ManifestDependency {
    /// 운영 의존성을 생성합니다.
    pub fn new(name: impl Into<String>, version: Option<String>) -> Self {
        Self {
            name: name.into(),
            version,
            dev: false,
        }
    }

    /// 개발 의존성을 생성합니다.
    pub fn dev(name: impl Into<String>, version: Option<String>) -> Self {
        Self {
            name: name.into(),
            version,
            dev: true,
        }
    }
}

/// 파싱된 매니페스트
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedManifest {
    /// 매니페스트의 생태계
    pub ecosystem: Ecosystem,
    /// 원본 파일 이름
    pub file_name: String,
    /// 선언된 의존성 (텍스트 형식은 등장 순서, JSON 형식은 이름 순서)
    pub dependencies: Vec<ManifestDependency>,
}

impl ParsedManifest {
    /// 운영 의존성만 반환합니다.
    pub fn production(&self) -> impl Iterator<Item = &ManifestDependency> {
        self.dependencies.iter().filter(|d| !d.dev)
    }

    /// 개발 의존성만 반환합니다.
    pub fn development(&self) -> impl Iterator<Item = &ManifestDependency> {
        self.dependencies.iter().filter(|d| d.dev)
    }
}

/// 매니페스트 파서 trait
///
/// 각 생태계의 매니페스트 형식을 파싱하여 의존성 목록을 생성합니다.
pub trait ManifestParser: Send + Sync {
    /// 이 파서가 담당하는 생태계를 반환합니다.
    fn ecosystem(&self) -> Ecosystem;

    /// 주어진 파일 이름을 이 파서가 처리할 수 있는지 확인합니다.
    ///
    /// 경로가 아닌 파일 이름(마지막 경로 컴포넌트)으로 판별합니다.
    fn can_parse(&self, file_name: &str) -> bool;

    /// 매니페스트 내용을 파싱하여 의존성 목록을 반환합니다.
    ///
    /// # Arguments
    ///
    /// - `content`: 파일 내용 (UTF-8 문자열)
    /// - `file_name`: 파일 이름 (형식 구분과 에러 메시지용)
    fn parse(&self, content: &str, file_name: &str) -> Result<Vec<ManifestDependency>, ScanError>;
}

/// 매니페스트 탐지기
///
/// 등록된 파서 중 파일 이름을 처리할 수 있는 첫 파서로 파싱을 위임합니다.
pub struct ManifestDetector {
    parsers: Vec<Box<dyn ManifestParser>>,
}

impl ManifestDetector {
    /// 모든 기본 파서를 등록한 탐지기를 생성합니다.
    pub fn new() -> Self {
        Self {
            parsers: vec![
                Box::new(requirements::RequirementsParser),
                Box::new(npm::NpmManifestParser),
                Box::new(gomod::GoModParser),
                Box::new(gemfile::GemfileParser::new()),
                Box::new(maven::PomParser::new()),
            ],
        }
    }

    /// 파일 이름에 해당하는 생태계를 반환합니다.
    pub fn detect_ecosystem(&self, file_name: &str) -> Option<Ecosystem> {
        let base = base_name(file_name);
        self.parsers
            .iter()
            .find(|p| p.can_parse(base))
            .map(|p| p.ecosystem())
    }

    /// 매니페스트를 파싱합니다.
    ///
    /// # Errors
    ///
    /// - `ScanError::UnsupportedManifest`: 알려진 파일 이름 패턴이 아님
    /// - `ScanError::ManifestParse`: 내용이 잘못됨 (예: 잘못된 JSON)
    pub fn parse(&self, content: &str, file_name: &str) -> Result<ParsedManifest, ScanError> {
        let base = base_name(file_name);
        let parser = self
            .parsers
            .iter()
            .find(|p| p.can_parse(base))
            .ok_or_else(|| ScanError::UnsupportedManifest {
                file_name: file_name.to_owned(),
            })?;

        let dependencies = parser.parse(content, base)?;
        Ok(ParsedManifest {
            ecosystem: parser.ecosystem(),
            file_name: base.to_owned(),
            dependencies,
        })
    }
}

impl Default for ManifestDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// 기본 탐지기로 매니페스트를 파싱합니다.
pub fn parse_manifest(content: &str, file_name: &str) -> Result<ParsedManifest, ScanError> {
    ManifestDetector::new().parse(content, file_name)
}

/// 경로의 마지막 컴포넌트를 반환합니다 (`/` 와 `\` 모두 구분자로 취급).
fn base_name(file_name: &str) -> &str {
    file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detector_recognizes_all_formats() {
        let detector = ManifestDetector::new();
        let cases = [
            ("requirements.txt", Ecosystem::PyPi),
            ("requirements-dev.txt", Ecosystem::PyPi),
            ("package.json", Ecosystem::Npm),
            ("package-lock.json", Ecosystem::Npm),
            ("go.mod", Ecosystem::Go),
            ("go.sum", Ecosystem::Go),
            ("Gemfile", Ecosystem::RubyGems),
            ("Gemfile.lock", Ecosystem::RubyGems),
            ("pom.xml", Ecosystem::Maven),
        ];
        for (name, eco) in cases {
            assert_eq!(detector.detect_ecosystem(name), Some(eco), "{name}");
        }
    }

    #[test]
    fn detector_uses_final_path_component() {
        let detector = ManifestDetector::new();
        assert_eq!(
            detector.detect_ecosystem("/srv/app/frontend/package.json"),
            Some(Ecosystem::Npm)
        );
        assert_eq!(
            detector.detect_ecosystem("C:\\work\\api\\pom.xml"),
            Some(Ecosystem::Maven)
        );
    }

    #[test]
    fn unknown_file_is_unsupported() {
        let err = parse_manifest("", "build.gradle").unwrap_err();
        assert!(matches!(err, ScanError::UnsupportedManifest { .. }));
        let err = parse_manifest("", "Cargo.lock").unwrap_err();
        assert!(matches!(err, ScanError::UnsupportedManifest { .. }));
    }

    #[test]
    fn requirements_scenario() {
        let parsed = parse_manifest("foo==1.2.3\n# comment\nbar>=2.0\n", "requirements.txt")
            .expect("requirements should parse");
        assert_eq!(parsed.ecosystem, Ecosystem::PyPi);
        assert_eq!(
            parsed.dependencies,
            vec![
                ManifestDependency::new("foo", Some("1.2.3".to_owned())),
                ManifestDependency::new("bar", Some("2.0".to_owned())),
            ]
        );
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = parse_manifest("{ not json", "package.json").unwrap_err();
        assert!(matches!(err, ScanError::ManifestParse { .. }));
    }

    #[test]
    fn production_and_development_views() {
        let parsed = parse_manifest(
            r#"{"dependencies":{"express":"^4.18.2"},"devDependencies":{"jest":"~29.7.0"}}"#,
            "package.json",
        )
        .unwrap();
        let prod: Vec<_> = parsed.production().map(|d| d.name.as_str()).collect();
        let dev: Vec<_> = parsed.development().map(|d| d.name.as_str()).collect();
        assert_eq!(prod, vec!["express"]);
        assert_eq!(dev, vec!["jest"]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        const NAMES: [&str; 8] = [
            "requirements.txt",
            "package.json",
            "package-lock.json",
            "go.mod",
            "go.sum",
            "Gemfile",
            "Gemfile.lock",
            "pom.xml",
        ];

        proptest! {
            #[test]
            fn parse_never_panics(content in "\\PC{0,512}", idx in 0usize..8) {
                let name = NAMES[idx];
                if let Ok(parsed) = parse_manifest(&content, name) {
                    prop_assert_eq!(
                        Some(parsed.ecosystem),
                        ManifestDetector::new().detect_ecosystem(name)
                    );
                }
            }

            #[test]
            fn requirements_lines_keep_pinned_versions(
                name in "[a-z][a-z0-9_-]{0,15}",
                version in "[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}",
            ) {
                let content = format!("{name}=={version}\n");
                let parsed = parse_manifest(&content, "requirements.txt").unwrap();
                prop_assert_eq!(parsed.dependencies.len(), 1);
                prop_assert_eq!(parsed.dependencies[0].version.as_deref(), Some(version.as_str()));
            }
        }
    }
}
