//! package.json / package-lock.json 파서
//!
//! [`NpmManifestParser`]는 두 형식을 모두 처리합니다.
//!
//! - `package.json`: `dependencies`(운영)와 `devDependencies`(개발)의 버전 범위에서
//!   선행 연산자를 제거한 첫 번째 구체 버전을 사용합니다.
//! - `package-lock.json`: lockfile v2/v3의 `packages` 맵을 우선 사용하고,
//!   없으면 v1의 중첩 `dependencies` 맵을 사용합니다.
//!
//! # package-lock.json v3 형식 예시
//!
//! ```json
//! {
//!   "name": "my-app",
//!   "lockfileVersion": 3,
//!   "packages": {
//!     "": { "name": "my-app", "version": "1.0.0" },
//!     "node_modules/lodash": { "version": "4.17.21" },
//!     "node_modules/jest": { "version": "29.7.0", "dev": true }
//!   }
//! }
//! ```

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;

use crate::error::ScanError;
use crate::manifest::{ManifestDependency, ManifestParser};
use crate::types::Ecosystem;

/// package.json / package-lock.json 파서
pub struct NpmManifestParser;

/// package.json 구조 (파싱용)
#[derive(Deserialize)]
struct PackageJson {
    #[serde(default)]
    dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: BTreeMap<String, serde_json::Value>,
}

/// package-lock.json 구조 (파싱용)
#[derive(Deserialize)]
struct NpmLockFile {
    #[serde(default)]
    packages: BTreeMap<String, LockPackageEntry>,
    #[serde(default)]
    dependencies: BTreeMap<String, LockV1Entry>,
}

/// lockfile v2/v3 `packages` 항목
#[derive(Deserialize)]
struct LockPackageEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    dev: bool,
    #[serde(default)]
    link: bool,
}

/// lockfile v1 `dependencies` 항목 (중첩 가능)
#[derive(Deserialize)]
struct LockV1Entry {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    dev: bool,
    #[serde(default)]
    dependencies: BTreeMap<String, LockV1Entry>,
}

impl ManifestParser for NpmManifestParser {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Npm
    }

    fn can_parse(&self, file_name: &str) -> bool {
        file_name == "package.json" || file_name == "package-lock.json"
    }

    fn parse(&self, content: &str, file_name: &str) -> Result<Vec<ManifestDependency>, ScanError> {
        let parse_err = |e: serde_json::Error| ScanError::ManifestParse {
            file_name: file_name.to_owned(),
            reason: e.to_string(),
        };

        if file_name == "package-lock.json" {
            let lock: NpmLockFile = serde_json::from_str(content).map_err(parse_err)?;
            return Ok(parse_lockfile(&lock));
        }

        let manifest: PackageJson = serde_json::from_str(content).map_err(parse_err)?;
        let prod = manifest
            .dependencies
            .iter()
            .map(|(name, spec)| ManifestDependency::new(name, normalize_spec(spec)));
        let dev = manifest
            .dev_dependencies
            .iter()
            .map(|(name, spec)| ManifestDependency::dev(name, normalize_spec(spec)));
        Ok(prod.chain(dev).collect())
    }
}

fn parse_lockfile(lock: &NpmLockFile) -> Vec<ManifestDependency> {
    let mut seen = HashSet::new();
    let mut deps = Vec::new();

    if !lock.packages.is_empty() {
        for (key, entry) in &lock.packages {
            // 루트 패키지(빈 키)와 워크스페이스 링크는 건너뜀
            if key.is_empty() || entry.link {
                continue;
            }
            let Some(name) = entry
                .name
                .clone()
                .or_else(|| extract_package_name(key).map(str::to_owned))
            else {
                continue;
            };
            let Some(version) = entry.version.clone() else {
                continue;
            };
            if seen.insert(format!("{name}@{version}")) {
                deps.push(ManifestDependency {
                    name,
                    version: Some(version),
                    dev: entry.dev,
                });
            }
        }
        return deps;
    }

    collect_v1(&lock.dependencies, &mut seen, &mut deps);
    deps
}

fn collect_v1(
    entries: &BTreeMap<String, LockV1Entry>,
    seen: &mut HashSet<String>,
    deps: &mut Vec<ManifestDependency>,
) {
    for (name, entry) in entries {
        if let Some(version) = &entry.version {
            if seen.insert(format!("{name}@{version}")) {
                deps.push(ManifestDependency {
                    name: name.clone(),
                    version: Some(version.clone()),
                    dev: entry.dev,
                });
            }
        }
        collect_v1(&entry.dependencies, seen, deps);
    }
}

/// "node_modules/@scope/name" 또는 중첩 경로에서 패키지명 추출
fn extract_package_name(key: &str) -> Option<&str> {
    const PREFIX: &str = "node_modules/";
    key.rfind(PREFIX)
        .map(|pos| &key[pos + PREFIX.len()..])
        .filter(|name| !name.is_empty())
}

/// 버전 범위 문자열에서 구체 버전을 추출합니다.
///
/// 레지스트리 버전이 아닌 지정자(git, 파일 경로, 태그, 와일드카드)는 `None`입니다.
fn normalize_spec(spec: &serde_json::Value) -> Option<String> {
    let spec = spec.as_str()?.trim();

    const NON_REGISTRY: [&str; 10] = [
        "git:", "git+", "github:", "file:", "link:", "workspace:", "http:", "https:", "npm:",
        "portal:",
    ];
    if spec.is_empty() || NON_REGISTRY.iter().any(|p| spec.starts_with(p)) || spec.contains('/') {
        return None;
    }

    let first = spec
        .split("||")
        .next()
        .unwrap_or_default()
        .split_whitespace()
        .next()
        .unwrap_or_default();
    let version = first.trim_start_matches(['^', '~', '=', '>', '<', 'v', ' ']);

    let is_concrete = version.starts_with(|c: char| c.is_ascii_digit())
        && !version
            .split('.')
            .any(|part| matches!(part, "x" | "X" | "*"));
    is_concrete.then(|| version.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PACKAGE_JSON: &str = r#"{
  "name": "web-app",
  "version": "1.0.0",
  "dependencies": {
    "express": "^4.18.2",
    "lodash": "~4.17.20",
    "left-pad": "1.3.0",
    "my-lib": "git+https://github.com/org/my-lib.git",
    "local": "file:../local",
    "anything": "*",
    "tagged": "latest",
    "minor-range": "2.x"
  },
  "devDependencies": {
    "jest": ">=29.0.0 <30",
    "typescript": "v5.2.2"
  }
}"#;

    const SAMPLE_PACKAGE_LOCK: &str = r#"{
  "name": "web-app",
  "lockfileVersion": 3,
  "packages": {
    "": { "name": "web-app", "version": "1.0.0" },
    "node_modules/lodash": { "version": "4.17.21" },
    "node_modules/express": { "version": "4.18.2" },
    "node_modules/express/node_modules/debug": { "version": "2.6.9" },
    "node_modules/@types/node": { "version": "20.8.0", "dev": true },
    "node_modules/other/node_modules/lodash": { "version": "4.17.21" },
    "node_modules/shared": { "link": true }
  }
}"#;

    fn find<'a>(deps: &'a [ManifestDependency], name: &str) -> &'a ManifestDependency {
        deps.iter()
            .find(|d| d.name == name)
            .unwrap_or_else(|| panic!("{name} not found"))
    }

    #[test]
    fn can_parse_npm_files() {
        assert!(NpmManifestParser.can_parse("package.json"));
        assert!(NpmManifestParser.can_parse("package-lock.json"));
        assert!(!NpmManifestParser.can_parse("yarn.lock"));
        assert!(!NpmManifestParser.can_parse("composer.json"));
    }

    #[test]
    fn package_json_prefixes_stripped() {
        let deps = NpmManifestParser
            .parse(SAMPLE_PACKAGE_JSON, "package.json")
            .unwrap();
        assert_eq!(deps.len(), 10);
        assert_eq!(find(&deps, "express").version.as_deref(), Some("4.18.2"));
        assert_eq!(find(&deps, "lodash").version.as_deref(), Some("4.17.20"));
        assert_eq!(find(&deps, "left-pad").version.as_deref(), Some("1.3.0"));
        assert_eq!(find(&deps, "jest").version.as_deref(), Some("29.0.0"));
        assert_eq!(find(&deps, "typescript").version.as_deref(), Some("5.2.2"));
    }

    #[test]
    fn package_json_non_registry_specs_resolve_latest() {
        let deps = NpmManifestParser
            .parse(SAMPLE_PACKAGE_JSON, "package.json")
            .unwrap();
        for name in ["my-lib", "local", "anything", "tagged", "minor-range"] {
            assert_eq!(find(&deps, name).version, None, "{name}");
        }
    }

    #[test]
    fn package_json_dev_flag() {
        let deps = NpmManifestParser
            .parse(SAMPLE_PACKAGE_JSON, "package.json")
            .unwrap();
        assert!(find(&deps, "jest").dev);
        assert!(!find(&deps, "express").dev);
    }

    #[test]
    fn package_json_without_dependencies() {
        let deps = NpmManifestParser
            .parse(r#"{"name":"empty"}"#, "package.json")
            .unwrap();
        assert!(deps.is_empty());
    }

    #[test]
    fn lockfile_v3_packages() {
        let deps = NpmManifestParser
            .parse(SAMPLE_PACKAGE_LOCK, "package-lock.json")
            .unwrap();
        // 루트, 링크, 중복 lodash 제외
        assert_eq!(deps.len(), 4);
        assert_eq!(find(&deps, "debug").version.as_deref(), Some("2.6.9"));
        assert!(find(&deps, "@types/node").dev);
        assert!(deps.iter().all(|d| d.name != "shared"));
    }

    #[test]
    fn lockfile_v1_nested_dependencies() {
        let lock = r#"{
  "lockfileVersion": 1,
  "dependencies": {
    "express": {
      "version": "4.17.1",
      "dependencies": { "debug": { "version": "2.6.9" } }
    },
    "mocha": { "version": "10.2.0", "dev": true }
  }
}"#;
        let deps = NpmManifestParser.parse(lock, "package-lock.json").unwrap();
        assert_eq!(deps.len(), 3);
        assert_eq!(find(&deps, "debug").version.as_deref(), Some("2.6.9"));
        assert!(find(&deps, "mocha").dev);
    }

    #[test]
    fn invalid_json_returns_parse_error() {
        let err = NpmManifestParser
            .parse("not json!", "package-lock.json")
            .unwrap_err();
        assert!(matches!(err, ScanError::ManifestParse { .. }));
    }

    #[test]
    fn extract_package_name_variants() {
        assert_eq!(extract_package_name("node_modules/lodash"), Some("lodash"));
        assert_eq!(
            extract_package_name("node_modules/@types/node"),
            Some("@types/node")
        );
        assert_eq!(
            extract_package_name("node_modules/express/node_modules/debug"),
            Some("debug")
        );
        assert_eq!(extract_package_name("packages/workspace-a"), None);
    }
}
