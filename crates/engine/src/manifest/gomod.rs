//! go.mod / go.sum 파서
//!
//! - `go.mod`: 한 줄 `require path vX`와 `require ( ... )` 블록. `// indirect` 주석은 제거합니다.
//! - `go.sum`: `module version hash` 줄마다 한 건, `/go.mod` 해시 줄은 건너뜁니다.

use std::collections::HashSet;

use crate::error::ScanError;
use crate::manifest::{ManifestDependency, ManifestParser};
use crate::types::Ecosystem;

/// go.mod / go.sum 파서
pub struct GoModParser;

impl ManifestParser for GoModParser {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Go
    }

    fn can_parse(&self, file_name: &str) -> bool {
        file_name == "go.mod" || file_name == "go.sum"
    }

    fn parse(&self, content: &str, file_name: &str) -> Result<Vec<ManifestDependency>, ScanError> {
        if file_name == "go.sum" {
            return Ok(parse_go_sum(content));
        }
        Ok(parse_go_mod(content))
    }
}

fn parse_go_mod(content: &str) -> Vec<ManifestDependency> {
    let mut deps = Vec::new();
    let mut in_require = false;

    for raw in content.lines() {
        let line = strip_comment(raw);
        if line.is_empty() {
            continue;
        }

        if in_require {
            if line == ")" {
                in_require = false;
            } else if let Some(dep) = require_entry(line) {
                deps.push(dep);
            }
            continue;
        }

        let Some(rest) = line.strip_prefix("require") else {
            continue;
        };
        let rest = rest.trim();
        if rest == "(" {
            in_require = true;
        } else if let Some(dep) = require_entry(rest) {
            deps.push(dep);
        }
    }

    deps
}

fn parse_go_sum(content: &str) -> Vec<ManifestDependency> {
    let mut seen = HashSet::new();
    content
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let module = parts.next()?;
            let version = parts.next()?;
            if version.ends_with("/go.mod") {
                return None;
            }
            seen.insert(format!("{module}@{version}"))
                .then(|| ManifestDependency::new(module, Some(version.to_owned())))
        })
        .collect()
}

/// `path version` 한 항목을 파싱합니다.
fn require_entry(line: &str) -> Option<ManifestDependency> {
    let mut parts = line.split_whitespace();
    let path = parts.next()?;
    let version = parts.next()?;
    Some(ManifestDependency::new(path, Some(version.to_owned())))
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(pos) => line[..pos].trim(),
        None => line.trim(),
    }
}
