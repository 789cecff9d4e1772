//! Gemfile / Gemfile.lock 파서
//!
//! - `Gemfile`: `gem 'name'[, 'requirement', ...]` 선언에서 이름과 첫 번째 버전 요구사항을
//!   추출합니다. `group :development`/`:test` 블록 안의 gem은 개발 의존성입니다.
//! - `Gemfile.lock`: `specs:` 섹션에서 정확히 4칸 들여쓰기된 `name (version)` 줄만 사용합니다.
//!   6칸 들여쓰기 줄은 하위 의존성 요구사항이므로 무시합니다.
//!
//! Ruby 코드를 해석하지 않으므로 `if` 블록이나 동적으로 생성한 선언은 구분하지 않습니다.

use std::collections::HashSet;

use crate::error::ScanError;
use crate::manifest::{ManifestDependency, ManifestParser};
use crate::types::Ecosystem;

/// Gemfile / Gemfile.lock 파서
#[derive(Debug, Default)]
pub struct GemfileParser;

impl GemfileParser {
    /// 새 파서를 생성합니다.
    pub fn new() -> Self {
        Self
    }
}

/// 플랫폼 전용 gem 버전 접미사 (`1.14.0-x86_64-linux`)
const PLATFORM_MARKERS: [&str; 6] = ["linux", "darwin", "mingw", "mswin", "java", "musl"];

impl ManifestParser for GemfileParser {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::RubyGems
    }

    fn can_parse(&self, file_name: &str) -> bool {
        file_name == "Gemfile" || file_name == "Gemfile.lock"
    }

    fn parse(&self, content: &str, file_name: &str) -> Result<Vec<ManifestDependency>, ScanError> {
        if file_name == "Gemfile.lock" {
            return Ok(parse_lockfile(content));
        }
        Ok(parse_gemfile(content))
    }
}

fn parse_gemfile(content: &str) -> Vec<ManifestDependency> {
    let mut deps = Vec::new();
    // 열린 do/if 블록마다 개발 그룹 여부를 기록
    let mut blocks: Vec<bool> = Vec::new();

    for raw in content.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line == "end" {
            blocks.pop();
            continue;
        }

        if line.starts_with("group") && opens_block(line) {
            let dev = line.contains(":development") || line.contains(":test");
            blocks.push(dev);
            continue;
        }

        if let Some((name, version)) = parse_gem_line(line) {
            let dev = blocks.iter().any(|&d| d)
                || line.contains("group: :development")
                || line.contains("group: :test");
            deps.push(ManifestDependency { name, version, dev });
            continue;
        }

        if opens_block(line) || line.starts_with("if ") || line.starts_with("unless ") {
            blocks.push(false);
        }
    }

    deps
}

fn opens_block(line: &str) -> bool {
    line.ends_with(" do") || (line.contains(" do |") && line.ends_with('|'))
}

/// `gem "name", "~> 1.2", require: false` -> `("name", Some("1.2"))`
fn parse_gem_line(line: &str) -> Option<(String, Option<String>)> {
    let rest = line
        .strip_prefix("gem ")
        .or_else(|| line.strip_prefix("gem("))?;
    let rest = rest.trim_end_matches(')');

    let mut args = rest.split(',').map(str::trim);
    let name = unquote(args.next()?)?;
    if name.is_empty() {
        return None;
    }

    // 키워드 인자(git:, path:, require: 등)에 도달하면 중단
    let version = args
        .map_while(unquote)
        .find(|req| req.chars().any(|c| c.is_ascii_digit()))
        .and_then(strip_requirement);

    Some((name.to_owned(), version))
}

fn unquote(arg: &str) -> Option<&str> {
    let arg = arg.trim();
    let quote = arg.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    arg[1..].strip_suffix(quote)
}

/// `~> 6.1.0`, `>= 2.3` 같은 요구사항에서 버전만 남깁니다.
fn strip_requirement(req: &str) -> Option<String> {
    let version = req
        .trim_start_matches(['~', '>', '<', '=', '!', ' '])
        .split_whitespace()
        .next()?;
    version
        .starts_with(|c: char| c.is_ascii_digit())
        .then(|| version.to_owned())
}

fn parse_lockfile(content: &str) -> Vec<ManifestDependency> {
    let mut seen = HashSet::new();
    let mut deps = Vec::new();
    let mut in_specs = false;

    for line in content.lines() {
        // 들여쓰기 없는 줄은 새 섹션 헤더 (GEM, GIT, PLATFORMS, DEPENDENCIES ...)
        if !line.starts_with(' ') {
            in_specs = false;
            continue;
        }
        if line.trim() == "specs:" {
            in_specs = true;
            continue;
        }
        if !in_specs {
            continue;
        }

        let Some(entry) = line.strip_prefix("    ") else {
            continue;
        };
        if entry.starts_with(' ') {
            continue;
        }

        let Some((name, version)) = parse_spec_entry(entry) else {
            continue;
        };
        if seen.insert(format!("{name}@{version}")) {
            deps.push(ManifestDependency::new(name, Some(version)));
        }
    }

    deps
}

/// `nokogiri (1.14.0-x86_64-linux)` -> `("nokogiri", "1.14.0")`
fn parse_spec_entry(entry: &str) -> Option<(String, String)> {
    let (name, rest) = entry.trim().split_once(" (")?;
    let raw = rest.strip_suffix(')')?.trim();

    let version = match raw.split_once('-') {
        Some((base, platform)) if PLATFORM_MARKERS.iter().any(|m| platform.contains(m)) => base,
        _ => raw,
    };
    if name.is_empty() || version.is_empty() {
        return None;
    }
    Some((name.to_owned(), version.to_owned()))
}
