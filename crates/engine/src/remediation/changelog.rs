//! 체인지로그 휴리스틱
//!
//! 의존성의 저장소 URL에서 GitHub `owner/repo`를 추출하고, raw 콘텐츠 호스트에서
//! `main`/`master` 브랜치의 `CHANGELOG.md`, `CHANGES.md`, `HISTORY.md`를 차례로 시도합니다.
//! 대상 버전 섹션 안에서 breaking/removed/deprecated를 언급하는 줄을 최대 10개 추출합니다.
//!
//! 모든 실패는 빈 결과로 처리됩니다.

use regex::Regex;
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::ScanError;
use crate::http;

/// 시도할 브랜치
const BRANCHES: [&str; 2] = ["main", "master"];
/// 시도할 파일 이름
const CHANGELOG_FILES: [&str; 3] = ["CHANGELOG.md", "CHANGES.md", "HISTORY.md"];
/// 추출 키워드 (소문자)
const KEYWORDS: [&str; 3] = ["breaking", "removed", "deprecated"];
/// 추출할 최대 줄 수
const MAX_LINES: usize = 10;

/// 체인지로그 조회 클라이언트
pub struct ChangelogClient {
    http: reqwest::Client,
    base_url: String,
}

impl ChangelogClient {
    /// 엔진 설정으로 클라이언트를 생성합니다.
    pub fn new(config: &EngineConfig) -> Result<Self, ScanError> {
        Ok(Self {
            http: http::build_client(&config.user_agent, config.changelog_timeout_secs)?,
            base_url: config.changelog_base_url.clone(),
        })
    }

    /// 저장소의 체인지로그에서 대상 버전의 breaking change 줄을 찾습니다.
    pub async fn breaking_changes(&self, repository: &str, target_version: &str) -> Vec<String> {
        let Some((owner, repo)) = github_slug(repository) else {
            return Vec::new();
        };

        for branch in BRANCHES {
            for file in CHANGELOG_FILES {
                let url = format!("{}/{owner}/{repo}/{branch}/{file}", self.base_url);
                match http::get_text(&self.http, &url).await {
                    Ok(text) => {
                        let lines = extract_breaking_lines(&text, target_version);
                        debug!(url = %url, found = lines.len(), "changelog fetched");
                        return lines;
                    }
                    Err(e) => debug!(url = %url, error = %e, "changelog candidate unavailable"),
                }
            }
        }
        Vec::new()
    }
}

/// 저장소 URL에서 GitHub `(owner, repo)`를 추출합니다.
///
/// `git+https://github.com/o/r.git`, `git://github.com/o/r`, `git@github.com:o/r.git`,
/// `https://github.com/o/r/tree/main/sub`, `github:o/r` 형식을 인식합니다.
pub fn github_slug(repository: &str) -> Option<(String, String)> {
    let url = repository.trim();
    let path = if let Some(rest) = url.strip_prefix("github:") {
        rest
    } else if let Some(idx) = url.find("github.com") {
        url[idx + "github.com".len()..].trim_start_matches([':', '/'])
    } else {
        return None;
    };

    let mut parts = path.split(['/', '#', '?']).filter(|s| !s.is_empty());
    let owner = parts.next()?;
    let repo = parts.next()?.trim_end_matches(".git");
    if owner.is_empty() || repo.is_empty() {
        return None;
    }
    Some((owner.to_owned(), repo.to_owned()))
}

/// 체인지로그에서 대상 버전 섹션의 breaking change 줄을 추출합니다.
///
/// 섹션은 버전을 담은 마크다운 제목(`## 2.0.0`, `## [v2.0.0] - 2023-01-01`)에서 시작해
/// 같거나 더 높은 레벨의 다음 제목에서 끝납니다.
pub fn extract_breaking_lines(changelog: &str, version: &str) -> Vec<String> {
    let version = crate::version::strip_v(version);
    let pattern = format!(
        r"^(#{{1,6}})\s*\[?v?{}(?:[\]\s):]|$)",
        regex::escape(version)
    );
    let heading = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(e) => {
            debug!(version, error = %e, "changelog heading pattern rejected");
            return Vec::new();
        }
    };

    let mut section_level = None;
    let mut lines = Vec::new();

    for line in changelog.lines() {
        let level = heading_level(line);
        match section_level {
            None => {
                if let Some(caps) = heading.captures(line) {
                    section_level = Some(caps[1].len());
                }
            }
            Some(current) => {
                match level {
                    Some(l) if l <= current => break,
                    Some(_) => continue,
                    None => {}
                }
                let lower = line.to_lowercase();
                if KEYWORDS.iter().any(|k| lower.contains(k)) {
                    let cleaned = line.trim().trim_start_matches(['-', '*', '+']).trim();
                    if !cleaned.is_empty() {
                        lines.push(cleaned.to_owned());
                    }
                    if lines.len() == MAX_LINES {
                        break;
                    }
                }
            }
        }
    }
    lines
}

fn heading_level(line: &str) -> Option<usize> {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    (hashes > 0 && hashes <= 6 && line[hashes..].starts_with(' ')).then_some(hashes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHANGELOG: &str = "# Changelog

## [3.0.0] - 2024-02-01

### Breaking Changes

- Removed the legacy `connect()` helper
- Dropped Node 14 support (BREAKING)
- Fixed typo in README

### Features

- `parse()` is now deprecated in favor of `decode()`

## [2.5.0] - 2023-11-12

- Removed unused dependency
";

    #[test]
    fn slugs_from_repository_urls() {
        let expected = Some(("expressjs".to_owned(), "express".to_owned()));
        assert_eq!(github_slug("git+https://github.com/expressjs/express.git"), expected);
        assert_eq!(github_slug("https://github.com/expressjs/express"), expected);
        assert_eq!(github_slug("git@github.com:expressjs/express.git"), expected);
        assert_eq!(github_slug("github:expressjs/express"), expected);
        assert_eq!(
            github_slug("https://github.com/expressjs/express/tree/master/lib"),
            expected
        );
        assert_eq!(github_slug("https://gitlab.com/group/project"), None);
        assert_eq!(github_slug("https://github.com/only-owner"), None);
    }

    #[test]
    fn extracts_lines_in_target_section() {
        let lines = extract_breaking_lines(CHANGELOG, "3.0.0");
        assert_eq!(
            lines,
            vec![
                "Removed the legacy `connect()` helper",
                "Dropped Node 14 support (BREAKING)",
                "`parse()` is now deprecated in favor of `decode()`",
            ]
        );
    }

    #[test]
    fn section_ends_at_next_version() {
        let lines = extract_breaking_lines(CHANGELOG, "v2.5.0");
        assert_eq!(lines, vec!["Removed unused dependency"]);
    }

    #[test]
    fn version_must_match_exactly() {
        assert!(extract_breaking_lines(CHANGELOG, "3.0").is_empty());
        assert!(extract_breaking_lines(CHANGELOG, "9.9.9").is_empty());
    }

    #[test]
    fn caps_at_ten_lines() {
        let mut text = String::from("## 1.0.0\n");
        for i in 0..20 {
            text.push_str(&format!("- removed api {i}\n"));
        }
        assert_eq!(extract_breaking_lines(&text, "1.0.0").len(), 10);
    }
}
