//! requirements.txt 파서
//!
//! pip 요구사항 파일에서 패키지 이름과 첫 번째 고정 버전을 추출합니다.
//!
//! ```text
//! requests==2.31.0
//! flask[async]>=2.0,<3 ; python_version >= "3.8"
//! -e git+https://github.com/org/tool.git#egg=tool
//! ```

use crate::error::ScanError;
use crate::manifest::{ManifestDependency, ManifestParser};
use crate::types::Ecosystem;

/// requirements*.txt 파서
pub struct RequirementsParser;

/// 버전 지정 연산자 (긴 것부터 검사)
const OPERATORS: [&str; 8] = ["===", "==", ">=", "<=", "~=", "!=", ">", "<"];

impl ManifestParser for RequirementsParser {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::PyPi
    }

    fn can_parse(&self, file_name: &str) -> bool {
        file_name.starts_with("requirements") && file_name.ends_with(".txt")
    }

    fn parse(&self, content: &str, _file_name: &str) -> Result<Vec<ManifestDependency>, ScanError> {
        Ok(content.lines().filter_map(parse_line).collect())
    }
}

fn parse_line(raw: &str) -> Option<ManifestDependency> {
    let line = raw.trim().trim_end_matches('\\').trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    if let Some(target) = line
        .strip_prefix("-e ")
        .or_else(|| line.strip_prefix("--editable"))
    {
        return editable_name(target).map(|name| ManifestDependency::new(name, None));
    }

    // -r, -c, --index-url 등 옵션 줄
    if line.starts_with('-') {
        return None;
    }

    let line = strip_inline_comment(line);
    let line = line.split(';').next().unwrap_or_default().trim();

    // PEP 508 직접 참조: `name @ https://...`
    if let Some((name, _)) = line.split_once(" @ ") {
        let name = strip_extras(name);
        return is_valid_name(name).then(|| ManifestDependency::new(name, None));
    }

    let (name, spec) = match line.find(|c| matches!(c, '=' | '<' | '>' | '~' | '!')) {
        Some(pos) => line.split_at(pos),
        None => (line, ""),
    };
    let name = strip_extras(name.trim());
    if !is_valid_name(name) {
        return None;
    }

    Some(ManifestDependency::new(name, first_version(spec)))
}

/// `#egg=name` 조각에서 패키지 이름을 추출합니다.
fn editable_name(target: &str) -> Option<String> {
    let fragment = target.split("#egg=").nth(1)?;
    let name = fragment
        .split(['&', ' ', '['])
        .next()
        .unwrap_or_default()
        .trim();
    is_valid_name(name).then(|| name.to_owned())
}

fn strip_inline_comment(line: &str) -> &str {
    match line.find(" #") {
        Some(pos) => line[..pos].trim_end(),
        None => line,
    }
}

fn strip_extras(name: &str) -> &str {
    name.split('[').next().unwrap_or_default().trim()
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// 첫 번째 조건절(`,` 이전)의 버전을 반환합니다. 와일드카드는 최신으로 취급합니다.
fn first_version(spec: &str) -> Option<String> {
    let clause = spec.split(',').next().unwrap_or_default().trim();
    let mut rest = clause;
    for op in OPERATORS {
        if let Some(stripped) = clause.strip_prefix(op) {
            rest = stripped;
            break;
        }
    }
    let version = rest.split_whitespace().next().unwrap_or_default();
    if version.is_empty() || version.contains('*') {
        return None;
    }
    Some(version.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Vec<ManifestDependency> {
        RequirementsParser.parse(content, "requirements.txt").unwrap()
    }

    fn dep(name: &str, version: Option<&str>) -> ManifestDependency {
        ManifestDependency::new(name, version.map(str::to_owned))
    }

    #[test]
    fn can_parse_requirement_variants() {
        assert!(RequirementsParser.can_parse("requirements.txt"));
        assert!(RequirementsParser.can_parse("requirements-dev.txt"));
        assert!(RequirementsParser.can_parse("requirements_test.txt"));
        assert!(!RequirementsParser.can_parse("constraints.txt"));
        assert!(!RequirementsParser.can_parse("requirements.in"));
    }

    #[test]
    fn operators_are_stripped() {
        let deps = parse("a===1.0\nb~=2.2\nc!=3.0\nd<4\ne>5.1\nf<=6\n");
        assert_eq!(
            deps,
            vec![
                dep("a", Some("1.0")),
                dep("b", Some("2.2")),
                dep("c", Some("3.0")),
                dep("d", Some("4")),
                dep("e", Some("5.1")),
                dep("f", Some("6")),
            ]
        );
    }

    #[test]
    fn markers_extras_and_ranges() {
        let deps = parse("flask[async]>=2.0,<3 ; python_version >= \"3.8\"\n");
        assert_eq!(deps, vec![dep("flask", Some("2.0"))]);
    }

    #[test]
    fn bare_name_resolves_latest() {
        assert_eq!(parse("django\n"), vec![dep("django", None)]);
    }

    #[test]
    fn options_are_skipped_but_editable_kept() {
        let deps = parse(
            "-r base.txt\n--index-url https://pypi.example/simple\n-c constraints.txt\n\
             -e git+https://github.com/org/tool.git#egg=tool\n",
        );
        assert_eq!(deps, vec![dep("tool", None)]);
    }

    #[test]
    fn inline_comments_and_hash_continuations() {
        let deps = parse(
            "urllib3==1.26.5  # pinned for py2\ncertifi==2023.7.22 \\\n    --hash=sha256:abc\n",
        );
        assert_eq!(
            deps,
            vec![dep("urllib3", Some("1.26.5")), dep("certifi", Some("2023.7.22"))]
        );
    }

    #[test]
    fn direct_url_reference() {
        let deps = parse("pip @ https://github.com/pypa/pip/archive/22.0.zip\n");
        assert_eq!(deps, vec![dep("pip", None)]);
    }

    #[test]
    fn wildcard_version_is_latest() {
        assert_eq!(parse("numpy==1.26.*\n"), vec![dep("numpy", None)]);
    }

    #[test]
    fn empty_content_yields_nothing() {
        assert!(parse("").is_empty());
        assert!(parse("\n\n# only comments\n").is_empty());
    }
}
