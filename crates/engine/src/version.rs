//! 버전 비교 -- SemVer 우선, 세그먼트 비교 fallback
//!
//! `semver` 크레이트로 파싱 가능한 버전은 SemVer 규칙으로 비교합니다.
//! 그 외 형식(PyPI `2.0rc1`, Maven `5.3.1.RELEASE`, `1.2` 등)은
//! 구분자(`.`, `-`, `+`, `_`)로 나눈 세그먼트를 숫자 우선으로 비교합니다.

use std::cmp::Ordering;

/// 선행 `v` 접두사를 제거합니다 (`v1.2.3` -> `1.2.3`).
pub fn strip_v(version: &str) -> &str {
    let trimmed = version.trim();
    match trimmed.strip_prefix('v').or_else(|| trimmed.strip_prefix('V')) {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
        _ => trimmed,
    }
}

/// 두 버전 문자열을 비교합니다.
///
/// 둘 다 SemVer로 파싱되면 SemVer 순서를, 아니면 세그먼트 비교를 사용합니다.
/// 누락된 세그먼트는 `0`으로 간주하므로 `1.0`과 `1.0.0`은 같습니다.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let (a, b) = (strip_v(a), strip_v(b));

    if let (Ok(va), Ok(vb)) = (semver::Version::parse(a), semver::Version::parse(b)) {
        return va.cmp(&vb);
    }

    compare_segments(a, b)
}

/// 선행 숫자 컴포넌트(메이저)를 반환합니다.
///
/// `"v2.3.1"` -> `Some(2)`, `"latest"` -> `None`
pub fn major_component(version: &str) -> Option<u64> {
    let digits: String = strip_v(version)
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// 버전 목록을 오름차순으로 정렬합니다.
pub fn sort_versions(versions: &mut [String]) {
    versions.sort_by(|a, b| compare_versions(a, b));
}

/// 버전 목록에서 가장 높은 버전을 반환합니다.
pub fn max_version<'a, I>(versions: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    versions
        .into_iter()
        .max_by(|a, b| compare_versions(a, b))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment<'a> {
    number: Option<u64>,
    suffix: &'a str,
}

const ZERO_SEGMENT: Segment<'static> = Segment {
    number: Some(0),
    suffix: "",
};

fn segments(version: &str) -> Vec<Segment<'_>> {
    version
        .split(['.', '-', '+', '_'])
        .filter(|s| !s.is_empty())
        .map(|s| {
            let split = s
                .char_indices()
                .find(|(_, c)| !c.is_ascii_digit())
                .map(|(i, _)| i)
                .unwrap_or(s.len());
            let (digits, suffix) = s.split_at(split);
            Segment {
                number: digits.parse().ok(),
                suffix,
            }
        })
        .collect()
}

fn compare_segments(a: &str, b: &str) -> Ordering {
    let sa = segments(a);
    let sb = segments(b);
    let len = sa.len().max(sb.len());

    for i in 0..len {
        let x = sa.get(i).unwrap_or(&ZERO_SEGMENT);
        let y = sb.get(i).unwrap_or(&ZERO_SEGMENT);
        let ord = compare_segment(x, y);
        if ord != Ordering::Equal {
            return ord;
        }
    }

    Ordering::Equal
}

fn compare_segment(x: &Segment<'_>, y: &Segment<'_>) -> Ordering {
    match (x.number, y.number) {
        (Some(nx), Some(ny)) => nx.cmp(&ny).then_with(|| compare_suffix(x.suffix, y.suffix)),
        // 숫자 세그먼트가 문자 세그먼트(rc, beta 등)보다 높음
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => x.suffix.cmp(y.suffix),
    }
}

/// 접미사가 없는 쪽이 정식 릴리스이므로 더 높습니다 (`2rc1` < `2`).
fn compare_suffix(x: &str, y: &str) -> Ordering {
    match (x.is_empty(), y.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => x.cmp(y),
    }
}
