//! 보안 점수 계산
//!
//! ```text
//! score = clamp(100 - 25c - 15h - 5m - 1l - penalty, 0, 100)
//! penalty = min(10, floor(max(0, n - 100) / 50))
//! ```
//!
//! `n`은 보고서의 전체 의존성 수입니다.

use crate::types::SeverityCounts;

/// 심각도별 감점
const CRITICAL_WEIGHT: i64 = 25;
const HIGH_WEIGHT: i64 = 15;
const MEDIUM_WEIGHT: i64 = 5;
const LOW_WEIGHT: i64 = 1;

/// 감점 없이 허용되는 의존성 수
const DEPENDENCY_ALLOWANCE: i64 = 100;
/// 의존성 감점 1점당 의존성 수
const DEPENDENCY_STEP: i64 = 50;
/// 의존성 감점 상한
const MAX_DEPENDENCY_PENALTY: i64 = 10;

/// 보안 점수(0-100)를 계산합니다.
///
/// # 사용 예시
///
/// ```
/// use vulnscout_engine::score::calculate_score;
/// use vulnscout_engine::types::SeverityCounts;
///
/// let counts = SeverityCounts { critical: 1, total: 1, ..Default::default() };
/// assert_eq!(calculate_score(&counts, 10), 75);
/// ```
pub fn calculate_score(counts: &SeverityCounts, dependency_count: usize) -> u8 {
    let deductions = CRITICAL_WEIGHT * saturating(counts.critical)
        + HIGH_WEIGHT * saturating(counts.high)
        + MEDIUM_WEIGHT * saturating(counts.medium)
        + LOW_WEIGHT * saturating(counts.low);
    let score = 100_i64
        .saturating_sub(deductions)
        .saturating_sub(dependency_penalty(dependency_count));
    // clamp 후에는 항상 0..=100
    score.clamp(0, 100) as u8
}

/// 의존성 수에 따른 감점 (0-10)
pub fn dependency_penalty(dependency_count: usize) -> i64 {
    let excess = (saturating(dependency_count) - DEPENDENCY_ALLOWANCE).max(0);
    (excess / DEPENDENCY_STEP).min(MAX_DEPENDENCY_PENALTY)
}

/// 큰 개수가 곱셈에서 넘치지 않도록 상한을 둡니다.
fn saturating(count: usize) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX).min(1 << 40)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn counts(critical: usize, high: usize, medium: usize, low: usize) -> SeverityCounts {
        SeverityCounts {
            critical,
            high,
            medium,
            low,
            total: critical
                .saturating_add(high)
                .saturating_add(medium)
                .saturating_add(low),
        }
    }

    #[test]
    fn clean_report_scores_100() {
        assert_eq!(calculate_score(&SeverityCounts::default(), 12), 100);
    }

    #[test]
    fn single_critical_scores_75() {
        assert_eq!(calculate_score(&counts(1, 0, 0, 0), 100), 75);
    }

    #[test]
    fn dependency_penalty_steps() {
        assert_eq!(dependency_penalty(0), 0);
        assert_eq!(dependency_penalty(100), 0);
        assert_eq!(dependency_penalty(149), 0);
        assert_eq!(dependency_penalty(150), 1);
        assert_eq!(dependency_penalty(199), 1);
        assert_eq!(dependency_penalty(250), 3);
        assert_eq!(dependency_penalty(10_000), 10);
        assert_eq!(calculate_score(&SeverityCounts::default(), 150), 99);
    }

    #[test]
    fn mixed_severities() {
        // 100 - 15*2 - 5*3 - 4 = 51
        assert_eq!(calculate_score(&counts(0, 2, 3, 4), 20), 51);
    }

    #[test]
    fn floor_at_zero() {
        assert_eq!(calculate_score(&counts(5, 0, 0, 0), 10), 0);
        assert_eq!(calculate_score(&counts(usize::MAX, usize::MAX, 0, 0), usize::MAX), 0);
    }

    proptest! {
        #[test]
        fn score_matches_formula(
            c in 0usize..10,
            h in 0usize..10,
            m in 0usize..30,
            l in 0usize..120,
            n in 0usize..2000,
        ) {
            let raw = 100 - 25 * c as i64 - 15 * h as i64 - 5 * m as i64 - l as i64
                - ((n as i64 - 100).max(0) / 50).min(10);
            let expected = raw.clamp(0, 100) as u8;
            prop_assert_eq!(calculate_score(&counts(c, h, m, l), n), expected);
        }

        #[test]
        fn score_is_within_bounds(
            c in 0usize..1000,
            h in 0usize..1000,
            m in 0usize..1000,
            l in 0usize..1000,
            n in 0usize..100_000,
        ) {
            let score = calculate_score(&counts(c, h, m, l), n);
            prop_assert!(score <= 100);
        }

        #[test]
        fn more_findings_never_raise_score(c in 0usize..5, h in 0usize..5, n in 0usize..500) {
            let base = calculate_score(&counts(c, h, 0, 0), n);
            let worse = calculate_score(&counts(c + 1, h, 0, 0), n);
            prop_assert!(worse <= base);
        }
    }
}
