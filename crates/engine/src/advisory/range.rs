//! 어드바이저리 영향 범위 평가
//!
//! 버전 없이 조회한 결과를 클라이언트에서 다시 거를 때 사용합니다.
//!
//! # 평가 규칙
//!
//! 범위의 이벤트를 선언 순서대로 훑으면서:
//!
//! - `introduced`가 `"0"`이거나 조회 버전 이하이면 영향 상태가 됩니다.
//! - 영향 상태에서 `fixed`가 조회 버전 이하이면 (이미 수정 버전에 도달) 해제됩니다.
//! - 영향 상태에서 `last_affected`가 조회 버전보다 작으면 해제됩니다.
//!
//! `introduced` 이벤트가 하나도 없는 범위는 영향받는 것으로 간주합니다.
//! `affected[].versions`에 조회 버전이 명시되어 있어도 영향받습니다.
//! `GIT` 범위는 커밋 해시 기반이므로 평가하지 않습니다.

use std::cmp::Ordering;

use crate::advisory::osv::{OsvAffected, OsvRange};
use crate::version::{compare_versions, strip_v};

/// 어드바이저리의 영향 목록이 주어진 패키지 버전을 포함하는지 평가합니다.
pub fn is_affected(affected: &[OsvAffected], package: &str, version: &str) -> bool {
    affected
        .iter()
        .filter(|a| {
            a.package
                .as_ref()
                .is_none_or(|p| p.name.eq_ignore_ascii_case(package))
        })
        .any(|a| {
            a.versions.iter().any(|v| strip_v(v) == strip_v(version))
                || a.ranges
                    .iter()
                    .filter(|r| !r.kind.eq_ignore_ascii_case("GIT"))
                    .any(|r| range_contains(r, version))
        })
}

/// 단일 범위가 버전을 포함하는지 평가합니다.
pub fn range_contains(range: &OsvRange, version: &str) -> bool {
    let mut affected = false;
    let mut saw_introduced = false;

    for event in &range.events {
        if let Some(introduced) = &event.introduced {
            saw_introduced = true;
            if introduced == "0" || compare_versions(introduced, version) != Ordering::Greater {
                affected = true;
            }
        } else if let Some(fixed) = &event.fixed {
            if affected && compare_versions(fixed, version) != Ordering::Greater {
                affected = false;
            }
        } else if let Some(last) = &event.last_affected {
            if affected && compare_versions(last, version) == Ordering::Less {
                affected = false;
            }
        } else if let Some(limit) = &event.limit {
            if affected && compare_versions(limit, version) != Ordering::Greater {
                affected = false;
            }
        }
    }

    if !saw_introduced {
        return true;
    }
    affected
}
