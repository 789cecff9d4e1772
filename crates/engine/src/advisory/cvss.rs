//! CVSS v3.x 벡터 -> 기본 점수 변환
//!
//! CVSS 3.1 명세의 Base Score 공식을 그대로 구현합니다. `CVSS:3.0/` 벡터도 같은 공식을 사용합니다.
//! v2, v4 벡터는 지원하지 않으며 `None`을 반환합니다.

/// CVSS v3 벡터 문자열에서 기본 점수를 계산합니다.
///
/// # 예시
///
/// ```
/// use vulnscout_engine::advisory::cvss::base_score;
///
/// let score = base_score("CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H");
/// assert_eq!(score, Some(9.8));
/// ```
pub fn base_score(vector: &str) -> Option<f64> {
    let mut parts = vector.trim().split('/');
    let version = parts.next()?;
    if version != "CVSS:3.1" && version != "CVSS:3.0" {
        return None;
    }

    let mut metrics = Metrics::default();
    for part in parts {
        let (key, value) = part.split_once(':')?;
        metrics.set(key, value)?;
    }
    metrics.score()
}

#[derive(Default)]
struct Metrics<'a> {
    av: Option<&'a str>,
    ac: Option<&'a str>,
    pr: Option<&'a str>,
    ui: Option<&'a str>,
    scope_changed: Option<bool>,
    c: Option<&'a str>,
    i: Option<&'a str>,
    a: Option<&'a str>,
}

impl<'a> Metrics<'a> {
    /// 알 수 없는 기본 메트릭 값이면 `None`. 시간/환경 메트릭은 무시합니다.
    fn set(&mut self, key: &str, value: &'a str) -> Option<()> {
        match key {
            "AV" => self.av = Some(value),
            "AC" => self.ac = Some(value),
            "PR" => self.pr = Some(value),
            "UI" => self.ui = Some(value),
            "S" => {
                self.scope_changed = Some(match value {
                    "U" => false,
                    "C" => true,
                    _ => return None,
                })
            }
            "C" => self.c = Some(value),
            "I" => self.i = Some(value),
            "A" => self.a = Some(value),
            _ => {}
        }
        Some(())
    }

    fn score(&self) -> Option<f64> {
        let changed = self.scope_changed?;

        let av = match self.av? {
            "N" => 0.85,
            "A" => 0.62,
            "L" => 0.55,
            "P" => 0.2,
            _ => return None,
        };
        let ac = match self.ac? {
            "L" => 0.77,
            "H" => 0.44,
            _ => return None,
        };
        let pr = match (self.pr?, changed) {
            ("N", _) => 0.85,
            ("L", false) => 0.62,
            ("L", true) => 0.68,
            ("H", false) => 0.27,
            ("H", true) => 0.5,
            _ => return None,
        };
        let ui = match self.ui? {
            "N" => 0.85,
            "R" => 0.62,
            _ => return None,
        };
        let c = impact_weight(self.c?)?;
        let i = impact_weight(self.i?)?;
        let a = impact_weight(self.a?)?;

        let iss = 1.0 - (1.0 - c) * (1.0 - i) * (1.0 - a);
        let impact = if changed {
            7.52 * (iss - 0.029) - 3.25 * (iss - 0.02).powi(15)
        } else {
            6.42 * iss
        };
        let exploitability = 8.22 * av * ac * pr * ui;

        if impact <= 0.0 {
            return Some(0.0);
        }
        let raw = if changed {
            1.08 * (impact + exploitability)
        } else {
            impact + exploitability
        };
        Some(round_up(raw.min(10.0)))
    }
}

fn impact_weight(value: &str) -> Option<f64> {
    match value {
        "H" => Some(0.56),
        "L" => Some(0.22),
        "N" => Some(0.0),
        _ => None,
    }
}

/// CVSS 3.1 부록 A의 Roundup: 소수 첫째 자리로 올림 (부동소수 오차 보정 포함)
fn round_up(value: f64) -> f64 {
    let int_input = (value * 100_000.0).round() as i64;
    if int_input % 10_000 == 0 {
        int_input as f64 / 100_000.0
    } else {
        ((int_input / 10_000) + 1) as f64 / 10.0
    }
}
