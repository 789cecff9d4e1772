//! OSV 응답 모델과 정규화
//!
//! OSV `POST /v1/query` 응답의 `vulns[]` 항목을 역직렬화하고
//! 엔진의 [`Vulnerability`]로 정규화합니다.

use serde::{Deserialize, Serialize};

use vulnscout_core::types::Severity;

use crate::advisory::cvss;
use crate::types::Vulnerability;

/// `POST /v1/query` 요청 본문
#[derive(Debug, Serialize)]
pub struct OsvQuery<'a> {
    /// 조회 대상 패키지
    pub package: OsvPackage<'a>,
    /// 버전 (클라이언트 측 범위 평가 시 생략)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<&'a str>,
    /// 다음 페이지 토큰
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

/// 요청 패키지 식별자
#[derive(Debug, Serialize)]
pub struct OsvPackage<'a> {
    /// 패키지 이름
    pub name: &'a str,
    /// OSV 생태계 이름 (`PyPI`, `npm` ...)
    pub ecosystem: &'static str,
}

/// `POST /v1/query` 응답
#[derive(Debug, Default, Deserialize)]
pub struct OsvQueryResponse {
    /// 일치한 어드바이저리
    #[serde(default)]
    pub vulns: Vec<OsvVulnerability>,
    /// 다음 페이지 토큰
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// OSV 어드바이저리
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OsvVulnerability {
    /// 어드바이저리 ID
    pub id: String,
    /// 한 줄 요약
    #[serde(default)]
    pub summary: Option<String>,
    /// 상세 설명
    #[serde(default)]
    pub details: Option<String>,
    /// 별칭 (CVE 등)
    #[serde(default)]
    pub aliases: Vec<String>,
    /// 심각도 점수 목록
    #[serde(default)]
    pub severity: Vec<OsvSeverity>,
    /// 영향받는 패키지와 범위
    #[serde(default)]
    pub affected: Vec<OsvAffected>,
    /// 참고 링크
    #[serde(default)]
    pub references: Vec<OsvReference>,
}

/// 심각도 항목
#[derive(Debug, Clone, Deserialize)]
pub struct OsvSeverity {
    /// `CVSS_V3`, `CVSS_V4` 등
    #[serde(rename = "type", default)]
    pub kind: String,
    /// 벡터 문자열 또는 숫자 점수
    pub score: String,
}

/// 영향받는 패키지 항목
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OsvAffected {
    /// 패키지 식별자
    #[serde(default)]
    pub package: Option<OsvAffectedPackage>,
    /// 버전 범위
    #[serde(default)]
    pub ranges: Vec<OsvRange>,
    /// 명시적으로 나열된 영향 버전
    #[serde(default)]
    pub versions: Vec<String>,
}

/// 영향받는 패키지 식별자
#[derive(Debug, Clone, Deserialize)]
pub struct OsvAffectedPackage {
    /// 패키지 이름
    pub name: String,
    /// 생태계
    #[serde(default)]
    pub ecosystem: String,
}

/// 버전 범위
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OsvRange {
    /// `SEMVER`, `ECOSYSTEM`, `GIT`
    #[serde(rename = "type", default)]
    pub kind: String,
    /// 선언 순서의 이벤트
    #[serde(default)]
    pub events: Vec<OsvEvent>,
}

/// 범위 이벤트 (한 필드만 채워짐)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OsvEvent {
    /// 영향 시작 버전 (`"0"`은 최초 버전부터)
    #[serde(default)]
    pub introduced: Option<String>,
    /// 수정 버전
    #[serde(default)]
    pub fixed: Option<String>,
    /// 영향받는 마지막 버전
    #[serde(default)]
    pub last_affected: Option<String>,
    /// 범위 상한 (미포함)
    #[serde(default)]
    pub limit: Option<String>,
}

/// 참고 링크
#[derive(Debug, Clone, Deserialize)]
pub struct OsvReference {
    /// 링크 종류 (`ADVISORY`, `FIX` ...)
    #[serde(rename = "type", default)]
    pub kind: String,
    /// URL
    pub url: String,
}

impl OsvVulnerability {
    /// 엔진의 취약점 레코드로 정규화합니다.
    pub fn normalize(&self, package: &str, installed_version: &str) -> Vulnerability {
        let cvss = self.cvss_score();
        let severity = cvss.map(Severity::from_cvss).unwrap_or_default();

        Vulnerability {
            id: self.id.clone(),
            severity,
            cvss,
            package: package.to_owned(),
            installed_version: installed_version.to_owned(),
            fixed_version: self.first_fixed(),
            description: self.description(),
            references: self.references.iter().map(|r| r.url.clone()).collect(),
            aliases: self.aliases.clone(),
        }
    }

    /// 첫 번째 `severity[].score`에서 CVSS 점수를 구합니다.
    ///
    /// 숫자 문자열은 그대로, CVSS v3 벡터는 기본 점수 공식으로 변환합니다.
    pub fn cvss_score(&self) -> Option<f64> {
        let score = self.severity.first()?.score.trim();
        if let Ok(value) = score.parse::<f64>() {
            return (0.0..=10.0).contains(&value).then_some(value);
        }
        cvss::base_score(score)
    }

    /// 선언 순서상 첫 번째 `fixed` 이벤트
    pub fn first_fixed(&self) -> Option<String> {
        self.affected
            .iter()
            .flat_map(|a| a.ranges.iter())
            .flat_map(|r| r.events.iter())
            .find_map(|e| e.fixed.clone())
    }

    /// `summary`, 없으면 `details`의 첫 줄
    pub fn description(&self) -> String {
        if let Some(summary) = self.summary.as_deref().map(str::trim) {
            if !summary.is_empty() {
                return summary.to_owned();
            }
        }
        self.details
            .as_deref()
            .and_then(|d| d.lines().map(str::trim).find(|l| !l.is_empty()))
            .unwrap_or_default()
            .to_owned()
    }
}
