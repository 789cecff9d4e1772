//! 도메인 타입 -- 스캔 요청, 의존성, 취약점, 권고, 보고서
//!
//! HTTP API와 JSON 내보내기에서 그대로 직렬화되므로 필드명은 camelCase를 사용합니다.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vulnscout_core::types::Severity;

/// 동적 디스패치용 박싱된 Future 타입
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// 패키지 생태계 (레지스트리 도메인)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    /// Python (PyPI)
    PyPi,
    /// JavaScript/TypeScript (npm 레지스트리)
    Npm,
    /// Java (Maven Central)
    Maven,
    /// Go 모듈 프록시
    Go,
    /// Ruby (RubyGems)
    RubyGems,
}

impl Ecosystem {
    /// 지원하는 모든 생태계
    pub const ALL: [Ecosystem; 5] = [
        Ecosystem::PyPi,
        Ecosystem::Npm,
        Ecosystem::Maven,
        Ecosystem::Go,
        Ecosystem::RubyGems,
    ];

    /// 문자열에서 생태계를 파싱합니다 (대소문자 구분 없음).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pypi" | "pip" | "python" => Some(Self::PyPi),
            "npm" | "node" | "javascript" | "js" => Some(Self::Npm),
            "maven" | "java" | "mvn" => Some(Self::Maven),
            "go" | "golang" | "gomod" => Some(Self::Go),
            "rubygems" | "gem" | "gems" | "ruby" => Some(Self::RubyGems),
            _ => None,
        }
    }

    /// 어드바이저리 서비스(OSV)가 사용하는 생태계 이름
    pub fn osv_name(&self) -> &'static str {
        match self {
            Self::PyPi => "PyPI",
            Self::Npm => "npm",
            Self::Maven => "Maven",
            Self::Go => "Go",
            Self::RubyGems => "RubyGems",
        }
    }

    /// 직렬화와 메트릭 레이블에 쓰이는 소문자 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PyPi => "pypi",
            Self::Npm => "npm",
            Self::Maven => "maven",
            Self::Go => "go",
            Self::RubyGems => "rubygems",
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 해석된 의존성 그래프의 노드
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    /// 패키지 이름
    pub name: String,
    /// 해석된 구체 버전
    pub version: String,
    /// 생태계
    pub ecosystem: Ecosystem,
    /// 루트 또는 루트의 직계 자식 여부
    pub direct: bool,
    /// 이 노드를 끌어온 부모 패키지 이름
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// 이 노드에서 발견된 취약점 수
    pub vulnerability_count: usize,
    /// 이 노드의 최고 심각도
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_severity: Option<Severity>,
    /// 레지스트리가 보고한 소스 저장소 URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
}

impl Dependency {
    /// 한 번의 해석 안에서 노드를 식별하는 `name@version` 키
    pub fn key(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} ({})", self.name, self.version, self.ecosystem)
    }
}

/// 정규화된 취약점 정보
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vulnerability {
    /// 어드바이저리 ID (예: GHSA-xxxx, PYSEC-2023-1)
    pub id: String,
    /// 심각도
    pub severity: Severity,
    /// CVSS 기본 점수
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cvss: Option<f64>,
    /// 영향받는 패키지 이름
    pub package: String,
    /// 조회한 설치 버전
    pub installed_version: String,
    /// 수정된 버전 (없으면 수정 불가)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_version: Option<String>,
    /// 요약 설명
    pub description: String,
    /// 참고 URL 목록
    #[serde(default)]
    pub references: Vec<String>,
    /// 별칭 ID 목록 (CVE 등)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

/// breaking change 정보의 출처
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakingChangeSource {
    /// 큐레이션된 정적 데이터셋
    Curated,
    /// 체인지로그 휴리스틱
    Changelog,
}

/// 업그레이드 시 알려진 breaking change 한 건
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakingChange {
    /// 변경 내용
    pub description: String,
    /// 정보 출처
    pub source: BreakingChangeSource,
}

/// 패키지 단위 업그레이드 권고
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Remediation {
    /// 권고 ID
    pub id: String,
    /// 대상 패키지
    pub package: String,
    /// 생태계 (의존성 목록에서 확인된 경우)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ecosystem: Option<Ecosystem>,
    /// 현재 버전
    pub current_version: String,
    /// 권장 업그레이드 버전
    pub target_version: String,
    /// 업그레이드로 해결되는 취약점 ID
    pub vulnerabilities_fixed: Vec<String>,
    /// 패키지 취약점 중 최고 심각도
    pub risk_level: Severity,
    /// 메이저 버전이 바뀌는지 여부
    pub is_breaking: bool,
    /// 알려진 breaking change 목록
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub breaking_changes: Vec<BreakingChange>,
    /// 마이그레이션 가이드 URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migration_guide_url: Option<String>,
}

/// 심각도별 취약점 개수
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    /// Critical 수
    pub critical: usize,
    /// High 수
    pub high: usize,
    /// Medium 수
    pub medium: usize,
    /// Low 수
    pub low: usize,
    /// 전체 수
    pub total: usize,
}

impl SeverityCounts {
    /// 취약점 목록에서 심각도별 개수를 집계합니다.
    pub fn from_vulnerabilities(vulnerabilities: &[Vulnerability]) -> Self {
        let mut counts = Self::default();
        for vuln in vulnerabilities {
            match vuln.severity {
                Severity::Critical => counts.critical += 1,
                Severity::High => counts.high += 1,
                Severity::Medium => counts.medium += 1,
                Severity::Low => counts.low += 1,
            }
        }
        counts.total = vulnerabilities.len();
        counts
    }

    /// 심각도에 해당하는 개수를 반환합니다.
    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }

    /// critical 또는 high 취약점이 있는지 여부
    pub fn has_critical_or_high(&self) -> bool {
        self.critical > 0 || self.high > 0
    }
}

/// 해석 중 버려진 노드 기록
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnresolvedNode {
    /// 패키지 이름
    pub package: String,
    /// 요청된 버전 (latest 요청이면 None)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// 부모 패키지 이름
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// 실패 사유
    pub reason: String,
}

/// 스캔 대상 정보
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanTarget {
    /// 생태계
    pub ecosystem: Ecosystem,
    /// 패키지 이름 (패키지 스캔)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// 요청 또는 해석된 버전 (패키지 스캔)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// 매니페스트 파일 이름 (매니페스트 스캔)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file_name, &self.package) {
            (Some(file), _) => write!(f, "{file} ({})", self.ecosystem),
            (None, Some(pkg)) => match &self.version {
                Some(v) => write!(f, "{pkg}@{v} ({})", self.ecosystem),
                None => write!(f, "{pkg} ({})", self.ecosystem),
            },
            (None, None) => write!(f, "({})", self.ecosystem),
        }
    }
}

/// 완료된 스캔 보고서
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    /// 보고서 ID (작업 ID와 같음)
    pub id: String,
    /// 스캔 대상
    pub target: ScanTarget,
    /// 스캔 완료 시각
    pub scanned_at: DateTime<Utc>,
    /// 보안 점수 (0-100)
    pub score: u8,
    /// 심각도별 요약
    pub summary: SeverityCounts,
    /// 해석된 의존성 (루트 먼저, 깊이 순)
    pub dependencies: Vec<Dependency>,
    /// ID 기준으로 중복 제거된 취약점
    pub vulnerabilities: Vec<Vulnerability>,
    /// 패키지별 업그레이드 권고
    pub remediations: Vec<Remediation>,
    /// 해석 중 버려진 노드
    #[serde(default)]
    pub unresolved: Vec<UnresolvedNode>,
}

/// 스캔 요청
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ScanRequest {
    /// 패키지 좌표 스캔
    #[serde(rename_all = "camelCase")]
    Package {
        /// 생태계
        ecosystem: Ecosystem,
        /// 패키지 이름
        package: String,
        /// 버전 (없으면 최신)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version: Option<String>,
        /// 진행 상황을 깊이 단위로 기록할지 여부
        #[serde(default)]
        deep: bool,
    },
    /// 매니페스트 파일 스캔
    #[serde(rename_all = "camelCase")]
    Manifest {
        /// 파일 이름 (형식 판별에 사용)
        file_name: String,
        /// 파일 내용
        content: String,
        /// 각 의존성을 전체 하위 스캔으로 처리할지 여부
        #[serde(default)]
        deep: bool,
    },
}

impl ScanRequest {
    /// 메트릭 레이블용 요청 종류
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Package { .. } => "package",
            Self::Manifest { .. } => "manifest",
        }
    }
}
