//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 컴포넌트는 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `vulnscout_`
//! - 컴포넌트명: `scan_`, `registry_`, `advisory_`, `jobs_`
//! - 접미어: `_total` (counter), `_seconds` (histogram), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(vulnscout_core::metrics::SCANS_STARTED_TOTAL).increment(1);
//! ```

use metrics::{describe_counter, describe_gauge, describe_histogram};

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 생태계 레이블 키 (pypi, npm, maven, go, rubygems)
pub const LABEL_ECOSYSTEM: &str = "ecosystem";

/// 심각도 레이블 키 (low, medium, high, critical)
pub const LABEL_SEVERITY: &str = "severity";

/// 스캔 종류 레이블 키 (package, manifest)
pub const LABEL_KIND: &str = "kind";

// ─── 스캔 메트릭 ───────────────────────────────────────────────────

/// 시작된 스캔 작업 수 (counter, label: kind)
pub const SCANS_STARTED_TOTAL: &str = "vulnscout_scans_started_total";

/// 완료된 스캔 작업 수 (counter, label: kind)
pub const SCANS_COMPLETED_TOTAL: &str = "vulnscout_scans_completed_total";

/// 실패한 스캔 작업 수 (counter, label: kind)
pub const SCANS_FAILED_TOTAL: &str = "vulnscout_scans_failed_total";

/// 스캔 작업 소요 시간 (histogram, 초)
pub const SCAN_DURATION_SECONDS: &str = "vulnscout_scan_duration_seconds";

/// 발견된 취약점 수 (counter, label: severity)
pub const VULNERABILITIES_FOUND_TOTAL: &str = "vulnscout_vulnerabilities_found_total";

// ─── 레지스트리 / 어드바이저리 메트릭 ──────────────────────────────

/// 레지스트리 요청 수 (counter, label: ecosystem)
pub const REGISTRY_REQUESTS_TOTAL: &str = "vulnscout_registry_requests_total";

/// 레지스트리 요청 실패 수 (counter, label: ecosystem)
pub const REGISTRY_FAILURES_TOTAL: &str = "vulnscout_registry_failures_total";

/// 어드바이저리 쿼리 수 (counter)
pub const ADVISORY_QUERIES_TOTAL: &str = "vulnscout_advisory_queries_total";

/// 어드바이저리 쿼리 실패 수 (counter)
pub const ADVISORY_FAILURES_TOTAL: &str = "vulnscout_advisory_failures_total";

// ─── 작업 관리 메트릭 ──────────────────────────────────────────────

/// 저장소에 보존 중인 작업 수 (gauge)
pub const JOBS_RETAINED: &str = "vulnscout_jobs_retained";

/// TTL 또는 최대 개수 초과로 제거된 작업 수 (counter)
pub const JOBS_EVICTED_TOTAL: &str = "vulnscout_jobs_evicted_total";

/// 스캔 소요 시간 히스토그램 버킷 (초)
pub const SCAN_DURATION_BUCKETS: &[f64] = &[0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0];

/// 모든 메트릭의 설명을 등록합니다.
///
/// recorder 설치 직후 한 번 호출합니다. recorder가 없으면 아무 일도 하지 않습니다.
pub fn describe_all() {
    describe_counter!(SCANS_STARTED_TOTAL, "Total number of scan jobs accepted");
    describe_counter!(
        SCANS_COMPLETED_TOTAL,
        "Total number of scan jobs that reached the completed state"
    );
    describe_counter!(
        SCANS_FAILED_TOTAL,
        "Total number of scan jobs that reached the error state"
    );
    describe_histogram!(
        SCAN_DURATION_SECONDS,
        "Time from job acceptance to terminal state in seconds"
    );
    describe_counter!(
        VULNERABILITIES_FOUND_TOTAL,
        "Total number of deduplicated vulnerabilities reported by severity"
    );
    describe_counter!(
        REGISTRY_REQUESTS_TOTAL,
        "Total number of package registry metadata requests"
    );
    describe_counter!(
        REGISTRY_FAILURES_TOTAL,
        "Total number of registry requests that failed and dropped a graph node"
    );
    describe_counter!(
        ADVISORY_QUERIES_TOTAL,
        "Total number of vulnerability advisory queries"
    );
    describe_counter!(
        ADVISORY_FAILURES_TOTAL,
        "Total number of advisory queries that failed and were treated as empty"
    );
    describe_gauge!(JOBS_RETAINED, "Number of scan jobs currently retained");
    describe_counter!(
        JOBS_EVICTED_TOTAL,
        "Total number of scan jobs removed by TTL or size eviction"
    );
}
