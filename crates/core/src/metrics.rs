//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `pharmatrace_`
//! - 모듈명: `scan_`, `ledger_`, `registry_`, `alerts_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(pharmatrace_core::metrics::SCAN_PROCESSED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 행위자 역할 레이블 키 (manufacturer, distributor, pharmacy, public)
pub const LABEL_ROLE: &str = "role";

/// 이상 징후 분류 레이블 키
pub const LABEL_CATEGORY: &str = "category";

/// 결과 레이블 키 (valid, invalid, alert)
pub const LABEL_RESULT: &str = "result";

/// 모듈 레이블 키
pub const LABEL_MODULE: &str = "module";

// ─── Scan Engine 메트릭 ────────────────────────────────────────────

/// Scan: 처리된 전체 스캔 수 (counter, label: role, result)
pub const SCAN_PROCESSED_TOTAL: &str = "pharmatrace_scan_processed_total";

/// Scan: 반복 억제로 무시된 스캔 수 (counter)
pub const SCAN_SUPPRESSED_TOTAL: &str = "pharmatrace_scan_suppressed_total";

/// Scan: 순서 오류로 거부된 스캔 수 (counter)
pub const SCAN_REJECTED_TOTAL: &str = "pharmatrace_scan_rejected_total";

/// Scan: 이상 징후로 판정된 스캔 수 (counter, label: category)
pub const SCAN_ANOMALIES_TOTAL: &str = "pharmatrace_scan_anomalies_total";

/// Scan: 스캔 처리 지연 시간 (histogram, 초)
pub const SCAN_PROCESSING_DURATION_SECONDS: &str =
    "pharmatrace_scan_processing_duration_seconds";

// ─── Ledger 메트릭 ─────────────────────────────────────────────────

/// Ledger: 생성된 유닛 수 (counter)
pub const LEDGER_UNITS_CREATED_TOTAL: &str = "pharmatrace_ledger_units_created_total";

/// Ledger: 수리된 전이 수 (counter)
pub const LEDGER_TRANSITIONS_TOTAL: &str = "pharmatrace_ledger_transitions_total";

/// Ledger: 조건부 갱신 충돌 수 (counter)
pub const LEDGER_CAS_CONFLICTS_TOTAL: &str = "pharmatrace_ledger_cas_conflicts_total";

// ─── Registry 메트릭 ───────────────────────────────────────────────

/// Registry: 발급된 자격증명 수 (counter, label: role)
pub const REGISTRY_ISSUED_TOTAL: &str = "pharmatrace_registry_issued_total";

/// Registry: 폐기된 자격증명 수 (counter)
pub const REGISTRY_REVOKED_TOTAL: &str = "pharmatrace_registry_revoked_total";

/// Registry: 인증 실패 수 (counter)
pub const REGISTRY_AUTH_FAILURES_TOTAL: &str = "pharmatrace_registry_auth_failures_total";

// ─── Alert Store 메트릭 ────────────────────────────────────────────

/// Alerts: 발생한 알림 수 (counter, label: category)
pub const ALERTS_RAISED_TOTAL: &str = "pharmatrace_alerts_raised_total";

/// Alerts: 해결된 알림 수 (counter)
pub const ALERTS_RESOLVED_TOTAL: &str = "pharmatrace_alerts_resolved_total";

/// Alerts: 현재 활성 알림 수 (gauge)
pub const ALERTS_ACTIVE: &str = "pharmatrace_alerts_active";
