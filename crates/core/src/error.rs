//! 에러 타입 — 도메인별 에러 정의
//!
//! [`PharmatraceError`]는 최상위 에러 타입입니다. 각 도메인 크레이트는
//! 자체 에러 타입을 정의하고 `From` 변환으로 여기에 합류합니다
//! (예: `LedgerError -> PharmatraceError::Ledger`).

use crate::types::UnitStatus;

/// Pharmatrace 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum PharmatraceError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 스토어(영속성 협력자) 에러
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// 원장(ledger) 처리 에러
    #[error("ledger error: {0}")]
    Ledger(String),

    /// 스캔 처리 에러
    #[error("scan error: {0}")]
    Scan(String),

    /// 자격증명 레지스트리 에러
    #[error("registry error: {0}")]
    Registry(String),

    /// 알림 저장소 에러
    #[error("alert error: {0}")]
    Alert(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 스토어 에러
///
/// 영속성 협력자가 보장해야 하는 계약의 실패 상황을 표현합니다.
/// `StatusConflict`는 조건부 갱신(compare-and-set)에서 패배한 쪽이
/// 받는 에러로, 호출자는 `actual` 상태를 기준으로 거부/이상 징후
/// 경로로 재분류해야 합니다.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 식별자 충돌 — 생성 측은 재시도 계약을 따릅니다
    #[error("duplicate identifier: {id}")]
    DuplicateId { id: String },

    /// 레코드 없음
    #[error("record not found: {id}")]
    NotFound { id: String },

    /// 조건부 갱신 실패 — 기대한 상태와 실제 상태가 다름
    #[error("status conflict on {id}: expected {expected}, actual {actual}")]
    StatusConflict {
        /// 대상 유닛 ID
        id: String,
        /// 호출자가 기대한 상태
        expected: UnitStatus,
        /// 스토어에 기록된 실제 상태
        actual: UnitStatus,
    },

    /// 현재 상태에서 허용되지 않는 갱신 (예: 이미 해결된 알림 재해결)
    #[error("invalid state on {id}: {reason}")]
    InvalidState { id: String, reason: String },

    /// 스토어 연결/쓰기 실패 — 현재 작업 전체가 실패한 것으로 간주하고
    /// 호출자는 스캔을 처음부터 재시도해야 합니다
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_conflict_display() {
        let err = StoreError::StatusConflict {
            id: "MED-AAAA-BBBB-CCCC-DDDD".to_owned(),
            expected: UnitStatus::InTransit,
            actual: UnitStatus::Stocked,
        };
        let msg = err.to_string();
        assert!(msg.contains("MED-AAAA-BBBB-CCCC-DDDD"));
        assert!(msg.contains("in-transit"));
        assert!(msg.contains("stocked"));
    }

    #[test]
    fn config_error_converts_to_top_level() {
        let err = ConfigError::FileNotFound {
            path: "pharmatrace.toml".to_owned(),
        };
        let top: PharmatraceError = err.into();
        assert!(matches!(top, PharmatraceError::Config(_)));
        assert!(top.to_string().contains("pharmatrace.toml"));
    }

    #[test]
    fn store_error_converts_to_top_level() {
        let err = StoreError::Unavailable("connection refused".to_owned());
        let top: PharmatraceError = err.into();
        assert!(matches!(top, PharmatraceError::Store(_)));
    }

    #[test]
    fn duplicate_id_display() {
        let err = StoreError::DuplicateId {
            id: "CTN-AAAA-AAAA-AAAA-AAAA".to_owned(),
        };
        assert!(err.to_string().contains("duplicate identifier"));
    }
}
