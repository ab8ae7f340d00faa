//! 스캔 엔진 에러 타입
//!
//! 스펙의 에러 분류를 그대로 따릅니다:
//! - [`UnknownIdentifier`](ScanEngineError::UnknownIdentifier) — 조회 실패, 기록 없음
//! - [`Rejected`](ScanEngineError::Rejected) — 순서 오류, 사용자 수정 가능, 부수 효과 없음
//! - [`Anomaly`](ScanEngineError::Anomaly) — 무결성 이상 징후, 항상 알림 기록과
//!   counterfeit 동결을 동반
//! - [`Store`](ScanEngineError::Store) — 영속성 실패, 스캔 전체 재시도 대상

use pharmatrace_core::error::{PharmatraceError, StoreError};
use pharmatrace_core::types::{Alert, AnomalyCategory};
use pharmatrace_ledger::LedgerError;

use pharmatrace_alert_store::AlertLogError;

/// 스캔 엔진 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ScanEngineError {
    /// 식별자가 어떤 레코드와도 일치하지 않음 — 기록 없음
    #[error("unknown identifier: {identifier}")]
    UnknownIdentifier {
        /// 스캔된 식별자
        identifier: String,
    },

    /// 순서 오류 거부 — 에스컬레이션 없음, 상태 변화 없음
    #[error("scan rejected: {reason}")]
    Rejected {
        /// 거부 사유
        reason: String,
    },

    /// 무결성 이상 징후 — counterfeit 동결과 알림 기록을 동반
    #[error("integrity anomaly: {} (alert {})", .category, .alert.id)]
    Anomaly {
        /// 이상 징후 분류
        category: AnomalyCategory,
        /// 기록된 알림
        alert: Box<Alert>,
    },

    /// 스토어 실패 — 부분 상태 변화를 가정하지 말고 스캔 전체를 재시도
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// 세션 채널 에러
    #[error("channel error: {0}")]
    Channel(String),

    /// 예기치 않은 내부 에러
    #[error("internal error: {0}")]
    Internal(String),
}

impl ScanEngineError {
    /// 원장 에러 중 전이 위반 이외의 것을 변환합니다.
    ///
    /// 전이 위반은 프로세서가 직접 분기하므로 여기 도달하면
    /// 내부 에러로 취급합니다.
    pub(crate) fn from_ledger(err: LedgerError, identifier: &str) -> Self {
        match err {
            LedgerError::UnknownUnit { .. } | LedgerError::UnknownCarton { .. } => {
                Self::UnknownIdentifier {
                    identifier: identifier.to_owned(),
                }
            }
            LedgerError::Store(store) => Self::Store(store),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<AlertLogError> for ScanEngineError {
    fn from(err: AlertLogError) -> Self {
        match err {
            AlertLogError::Store(store) => Self::Store(store),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<ScanEngineError> for PharmatraceError {
    fn from(err: ScanEngineError) -> Self {
        match err {
            ScanEngineError::Store(store) => PharmatraceError::Store(store),
            other => PharmatraceError::Scan(other.to_string()),
        }
    }
}
