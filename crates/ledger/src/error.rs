//! 원장 에러 타입
//!
//! [`LedgerError`]는 원장 내부에서 발생하는 모든 에러를 표현합니다.
//! `From<LedgerError> for PharmatraceError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use pharmatrace_core::error::{PharmatraceError, StoreError};

use crate::state::TransitionViolation;

/// 원장 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// 유닛 ID가 어떤 레코드와도 일치하지 않음
    #[error("unknown unit: {unit_id}")]
    UnknownUnit {
        /// 조회한 유닛 ID
        unit_id: String,
    },

    /// 카톤 ID가 어떤 유닛과도 일치하지 않음
    #[error("unknown carton: {carton_id}")]
    UnknownCarton {
        /// 조회한 카톤 ID
        carton_id: String,
    },

    /// 배치 생성 요청이 잘못됨 (유닛 0개 등)
    #[error("invalid batch: {reason}")]
    InvalidBatch {
        /// 거부 사유
        reason: String,
    },

    /// 카톤당 유닛 수 상한 초과
    #[error("carton capacity exceeded: requested {requested}, max {max}")]
    CapacityExceeded {
        /// 요청한 유닛 수
        requested: usize,
        /// 설정된 상한
        max: usize,
    },

    /// 식별자 재생성 재시도 소진
    #[error("identifier collision persisted after {attempts} attempts")]
    IdCollision {
        /// 시도 횟수
        attempts: usize,
    },

    /// 전이 가드 실패 — 호출자가 거부/이상 징후 경로로 분기
    #[error("{0}")]
    Violation(TransitionViolation),

    /// 스토어 에러
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<LedgerError> for PharmatraceError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Store(store) => PharmatraceError::Store(store),
            other => PharmatraceError::Ledger(other.to_string()),
        }
    }
}
