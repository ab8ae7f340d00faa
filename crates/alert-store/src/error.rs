//! 알림 저장소 에러 타입

use pharmatrace_core::error::{PharmatraceError, StoreError};

/// 알림 저장소 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum AlertLogError {
    /// 알림 ID가 어떤 레코드와도 일치하지 않음
    #[error("unknown alert: {alert_id}")]
    NotFound {
        /// 조회한 알림 ID
        alert_id: String,
    },

    /// 활성 상태가 아닌 알림의 해결 시도
    #[error("alert not active: {alert_id}")]
    NotActive {
        /// 대상 알림 ID
        alert_id: String,
    },

    /// 스토어 에러
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<AlertLogError> for PharmatraceError {
    fn from(err: AlertLogError) -> Self {
        match err {
            AlertLogError::Store(store) => PharmatraceError::Store(store),
            other => PharmatraceError::Alert(other.to_string()),
        }
    }
}
