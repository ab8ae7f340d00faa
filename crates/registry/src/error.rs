//! 자격증명 레지스트리 에러 타입

use pharmatrace_core::error::{PharmatraceError, StoreError};
use pharmatrace_core::types::ActorRole;

/// 레지스트리 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// 인증 실패 — 조회 불일치, 부수 효과 없음
    #[error("authentication failed")]
    AuthFailure,

    /// 자격증명 없음
    #[error("unknown credential: {entity_id}")]
    NotFound {
        /// 조회한 발급 ID
        entity_id: String,
    },

    /// 신뢰 계층 위반 — 해당 역할은 요청한 역할을 발급할 수 없음
    #[error("{issuer_role} may not issue {requested} credentials")]
    Hierarchy {
        /// 발급을 시도한 역할
        issuer_role: ActorRole,
        /// 발급하려던 역할
        requested: ActorRole,
    },

    /// 루트 기관이 발급할 수 없는 역할
    #[error("root authority does not issue {role} credentials")]
    UnsupportedRole {
        /// 요청한 역할
        role: ActorRole,
    },

    /// 식별자 재생성 재시도 소진
    #[error("identifier collision persisted after {attempts} attempts")]
    IdCollision {
        /// 시도 횟수
        attempts: usize,
    },

    /// 스토어 에러
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<RegistryError> for PharmatraceError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Store(store) => PharmatraceError::Store(store),
            other => PharmatraceError::Registry(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hierarchy_display() {
        let err = RegistryError::Hierarchy {
            issuer_role: ActorRole::Pharmacy,
            requested: ActorRole::Distributor,
        };
        let msg = err.to_string();
        assert!(msg.contains("pharmacy"));
        assert!(msg.contains("distributor"));
    }

    #[test]
    fn auth_failure_reveals_nothing() {
        // 어떤 필드가 틀렸는지 노출하지 않음
        assert_eq!(RegistryError::AuthFailure.to_string(), "authentication failed");
    }

    #[test]
    fn converts_to_pharmatrace_error() {
        let err = RegistryError::AuthFailure;
        let top: PharmatraceError = err.into();
        assert!(matches!(top, PharmatraceError::Registry(_)));
    }
}
