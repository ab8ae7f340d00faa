//! 인메모리 자격증명 스토어 — 테스트/데모용 [`CredentialStore`] 구현

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use pharmatrace_core::error::StoreError;
use pharmatrace_core::store::CredentialStore;
use pharmatrace_core::types::{ActorRole, Credential};

/// 인메모리 자격증명 스토어
///
/// `Clone`은 내부 맵을 공유합니다 (Arc).
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    credentials: Arc<Mutex<BTreeMap<String, Credential>>>,
}

impl MemoryCredentialStore {
    /// 빈 스토어를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장된 자격증명 수를 반환합니다 (테스트 편의용).
    pub async fn credential_count(&self) -> usize {
        self.credentials.lock().await.len()
    }
}

impl CredentialStore for MemoryCredentialStore {
    async fn insert_credential(&self, credential: Credential) -> Result<(), StoreError> {
        let mut guard = self.credentials.lock().await;
        if guard.contains_key(&credential.entity_id) {
            return Err(StoreError::DuplicateId {
                id: credential.entity_id,
            });
        }
        guard.insert(credential.entity_id.clone(), credential);
        Ok(())
    }

    async fn credential_by_id(&self, entity_id: &str) -> Result<Option<Credential>, StoreError> {
        Ok(self.credentials.lock().await.get(entity_id).cloned())
    }

    async fn credentials_by_role(&self, role: ActorRole) -> Result<Vec<Credential>, StoreError> {
        Ok(self
            .credentials
            .lock()
            .await
            .values()
            .filter(|c| c.role == role)
            .cloned()
            .collect())
    }

    async fn delete_credential(&self, entity_id: &str) -> Result<bool, StoreError> {
        Ok(self.credentials.lock().await.remove(entity_id).is_some())
    }
}
