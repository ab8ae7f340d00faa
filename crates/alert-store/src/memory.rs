//! 인메모리 알림 스토어 — 테스트/데모용 [`AlertStore`] 구현

use std::sync::Arc;
use std::time::SystemTime;

use tokio::sync::Mutex;

use pharmatrace_core::error::StoreError;
use pharmatrace_core::store::AlertStore;
use pharmatrace_core::types::{Alert, AlertStatus};

/// 인메모리 알림 스토어
///
/// `Clone`은 내부 목록을 공유합니다 (Arc).
#[derive(Debug, Clone, Default)]
pub struct MemoryAlertStore {
    alerts: Arc<Mutex<Vec<Alert>>>,
}

impl MemoryAlertStore {
    /// 빈 스토어를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장된 알림 수를 반환합니다 (테스트 편의용).
    pub async fn alert_count(&self) -> usize {
        self.alerts.lock().await.len()
    }
}

impl AlertStore for MemoryAlertStore {
    async fn insert_alert(&self, alert: Alert) -> Result<(), StoreError> {
        let mut guard = self.alerts.lock().await;
        if guard.iter().any(|a| a.id == alert.id) {
            return Err(StoreError::DuplicateId { id: alert.id });
        }
        guard.push(alert);
        Ok(())
    }

    async fn alert_by_id(&self, alert_id: &str) -> Result<Option<Alert>, StoreError> {
        Ok(self
            .alerts
            .lock()
            .await
            .iter()
            .find(|a| a.id == alert_id)
            .cloned())
    }

    async fn resolve_alert(
        &self,
        alert_id: &str,
        resolved_at: SystemTime,
    ) -> Result<Alert, StoreError> {
        let mut guard = self.alerts.lock().await;
        let alert = guard
            .iter_mut()
            .find(|a| a.id == alert_id)
            .ok_or_else(|| StoreError::NotFound {
                id: alert_id.to_owned(),
            })?;

        if alert.status != AlertStatus::Active {
            return Err(StoreError::InvalidState {
                id: alert_id.to_owned(),
                reason: "alert already resolved".to_owned(),
            });
        }

        alert.status = AlertStatus::Resolved;
        alert.resolved_at = Some(resolved_at);
        Ok(alert.clone())
    }

    async fn list_alerts(
        &self,
        status: Option<AlertStatus>,
        limit: usize,
    ) -> Result<Vec<Alert>, StoreError> {
        let guard = self.alerts.lock().await;
        let mut results: Vec<Alert> = guard
            .iter()
            .filter(|a| status.is_none_or(|s| a.status == s))
            .cloned()
            .collect();
        // 최신순 정렬 — 생성 시각 기준
        results.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        results.truncate(limit);
        Ok(results)
    }
}
