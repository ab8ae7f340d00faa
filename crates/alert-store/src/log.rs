//! 알림 로그 — 발생/해결/조회의 단일 진입점
//!
//! [`AlertLog`]는 스토어 위에서 알림 생애주기 규칙을 강제합니다.
//! 알림은 발생 후 내용이 변하지 않으며, 상태만 해결 연산으로
//! active -> resolved 한 방향으로 전이합니다.

use std::time::SystemTime;

use metrics::{counter, gauge};
use tracing::{info, warn};

use pharmatrace_core::config::AlertsConfig;
use pharmatrace_core::error::StoreError;
use pharmatrace_core::metrics::{
    ALERTS_ACTIVE, ALERTS_RAISED_TOTAL, ALERTS_RESOLVED_TOTAL, LABEL_CATEGORY,
};
use pharmatrace_core::store::AlertStore;
use pharmatrace_core::types::{Alert, AlertStatus, Severity};

use crate::error::AlertLogError;

/// 알림 로그
pub struct AlertLog<A> {
    store: A,
    default_list_limit: usize,
}

impl<A: AlertStore> AlertLog<A> {
    /// 새 알림 로그를 생성합니다.
    pub fn new(store: A, config: &AlertsConfig) -> Self {
        Self {
            store,
            default_list_limit: config.default_list_limit,
        }
    }

    /// 내부 스토어에 대한 참조를 반환합니다.
    pub fn store(&self) -> &A {
        &self.store
    }

    /// 알림을 기록합니다.
    ///
    /// 기록된 알림을 그대로 반환합니다.
    pub async fn raise(&self, alert: Alert) -> Result<Alert, AlertLogError> {
        self.store.insert_alert(alert.clone()).await?;

        counter!(ALERTS_RAISED_TOTAL, LABEL_CATEGORY => alert.category.to_string()).increment(1);
        gauge!(ALERTS_ACTIVE).increment(1.0);

        if alert.severity >= Severity::High {
            warn!(
                alert_id = %alert.id,
                category = %alert.category,
                subject = %alert.subject_id,
                "integrity alert raised"
            );
        } else {
            info!(
                alert_id = %alert.id,
                category = %alert.category,
                subject = %alert.subject_id,
                "alert raised"
            );
        }

        Ok(alert)
    }

    /// 알림을 해결 상태로 전이합니다.
    ///
    /// 활성 상태가 아니면 [`AlertLogError::NotActive`]를 반환합니다.
    pub async fn resolve(&self, alert_id: &str) -> Result<Alert, AlertLogError> {
        match self.store.resolve_alert(alert_id, SystemTime::now()).await {
            Ok(alert) => {
                counter!(ALERTS_RESOLVED_TOTAL).increment(1);
                gauge!(ALERTS_ACTIVE).decrement(1.0);
                info!(alert_id = %alert_id, "alert resolved");
                Ok(alert)
            }
            Err(StoreError::NotFound { .. }) => Err(AlertLogError::NotFound {
                alert_id: alert_id.to_owned(),
            }),
            Err(StoreError::InvalidState { .. }) => Err(AlertLogError::NotActive {
                alert_id: alert_id.to_owned(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// 알림 목록을 최신순으로 조회합니다.
    ///
    /// `limit`이 `None`이면 설정의 기본 상한을 사용합니다.
    pub async fn list(
        &self,
        status: Option<AlertStatus>,
        limit: Option<usize>,
    ) -> Result<Vec<Alert>, AlertLogError> {
        let limit = limit.unwrap_or(self.default_list_limit);
        Ok(self.store.list_alerts(status, limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryAlertStore;
    use pharmatrace_core::types::{
        ActorRole, AnomalyCategory, EventKind, ScanEvent, ScanResult,
    };

    fn alert_log() -> AlertLog<MemoryAlertStore> {
        AlertLog::new(MemoryAlertStore::new(), &AlertsConfig::default())
    }

    fn sample_alert(category: AnomalyCategory) -> Alert {
        let original = ScanEvent::new(
            ActorRole::Distributor,
            "FastFreight",
            "Capital City",
            "Activated for Green Cross",
            ScanResult::Valid,
            EventKind::Activation,
        );
        let trigger = ScanEvent::new(
            ActorRole::Pharmacy,
            "Blue Cross",
            "Shelbyville",
            "Attempted stock receipt",
            ScanResult::Alert,
            EventKind::Flagged,
        );
        Alert::new("Amoxicillin 500mg", "MED-1", category, original, trigger)
    }

    #[tokio::test]
    async fn raise_then_list() {
        let log = alert_log();
        let alert = log.raise(sample_alert(AnomalyCategory::Diversion)).await.unwrap();

        let active = log.list(Some(AlertStatus::Active), None).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, alert.id);
    }

    #[tokio::test]
    async fn resolve_moves_to_resolved_list() {
        let log = alert_log();
        let alert = log
            .raise(sample_alert(AnomalyCategory::DuplicateSale))
            .await
            .unwrap();

        let resolved = log.resolve(&alert.id).await.unwrap();
        assert_eq!(resolved.status, AlertStatus::Resolved);
        assert!(resolved.resolved_at.is_some());

        assert!(log.list(Some(AlertStatus::Active), None).await.unwrap().is_empty());
        assert_eq!(
            log.list(Some(AlertStatus::Resolved), None).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn double_resolve_fails() {
        let log = alert_log();
        let alert = log
            .raise(sample_alert(AnomalyCategory::InactiveTheft))
            .await
            .unwrap();

        log.resolve(&alert.id).await.unwrap();
        let again = log.resolve(&alert.id).await;
        assert!(matches!(again, Err(AlertLogError::NotActive { .. })));
    }

    #[tokio::test]
    async fn resolve_unknown_alert_fails() {
        let log = alert_log();
        let result = log.resolve("missing-alert").await;
        assert!(matches!(result, Err(AlertLogError::NotFound { .. })));
    }

    #[tokio::test]
    async fn list_uses_default_limit() {
        let store = MemoryAlertStore::new();
        let log = AlertLog::new(
            store,
            &AlertsConfig {
                default_list_limit: 2,
            },
        );
        for _ in 0..4 {
            log.raise(sample_alert(AnomalyCategory::Diversion)).await.unwrap();
        }
        let listed = log.list(None, None).await.unwrap();
        assert_eq!(listed.len(), 2);

        let explicit = log.list(None, Some(10)).await.unwrap();
        assert_eq!(explicit.len(), 4);
    }
}
