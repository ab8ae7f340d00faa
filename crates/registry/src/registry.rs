//! 자격증명 레지스트리 — 2단계 신뢰 계층의 발급/인증/폐기
//!
//! 루트 규제 기관 -> 제조사/약국, 제조사 -> 유통사 순서의
//! 발급 계층을 강제합니다. 유통사 발급은 루트 기관 가시성을 위해
//! 알림 저장소를 통지 채널로 사용하여 정보성 알림을 남깁니다.

use metrics::counter;
use tracing::{info, warn};

use pharmatrace_core::config::RegistryConfig;
use pharmatrace_core::error::StoreError;
use pharmatrace_core::id;
use pharmatrace_core::metrics::{
    LABEL_ROLE, REGISTRY_AUTH_FAILURES_TOTAL, REGISTRY_ISSUED_TOTAL, REGISTRY_REVOKED_TOTAL,
};
use pharmatrace_core::store::{AlertStore, CredentialStore};
use pharmatrace_core::types::{
    ActorRole, Alert, AnomalyCategory, Credential, EventKind, ScanEvent, ScanResult,
};

use crate::error::RegistryError;

/// 식별자 충돌 시 재생성 시도 횟수
const ID_RETRY_ATTEMPTS: usize = 3;

/// 자격증명 레지스트리
///
/// 알림 저장소는 유통사 등록 통지에만 사용됩니다.
pub struct CredentialRegistry<C, A> {
    store: C,
    alerts: A,
    passphrase_length: usize,
}

impl<C: CredentialStore, A: AlertStore> CredentialRegistry<C, A> {
    /// 새 레지스트리를 생성합니다.
    pub fn new(store: C, alerts: A, config: &RegistryConfig) -> Self {
        Self {
            store,
            alerts,
            passphrase_length: config.passphrase_length,
        }
    }

    /// 내부 자격증명 스토어에 대한 참조를 반환합니다.
    pub fn store(&self) -> &C {
        &self.store
    }

    /// 루트 기관 발급 — 제조사/약국 자격증명.
    ///
    /// ID + 패스프레이즈 쌍이 생성되어 평문으로 반환됩니다.
    /// 그 외 역할은 [`RegistryError::UnsupportedRole`]로 거부됩니다.
    pub async fn issue_root(
        &self,
        role: ActorRole,
        name: &str,
        location: &str,
    ) -> Result<Credential, RegistryError> {
        let passphrase = id::credential_secret(self.passphrase_length);
        for _ in 0..ID_RETRY_ATTEMPTS {
            let entity_id = match role {
                ActorRole::Manufacturer => {
                    format!("{}-{}", id::MANUFACTURER_PREFIX, id::short_code(4))
                }
                ActorRole::Pharmacy => {
                    format!("{}-{}", id::PHARMACY_PREFIX, id::short_code(6))
                }
                other => return Err(RegistryError::UnsupportedRole { role: other }),
            };

            let credential = Credential {
                entity_id,
                name: name.to_owned(),
                location: location.to_owned(),
                role,
                passphrase: Some(passphrase.clone()),
                issued_at: std::time::SystemTime::now(),
            };

            match self.store.insert_credential(credential.clone()).await {
                Ok(()) => {
                    counter!(REGISTRY_ISSUED_TOTAL, LABEL_ROLE => role.to_string()).increment(1);
                    info!(entity_id = %credential.entity_id, role = %role, "credential issued");
                    return Ok(credential);
                }
                Err(StoreError::DuplicateId { .. }) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(RegistryError::IdCollision {
            attempts: ID_RETRY_ATTEMPTS,
        })
    }

    /// 제조사 발급 — 유통사 자격증명 (ID 전용, 패스프레이즈 없음).
    ///
    /// `issuer_id`는 등록된 제조사여야 하며, 발급 시 루트 기관
    /// 가시성을 위한 정보성 알림이 생성됩니다.
    pub async fn issue_distributor(
        &self,
        issuer_id: &str,
        name: &str,
        location: &str,
    ) -> Result<Credential, RegistryError> {
        let issuer = self
            .store
            .credential_by_id(issuer_id)
            .await?
            .ok_or_else(|| RegistryError::NotFound {
                entity_id: issuer_id.to_owned(),
            })?;

        if issuer.role != ActorRole::Manufacturer {
            return Err(RegistryError::Hierarchy {
                issuer_role: issuer.role,
                requested: ActorRole::Distributor,
            });
        }

        for _ in 0..ID_RETRY_ATTEMPTS {
            let credential = Credential {
                entity_id: id::generate(id::DISTRIBUTOR_PREFIX),
                name: name.to_owned(),
                location: location.to_owned(),
                role: ActorRole::Distributor,
                passphrase: None,
                issued_at: std::time::SystemTime::now(),
            };

            match self.store.insert_credential(credential.clone()).await {
                Ok(()) => {
                    counter!(REGISTRY_ISSUED_TOTAL, LABEL_ROLE => "distributor").increment(1);
                    info!(
                        entity_id = %credential.entity_id,
                        issuer = %issuer_id,
                        "distributor credential issued"
                    );
                    self.notify_distributor_registered(&issuer, &credential).await?;
                    return Ok(credential);
                }
                Err(StoreError::DuplicateId { .. }) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(RegistryError::IdCollision {
            attempts: ID_RETRY_ATTEMPTS,
        })
    }

    /// 인증 — 역할 + ID (+ 해당 시 패스프레이즈) 정확 일치 조회.
    ///
    /// 실패는 부수 효과가 없으며 어떤 필드가 틀렸는지 구분하지
    /// 않습니다. 해싱/속도 제한은 이 계층의 범위 밖입니다.
    pub async fn authenticate(
        &self,
        role: ActorRole,
        entity_id: &str,
        passphrase: Option<&str>,
    ) -> Result<Credential, RegistryError> {
        let credential = self.store.credential_by_id(entity_id).await?;

        let matched = credential.filter(|c| {
            c.role == role
                && match &c.passphrase {
                    Some(stored) => passphrase == Some(stored.as_str()),
                    // 유통사는 ID 전용
                    None => true,
                }
        });

        match matched {
            Some(credential) => Ok(credential),
            None => {
                counter!(REGISTRY_AUTH_FAILURES_TOTAL).increment(1);
                warn!(entity_id = %entity_id, role = %role, "authentication failed");
                Err(RegistryError::AuthFailure)
            }
        }
    }

    /// 폐기 — 무조건 삭제, 즉시 그리고 비가역적으로 적용됩니다.
    ///
    /// 다음 인증 시도는 실패하며, 이미 진행 중인 스캔은 소급
    /// 무효화되지 않습니다.
    pub async fn revoke(&self, entity_id: &str) -> Result<(), RegistryError> {
        if self.store.delete_credential(entity_id).await? {
            counter!(REGISTRY_REVOKED_TOTAL).increment(1);
            info!(entity_id = %entity_id, "credential revoked");
            Ok(())
        } else {
            Err(RegistryError::NotFound {
                entity_id: entity_id.to_owned(),
            })
        }
    }

    /// 역할별 자격증명 목록을 조회합니다.
    pub async fn list(&self, role: ActorRole) -> Result<Vec<Credential>, RegistryError> {
        Ok(self.store.credentials_by_role(role).await?)
    }

    /// 유통사 등록 정보성 알림을 기록합니다.
    async fn notify_distributor_registered(
        &self,
        issuer: &Credential,
        distributor: &Credential,
    ) -> Result<(), RegistryError> {
        let original = ScanEvent::new(
            ActorRole::Manufacturer,
            issuer.name.clone(),
            issuer.location.clone(),
            "Registration",
            ScanResult::Valid,
            EventKind::Registration,
        );
        let trigger = ScanEvent::new(
            ActorRole::Public,
            "System",
            "Registry",
            "Notification",
            ScanResult::Valid,
            EventKind::Registration,
        );
        let alert = Alert::new(
            "System Notification",
            distributor.entity_id.clone(),
            AnomalyCategory::NewDistributor,
            original,
            trigger,
        );
        self.alerts.insert_alert(alert).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryCredentialStore;
    use pharmatrace_alert_store::MemoryAlertStore;
    use pharmatrace_core::types::{AlertStatus, Severity};

    fn registry() -> CredentialRegistry<MemoryCredentialStore, MemoryAlertStore> {
        CredentialRegistry::new(
            MemoryCredentialStore::new(),
            MemoryAlertStore::new(),
            &RegistryConfig::default(),
        )
    }

    #[tokio::test]
    async fn issue_manufacturer_has_id_and_passphrase() {
        let registry = registry();
        let credential = registry
            .issue_root(ActorRole::Manufacturer, "Acme Pharma", "Capital City")
            .await
            .unwrap();

        assert!(credential.entity_id.starts_with("MFG-"));
        assert_eq!(credential.entity_id.len(), 4 + 4);
        let passphrase = credential.passphrase.as_deref().unwrap();
        assert_eq!(passphrase.len(), 8);
    }

    #[tokio::test]
    async fn issue_pharmacy_has_license_prefix() {
        let registry = registry();
        let credential = registry
            .issue_root(ActorRole::Pharmacy, "Green Cross", "Springfield")
            .await
            .unwrap();

        assert!(credential.entity_id.starts_with("LIC-"));
        assert_eq!(credential.entity_id.len(), 4 + 6);
        assert!(credential.passphrase.is_some());
    }

    #[tokio::test]
    async fn root_does_not_issue_distributors_directly() {
        let registry = registry();
        let result = registry
            .issue_root(ActorRole::Distributor, "FastFreight", "Capital City")
            .await;
        assert!(matches!(result, Err(RegistryError::UnsupportedRole { .. })));
    }

    #[tokio::test]
    async fn manufacturer_issues_distributor_and_notifies_root() {
        let registry = registry();
        let manufacturer = registry
            .issue_root(ActorRole::Manufacturer, "Acme Pharma", "Capital City")
            .await
            .unwrap();

        let distributor = registry
            .issue_distributor(&manufacturer.entity_id, "FastFreight", "Capital City")
            .await
            .unwrap();

        assert!(distributor.entity_id.starts_with("DIST-"));
        assert!(distributor.passphrase.is_none());

        // 정보성 알림이 활성 상태로 남음
        let alerts = registry
            .alerts
            .list_alerts(Some(AlertStatus::Active), 10)
            .await
            .unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].category, AnomalyCategory::NewDistributor);
        assert_eq!(alerts[0].severity, Severity::Info);
        assert_eq!(alerts[0].subject_id, distributor.entity_id);
    }

    #[tokio::test]
    async fn pharmacy_cannot_issue_distributor() {
        let registry = registry();
        let pharmacy = registry
            .issue_root(ActorRole::Pharmacy, "Green Cross", "Springfield")
            .await
            .unwrap();

        let result = registry
            .issue_distributor(&pharmacy.entity_id, "FastFreight", "Capital City")
            .await;
        match result {
            Err(RegistryError::Hierarchy {
                issuer_role,
                requested,
            }) => {
                assert_eq!(issuer_role, ActorRole::Pharmacy);
                assert_eq!(requested, ActorRole::Distributor);
            }
            other => panic!("expected Hierarchy error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_issuer_cannot_issue() {
        let registry = registry();
        let result = registry
            .issue_distributor("MFG-ZZZZ", "FastFreight", "Capital City")
            .await;
        assert!(matches!(result, Err(RegistryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn authenticate_exact_match() {
        let registry = registry();
        let credential = registry
            .issue_root(ActorRole::Pharmacy, "Green Cross", "Springfield")
            .await
            .unwrap();
        let passphrase = credential.passphrase.clone().unwrap();

        let authenticated = registry
            .authenticate(ActorRole::Pharmacy, &credential.entity_id, Some(&passphrase))
            .await
            .unwrap();
        assert_eq!(authenticated.name, "Green Cross");
    }

    #[tokio::test]
    async fn authenticate_wrong_passphrase_fails() {
        let registry = registry();
        let credential = registry
            .issue_root(ActorRole::Pharmacy, "Green Cross", "Springfield")
            .await
            .unwrap();

        let result = registry
            .authenticate(ActorRole::Pharmacy, &credential.entity_id, Some("wrong"))
            .await;
        assert!(matches!(result, Err(RegistryError::AuthFailure)));

        let missing = registry
            .authenticate(ActorRole::Pharmacy, &credential.entity_id, None)
            .await;
        assert!(matches!(missing, Err(RegistryError::AuthFailure)));
    }

    #[tokio::test]
    async fn authenticate_wrong_role_fails() {
        let registry = registry();
        let credential = registry
            .issue_root(ActorRole::Pharmacy, "Green Cross", "Springfield")
            .await
            .unwrap();
        let passphrase = credential.passphrase.clone().unwrap();

        let result = registry
            .authenticate(
                ActorRole::Manufacturer,
                &credential.entity_id,
                Some(&passphrase),
            )
            .await;
        assert!(matches!(result, Err(RegistryError::AuthFailure)));
    }

    #[tokio::test]
    async fn distributor_authenticates_with_id_only() {
        let registry = registry();
        let manufacturer = registry
            .issue_root(ActorRole::Manufacturer, "Acme Pharma", "Capital City")
            .await
            .unwrap();
        let distributor = registry
            .issue_distributor(&manufacturer.entity_id, "FastFreight", "Capital City")
            .await
            .unwrap();

        let authenticated = registry
            .authenticate(ActorRole::Distributor, &distributor.entity_id, None)
            .await
            .unwrap();
        assert_eq!(authenticated.name, "FastFreight");
    }

    #[tokio::test]
    async fn revoke_makes_next_authentication_fail() {
        let registry = registry();
        let credential = registry
            .issue_root(ActorRole::Manufacturer, "Acme Pharma", "Capital City")
            .await
            .unwrap();
        let passphrase = credential.passphrase.clone().unwrap();

        // 폐기 전에는 인증 성공
        registry
            .authenticate(
                ActorRole::Manufacturer,
                &credential.entity_id,
                Some(&passphrase),
            )
            .await
            .unwrap();

        registry.revoke(&credential.entity_id).await.unwrap();

        // 같은 프로세스 수명 내의 이전 성공과 무관하게 즉시 실패
        let result = registry
            .authenticate(
                ActorRole::Manufacturer,
                &credential.entity_id,
                Some(&passphrase),
            )
            .await;
        assert!(matches!(result, Err(RegistryError::AuthFailure)));
    }

    #[tokio::test]
    async fn revoke_unknown_credential_fails() {
        let registry = registry();
        let result = registry.revoke("MFG-ZZZZ").await;
        assert!(matches!(result, Err(RegistryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn list_by_role() {
        let registry = registry();
        registry
            .issue_root(ActorRole::Pharmacy, "Green Cross", "Springfield")
            .await
            .unwrap();
        registry
            .issue_root(ActorRole::Pharmacy, "Blue Cross", "Shelbyville")
            .await
            .unwrap();

        let pharmacies = registry.list(ActorRole::Pharmacy).await.unwrap();
        assert_eq!(pharmacies.len(), 2);
        assert!(registry.list(ActorRole::Distributor).await.unwrap().is_empty());
    }
}
