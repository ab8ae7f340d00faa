//! 통합 테스트 — 공급망 전체 흐름 검증
//!
//! 배치 생성부터 활성화/입고/판매와 이상 징후 에스컬레이션까지
//! 스펙의 예시 시나리오를 그대로 재연합니다.

use pharmatrace_alert_store::{AlertLog, MemoryAlertStore};
use pharmatrace_core::config::{AlertsConfig, LedgerConfig, RegistryConfig, ScanConfig};
use pharmatrace_core::types::{
    ActorRole, AlertStatus, AnomalyCategory, Destination, UnitStatus,
};
use pharmatrace_ledger::{ItemLedger, MemoryUnitStore};
use pharmatrace_registry::{CredentialRegistry, MemoryCredentialStore};
use pharmatrace_scan_engine::{
    ActorContext, ScanAction, ScanEngineError, ScanOutcome, ScanProcessor, ScanRequest,
};

fn test_processor(
    unit_store: MemoryUnitStore,
    alert_store: MemoryAlertStore,
) -> ScanProcessor<MemoryUnitStore, MemoryAlertStore> {
    ScanProcessor::new(
        ItemLedger::new(unit_store, &LedgerConfig::default()),
        AlertLog::new(alert_store, &AlertsConfig::default()),
        &ScanConfig {
            repeat_window_ms: 0,
            ..Default::default()
        },
    )
}

fn dest(pharmacy: &str, city: &str) -> Destination {
    Destination {
        pharmacy: pharmacy.to_owned(),
        city: city.to_owned(),
    }
}

/// 스펙 예시 시나리오: 3-유닛 카톤, Green Cross 활성화,
/// 1유닛 정상 입고, Blue Cross의 우회 시도.
#[tokio::test]
async fn green_cross_blue_cross_scenario() {
    let unit_store = MemoryUnitStore::new();
    let alert_store = MemoryAlertStore::new();
    let mut processor = test_processor(unit_store.clone(), alert_store.clone());

    // 1. 제조사가 3-유닛 카톤을 생성
    let manifest = processor
        .ledger()
        .create_carton("Amoxicillin 500mg", 3)
        .await
        .unwrap();

    // 2. 유통사가 Green Cross(Springfield)로 활성화
    let outcome = processor
        .process(ScanRequest::new(
            &manifest.carton_id,
            ActorContext::new(ActorRole::Distributor, "FastFreight", "Capital City"),
            ScanAction::ActivateCarton {
                destination: dest("Green Cross", "Springfield"),
            },
        ))
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        ScanOutcome::CartonActivated { units: 3, .. }
    ));

    for unit_id in &manifest.unit_ids {
        let unit = processor.ledger().unit(unit_id).await.unwrap();
        assert_eq!(unit.status, UnitStatus::InTransit);
        assert_eq!(unit.destination.as_ref().unwrap().pharmacy, "Green Cross");
        assert_eq!(unit.destination.as_ref().unwrap().city, "Springfield");
    }

    // 3. Green Cross가 첫 유닛을 입고
    let outcome = processor
        .process(ScanRequest::new(
            &manifest.unit_ids[0],
            ActorContext::new(ActorRole::Pharmacy, "Green Cross", "Springfield"),
            ScanAction::ReceiveStock,
        ))
        .await
        .unwrap();
    match outcome {
        ScanOutcome::Stocked { unit } => assert_eq!(unit.status, UnitStatus::Stocked),
        other => panic!("expected Stocked, got {other}"),
    }

    // 4. Blue Cross가 같은 카톤의 두 번째 유닛 입고를 시도 — 우회
    let result = processor
        .process(ScanRequest::new(
            &manifest.unit_ids[1],
            ActorContext::new(ActorRole::Pharmacy, "Blue Cross", "Shelbyville"),
            ScanAction::ReceiveStock,
        ))
        .await;
    match result {
        Err(ScanEngineError::Anomaly { category, alert }) => {
            assert_eq!(category, AnomalyCategory::Diversion);
            assert_eq!(alert.subject_id, manifest.unit_ids[1]);
        }
        other => panic!("expected Diversion anomaly, got {other:?}"),
    }

    // 우회 유닛만 동결, 세 번째 유닛은 그대로 in-transit
    assert_eq!(
        processor.ledger().unit(&manifest.unit_ids[1]).await.unwrap().status,
        UnitStatus::Counterfeit
    );
    assert_eq!(
        processor.ledger().unit(&manifest.unit_ids[2]).await.unwrap().status,
        UnitStatus::InTransit
    );
    assert_eq!(
        processor.ledger().unit(&manifest.unit_ids[0]).await.unwrap().status,
        UnitStatus::Stocked
    );

    // 우회 알림 1건만 활성
    let alerts = processor
        .alerts()
        .list(Some(AlertStatus::Active), None)
        .await
        .unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].category, AnomalyCategory::Diversion);
}

/// 정상 경로 전체: 활성화 -> 입고 -> 판매, 알림 없음.
#[tokio::test]
async fn clean_lifecycle_raises_no_alerts() {
    let mut processor = test_processor(MemoryUnitStore::new(), MemoryAlertStore::new());

    let manifest = processor
        .ledger()
        .create_carton("Ibuprofen 200mg", 2)
        .await
        .unwrap();

    processor
        .process(ScanRequest::new(
            &manifest.carton_id,
            ActorContext::new(ActorRole::Distributor, "FastFreight", "Capital City"),
            ScanAction::ActivateCarton {
                destination: dest("Green Cross", "Springfield"),
            },
        ))
        .await
        .unwrap();

    let pharmacy = ActorContext::new(ActorRole::Pharmacy, "Green Cross", "Springfield");
    for unit_id in &manifest.unit_ids {
        processor
            .process(ScanRequest::new(
                unit_id,
                pharmacy.clone(),
                ScanAction::ReceiveStock,
            ))
            .await
            .unwrap();
        processor
            .process(ScanRequest::new(
                unit_id,
                pharmacy.clone(),
                ScanAction::Dispense,
            ))
            .await
            .unwrap();

        let unit = processor.ledger().unit(unit_id).await.unwrap();
        assert_eq!(unit.status, UnitStatus::Sold);
        // 히스토리: 활성화 + 입고 + 판매
        assert_eq!(unit.history.len(), 3);
    }

    assert!(processor.alerts().list(None, None).await.unwrap().is_empty());
}

/// 자격증명 발급/인증이 스캔 행위자 컨텍스트로 이어지는 흐름.
#[tokio::test]
async fn registry_gates_scan_actors() {
    let alert_store = MemoryAlertStore::new();
    let registry = CredentialRegistry::new(
        MemoryCredentialStore::new(),
        alert_store.clone(),
        &RegistryConfig::default(),
    );

    // 루트가 제조사/약국을 등록, 제조사가 유통사를 등록
    let manufacturer = registry
        .issue_root(ActorRole::Manufacturer, "Acme Pharma", "Capital City")
        .await
        .unwrap();
    let pharmacy_cred = registry
        .issue_root(ActorRole::Pharmacy, "Green Cross", "Springfield")
        .await
        .unwrap();
    let distributor_cred = registry
        .issue_distributor(&manufacturer.entity_id, "FastFreight", "Capital City")
        .await
        .unwrap();

    // 인증된 자격증명에서 행위자 컨텍스트를 구성
    let distributor = registry
        .authenticate(ActorRole::Distributor, &distributor_cred.entity_id, None)
        .await
        .unwrap();
    let pharmacy = registry
        .authenticate(
            ActorRole::Pharmacy,
            &pharmacy_cred.entity_id,
            pharmacy_cred.passphrase.as_deref(),
        )
        .await
        .unwrap();

    let mut processor = test_processor(MemoryUnitStore::new(), alert_store.clone());
    let manifest = processor
        .ledger()
        .create_carton("Amoxicillin 500mg", 1)
        .await
        .unwrap();

    processor
        .process(ScanRequest::new(
            &manifest.carton_id,
            ActorContext::new(ActorRole::Distributor, distributor.name, distributor.location),
            ScanAction::ActivateCarton {
                destination: dest(&pharmacy.name, &pharmacy.location),
            },
        ))
        .await
        .unwrap();

    let outcome = processor
        .process(ScanRequest::new(
            &manifest.unit_ids[0],
            ActorContext::new(ActorRole::Pharmacy, pharmacy.name, pharmacy.location),
            ScanAction::ReceiveStock,
        ))
        .await
        .unwrap();
    assert!(matches!(outcome, ScanOutcome::Stocked { .. }));

    // 유통사 등록 정보성 알림이 남아 있음 (우회/도난 알림 아님)
    let log = AlertLog::new(alert_store, &AlertsConfig::default());
    let alerts = log.list(Some(AlertStatus::Active), None).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].category, AnomalyCategory::NewDistributor);
}

/// 이상 징후 알림의 해결 생애주기.
#[tokio::test]
async fn anomaly_alert_can_be_resolved_once() {
    let mut processor = test_processor(MemoryUnitStore::new(), MemoryAlertStore::new());
    let manifest = processor
        .ledger()
        .create_carton("Amoxicillin 500mg", 1)
        .await
        .unwrap();

    // 비활성 입고 — 도난 이상 징후
    let result = processor
        .process(ScanRequest::new(
            &manifest.unit_ids[0],
            ActorContext::new(ActorRole::Pharmacy, "Green Cross", "Springfield"),
            ScanAction::ReceiveStock,
        ))
        .await;
    let alert = match result {
        Err(ScanEngineError::Anomaly { alert, .. }) => alert,
        other => panic!("expected anomaly, got {other:?}"),
    };

    let resolved = processor.alerts().resolve(&alert.id).await.unwrap();
    assert_eq!(resolved.status, AlertStatus::Resolved);

    // 해결은 단방향
    assert!(processor.alerts().resolve(&alert.id).await.is_err());

    // 해결되어도 유닛은 counterfeit로 남음
    let unit = processor.ledger().unit(&manifest.unit_ids[0]).await.unwrap();
    assert_eq!(unit.status, UnitStatus::Counterfeit);
}

/// 동시 입고 경합: 한쪽만 성공하고 패배자는 거부 경로로 빠진다.
#[tokio::test]
async fn concurrent_receipts_cannot_both_succeed() {
    let unit_store = MemoryUnitStore::new();
    let alert_store = MemoryAlertStore::new();

    let setup = ItemLedger::new(unit_store.clone(), &LedgerConfig::default());
    let manifest = setup.create_carton("Amoxicillin 500mg", 1).await.unwrap();
    setup
        .activate_carton(
            &manifest.carton_id,
            dest("Green Cross", "Springfield"),
            pharmatrace_core::types::ScanEvent::new(
                ActorRole::Distributor,
                "FastFreight",
                "Capital City",
                "Activated for Green Cross",
                pharmatrace_core::types::ScanResult::Valid,
                pharmatrace_core::types::EventKind::Activation,
            ),
        )
        .await
        .unwrap();

    // 같은 약국의 두 프로세서(두 계산대)가 같은 유닛을 경쟁 스캔
    let unit_id = manifest.unit_ids[0].clone();
    let mut first = test_processor(unit_store.clone(), alert_store.clone());
    let mut second = test_processor(unit_store.clone(), alert_store.clone());

    let request = |id: &str| {
        ScanRequest::new(
            id,
            ActorContext::new(ActorRole::Pharmacy, "Green Cross", "Springfield"),
            ScanAction::ReceiveStock,
        )
    };

    let (a, b) = tokio::join!(
        first.process(request(&unit_id)),
        second.process(request(&unit_id)),
    );

    let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one concurrent receipt may succeed");

    let unit = setup.unit(&unit_id).await.unwrap();
    assert_eq!(unit.status, UnitStatus::Stocked);
    assert_eq!(unit.history.len(), 2, "loser must not append history");
}
