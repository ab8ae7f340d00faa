//! 스캔 프로세서 — 검증/적용/이상 징후 프로토콜의 단일 진입점
//!
//! 해석 순서:
//! 1. 반복 억제 — 직전 처리와 같은 식별자가 윈도우 내에 반복되면
//!    조용히 무시 (이벤트/알림 없음)
//! 2. 조회 — 유통사 동작은 카톤 ID, 약국 동작은 유닛 ID로 해석.
//!    미등록이면 기록 없이 에러 반환
//! 3. 합법성 검사 — 원장 전이 테이블과 역할별 가드
//! 4. 이상 징후 — `result = alert` 이벤트 추가, counterfeit 동결
//!    (카톤 수준 이상 징후는 전체 멤버), 알림 정확히 1건 생성,
//!    분류를 담은 에러 반환. 순서 오류는 부수 효과 없이 거부만 합니다.

use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{debug, warn};

use pharmatrace_alert_store::AlertLog;
use pharmatrace_core::config::ScanConfig;
use pharmatrace_core::metrics::{
    LABEL_CATEGORY, LABEL_RESULT, LABEL_ROLE, SCAN_ANOMALIES_TOTAL,
    SCAN_PROCESSING_DURATION_SECONDS, SCAN_PROCESSED_TOTAL, SCAN_REJECTED_TOTAL,
    SCAN_SUPPRESSED_TOTAL,
};
use pharmatrace_core::store::{AlertStore, UnitStore};
use pharmatrace_core::types::{
    ActorRole, Alert, Destination, EventKind, ScanEvent, ScanResult,
};
use pharmatrace_ledger::state::TransitionViolation;
use pharmatrace_ledger::{ItemLedger, LedgerError};

use crate::error::ScanEngineError;
use crate::request::{ScanAction, ScanOutcome, ScanRequest};
use crate::suppress::RepeatSuppressor;

/// 스캔 프로세서
///
/// 억제기는 세션 로컬 상태이므로 프로세서 인스턴스는 스캔 세션
/// 하나에 속합니다. 스토어는 Arc 공유로 여러 세션이 나눠 씁니다.
pub struct ScanProcessor<S, A> {
    ledger: ItemLedger<S>,
    alerts: AlertLog<A>,
    suppressor: RepeatSuppressor,
}

impl<S: UnitStore, A: AlertStore> ScanProcessor<S, A> {
    /// 새 프로세서를 생성합니다.
    pub fn new(ledger: ItemLedger<S>, alerts: AlertLog<A>, config: &ScanConfig) -> Self {
        Self {
            ledger,
            alerts,
            suppressor: RepeatSuppressor::new(config.repeat_window_ms),
        }
    }

    /// 원장에 대한 참조를 반환합니다.
    pub fn ledger(&self) -> &ItemLedger<S> {
        &self.ledger
    }

    /// 알림 로그에 대한 참조를 반환합니다.
    pub fn alerts(&self) -> &AlertLog<A> {
        &self.alerts
    }

    /// 스캔 하나를 처리합니다.
    ///
    /// 해석 순서는 조회 -> 반복 억제 -> 합법성 검사입니다.
    /// 미등록 식별자는 억제 대상이 아니며 매번 그대로 반환됩니다.
    pub async fn process(&mut self, request: ScanRequest) -> Result<ScanOutcome, ScanEngineError> {
        let started = Instant::now();
        let identifier = request.identifier.trim().to_owned();

        // 1. 조회 — 유통사 동작은 카톤 ID, 그 외는 유닛 ID로 해석
        if let Err(e) = self.resolve(&request, &identifier).await {
            if matches!(e, ScanEngineError::UnknownIdentifier { .. }) {
                let role = request.actor.role.to_string();
                counter!(SCAN_PROCESSED_TOTAL, LABEL_ROLE => role, LABEL_RESULT => "invalid")
                    .increment(1);
                counter!(SCAN_REJECTED_TOTAL).increment(1);
            }
            return Err(e);
        }

        // 2. 반복 억제 — 직전 처리와 같은 식별자는 조용히 무시
        if self.suppressor.is_repeat(&identifier) {
            counter!(SCAN_SUPPRESSED_TOTAL).increment(1);
            debug!(identifier = %identifier, "repeat scan suppressed");
            return Ok(ScanOutcome::Suppressed);
        }

        // 3. 합법성 검사와 적용
        let result = self.dispatch(&request, &identifier).await;

        // 수리/거부와 무관하게 처리한 식별자를 기록.
        // 스토어 장애는 예외 — 즉시 재시도가 억제되면 안 됨
        if !matches!(result, Err(ScanEngineError::Store(_))) {
            self.suppressor.note(&identifier);
        }
        histogram!(SCAN_PROCESSING_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
        self.record_metrics(&request, &result);

        result
    }

    /// 식별자가 원장의 레코드로 해석되는지 확인합니다.
    ///
    /// 미등록이면 아무것도 기록하지 않고 에러를 반환합니다.
    async fn resolve(
        &self,
        request: &ScanRequest,
        identifier: &str,
    ) -> Result<(), ScanEngineError> {
        let lookup = match &request.action {
            ScanAction::ActivateCarton { .. } => {
                self.ledger.carton(identifier).await.map(|_| ())
            }
            ScanAction::ReceiveStock | ScanAction::Dispense => {
                self.ledger.unit(identifier).await.map(|_| ())
            }
        };
        lookup.map_err(|e| ScanEngineError::from_ledger(e, identifier))
    }

    /// 역할별 가드 후 동작으로 분기합니다.
    async fn dispatch(
        &self,
        request: &ScanRequest,
        identifier: &str,
    ) -> Result<ScanOutcome, ScanEngineError> {
        match &request.action {
            ScanAction::ActivateCarton { destination } => {
                self.require_role(request, ActorRole::Distributor)?;
                self.activate(request, identifier, destination.clone()).await
            }
            ScanAction::ReceiveStock => {
                self.require_role(request, ActorRole::Pharmacy)?;
                self.receive(request, identifier).await
            }
            ScanAction::Dispense => {
                self.require_role(request, ActorRole::Pharmacy)?;
                self.dispense(request, identifier).await
            }
        }
    }

    /// 동작에 필요한 역할을 검사합니다.
    ///
    /// 자격증명 게이트는 호출자(레지스트리 인증) 책임이고,
    /// 여기서는 요청 자체의 정합성만 확인합니다.
    fn require_role(&self, request: &ScanRequest, required: ActorRole) -> Result<(), ScanEngineError> {
        if request.actor.role == required {
            Ok(())
        } else {
            Err(ScanEngineError::Rejected {
                reason: format!(
                    "{} cannot perform {}",
                    request.actor.role, request.action
                ),
            })
        }
    }

    /// 유통사 카톤 활성화.
    async fn activate(
        &self,
        request: &ScanRequest,
        carton_id: &str,
        destination: Destination,
    ) -> Result<ScanOutcome, ScanEngineError> {
        let event = ScanEvent::new(
            request.actor.role,
            request.actor.name.clone(),
            request.actor.location.clone(),
            format!("Activated for {}", destination.pharmacy),
            ScanResult::Valid,
            EventKind::Activation,
        );

        match self
            .ledger
            .activate_carton(carton_id, destination.clone(), event)
            .await
        {
            Ok(units) => Ok(ScanOutcome::CartonActivated {
                carton_id: carton_id.to_owned(),
                units,
                destination,
            }),
            Err(LedgerError::Violation(violation)) => {
                self.escalate_carton(request, carton_id, violation).await
            }
            Err(other) => Err(ScanEngineError::from_ledger(other, carton_id)),
        }
    }

    /// 약국 입고.
    async fn receive(
        &self,
        request: &ScanRequest,
        unit_id: &str,
    ) -> Result<ScanOutcome, ScanEngineError> {
        let event = ScanEvent::new(
            request.actor.role,
            request.actor.name.clone(),
            request.actor.location.clone(),
            "Stock Arrival",
            ScanResult::Valid,
            EventKind::Receipt,
        );

        match self
            .ledger
            .receive_unit(unit_id, &request.actor.name, event)
            .await
        {
            Ok(unit) => Ok(ScanOutcome::Stocked { unit }),
            Err(LedgerError::Violation(violation)) => {
                self.escalate_unit(request, unit_id, violation, "Attempted stock receipt")
                    .await
            }
            Err(other) => Err(ScanEngineError::from_ledger(other, unit_id)),
        }
    }

    /// 약국 판매/불출.
    async fn dispense(
        &self,
        request: &ScanRequest,
        unit_id: &str,
    ) -> Result<ScanOutcome, ScanEngineError> {
        let event = ScanEvent::new(
            request.actor.role,
            request.actor.name.clone(),
            request.actor.location.clone(),
            "Dispensed",
            ScanResult::Valid,
            EventKind::Dispense,
        );

        match self.ledger.dispense_unit(unit_id, event).await {
            Ok(unit) => Ok(ScanOutcome::Dispensed { unit }),
            Err(LedgerError::Violation(violation)) => {
                self.escalate_unit(request, unit_id, violation, "Attempted dispense")
                    .await
            }
            Err(other) => Err(ScanEngineError::from_ledger(other, unit_id)),
        }
    }

    /// 유닛 수준 가드 실패 처리.
    ///
    /// 순서 오류는 부수 효과 없이 거부하고, 이상 징후는 동결과
    /// 알림 기록을 수행합니다.
    async fn escalate_unit(
        &self,
        request: &ScanRequest,
        unit_id: &str,
        violation: TransitionViolation,
        attempted: &str,
    ) -> Result<ScanOutcome, ScanEngineError> {
        let category = match violation {
            TransitionViolation::Sequence(reason) => {
                return Err(ScanEngineError::Rejected { reason });
            }
            TransitionViolation::Anomaly(category) => category,
        };

        let alert_event = ScanEvent::new(
            request.actor.role,
            request.actor.name.clone(),
            request.actor.location.clone(),
            attempted,
            ScanResult::Alert,
            EventKind::Flagged,
        );

        let flagged = self
            .ledger
            .flag_unit(unit_id, alert_event.clone())
            .await
            .map_err(|e| ScanEngineError::from_ledger(e, unit_id))?;

        // 원본 증거 = 가장 최근의 valid 이벤트, 없으면 유발 이벤트
        let original = flagged
            .last_valid_event()
            .cloned()
            .unwrap_or_else(|| alert_event.clone());

        let alert = self
            .alerts
            .raise(Alert::new(
                flagged.product_name.clone(),
                flagged.unit_id.clone(),
                category,
                original,
                alert_event,
            ))
            .await?;

        warn!(
            unit_id = %unit_id,
            category = %category,
            alert_id = %alert.id,
            "scan escalated to integrity anomaly"
        );

        Err(ScanEngineError::Anomaly {
            category,
            alert: Box::new(alert),
        })
    }

    /// 카톤 수준 가드 실패 처리 — 전체 멤버를 동결하고 알림 1건.
    async fn escalate_carton(
        &self,
        request: &ScanRequest,
        carton_id: &str,
        violation: TransitionViolation,
    ) -> Result<ScanOutcome, ScanEngineError> {
        let category = match violation {
            TransitionViolation::Sequence(reason) => {
                return Err(ScanEngineError::Rejected { reason });
            }
            TransitionViolation::Anomaly(category) => category,
        };

        let alert_event = ScanEvent::new(
            request.actor.role,
            request.actor.name.clone(),
            request.actor.location.clone(),
            "Duplicate Activation",
            ScanResult::Alert,
            EventKind::Flagged,
        );

        // 동결 전에 증거 스냅샷 확보
        let members = self
            .ledger
            .carton(carton_id)
            .await
            .map_err(|e| ScanEngineError::from_ledger(e, carton_id))?;
        let subject_name = members[0].product_name.clone();
        let original = members[0]
            .last_valid_event()
            .cloned()
            .unwrap_or_else(|| alert_event.clone());

        let flagged = self
            .ledger
            .flag_carton(carton_id, alert_event.clone())
            .await
            .map_err(|e| ScanEngineError::from_ledger(e, carton_id))?;

        let alert = self
            .alerts
            .raise(Alert::new(
                subject_name,
                carton_id,
                category,
                original,
                alert_event,
            ))
            .await?;

        warn!(
            carton_id = %carton_id,
            units = flagged,
            category = %category,
            alert_id = %alert.id,
            "carton scan escalated to integrity anomaly"
        );

        Err(ScanEngineError::Anomaly {
            category,
            alert: Box::new(alert),
        })
    }

    /// 결과별 메트릭을 기록합니다.
    fn record_metrics(
        &self,
        request: &ScanRequest,
        result: &Result<ScanOutcome, ScanEngineError>,
    ) {
        let role = request.actor.role.to_string();
        match result {
            Ok(_) => {
                counter!(SCAN_PROCESSED_TOTAL, LABEL_ROLE => role, LABEL_RESULT => "valid")
                    .increment(1);
            }
            Err(ScanEngineError::Anomaly { category, .. }) => {
                counter!(SCAN_PROCESSED_TOTAL, LABEL_ROLE => role, LABEL_RESULT => "alert")
                    .increment(1);
                counter!(SCAN_ANOMALIES_TOTAL, LABEL_CATEGORY => category.to_string())
                    .increment(1);
            }
            Err(ScanEngineError::Rejected { .. } | ScanEngineError::UnknownIdentifier { .. }) => {
                counter!(SCAN_PROCESSED_TOTAL, LABEL_ROLE => role, LABEL_RESULT => "invalid")
                    .increment(1);
                counter!(SCAN_REJECTED_TOTAL).increment(1);
            }
            Err(_) => {}
        }
    }
}
