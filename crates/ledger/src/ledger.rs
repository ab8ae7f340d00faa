//! 유닛 원장 — 배치 생성과 생애주기 전이의 단일 적용 지점
//!
//! [`ItemLedger`]는 스토어 위에서 전이 테이블을 강제합니다.
//! 모든 전이는 마지막으로 알려진 상태에 대한 조건부 갱신으로
//! 표현되어, 같은 식별자에 대한 두 동시 스캔이 모두 성공할 수
//! 없습니다. 패배한 쪽은 전이 후 상태를 기준으로 재평가되어
//! 거부/이상 징후 경로로 돌아갑니다.

use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use pharmatrace_core::config::LedgerConfig;
use pharmatrace_core::error::StoreError;
use pharmatrace_core::metrics::{
    LEDGER_CAS_CONFLICTS_TOTAL, LEDGER_TRANSITIONS_TOTAL, LEDGER_UNITS_CREATED_TOTAL,
};
use pharmatrace_core::store::{UnitFilter, UnitStore};
use pharmatrace_core::types::{AnomalyCategory, Destination, ScanEvent, Unit, UnitStatus};
use pharmatrace_core::id;

use crate::error::LedgerError;
use crate::state::{TransitionViolation, UnitTransition, evaluate};

/// 식별자 충돌 시 배치 재생성 시도 횟수
const ID_RETRY_ATTEMPTS: usize = 3;

/// 배치 생성 결과 — 카톤 하나와 그 멤버 유닛들의 식별자
///
/// 라벨 출력과 매니페스트 작성에 사용됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartonManifest {
    /// 마스터 카톤 ID
    pub carton_id: String,
    /// 생산 배치 ID
    pub batch_id: String,
    /// 제품명
    pub product_name: String,
    /// 멤버 유닛 ID 목록
    pub unit_ids: Vec<String>,
}

/// 유닛 원장
pub struct ItemLedger<S> {
    store: S,
    max_units_per_carton: usize,
}

impl<S: UnitStore> ItemLedger<S> {
    /// 새 원장을 생성합니다.
    pub fn new(store: S, config: &LedgerConfig) -> Self {
        Self {
            store,
            max_units_per_carton: config.max_units_per_carton,
        }
    }

    /// 내부 스토어에 대한 참조를 반환합니다.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// 새 카톤과 멤버 유닛들을 비활성 상태로 생성합니다.
    ///
    /// 생성 시 유일성 검사는 하지 않으며, 스토어가 충돌을 거부하면
    /// 식별자를 다시 생성하여 재시도합니다 (§재시도 계약).
    pub async fn create_carton(
        &self,
        product_name: &str,
        units: usize,
    ) -> Result<CartonManifest, LedgerError> {
        if units == 0 {
            return Err(LedgerError::InvalidBatch {
                reason: "carton must contain at least one unit".to_owned(),
            });
        }
        if units > self.max_units_per_carton {
            return Err(LedgerError::CapacityExceeded {
                requested: units,
                max: self.max_units_per_carton,
            });
        }

        for attempt in 1..=ID_RETRY_ATTEMPTS {
            let carton_id = id::generate(id::CARTON_PREFIX);
            let batch_id = id::batch_id();
            let records: Vec<Unit> = (0..units)
                .map(|_| {
                    Unit::new(
                        id::generate(id::UNIT_PREFIX),
                        &carton_id,
                        product_name,
                        &batch_id,
                    )
                })
                .collect();
            let unit_ids: Vec<String> = records.iter().map(|u| u.unit_id.clone()).collect();

            match self.store.insert_units(records).await {
                Ok(()) => {
                    counter!(LEDGER_UNITS_CREATED_TOTAL).increment(units as u64);
                    info!(
                        carton_id = %carton_id,
                        batch_id = %batch_id,
                        units,
                        "created carton batch"
                    );
                    return Ok(CartonManifest {
                        carton_id,
                        batch_id,
                        product_name: product_name.to_owned(),
                        unit_ids,
                    });
                }
                Err(StoreError::DuplicateId { id }) => {
                    debug!(attempt, duplicate = %id, "identifier collision, regenerating batch");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(LedgerError::IdCollision {
            attempts: ID_RETRY_ATTEMPTS,
        })
    }

    /// 유닛 ID로 단건을 조회합니다.
    pub async fn unit(&self, unit_id: &str) -> Result<Unit, LedgerError> {
        self.store
            .unit_by_id(unit_id)
            .await?
            .ok_or_else(|| LedgerError::UnknownUnit {
                unit_id: unit_id.to_owned(),
            })
    }

    /// 카톤의 멤버 유닛들을 조회합니다.
    pub async fn carton(&self, carton_id: &str) -> Result<Vec<Unit>, LedgerError> {
        let members = self.store.carton_units(carton_id).await?;
        if members.is_empty() {
            return Err(LedgerError::UnknownCarton {
                carton_id: carton_id.to_owned(),
            });
        }
        Ok(members)
    }

    /// 카톤을 단일 원자적 그룹 전이로 활성화합니다.
    ///
    /// 모든 멤버가 `inactive`여야 하며, 전이 시 모든 멤버에 같은
    /// 목적지가 지정됩니다. 부분 활성화는 관찰될 수 없습니다.
    /// 전이된 유닛 수를 반환합니다.
    pub async fn activate_carton(
        &self,
        carton_id: &str,
        destination: Destination,
        event: ScanEvent,
    ) -> Result<usize, LedgerError> {
        let members = self.carton(carton_id).await?;
        for member in &members {
            if member.status != UnitStatus::Inactive {
                return Err(LedgerError::Violation(TransitionViolation::Anomaly(
                    AnomalyCategory::DuplicateActivation,
                )));
            }
        }

        match self
            .store
            .apply_carton_transition(
                carton_id,
                UnitStatus::Inactive,
                UnitStatus::InTransit,
                event,
                Some(destination.clone()),
            )
            .await
        {
            Ok(moved) => {
                counter!(LEDGER_TRANSITIONS_TOTAL).increment(moved as u64);
                info!(
                    carton_id = %carton_id,
                    units = moved,
                    destination = %destination,
                    "carton activated"
                );
                Ok(moved)
            }
            // 동시 활성화 경합에서 패배 — 이미 활성화된 카톤으로 취급
            Err(StoreError::StatusConflict { .. }) => {
                counter!(LEDGER_CAS_CONFLICTS_TOTAL).increment(1);
                Err(LedgerError::Violation(TransitionViolation::Anomaly(
                    AnomalyCategory::DuplicateActivation,
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// 약국 입고 전이를 적용합니다.
    pub async fn receive_unit(
        &self,
        unit_id: &str,
        pharmacy: &str,
        event: ScanEvent,
    ) -> Result<Unit, LedgerError> {
        self.transition_unit(
            unit_id,
            UnitTransition::Receive {
                pharmacy: pharmacy.to_owned(),
            },
            event,
        )
        .await
    }

    /// 판매/불출 전이를 적용합니다.
    pub async fn dispense_unit(
        &self,
        unit_id: &str,
        event: ScanEvent,
    ) -> Result<Unit, LedgerError> {
        self.transition_unit(unit_id, UnitTransition::Dispense, event).await
    }

    /// 유닛을 counterfeit로 동결하고 알림 이벤트를 기록합니다.
    pub async fn flag_unit(&self, unit_id: &str, event: ScanEvent) -> Result<Unit, LedgerError> {
        match self.store.flag_unit(unit_id, event).await {
            Ok(unit) => Ok(unit),
            Err(StoreError::NotFound { .. }) => Err(LedgerError::UnknownUnit {
                unit_id: unit_id.to_owned(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// 카톤의 모든 멤버를 counterfeit로 동결합니다.
    pub async fn flag_carton(
        &self,
        carton_id: &str,
        event: ScanEvent,
    ) -> Result<usize, LedgerError> {
        match self.store.flag_carton(carton_id, event).await {
            Ok(count) => Ok(count),
            Err(StoreError::NotFound { .. }) => Err(LedgerError::UnknownCarton {
                carton_id: carton_id.to_owned(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// 필터로 유닛을 조회합니다.
    pub async fn query(&self, filter: &UnitFilter) -> Result<Vec<Unit>, LedgerError> {
        Ok(self.store.query_units(filter).await?)
    }

    /// 단건 전이의 공통 경로 — 평가 후 조건부 갱신.
    async fn transition_unit(
        &self,
        unit_id: &str,
        transition: UnitTransition,
        event: ScanEvent,
    ) -> Result<Unit, LedgerError> {
        let unit = self.unit(unit_id).await?;
        let next = evaluate(unit.status, unit.destination.as_ref(), &transition)
            .map_err(LedgerError::Violation)?;

        match self
            .store
            .apply_unit_transition(unit_id, unit.status, next, event, None)
            .await
        {
            Ok(updated) => {
                counter!(LEDGER_TRANSITIONS_TOTAL).increment(1);
                debug!(unit_id = %unit_id, from = %unit.status, to = %next, "unit transition");
                Ok(updated)
            }
            Err(StoreError::StatusConflict { actual, .. }) => {
                counter!(LEDGER_CAS_CONFLICTS_TOTAL).increment(1);
                // 패배자는 전이 후 상태를 관찰하고 그 기준으로 재분류됨
                match evaluate(actual, unit.destination.as_ref(), &transition) {
                    Ok(_) => Err(LedgerError::Violation(TransitionViolation::Sequence(
                        "concurrent update, retry scan".to_owned(),
                    ))),
                    Err(violation) => Err(LedgerError::Violation(violation)),
                }
            }
            Err(e) => Err(e.into()),
        }
    }
}
