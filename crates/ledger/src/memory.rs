//! 인메모리 유닛 스토어 — 테스트/데모용 [`UnitStore`] 구현
//!
//! `tokio::sync::Mutex`로 감싼 단일 맵 위에서 조건부 갱신과
//! 카톤 일괄 쓰기의 원자성을 그대로 재현합니다. 외부 문서 스토어를
//! 붙일 때 구현이 지켜야 하는 계약의 참조 구현이기도 합니다.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use pharmatrace_core::error::StoreError;
use pharmatrace_core::store::{UnitFilter, UnitStore};
use pharmatrace_core::types::{Destination, ScanEvent, Unit, UnitStatus};

/// 인메모리 유닛 스토어
///
/// `Clone`은 내부 맵을 공유합니다 (Arc).
#[derive(Debug, Clone, Default)]
pub struct MemoryUnitStore {
    units: Arc<Mutex<BTreeMap<String, Unit>>>,
}

impl MemoryUnitStore {
    /// 빈 스토어를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장된 유닛 수를 반환합니다 (테스트 편의용).
    pub async fn unit_count(&self) -> usize {
        self.units.lock().await.len()
    }
}

impl UnitStore for MemoryUnitStore {
    async fn insert_units(&self, units: Vec<Unit>) -> Result<(), StoreError> {
        let mut guard = self.units.lock().await;
        // 하나라도 충돌하면 아무것도 삽입하지 않음
        for unit in &units {
            if guard.contains_key(&unit.unit_id) {
                return Err(StoreError::DuplicateId {
                    id: unit.unit_id.clone(),
                });
            }
        }
        for unit in units {
            guard.insert(unit.unit_id.clone(), unit);
        }
        Ok(())
    }

    async fn unit_by_id(&self, unit_id: &str) -> Result<Option<Unit>, StoreError> {
        Ok(self.units.lock().await.get(unit_id).cloned())
    }

    async fn carton_units(&self, carton_id: &str) -> Result<Vec<Unit>, StoreError> {
        // 소규모 전제의 선형 탐색 — 외부 스토어는 carton_id 색인을 사용
        Ok(self
            .units
            .lock()
            .await
            .values()
            .filter(|u| u.carton_id == carton_id)
            .cloned()
            .collect())
    }

    async fn apply_unit_transition(
        &self,
        unit_id: &str,
        expected: UnitStatus,
        next: UnitStatus,
        event: ScanEvent,
        destination: Option<Destination>,
    ) -> Result<Unit, StoreError> {
        let mut guard = self.units.lock().await;
        let unit = guard.get_mut(unit_id).ok_or_else(|| StoreError::NotFound {
            id: unit_id.to_owned(),
        })?;

        if unit.status != expected {
            return Err(StoreError::StatusConflict {
                id: unit_id.to_owned(),
                expected,
                actual: unit.status,
            });
        }

        unit.status = next;
        if let Some(dest) = destination {
            unit.destination = Some(dest);
        }
        unit.history.push(event);
        Ok(unit.clone())
    }

    async fn apply_carton_transition(
        &self,
        carton_id: &str,
        expected: UnitStatus,
        next: UnitStatus,
        event: ScanEvent,
        destination: Option<Destination>,
    ) -> Result<usize, StoreError> {
        let mut guard = self.units.lock().await;
        let member_ids: Vec<String> = guard
            .values()
            .filter(|u| u.carton_id == carton_id)
            .map(|u| u.unit_id.clone())
            .collect();

        if member_ids.is_empty() {
            return Err(StoreError::NotFound {
                id: carton_id.to_owned(),
            });
        }

        // 전부-아니면-전무: 쓰기 전에 전체 멤버의 상태를 검증
        for id in &member_ids {
            let unit = &guard[id];
            if unit.status != expected {
                return Err(StoreError::StatusConflict {
                    id: id.clone(),
                    expected,
                    actual: unit.status,
                });
            }
        }

        for id in &member_ids {
            if let Some(unit) = guard.get_mut(id) {
                unit.status = next;
                if let Some(dest) = &destination {
                    unit.destination = Some(dest.clone());
                }
                unit.history.push(event.clone());
            }
        }

        Ok(member_ids.len())
    }

    async fn flag_unit(&self, unit_id: &str, event: ScanEvent) -> Result<Unit, StoreError> {
        let mut guard = self.units.lock().await;
        let unit = guard.get_mut(unit_id).ok_or_else(|| StoreError::NotFound {
            id: unit_id.to_owned(),
        })?;
        unit.status = UnitStatus::Counterfeit;
        unit.history.push(event);
        Ok(unit.clone())
    }

    async fn flag_carton(&self, carton_id: &str, event: ScanEvent) -> Result<usize, StoreError> {
        let mut guard = self.units.lock().await;
        let member_ids: Vec<String> = guard
            .values()
            .filter(|u| u.carton_id == carton_id)
            .map(|u| u.unit_id.clone())
            .collect();

        if member_ids.is_empty() {
            return Err(StoreError::NotFound {
                id: carton_id.to_owned(),
            });
        }

        for id in &member_ids {
            if let Some(unit) = guard.get_mut(id) {
                unit.status = UnitStatus::Counterfeit;
                unit.history.push(event.clone());
            }
        }

        Ok(member_ids.len())
    }

    async fn query_units(&self, filter: &UnitFilter) -> Result<Vec<Unit>, StoreError> {
        let guard = self.units.lock().await;
        let mut results: Vec<Unit> = guard
            .values()
            .filter(|u| {
                filter.status.is_none_or(|s| u.status == s)
                    && filter
                        .carton_id
                        .as_deref()
                        .is_none_or(|c| u.carton_id == c)
                    && filter
                        .destination_pharmacy
                        .as_deref()
                        .is_none_or(|p| {
                            u.destination.as_ref().is_some_and(|d| d.pharmacy == p)
                        })
                    && filter.batch_id.as_deref().is_none_or(|b| u.batch_id == b)
            })
            .cloned()
            .collect();

        if let Some(limit) = filter.limit {
            results.truncate(limit);
        }
        Ok(results)
    }
}
