//! 영속성 경계 trait — 문서 스토어 협력자 계약
//!
//! 유닛/자격증명/알림 세 컬렉션에 대한 최소 계약을 정의합니다.
//! 엔진이 요구하는 것은 단건 조건부 갱신(compare-and-set)과
//! 카톤 단위의 전부-아니면-전무 일괄 쓰기뿐입니다.
//!
//! 동시성 모델: 프로세스 내 잠금을 가정하지 않습니다. 두 동시 스캔이
//! 같은 유닛을 경합하면 한쪽만 조건부 갱신에 성공하고, 패배한 쪽은
//! [`StoreError::StatusConflict`]로 전이 후 상태를 관찰하여
//! 거부/이상 징후 경로로 재분류됩니다.
//!
//! trait은 RPITIT(`impl Future + Send`)로 선언되어 async-trait 없이
//! 제네릭 서비스(`ItemLedger<S>`, `ScanProcessor<S, A>`)에서 사용됩니다.

use std::future::Future;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::types::{
    ActorRole, Alert, AlertStatus, Credential, Destination, ScanEvent, Unit, UnitStatus,
};

/// 유닛 조회 필터
///
/// 모든 필드는 AND로 결합되며, `None`은 해당 조건 생략을 의미합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitFilter {
    /// 상태 일치
    pub status: Option<UnitStatus>,
    /// 소속 카톤 일치
    pub carton_id: Option<String>,
    /// 지정 약국 일치
    pub destination_pharmacy: Option<String>,
    /// 배치 일치
    pub batch_id: Option<String>,
    /// 결과 상한
    pub limit: Option<usize>,
}

/// 유닛 컬렉션 스토어
///
/// 원장이 소유하는 유닛 레코드의 영속성 계약입니다.
/// 상태 갱신과 히스토리 추가는 항상 하나의 원자적 쓰기입니다.
pub trait UnitStore: Send + Sync {
    /// 유닛들을 삽입합니다. 식별자 충돌 시 전체가 실패합니다.
    fn insert_units(
        &self,
        units: Vec<Unit>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// 유닛 ID로 단건을 조회합니다.
    fn unit_by_id(
        &self,
        unit_id: &str,
    ) -> impl Future<Output = Result<Option<Unit>, StoreError>> + Send;

    /// 카톤 ID를 공유하는 모든 유닛을 조회합니다.
    fn carton_units(
        &self,
        carton_id: &str,
    ) -> impl Future<Output = Result<Vec<Unit>, StoreError>> + Send;

    /// 단건 조건부 전이 — 현재 상태가 `expected`일 때만
    /// 상태를 `next`로 바꾸고 이벤트를 히스토리에 추가합니다.
    ///
    /// 갱신된 유닛을 반환합니다. 상태 불일치 시
    /// [`StoreError::StatusConflict`]를 반환합니다.
    fn apply_unit_transition(
        &self,
        unit_id: &str,
        expected: UnitStatus,
        next: UnitStatus,
        event: ScanEvent,
        destination: Option<Destination>,
    ) -> impl Future<Output = Result<Unit, StoreError>> + Send;

    /// 카톤 일괄 조건부 전이 — 모든 멤버가 `expected` 상태일 때만
    /// 전체를 `next`로 전이합니다. 부분 전이는 관찰될 수 없습니다.
    ///
    /// 전이된 유닛 수를 반환합니다.
    fn apply_carton_transition(
        &self,
        carton_id: &str,
        expected: UnitStatus,
        next: UnitStatus,
        event: ScanEvent,
        destination: Option<Destination>,
    ) -> impl Future<Output = Result<usize, StoreError>> + Send;

    /// 유닛을 무조건 counterfeit로 동결하고 알림 이벤트를 추가합니다.
    ///
    /// counterfeit는 흡수 상태이므로 조건 없이 적용됩니다.
    fn flag_unit(
        &self,
        unit_id: &str,
        event: ScanEvent,
    ) -> impl Future<Output = Result<Unit, StoreError>> + Send;

    /// 카톤의 모든 멤버를 counterfeit로 동결합니다.
    fn flag_carton(
        &self,
        carton_id: &str,
        event: ScanEvent,
    ) -> impl Future<Output = Result<usize, StoreError>> + Send;

    /// 필터로 유닛을 조회합니다.
    fn query_units(
        &self,
        filter: &UnitFilter,
    ) -> impl Future<Output = Result<Vec<Unit>, StoreError>> + Send;
}

/// 자격증명 컬렉션 스토어
pub trait CredentialStore: Send + Sync {
    /// 자격증명을 삽입합니다. 식별자 충돌 시 실패합니다.
    fn insert_credential(
        &self,
        credential: Credential,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// 발급 ID로 단건을 조회합니다.
    fn credential_by_id(
        &self,
        entity_id: &str,
    ) -> impl Future<Output = Result<Option<Credential>, StoreError>> + Send;

    /// 역할별 자격증명 목록을 조회합니다.
    fn credentials_by_role(
        &self,
        role: ActorRole,
    ) -> impl Future<Output = Result<Vec<Credential>, StoreError>> + Send;

    /// 자격증명을 삭제합니다. 삭제 여부를 반환합니다.
    fn delete_credential(
        &self,
        entity_id: &str,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;
}

/// 알림 컬렉션 스토어
pub trait AlertStore: Send + Sync {
    /// 알림을 추가합니다. 추가 후 내용은 불변입니다.
    fn insert_alert(
        &self,
        alert: Alert,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// 알림 ID로 단건을 조회합니다.
    fn alert_by_id(
        &self,
        alert_id: &str,
    ) -> impl Future<Output = Result<Option<Alert>, StoreError>> + Send;

    /// 알림을 해결 상태로 전이합니다 (active -> resolved, 단방향).
    ///
    /// 이미 해결되었으면 [`StoreError::InvalidState`],
    /// 없으면 [`StoreError::NotFound`]를 반환합니다.
    fn resolve_alert(
        &self,
        alert_id: &str,
        resolved_at: SystemTime,
    ) -> impl Future<Output = Result<Alert, StoreError>> + Send;

    /// 알림 목록을 최신순으로 조회합니다.
    fn list_alerts(
        &self,
        status: Option<AlertStatus>,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Alert>, StoreError>> + Send;
}
