//! 도메인 타입 — 시스템 전역에서 사용되는 공통 타입
//!
//! 추적 대상 유닛, 스캔 이벤트, 알림, 자격증명 등
//! 모든 모듈이 공유하는 데이터 구조를 정의합니다.
//! 상태 값은 문서 스토어의 원본 레코드와 호환되도록
//! kebab-case로 직렬화됩니다.

use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// 행위자 역할
///
/// 스캔을 제출할 수 있는 공급망 참여자의 역할입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    /// 제조사 — 배치 생성, 유통사 자격증명 발급
    Manufacturer,
    /// 유통사 — 카톤 활성화
    Distributor,
    /// 약국 — 입고 및 판매
    Pharmacy,
    /// 일반 사용자 — 조회 전용
    Public,
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manufacturer => write!(f, "manufacturer"),
            Self::Distributor => write!(f, "distributor"),
            Self::Pharmacy => write!(f, "pharmacy"),
            Self::Public => write!(f, "public"),
        }
    }
}

/// 유닛 생애주기 상태
///
/// 상태 전이는 원장의 전이 테이블에서만 수행됩니다.
/// `Counterfeit`는 흡수 상태로, 이후의 모든 스캔은 그 자체로
/// 이상 징후로 보고됩니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitStatus {
    /// 생산 직후 — 아직 공급망에 투입되지 않음
    #[default]
    Inactive,
    /// 유통사가 활성화하여 목적지로 이동 중
    InTransit,
    /// 지정 약국에 입고됨
    Stocked,
    /// 환자에게 판매(불출)됨
    Sold,
    /// 위조/도난/우회 의심으로 동결됨
    Counterfeit,
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inactive => write!(f, "inactive"),
            Self::InTransit => write!(f, "in-transit"),
            Self::Stocked => write!(f, "stocked"),
            Self::Sold => write!(f, "sold"),
            Self::Counterfeit => write!(f, "counterfeit"),
        }
    }
}

/// 스캔 판정 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanResult {
    /// 정상 전이로 수리됨
    Valid,
    /// 거부됨 (순서 오류 등, 에스컬레이션 없음)
    Invalid,
    /// 이상 징후로 판정되어 알림이 생성됨
    Alert,
}

impl fmt::Display for ScanResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => write!(f, "valid"),
            Self::Invalid => write!(f, "invalid"),
            Self::Alert => write!(f, "alert"),
        }
    }
}

/// 이벤트 종류
///
/// 히스토리 폴드가 자유 텍스트 `action`을 파싱하지 않고도
/// 상태를 유도할 수 있도록 하는 닫힌 태그 집합입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// 카톤 활성화 (inactive -> in-transit)
    Activation,
    /// 약국 입고 (in-transit -> stocked)
    Receipt,
    /// 판매/불출 (stocked -> sold)
    Dispense,
    /// 이상 징후 플래그 (any -> counterfeit)
    Flagged,
    /// 자격증명 등록 알림용 합성 이벤트
    Registration,
}

/// 배송 목적지 — 유통사가 카톤 활성화 시 지정합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    /// 지정 약국 이름
    pub pharmacy: String,
    /// 약국 소재 도시
    pub city: String,
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.pharmacy, self.city)
    }
}

/// 스캔 이벤트 — 유닛 히스토리에 추가되는 불변 레코드
///
/// 한 번 추가된 이벤트는 수정/삭제되지 않습니다.
/// `timestamp`는 표시용이며, 히스토리의 순서는 원장의
/// 수리 시각(벡터 삽입 순서)이 기준입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanEvent {
    /// 행위자 역할
    pub actor_role: ActorRole,
    /// 행위자 이름
    pub actor_name: String,
    /// 행위자 위치
    pub actor_location: String,
    /// 제출 시각 (표시용 — 정렬/중복제거에 사용 금지)
    pub timestamp: SystemTime,
    /// 수행한 동작 설명
    pub action: String,
    /// 판정 결과
    pub result: ScanResult,
    /// 이벤트 종류
    pub kind: EventKind,
}

impl ScanEvent {
    /// 새 스캔 이벤트를 생성합니다.
    pub fn new(
        actor_role: ActorRole,
        actor_name: impl Into<String>,
        actor_location: impl Into<String>,
        action: impl Into<String>,
        result: ScanResult,
        kind: EventKind,
    ) -> Self {
        Self {
            actor_role,
            actor_name: actor_name.into(),
            actor_location: actor_location.into(),
            timestamp: SystemTime::now(),
            action: action.into(),
            result,
            kind,
        }
    }
}

impl fmt::Display for ScanEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} @ {}: {} ({})",
            self.actor_role, self.actor_name, self.actor_location, self.action, self.result,
        )
    }
}

/// 추적 유닛 — 개별 식별 가능한 물리 품목 하나
///
/// 카톤은 별도 레코드가 아니라 같은 `carton_id`를 공유하는
/// 유닛의 집합입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    /// 유닛 고유 ID (생성 후 불변)
    pub unit_id: String,
    /// 소속 카톤 ID
    pub carton_id: String,
    /// 제품명
    pub product_name: String,
    /// 생산 배치 ID
    pub batch_id: String,
    /// 현재 생애주기 상태
    pub status: UnitStatus,
    /// 지정 목적지 (활성화 전에는 None)
    pub destination: Option<Destination>,
    /// 스캔 히스토리 — 추가 전용, 마지막 요소가 최신
    pub history: Vec<ScanEvent>,
    /// 생성(생산) 시각
    pub created_at: SystemTime,
}

impl Unit {
    /// 새 유닛을 비활성 상태로 생성합니다.
    pub fn new(
        unit_id: impl Into<String>,
        carton_id: impl Into<String>,
        product_name: impl Into<String>,
        batch_id: impl Into<String>,
    ) -> Self {
        Self {
            unit_id: unit_id.into(),
            carton_id: carton_id.into(),
            product_name: product_name.into(),
            batch_id: batch_id.into(),
            status: UnitStatus::Inactive,
            destination: None,
            history: Vec::new(),
            created_at: SystemTime::now(),
        }
    }

    /// 히스토리에서 가장 최근의 `valid` 이벤트를 반환합니다.
    ///
    /// 알림의 원본 증거를 찾을 때 사용합니다.
    pub fn last_valid_event(&self) -> Option<&ScanEvent> {
        self.history
            .iter()
            .rev()
            .find(|e| e.result == ScanResult::Valid)
    }

    /// 히스토리의 마지막 이벤트를 반환합니다.
    pub fn last_event(&self) -> Option<&ScanEvent> {
        self.history.last()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) carton={} status={}",
            self.unit_id, self.product_name, self.carton_id, self.status,
        )
    }
}

/// 심각도 레벨
///
/// 알림의 심각도를 나타냅니다.
/// `Ord` 구현으로 심각도 비교가 가능합니다 (`Info < Low < Medium < High < Critical`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Severity {
    /// 정보성 이벤트
    #[default]
    Info,
    /// 낮은 심각도
    Low,
    /// 중간 심각도
    Medium,
    /// 높은 심각도
    High,
    /// 치명적 — 즉시 대응 필요
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "Info"),
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
            Self::Critical => write!(f, "Critical"),
        }
    }
}

/// 이상 징후 분류
///
/// 위조/도난/우회의 증거가 되는 전이와 정보성 알림을 구분합니다.
/// 단순 순서 오류(이미 입고된 유닛의 재입고 등)는 여기에 속하지 않고
/// 일반 거부로 처리됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnomalyCategory {
    /// 이미 활성화된 카톤의 재활성화 시도
    DuplicateActivation,
    /// 비활성 재고에 대한 입고 시도 — 공장/운송 중 도난 의심
    InactiveTheft,
    /// 지정 목적지가 아닌 약국에서의 입고 시도
    Diversion,
    /// 이미 판매된 유닛의 재판매 시도 — 복제 식별자 의심
    DuplicateSale,
    /// 이미 동결된 유닛에 대한 추가 스캔
    AlreadyCompromised,
    /// 유통사 자격증명 신규 발급 (정보성)
    NewDistributor,
}

impl AnomalyCategory {
    /// 분류에 대응하는 기본 심각도를 반환합니다.
    pub fn severity(self) -> Severity {
        match self {
            Self::NewDistributor => Severity::Info,
            Self::AlreadyCompromised => Severity::Medium,
            Self::DuplicateSale => Severity::Critical,
            Self::DuplicateActivation | Self::InactiveTheft | Self::Diversion => Severity::High,
        }
    }
}

impl fmt::Display for AnomalyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateActivation => write!(f, "duplicate activation"),
            Self::InactiveTheft => write!(f, "theft / inactive batch scan"),
            Self::Diversion => write!(f, "diversion / wrong location"),
            Self::DuplicateSale => write!(f, "duplicate sale attempt"),
            Self::AlreadyCompromised => write!(f, "already compromised"),
            Self::NewDistributor => write!(f, "new distributor registered"),
        }
    }
}

/// 알림 상태
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    /// 미해결
    #[default]
    Active,
    /// 해결됨 (단방향 전이)
    Resolved,
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Resolved => write!(f, "resolved"),
        }
    }
}

/// 이상 징후 알림
///
/// 스캔 프로세서 또는 자격증명 레지스트리만 생성하며,
/// 생성 후 내용은 불변입니다. 상태만 해결 연산으로 변경됩니다.
/// `subject_id`는 값 참조(약한 참조)로, 대상 레코드가 삭제되어도
/// 알림은 유지됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// 알림 ID (UUID v4)
    pub id: String,
    /// 대상 이름 (제품명 또는 시스템 알림 제목)
    pub subject_name: String,
    /// 대상 ID (유닛 ID, 카톤 ID, 또는 자격증명 ID)
    pub subject_id: String,
    /// 마지막으로 알려진 정상 이벤트 (없으면 유발 이벤트와 동일)
    pub original_evidence: ScanEvent,
    /// 알림을 유발한 이상 이벤트
    pub triggering_evidence: ScanEvent,
    /// 생성 시각
    pub timestamp: SystemTime,
    /// 이상 징후 분류
    pub category: AnomalyCategory,
    /// 심각도
    pub severity: Severity,
    /// 현재 상태
    pub status: AlertStatus,
    /// 해결 시각
    pub resolved_at: Option<SystemTime>,
}

impl Alert {
    /// 새 알림을 활성 상태로 생성합니다.
    ///
    /// 심각도는 분류에서 유도됩니다.
    pub fn new(
        subject_name: impl Into<String>,
        subject_id: impl Into<String>,
        category: AnomalyCategory,
        original_evidence: ScanEvent,
        triggering_evidence: ScanEvent,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            subject_name: subject_name.into(),
            subject_id: subject_id.into(),
            original_evidence,
            triggering_evidence,
            timestamp: SystemTime::now(),
            category,
            severity: category.severity(),
            status: AlertStatus::Active,
            resolved_at: None,
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} — {} ({})",
            self.severity, self.category, self.subject_name, self.subject_id,
        )
    }
}

/// 행위자 자격증명
///
/// 제조사/약국은 ID + 패스프레이즈 쌍, 유통사는 ID만 발급됩니다.
/// 패스프레이즈는 인쇄·공유 가능한 자격증명 모델에 따라 평문으로
/// 보관됩니다. 폐기는 무조건 삭제이며 비활성 중간 상태는 없습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// 발급된 식별자 (MFG-..., LIC-..., DIST-...)
    pub entity_id: String,
    /// 기관 이름
    pub name: String,
    /// 기관 위치
    pub location: String,
    /// 역할
    pub role: ActorRole,
    /// 패스프레이즈 (유통사는 None)
    pub passphrase: Option<String>,
    /// 발급 시각
    pub issued_at: SystemTime,
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {} ({})", self.entity_id, self.role, self.name, self.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event(result: ScanResult, kind: EventKind) -> ScanEvent {
        ScanEvent::new(
            ActorRole::Pharmacy,
            "Green Cross",
            "Springfield",
            "Stock Arrival",
            result,
            kind,
        )
    }

    #[test]
    fn unit_status_serializes_kebab_case() {
        let json = serde_json::to_string(&UnitStatus::InTransit).unwrap();
        assert_eq!(json, "\"in-transit\"");
        let back: UnitStatus = serde_json::from_str("\"counterfeit\"").unwrap();
        assert_eq!(back, UnitStatus::Counterfeit);
    }

    #[test]
    fn unit_status_default_is_inactive() {
        assert_eq!(UnitStatus::default(), UnitStatus::Inactive);
    }

    #[test]
    fn actor_role_display() {
        assert_eq!(ActorRole::Manufacturer.to_string(), "manufacturer");
        assert_eq!(ActorRole::Distributor.to_string(), "distributor");
        assert_eq!(ActorRole::Pharmacy.to_string(), "pharmacy");
        assert_eq!(ActorRole::Public.to_string(), "public");
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::Info < Severity::Low);
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn anomaly_category_display_strings() {
        assert_eq!(
            AnomalyCategory::DuplicateActivation.to_string(),
            "duplicate activation"
        );
        assert_eq!(
            AnomalyCategory::InactiveTheft.to_string(),
            "theft / inactive batch scan"
        );
        assert_eq!(
            AnomalyCategory::Diversion.to_string(),
            "diversion / wrong location"
        );
        assert_eq!(
            AnomalyCategory::DuplicateSale.to_string(),
            "duplicate sale attempt"
        );
        assert_eq!(
            AnomalyCategory::NewDistributor.to_string(),
            "new distributor registered"
        );
    }

    #[test]
    fn anomaly_severity_mapping() {
        assert_eq!(AnomalyCategory::NewDistributor.severity(), Severity::Info);
        assert_eq!(
            AnomalyCategory::AlreadyCompromised.severity(),
            Severity::Medium
        );
        assert_eq!(AnomalyCategory::DuplicateSale.severity(), Severity::Critical);
        assert_eq!(AnomalyCategory::Diversion.severity(), Severity::High);
    }

    #[test]
    fn new_unit_starts_inactive_with_empty_history() {
        let unit = Unit::new("MED-1", "CTN-1", "Amoxicillin 500mg", "BATCH-1");
        assert_eq!(unit.status, UnitStatus::Inactive);
        assert!(unit.history.is_empty());
        assert!(unit.destination.is_none());
    }

    #[test]
    fn last_valid_event_skips_alerts() {
        let mut unit = Unit::new("MED-1", "CTN-1", "Amoxicillin 500mg", "BATCH-1");
        unit.history
            .push(sample_event(ScanResult::Valid, EventKind::Activation));
        unit.history
            .push(sample_event(ScanResult::Alert, EventKind::Flagged));

        let last_valid = unit.last_valid_event().unwrap();
        assert_eq!(last_valid.result, ScanResult::Valid);
        assert_eq!(last_valid.kind, EventKind::Activation);

        let last = unit.last_event().unwrap();
        assert_eq!(last.result, ScanResult::Alert);
    }

    #[test]
    fn last_valid_event_empty_history() {
        let unit = Unit::new("MED-1", "CTN-1", "Amoxicillin 500mg", "BATCH-1");
        assert!(unit.last_valid_event().is_none());
        assert!(unit.last_event().is_none());
    }

    #[test]
    fn alert_new_derives_severity_and_active_status() {
        let original = sample_event(ScanResult::Valid, EventKind::Activation);
        let trigger = sample_event(ScanResult::Alert, EventKind::Flagged);
        let alert = Alert::new(
            "Amoxicillin 500mg",
            "MED-1",
            AnomalyCategory::Diversion,
            original,
            trigger,
        );
        assert_eq!(alert.status, AlertStatus::Active);
        assert_eq!(alert.severity, Severity::High);
        assert!(alert.resolved_at.is_none());
        assert!(!alert.id.is_empty());
    }

    #[test]
    fn alert_display() {
        let original = sample_event(ScanResult::Valid, EventKind::Activation);
        let trigger = sample_event(ScanResult::Alert, EventKind::Flagged);
        let alert = Alert::new(
            "Amoxicillin 500mg",
            "MED-1",
            AnomalyCategory::DuplicateSale,
            original,
            trigger,
        );
        let display = alert.to_string();
        assert!(display.contains("duplicate sale attempt"));
        assert!(display.contains("Critical"));
        assert!(display.contains("MED-1"));
    }

    #[test]
    fn unit_serialize_roundtrip() {
        let mut unit = Unit::new("MED-1", "CTN-1", "Amoxicillin 500mg", "BATCH-1");
        unit.history
            .push(sample_event(ScanResult::Valid, EventKind::Receipt));
        let json = serde_json::to_string(&unit).unwrap();
        let back: Unit = serde_json::from_str(&json).unwrap();
        assert_eq!(back.unit_id, unit.unit_id);
        assert_eq!(back.status, unit.status);
        assert_eq!(back.history.len(), 1);
    }

    #[test]
    fn credential_display_hides_passphrase() {
        let cred = Credential {
            entity_id: "LIC-abc123".to_owned(),
            name: "Green Cross".to_owned(),
            location: "Springfield".to_owned(),
            role: ActorRole::Pharmacy,
            passphrase: Some("secret99".to_owned()),
            issued_at: SystemTime::now(),
        };
        let display = cred.to_string();
        assert!(display.contains("LIC-abc123"));
        assert!(display.contains("Green Cross"));
        assert!(!display.contains("secret99"));
    }
}
