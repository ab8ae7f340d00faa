//! 생애주기 상태 기계 — 전이 테이블과 히스토리 폴드
//!
//! 유닛의 합법적 전이는 다음 테이블이 전부입니다.
//!
//! | From       | Transition          | To         | Guard                    |
//! |------------|---------------------|------------|--------------------------|
//! | inactive   | Activate (유통사)   | in-transit | 카톤 전체가 inactive     |
//! | in-transit | Receive (약국)      | stocked    | 지정 약국과 일치         |
//! | stocked    | Dispense (약국)     | sold       | —                        |
//! | any        | 이상 징후 플래그    | counterfeit| —                        |
//!
//! 가드 실패는 두 종류로 나뉩니다. 복제/도난/우회의 증거가 되는
//! 실패는 [`TransitionViolation::Anomaly`]로 에스컬레이션되고,
//! 단순 순서 오류는 [`TransitionViolation::Sequence`]로 거부만 됩니다.
//! 이 비대칭을 합치면 거짓 양성 위조 알림이 생기므로 유지해야 합니다.

use std::fmt;

use pharmatrace_core::types::{
    AnomalyCategory, Destination, EventKind, ScanEvent, ScanResult, UnitStatus,
};

/// 유닛에 적용할 수 있는 전이
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitTransition {
    /// 카톤 활성화 — 목적지를 지정하며 inactive -> in-transit
    Activate {
        /// 지정 목적지
        destination: Destination,
    },
    /// 약국 입고 — in-transit -> stocked
    Receive {
        /// 입고를 수행하는 약국 이름
        pharmacy: String,
    },
    /// 판매/불출 — stocked -> sold
    Dispense,
}

impl UnitTransition {
    /// 전이가 성공했을 때 히스토리에 기록될 이벤트 종류를 반환합니다.
    pub fn event_kind(&self) -> EventKind {
        match self {
            Self::Activate { .. } => EventKind::Activation,
            Self::Receive { .. } => EventKind::Receipt,
            Self::Dispense => EventKind::Dispense,
        }
    }
}

impl fmt::Display for UnitTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Activate { destination } => write!(f, "activate -> {destination}"),
            Self::Receive { pharmacy } => write!(f, "receive @ {pharmacy}"),
            Self::Dispense => write!(f, "dispense"),
        }
    }
}

/// 가드 실패
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionViolation {
    /// 복제/도난/우회 증거 — 알림 생성과 counterfeit 동결로 이어짐
    Anomaly(AnomalyCategory),
    /// 순서 오류 — 거부만 하고 에스컬레이션하지 않음
    Sequence(String),
}

impl fmt::Display for TransitionViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anomaly(category) => write!(f, "anomaly: {category}"),
            Self::Sequence(reason) => write!(f, "rejected: {reason}"),
        }
    }
}

/// 현재 상태에 대해 전이를 평가합니다.
///
/// 성공 시 다음 상태를 반환합니다. 가드 검사 순서는 원본 프로토콜을
/// 따릅니다: 비활성 도난 검사 -> 목적지 검사 -> 중복 처리 검사.
pub fn evaluate(
    status: UnitStatus,
    destination: Option<&Destination>,
    transition: &UnitTransition,
) -> Result<UnitStatus, TransitionViolation> {
    // counterfeit는 흡수 상태 — 어떤 전이든 그 자체가 이상 징후
    if status == UnitStatus::Counterfeit {
        return Err(TransitionViolation::Anomaly(
            AnomalyCategory::AlreadyCompromised,
        ));
    }

    match transition {
        UnitTransition::Activate { .. } => match status {
            UnitStatus::Inactive => Ok(UnitStatus::InTransit),
            _ => Err(TransitionViolation::Anomaly(
                AnomalyCategory::DuplicateActivation,
            )),
        },

        UnitTransition::Receive { pharmacy } => {
            if status == UnitStatus::Inactive {
                return Err(TransitionViolation::Anomaly(AnomalyCategory::InactiveTheft));
            }
            let assigned = destination.map(|d| d.pharmacy.as_str());
            if assigned != Some(pharmacy.as_str()) {
                return Err(TransitionViolation::Anomaly(AnomalyCategory::Diversion));
            }
            match status {
                UnitStatus::InTransit => Ok(UnitStatus::Stocked),
                UnitStatus::Stocked | UnitStatus::Sold => Err(TransitionViolation::Sequence(
                    "already processed".to_owned(),
                )),
                // Inactive/Counterfeit는 위에서 처리됨
                _ => Err(TransitionViolation::Sequence(format!(
                    "cannot receive unit in status {status}"
                ))),
            }
        }

        UnitTransition::Dispense => match status {
            UnitStatus::Sold => Err(TransitionViolation::Anomaly(AnomalyCategory::DuplicateSale)),
            UnitStatus::Stocked => Ok(UnitStatus::Sold),
            _ => Err(TransitionViolation::Sequence(
                "not in authenticated stock".to_owned(),
            )),
        },
    }
}

/// 히스토리를 폴드하여 상태를 유도합니다.
///
/// 불변식: 모든 유닛에서 `unit.status == fold(&unit.history)`.
/// 상태 갱신과 히스토리 추가가 하나의 원자적 쓰기이므로
/// 이 등식은 어떤 시점에 읽어도 성립합니다.
pub fn fold(history: &[ScanEvent]) -> UnitStatus {
    let mut status = UnitStatus::Inactive;
    for event in history {
        status = match (event.result, event.kind) {
            (ScanResult::Alert, _) => UnitStatus::Counterfeit,
            (ScanResult::Valid, EventKind::Activation) => UnitStatus::InTransit,
            (ScanResult::Valid, EventKind::Receipt) => UnitStatus::Stocked,
            (ScanResult::Valid, EventKind::Dispense) => UnitStatus::Sold,
            // invalid 이벤트와 합성 이벤트는 상태를 바꾸지 않음
            _ => status,
        };
    }
    status
}
