//! 스캔 요청/결과 타입
//!
//! 행위자와 의도한 동작은 암묵적 세션 상태가 아니라 요청에
//! 명시적으로 담겨 프로세서에 전달됩니다.

use std::fmt;

use serde::{Deserialize, Serialize};

use pharmatrace_core::types::{ActorRole, Destination, Unit};

/// 요청 컨텍스트 — 스캔을 제출하는 행위자
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorContext {
    /// 행위자 역할
    pub role: ActorRole,
    /// 행위자 이름 (자격증명의 기관 이름)
    pub name: String,
    /// 행위자 위치
    pub location: String,
}

impl ActorContext {
    /// 새 컨텍스트를 생성합니다.
    pub fn new(role: ActorRole, name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            role,
            name: name.into(),
            location: location.into(),
        }
    }
}

impl fmt::Display for ActorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} @ {})", self.name, self.role, self.location)
    }
}

/// 의도한 동작 — 역할별 컨텍스트를 담습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanAction {
    /// 유통사 카톤 활성화 — 식별자는 카톤 ID로 해석됩니다
    ActivateCarton {
        /// 선택한 목적지 약국
        destination: Destination,
    },
    /// 약국 입고 — 식별자는 유닛 ID로 해석됩니다
    ReceiveStock,
    /// 약국 판매/불출
    Dispense,
}

impl fmt::Display for ScanAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ActivateCarton { destination } => write!(f, "carton activation -> {destination}"),
            Self::ReceiveStock => write!(f, "stock receipt"),
            Self::Dispense => write!(f, "dispense"),
        }
    }
}

/// 스캔 요청 — 프로세서 단일 진입점의 입력
#[derive(Debug, Clone)]
pub struct ScanRequest {
    /// 스캔된 식별자 (디코더가 전달한 그대로)
    pub identifier: String,
    /// 행위자 컨텍스트
    pub actor: ActorContext,
    /// 의도한 동작
    pub action: ScanAction,
}

impl ScanRequest {
    /// 새 요청을 생성합니다.
    pub fn new(identifier: impl Into<String>, actor: ActorContext, action: ScanAction) -> Self {
        Self {
            identifier: identifier.into(),
            actor,
            action,
        }
    }
}

/// 수리된 스캔의 결과
#[derive(Debug, Clone)]
pub enum ScanOutcome {
    /// 카톤이 원자적으로 활성화됨
    CartonActivated {
        /// 카톤 ID
        carton_id: String,
        /// 전이된 유닛 수
        units: usize,
        /// 지정된 목적지
        destination: Destination,
    },
    /// 유닛이 입고됨
    Stocked {
        /// 갱신된 유닛
        unit: Unit,
    },
    /// 유닛이 판매됨
    Dispensed {
        /// 갱신된 유닛
        unit: Unit,
    },
    /// 반복 스캔으로 무시됨 — 이벤트도 알림도 기록되지 않음
    Suppressed,
}

impl fmt::Display for ScanOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CartonActivated {
                carton_id,
                units,
                destination,
            } => write!(f, "carton {carton_id} activated ({units} units) -> {destination}"),
            Self::Stocked { unit } => write!(f, "unit {} stocked", unit.unit_id),
            Self::Dispensed { unit } => write!(f, "unit {} dispensed", unit.unit_id),
            Self::Suppressed => write!(f, "repeat scan suppressed"),
        }
    }
}
