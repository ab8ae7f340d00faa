//! 이벤트 시스템 — 모듈 간 통신의 기본 단위
//!
//! 디코드 루프에서 스캔 세션으로, 세션에서 다운스트림 관찰자로
//! 전달되는 메시지를 정의합니다. [`EventMetadata`]는 모든 이벤트에
//! 공통으로 포함되는 메타데이터이며, [`Event`] trait은 모든 이벤트
//! 타입이 구현해야 하는 인터페이스입니다.

use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::types::Alert;

// --- 모듈명 상수 ---

/// 원장 모듈명
pub const MODULE_LEDGER: &str = "ledger";
/// 스캔 엔진 모듈명
pub const MODULE_SCAN_ENGINE: &str = "scan-engine";
/// 자격증명 레지스트리 모듈명
pub const MODULE_REGISTRY: &str = "registry";
/// 알림 저장소 모듈명
pub const MODULE_ALERT_STORE: &str = "alert-store";

// --- 이벤트 타입 상수 ---

/// 스캔 제출 이벤트 타입
pub const EVENT_TYPE_SUBMISSION: &str = "submission";
/// 처리 결과 피드백 이벤트 타입
pub const EVENT_TYPE_FEEDBACK: &str = "feedback";
/// 알림 이벤트 타입
pub const EVENT_TYPE_ALERT: &str = "alert";

/// 이벤트 메타데이터 — 모든 이벤트에 공통으로 포함되는 추적 정보
///
/// 각 이벤트의 발생 시각, 생성 모듈, 추적 ID를 담고 있어
/// 하나의 스캔이 디코드 → 처리 → 알림으로 이어지는 흐름을
/// 연결해서 볼 수 있습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    /// 이벤트 발생 시각
    pub timestamp: SystemTime,
    /// 이벤트를 생성한 모듈명 (예: "scan-engine")
    pub source_module: String,
    /// 추적 ID — 같은 흐름의 이벤트를 연결합니다
    pub trace_id: String,
}

impl EventMetadata {
    /// 기존 trace_id를 사용하여 새 메타데이터를 생성합니다.
    pub fn new(source_module: impl Into<String>, trace_id: impl Into<String>) -> Self {
        Self {
            timestamp: SystemTime::now(),
            source_module: source_module.into(),
            trace_id: trace_id.into(),
        }
    }

    /// 새로운 UUID v4 trace_id를 생성하여 메타데이터를 만듭니다.
    ///
    /// 새로운 스캔 흐름의 시작점에서 사용합니다.
    pub fn with_new_trace(source_module: impl Into<String>) -> Self {
        Self {
            timestamp: SystemTime::now(),
            source_module: source_module.into(),
            trace_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

impl fmt::Display for EventMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] source={} trace={}",
            unix_timestamp_str(self.timestamp),
            self.source_module,
            self.trace_id,
        )
    }
}

/// 모든 이벤트가 구현해야 하는 기본 trait
///
/// `Send + Sync + 'static` 바운드로 `tokio::mpsc` 채널을 통한
/// 안전한 전송을 보장합니다.
pub trait Event: Send + Sync + 'static {
    /// 이벤트 고유 ID (UUID v4)
    fn event_id(&self) -> &str;

    /// 이벤트 메타데이터 (timestamp, source_module, trace_id)
    fn metadata(&self) -> &EventMetadata;

    /// 이벤트 타입명 (로깅 및 라우팅에 사용)
    fn event_type(&self) -> &str;
}

/// 스캔 제출 이벤트
///
/// 디코드 루프가 카메라 프레임에서 새로운 식별자를 읽어냈을 때
/// 생성되어 스캔 세션으로 전달됩니다.
#[derive(Debug, Clone)]
pub struct SubmissionEvent {
    /// 이벤트 고유 ID
    pub id: String,
    /// 이벤트 메타데이터
    pub metadata: EventMetadata,
    /// 디코드된 식별자 문자열 (검증 전)
    pub identifier: String,
}

impl SubmissionEvent {
    /// 새로운 trace를 시작하는 제출 이벤트를 생성합니다.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            metadata: EventMetadata::with_new_trace(MODULE_SCAN_ENGINE),
            identifier: identifier.into(),
        }
    }

    /// 기존 trace에 연결된 제출 이벤트를 생성합니다.
    pub fn with_trace(identifier: impl Into<String>, trace_id: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            metadata: EventMetadata::new(MODULE_SCAN_ENGINE, trace_id),
            identifier: identifier.into(),
        }
    }
}

impl Event for SubmissionEvent {
    fn event_id(&self) -> &str {
        &self.id
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    fn event_type(&self) -> &str {
        EVENT_TYPE_SUBMISSION
    }
}

impl fmt::Display for SubmissionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SubmissionEvent[{}] identifier={}",
            &self.id[..8.min(self.id.len())],
            self.identifier,
        )
    }
}

/// 처리 결과 피드백 이벤트
///
/// 스캔 세션이 제출 하나를 처리한 뒤 운영자 화면 등
/// 다운스트림으로 내보내는 요약입니다.
#[derive(Debug, Clone)]
pub struct FeedbackEvent {
    /// 이벤트 고유 ID
    pub id: String,
    /// 이벤트 메타데이터
    pub metadata: EventMetadata,
    /// 처리한 식별자
    pub identifier: String,
    /// 수리 여부
    pub accepted: bool,
    /// 사람이 읽을 수 있는 결과 설명
    pub message: String,
}

impl FeedbackEvent {
    /// 기존 trace에 연결된 피드백 이벤트를 생성합니다.
    pub fn with_trace(
        identifier: impl Into<String>,
        accepted: bool,
        message: impl Into<String>,
        trace_id: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            metadata: EventMetadata::new(MODULE_SCAN_ENGINE, trace_id),
            identifier: identifier.into(),
            accepted,
            message: message.into(),
        }
    }
}

impl Event for FeedbackEvent {
    fn event_id(&self) -> &str {
        &self.id
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    fn event_type(&self) -> &str {
        EVENT_TYPE_FEEDBACK
    }
}

impl fmt::Display for FeedbackEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.accepted { "OK" } else { "REJECTED" };
        write!(
            f,
            "FeedbackEvent[{}] identifier={} status={} {}",
            &self.id[..8.min(self.id.len())],
            self.identifier,
            status,
            self.message,
        )
    }
}

/// 알림 발생 이벤트
///
/// 이상 징후가 알림으로 기록되었을 때 관찰자 채널로 전달됩니다.
/// 알림 자체는 알림 저장소가 소유하며, 이 이벤트는 통지 전용입니다.
#[derive(Debug, Clone)]
pub struct AlertEvent {
    /// 이벤트 고유 ID
    pub id: String,
    /// 이벤트 메타데이터
    pub metadata: EventMetadata,
    /// 발생한 알림
    pub alert: Alert,
}

impl AlertEvent {
    /// 새로운 trace를 시작하는 알림 이벤트를 생성합니다.
    pub fn new(alert: Alert) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            metadata: EventMetadata::with_new_trace(MODULE_ALERT_STORE),
            alert,
        }
    }

    /// 기존 trace에 연결된 알림 이벤트를 생성합니다.
    pub fn with_trace(alert: Alert, trace_id: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            metadata: EventMetadata::new(MODULE_ALERT_STORE, trace_id),
            alert,
        }
    }
}

impl Event for AlertEvent {
    fn event_id(&self) -> &str {
        &self.id
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    fn event_type(&self) -> &str {
        EVENT_TYPE_ALERT
    }
}

impl fmt::Display for AlertEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AlertEvent[{}] category={} severity={} subject={}",
            &self.id[..8.min(self.id.len())],
            self.alert.category,
            self.alert.severity,
            self.alert.subject_id,
        )
    }
}

/// SystemTime을 사람이 읽을 수 있는 형태로 변환합니다.
fn unix_timestamp_str(time: SystemTime) -> String {
    match time.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(duration) => {
            let secs = duration.as_secs();
            format!("{secs}")
        }
        Err(_) => "unknown".to_owned(),
    }
}
