#![doc = include_str!("../README.md")]

pub mod boundary;
pub mod config;
pub mod error;
pub mod event;
pub mod id;
pub mod metrics;
pub mod store;
pub mod types;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{ConfigError, PharmatraceError, StoreError};

// 설정
pub use config::PharmatraceConfig;

// 이벤트
pub use event::{AlertEvent, Event, EventMetadata, FeedbackEvent, SubmissionEvent};

// 영속성/협력자 trait
pub use boundary::{FrameDecoder, LabelEncoder};
pub use store::{AlertStore, CredentialStore, UnitFilter, UnitStore};

// 도메인 타입
pub use types::{
    ActorRole, Alert, AlertStatus, AnomalyCategory, Credential, Destination, EventKind,
    ScanEvent, ScanResult, Severity, Unit, UnitStatus,
};
