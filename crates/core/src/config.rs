//! 설정 관리 — pharmatrace.toml 파싱 및 런타임 설정
//!
//! [`PharmatraceConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`PHARMATRACE_SCAN_REPEAT_WINDOW_MS=2000` 형식)
//! 3. 설정 파일 (`pharmatrace.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), pharmatrace_core::error::PharmatraceError> {
//! use pharmatrace_core::config::PharmatraceConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = PharmatraceConfig::load("pharmatrace.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = PharmatraceConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, PharmatraceError};

/// Pharmatrace 통합 설정
///
/// `pharmatrace.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 모듈은 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PharmatraceConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 원장 설정
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// 스캔 엔진 설정
    #[serde(default)]
    pub scan: ScanConfig,
    /// 자격증명 레지스트리 설정
    #[serde(default)]
    pub registry: RegistryConfig,
    /// 알림 저장소 설정
    #[serde(default)]
    pub alerts: AlertsConfig,
}

impl PharmatraceConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, PharmatraceError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, PharmatraceError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PharmatraceError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                PharmatraceError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, PharmatraceError> {
        toml::from_str(toml_str).map_err(|e| {
            PharmatraceError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `PHARMATRACE_{SECTION}_{FIELD}`
    /// 예: `PHARMATRACE_GENERAL_LOG_LEVEL=debug`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "PHARMATRACE_GENERAL_LOG_LEVEL");
        override_string(
            &mut self.general.log_format,
            "PHARMATRACE_GENERAL_LOG_FORMAT",
        );
        override_string(&mut self.general.data_dir, "PHARMATRACE_GENERAL_DATA_DIR");

        // Ledger
        override_usize(
            &mut self.ledger.max_units_per_carton,
            "PHARMATRACE_LEDGER_MAX_UNITS_PER_CARTON",
        );

        // Scan
        override_u64(
            &mut self.scan.repeat_window_ms,
            "PHARMATRACE_SCAN_REPEAT_WINDOW_MS",
        );
        override_u64(
            &mut self.scan.decode_interval_ms,
            "PHARMATRACE_SCAN_DECODE_INTERVAL_MS",
        );
        override_usize(
            &mut self.scan.session_channel_capacity,
            "PHARMATRACE_SCAN_SESSION_CHANNEL_CAPACITY",
        );

        // Registry
        override_usize(
            &mut self.registry.passphrase_length,
            "PHARMATRACE_REGISTRY_PASSPHRASE_LENGTH",
        );

        // Alerts
        override_usize(
            &mut self.alerts.default_list_limit,
            "PHARMATRACE_ALERTS_DEFAULT_LIST_LIMIT",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), PharmatraceError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.ledger.max_units_per_carton == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ledger.max_units_per_carton".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        if self.scan.decode_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scan.decode_interval_ms".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        if self.scan.session_channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scan.session_channel_capacity".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        if self.registry.passphrase_length < 6 {
            return Err(ConfigError::InvalidValue {
                field: "registry.passphrase_length".to_owned(),
                reason: "must be at least 6".to_owned(),
            }
            .into());
        }

        if self.alerts.default_list_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "alerts.default_list_limit".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    /// 데이터 디렉토리 (매니페스트/라벨 출력 기본 경로)
    pub data_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
            data_dir: "/var/lib/pharmatrace".to_owned(),
        }
    }
}

/// 원장 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// 카톤당 최대 유닛 수 (배치 생성 상한)
    pub max_units_per_carton: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_units_per_carton: 100,
        }
    }
}

/// 스캔 엔진 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// 동일 식별자 반복 스캔 억제 윈도우 (밀리초, 0이면 비활성)
    pub repeat_window_ms: u64,
    /// 프레임 디코드 주기 (밀리초)
    pub decode_interval_ms: u64,
    /// 스캔 세션 채널 용량
    pub session_channel_capacity: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            repeat_window_ms: 2_000,
            decode_interval_ms: 200,
            session_channel_capacity: 64,
        }
    }
}

/// 자격증명 레지스트리 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// 발급 패스프레이즈 길이
    pub passphrase_length: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            passphrase_length: 8,
        }
    }
}

/// 알림 저장소 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    /// 목록 조회 기본 상한
    pub default_list_limit: usize,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            default_list_limit: 50,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
