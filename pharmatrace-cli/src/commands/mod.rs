//! Subcommand implementations.

pub mod batch;
pub mod config;
pub mod simulate;
pub mod verify;

use std::path::Path;

use pharmatrace_core::PharmatraceConfig;

use crate::error::CliError;

/// Load configuration from the given path, falling back to defaults
/// (plus env overrides) when the file does not exist.
///
/// Commands that only read the engine configuration should not fail
/// merely because no `pharmatrace.toml` has been written yet.
pub async fn load_config(path: &Path) -> Result<PharmatraceConfig, CliError> {
    if path.exists() {
        Ok(PharmatraceConfig::load(path).await?)
    } else {
        tracing::debug!(path = %path.display(), "config file missing, using defaults");
        let mut config = PharmatraceConfig::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}
