//! Logging initialization for pharmatrace-cli.
//!
//! Configures `tracing-subscriber` from the CLI flags. Supports JSON
//! structured logging and human-readable pretty format.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::CliError;

/// Initialize the global tracing subscriber.
///
/// Must be called exactly once, before any tracing macros are used.
///
/// # Arguments
///
/// * `log_level` - filter directive (trace, debug, info, warn, error)
/// * `log_format` - `"json"` for machine-parseable lines, `"pretty"` for
///   human-readable colored output
pub fn init_tracing(log_level: &str, log_format: &str) -> Result<(), CliError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    match log_format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()
                .map_err(|e| {
                    CliError::Config(format!("failed to initialize JSON tracing subscriber: {e}"))
                })?;
        }
        "pretty" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()
                .map_err(|e| {
                    CliError::Config(format!(
                        "failed to initialize pretty tracing subscriber: {e}"
                    ))
                })?;
        }
        other => {
            return Err(CliError::Config(format!(
                "unknown log format '{other}', expected 'json' or 'pretty'"
            )));
        }
    }

    Ok(())
}
