//! CLI-specific error types and exit code mapping

use pharmatrace_core::error::PharmatraceError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// Identifier failed the format check (`verify` command).
    #[error("malformed identifier: {0}")]
    MalformedIdentifier(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from pharmatrace-core.
    #[error("{0}")]
    Core(#[from] PharmatraceError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                          |
    /// |------|----------------------------------|
    /// | 0    | Success                          |
    /// | 1    | General / command error          |
    /// | 2    | Configuration error              |
    /// | 4    | Identifier failed format check   |
    /// | 10   | IO error                         |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::MalformedIdentifier(_) => 4,
            Self::Io(_) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) => 1,
        }
    }
}

impl From<pharmatrace_ledger::LedgerError> for CliError {
    fn from(e: pharmatrace_ledger::LedgerError) -> Self {
        Self::Command(e.to_string())
    }
}

impl From<pharmatrace_registry::RegistryError> for CliError {
    fn from(e: pharmatrace_registry::RegistryError) -> Self {
        Self::Command(e.to_string())
    }
}

impl From<pharmatrace_alert_store::AlertLogError> for CliError {
    fn from(e: pharmatrace_alert_store::AlertLogError) -> Self {
        Self::Command(e.to_string())
    }
}
