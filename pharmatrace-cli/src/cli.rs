//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Pharmatrace -- supply-chain integrity engine.
///
/// Use `pharmatrace <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "pharmatrace", version, about, long_about = None)]
pub struct Cli {
    /// Path to the pharmatrace.toml configuration file.
    #[arg(short, long, default_value = "pharmatrace.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Log format (json, pretty).
    #[arg(long, global = true, default_value = "pretty")]
    pub log_format: String,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration.
    Config(ConfigArgs),

    /// Generate a carton batch with unit identifiers and labels.
    Batch(BatchArgs),

    /// Run the full supply-chain scenario against in-memory stores.
    Simulate(SimulateArgs),

    /// Check whether an identifier is well-formed.
    Verify(VerifyArgs),
}

// ---- config ----

/// Manage pharmatrace configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, ledger, scan, registry, alerts).
        #[arg(long)]
        section: Option<String>,
    },
}

// ---- batch ----

/// Generate a carton of units with fresh identifiers.
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Product name printed on the manifest.
    #[arg(long, default_value = "Amoxicillin 500mg")]
    pub product: String,

    /// Number of units in the carton.
    #[arg(long, default_value_t = 5)]
    pub units: usize,

    /// Write manifest and label files into this directory.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

// ---- simulate ----

/// Run the end-to-end supply-chain scenario.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Number of units in the simulated carton.
    #[arg(long, default_value_t = 3)]
    pub units: usize,
}

// ---- verify ----

/// Check an identifier against the expected format.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Identifier to check (e.g. MED-XXXX-XXXX-XXXX-XXXX).
    pub identifier: String,
}
