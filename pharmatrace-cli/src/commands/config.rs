//! `pharmatrace config` -- validate and display configuration.

use std::io::Write;
use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use pharmatrace_core::PharmatraceConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Result payload for `config validate`.
#[derive(Serialize)]
struct ValidateReport {
    path: String,
    valid: bool,
}

impl Render for ValidateReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(
            w,
            "{} configuration valid: {}",
            "✓".green().bold(),
            self.path
        )
    }
}

/// Result payload for `config show`.
#[derive(Serialize)]
struct ShowReport {
    section: Option<String>,
    value: toml::Value,
}

impl Render for ShowReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        let rendered = toml::to_string_pretty(&self.value)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        if let Some(section) = &self.section {
            writeln!(w, "{}", format!("[{section}]").bold())?;
        }
        write!(w, "{rendered}")
    }
}

/// Run the `config` subcommand.
pub async fn run(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => {
            // Deliberately load from the file itself: a missing file is an
            // error here, unlike for commands that tolerate defaults.
            PharmatraceConfig::load(config_path)
                .await
                .map_err(|e| CliError::Config(e.to_string()))?;
            writer.render(&ValidateReport {
                path: config_path.display().to_string(),
                valid: true,
            })
        }
        ConfigAction::Show { section } => {
            let config = super::load_config(config_path).await?;
            let value = toml::Value::try_from(&config)
                .map_err(|e| CliError::Config(e.to_string()))?;

            let value = match &section {
                Some(name) => value
                    .get(name)
                    .cloned()
                    .ok_or_else(|| {
                        CliError::Config(format!(
                            "unknown config section '{name}' (expected one of: general, ledger, scan, registry, alerts)"
                        ))
                    })?,
                None => value,
            };

            writer.render(&ShowReport { section, value })
        }
    }
}
