//! `pharmatrace verify` -- identifier format check.
//!
//! Screens operator input against the expected `PREFIX-XXXX-XXXX-XXXX-XXXX`
//! shape. Only a syntax check: whether the identifier exists in a ledger
//! is decided by the store lookup during scan processing.

use std::io::Write;

use colored::Colorize;
use serde::Serialize;

use pharmatrace_core::id;

use crate::cli::VerifyArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Result payload for `verify`.
#[derive(Serialize)]
struct VerifyReport {
    identifier: String,
    well_formed: bool,
}

impl Render for VerifyReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        if self.well_formed {
            writeln!(w, "{} {} is well-formed", "✓".green().bold(), self.identifier)
        } else {
            writeln!(
                w,
                "{} {} does not match PREFIX-XXXX-XXXX-XXXX-XXXX",
                "✗".red().bold(),
                self.identifier
            )
        }
    }
}

/// Run the `verify` subcommand.
///
/// Exits non-zero for malformed identifiers so the check can be scripted.
pub fn run(args: &VerifyArgs, writer: &OutputWriter) -> Result<(), CliError> {
    let well_formed = id::is_well_formed(&args.identifier);
    writer.render(&VerifyReport {
        identifier: args.identifier.clone(),
        well_formed,
    })?;

    if well_formed {
        Ok(())
    } else {
        Err(CliError::MalformedIdentifier(args.identifier.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;

    #[test]
    fn generated_identifier_passes() {
        let writer = OutputWriter::new(OutputFormat::Text);
        let args = VerifyArgs {
            identifier: id::generate(id::UNIT_PREFIX),
        };
        assert!(run(&args, &writer).is_ok());
    }

    #[test]
    fn malformed_identifier_maps_to_exit_code_4() {
        let writer = OutputWriter::new(OutputFormat::Text);
        let args = VerifyArgs {
            identifier: "MED-1".to_owned(),
        };
        let err = run(&args, &writer).expect_err("should reject malformed identifier");
        assert_eq!(err.exit_code(), 4);
    }
}
