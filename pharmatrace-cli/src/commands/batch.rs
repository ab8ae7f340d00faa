//! `pharmatrace batch` -- generate a carton batch with printable labels.
//!
//! Creates a carton of units with fresh identifiers and optionally
//! writes a manifest plus one label file per identifier. Label encoding
//! goes through the [`LabelEncoder`] boundary trait; this binary ships
//! a plain-text stand-in where a deployment would plug a QR image
//! encoder.

use std::io::Write;
use std::path::Path;

use bytes::Bytes;
use colored::Colorize;
use serde::Serialize;

use pharmatrace_core::PharmatraceConfig;
use pharmatrace_core::boundary::LabelEncoder;
use pharmatrace_core::error::PharmatraceError;
use pharmatrace_ledger::{CartonManifest, ItemLedger, MemoryUnitStore};

use crate::cli::BatchArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Plain-text label encoder.
///
/// Stand-in for the external QR encoder; produces a text block
/// containing the identifier so the file layout and manifest flow can
/// be exercised end to end.
struct TextLabelEncoder;

impl LabelEncoder for TextLabelEncoder {
    fn format_name(&self) -> &str {
        "text"
    }

    fn encode(&self, identifier: &str) -> Result<Bytes, PharmatraceError> {
        Ok(Bytes::from(format!("PHARMATRACE LABEL\n{identifier}\n")))
    }
}

/// Result payload for `batch`.
#[derive(Serialize)]
struct BatchReport {
    #[serde(flatten)]
    manifest: CartonManifest,
    labels_dir: Option<String>,
}

impl Render for BatchReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "{}", "Batch generated".green().bold())?;
        writeln!(w, "  Product:       {}", self.manifest.product_name)?;
        writeln!(w, "  Batch ID:      {}", self.manifest.batch_id)?;
        writeln!(
            w,
            "  Master Carton: {}",
            self.manifest.carton_id.bold()
        )?;
        writeln!(w, "  Units:         {}", self.manifest.unit_ids.len())?;
        for unit_id in &self.manifest.unit_ids {
            writeln!(w, "    + {unit_id}")?;
        }
        if let Some(dir) = &self.labels_dir {
            writeln!(w, "  Labels:        {dir}")?;
        }
        Ok(())
    }
}

/// Run the `batch` subcommand.
pub async fn run(
    args: BatchArgs,
    config: &PharmatraceConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let ledger = ItemLedger::new(MemoryUnitStore::new(), &config.ledger);
    let manifest = ledger.create_carton(&args.product, args.units).await?;

    let labels_dir = match &args.out {
        Some(dir) => {
            write_labels(dir, &manifest).await?;
            Some(dir.display().to_string())
        }
        None => None,
    };

    writer.render(&BatchReport {
        manifest,
        labels_dir,
    })
}

/// Write the manifest and one label file per identifier.
async fn write_labels(dir: &Path, manifest: &CartonManifest) -> Result<(), CliError> {
    tokio::fs::create_dir_all(dir).await?;
    let encoder = TextLabelEncoder;

    let carton_label = encoder.encode(&manifest.carton_id)?;
    tokio::fs::write(
        dir.join(format!("MASTER_CARTON_{}.txt", manifest.carton_id)),
        &carton_label,
    )
    .await?;

    for unit_id in &manifest.unit_ids {
        let label = encoder.encode(unit_id)?;
        tokio::fs::write(dir.join(format!("UNIT_{unit_id}.txt")), &label).await?;
    }

    let text = format!(
        "Batch ID: {}\nMaster Carton: {}\nProduct: {}\nUnits: {}\n",
        manifest.batch_id,
        manifest.carton_id,
        manifest.product_name,
        manifest.unit_ids.len(),
    );
    tokio::fs::write(dir.join("manifest.txt"), text).await?;

    Ok(())
}
