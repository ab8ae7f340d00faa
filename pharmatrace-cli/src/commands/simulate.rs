//! `pharmatrace simulate` -- run the reference supply-chain scenario.
//!
//! Exercises every engine path against in-memory stores: credential
//! issuance and authentication, batch creation, carton activation,
//! stock receipt, dispensing, a diversion attempt, a duplicate-sale
//! attempt, and credential revocation. Each scanning session gets its
//! own processor (the repeat-suppression cache is session-local);
//! the stores are shared. Prints each step and the alert trail.

use std::io::Write;

use colored::Colorize;
use serde::Serialize;

use pharmatrace_alert_store::{AlertLog, MemoryAlertStore};
use pharmatrace_core::PharmatraceConfig;
use pharmatrace_core::types::{ActorRole, AlertStatus, Destination};
use pharmatrace_ledger::{ItemLedger, MemoryUnitStore};
use pharmatrace_registry::{CredentialRegistry, MemoryCredentialStore, RegistryError};
use pharmatrace_scan_engine::{
    ActorContext, ScanAction, ScanEngineError, ScanOutcome, ScanProcessor, ScanRequest,
};

use crate::cli::SimulateArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// One executed simulation step.
#[derive(Serialize)]
struct Step {
    action: String,
    detail: String,
    ok: bool,
}

/// Alert summary row.
#[derive(Serialize)]
struct AlertRow {
    category: String,
    severity: String,
    subject: String,
    status: String,
}

/// Full simulation report.
#[derive(Serialize)]
struct SimulationReport {
    steps: Vec<Step>,
    alerts: Vec<AlertRow>,
}

impl Render for SimulationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "{}", "Supply-chain simulation".bold())?;
        for step in &self.steps {
            let mark = if step.ok {
                "✓".green().bold()
            } else {
                "✗".red().bold()
            };
            writeln!(w, "  {mark} {:<24} {}", step.action, step.detail)?;
        }

        writeln!(w)?;
        if self.alerts.is_empty() {
            writeln!(w, "{}", "No alerts raised".green())?;
        } else {
            writeln!(w, "{}", format!("Alerts ({}):", self.alerts.len()).bold())?;
            for alert in &self.alerts {
                writeln!(
                    w,
                    "  [{}] {} — {} ({})",
                    alert.severity.red().bold(),
                    alert.category,
                    alert.subject,
                    alert.status,
                )?;
            }
        }
        Ok(())
    }
}

/// Run the `simulate` subcommand.
pub async fn run(
    args: SimulateArgs,
    config: &PharmatraceConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let unit_store = MemoryUnitStore::new();
    let alert_store = MemoryAlertStore::new();
    let registry = CredentialRegistry::new(
        MemoryCredentialStore::new(),
        alert_store.clone(),
        &config.registry,
    );
    let alerts = AlertLog::new(alert_store.clone(), &config.alerts);

    // One processor per scanning session; stores are shared.
    let session = || {
        ScanProcessor::new(
            ItemLedger::new(unit_store.clone(), &config.ledger),
            AlertLog::new(alert_store.clone(), &config.alerts),
            &config.scan,
        )
    };

    let mut steps = Vec::new();

    // 1. Root authority registers a manufacturer and two pharmacies.
    let manufacturer = registry
        .issue_root(ActorRole::Manufacturer, "Acme Pharma", "Capital City")
        .await?;
    steps.push(Step {
        action: "issue manufacturer".to_owned(),
        detail: manufacturer.entity_id.clone(),
        ok: true,
    });

    let green_cross = registry
        .issue_root(ActorRole::Pharmacy, "Green Cross", "Springfield")
        .await?;
    let _blue_cross = registry
        .issue_root(ActorRole::Pharmacy, "Blue Cross", "Shelbyville")
        .await?;
    steps.push(Step {
        action: "issue pharmacies".to_owned(),
        detail: "Green Cross, Blue Cross".to_owned(),
        ok: true,
    });

    // 2. The manufacturer registers its distributor (raises an
    //    informational alert for the root authority).
    let distributor_cred = registry
        .issue_distributor(&manufacturer.entity_id, "FastFreight", "Capital City")
        .await?;
    steps.push(Step {
        action: "issue distributor".to_owned(),
        detail: distributor_cred.entity_id.clone(),
        ok: true,
    });

    // 3. Authenticate the actors that will scan.
    let distributor = registry
        .authenticate(ActorRole::Distributor, &distributor_cred.entity_id, None)
        .await?;
    let pharmacy = registry
        .authenticate(
            ActorRole::Pharmacy,
            &green_cross.entity_id,
            green_cross.passphrase.as_deref(),
        )
        .await?;

    // 4. Manufacturer creates the carton batch.
    let setup_ledger = ItemLedger::new(unit_store.clone(), &config.ledger);
    let manifest = setup_ledger
        .create_carton("Amoxicillin 500mg", args.units)
        .await?;
    steps.push(Step {
        action: "create batch".to_owned(),
        detail: format!("{} ({} units)", manifest.carton_id, args.units),
        ok: true,
    });

    // 5. Distributor activates the carton for Green Cross.
    let outcome = session()
        .process(ScanRequest::new(
            &manifest.carton_id,
            ActorContext::new(
                ActorRole::Distributor,
                distributor.name.clone(),
                distributor.location.clone(),
            ),
            ScanAction::ActivateCarton {
                destination: Destination {
                    pharmacy: pharmacy.name.clone(),
                    city: pharmacy.location.clone(),
                },
            },
        ))
        .await
        .map_err(|e| CliError::Command(e.to_string()))?;
    steps.push(Step {
        action: "activate carton".to_owned(),
        detail: outcome.to_string(),
        ok: true,
    });

    // 6. Green Cross receives and dispenses the first unit.
    let green_actor = ActorContext::new(
        ActorRole::Pharmacy,
        pharmacy.name.clone(),
        pharmacy.location.clone(),
    );
    let outcome = session()
        .process(ScanRequest::new(
            &manifest.unit_ids[0],
            green_actor.clone(),
            ScanAction::ReceiveStock,
        ))
        .await
        .map_err(|e| CliError::Command(e.to_string()))?;
    steps.push(Step {
        action: "receive stock".to_owned(),
        detail: outcome.to_string(),
        ok: true,
    });

    let outcome = session()
        .process(ScanRequest::new(
            &manifest.unit_ids[0],
            green_actor.clone(),
            ScanAction::Dispense,
        ))
        .await
        .map_err(|e| CliError::Command(e.to_string()))?;
    steps.push(Step {
        action: "dispense".to_owned(),
        detail: outcome.to_string(),
        ok: true,
    });

    // 7. Blue Cross attempts to receive a unit assigned to Green Cross.
    if args.units > 1 {
        let result = session()
            .process(ScanRequest::new(
                &manifest.unit_ids[1],
                ActorContext::new(ActorRole::Pharmacy, "Blue Cross", "Shelbyville"),
                ScanAction::ReceiveStock,
            ))
            .await;
        steps.push(expected_anomaly("diversion attempt", result));
    }

    // 8. A cloned identifier tries to dispense the sold unit again.
    let result = session()
        .process(ScanRequest::new(
            &manifest.unit_ids[0],
            green_actor,
            ScanAction::Dispense,
        ))
        .await;
    steps.push(expected_anomaly("duplicate sale attempt", result));

    // 9. Root authority revokes the distributor; the next login fails.
    registry.revoke(&distributor_cred.entity_id).await?;
    let login = registry
        .authenticate(ActorRole::Distributor, &distributor_cred.entity_id, None)
        .await;
    let rejected = matches!(login, Err(RegistryError::AuthFailure));
    steps.push(Step {
        action: "revoke distributor".to_owned(),
        detail: if rejected {
            "subsequent login rejected".to_owned()
        } else {
            format!("unexpected login result: {login:?}")
        },
        ok: rejected,
    });

    // 10. Collect the alert trail.
    let alert_rows: Vec<AlertRow> = alerts
        .list(Some(AlertStatus::Active), None)
        .await?
        .into_iter()
        .map(|a| AlertRow {
            category: a.category.to_string(),
            severity: a.severity.to_string(),
            subject: a.subject_id,
            status: a.status.to_string(),
        })
        .collect();

    writer.render(&SimulationReport {
        steps,
        alerts: alert_rows,
    })
}

/// Record a step that is expected to surface an integrity anomaly.
fn expected_anomaly(action: &str, result: Result<ScanOutcome, ScanEngineError>) -> Step {
    match result {
        Err(ScanEngineError::Anomaly { category, .. }) => Step {
            action: action.to_owned(),
            detail: format!("escalated: {category}"),
            ok: true,
        },
        Err(e) => Step {
            action: action.to_owned(),
            detail: format!("unexpected error: {e}"),
            ok: false,
        },
        Ok(outcome) => Step {
            action: action.to_owned(),
            detail: format!("unexpectedly accepted: {outcome}"),
            ok: false,
        },
    }
}
