//! Sync command - Mirror the local folder once
//!
//! Provides the `diskmirror sync` CLI command which:
//! 1. Loads and validates the configuration
//! 2. Creates the Yandex Disk store and the sync loop
//! 3. Prepares both folders and runs a single cycle
//!
//! With `--dry-run` nothing is changed: the plan is computed and printed.

use std::{path::Path, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::Args;
use diskmirror_core::{config::Config, domain::Plan};
use diskmirror_sync::{engine::CycleReport, scheduler::SyncLoop};
use diskmirror_yadisk::store::YadiskRemoteStore;
use tracing::info;

use crate::output::{get_formatter, plural, OutputFormat, OutputFormatter};

/// Sync command with clap options
#[derive(Debug, Args)]
pub struct SyncCommand {
    /// Show what would be done without making changes
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncCommand {
    /// Runs one reconciliation cycle, or only plans it with `--dry-run`
    pub async fn execute(&self, format: OutputFormat, config_path: Option<&Path>) -> Result<()> {
        let formatter = get_formatter(format);

        let (config, config_path) = Config::load_from(config_path)?;
        info!(config_path = %config_path.display(), "Loaded configuration");

        let errors = config.validate();
        if !errors.is_empty() {
            for err in &errors {
                formatter.error(&err.to_string());
            }
            bail!("Invalid configuration in {}", config_path.display());
        }

        let store = YadiskRemoteStore::from_config(&config)
            .context("Failed to create Yandex Disk store")?;
        let sync_loop = SyncLoop::from_config(Arc::new(store), &config)
            .context("Failed to create sync engine")?;
        let engine = sync_loop.engine();

        if self.dry_run {
            formatter.info("Dry run mode - no changes will be made");
            let plan = engine
                .plan_only()
                .await
                .context("Failed to compute the sync plan")?;
            print_plan(formatter.as_ref(), format, &plan)?;
            return Ok(());
        }

        formatter.info(&format!(
            "Mirroring {} to {}...",
            engine.local_root().display(),
            engine.remote_folder()
        ));

        sync_loop
            .initialize()
            .await
            .context("Failed to prepare folders")?;

        let report = engine.run_cycle().await.context("Sync cycle failed")?;
        print_report(formatter.as_ref(), format, &report);

        Ok(())
    }
}

fn print_plan(formatter: &dyn OutputFormatter, format: OutputFormat, plan: &Plan) -> Result<()> {
    if format.is_json() {
        let json = serde_json::json!({
            "dry_run": true,
            "actions": serde_json::to_value(plan.actions())
                .context("Failed to serialize plan")?,
        });
        formatter.print_json(&json);
        return Ok(());
    }

    if plan.is_empty() {
        formatter.success("Already up to date");
        return Ok(());
    }

    formatter.success(&format!("{} planned", plural(plan.len(), "action")));
    for action in plan.iter() {
        formatter.action(action, None);
    }
    Ok(())
}

fn print_report(formatter: &dyn OutputFormatter, format: OutputFormat, report: &CycleReport) {
    if format.is_json() {
        let failures: Vec<_> = report
            .failures
            .iter()
            .map(|(action, reason)| {
                serde_json::json!({
                    "action": action.kind(),
                    "name": action.name(),
                    "reason": reason,
                })
            })
            .collect();
        let json = serde_json::json!({
            "cycle_id": report.cycle_id,
            "uploaded": report.uploaded,
            "overwritten": report.overwritten,
            "deleted": report.deleted,
            "failures": failures,
            "duration_ms": report.duration_ms,
        });
        formatter.print_json(&json);
        return;
    }

    let duration_display = if report.duration_ms >= 1000 {
        format!("{:.1}s", report.duration_ms as f64 / 1000.0)
    } else {
        format!("{}ms", report.duration_ms)
    };

    let total = report.uploaded + report.overwritten + report.deleted;
    if total == 0 && report.failures.is_empty() {
        formatter.success("Already up to date");
    } else {
        formatter.success(&format!("Sync completed in {}", duration_display));
    }

    for (label, count) in [
        ("Uploaded:   ", report.uploaded),
        ("Overwritten:", report.overwritten),
        ("Deleted:    ", report.deleted),
    ] {
        if count > 0 {
            formatter.info(&format!("{} {}", label, plural(count, "file")));
        }
    }

    if !report.failures.is_empty() {
        formatter.error(&format!(
            "{} failed:",
            plural(report.failures.len(), "action")
        ));
        for (action, reason) in &report.failures {
            formatter.action(action, Some(reason.as_str()));
        }
    }
}
