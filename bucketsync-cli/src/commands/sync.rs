//! `bucketsync sync`: plan and run jobs against the bucket.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use bucketsync_sync::{pipeline, SyncReport, TracingObserver};

use super::settings::{open_store, SettingsArgs};

/// Arguments for `bucketsync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Emit the run report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub async fn run(self) -> Result<()> {
        let settings = self.settings.resolve()?;
        let store = open_store(&settings).await?;
        let report = pipeline::sync(&settings, store, &TracingObserver)
            .await
            .with_context(|| format!("sync to '{}' failed", settings.bucket))?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        print_report(&settings.bucket, &report, settings.dry_run);
        Ok(())
    }
}

fn print_report(bucket: &str, report: &SyncReport, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    if report.planned == 0 {
        println!("{prefix}✓ '{bucket}': nothing to do");
        return;
    }

    let summary = &report.summary;
    println!(
        "{prefix}{} '{bucket}' synced ({} uploaded, {} redirected, {} deleted)",
        "✓".green().bold(),
        summary.uploaded,
        summary.redirected,
        summary.deleted,
    );
    if summary.invalidated {
        println!("{prefix}  cache invalidation requested");
    }
}
