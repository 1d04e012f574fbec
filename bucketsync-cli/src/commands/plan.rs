//! `bucketsync plan`: list the jobs a sync would run.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use bucketsync_core::{Job, JobAction};
use bucketsync_sync::{pipeline, TracingObserver};

use super::settings::{open_store, SettingsArgs};

/// Arguments for `bucketsync plan`.
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct JobRow {
    #[tabled(rename = "action")]
    action: String,
    #[tabled(rename = "local")]
    local: String,
    #[tabled(rename = "remote")]
    remote: String,
}

impl PlanArgs {
    pub async fn run(self) -> Result<()> {
        let settings = self.settings.resolve()?;
        let store = open_store(&settings).await?;
        let jobs = pipeline::plan(&settings, store.as_ref(), &TracingObserver)
            .await
            .context("planning failed")?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&jobs)?);
            return Ok(());
        }

        print_table(&jobs);
        Ok(())
    }
}

fn print_table(jobs: &[Job]) {
    if jobs.is_empty() {
        println!("Nothing to do.");
        return;
    }

    let rows: Vec<JobRow> = jobs
        .iter()
        .map(|job| JobRow {
            action: action_label(job.action()),
            local: job.local().unwrap_or("-").to_string(),
            remote: job.remote().to_string(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    println!("{} job(s) planned", jobs.len().to_string().bold());
}

fn action_label(action: JobAction) -> String {
    let label = action.to_string().to_uppercase();
    match action {
        JobAction::Upload => label.green().to_string(),
        JobAction::Redirect => label.cyan().to_string(),
        JobAction::Delete => label.red().to_string(),
        JobAction::InvalidateCache => label.yellow().to_string(),
    }
}
