//! bucketsync: mirror a local directory into a bucket.
//!
//! # Usage
//!
//! ```text
//! bucketsync sync --bucket <dir> [--source <dir>] [--target <prefix>] [--delete]
//!                 [--redirect <key=target>]... [--invalidate <distribution>]
//!                 [--max-concurrency N] [--dry-run] [--config file.yaml] [--json]
//! bucketsync plan  (same flags; prints the job table instead of running it)
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{plan::PlanArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "bucketsync",
    version,
    about = "Mirror a local directory into an object-store bucket",
    long_about = None,
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Upload, redirect and delete until the bucket mirrors the source.
    Sync(SyncArgs),

    /// Show the jobs a sync would run without touching the bucket.
    Plan(PlanArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Sync(args) => args.run().await,
        Commands::Plan(args) => args.run().await,
    }
}

/// Logs go to stderr so `--json` output on stdout stays parseable.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
