//! # Ledger Indexer
//!
//! Offline indexer entry point.
//!
//! ## Startup Sequence
//!
//! 1. Parse command-line flags
//! 2. Build configuration (defaults, then environment, then flags)
//! 3. Initialize telemetry
//! 4. Run once and print the summary
//!
//! Exits non-zero when the run aborts or any table could not be written.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use indexer_runtime::{run, IndexerConfig, RunSummary};
use ledger_telemetry::{init_telemetry, TelemetryConfig};
use tracing::error;

/// Rebuilds the Batch / Certificate / Claim tables from a ledger event export.
#[derive(Parser, Debug)]
#[command(name = "ledger-indexer")]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory with one `<EventKind>.json` export per event kind
    #[arg(long)]
    events_dir: Option<PathBuf>,

    /// Directory the CSV tables are written to
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Also reconcile purchase agreements
    #[arg(long)]
    settlement: bool,

    /// Agreement cache artifact (settlement only)
    #[arg(long)]
    cache_path: Option<PathBuf>,

    /// Emit JSON log lines
    #[arg(long)]
    json_logs: bool,

    /// Log filter, e.g. `debug` or `cl_02_correlation=debug,info`
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn config(&self) -> Result<IndexerConfig> {
        let mut config = IndexerConfig::default();
        config.apply_env().context("invalid environment configuration")?;

        if let Some(dir) = &self.events_dir {
            config.source.events_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output.output_dir = dir.clone();
        }
        if self.settlement {
            config.settlement.enabled = true;
        }
        if let Some(path) = &self.cache_path {
            config.settlement.cache_path = path.clone();
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }

    fn telemetry(&self) -> TelemetryConfig {
        let mut telemetry = TelemetryConfig::from_env();
        if self.json_logs {
            telemetry.json_logs = true;
        }
        if let Some(level) = &self.log_level {
            telemetry.log_level = level.clone();
        }
        telemetry
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_telemetry(&args.telemetry()) {
        eprintln!("failed to initialize telemetry: {e}");
        return ExitCode::FAILURE;
    }

    match execute(&args).await {
        Ok(summary) if summary.is_success() => ExitCode::SUCCESS,
        Ok(summary) => {
            error!(failed = ?summary.failed_tables(), "some tables were not written");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "indexer run aborted");
            ExitCode::FAILURE
        }
    }
}

async fn execute(args: &Args) -> Result<RunSummary> {
    let config = args.config()?;
    let summary = run(&config).await?;
    print_summary(&summary);
    Ok(summary)
}

fn print_summary(summary: &RunSummary) {
    let stats = &summary.correlation;
    println!("run {}", summary.run_id);
    println!(
        "  batches {}  certificates {}  claims {}",
        stats.batches, stats.certificates, stats.claims
    );
    println!(
        "  decoded {} (v1 {}, v2 {}, v3 {})  undecodable {}",
        stats.claims_decoded, stats.decoded_v1, stats.decoded_v2, stats.decoded_v3, stats.decode_failures
    );
    println!(
        "  minted {}  claimed {}",
        summary.totals.minted, summary.totals.claimed
    );
    if let Some(settlement) = &summary.settlement {
        println!(
            "  agreements resolved {} (cache hits {})  mismatches {}",
            settlement.accessor_calls + settlement.cache_hits,
            settlement.cache_hits,
            summary.mismatches
        );
    }
    for outcome in &summary.outcomes {
        match outcome {
            Ok(written) => println!("  wrote {} rows to {}", written.rows, written.path.display()),
            Err(failure) => println!("  FAILED {failure}"),
        }
    }
}
