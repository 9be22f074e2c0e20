//! # Run Orchestration
//!
//! One indexer run, start to finish:
//!
//! 1. Correlate the certificate events into Batch / Certificate / Claim rows
//! 2. Optionally reconcile the agreement events through the cache artifact
//! 3. Aggregate minted and claimed totals
//! 4. Write every table (a failed table does not stop the others)
//! 5. Record metrics and write `metrics.prom` next to the tables
//!
//! Steps 1 and 2 abort the run on a source failure. Nothing after them does.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use cl_02_correlation::{CorrelationOutput, CorrelationService, CorrelationStats};
use cl_03_settlement::{
    fetch_and_reconcile, AgreementCache, AgreementDataAccessor, CsvCacheStore, SettlementReport,
    SettlementStats,
};
use cl_04_reporting::{aggregate, Table, TableOutcome, TableWriter, ValueTotals};
use ledger_telemetry::metrics;
use shared_types::{EventKind, EventSource};
use tracing::{info, warn};
use uuid::Uuid;

use crate::adapters::{JsonAgreementAccessor, JsonEventSource, AGREEMENT_DATA_FILE};
use crate::config::IndexerConfig;

/// Metrics exposition file written next to the tables.
pub const METRICS_FILE: &str = "metrics.prom";

/// What one run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub correlation: CorrelationStats,
    /// `None` when settlement did not run.
    pub settlement: Option<SettlementStats>,
    pub mismatches: usize,
    pub totals: ValueTotals,
    pub outcomes: Vec<TableOutcome>,
}

impl RunSummary {
    /// Tables that could not be written.
    pub fn failed_tables(&self) -> Vec<Table> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.as_ref().err().map(|failure| failure.table))
            .collect()
    }

    /// True when every table was written.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(Result::is_ok)
    }
}

/// Runs against the JSON export named by `config`.
pub async fn run(config: &IndexerConfig) -> Result<RunSummary> {
    let source = Arc::new(JsonEventSource::new(&config.source.events_dir));

    let accessor: Option<Arc<dyn AgreementDataAccessor>> = if config.settlement.enabled {
        let path = config.source.events_dir.join(AGREEMENT_DATA_FILE);
        let accessor = JsonAgreementAccessor::open(&path)
            .await
            .with_context(|| format!("failed to load agreement data from {}", path.display()))?;
        Some(Arc::new(accessor) as Arc<dyn AgreementDataAccessor>)
    } else {
        None
    };

    run_with_source(config, source, accessor).await
}

/// Runs against arbitrary collaborators. Settlement runs when an accessor
/// is given; its cache artifact is `config.settlement.cache_path`.
pub async fn run_with_source(
    config: &IndexerConfig,
    source: Arc<dyn EventSource>,
    accessor: Option<Arc<dyn AgreementDataAccessor>>,
) -> Result<RunSummary> {
    let run_id = Uuid::new_v4();
    info!(%run_id, events_dir = %config.source.events_dir.display(), settlement = accessor.is_some(), "indexer run started");

    if let Err(e) = ledger_telemetry::register_metrics() {
        warn!(error = %e, "metrics registration failed, counters will not be exported");
    }

    let output = CorrelationService::new(Arc::clone(&source))
        .run(run_id)
        .await
        .context("certificate correlation failed")?;
    record_correlation(&output);

    let report = match accessor {
        Some(accessor) => Some(reconcile(config, source.as_ref(), accessor.as_ref()).await?),
        None => None,
    };

    let totals = aggregate(&output.certificates, &output.claims);
    info!(
        minted = %totals.minted,
        claimed = %totals.claimed,
        certificate_rows = totals.certificate_rows,
        claim_rows = totals.claim_rows,
        "totals aggregated"
    );
    if totals.outstanding().is_none() {
        warn!(minted = %totals.minted, claimed = %totals.claimed, "claimed total exceeds minted total");
    }

    let writer = TableWriter::new(&config.output.output_dir);
    let outcomes = writer.write_all(&output, report.as_ref());
    for outcome in &outcomes {
        match outcome {
            Ok(written) => metrics::record_rows(written.table.as_str(), written.rows),
            Err(failure) => metrics::record_output_failure(failure.table.as_str()),
        }
    }
    write_metrics(&config.output.output_dir);

    let summary = RunSummary {
        run_id,
        correlation: output.stats,
        mismatches: report.as_ref().map_or(0, |r| r.mismatches.len()),
        settlement: report.map(|r| r.stats),
        totals,
        outcomes,
    };
    info!(%run_id, failed_tables = summary.failed_tables().len(), "indexer run finished");
    Ok(summary)
}

async fn reconcile(
    config: &IndexerConfig,
    source: &dyn EventSource,
    accessor: &dyn AgreementDataAccessor,
) -> Result<SettlementReport> {
    let path = &config.settlement.cache_path;
    let store = CsvCacheStore::open(path)
        .with_context(|| format!("failed to open agreement cache {}", path.display()))?;
    let mut cache = AgreementCache::new(store);

    let report = fetch_and_reconcile(source, accessor, &mut cache)
        .await
        .context("settlement reconciliation failed")?;

    let stats = &report.stats;
    metrics::record_ingested(EventKind::AgreementDeployed.as_str(), stats.deployed_events);
    metrics::record_ingested(EventKind::AgreementSigned.as_str(), stats.signed_events);
    metrics::record_ingested(EventKind::AgreementFilled.as_str(), stats.filled_events);
    metrics::record_ingested(EventKind::AgreementClaimed.as_str(), stats.claimed_events);
    metrics::record_amount_mismatches(report.mismatches.len());
    Ok(report)
}

fn record_correlation(output: &CorrelationOutput) {
    let stats = &output.stats;
    metrics::record_ingested(EventKind::RedemptionSet.as_str(), stats.redemption_events);
    metrics::record_ingested(EventKind::CertificateBatchMinted.as_str(), stats.batch_minted_events);
    metrics::record_ingested(EventKind::TransferSingle.as_str(), stats.mint_events);
    metrics::record_ingested(EventKind::ClaimSingle.as_str(), stats.claim_events);
    metrics::record_decode_failures(stats.decode_failures);
}

fn write_metrics(output_dir: &Path) {
    let path = output_dir.join(METRICS_FILE);
    let written = ledger_telemetry::encode_metrics()
        .map_err(|e| e.to_string())
        .and_then(|text| std::fs::write(&path, text).map_err(|e| e.to_string()));
    if let Err(error) = written {
        warn!(path = %path.display(), %error, "metrics not written");
    }
}
