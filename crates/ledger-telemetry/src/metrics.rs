//! Prometheus metrics for the indexer.
//!
//! All metrics follow the naming convention: `ledger_<metric>_<unit>`
//!
//! A run is a batch job, so the registry is not served over HTTP. The
//! runtime encodes it once at the end of the run and writes the text
//! exposition next to the output tables.

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Raw events ingested, by event kind
    pub static ref EVENTS_INGESTED: CounterVec = CounterVec::new(
        Opts::new("ledger_events_ingested_total", "Raw events ingested from the event source"),
        &["kind"]
    ).expect("metric creation failed");

    /// Rows emitted, by output table
    pub static ref ROWS_EMITTED: CounterVec = CounterVec::new(
        Opts::new("ledger_rows_emitted_total", "Rows emitted into derived tables"),
        &["table"]
    ).expect("metric creation failed");

    /// Claim rows whose payload matched no known schema
    pub static ref CLAIM_DECODE_FAILURES: Counter = Counter::new(
        "ledger_claim_decode_failures_total",
        "Claim rows carrying the decode-failure marker"
    ).expect("metric creation failed");

    /// Signed/filled amount disagreements
    pub static ref AMOUNT_MISMATCHES: Counter = Counter::new(
        "ledger_amount_mismatches_total",
        "Agreements whose signed and filled amounts differ"
    ).expect("metric creation failed");

    /// Tables that could not be written
    pub static ref OUTPUT_WRITE_FAILURES: CounterVec = CounterVec::new(
        Opts::new("ledger_output_write_failures_total", "Output tables that failed to write"),
        &["table"]
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; metrics already registered are skipped.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(EVENTS_INGESTED.clone()),
        Box::new(ROWS_EMITTED.clone()),
        Box::new(CLAIM_DECODE_FAILURES.clone()),
        Box::new(AMOUNT_MISMATCHES.clone()),
        Box::new(OUTPUT_WRITE_FAILURES.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Counts `count` ingested events of `kind`.
pub fn record_ingested(kind: &str, count: usize) {
    EVENTS_INGESTED.with_label_values(&[kind]).inc_by(count as f64);
}

/// Counts `count` rows emitted into `table`.
pub fn record_rows(table: &str, count: usize) {
    ROWS_EMITTED.with_label_values(&[table]).inc_by(count as f64);
}

pub fn record_decode_failures(count: usize) {
    CLAIM_DECODE_FAILURES.inc_by(count as f64);
}

pub fn record_amount_mismatches(count: usize) {
    AMOUNT_MISMATCHES.inc_by(count as f64);
}

pub fn record_output_failure(table: &str) {
    OUTPUT_WRITE_FAILURES.with_label_values(&[table]).inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_twice() {
        register_metrics().unwrap();
        register_metrics().unwrap();
    }

    #[test]
    fn test_counters_in_exposition() {
        register_metrics().unwrap();
        record_ingested("ClaimSingle", 3);
        record_rows("claims", 2);
        record_output_failure("claims");

        assert!(EVENTS_INGESTED.with_label_values(&["ClaimSingle"]).get() >= 3.0);

        let text = encode_metrics().unwrap();
        assert!(text.contains("ledger_events_ingested_total{kind=\"ClaimSingle\"}"));
        assert!(text.contains("ledger_rows_emitted_total{table=\"claims\"}"));
        assert!(text.contains("ledger_output_write_failures_total{table=\"claims\"}"));
    }
}
