//! # Certificate Ledger Indexer Runtime
//!
//! Wires the components into one offline run over a JSON event export.
//!
//! ## Modular Structure
//!
//! - `config` - [`IndexerConfig`]: defaults, environment overrides, validation
//! - `adapters` - JSON-backed event source and agreement accessor
//! - `pipeline` - run orchestration and the [`RunSummary`]
//!
//! ## Run Flow
//!
//! ```text
//! events/*.json ──→ JsonEventSource ──→ CL-02 Correlation ──┐
//!                        │                                   │
//!                        └──→ CL-03 Settlement (optional) ───┤
//!                               ↑ agreement-cache.csv        ↓
//!                                                    CL-04 Reporting
//!                                                            │
//!                                            output/*.csv + metrics.prom
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod adapters;
pub mod config;
pub mod pipeline;

pub use config::{ConfigError, IndexerConfig, OutputConfig, SettlementConfig, SourceConfig};
pub use pipeline::{run, run_with_source, RunSummary, METRICS_FILE};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
