//! # CL-02 Correlation - Batch / Certificate / Claim Reconstruction
//!
//! **Component ID:** 02
//! **Status:** Production-Ready
//!
//! ## Purpose
//!
//! Rebuilds the relational view of the certificate lifecycle from four
//! unordered event collections, purely by key matching.
//!
//! | Input | Join key | Produces |
//! |-------|----------|----------|
//! | `RedemptionSet` | `batchId` | one Batch row each |
//! | `CertificateBatchMinted` | `batchId` → certificate ids | (fan-out only) |
//! | `TransferSingle` from `0x0` | `id` as integer | one Certificate row per match |
//! | `ClaimSingle` | `id` as integer | one Claim row per match, decoded payload |
//!
//! ## Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | Rows only from exact key matches | `domain/engine.rs` - `KeyedIndex` lookups |
//! | Cross product, never deduplicated | `domain/index.rs` - per-key position lists |
//! | Batches in ascending block order | `domain/engine.rs` - stable sort |
//! | Stable row ids | single-threaded emission order |
//! | Source failure is fatal | `service.rs` - `CorrelationError::Source` |
//!
//! ## Usage Example
//!
//! ```ignore
//! use cl_02_correlation::prelude::*;
//!
//! let service = CorrelationService::new(Arc::new(source));
//! let output = service.run(Uuid::new_v4()).await?;
//! for batch in &output.batches {
//!     println!("{} -> {} certificates", batch.batch_id, batch.certificate_ids.len());
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod domain;
pub mod service;

pub use domain::{
    Batch, Certificate, CertificateEvents, CertificateRowId, Claim, ClaimRowId, CorrelationEngine,
    CorrelationError, CorrelationOutput, CorrelationStats, KeyedIndex,
};
pub use service::{fetch_and_correlate, fetch_certificate_events, CorrelationService};

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::domain::*;
    pub use crate::service::{fetch_and_correlate, fetch_certificate_events, CorrelationService};
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
