//! # CL-03 Settlement - Agreement Reconciliation
//!
//! **Component ID:** 03
//! **Status:** Production-Ready
//!
//! ## Purpose
//!
//! Correlates the purchase agreement event family (deployed, signed,
//! filled, claimed) with per-address metadata from an external accessor,
//! caching every lookup in an append-only artifact.
//!
//! ## Architecture
//!
//! | Layer | Items |
//! |-------|-------|
//! | Domain | `SettlementReconciler`, `AgreementCache`, `SettlementReport` |
//! | Ports | `AgreementDataAccessor`, `CacheStore` |
//! | Adapters | `CsvCacheStore`, `InMemoryCacheStore`, `InMemoryAgreementAccessor` |
//!
//! ## Rules
//!
//! | Rule | Enforcement |
//! |------|-------------|
//! | One accessor call per address per run | `domain/cache.rs` - read-through |
//! | Never call for addresses already persisted | `AgreementCache::new()` seeds from store |
//! | Every fetch is persisted before use | `domain/cache.rs` - write-through |
//! | Invalid agreements excluded downstream | `domain/reconciler.rs` |
//! | Amount mismatches reported, never fatal | `domain/reconciler.rs` - `warn!` + `AmountMismatch` |

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{CsvCacheStore, InMemoryAgreementAccessor, InMemoryCacheStore, CACHE_HEADER};
pub use domain::cache::CacheLookup;
pub use domain::{
    Agreement, AgreementCache, AgreementData, AgreementEvents, AmountMismatch, CacheError,
    CachedAgreement, ClaimedAgreement, FilledAgreement, SettlementError, SettlementReconciler,
    SettlementReport, SettlementStats, SignedAgreement,
};
pub use ports::{AgreementDataAccessor, CacheStore};
pub use service::{fetch_agreement_events, fetch_and_reconcile};

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::adapters::*;
    pub use crate::domain::*;
    pub use crate::ports::*;
    pub use crate::service::{fetch_agreement_events, fetch_and_reconcile};
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
