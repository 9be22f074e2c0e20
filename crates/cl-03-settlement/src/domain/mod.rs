//! Domain layer for settlement reconciliation.

pub mod cache;
pub mod entities;
pub mod errors;
pub mod reconciler;

pub use cache::AgreementCache;
pub use entities::*;
pub use errors::{CacheError, SettlementError};
pub use reconciler::SettlementReconciler;
