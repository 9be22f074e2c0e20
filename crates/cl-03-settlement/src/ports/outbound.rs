//! # Outbound Ports (Driven Ports)

use async_trait::async_trait;
use shared_types::{Address, SourceError};

use crate::domain::{AgreementData, CacheError, CachedAgreement};

/// Point lookup of agreement metadata. Not a log query.
#[async_trait]
pub trait AgreementDataAccessor: Send + Sync {
    /// Returns the metadata of the agreement deployed at `address`.
    async fn get_agreement_data(
        &self,
        address: Address,
    ) -> Result<AgreementData, SourceError>;
}

/// Persistence for resolved agreements.
///
/// A store is opened once per run. Entries present at open seed the cache;
/// entries resolved during the run are appended.
pub trait CacheStore: Send {
    /// Entries persisted before this run.
    fn seeded(&self) -> &[CachedAgreement];

    /// Persists one newly resolved entry.
    fn append(&mut self, entry: &CachedAgreement) -> Result<(), CacheError>;
}
