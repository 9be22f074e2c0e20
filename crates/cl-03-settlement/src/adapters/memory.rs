//! In-memory agreement accessor and cache store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{Address, SourceError};

use crate::domain::{AgreementData, CacheError, CachedAgreement};
use crate::ports::{AgreementDataAccessor, CacheStore};

/// Accessor answering from a fixed map and counting calls per address.
///
/// Unknown addresses fail with [`SourceError::Unavailable`].
#[derive(Debug, Default)]
pub struct InMemoryAgreementAccessor {
    agreements: HashMap<Address, AgreementData>,
    calls: Mutex<HashMap<Address, usize>>,
}

impl InMemoryAgreementAccessor {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_agreement(mut self, address: Address, data: AgreementData) -> Self {
        self.agreements.insert(address, data);
        self
    }

    /// Lookups received for `address`.
    pub fn calls(&self, address: &Address) -> usize {
        self.calls.lock().get(address).copied().unwrap_or(0)
    }

    /// Lookups received in total.
    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }
}

impl FromIterator<(Address, AgreementData)> for InMemoryAgreementAccessor {
    fn from_iter<I: IntoIterator<Item = (Address, AgreementData)>>(iter: I) -> Self {
        Self {
            agreements: iter.into_iter().collect(),
            calls: Mutex::default(),
        }
    }
}

#[async_trait]
impl AgreementDataAccessor for InMemoryAgreementAccessor {
    async fn get_agreement_data(&self, address: Address) -> Result<AgreementData, SourceError> {
        *self.calls.lock().entry(address).or_insert(0) += 1;
        self.agreements
            .get(&address)
            .cloned()
            .ok_or_else(|| SourceError::unavailable("agreement-data", format!("no agreement at {address}")))
    }
}

/// Cache store that keeps appended entries in memory.
///
/// The appended list is shared, so a test can inspect it after the store
/// has been moved into a cache.
#[derive(Debug, Default)]
pub struct InMemoryCacheStore {
    seeded: Vec<CachedAgreement>,
    appended: Arc<Mutex<Vec<CachedAgreement>>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that reports `entries` as persisted by an earlier run.
    pub fn seeded_with(entries: Vec<CachedAgreement>) -> Self {
        Self {
            seeded: entries,
            appended: Arc::default(),
        }
    }

    /// Shared handle to the entries appended so far.
    pub fn appended_handle(&self) -> Arc<Mutex<Vec<CachedAgreement>>> {
        Arc::clone(&self.appended)
    }
}

impl CacheStore for InMemoryCacheStore {
    fn seeded(&self) -> &[CachedAgreement] {
        &self.seeded
    }

    fn append(&mut self, entry: &CachedAgreement) -> Result<(), CacheError> {
        self.appended.lock().push(entry.clone());
        Ok(())
    }
}
