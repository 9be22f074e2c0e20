//! # Agreement Cache
//!
//! Read-through on miss, write-through on fetch. An address is sent to the
//! accessor at most once per run, and never when the store already holds it.

use std::collections::HashMap;

use shared_types::Address;
use tracing::{debug, trace};

use super::entities::CachedAgreement;
use super::errors::SettlementError;
use crate::ports::{AgreementDataAccessor, CacheStore};

/// Where a resolved entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheLookup {
    /// Already cached, no accessor call.
    Hit,
    /// Fetched from the accessor and appended to the store.
    Fetched,
}

/// In-memory agreement cache in front of a [`CacheStore`].
pub struct AgreementCache<C: CacheStore> {
    entries: HashMap<Address, CachedAgreement>,
    store: C,
}

impl<C: CacheStore> AgreementCache<C> {
    /// Creates a cache seeded from the store's persisted entries.
    ///
    /// When an address was persisted more than once the latest row wins.
    pub fn new(store: C) -> Self {
        let entries: HashMap<Address, CachedAgreement> = store
            .seeded()
            .iter()
            .map(|entry| (entry.address, entry.clone()))
            .collect();
        debug!(seeded = entries.len(), "agreement cache seeded");
        Self { entries, store }
    }

    /// Number of cached addresses.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Returns the entry for `address`, fetching and persisting it on a miss.
    ///
    /// `block_id` is recorded only for newly fetched entries.
    pub async fn resolve<A>(
        &mut self,
        accessor: &A,
        address: Address,
        block_id: u64,
    ) -> Result<(&CachedAgreement, CacheLookup), SettlementError>
    where
        A: AgreementDataAccessor + ?Sized,
    {
        if self.entries.contains_key(&address) {
            trace!(%address, "agreement cache hit");
            return Ok((&self.entries[&address], CacheLookup::Hit));
        }

        let data = accessor.get_agreement_data(address).await?;
        let entry = CachedAgreement {
            block_id,
            address,
            data,
        };
        self.store.append(&entry)?;
        debug!(%address, block_id, valid = entry.data.valid, "agreement resolved");

        let entry = self.entries.entry(address).or_insert(entry);
        Ok((entry, CacheLookup::Fetched))
    }
}
