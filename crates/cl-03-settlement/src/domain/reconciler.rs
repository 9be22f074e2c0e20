//! # Settlement Reconciler
//!
//! Resolves every deployed agreement through the cache, drops the invalid
//! ones, keeps the raw signed/filled/claimed views of the rest and flags
//! signed/filled amount disagreements.
//!
//! ## Algorithm
//!
//! 1. Deployed events in ascending block order; each distinct address is
//!    resolved once (block id = deployment block).
//! 2. `valid == false` excludes the address from everything downstream.
//! 3. Events for addresses never deployed are counted, not kept.
//! 4. Every signed × filled pair of one agreement with different amounts
//!    becomes an [`AmountMismatch`].

use std::collections::HashMap;

use shared_types::{Address, LedgerEvent};
use tracing::{debug, info, warn};

use super::cache::{AgreementCache, CacheLookup};
use super::entities::{
    Agreement, AgreementEvents, AmountMismatch, ClaimedAgreement, FilledAgreement,
    SettlementReport, SettlementStats, SignedAgreement,
};
use super::errors::SettlementError;
use crate::ports::{AgreementDataAccessor, CacheStore};

/// Address status after the deployment pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Standing {
    Valid,
    Invalid,
}

/// Reconciles agreement events against the metadata accessor.
pub struct SettlementReconciler<'a, A: AgreementDataAccessor + ?Sized> {
    accessor: &'a A,
}

impl<'a, A: AgreementDataAccessor + ?Sized> SettlementReconciler<'a, A> {
    pub fn new(accessor: &'a A) -> Self {
        Self { accessor }
    }

    /// Runs one reconciliation pass.
    ///
    /// Fails only when the accessor or the cache store fails.
    pub async fn reconcile<C: CacheStore>(
        &self,
        events: &AgreementEvents,
        cache: &mut AgreementCache<C>,
    ) -> Result<SettlementReport, SettlementError> {
        let mut report = SettlementReport::default();
        report.stats.deployed_events = events.deployed.len();
        report.stats.signed_events = events.signed.len();
        report.stats.filled_events = events.filled.len();
        report.stats.claimed_events = events.claimed.len();

        let mut deployed: Vec<_> = events.deployed.iter().collect();
        deployed.sort_by_key(|e| e.block_number);

        let mut standing: HashMap<Address, Standing> = HashMap::new();
        for event in deployed {
            let address = event.args.agreement;
            if standing.contains_key(&address) {
                continue;
            }

            let (entry, lookup) = cache
                .resolve(self.accessor, address, event.block_number)
                .await?;
            match lookup {
                CacheLookup::Hit => report.stats.cache_hits += 1,
                CacheLookup::Fetched => report.stats.accessor_calls += 1,
            }

            if entry.data.valid {
                standing.insert(address, Standing::Valid);
                report
                    .agreements
                    .push(Agreement::from_cached(entry, event.transaction_hash));
            } else {
                debug!(%address, "agreement invalid, excluded");
                standing.insert(address, Standing::Invalid);
                report.excluded.push(address);
            }
        }

        report.signed = keep_valid(&events.signed, |e| e.args.agreement, &standing, &mut report.stats);
        report.filled = keep_valid(&events.filled, |e| e.args.agreement, &standing, &mut report.stats);
        report.claimed = keep_valid(&events.claimed, |e| e.args.agreement, &standing, &mut report.stats);
        report.mismatches = amount_mismatches(&report.signed, &report.filled);

        info!(
            agreements = report.agreements.len(),
            excluded = report.excluded.len(),
            mismatches = report.mismatches.len(),
            unknown = report.stats.unknown_agreement_events,
            accessor_calls = report.stats.accessor_calls,
            "settlement reconciled"
        );
        Ok(report)
    }
}

/// Raw views of the events whose agreement is valid.
fn keep_valid<E, V>(
    events: &[LedgerEvent<E>],
    agreement: impl Fn(&LedgerEvent<E>) -> Address,
    standing: &HashMap<Address, Standing>,
    stats: &mut SettlementStats,
) -> Vec<V>
where
    for<'e> V: From<&'e LedgerEvent<E>>,
{
    let mut kept = Vec::new();
    for event in events {
        let address = agreement(event);
        match standing.get(&address) {
            Some(Standing::Valid) => kept.push(V::from(event)),
            Some(Standing::Invalid) => stats.excluded_events += 1,
            None => {
                debug!(agreement = %address, block = event.block_number, "event for unknown agreement");
                stats.unknown_agreement_events += 1;
            }
        }
    }
    kept
}

/// Signed × filled pairs of one agreement whose amounts differ.
fn amount_mismatches(signed: &[SignedAgreement], filled: &[FilledAgreement]) -> Vec<AmountMismatch> {
    let mut filled_by_agreement: HashMap<Address, Vec<&FilledAgreement>> = HashMap::new();
    for fill in filled {
        filled_by_agreement.entry(fill.agreement).or_default().push(fill);
    }

    let mut mismatches = Vec::new();
    for sign in signed {
        for fill in filled_by_agreement.get(&sign.agreement).into_iter().flatten() {
            if sign.amount != fill.amount {
                warn!(
                    agreement = %sign.agreement,
                    signed_amount = %sign.amount,
                    filled_amount = %fill.amount,
                    signed_tx = %sign.transaction_hash,
                    filled_tx = %fill.transaction_hash,
                    "signed and filled amounts differ"
                );
                mismatches.push(AmountMismatch {
                    agreement: sign.agreement,
                    signed_amount: sign.amount,
                    filled_amount: fill.amount,
                    signed_tx: sign.transaction_hash,
                    filled_tx: fill.transaction_hash,
                });
            }
        }
    }
    mismatches
}
