//! # Settlement Service
//!
//! Fetches the agreement event collections and reconciles them.

use shared_types::{
    fetch_typed, AgreementClaimedArgs, AgreementDeployedArgs, AgreementFilledArgs,
    AgreementSignedArgs, EventSource,
};
use tracing::{info, instrument};

use crate::domain::{
    AgreementCache, AgreementEvents, SettlementError, SettlementReconciler, SettlementReport,
};
use crate::ports::{AgreementDataAccessor, CacheStore};

/// Queries the four agreement event kinds together.
pub async fn fetch_agreement_events<S>(source: &S) -> Result<AgreementEvents, SettlementError>
where
    S: EventSource + ?Sized,
{
    let (deployed, signed, filled, claimed) = tokio::try_join!(
        fetch_typed::<AgreementDeployedArgs, _>(source, None),
        fetch_typed::<AgreementSignedArgs, _>(source, None),
        fetch_typed::<AgreementFilledArgs, _>(source, None),
        fetch_typed::<AgreementClaimedArgs, _>(source, None),
    )?;

    Ok(AgreementEvents {
        deployed,
        signed,
        filled,
        claimed,
    })
}

/// Fetches the agreement events and reconciles them through `cache`.
#[instrument(skip_all)]
pub async fn fetch_and_reconcile<S, A, C>(
    source: &S,
    accessor: &A,
    cache: &mut AgreementCache<C>,
) -> Result<SettlementReport, SettlementError>
where
    S: EventSource + ?Sized,
    A: AgreementDataAccessor + ?Sized,
    C: CacheStore,
{
    let events = fetch_agreement_events(source).await?;
    info!(
        deployed = events.deployed.len(),
        signed = events.signed.len(),
        filled = events.filled.len(),
        claimed = events.claimed.len(),
        cached = cache.entry_count(),
        "agreement events ingested"
    );
    SettlementReconciler::new(accessor).reconcile(&events, cache).await
}
