//! # Correlation Service
//!
//! Fetches the four certificate event collections from an [`EventSource`]
//! and runs the [`CorrelationEngine`] over them.
//!
//! The four queries are awaited together; the matching pass itself runs
//! only once every collection is in memory.

use std::sync::Arc;

use shared_types::{
    fetch_typed, CertificateBatchMintedArgs, ClaimSingleArgs, EventFilter, EventSource,
    RedemptionSetArgs, TransferSingleArgs,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::{CertificateEvents, CorrelationEngine, CorrelationError, CorrelationOutput};

/// Queries every certificate event kind. Mints are transfers out of the
/// zero address.
pub async fn fetch_certificate_events<S>(source: &S) -> Result<CertificateEvents, CorrelationError>
where
    S: EventSource + ?Sized,
{
    let (redemption_set, batch_minted, mints, claims) = tokio::try_join!(
        fetch_typed::<RedemptionSetArgs, _>(source, None),
        fetch_typed::<CertificateBatchMintedArgs, _>(source, None),
        fetch_typed::<TransferSingleArgs, _>(source, Some(EventFilter::minted())),
        fetch_typed::<ClaimSingleArgs, _>(source, None),
    )?;

    Ok(CertificateEvents {
        redemption_set,
        batch_minted,
        mints,
        claims,
    })
}

/// Fetches the event collections and correlates them.
pub async fn fetch_and_correlate<S>(
    source: &S,
    engine: &CorrelationEngine,
) -> Result<CorrelationOutput, CorrelationError>
where
    S: EventSource + ?Sized,
{
    let events = fetch_certificate_events(source).await?;
    info!(
        redemption_set = events.redemption_set.len(),
        batch_minted = events.batch_minted.len(),
        mints = events.mints.len(),
        claims = events.claims.len(),
        "certificate events ingested"
    );
    Ok(engine.correlate(&events))
}

/// Correlation bound to one event source.
pub struct CorrelationService<S: EventSource + ?Sized> {
    source: Arc<S>,
    engine: CorrelationEngine,
}

impl<S: EventSource + ?Sized> CorrelationService<S> {
    /// Creates a service with the default claim decoder.
    pub fn new(source: Arc<S>) -> Self {
        Self::with_engine(source, CorrelationEngine::default())
    }

    /// Creates a service with a custom engine.
    pub fn with_engine(source: Arc<S>, engine: CorrelationEngine) -> Self {
        Self { source, engine }
    }

    /// Runs one correlation pass under the caller's `run_id`.
    #[instrument(skip(self, run_id), fields(run_id = %run_id))]
    pub async fn run(&self, run_id: Uuid) -> Result<CorrelationOutput, CorrelationError> {
        let output = fetch_and_correlate(self.source.as_ref(), &self.engine).await?;
        let stats = &output.stats;
        info!(
            batches = stats.batches,
            certificates = stats.certificates,
            claims = stats.claims,
            decoded = stats.claims_decoded,
            decode_failures = stats.decode_failures,
            orphan_batch_minted = stats.orphan_batch_minted,
            "correlation complete"
        );
        Ok(output)
    }
}
