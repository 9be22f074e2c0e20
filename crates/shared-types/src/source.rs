//! # Event Source Port
//!
//! The event log lives outside this workspace. Consumers see it only through
//! [`EventSource`]: one query per event kind, returning records in arrival
//! order. Retry, paging and timeouts are the implementor's business.
//!
//! [`InMemoryEventSource`] is the fixture implementation used by tests and
//! by callers that already hold the records.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

use crate::errors::SourceError;
use crate::events::{typed_events, EventArgs, EventFilter, EventKind, EventRecord, LedgerEvent, RawEvent};

/// Supplier of raw event records, one kind at a time.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Returns every record of `kind` that passes `filter`, in arrival order.
    async fn query_events(
        &self,
        kind: EventKind,
        filter: Option<EventFilter>,
    ) -> Result<Vec<RawEvent>, SourceError>;
}

/// Queries one kind and narrows the records to its argument struct.
pub async fn fetch_typed<A, S>(
    source: &S,
    filter: Option<EventFilter>,
) -> Result<Vec<LedgerEvent<A>>, SourceError>
where
    A: EventRecord,
    S: EventSource + ?Sized,
{
    let raw = source.query_events(A::KIND, filter).await?;
    typed_events(raw)
}

/// Event source backed by in-memory collections.
#[derive(Debug, Default)]
pub struct InMemoryEventSource {
    events: HashMap<EventKind, Vec<RawEvent>>,
    unavailable: HashSet<EventKind>,
    queries: Mutex<Vec<(EventKind, Option<EventFilter>)>>,
}

impl InMemoryEventSource {
    /// Creates an empty source; every kind returns no records.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record to its kind's collection.
    pub fn push(&mut self, event: RawEvent) {
        self.events.entry(event.kind()).or_default().push(event);
    }

    /// Builder-style [`Self::push`] from parts.
    #[must_use]
    pub fn with_event(mut self, block_number: u64, transaction_hash: crate::TxHash, args: impl Into<EventArgs>) -> Self {
        let log_index = self
            .events
            .values()
            .flatten()
            .filter(|e| e.block_number == block_number)
            .count() as u32;
        self.push(RawEvent {
            block_number,
            log_index,
            transaction_hash,
            args: args.into(),
        });
        self
    }

    /// Makes every query for `kind` fail with [`SourceError::Unavailable`].
    #[must_use]
    pub fn failing(mut self, kind: EventKind) -> Self {
        self.unavailable.insert(kind);
        self
    }

    /// Queries received so far, in order.
    #[must_use]
    pub fn queries(&self) -> Vec<(EventKind, Option<EventFilter>)> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl EventSource for InMemoryEventSource {
    async fn query_events(
        &self,
        kind: EventKind,
        filter: Option<EventFilter>,
    ) -> Result<Vec<RawEvent>, SourceError> {
        self.queries.lock().push((kind, filter));

        if self.unavailable.contains(&kind) {
            return Err(SourceError::unavailable(kind.as_str(), "in-memory source marked unavailable"));
        }

        Ok(self
            .events
            .get(&kind)
            .map(|events| {
                events
                    .iter()
                    .filter(|e| filter.map_or(true, |f| f.matches(e)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
