//! # JSON Event Source
//!
//! Reads an event export directory with one JSON array of raw records per
//! event kind:
//!
//! ```text
//! events/
//!   RedemptionSet.json
//!   CertificateBatchMinted.json
//!   TransferSingle.json
//!   ClaimSingle.json
//!   Agreement*.json        (settlement runs only)
//! ```
//!
//! A missing file is an unavailable source, never an empty collection.

use std::path::PathBuf;

use async_trait::async_trait;
use shared_types::{EventFilter, EventKind, EventSource, RawEvent, SourceError};
use tracing::debug;

/// [`EventSource`] over a directory of JSON exports.
#[derive(Debug, Clone)]
pub struct JsonEventSource {
    events_dir: PathBuf,
}

impl JsonEventSource {
    pub fn new(events_dir: impl Into<PathBuf>) -> Self {
        Self {
            events_dir: events_dir.into(),
        }
    }

    /// Export file for one kind.
    pub fn path_of(&self, kind: EventKind) -> PathBuf {
        self.events_dir.join(format!("{}.json", kind.as_str()))
    }
}

#[async_trait]
impl EventSource for JsonEventSource {
    async fn query_events(
        &self,
        kind: EventKind,
        filter: Option<EventFilter>,
    ) -> Result<Vec<RawEvent>, SourceError> {
        let path = self.path_of(kind);
        let resource = path.display().to_string();

        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| SourceError::unavailable(resource.as_str(), e))?;
        let events: Vec<RawEvent> =
            serde_json::from_str(&text).map_err(|e| SourceError::malformed(resource.as_str(), e))?;

        if let Some(stray) = events.iter().find(|e| e.kind() != kind) {
            return Err(SourceError::UnexpectedKind {
                expected: kind,
                actual: stray.kind(),
            });
        }

        let total = events.len();
        let kept: Vec<RawEvent> = events
            .into_iter()
            .filter(|e| filter.map_or(true, |f| f.matches(e)))
            .collect();
        debug!(kind = %kind, total, kept = kept.len(), "export read");
        Ok(kept)
    }
}
