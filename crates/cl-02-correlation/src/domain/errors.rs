//! Correlation error types.

use shared_types::SourceError;
use thiserror::Error;

/// Errors that abort a correlation run.
///
/// Unmatched keys and undecodable claim payloads are not errors; they show
/// up as missing rows or as the decode-failure marker.
#[derive(Debug, Error)]
pub enum CorrelationError {
    /// An event collection could not be retrieved. Not retried here.
    #[error("event source failed: {0}")]
    Source(#[from] SourceError),
}
