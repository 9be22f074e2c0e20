//! Settlement error types.

use std::path::PathBuf;

use shared_types::{SourceError, TabularError};
use thiserror::Error;

/// Failures of the cache artifact.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The artifact could not be opened, read or appended to.
    #[error("cache artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The artifact is not valid CSV.
    #[error("cache artifact {path}: {source}")]
    Tabular {
        path: PathBuf,
        #[source]
        source: TabularError,
    },

    /// A row has the wrong shape or an unparseable field.
    #[error("cache artifact {path}, row {row}: {message}")]
    MalformedRow {
        path: PathBuf,
        row: usize,
        message: String,
    },
}

/// Errors that abort a reconciliation run.
///
/// Amount mismatches and invalid agreements are reported in the
/// [`SettlementReport`](super::SettlementReport), never raised.
#[derive(Debug, Error)]
pub enum SettlementError {
    /// The event source or the metadata accessor failed.
    #[error("settlement source failed: {0}")]
    Source(#[from] SourceError),

    /// The cache artifact failed.
    #[error("settlement cache failed: {0}")]
    Cache(#[from] CacheError),
}
