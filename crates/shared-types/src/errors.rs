//! # Error Types
//!
//! Errors shared across crates: primitive parsing, event source failures and
//! tabular record parsing.

use thiserror::Error;

use crate::events::EventKind;

/// Errors from parsing ledger primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrimitiveError {
    /// Input was not valid hex.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Input decoded to the wrong number of bytes.
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Input was not an unsigned integer that fits in 256 bits.
    #[error("invalid unsigned integer: {0:?}")]
    InvalidUint(String),
}

/// Failures of an external collaborator (event source or metadata accessor).
///
/// Every variant is fatal to a run. Retry policy belongs to the collaborator,
/// never to the consumer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The collaborator could not be reached or returned a transport error.
    #[error("source unavailable ({resource}): {message}")]
    Unavailable { resource: String, message: String },

    /// The collaborator answered, but a record could not be understood.
    #[error("malformed record from {resource}: {message}")]
    Malformed { resource: String, message: String },

    /// A record of a different kind was returned for a kind-specific query.
    #[error("unexpected event kind: expected {expected}, got {actual}")]
    UnexpectedKind {
        expected: EventKind,
        actual: EventKind,
    },
}

impl SourceError {
    /// Shorthand for [`SourceError::Unavailable`].
    pub fn unavailable(resource: impl Into<String>, message: impl ToString) -> Self {
        Self::Unavailable {
            resource: resource.into(),
            message: message.to_string(),
        }
    }

    /// Shorthand for [`SourceError::Malformed`].
    pub fn malformed(resource: impl Into<String>, message: impl ToString) -> Self {
        Self::Malformed {
            resource: resource.into(),
            message: message.to_string(),
        }
    }
}

/// Errors from parsing CSV text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TabularError {
    /// A quoted field was still open at end of input.
    #[error("unterminated quoted field starting on line {line}")]
    UnterminatedQuote { line: usize },

    /// A quote appeared in the middle of an unquoted field.
    #[error("unexpected quote on line {line}")]
    UnexpectedQuote { line: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_display() {
        let err = SourceError::unavailable("ClaimSingle", "connection refused");
        assert_eq!(
            err.to_string(),
            "source unavailable (ClaimSingle): connection refused"
        );

        let err = SourceError::UnexpectedKind {
            expected: EventKind::TransferSingle,
            actual: EventKind::ClaimSingle,
        };
        assert!(err.to_string().contains("TransferSingle"));
    }
}
