//! # Error Types
//!
//! Structural errors from the ABI reader and per-schema mismatches. Neither
//! ever escapes [`crate::ClaimPayloadDecoder::decode`]; they exist so each
//! failed attempt can be logged with a reason.

use thiserror::Error;

/// The blob does not follow the string-tuple layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    /// Not enough bytes for the next read.
    #[error("truncated payload: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    /// The outer head does not point at a tuple right after it.
    #[error("unexpected outer offset {0:#x}")]
    OuterOffset(usize),

    /// First member offset differs from the head size of this arity.
    #[error("head size mismatch: expected first offset {expected:#x}, got {actual:#x}")]
    HeadSize { expected: usize, actual: usize },

    /// Member offset is not word aligned.
    #[error("member {index} offset {offset:#x} is not word aligned")]
    Misaligned { index: usize, offset: usize },

    /// Member offset points back into the head or a previous member.
    #[error("member {index} offset {offset:#x} overlaps earlier data")]
    Overlapping { index: usize, offset: usize },

    /// An offset or length word does not fit the address space.
    #[error("offset or length word at {at:#x} overflows")]
    ValueOverflow { at: usize },

    /// A member is not valid UTF-8.
    #[error("member {index} is not valid UTF-8")]
    InvalidUtf8 { index: usize },
}

/// Why one candidate schema did not apply to a blob.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaMismatch {
    /// Outer structure does not match the schema's tuple.
    #[error("abi layout: {0}")]
    Layout(#[from] AbiError),

    /// The embedded text is not valid JSON of the expected shape.
    #[error("embedded record: {0}")]
    EmbeddedRecord(String),

    /// The embedded text is valid JSON but not an object.
    #[error("embedded record is not a JSON object")]
    EmbeddedNotObject,
}
