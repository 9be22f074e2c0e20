//! # CL-01 Claim Decoding - Versioned Claim Metadata
//!
//! **Component ID:** 01
//! **Status:** Production-Ready
//!
//! ## Purpose
//!
//! Claim events carry an opaque `claimData` blob whose layout changed twice
//! over the ledger's history. This crate recognizes the three layouts and
//! turns a blob into a [`ClaimData`] record, or into the decode-failure
//! marker [`ClaimDecode::Undecodable`].
//!
//! ## Schemas
//!
//! | Schema | Tuple members | Missing fields |
//! |--------|---------------|----------------|
//! | V3 | 8 strings | `location` |
//! | V1 | 6 strings | `region`, `consumptionEntityID`, `proofID` |
//! | V2 | 1 string holding a JSON object | keys absent from the object |
//!
//! Attempt order is **V3 → V1 → V2** ([`ClaimSchema::FALLBACK_ORDER`]).
//!
//! ## Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | Decoding never fails to the caller | `decoder.rs` - `ClaimPayloadDecoder::decode()` |
//! | Disjoint layouts (arity signature) | `abi.rs` - `decode_string_tuple()` first-offset check |
//! | No partial records | `schemas.rs` - all members or `SchemaMismatch` |
//! | Idempotent | decoder holds no mutable state |
//!
//! ## Usage Example
//!
//! ```ignore
//! use cl_01_claim_decoding::prelude::*;
//!
//! let decoder = ClaimPayloadDecoder::new();
//! match decoder.decode(claim_data.as_slice()) {
//!     ClaimDecode::Decoded { schema, data } => println!("{schema}: {}", data.beneficiary),
//!     ClaimDecode::Undecodable => println!("unknown layout"),
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod abi;
pub mod decoder;
pub mod domain;
pub mod errors;
pub mod schemas;

pub use decoder::ClaimPayloadDecoder;
pub use domain::{ClaimData, ClaimDecode, ClaimSchema};
pub use errors::{AbiError, SchemaMismatch};

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::abi::{decode_string_tuple, encode_string_tuple};
    pub use crate::decoder::ClaimPayloadDecoder;
    pub use crate::domain::{ClaimData, ClaimDecode, ClaimSchema};
    pub use crate::errors::{AbiError, SchemaMismatch};
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
