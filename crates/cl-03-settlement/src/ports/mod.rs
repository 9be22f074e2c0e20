//! # Ports Layer
//!
//! Driven ports of the settlement reconciler.
//!
//! - [`AgreementDataAccessor`]: per-address agreement metadata lookup.
//! - [`CacheStore`]: persistence of resolved agreements across runs.

pub mod outbound;

pub use outbound::*;
