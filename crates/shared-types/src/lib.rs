//! # Shared Types Crate
//!
//! Ledger primitives and the raw event record shape shared by every crate
//! in the workspace.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Event records and their argument structs are
//!   defined once, here. Correlation and settlement consume typed views of them.
//! - **Integer Identity**: Certificate ids, values and topics are parsed into
//!   `U256` at the ingest boundary, so `"007"`, `"7"` and `"0x07"` are the same id.
//! - **Port, Not Client**: The event log is reached only through the
//!   [`EventSource`] trait; retrieval policy belongs to its implementor.
//! - **Canonical Output**: Integers render as decimal, addresses and hashes as
//!   full lowercase `0x` hex.

pub mod entities;
pub mod errors;
pub mod events;
pub mod source;
pub mod tabular;

pub use entities::*;
pub use errors::*;
pub use events::*;
pub use source::{fetch_typed, EventSource, InMemoryEventSource};
