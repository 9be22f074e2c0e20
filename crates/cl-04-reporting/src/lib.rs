//! # CL-04 Reporting - Totals and Table Output
//!
//! **Component ID:** 04
//! **Status:** Production-Ready
//!
//! ## Purpose
//!
//! - [`aggregate`]: minted and claimed totals over the derived tables, in
//!   512-bit arithmetic.
//! - [`TableWriter`]: CSV output of every table, one file per table, with
//!   per-table failure reporting.
//!
//! ## Usage Example
//!
//! ```ignore
//! use cl_04_reporting::prelude::*;
//!
//! let totals = aggregate(&output.certificates, &output.claims);
//! let outcomes = TableWriter::new("out").write_all(&output, None);
//! let failed = outcomes.iter().filter(|o| o.is_err()).count();
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregator;
pub mod writer;

pub use aggregator::{aggregate, ValueTotals};
pub use writer::{OutputWriteFailure, Table, TableOutcome, TableWriter, TableWritten, TabularRow};

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::aggregator::{aggregate, ValueTotals};
    pub use crate::writer::{OutputWriteFailure, Table, TableOutcome, TableWriter, TableWritten, TabularRow};
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
