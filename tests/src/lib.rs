//! # Certificate Ledger Test Suite
//!
//! Cross-crate scenarios. Unit tests live next to the code in each crate.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── end_to_end.rs       # events → correlation → tables
//!     └── settlement_flow.rs  # agreements, cache artifact, mismatches
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p cl-tests
//! cargo test -p cl-tests integration::settlement_flow::
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;
