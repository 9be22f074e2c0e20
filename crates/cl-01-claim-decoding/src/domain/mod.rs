//! # Domain Layer
//!
//! Pure claim metadata types. No I/O.

pub mod entities;

pub use entities::*;
