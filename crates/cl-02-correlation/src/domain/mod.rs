//! Domain layer for certificate correlation.

pub mod engine;
pub mod entities;
pub mod errors;
pub mod index;

pub use engine::CorrelationEngine;
pub use entities::*;
pub use errors::CorrelationError;
pub use index::KeyedIndex;
