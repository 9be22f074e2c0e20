//! # Adapters Layer
//!
//! | Adapter | Port | Use |
//! |---------|------|-----|
//! | [`CsvCacheStore`] | `CacheStore` | append-only cache artifact |
//! | [`InMemoryCacheStore`] | `CacheStore` | tests, cache disabled |
//! | [`InMemoryAgreementAccessor`] | `AgreementDataAccessor` | fixtures, call counting |

pub mod csv_store;
pub mod memory;

pub use csv_store::{CsvCacheStore, CACHE_HEADER};
pub use memory::{InMemoryAgreementAccessor, InMemoryCacheStore};
