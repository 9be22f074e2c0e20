//! # Adapter Implementations
//!
//! File-backed implementations of the outbound ports used by the binary.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 OUTER LAYER (Adapters)                   │
//! │   JsonEventSource            JsonAgreementAccessor       │
//! │          ↓ implements                ↓ implements        │
//! │   shared_types::EventSource  cl_03::AgreementDataAccessor│
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod json_agreements;
pub mod json_source;

pub use json_agreements::*;
pub use json_source::*;
