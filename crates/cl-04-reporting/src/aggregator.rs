//! # Report Aggregator
//!
//! Sums minted and claimed values over the derived tables. Totals are kept
//! in 512 bits, so adding any number of 256-bit values cannot overflow.

use cl_02_correlation::{Certificate, Claim};
use shared_types::U512;

/// Minted and claimed totals over one run's tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValueTotals {
    /// Sum of `value` over every Certificate row.
    pub minted: U512,
    /// Sum of `value` over every Claim row.
    pub claimed: U512,
    pub certificate_rows: usize,
    pub claim_rows: usize,
}

impl ValueTotals {
    /// Minted minus claimed, or `None` when more was claimed than minted.
    ///
    /// Over-claiming is a producer-side inconsistency; it is reported, not
    /// clamped.
    #[must_use]
    pub fn outstanding(&self) -> Option<U512> {
        self.minted.checked_sub(self.claimed)
    }
}

/// Computes the totals. Duplicate rows count every time they appear.
#[must_use]
pub fn aggregate(certificates: &[Certificate], claims: &[Claim]) -> ValueTotals {
    ValueTotals {
        minted: certificates
            .iter()
            .fold(U512::zero(), |acc, c| acc + U512::from(c.value)),
        claimed: claims
            .iter()
            .fold(U512::zero(), |acc, c| acc + U512::from(c.value)),
        certificate_rows: certificates.len(),
        claim_rows: claims.len(),
    }
}
