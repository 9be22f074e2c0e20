//! # Domain Entities
//!
//! The three derived tables and the run statistics.
//!
//! Rows are identified by dense row ids assigned in emission order. A
//! Certificate row lists the Claim rows produced while it was matched, and
//! a Batch row lists its Certificate rows, so the tables cross-reference by
//! position rather than by on-ledger ids (which are not unique per row).

use cl_01_claim_decoding::{ClaimDecode, ClaimSchema};
use shared_types::{
    Address, Bytes, CertificateBatchMintedArgs, ClaimSingleArgs, LedgerEvent, RedemptionSetArgs,
    TransferSingleArgs, TxHash, U256,
};
use std::fmt;

/// Position of a row in the Certificate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CertificateRowId(pub usize);

/// Position of a row in the Claim table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClaimRowId(pub usize);

impl fmt::Display for CertificateRowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ClaimRowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One redemption statement and the certificates minted under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub batch_id: String,
    pub redemption_statement: String,
    pub storage_pointer: String,
    /// Certificate rows produced for this batch, in emission order.
    pub certificate_ids: Vec<CertificateRowId>,
    pub transaction_hash: TxHash,
    pub block_number: u64,
}

/// One mint of a certificate id under a batch.
///
/// The same `token_id` may appear in several rows when the log lists it
/// under several batches or mints it more than once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub id: CertificateRowId,
    pub token_id: U256,
    pub batch_id: String,
    pub value: U256,
    pub operator: Address,
    pub from: Address,
    pub to: Address,
    pub transaction_hash: TxHash,
    pub block_number: u64,
    /// Claim rows attached to this certificate row.
    pub claim_ids: Vec<ClaimRowId>,
}

/// One claim against a certificate row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub id: ClaimRowId,
    pub token_id: U256,
    /// Certificate row this claim is attached to.
    pub certificate_id: CertificateRowId,
    pub claim_issuer: Address,
    pub claim_subject: Address,
    pub topic: U256,
    pub value: U256,
    pub claim_data: Bytes,
    pub claim_data_decoded: ClaimDecode,
    pub transaction_hash: TxHash,
    pub block_number: u64,
}

/// The four event collections the engine joins.
#[derive(Debug, Clone, Default)]
pub struct CertificateEvents {
    pub redemption_set: Vec<LedgerEvent<RedemptionSetArgs>>,
    pub batch_minted: Vec<LedgerEvent<CertificateBatchMintedArgs>>,
    /// Transfers from the zero address only.
    pub mints: Vec<LedgerEvent<TransferSingleArgs>>,
    pub claims: Vec<LedgerEvent<ClaimSingleArgs>>,
}

impl CertificateEvents {
    /// Total number of input records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.redemption_set.len() + self.batch_minted.len() + self.mints.len() + self.claims.len()
    }

    /// Returns true if every collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Run-scoped counters, returned with the tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrelationStats {
    pub redemption_events: usize,
    pub batch_minted_events: usize,
    pub mint_events: usize,
    pub claim_events: usize,
    pub batches: usize,
    pub certificates: usize,
    pub claims: usize,
    /// Claim rows whose payload decoded under some schema.
    pub claims_decoded: usize,
    /// Claim rows carrying the decode-failure marker.
    pub decode_failures: usize,
    pub decoded_v1: usize,
    pub decoded_v2: usize,
    pub decoded_v3: usize,
    /// Batch-minted events whose batch id has no redemption-set event.
    pub orphan_batch_minted: usize,
    /// Redemption-set events that matched no batch-minted event.
    pub empty_batches: usize,
}

impl CorrelationStats {
    pub(crate) fn record_decode(&mut self, outcome: &ClaimDecode) {
        match outcome.schema() {
            Some(ClaimSchema::V1) => self.decoded_v1 += 1,
            Some(ClaimSchema::V2) => self.decoded_v2 += 1,
            Some(ClaimSchema::V3) => self.decoded_v3 += 1,
            None => {
                self.decode_failures += 1;
                return;
            }
        }
        self.claims_decoded += 1;
    }
}

/// The derived tables of one correlation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrelationOutput {
    pub batches: Vec<Batch>,
    pub certificates: Vec<Certificate>,
    pub claims: Vec<Claim>,
    pub stats: CorrelationStats,
}

impl CorrelationOutput {
    /// Looks up a Certificate row.
    #[must_use]
    pub fn certificate(&self, id: CertificateRowId) -> Option<&Certificate> {
        self.certificates.get(id.0)
    }

    /// Looks up a Claim row.
    #[must_use]
    pub fn claim(&self, id: ClaimRowId) -> Option<&Claim> {
        self.claims.get(id.0)
    }

    /// Claim rows attached to a Certificate row.
    pub fn claims_of<'a>(&'a self, certificate: &'a Certificate) -> impl Iterator<Item = &'a Claim> + 'a {
        certificate.claim_ids.iter().filter_map(|id| self.claim(*id))
    }

    /// Certificate rows of a Batch row.
    pub fn certificates_of<'a>(&'a self, batch: &'a Batch) -> impl Iterator<Item = &'a Certificate> + 'a {
        batch.certificate_ids.iter().filter_map(|id| self.certificate(*id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cl_01_claim_decoding::ClaimData;

    #[test]
    fn test_record_decode_counts() {
        let mut stats = CorrelationStats::default();
        stats.record_decode(&ClaimDecode::Decoded {
            schema: ClaimSchema::V1,
            data: ClaimData::default(),
        });
        stats.record_decode(&ClaimDecode::Undecodable);
        assert_eq!(stats.claims_decoded, 1);
        assert_eq!(stats.decoded_v1, 1);
        assert_eq!(stats.decode_failures, 1);
    }

    #[test]
    fn test_row_id_display() {
        assert_eq!(CertificateRowId(3).to_string(), "3");
        assert_eq!(ClaimRowId(0).to_string(), "0");
    }
}
