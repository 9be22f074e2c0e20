//! # Correlation Engine
//!
//! Joins the four certificate event families into Batch, Certificate and
//! Claim rows.
//!
//! ## Matching Stages
//!
//! ```text
//! RedemptionSet (sorted by block)
//!   └─ CertificateBatchMinted   batch_id == B      (string equality)
//!        └─ certificate id C in certificate_ids
//!             └─ mint            id == C           (integer equality)
//!                  └─ ClaimSingle id == C          (integer equality)
//! ```
//!
//! Every stage takes all matches. Nothing is deduplicated: two mints of the
//! same id give two Certificate rows, and each of them gets its own copy of
//! every matching claim.

use std::collections::{HashMap, HashSet};

use cl_01_claim_decoding::{ClaimDecode, ClaimPayloadDecoder};
use shared_types::{LedgerEvent, RedemptionSetArgs, U256};
use tracing::{debug, trace};

use super::entities::{
    Batch, Certificate, CertificateEvents, CertificateRowId, Claim, ClaimRowId, CorrelationOutput,
};
use super::index::KeyedIndex;

/// Single-pass correlator. Holds only the claim decoder.
#[derive(Debug, Clone, Default)]
pub struct CorrelationEngine {
    decoder: ClaimPayloadDecoder,
}

impl CorrelationEngine {
    /// Creates an engine decoding claims with `decoder`.
    #[must_use]
    pub fn new(decoder: ClaimPayloadDecoder) -> Self {
        Self { decoder }
    }

    /// Builds the derived tables from one set of event collections.
    ///
    /// Row ids are assigned in emission order, so the same input always
    /// produces the same ids.
    pub fn correlate(&self, events: &CertificateEvents) -> CorrelationOutput {
        let batch_index = KeyedIndex::build(&events.batch_minted, |e| e.args.batch_id.clone());
        let mint_index = KeyedIndex::build(&events.mints, |e| e.args.id);
        let claim_index = KeyedIndex::build(&events.claims, |e| e.args.id);
        debug!(
            batch_keys = batch_index.key_count(),
            mint_keys = mint_index.key_count(),
            mints = mint_index.record_count(),
            claim_keys = claim_index.key_count(),
            claims = claim_index.record_count(),
            "indices built"
        );

        let mut pass = Pass {
            events,
            claim_index,
            decoded: HashMap::new(),
            out: CorrelationOutput::default(),
        };
        pass.out.stats.redemption_events = events.redemption_set.len();
        pass.out.stats.batch_minted_events = events.batch_minted.len();
        pass.out.stats.mint_events = events.mints.len();
        pass.out.stats.claim_events = events.claims.len();
        pass.out.stats.orphan_batch_minted = count_orphans(events);

        for redemption in sorted_by_block(&events.redemption_set) {
            let batch_id = redemption.args.batch_id.as_str();
            let mut certificate_ids = Vec::new();

            for &minted_pos in batch_index.get(batch_id) {
                let minted = &events.batch_minted[minted_pos];

                for token_id in &minted.args.certificate_ids {
                    for &mint_pos in mint_index.get(token_id) {
                        let row_id = self.emit_certificate(&mut pass, batch_id, *token_id, mint_pos);
                        certificate_ids.push(row_id);
                    }
                }
            }

            if certificate_ids.is_empty() {
                pass.out.stats.empty_batches += 1;
            }
            debug!(
                batch_id = %batch_id,
                block = redemption.block_number,
                certificates = certificate_ids.len(),
                "batch correlated"
            );

            pass.out.batches.push(Batch {
                batch_id: redemption.args.batch_id.clone(),
                redemption_statement: redemption.args.redemption_statement.clone(),
                storage_pointer: redemption.args.storage_pointer.clone(),
                certificate_ids,
                transaction_hash: redemption.transaction_hash,
                block_number: redemption.block_number,
            });
        }

        let mut out = pass.out;
        out.stats.batches = out.batches.len();
        out.stats.certificates = out.certificates.len();
        out.stats.claims = out.claims.len();
        out
    }

    /// Emits the claim rows for one mint match, then its certificate row.
    fn emit_certificate(
        &self,
        pass: &mut Pass<'_>,
        batch_id: &str,
        token_id: U256,
        mint_pos: usize,
    ) -> CertificateRowId {
        let mint = &pass.events.mints[mint_pos];
        let certificate_id = CertificateRowId(pass.out.certificates.len());
        let mut claim_ids = Vec::new();

        for &claim_pos in pass.claim_index.get(&token_id) {
            let event = &pass.events.claims[claim_pos];
            let outcome = pass
                .decoded
                .entry(claim_pos)
                .or_insert_with(|| self.decoder.decode(event.args.claim_data.as_slice()))
                .clone();
            pass.out.stats.record_decode(&outcome);

            let claim_id = ClaimRowId(pass.out.claims.len());
            trace!(
                claim = %claim_id,
                certificate = %certificate_id,
                token_id = %token_id,
                decoded = outcome.is_decoded(),
                "claim attached"
            );

            pass.out.claims.push(Claim {
                id: claim_id,
                token_id,
                certificate_id,
                claim_issuer: event.args.claim_issuer,
                claim_subject: event.args.claim_subject,
                topic: event.args.topic,
                value: event.args.value,
                claim_data: event.args.claim_data.clone(),
                claim_data_decoded: outcome,
                transaction_hash: event.transaction_hash,
                block_number: event.block_number,
            });
            claim_ids.push(claim_id);
        }

        pass.out.certificates.push(Certificate {
            id: certificate_id,
            token_id,
            batch_id: batch_id.to_string(),
            value: mint.args.value,
            operator: mint.args.operator,
            from: mint.args.from,
            to: mint.args.to,
            transaction_hash: mint.transaction_hash,
            block_number: mint.block_number,
            claim_ids,
        });
        certificate_id
    }
}

/// State threaded through one `correlate` call.
struct Pass<'a> {
    events: &'a CertificateEvents,
    claim_index: KeyedIndex<U256>,
    /// A claim event is decoded once even when it lands in several rows.
    decoded: HashMap<usize, ClaimDecode>,
    out: CorrelationOutput,
}

/// Redemption events in ascending block order, ties kept in arrival order.
fn sorted_by_block(events: &[LedgerEvent<RedemptionSetArgs>]) -> Vec<&LedgerEvent<RedemptionSetArgs>> {
    let mut sorted: Vec<_> = events.iter().collect();
    sorted.sort_by_key(|e| e.block_number);
    sorted
}

fn count_orphans(events: &CertificateEvents) -> usize {
    let redeemed: HashSet<&str> = events
        .redemption_set
        .iter()
        .map(|e| e.args.batch_id.as_str())
        .collect();

    events
        .batch_minted
        .iter()
        .filter(|e| {
            let orphan = !redeemed.contains(e.args.batch_id.as_str());
            if orphan {
                debug!(
                    batch_id = %e.args.batch_id,
                    block = e.block_number,
                    "batch-minted event has no redemption statement"
                );
            }
            orphan
        })
        .count()
}
