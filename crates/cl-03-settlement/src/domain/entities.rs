//! # Domain Entities
//!
//! Agreement metadata, the raw agreement event views and the reconciliation
//! report.

use serde::{Deserialize, Serialize};
use shared_types::{
    uint_string, Address, AgreementClaimedArgs, AgreementDeployedArgs, AgreementFilledArgs,
    AgreementSignedArgs, LedgerEvent, TxHash, U256,
};

/// Point-lookup result of the agreement metadata accessor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementData {
    pub buyer: Address,
    pub seller: Address,
    #[serde(with = "uint_string")]
    pub amount: U256,
    #[serde(default)]
    pub metadata: String,
    pub valid: bool,
}

/// One cache entry: the metadata plus where the agreement was deployed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedAgreement {
    /// Deployment block of the agreement.
    pub block_id: u64,
    pub address: Address,
    pub data: AgreementData,
}

/// A valid, deployed agreement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agreement {
    pub agreement_address: Address,
    pub buyer: Address,
    pub seller: Address,
    pub amount: U256,
    pub metadata: String,
    pub valid: bool,
    pub block_number: u64,
    pub transaction_hash: TxHash,
}

impl Agreement {
    pub(crate) fn from_cached(entry: &CachedAgreement, transaction_hash: TxHash) -> Self {
        Self {
            agreement_address: entry.address,
            buyer: entry.data.buyer,
            seller: entry.data.seller,
            amount: entry.data.amount,
            metadata: entry.data.metadata.clone(),
            valid: entry.data.valid,
            block_number: entry.block_id,
            transaction_hash,
        }
    }
}

/// Raw view of an `AgreementSigned` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedAgreement {
    pub agreement: Address,
    pub signer: Address,
    pub amount: U256,
    pub transaction_hash: TxHash,
    pub block_number: u64,
}

/// Raw view of an `AgreementFilled` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilledAgreement {
    pub agreement: Address,
    pub certificate_id: U256,
    pub amount: U256,
    pub transaction_hash: TxHash,
    pub block_number: u64,
}

/// Raw view of an `AgreementClaimed` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimedAgreement {
    pub agreement: Address,
    pub certificate_id: U256,
    pub amount: U256,
    pub transaction_hash: TxHash,
    pub block_number: u64,
}

impl From<&LedgerEvent<AgreementSignedArgs>> for SignedAgreement {
    fn from(event: &LedgerEvent<AgreementSignedArgs>) -> Self {
        Self {
            agreement: event.args.agreement,
            signer: event.args.signer,
            amount: event.args.amount,
            transaction_hash: event.transaction_hash,
            block_number: event.block_number,
        }
    }
}

impl From<&LedgerEvent<AgreementFilledArgs>> for FilledAgreement {
    fn from(event: &LedgerEvent<AgreementFilledArgs>) -> Self {
        Self {
            agreement: event.args.agreement,
            certificate_id: event.args.certificate_id,
            amount: event.args.amount,
            transaction_hash: event.transaction_hash,
            block_number: event.block_number,
        }
    }
}

impl From<&LedgerEvent<AgreementClaimedArgs>> for ClaimedAgreement {
    fn from(event: &LedgerEvent<AgreementClaimedArgs>) -> Self {
        Self {
            agreement: event.args.agreement,
            certificate_id: event.args.certificate_id,
            amount: event.args.amount,
            transaction_hash: event.transaction_hash,
            block_number: event.block_number,
        }
    }
}

/// Signed and filled amounts disagree for one agreement.
///
/// Diagnostic only. Both amounts stay untouched in their raw views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountMismatch {
    pub agreement: Address,
    pub signed_amount: U256,
    pub filled_amount: U256,
    pub signed_tx: TxHash,
    pub filled_tx: TxHash,
}

/// The four agreement event collections.
#[derive(Debug, Clone, Default)]
pub struct AgreementEvents {
    pub deployed: Vec<LedgerEvent<AgreementDeployedArgs>>,
    pub signed: Vec<LedgerEvent<AgreementSignedArgs>>,
    pub filled: Vec<LedgerEvent<AgreementFilledArgs>>,
    pub claimed: Vec<LedgerEvent<AgreementClaimedArgs>>,
}

/// Run-scoped counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettlementStats {
    pub deployed_events: usize,
    pub signed_events: usize,
    pub filled_events: usize,
    pub claimed_events: usize,
    /// Addresses answered by the cache without an accessor call.
    pub cache_hits: usize,
    /// Addresses fetched from the accessor and appended to the cache.
    pub accessor_calls: usize,
    /// Signed/filled/claimed events for addresses never deployed.
    pub unknown_agreement_events: usize,
    /// Signed/filled/claimed events dropped because the agreement is invalid.
    pub excluded_events: usize,
}

/// Outcome of one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettlementReport {
    /// Valid agreements, in deployment order.
    pub agreements: Vec<Agreement>,
    pub signed: Vec<SignedAgreement>,
    pub filled: Vec<FilledAgreement>,
    pub claimed: Vec<ClaimedAgreement>,
    pub mismatches: Vec<AmountMismatch>,
    /// Deployed agreements the accessor flagged invalid.
    pub excluded: Vec<Address>,
    pub stats: SettlementStats,
}
