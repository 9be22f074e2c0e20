//! # Raw Event Records
//!
//! The event log is a set of per-kind collections of [`RawEvent`]s. Each
//! record carries the ledger position (block number, log index), the
//! transaction that emitted it and a kind-specific argument struct.
//!
//! ## Event Kinds
//!
//! | Kind | Family | Key |
//! |------|--------|-----|
//! | `RedemptionSet` | batch redemption | `batchId` (string) |
//! | `CertificateBatchMinted` | batch → certificates | `batchId` (string) |
//! | `TransferSingle` | minting (filtered `from == 0x0`) | `id` (integer) |
//! | `ClaimSingle` | claiming | `id` (integer) |
//! | `AgreementDeployed` / `Signed` / `Filled` / `Claimed` | settlement | `agreement` |
//!
//! ## JSON Shape
//!
//! ```text
//! { "blockNumber": 12, "logIndex": 0, "transactionHash": "0x..",
//!   "args": { "event": "ClaimSingle", "id": "7", "value": "400", ... } }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::{string_or_number, uint_string, uint_string_vec, Address, Bytes, TxHash, U256};
use crate::errors::SourceError;

/// Every event kind the indexer consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    RedemptionSet,
    CertificateBatchMinted,
    TransferSingle,
    ClaimSingle,
    AgreementDeployed,
    AgreementSigned,
    AgreementFilled,
    AgreementClaimed,
}

impl EventKind {
    /// Kinds joined by the certificate correlation.
    pub const CERTIFICATE_KINDS: [EventKind; 4] = [
        EventKind::RedemptionSet,
        EventKind::CertificateBatchMinted,
        EventKind::TransferSingle,
        EventKind::ClaimSingle,
    ];

    /// Kinds joined by the settlement reconciliation.
    pub const AGREEMENT_KINDS: [EventKind; 4] = [
        EventKind::AgreementDeployed,
        EventKind::AgreementSigned,
        EventKind::AgreementFilled,
        EventKind::AgreementClaimed,
    ];

    /// The on-ledger event name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RedemptionSet => "RedemptionSet",
            Self::CertificateBatchMinted => "CertificateBatchMinted",
            Self::TransferSingle => "TransferSingle",
            Self::ClaimSingle => "ClaimSingle",
            Self::AgreementDeployed => "AgreementDeployed",
            Self::AgreementSigned => "AgreementSigned",
            Self::AgreementFilled => "AgreementFilled",
            Self::AgreementClaimed => "AgreementClaimed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// ARGUMENT RECORDS
// =============================================================================

/// A batch's redemption statement was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionSetArgs {
    #[serde(with = "string_or_number")]
    pub batch_id: String,
    pub redemption_statement: String,
    pub storage_pointer: String,
}

/// Certificates were minted under a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateBatchMintedArgs {
    #[serde(with = "string_or_number")]
    pub batch_id: String,
    #[serde(with = "uint_string_vec")]
    pub certificate_ids: Vec<U256>,
}

/// Single-token transfer; a mint when `from` is the zero address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferSingleArgs {
    pub operator: Address,
    pub from: Address,
    pub to: Address,
    #[serde(with = "uint_string")]
    pub id: U256,
    #[serde(with = "uint_string")]
    pub value: U256,
}

/// A certificate's value was claimed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimSingleArgs {
    pub claim_issuer: Address,
    pub claim_subject: Address,
    #[serde(with = "uint_string")]
    pub topic: U256,
    #[serde(with = "uint_string")]
    pub id: U256,
    #[serde(with = "uint_string")]
    pub value: U256,
    pub claim_data: Bytes,
}

/// A purchase agreement contract was deployed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementDeployedArgs {
    pub agreement: Address,
}

/// An agreement was signed for an amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementSignedArgs {
    pub agreement: Address,
    pub signer: Address,
    #[serde(with = "uint_string")]
    pub amount: U256,
}

/// An agreement was filled with a certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementFilledArgs {
    pub agreement: Address,
    #[serde(with = "uint_string")]
    pub certificate_id: U256,
    #[serde(with = "uint_string")]
    pub amount: U256,
}

/// A filled agreement's certificate was claimed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementClaimedArgs {
    pub agreement: Address,
    #[serde(with = "uint_string")]
    pub certificate_id: U256,
    #[serde(with = "uint_string")]
    pub amount: U256,
}

/// Kind-specific arguments, tagged by event name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum EventArgs {
    RedemptionSet(RedemptionSetArgs),
    CertificateBatchMinted(CertificateBatchMintedArgs),
    TransferSingle(TransferSingleArgs),
    ClaimSingle(ClaimSingleArgs),
    AgreementDeployed(AgreementDeployedArgs),
    AgreementSigned(AgreementSignedArgs),
    AgreementFilled(AgreementFilledArgs),
    AgreementClaimed(AgreementClaimedArgs),
}

impl EventArgs {
    /// The kind these arguments belong to.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::RedemptionSet(_) => EventKind::RedemptionSet,
            Self::CertificateBatchMinted(_) => EventKind::CertificateBatchMinted,
            Self::TransferSingle(_) => EventKind::TransferSingle,
            Self::ClaimSingle(_) => EventKind::ClaimSingle,
            Self::AgreementDeployed(_) => EventKind::AgreementDeployed,
            Self::AgreementSigned(_) => EventKind::AgreementSigned,
            Self::AgreementFilled(_) => EventKind::AgreementFilled,
            Self::AgreementClaimed(_) => EventKind::AgreementClaimed,
        }
    }

    /// The sender address, for kinds that carry one.
    #[must_use]
    pub fn from_address(&self) -> Option<Address> {
        match self {
            Self::TransferSingle(args) => Some(args.from),
            _ => None,
        }
    }
}

// =============================================================================
// RAW AND TYPED RECORDS
// =============================================================================

/// One record of the event log, as returned by an event source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    /// Ledger sequence number. Used only for processing order.
    pub block_number: u64,
    /// Position within the block.
    #[serde(default)]
    pub log_index: u32,
    /// Transaction that emitted the event.
    pub transaction_hash: TxHash,
    /// Kind-specific arguments.
    pub args: EventArgs,
}

impl RawEvent {
    /// Kind of this record.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.args.kind()
    }

    /// Converts into a typed record, failing if the kind does not match.
    pub fn into_typed<A: EventRecord>(self) -> Result<LedgerEvent<A>, SourceError> {
        let actual = self.kind();
        let args = A::from_args(self.args).map_err(|_| SourceError::UnexpectedKind {
            expected: A::KIND,
            actual,
        })?;
        Ok(LedgerEvent {
            block_number: self.block_number,
            log_index: self.log_index,
            transaction_hash: self.transaction_hash,
            args,
        })
    }
}

/// An event record with its arguments already narrowed to one kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEvent<A> {
    pub block_number: u64,
    pub log_index: u32,
    pub transaction_hash: TxHash,
    pub args: A,
}

/// Argument structs that correspond to exactly one [`EventKind`].
pub trait EventRecord: Sized {
    /// The kind this struct is extracted from.
    const KIND: EventKind;

    /// Extracts the struct, handing the arguments back on a kind mismatch.
    fn from_args(args: EventArgs) -> Result<Self, EventArgs>;
}

macro_rules! event_record {
    ($($variant:ident => $args:ty),* $(,)?) => {
        $(
            impl EventRecord for $args {
                const KIND: EventKind = EventKind::$variant;

                fn from_args(args: EventArgs) -> Result<Self, EventArgs> {
                    match args {
                        EventArgs::$variant(inner) => Ok(inner),
                        other => Err(other),
                    }
                }
            }

            impl From<$args> for EventArgs {
                fn from(args: $args) -> Self {
                    EventArgs::$variant(args)
                }
            }
        )*
    };
}

event_record! {
    RedemptionSet => RedemptionSetArgs,
    CertificateBatchMinted => CertificateBatchMintedArgs,
    TransferSingle => TransferSingleArgs,
    ClaimSingle => ClaimSingleArgs,
    AgreementDeployed => AgreementDeployedArgs,
    AgreementSigned => AgreementSignedArgs,
    AgreementFilled => AgreementFilledArgs,
    AgreementClaimed => AgreementClaimedArgs,
}

/// Narrows a whole collection to one kind.
pub fn typed_events<A: EventRecord>(raw: Vec<RawEvent>) -> Result<Vec<LedgerEvent<A>>, SourceError> {
    raw.into_iter().map(RawEvent::into_typed).collect()
}

// =============================================================================
// QUERY FILTER
// =============================================================================

/// Optional restriction applied by an event source to a kind query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Only records whose sender equals this address. Kinds without a sender
    /// are not affected.
    pub from: Option<Address>,
    /// Inclusive lower block bound.
    pub from_block: Option<u64>,
    /// Inclusive upper block bound.
    pub to_block: Option<u64>,
}

impl EventFilter {
    /// Transfers out of the zero address, i.e. mints.
    #[must_use]
    pub fn minted() -> Self {
        Self {
            from: Some(Address::ZERO),
            ..Self::default()
        }
    }

    /// Returns true if the record passes this filter.
    #[must_use]
    pub fn matches(&self, event: &RawEvent) -> bool {
        if let (Some(wanted), Some(actual)) = (self.from, event.args.from_address()) {
            if wanted != actual {
                return false;
            }
        }
        if self.from_block.is_some_and(|lo| event.block_number < lo) {
            return false;
        }
        if self.to_block.is_some_and(|hi| event.block_number > hi) {
            return false;
        }
        true
    }
}
