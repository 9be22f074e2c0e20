//! # Table Writer
//!
//! Writes the derived tables as CSV files into one output directory.
//!
//! | Table | File | Written when |
//! |-------|------|--------------|
//! | Batch | `batches.csv` | always |
//! | Certificate | `certificates.csv` | always |
//! | Claim | `claims.csv` | always |
//! | Agreement | `agreements.csv` | settlement ran |
//! | Amount mismatch | `mismatches.csv` | settlement ran |
//!
//! Each table is written on its own. A failure is returned for that table
//! and the remaining tables are still attempted.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use cl_02_correlation::{Batch, Certificate, Claim, CorrelationOutput};
use cl_03_settlement::{Agreement, AmountMismatch, SettlementReport};
use shared_types::tabular::format_record;
use thiserror::Error;
use tracing::{error, info};

/// Output tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Batches,
    Certificates,
    Claims,
    Agreements,
    Mismatches,
}

impl Table {
    /// File name inside the output directory.
    #[must_use]
    pub const fn file_name(&self) -> &'static str {
        match self {
            Self::Batches => "batches.csv",
            Self::Certificates => "certificates.csv",
            Self::Claims => "claims.csv",
            Self::Agreements => "agreements.csv",
            Self::Mismatches => "mismatches.csv",
        }
    }

    /// Label used in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Batches => "batches",
            Self::Certificates => "certificates",
            Self::Claims => "claims",
            Self::Agreements => "agreements",
            Self::Mismatches => "mismatches",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A table could not be persisted.
#[derive(Debug, Error)]
#[error("failed to write {table} table to {path}: {source}")]
pub struct OutputWriteFailure {
    pub table: Table,
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// A table that was persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableWritten {
    pub table: Table,
    pub path: PathBuf,
    pub rows: usize,
}

/// Per-table result of a write.
pub type TableOutcome = Result<TableWritten, OutputWriteFailure>;

/// A row type with a fixed column layout.
pub trait TabularRow {
    const TABLE: Table;
    const COLUMNS: &'static [&'static str];

    /// Field values in [`Self::COLUMNS`] order.
    fn fields(&self) -> Vec<String>;
}

fn row_ids<T: fmt::Display>(ids: &[T]) -> String {
    let joined: Vec<String> = ids.iter().map(ToString::to_string).collect();
    format!("[{}]", joined.join(","))
}

impl TabularRow for Batch {
    const TABLE: Table = Table::Batches;
    const COLUMNS: &'static [&'static str] = &[
        "batchId",
        "redemptionStatement",
        "storagePointer",
        "certificateIds",
        "transactionHash",
        "blockNumber",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.batch_id.clone(),
            self.redemption_statement.clone(),
            self.storage_pointer.clone(),
            row_ids(&self.certificate_ids),
            self.transaction_hash.to_string(),
            self.block_number.to_string(),
        ]
    }
}

impl TabularRow for Certificate {
    const TABLE: Table = Table::Certificates;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "tokenId",
        "batchId",
        "value",
        "operator",
        "from",
        "to",
        "transactionHash",
        "blockNumber",
        "claimIds",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.token_id.to_string(),
            self.batch_id.clone(),
            self.value.to_string(),
            self.operator.to_string(),
            self.from.to_string(),
            self.to.to_string(),
            self.transaction_hash.to_string(),
            self.block_number.to_string(),
            row_ids(&self.claim_ids),
        ]
    }
}

impl TabularRow for Claim {
    const TABLE: Table = Table::Claims;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "tokenId",
        "certificateId",
        "claimIssuer",
        "claimSubject",
        "topic",
        "value",
        "claimData",
        "claimDataDecoded",
        "transactionHash",
        "blockNumber",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.token_id.to_string(),
            self.certificate_id.to_string(),
            self.claim_issuer.to_string(),
            self.claim_subject.to_string(),
            self.topic.to_string(),
            self.value.to_string(),
            self.claim_data.to_hex(),
            self.claim_data_decoded.to_json(),
            self.transaction_hash.to_string(),
            self.block_number.to_string(),
        ]
    }
}

impl TabularRow for Agreement {
    const TABLE: Table = Table::Agreements;
    const COLUMNS: &'static [&'static str] =
        &["agreementAddress", "buyer", "seller", "amount", "metadata", "valid"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.agreement_address.to_string(),
            self.buyer.to_string(),
            self.seller.to_string(),
            self.amount.to_string(),
            self.metadata.clone(),
            self.valid.to_string(),
        ]
    }
}

impl TabularRow for AmountMismatch {
    const TABLE: Table = Table::Mismatches;
    const COLUMNS: &'static [&'static str] =
        &["agreement", "signedAmount", "filledAmount", "signedTx", "filledTx"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.agreement.to_string(),
            self.signed_amount.to_string(),
            self.filled_amount.to_string(),
            self.signed_tx.to_string(),
            self.filled_tx.to_string(),
        ]
    }
}

/// Writes tables into one directory.
#[derive(Debug, Clone)]
pub struct TableWriter {
    output_dir: PathBuf,
}

impl TableWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path a table is written to.
    pub fn path_of(&self, table: Table) -> PathBuf {
        self.output_dir.join(table.file_name())
    }

    /// Writes one table, replacing any earlier file.
    pub fn write_table<R: TabularRow>(&self, rows: &[R]) -> TableOutcome {
        let path = self.path_of(R::TABLE);
        let outcome = write_rows(&path, rows)
            .map(|()| TableWritten {
                table: R::TABLE,
                path: path.clone(),
                rows: rows.len(),
            })
            .map_err(|source| OutputWriteFailure {
                table: R::TABLE,
                path,
                source,
            });

        match &outcome {
            Ok(written) => info!(table = %written.table, rows = written.rows, path = %written.path.display(), "table written"),
            Err(failure) => error!(table = %failure.table, path = %failure.path.display(), error = %failure.source, "table write failed"),
        }
        outcome
    }

    /// Writes the correlation tables and, when given, the settlement tables.
    pub fn write_all(
        &self,
        output: &CorrelationOutput,
        settlement: Option<&SettlementReport>,
    ) -> Vec<TableOutcome> {
        let mut outcomes = vec![
            self.write_table(&output.batches),
            self.write_table(&output.certificates),
            self.write_table(&output.claims),
        ];
        if let Some(report) = settlement {
            outcomes.push(self.write_table(&report.agreements));
            outcomes.push(self.write_table(&report.mismatches));
        }
        outcomes
    }
}

fn write_rows<R: TabularRow>(path: &Path, rows: &[R]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "{}", format_record(R::COLUMNS))?;
    for row in rows {
        writeln!(out, "{}", format_record(&row.fields()))?;
    }
    out.flush()
}
