//! # CSV Cache Store
//!
//! The append-only cache artifact. The file is read once when the store is
//! opened, then kept open in append mode for the rest of the run. Every new
//! entry is written as one row and flushed immediately, so an aborted run
//! keeps everything it resolved.
//!
//! ```text
//! blockId,address,buyer,seller,amount,metadata,valid
//! 120,0x…,0x…,0x…,5000,"{""kind"":""ppa""}",true
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use shared_types::tabular::{format_record, parse_records};
use shared_types::{parse_uint, Address};
use tracing::{debug, info};

use crate::domain::{AgreementData, CacheError, CachedAgreement};
use crate::ports::CacheStore;

/// Column order of the cache artifact.
pub const CACHE_HEADER: [&str; 7] = ["blockId", "address", "buyer", "seller", "amount", "metadata", "valid"];

/// File-backed [`CacheStore`].
pub struct CsvCacheStore {
    path: PathBuf,
    seeded: Vec<CachedAgreement>,
    writer: BufWriter<File>,
}

impl CsvCacheStore {
    /// Opens (or creates) the artifact at `path` and reads its rows.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let path = path.as_ref().to_path_buf();
        let io_err = |source| CacheError::Io {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let existing = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(io_err(e)),
        };
        let seeded = parse_cache(&path, &existing)?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_err)?;
        let mut writer = BufWriter::new(file);

        if existing.trim().is_empty() {
            writeln!(writer, "{}", format_record(&CACHE_HEADER)).map_err(io_err)?;
            writer.flush().map_err(io_err)?;
        } else if !existing.ends_with('\n') {
            writeln!(writer).map_err(io_err)?;
            writer.flush().map_err(io_err)?;
        }

        info!(path = %path.display(), entries = seeded.len(), "agreement cache opened");
        Ok(Self {
            path,
            seeded,
            writer,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CacheStore for CsvCacheStore {
    fn seeded(&self) -> &[CachedAgreement] {
        &self.seeded
    }

    fn append(&mut self, entry: &CachedAgreement) -> Result<(), CacheError> {
        let line = format_record(&[
            entry.block_id.to_string(),
            entry.address.to_string(),
            entry.data.buyer.to_string(),
            entry.data.seller.to_string(),
            entry.data.amount.to_string(),
            entry.data.metadata.clone(),
            entry.data.valid.to_string(),
        ]);
        writeln!(self.writer, "{line}")
            .and_then(|()| self.writer.flush())
            .map_err(|source| CacheError::Io {
                path: self.path.clone(),
                source,
            })?;
        debug!(address = %entry.address, "agreement appended to cache");
        Ok(())
    }
}

fn parse_cache(path: &Path, text: &str) -> Result<Vec<CachedAgreement>, CacheError> {
    let records = parse_records(text).map_err(|source| CacheError::Tabular {
        path: path.to_path_buf(),
        source,
    })?;
    let mut rows = records.into_iter();

    match rows.next() {
        None => return Ok(Vec::new()),
        Some(header) if header.iter().map(String::as_str).eq(CACHE_HEADER) => {}
        Some(header) => {
            return Err(CacheError::MalformedRow {
                path: path.to_path_buf(),
                row: 0,
                message: format!("unexpected header {header:?}"),
            })
        }
    }

    rows.enumerate()
        .map(|(i, row)| {
            parse_row(&row).map_err(|message| CacheError::MalformedRow {
                path: path.to_path_buf(),
                row: i + 1,
                message,
            })
        })
        .collect()
}

fn parse_row(row: &[String]) -> Result<CachedAgreement, String> {
    let [block_id, address, buyer, seller, amount, metadata, valid] = row else {
        return Err(format!("expected {} fields, got {}", CACHE_HEADER.len(), row.len()));
    };

    let address_of = |field: &str| Address::from_str(field).map_err(|e| e.to_string());
    Ok(CachedAgreement {
        block_id: block_id.parse::<u64>().map_err(|e| format!("blockId: {e}"))?,
        address: address_of(address.as_str())?,
        data: AgreementData {
            buyer: address_of(buyer.as_str())?,
            seller: address_of(seller.as_str())?,
            amount: parse_uint(amount).map_err(|e| e.to_string())?,
            metadata: metadata.clone(),
            valid: valid.parse::<bool>().map_err(|e| format!("valid: {e}"))?,
        },
    })
}
