//! # Indexer Configuration
//!
//! Resolution order, lowest to highest precedence:
//!
//! 1. `Default` values
//! 2. Environment variables ([`IndexerConfig::apply_env`])
//! 3. Command-line flags (applied by the binary)
//!
//! [`IndexerConfig::validate`] runs last.

use std::env;
use std::path::PathBuf;

use thiserror::Error;

/// Complete indexer configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexerConfig {
    /// Event export location.
    pub source: SourceConfig,
    /// Output table location.
    pub output: OutputConfig,
    /// Agreement reconciliation.
    pub settlement: SettlementConfig,
}

/// Event source configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// Directory holding one `<EventKind>.json` file per event kind.
    pub events_dir: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            events_dir: PathBuf::from("./events"),
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Directory the CSV tables and `metrics.prom` are written to.
    pub output_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./output"),
        }
    }
}

/// Settlement reconciliation configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementConfig {
    /// Run the agreement reconciliation.
    pub enabled: bool,
    /// Append-only agreement cache artifact.
    pub cache_path: PathBuf,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cache_path: PathBuf::from("./agreement-cache.csv"),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable holds a value of the wrong type.
    #[error("invalid value {value:?} for {var}")]
    InvalidValue { var: &'static str, value: String },

    /// The events directory does not exist.
    #[error("events directory {0} does not exist")]
    MissingEventsDir(PathBuf),

    /// The output path exists and is not a directory.
    #[error("output path {0} is not a directory")]
    OutputNotDirectory(PathBuf),

    /// The cache path points at a directory.
    #[error("cache path {0} is a directory")]
    CacheIsDirectory(PathBuf),
}

impl IndexerConfig {
    /// Applies overrides from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `LEDGER_EVENTS_DIR`: events directory
    /// - `LEDGER_OUTPUT_DIR`: output directory
    /// - `LEDGER_SETTLEMENT`: `true`/`1` enables settlement
    /// - `LEDGER_CACHE_PATH`: agreement cache artifact
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_lookup(|key| env::var(key).ok())
    }

    /// Applies overrides from an arbitrary variable lookup.
    pub fn apply_lookup(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(dir) = lookup("LEDGER_EVENTS_DIR") {
            self.source.events_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("LEDGER_OUTPUT_DIR") {
            self.output.output_dir = PathBuf::from(dir);
        }
        if let Some(value) = lookup("LEDGER_SETTLEMENT") {
            self.settlement.enabled = parse_flag(&value).ok_or(ConfigError::InvalidValue {
                var: "LEDGER_SETTLEMENT",
                value,
            })?;
        }
        if let Some(path) = lookup("LEDGER_CACHE_PATH") {
            self.settlement.cache_path = PathBuf::from(path);
        }
        Ok(())
    }

    /// Checks the paths before a run starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.source.events_dir.is_dir() {
            return Err(ConfigError::MissingEventsDir(self.source.events_dir.clone()));
        }
        if self.output.output_dir.exists() && !self.output.output_dir.is_dir() {
            return Err(ConfigError::OutputNotDirectory(self.output.output_dir.clone()));
        }
        if self.settlement.enabled && self.settlement.cache_path.is_dir() {
            return Err(ConfigError::CacheIsDirectory(self.settlement.cache_path.clone()));
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
