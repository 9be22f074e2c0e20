//! # JSON Agreement Accessor
//!
//! Answers agreement metadata lookups from an exported JSON object keyed by
//! agreement address:
//!
//! ```text
//! { "0xabc…": { "buyer": "0x…", "seller": "0x…", "amount": "5000",
//!              "metadata": "", "valid": true } }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cl_03_settlement::{AgreementData, AgreementDataAccessor};
use shared_types::{Address, SourceError};
use tracing::{debug, info};

/// Default export file name inside the events directory.
pub const AGREEMENT_DATA_FILE: &str = "agreement-data.json";

/// [`AgreementDataAccessor`] over a JSON export.
#[derive(Debug)]
pub struct JsonAgreementAccessor {
    path: PathBuf,
    agreements: HashMap<Address, AgreementData>,
}

impl JsonAgreementAccessor {
    /// Loads the export at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();
        let resource = path.display().to_string();

        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| SourceError::unavailable(resource.as_str(), e))?;
        let agreements: HashMap<Address, AgreementData> =
            serde_json::from_str(&text).map_err(|e| SourceError::malformed(resource.as_str(), e))?;

        info!(path = %path.display(), agreements = agreements.len(), "agreement export loaded");
        Ok(Self { path, agreements })
    }
}

#[async_trait]
impl AgreementDataAccessor for JsonAgreementAccessor {
    async fn get_agreement_data(&self, address: Address) -> Result<AgreementData, SourceError> {
        debug!(%address, "agreement lookup");
        self.agreements.get(&address).cloned().ok_or_else(|| {
            SourceError::unavailable(
                self.path.display().to_string(),
                format!("no agreement at {address}"),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::U256;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_lookup_from_export() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(AGREEMENT_DATA_FILE);
        let agreement = Address::new([0xaa; 20]);
        fs::write(
            &path,
            format!(
                r#"{{"{agreement}": {{"buyer": "{}", "seller": "{}", "amount": "0x1388", "valid": true}}}}"#,
                Address::new([0xb0; 20]),
                Address::new([0x5e; 20]),
            ),
        )
        .unwrap();

        let accessor = JsonAgreementAccessor::open(&path).await.unwrap();

        let data = accessor.get_agreement_data(agreement).await.unwrap();
        assert_eq!(data.amount, U256::from(5000));
        assert_eq!(data.metadata, "");
        assert!(data.valid);

        let err = accessor
            .get_agreement_data(Address::new([0x01; 20]))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn test_missing_export_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let err = JsonAgreementAccessor::open(dir.path().join(AGREEMENT_DATA_FILE))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Unavailable { .. }));
    }
}
