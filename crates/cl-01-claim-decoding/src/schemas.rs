//! # Schema Candidates
//!
//! One decode attempt per historical layout. Each attempt either yields a
//! full [`ClaimData`] or a typed [`SchemaMismatch`]; there is no partial
//! result.

use crate::abi::{decode_string_tuple, encode_string_tuple, WORD};
use crate::domain::{ClaimData, ClaimSchema};
use crate::errors::{AbiError, SchemaMismatch};
use serde_json::json;

/// Decodes exactly `N` string members.
fn members<const N: usize>(data: &[u8]) -> Result<[String; N], SchemaMismatch> {
    let members = decode_string_tuple(data, N)?;
    let found = members.len();
    members.try_into().map_err(|_| {
        SchemaMismatch::Layout(AbiError::HeadSize {
            expected: N * WORD,
            actual: found * WORD,
        })
    })
}

impl ClaimSchema {
    /// Attempts to decode `data` with this schema alone.
    pub fn try_decode(&self, data: &[u8]) -> Result<ClaimData, SchemaMismatch> {
        match self {
            Self::V3 => {
                let [beneficiary, region, country_code, period_start_date, period_end_date, purpose, consumption_entity_id, proof_id] =
                    members::<8>(data)?;
                Ok(ClaimData {
                    beneficiary,
                    region,
                    country_code,
                    period_start_date,
                    period_end_date,
                    purpose,
                    consumption_entity_id,
                    proof_id,
                    location: String::new(),
                })
            }
            Self::V1 => {
                let [beneficiary, location, country_code, period_start_date, period_end_date, purpose] =
                    members::<6>(data)?;
                Ok(ClaimData {
                    beneficiary,
                    location,
                    country_code,
                    period_start_date,
                    period_end_date,
                    purpose,
                    ..ClaimData::default()
                })
            }
            Self::V2 => {
                let [embedded] = members::<1>(data)?;
                let value: serde_json::Value = serde_json::from_str(&embedded)
                    .map_err(|e| SchemaMismatch::EmbeddedRecord(e.to_string()))?;
                if !value.is_object() {
                    return Err(SchemaMismatch::EmbeddedNotObject);
                }
                serde_json::from_value(value).map_err(|e| SchemaMismatch::EmbeddedRecord(e.to_string()))
            }
        }
    }

    /// Encodes `data` in this schema's layout. Fields the schema does not
    /// carry are dropped.
    #[must_use]
    pub fn encode(&self, data: &ClaimData) -> Vec<u8> {
        match self {
            Self::V3 => encode_string_tuple(&[
                data.beneficiary.as_str(),
                data.region.as_str(),
                data.country_code.as_str(),
                data.period_start_date.as_str(),
                data.period_end_date.as_str(),
                data.purpose.as_str(),
                data.consumption_entity_id.as_str(),
                data.proof_id.as_str(),
            ]),
            Self::V1 => encode_string_tuple(&[
                data.beneficiary.as_str(),
                data.location.as_str(),
                data.country_code.as_str(),
                data.period_start_date.as_str(),
                data.period_end_date.as_str(),
                data.purpose.as_str(),
            ]),
            // Keys follow the serde names on `ClaimData`.
            Self::V2 => encode_string_tuple(&[json!({
                "beneficiary": data.beneficiary,
                "region": data.region,
                "countryCode": data.country_code,
                "periodStartDate": data.period_start_date,
                "periodEndDate": data.period_end_date,
                "purpose": data.purpose,
                "consumptionEntityID": data.consumption_entity_id,
                "proofID": data.proof_id,
                "location": data.location,
            })
            .to_string()]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ClaimData {
        ClaimData {
            beneficiary: "Acme Energy".into(),
            region: "Bavaria".into(),
            country_code: "DE".into(),
            period_start_date: "2021-01-01".into(),
            period_end_date: "2021-12-31".into(),
            purpose: "Scope 2".into(),
            consumption_entity_id: "site-17".into(),
            proof_id: "proof-0042".into(),
            location: "Munich".into(),
        }
    }

    #[test]
    fn test_v3_maps_location_to_empty() {
        let decoded = ClaimSchema::V3
            .try_decode(&ClaimSchema::V3.encode(&sample()))
            .unwrap();
        assert_eq!(decoded.region, "Bavaria");
        assert_eq!(decoded.proof_id, "proof-0042");
        assert_eq!(decoded.location, "");
    }

    #[test]
    fn test_v1_maps_missing_fields_to_empty() {
        let decoded = ClaimSchema::V1
            .try_decode(&ClaimSchema::V1.encode(&sample()))
            .unwrap();
        assert_eq!(decoded.location, "Munich");
        assert_eq!(decoded.purpose, "Scope 2");
        assert_eq!(decoded.region, "");
        assert_eq!(decoded.consumption_entity_id, "");
        assert_eq!(decoded.proof_id, "");
    }

    #[test]
    fn test_v2_embeds_every_field() {
        let data = ClaimData {
            beneficiary: "Acme \"North\" GmbH".into(),
            location: "Zürich\n".into(),
            ..sample()
        };
        let blob = ClaimSchema::V2.encode(&data);

        let [embedded] = members::<1>(&blob).unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&embedded).unwrap(),
            serde_json::to_value(&data).unwrap()
        );
        assert_eq!(ClaimSchema::V2.try_decode(&blob).unwrap(), data);
    }

    #[test]
    fn test_v2_missing_keys_default_to_empty() {
        let blob = encode_string_tuple(&[r#"{"beneficiary":"Acme","countryCode":"NL"}"#]);
        let decoded = ClaimSchema::V2.try_decode(&blob).unwrap();
        assert_eq!(decoded.beneficiary, "Acme");
        assert_eq!(decoded.country_code, "NL");
        assert_eq!(decoded.purpose, "");
    }

    #[test]
    fn test_v2_rejects_non_object() {
        let blob = encode_string_tuple(&[r#"["Acme","NL"]"#]);
        assert_eq!(
            ClaimSchema::V2.try_decode(&blob).unwrap_err(),
            SchemaMismatch::EmbeddedNotObject
        );
    }

    #[test]
    fn test_v2_rejects_invalid_json() {
        let blob = encode_string_tuple(&["beneficiary=Acme"]);
        assert!(matches!(
            ClaimSchema::V2.try_decode(&blob).unwrap_err(),
            SchemaMismatch::EmbeddedRecord(_)
        ));
    }

    #[test]
    fn test_v2_rejects_wrongly_typed_field() {
        let blob = encode_string_tuple(&[r#"{"beneficiary": 12}"#]);
        assert!(matches!(
            ClaimSchema::V2.try_decode(&blob).unwrap_err(),
            SchemaMismatch::EmbeddedRecord(_)
        ));
    }

    #[test]
    fn test_layouts_are_disjoint() {
        let data = sample();
        for written in ClaimSchema::FALLBACK_ORDER {
            let blob = written.encode(&data);
            for reader in ClaimSchema::FALLBACK_ORDER {
                assert_eq!(
                    reader.try_decode(&blob).is_ok(),
                    reader == written,
                    "{written} blob read as {reader}"
                );
            }
        }
    }
}
