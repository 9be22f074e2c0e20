//! # Domain Entities
//!
//! The decoded claim record, the schema tags and the decode outcome.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Structured claim metadata, the union of every schema's fields.
///
/// Fields a schema does not carry are the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClaimData {
    pub beneficiary: String,
    pub region: String,
    pub country_code: String,
    pub period_start_date: String,
    pub period_end_date: String,
    pub purpose: String,
    #[serde(rename = "consumptionEntityID")]
    pub consumption_entity_id: String,
    #[serde(rename = "proofID")]
    pub proof_id: String,
    pub location: String,
}

/// Historical claim metadata encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimSchema {
    /// Six strings: beneficiary, location, countryCode, periodStartDate,
    /// periodEndDate, purpose.
    V1,
    /// One string holding a JSON object.
    V2,
    /// Eight strings: beneficiary, region, countryCode, periodStartDate,
    /// periodEndDate, purpose, consumptionEntityID, proofID.
    V3,
}

impl ClaimSchema {
    /// Canonical fallback order: newest layout first, the embedded-JSON
    /// layout last.
    pub const FALLBACK_ORDER: [ClaimSchema; 3] = [ClaimSchema::V3, ClaimSchema::V1, ClaimSchema::V2];
}

impl fmt::Display for ClaimSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => f.write_str("v1"),
            Self::V2 => f.write_str("v2"),
            Self::V3 => f.write_str("v3"),
        }
    }
}

/// Outcome of decoding one claim payload.
///
/// `Undecodable` is the decode-failure marker. It serializes as JSON `null`,
/// which no successful decode (always an object) can produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimDecode {
    /// The first schema in the fallback order that accepted the payload.
    Decoded { schema: ClaimSchema, data: ClaimData },
    /// No schema accepted the payload.
    Undecodable,
}

impl ClaimDecode {
    /// Returns true for a successful decode.
    #[must_use]
    pub fn is_decoded(&self) -> bool {
        matches!(self, Self::Decoded { .. })
    }

    /// The schema that matched, if any.
    #[must_use]
    pub fn schema(&self) -> Option<ClaimSchema> {
        match self {
            Self::Decoded { schema, .. } => Some(*schema),
            Self::Undecodable => None,
        }
    }

    /// The decoded record, if any.
    #[must_use]
    pub fn data(&self) -> Option<&ClaimData> {
        match self {
            Self::Decoded { data, .. } => Some(data),
            Self::Undecodable => None,
        }
    }

    /// Output form: the record as a JSON object, or `null`.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "null".to_string())
    }
}

impl Serialize for ClaimDecode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Decoded { data, .. } => data.serialize(serializer),
            Self::Undecodable => serializer.serialize_none(),
        }
    }
}
