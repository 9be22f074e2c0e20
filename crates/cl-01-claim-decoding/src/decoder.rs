//! # Claim Payload Decoder
//!
//! Fallback chain over the schema candidates. The first schema that accepts
//! the payload wins; mismatches are logged and never surface to the caller.

use tracing::{debug, trace};

use crate::domain::{ClaimDecode, ClaimSchema};

/// Stateless decoder for claim payloads.
///
/// Holds only the fallback order, so decoding the same bytes twice always
/// gives the same result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimPayloadDecoder {
    order: Vec<ClaimSchema>,
}

impl Default for ClaimPayloadDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimPayloadDecoder {
    /// Decoder using [`ClaimSchema::FALLBACK_ORDER`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            order: ClaimSchema::FALLBACK_ORDER.to_vec(),
        }
    }

    /// Decoder with a custom policy. Schemas left out are never attempted.
    #[must_use]
    pub fn with_order(order: impl Into<Vec<ClaimSchema>>) -> Self {
        Self {
            order: order.into(),
        }
    }

    /// The schemas attempted, in order.
    #[must_use]
    pub fn order(&self) -> &[ClaimSchema] {
        &self.order
    }

    /// Decodes a payload. Never fails; exhaustion yields
    /// [`ClaimDecode::Undecodable`].
    pub fn decode(&self, payload: &[u8]) -> ClaimDecode {
        for schema in &self.order {
            match schema.try_decode(payload) {
                Ok(data) => {
                    trace!(%schema, len = payload.len(), "claim payload decoded");
                    return ClaimDecode::Decoded {
                        schema: *schema,
                        data,
                    };
                }
                Err(mismatch) => {
                    trace!(%schema, reason = %mismatch, "schema does not apply");
                }
            }
        }

        debug!(len = payload.len(), "claim payload matched no known schema");
        ClaimDecode::Undecodable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::encode_string_tuple;
    use crate::domain::ClaimData;

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
            location: String::new(),
        }
    }

    #[test]
    fn test_v3_payload() {
        let decoder = ClaimPayloadDecoder::new();
        let result = decoder.decode(&ClaimSchema::V3.encode(&sample()));
        assert_eq!(
            result,
            ClaimDecode::Decoded {
                schema: ClaimSchema::V3,
                data: sample()
            }
        );
    }

    #[test]
    fn test_v1_payload_never_decodes_as_v3() {
        let decoder = ClaimPayloadDecoder::new();
        let blob = encode_string_tuple(&["Acme", "Munich", "DE", "2021-01-01", "2021-12-31", "Scope 2"]);

        let result = decoder.decode(&blob);
        assert_eq!(result.schema(), Some(ClaimSchema::V1));
        let data = result.data().unwrap();
        assert_eq!(data.location, "Munich");
        assert_eq!(data.region, "");
    }

    #[test]
    fn test_v2_payload_decoded_last() {
        let decoder = ClaimPayloadDecoder::new();
        let blob = encode_string_tuple(&[r#"{"beneficiary":"Acme","purpose":"Scope 2"}"#]);
        let result = decoder.decode(&blob);
        assert_eq!(result.schema(), Some(ClaimSchema::V2));
        assert_eq!(result.data().unwrap().purpose, "Scope 2");
    }

    #[test]
    fn test_garbage_is_undecodable() {
        let decoder = ClaimPayloadDecoder::new();
        assert_eq!(decoder.decode(&[]), ClaimDecode::Undecodable);
        assert_eq!(decoder.decode(b"not abi at all"), ClaimDecode::Undecodable);
        assert_eq!(decoder.decode(&[0u8; 96]), ClaimDecode::Undecodable);
    }

    #[test]
    fn test_empty_v3_record_is_not_a_failure() {
        let decoder = ClaimPayloadDecoder::new();
        let blob = encode_string_tuple(&[""; 8]);
        let result = decoder.decode(&blob);
        assert_eq!(
            result,
            ClaimDecode::Decoded {
                schema: ClaimSchema::V3,
                data: ClaimData::default()
            }
        );
        assert_ne!(result, ClaimDecode::Undecodable);
    }

    #[test]
    fn test_decoding_is_idempotent() {
        let decoder = ClaimPayloadDecoder::new();
        let blobs = [
            ClaimSchema::V3.encode(&sample()),
            ClaimSchema::V1.encode(&sample()),
            ClaimSchema::V2.encode(&sample()),
            vec![0xde, 0xad, 0xbe, 0xef],
        ];
        for blob in &blobs {
            assert_eq!(decoder.decode(blob), decoder.decode(blob));
        }
    }

    #[test]
    fn test_policy_can_skip_schemas() {
        let decoder = ClaimPayloadDecoder::with_order([ClaimSchema::V1, ClaimSchema::V2]);
        assert_eq!(decoder.order(), &[ClaimSchema::V1, ClaimSchema::V2]);
        assert_eq!(
            decoder.decode(&ClaimSchema::V3.encode(&sample())),
            ClaimDecode::Undecodable
        );
    }
}
