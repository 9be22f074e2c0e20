//! # Ledger Primitives
//!
//! Value types carried by event records: 20-byte addresses, 32-byte
//! transaction hashes, opaque byte payloads and 256-bit unsigned integers.
//!
//! All of them serialize as strings so that event exports stay readable and
//! integers never lose precision in JSON.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// Re-export the fixed-width integers used across all crates
pub use primitive_types::{U256, U512};

use crate::errors::PrimitiveError;

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

macro_rules! fixed_bytes {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Byte length of this type.
            pub const LEN: usize = $len;

            /// The all-zero value.
            pub const ZERO: Self = Self([0u8; $len]);

            /// Creates a value from a fixed-size array.
            #[must_use]
            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Parses `0x`-prefixed (or bare) hex of exactly the right length.
            pub fn from_hex(s: &str) -> Result<Self, PrimitiveError> {
                let digits = strip_hex_prefix(s.trim());
                if digits.len() != $len * 2 {
                    return Err(PrimitiveError::InvalidLength {
                        expected: $len,
                        actual: digits.len() / 2,
                    });
                }
                let mut bytes = [0u8; $len];
                hex::decode_to_slice(digits, &mut bytes)
                    .map_err(|e| PrimitiveError::InvalidHex(e.to_string()))?;
                Ok(Self(bytes))
            }

            /// Returns the underlying bytes.
            #[must_use]
            pub const fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Returns true if every byte is zero.
            #[must_use]
            pub fn is_zero(&self) -> bool {
                self.0 == [0u8; $len]
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl FromStr for $name {
            type Err = PrimitiveError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(de::Error::custom)
            }
        }
    };
}

fixed_bytes!(
    /// A 20-byte account or contract address.
    Address,
    20
);

fixed_bytes!(
    /// A 32-byte transaction hash.
    TxHash,
    32
);

// =============================================================================
// BYTES
// =============================================================================

/// An opaque, variable-length byte payload (e.g. ABI-encoded claim data).
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
    /// Creates a payload by copying a slice.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Self {
        Self(slice.to_vec())
    }

    /// Parses `0x`-prefixed (or bare) hex. `"0x"` is the empty payload.
    pub fn from_hex(s: &str) -> Result<Self, PrimitiveError> {
        hex::decode(strip_hex_prefix(s.trim()))
            .map(Self)
            .map_err(|e| PrimitiveError::InvalidHex(e.to_string()))
    }

    /// Returns the payload as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for the empty payload.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Renders the payload as `0x`-prefixed lowercase hex.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }
}

impl fmt::Debug for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.len() > 32 {
            write!(f, "Bytes(0x{}.. {} bytes)", hex::encode(&self.0[..32]), self.0.len())
        } else {
            write!(f, "Bytes({})", self.to_hex())
        }
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Bytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Bytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(de::Error::custom)
    }
}

// =============================================================================
// UNSIGNED INTEGERS
// =============================================================================

/// Parses a ledger integer.
///
/// Accepts decimal with any number of leading zeros and `0x`-prefixed hex.
/// Two encodings of the same number always yield the same `U256`.
pub fn parse_uint(s: &str) -> Result<U256, PrimitiveError> {
    let trimmed = s.trim();
    let invalid = || PrimitiveError::InvalidUint(s.to_string());

    if let Some(digits) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        let significant = digits.trim_start_matches('0');
        if digits.is_empty() {
            return Err(invalid());
        }
        if significant.is_empty() {
            return Ok(U256::zero());
        }
        return U256::from_str_radix(significant, 16).map_err(|_| invalid());
    }

    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    U256::from_dec_str(trimmed).map_err(|_| invalid())
}

struct UintVisitor;

impl<'de> Visitor<'de> for UintVisitor {
    type Value = U256;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an unsigned integer as a decimal string, 0x-hex string or JSON number")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<U256, E> {
        Ok(U256::from(v))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<U256, E> {
        Ok(U256::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<U256, E> {
        u64::try_from(v)
            .map(U256::from)
            .map_err(|_| E::custom(format!("negative integer {v}")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<U256, E> {
        parse_uint(v).map_err(E::custom)
    }
}

/// Serde adapter: `U256` as a decimal string, lenient on input.
pub mod uint_string {
    use super::{Deserializer, Serializer, UintVisitor, U256};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        deserializer.deserialize_any(UintVisitor)
    }
}

/// Serde adapter: `Vec<U256>` as a list of decimal strings.
pub mod uint_string_vec {
    use super::{Deserialize, Deserializer, Serializer, U256};
    use serde::ser::SerializeSeq;

    #[derive(Deserialize)]
    struct Item(#[serde(with = "super::uint_string")] U256);

    pub fn serialize<S: Serializer>(values: &[U256], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for value in values {
            seq.serialize_element(&value.to_string())?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<U256>, D::Error> {
        let items = Vec::<Item>::deserialize(deserializer)?;
        Ok(items.into_iter().map(|item| item.0).collect())
    }
}

/// Serde adapter: a key that may arrive as a JSON string or number and is
/// kept verbatim as text. Batch keys are matched by string equality.
pub mod string_or_number {
    use super::{de, fmt, Deserializer, Serializer, Visitor};

    struct KeyVisitor;

    impl<'de> Visitor<'de> for KeyVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string or an unsigned integer")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_owned())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }
    }

    pub fn serialize<S: Serializer>(value: &str, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        deserializer.deserialize_any(KeyVisitor)
    }
}

// =============================================================================
// TESTS
// =============================================================================
