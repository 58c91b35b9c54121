//! Hex-encoded byte strings as they appear on the builder-specs JSON wire.
//!
//! Every byte field is a `0x`-prefixed hex string. Lengths are NOT enforced
//! here for [`HexBytes`]: callers decide whether a wrong-length value is a
//! decode failure or a per-item validation failure.

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Variable-length byte string, `0x`-prefixed hex on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct HexBytes(Vec<u8>);

impl HexBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lowercase `0x`-prefixed hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }
}

impl From<Vec<u8>> for HexBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for HexBytes {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl FromStr for HexBytes {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        Ok(Self(hex::decode(s)?))
    }
}

impl Deref for HexBytes {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.bytes()
    }
}

impl fmt::Display for HexBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for HexBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for HexBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if !s.starts_with("0x") {
            return Err(D::Error::custom("hex string without 0x prefix"));
        }
        s.parse().map_err(D::Error::custom)
    }
}

/// A 20-byte execution-layer address (fee recipient).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Address(pub [u8; 20]);

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes = HexBytes::deserialize(deserializer)?;
        let arr: [u8; 20] = bytes
            .bytes()
            .try_into()
            .map_err(|_| D::Error::custom(format!("address must be 20 bytes, got {}", bytes.len())))?;
        Ok(Address(arr))
    }
}

/// Decimal `u64` encoded either as a JSON string (builder-specs) or a bare number.
pub mod quoted_u64 {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(u64),
    }

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match StringOrNumber::deserialize(deserializer)? {
            StringOrNumber::String(s) => s.parse().map_err(D::Error::custom),
            StringOrNumber::Number(n) => Ok(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_and_without_prefix() {
        let a: HexBytes = "0xdeadbeef".parse().unwrap();
        let b: HexBytes = "deadbeef".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 4);
        assert_eq!(a.to_hex(), "0xdeadbeef");
    }

    #[test]
    fn json_requires_prefix() {
        assert!(serde_json::from_str::<HexBytes>("\"0x00ff\"").is_ok());
        assert!(serde_json::from_str::<HexBytes>("\"00ff\"").is_err());
        assert!(serde_json::from_str::<HexBytes>("\"0xzz\"").is_err());
    }

    #[test]
    fn address_rejects_wrong_length() {
        let ok = format!("\"0x{}\"", "ab".repeat(20));
        let short = format!("\"0x{}\"", "ab".repeat(19));
        assert!(serde_json::from_str::<Address>(&ok).is_ok());
        assert!(serde_json::from_str::<Address>(&short).is_err());
    }

    #[test]
    fn quoted_u64_accepts_string_and_number() {
        #[derive(Deserialize)]
        struct T {
            #[serde(with = "quoted_u64")]
            v: u64,
        }
        assert_eq!(serde_json::from_str::<T>(r#"{"v":"42"}"#).unwrap().v, 42);
        assert_eq!(serde_json::from_str::<T>(r#"{"v":42}"#).unwrap().v, 42);
        assert!(serde_json::from_str::<T>(r#"{"v":"-1"}"#).is_err());
    }
}
