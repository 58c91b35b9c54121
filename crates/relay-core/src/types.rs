//! Builder-specs request bodies accepted by the proposer API.

use serde::{Deserialize, Serialize};

use crate::hex::{quoted_u64, Address, HexBytes};

/// Length of a compressed BLS12-381 public key.
pub const PUBKEY_LEN: usize = 48;
/// Length of a compressed BLS12-381 signature.
pub const SIGNATURE_LEN: usize = 96;

/// The message a proposer signs to advertise its fee recipient and gas limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorRegistration {
    pub fee_recipient: Address,
    #[serde(with = "quoted_u64")]
    pub gas_limit: u64,
    #[serde(with = "quoted_u64")]
    pub timestamp: u64,
    pub pubkey: HexBytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedValidatorRegistration {
    pub message: ValidatorRegistration,
    pub signature: HexBytes,
}

impl SignedValidatorRegistration {
    /// `0x`-prefixed lowercase pubkey, the key every store and cache is indexed by.
    pub fn pubkey_hex(&self) -> PubkeyHex {
        PubkeyHex::from_bytes(&self.message.pubkey)
    }

    pub fn has_valid_lengths(&self) -> bool {
        self.message.pubkey.len() == PUBKEY_LEN && self.signature.len() == SIGNATURE_LEN
    }
}

/// Blinded beacon block header fields. The body is opaque to this service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlindedBeaconBlock {
    #[serde(with = "quoted_u64")]
    pub slot: u64,
    #[serde(with = "quoted_u64")]
    pub proposer_index: u64,
    pub parent_root: HexBytes,
    pub state_root: HexBytes,
    pub body: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedBlindedBeaconBlock {
    pub message: BlindedBeaconBlock,
    pub signature: HexBytes,
}

/// Normalized validator public key: `0x` + lowercase hex.
///
/// Deserialization goes through [`PubkeyHex::new`], so keys read from seed
/// files or the store compare equal to keys derived from request bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PubkeyHex(String);

impl<'de> Deserialize<'de> for PubkeyHex {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl PubkeyHex {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(format!("0x{}", hex::encode(bytes)))
    }

    /// Normalize a user-supplied string. Adds the prefix if missing and lowercases.
    pub fn new(s: &str) -> Self {
        let s = s.strip_prefix("0x").unwrap_or(s);
        Self(format!("0x{}", s.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PubkeyHex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validator the consensus layer considers eligible to propose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownValidator {
    pub pubkey: PubkeyHex,
    #[serde(with = "quoted_u64")]
    pub index: u64,
}
