//! Network name → fork constants → builder signing domain.

use thiserror::Error;

use crate::signing::{compute_builder_domain, Domain};

pub const NETWORK_MAINNET: &str = "mainnet";
pub const NETWORK_KILN: &str = "kiln";
pub const NETWORK_ROPSTEN: &str = "ropsten";
pub const NETWORK_SEPOLIA: &str = "sepolia";
pub const NETWORK_GOERLI_SHADOW_FORK_5: &str = "goerli-shadow-fork-5";

// Shadow fork constants are not published in the public network tables.
const GENESIS_FORK_VERSION_GOERLI_SHADOW_FORK_5: &str = "0x13001034";
const GENESIS_VALIDATORS_ROOT_GOERLI_SHADOW_FORK_5: &str =
    "0xe45f26d5a29b0ed5a9f62f248b842a30dd7b7fba0b5b104eab271efc04e0cf66";
const BELLATRIX_FORK_VERSION_GOERLI_SHADOW_FORK_5: &str = "0x22001034";

struct NetworkConstants {
    genesis_fork_version: &'static str,
    genesis_validators_root: &'static str,
    bellatrix_fork_version: &'static str,
}

fn lookup(name: &str) -> Option<NetworkConstants> {
    let constants = match name {
        NETWORK_MAINNET => NetworkConstants {
            genesis_fork_version: "0x00000000",
            genesis_validators_root:
                "0x4b363db94e286120d76eb905340fdd4e54bfe9f06bf33ff6cf5ad27f511bfe95",
            bellatrix_fork_version: "0x02000000",
        },
        NETWORK_KILN => NetworkConstants {
            genesis_fork_version: "0x70000069",
            genesis_validators_root:
                "0x99b09fcd43e5905236c370f184056bec6e6638cfc31a323b304fc4aa789cb4ad",
            bellatrix_fork_version: "0x70000071",
        },
        NETWORK_ROPSTEN => NetworkConstants {
            genesis_fork_version: "0x80000069",
            genesis_validators_root:
                "0x44f1e56283ca88b35c789f7f449e52339bc1fefe3a45913a43a6d16edcd33cf1",
            bellatrix_fork_version: "0x80000071",
        },
        NETWORK_SEPOLIA => NetworkConstants {
            genesis_fork_version: "0x90000069",
            genesis_validators_root:
                "0xd8ea171f3c94aea21ebc42a1ed61052acf3f9209c00e4efbaaddac09ed9b8078",
            bellatrix_fork_version: "0x90000071",
        },
        NETWORK_GOERLI_SHADOW_FORK_5 => NetworkConstants {
            genesis_fork_version: GENESIS_FORK_VERSION_GOERLI_SHADOW_FORK_5,
            genesis_validators_root: GENESIS_VALIDATORS_ROOT_GOERLI_SHADOW_FORK_5,
            bellatrix_fork_version: BELLATRIX_FORK_VERSION_GOERLI_SHADOW_FORK_5,
        },
        _ => return None,
    };
    Some(constants)
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown network: {0}")]
pub struct UnknownNetworkError(pub String);

/// Resolved network details. Built once at startup and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkDomain {
    pub name: String,
    pub genesis_fork_version_hex: String,
    pub genesis_validators_root_hex: String,
    pub bellatrix_fork_version_hex: String,
    /// Builder application domain registrations are verified against.
    pub signing_domain: Domain,
}

impl NetworkDomain {
    pub fn resolve(name: &str) -> Result<Self, UnknownNetworkError> {
        let constants = lookup(name).ok_or_else(|| UnknownNetworkError(name.to_string()))?;
        let fork_version = decode_fork_version(constants.genesis_fork_version);

        Ok(Self {
            name: name.to_string(),
            genesis_fork_version_hex: constants.genesis_fork_version.to_string(),
            genesis_validators_root_hex: constants.genesis_validators_root.to_string(),
            bellatrix_fork_version_hex: constants.bellatrix_fork_version.to_string(),
            signing_domain: compute_builder_domain(fork_version),
        })
    }

    pub fn signing_domain_hex(&self) -> String {
        format!("0x{}", hex::encode(self.signing_domain))
    }
}

/// Table entries are compile-time literals; a malformed one is a programming error
/// caught by `every_network_resolves`.
fn decode_fork_version(s: &str) -> [u8; 4] {
    let mut version = [0u8; 4];
    if let Ok(bytes) = hex::decode(s.trim_start_matches("0x")) {
        if bytes.len() == 4 {
            version.copy_from_slice(&bytes);
        }
    }
    version
}

/// Names accepted by [`NetworkDomain::resolve`].
pub fn supported_networks() -> &'static [&'static str] {
    &[
        NETWORK_MAINNET,
        NETWORK_KILN,
        NETWORK_ROPSTEN,
        NETWORK_SEPOLIA,
        NETWORK_GOERLI_SHADOW_FORK_5,
    ]
}
