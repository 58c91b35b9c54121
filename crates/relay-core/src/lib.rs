//! relay-core: wire types, network constants, signing, and configuration.
//! All other relay crates depend on this one.

pub mod chain;
pub mod config;
pub mod endpoint;
pub mod hex;
pub mod network;
pub mod signing;
pub mod stats;
pub mod types;

pub use endpoint::{EndpointIdentity, ParseError};
pub use network::{NetworkDomain, UnknownNetworkError};
pub use types::{
    KnownValidator, PubkeyHex, SignedBlindedBeaconBlock, SignedValidatorRegistration,
    ValidatorRegistration,
};
