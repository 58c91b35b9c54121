//! SSZ signing roots and BLS12-381 signature checks for builder messages.
//!
//! Registrations are signed over
//!   signing_root = hash_tree_root(SigningData { object_root, domain })
//! with the builder application domain. Public keys live in G1 (48 bytes),
//! signatures in G2 (96 bytes), as on the beacon chain.

use blst::min_pk::{PublicKey, SecretKey, Signature};
use blst::BLST_ERROR;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::types::{ValidatorRegistration, PUBKEY_LEN};

/// Proof-of-possession ciphersuite used by Ethereum consensus.
const DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";

pub type Domain = [u8; 32];
pub type DomainType = [u8; 4];

/// Application domain for builder-specs messages.
pub const DOMAIN_APPLICATION_BUILDER: DomainType = [0x00, 0x00, 0x00, 0x01];

#[derive(Debug, Error, PartialEq)]
pub enum SigningError {
    #[error("invalid public key: {0:?}")]
    InvalidPublicKey(BLST_ERROR),
    #[error("invalid signature: {0:?}")]
    InvalidSignature(BLST_ERROR),
    #[error("invalid secret key: {0:?}")]
    InvalidSecretKey(BLST_ERROR),
    #[error("public key must be {PUBKEY_LEN} bytes, got {0}")]
    PublicKeyLength(usize),
}

// ── SSZ merkleization ────────────────────────────────────────────────────────

fn hash_pair(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Right-pad up to 32 bytes into a single leaf.
fn leaf(bytes: &[u8]) -> [u8; 32] {
    let mut chunk = [0u8; 32];
    chunk[..bytes.len()].copy_from_slice(bytes);
    chunk
}

fn u64_leaf(value: u64) -> [u8; 32] {
    leaf(&value.to_le_bytes())
}

/// hash_tree_root of a 48-byte vector: two chunks, the second zero-padded.
fn pubkey_root(pubkey: &[u8; 48]) -> [u8; 32] {
    hash_pair(&leaf(&pubkey[..32]), &leaf(&pubkey[32..]))
}

/// hash_tree_root(ForkData { current_version, genesis_validators_root })
pub fn fork_data_root(fork_version: [u8; 4], genesis_validators_root: [u8; 32]) -> [u8; 32] {
    hash_pair(&leaf(&fork_version), &genesis_validators_root)
}

/// domain = domain_type ‖ fork_data_root[..28]
pub fn compute_domain(
    domain_type: DomainType,
    fork_version: [u8; 4],
    genesis_validators_root: [u8; 32],
) -> Domain {
    let root = fork_data_root(fork_version, genesis_validators_root);
    let mut domain = [0u8; 32];
    domain[..4].copy_from_slice(&domain_type);
    domain[4..].copy_from_slice(&root[..28]);
    domain
}

/// Builder signing domain: genesis fork version, zero validators root.
pub fn compute_builder_domain(genesis_fork_version: [u8; 4]) -> Domain {
    compute_domain(DOMAIN_APPLICATION_BUILDER, genesis_fork_version, [0u8; 32])
}

pub fn compute_signing_root(object_root: [u8; 32], domain: Domain) -> [u8; 32] {
    hash_pair(&object_root, &domain)
}

/// hash_tree_root of a ValidatorRegistrationV1 container.
pub fn registration_root(message: &ValidatorRegistration) -> Result<[u8; 32], SigningError> {
    let pubkey: [u8; 48] = message
        .pubkey
        .bytes()
        .try_into()
        .map_err(|_| SigningError::PublicKeyLength(message.pubkey.len()))?;

    let leaves = [
        leaf(&message.fee_recipient.0),
        u64_leaf(message.gas_limit),
        u64_leaf(message.timestamp),
        pubkey_root(&pubkey),
    ];
    Ok(hash_pair(
        &hash_pair(&leaves[0], &leaves[1]),
        &hash_pair(&leaves[2], &leaves[3]),
    ))
}

// ── BLS ──────────────────────────────────────────────────────────────────────

/// Verify a registration signature against the message's own pubkey.
///
/// `Ok(false)` means the signature is well-formed but does not match;
/// `Err` means the key or signature bytes could not be decoded.
pub fn verify_registration(
    message: &ValidatorRegistration,
    signature: &[u8],
    domain: Domain,
) -> Result<bool, SigningError> {
    let root = compute_signing_root(registration_root(message)?, domain);
    verify_signature(&root, &message.pubkey, signature)
}

pub fn verify_signature(
    signing_root: &[u8; 32],
    pubkey: &[u8],
    signature: &[u8],
) -> Result<bool, SigningError> {
    let pk = PublicKey::key_validate(pubkey).map_err(SigningError::InvalidPublicKey)?;
    let sig = Signature::sig_validate(signature, false).map_err(SigningError::InvalidSignature)?;
    match sig.verify(false, signing_root, DST, &[], &pk, false) {
        BLST_ERROR::BLST_SUCCESS => Ok(true),
        BLST_ERROR::BLST_VERIFY_FAIL => Ok(false),
        err => Err(SigningError::InvalidSignature(err)),
    }
}

/// Holds a BLS secret key. Used by tooling and tests that need to produce
/// registrations the relay will accept.
pub struct BlsSigner(SecretKey);

impl BlsSigner {
    /// Derive a key from at least 32 bytes of input keying material.
    pub fn from_seed(ikm: &[u8]) -> Result<Self, SigningError> {
        SecretKey::key_gen(ikm, &[])
            .map(Self)
            .map_err(SigningError::InvalidSecretKey)
    }

    pub fn public_key(&self) -> [u8; PUBKEY_LEN] {
        self.0.sk_to_pk().compress()
    }

    pub fn sign_root(&self, signing_root: &[u8; 32]) -> [u8; 96] {
        self.0.sign(signing_root, DST, &[]).compress()
    }

    pub fn sign_registration(
        &self,
        message: &ValidatorRegistration,
        domain: Domain,
    ) -> Result<[u8; 96], SigningError> {
        let root = compute_signing_root(registration_root(message)?, domain);
        Ok(self.sign_root(&root))
    }
}

impl std::fmt::Debug for BlsSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BlsSigner([REDACTED])")
    }
}
