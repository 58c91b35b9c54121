//! Datastore contract consumed by the proposer API.
//!
//! [`ValidatorStore`] is the external keyed store. [`ProposerDatastore`] layers
//! the in-process known-validator snapshot on top of it and is what request
//! handlers talk to.

use std::sync::Arc;

use async_trait::async_trait;
use relay_core::{KnownValidator, PubkeyHex, SignedValidatorRegistration};
use thiserror::Error;

use crate::known_validators::{KnownValidatorCache, KnownValidatorSet};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("value out of range for store column: {0}")]
    OutOfRange(u64),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// What a conditional upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No previous registration for this key.
    Inserted,
    /// Replaced an older registration.
    Updated,
    /// Incoming timestamp was not strictly newer; stored value kept.
    Stale,
}

impl UpsertOutcome {
    pub fn is_saved(self) -> bool {
        !matches!(self, UpsertOutcome::Stale)
    }
}

/// The external registration / membership store.
///
/// `upsert_registration` must be last-write-wins by `message.timestamp`,
/// decided atomically per public key: a registration replaces the stored one
/// only if its timestamp is strictly greater. Arrival order does not matter.
#[async_trait]
pub trait ValidatorStore: Send + Sync {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    /// Full set of validators currently eligible to propose.
    async fn list_known_validators(&self) -> Result<Vec<KnownValidator>, StoreError>;

    /// Replace the eligible set wholesale. Written by whatever tracks the
    /// consensus layer; the relay only calls this to seed a fresh store.
    async fn replace_known_validators(&self, validators: &[KnownValidator]) -> Result<(), StoreError>;

    async fn upsert_registration(
        &self,
        registration: &SignedValidatorRegistration,
    ) -> Result<UpsertOutcome, StoreError>;

    async fn get_registration(
        &self,
        pubkey: &PubkeyHex,
    ) -> Result<Option<SignedValidatorRegistration>, StoreError>;
}

/// Store handle plus the known-validator snapshot served to request handlers.
#[derive(Clone)]
pub struct ProposerDatastore {
    store: Arc<dyn ValidatorStore>,
    known: KnownValidatorCache,
}

impl ProposerDatastore {
    pub fn new(store: Arc<dyn ValidatorStore>) -> Self {
        Self {
            store,
            known: KnownValidatorCache::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn ValidatorStore> {
        &self.store
    }

    pub fn known_validators(&self) -> &KnownValidatorCache {
        &self.known
    }

    /// Membership against the current snapshot. Never touches the store.
    pub fn is_known_validator(&self, pubkey: &PubkeyHex) -> bool {
        self.known.contains(pubkey)
    }

    /// Pull the full set from the store and publish it as one snapshot.
    /// On error the previous snapshot stays in place.
    pub async fn refresh_known_validators(&self) -> Result<usize, StoreError> {
        let validators = self.store.list_known_validators().await?;
        let set: KnownValidatorSet = validators
            .into_iter()
            .map(|v| (v.pubkey.clone(), v))
            .collect();
        Ok(self.known.publish(set))
    }

    pub async fn update_validator_registration(
        &self,
        registration: &SignedValidatorRegistration,
    ) -> Result<UpsertOutcome, StoreError> {
        self.store.upsert_registration(registration).await
    }

    pub async fn get_validator_registration(
        &self,
        pubkey: &PubkeyHex,
    ) -> Result<Option<SignedValidatorRegistration>, StoreError> {
        self.store.get_registration(pubkey).await
    }
}
