use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use relay_core::{KnownValidator, PubkeyHex, SignedValidatorRegistration};
use std::sync::{Arc, RwLock};

use crate::datastore::{StoreError, UpsertOutcome, ValidatorStore};

/// In-memory validator store. Used for tests and single-process deployments.
#[derive(Clone, Default)]
pub struct MemoryStore {
    /// Eligible validators, replaced wholesale.
    known: Arc<RwLock<Vec<KnownValidator>>>,
    /// Latest registration per pubkey.
    registrations: Arc<DashMap<PubkeyHex, SignedValidatorRegistration>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registration_count(&self) -> usize {
        self.registrations.len()
    }
}

#[async_trait]
impl ValidatorStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn list_known_validators(&self) -> Result<Vec<KnownValidator>, StoreError> {
        let known = self.known.read().unwrap_or_else(|e| e.into_inner());
        Ok(known.clone())
    }

    async fn replace_known_validators(&self, validators: &[KnownValidator]) -> Result<(), StoreError> {
        let mut known = self.known.write().unwrap_or_else(|e| e.into_inner());
        *known = validators.to_vec();
        Ok(())
    }

    async fn upsert_registration(
        &self,
        registration: &SignedValidatorRegistration,
    ) -> Result<UpsertOutcome, StoreError> {
        // The entry guard holds the shard lock, so compare-and-replace is atomic per key.
        let outcome = match self.registrations.entry(registration.pubkey_hex()) {
            Entry::Vacant(slot) => {
                slot.insert(registration.clone());
                UpsertOutcome::Inserted
            }
            Entry::Occupied(mut slot) => {
                if registration.message.timestamp > slot.get().message.timestamp {
                    slot.insert(registration.clone());
                    UpsertOutcome::Updated
                } else {
                    UpsertOutcome::Stale
                }
            }
        };
        Ok(outcome)
    }

    async fn get_registration(
        &self,
        pubkey: &PubkeyHex,
    ) -> Result<Option<SignedValidatorRegistration>, StoreError> {
        Ok(self.registrations.get(pubkey).map(|r| r.clone()))
    }
}
