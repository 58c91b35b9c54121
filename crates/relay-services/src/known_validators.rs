//! Snapshot of validators eligible to propose.
//!
//! Readers clone an `Arc` to the current set and never block on a refresh.
//! A refresh builds the new set off to the side and swaps it in whole, so a
//! reader sees either the old snapshot or the new one, never a mix.

use relay_core::{KnownValidator, PubkeyHex};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

pub type KnownValidatorSet = HashMap<PubkeyHex, KnownValidator>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheState {
    /// No snapshot published yet; every membership query answers false.
    #[default]
    Uninitialized,
    /// At least one refresh succeeded.
    Ready,
}

#[derive(Default)]
struct Snapshot {
    set: Arc<KnownValidatorSet>,
    state: CacheState,
}

#[derive(Clone, Default)]
pub struct KnownValidatorCache {
    inner: Arc<RwLock<Snapshot>>,
}

impl KnownValidatorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot. Cheap; holds the lock only long enough to clone the Arc.
    pub fn snapshot(&self) -> Arc<KnownValidatorSet> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard.set.clone()
    }

    pub fn contains(&self, pubkey: &PubkeyHex) -> bool {
        self.snapshot().contains_key(pubkey)
    }

    pub fn get(&self, pubkey: &PubkeyHex) -> Option<KnownValidator> {
        self.snapshot().get(pubkey).cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn state(&self) -> CacheState {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).state
    }

    pub fn is_ready(&self) -> bool {
        self.state() == CacheState::Ready
    }

    /// Replace the snapshot and mark the cache ready. Returns the new size.
    pub fn publish(&self, set: KnownValidatorSet) -> usize {
        let len = set.len();
        let set = Arc::new(set);
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        guard.set = set;
        guard.state = CacheState::Ready;
        len
    }
}
