//! Per-epoch and per-slot request accounting.
//!
//! The relay has no beacon clock of its own. "Current" slot is the highest
//! slot seen on a well-formed get-header or get-payload request;
//! registrations and refresh results are attributed to that slot's epoch.
//! Once the clock has started, a slot more than [`RETAINED_EPOCHS`] epochs
//! ahead of it is counted against the current epoch and not tracked.

use dashmap::DashMap;
use relay_core::chain::epoch_of_slot;
use relay_core::stats::{EpochSummary, SlotSummary};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Epochs kept before the oldest summaries are dropped.
pub const RETAINED_EPOCHS: u64 = 64;

#[derive(Clone, Default)]
pub struct StatsAggregator {
    epochs: Arc<DashMap<u64, EpochSummary>>,
    slots: Arc<DashMap<u64, SlotSummary>>,
    highest_slot: Arc<AtomicU64>,
    clock_started: Arc<AtomicBool>,
    validators_known: Arc<AtomicU64>,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_slot(&self) -> u64 {
        self.highest_slot.load(Ordering::Relaxed)
    }

    pub fn current_epoch(&self) -> u64 {
        epoch_of_slot(self.current_slot())
    }

    pub fn validators_known(&self) -> u64 {
        self.validators_known.load(Ordering::Relaxed)
    }

    pub fn epoch_summary(&self, epoch: u64) -> Option<EpochSummary> {
        self.epochs.get(&epoch).map(|s| s.clone())
    }

    pub fn slot_summary(&self, slot: u64) -> Option<SlotSummary> {
        self.slots.get(&slot).map(|s| s.clone())
    }

    /// Epoch numbers with a summary, ascending.
    pub fn epochs(&self) -> Vec<u64> {
        let mut epochs: Vec<u64> = self.epochs.iter().map(|e| *e.key()).collect();
        epochs.sort_unstable();
        epochs
    }

    // ── Recording ────────────────────────────────────────────────────────────

    pub fn record_known_validators(&self, count: usize) {
        let count = count as u64;
        self.validators_known.store(count, Ordering::Relaxed);
        self.with_epoch(self.current_epoch(), |e| e.validators_known_total = count);
    }

    pub fn record_register_request(&self) {
        self.with_epoch(self.current_epoch(), |e| e.num_register_validator_requests += 1);
    }

    /// Outcome of one registration batch.
    pub fn record_registrations(&self, received: u64, saved: u64, unverified: u64) {
        self.with_epoch(self.current_epoch(), |e| {
            e.validator_registrations_total += received;
            e.validator_registrations_saved += saved;
            e.validator_registrations_received_unverified += unverified;
        });
        let slot = self.current_slot();
        if self.slots.contains_key(&slot) {
            self.with_slot(slot, |s| s.validator_registrations_total += received);
        }
    }

    /// A get-header request. `slot` is `None` when the request was rejected.
    pub fn record_get_header(&self, slot: Option<u64>, pubkey: Option<&str>) {
        let Some(slot) = slot.filter(|s| self.observe_slot(*s)) else {
            self.with_epoch(self.current_epoch(), |e| e.num_get_header_requests += 1);
            return;
        };
        self.with_epoch(epoch_of_slot(slot), |e| e.num_get_header_requests += 1);
        self.with_slot(slot, |s| {
            s.num_get_header_requests += 1;
            if let Some(pk) = pubkey {
                s.proposer_pubkey = Some(pk.to_string());
            }
        });
    }

    pub fn record_header_no_content(&self, slot: u64) {
        if !self.in_window(slot) {
            self.with_epoch(self.current_epoch(), |e| e.num_header_sent_204 += 1);
            return;
        }
        self.with_epoch(epoch_of_slot(slot), |e| e.num_header_sent_204 += 1);
        self.with_slot(slot, |s| s.num_header_sent_204 += 1);
    }

    /// A get-payload request. `slot` is `None` when the request was rejected.
    pub fn record_get_payload(&self, slot: Option<u64>) {
        let Some(slot) = slot.filter(|s| self.observe_slot(*s)) else {
            self.with_epoch(self.current_epoch(), |e| e.num_get_payload_requests += 1);
            return;
        };
        self.with_epoch(epoch_of_slot(slot), |e| e.num_get_payload_requests += 1);
        self.with_slot(slot, |s| s.num_get_payload_requests += 1);
    }

    pub fn record_payload_sent(&self, slot: u64) {
        if !self.in_window(slot) {
            self.with_epoch(self.current_epoch(), |e| e.num_payload_sent += 1);
            return;
        }
        self.with_epoch(epoch_of_slot(slot), |e| e.num_payload_sent += 1);
        self.with_slot(slot, |s| s.num_payload_sent += 1);
    }

    // ── Internals ────────────────────────────────────────────────────────────

    /// Advance the clock to `slot`. Returns false if the slot is too far
    /// ahead to be tracked.
    fn observe_slot(&self, slot: u64) -> bool {
        if self.clock_started.load(Ordering::Acquire) && !self.in_window(slot) {
            tracing::debug!(slot, current_slot = self.current_slot(), "slot too far ahead; not tracked");
            return false;
        }
        let previous = self.highest_slot.fetch_max(slot, Ordering::Relaxed);
        self.clock_started.store(true, Ordering::Release);

        let epoch = epoch_of_slot(slot);
        self.with_epoch(epoch, |e| e.observe_slot(slot));

        if epoch > epoch_of_slot(previous) {
            self.prune(epoch);
        }
        true
    }

    fn in_window(&self, slot: u64) -> bool {
        epoch_of_slot(slot) <= self.current_epoch().saturating_add(RETAINED_EPOCHS)
    }

    fn prune(&self, newest_epoch: u64) {
        let cutoff = newest_epoch.saturating_sub(RETAINED_EPOCHS - 1);
        self.epochs.retain(|epoch, _| *epoch >= cutoff);
        self.slots.retain(|_, s| s.epoch >= cutoff);
    }

    fn with_epoch(&self, epoch: u64, f: impl FnOnce(&mut EpochSummary)) {
        let known = self.validators_known();
        let mut entry = self.epochs.entry(epoch).or_insert_with(|| {
            let mut summary = EpochSummary::new(epoch);
            summary.validators_known_total = known;
            summary
        });
        f(&mut entry);
    }

    fn with_slot(&self, slot: u64, f: impl FnOnce(&mut SlotSummary)) {
        let known = self.validators_known();
        let mut entry = self.slots.entry(slot).or_insert_with(|| {
            let mut summary = SlotSummary::new(slot);
            summary.validators_known_total = known;
            summary
        });
        f(&mut entry);
    }
}
