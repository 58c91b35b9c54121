//! Per-epoch and per-slot request summaries.
//!
//! Counters only ever grow during a summary's lifetime. Which slots of an
//! epoch were actually seen is tracked so `is_complete` can be derived.

use serde::{Deserialize, Serialize};

use crate::chain::{epoch_of_slot, epoch_slot_range, SLOTS_PER_EPOCH};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochSummary {
    pub epoch: u64,

    // derived from the epoch
    pub slot_first: u64,
    pub slot_last: u64,

    // range of slots this relay actually served; may start mid-epoch after a restart
    pub slot_first_processed: Option<u64>,
    pub slot_last_processed: Option<u64>,

    pub validators_known_total: u64,
    pub validator_registrations_total: u64,
    pub validator_registrations_saved: u64,
    pub validator_registrations_received_unverified: u64,

    // all requests to a path, invalid ones included
    pub num_register_validator_requests: u64,
    pub num_get_header_requests: u64,
    pub num_get_payload_requests: u64,

    pub num_header_sent_204: u64,
    pub num_payload_sent: u64,

    pub is_complete: bool,

    #[serde(skip)]
    seen_slots: u32,
}

impl EpochSummary {
    pub fn new(epoch: u64) -> Self {
        let (slot_first, slot_last) = epoch_slot_range(epoch);
        Self {
            epoch,
            slot_first,
            slot_last,
            ..Default::default()
        }
    }

    /// Mark a slot as observed. Slots outside this epoch are ignored.
    pub fn observe_slot(&mut self, slot: u64) {
        if epoch_of_slot(slot) != self.epoch {
            return;
        }
        self.slot_first_processed = Some(self.slot_first_processed.map_or(slot, |s| s.min(slot)));
        self.slot_last_processed = Some(self.slot_last_processed.map_or(slot, |s| s.max(slot)));

        // bit index < SLOTS_PER_EPOCH (32) fits the u32 mask
        self.seen_slots |= 1u32 << (slot - self.slot_first);
        self.is_complete = self.seen_slots.count_ones() as u64 == SLOTS_PER_EPOCH;
    }

    pub fn slots_seen(&self) -> u32 {
        self.seen_slots.count_ones()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSummary {
    pub slot: u64,
    pub epoch: u64,

    pub validators_known_total: u64,
    pub validator_registrations_total: u64,

    /// Proposer pubkey as requested in getHeader.
    pub proposer_pubkey: Option<String>,

    pub num_get_header_requests: u64,
    pub num_get_payload_requests: u64,

    pub num_header_sent_204: u64,
    pub num_payload_sent: u64,
}

impl SlotSummary {
    pub fn new(slot: u64) -> Self {
        Self {
            slot,
            epoch: epoch_of_slot(slot),
            ..Default::default()
        }
    }
}
