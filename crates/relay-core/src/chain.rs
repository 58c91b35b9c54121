//! Consensus-layer timing constants.

use std::time::Duration;

pub const SLOTS_PER_EPOCH: u64 = 32;
pub const SECONDS_PER_SLOT: u64 = 12;

/// Wall-clock duration of one epoch (384s). Known validators are refreshed on this period.
pub const DURATION_PER_EPOCH: Duration = Duration::from_secs(SLOTS_PER_EPOCH * SECONDS_PER_SLOT);

pub fn epoch_of_slot(slot: u64) -> u64 {
    slot / SLOTS_PER_EPOCH
}

/// First and last slot of an epoch, inclusive.
pub fn epoch_slot_range(epoch: u64) -> (u64, u64) {
    let first = epoch.saturating_mul(SLOTS_PER_EPOCH);
    (first, first.saturating_add(SLOTS_PER_EPOCH - 1))
}
