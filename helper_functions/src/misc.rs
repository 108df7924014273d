use types::{
    config::Config,
    primitives::{Epoch, Slot},
};

#[must_use]
pub fn compute_epoch_at_slot(config: &Config, slot: Slot) -> Epoch {
    slot / config.slots_per_epoch
}

#[must_use]
pub fn compute_start_slot_at_epoch(config: &Config, epoch: Epoch) -> Slot {
    epoch.saturating_mul(config.slots_per_epoch.get())
}

#[must_use]
pub fn is_epoch_start(config: &Config, slot: Slot) -> bool {
    slots_since_epoch_start(config, slot) == 0
}

#[must_use]
pub fn slots_since_epoch_start(config: &Config, slot: Slot) -> u64 {
    slot - compute_start_slot_at_epoch(config, compute_epoch_at_slot(config, slot))
}

/// Start slot of the epoch containing `slot`.
#[must_use]
pub fn epoch_boundary_slot(config: &Config, slot: Slot) -> Slot {
    compute_start_slot_at_epoch(config, compute_epoch_at_slot(config, slot))
}

/// Nearest archival-stride slot at or below `slot`.
#[must_use]
pub fn start_of_archived_point(config: &Config, slot: Slot) -> Slot {
    slot - slot % config.slots_per_archived_point
}

#[must_use]
pub fn is_archived_point(config: &Config, slot: Slot) -> bool {
    slot % config.slots_per_archived_point == 0
}
