use core::num::NonZeroU64;

use nonzero_ext::nonzero;

/// Runtime chain parameters consumed by the state generation core.
///
/// Only the parameters the core reads are represented here. The archival
/// stride must be a multiple of `slots_per_epoch`.
#[derive(Clone, Debug)]
pub struct Config {
    /// Number of slots in an epoch. Epoch boundary states anchor hot replay.
    pub slots_per_epoch: NonZeroU64,
    /// Distance in slots between archived full states in cold storage.
    pub slots_per_archived_point: NonZeroU64,
}

impl Default for Config {
    fn default() -> Self {
        Self::mainnet()
    }
}

impl Config {
    #[must_use]
    pub fn mainnet() -> Self {
        Self {
            slots_per_epoch: nonzero!(32_u64),
            slots_per_archived_point: nonzero!(2048_u64),
        }
    }

    #[must_use]
    pub fn minimal() -> Self {
        Self {
            slots_per_epoch: nonzero!(8_u64),
            slots_per_archived_point: nonzero!(64_u64),
        }
    }
}
