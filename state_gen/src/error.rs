use thiserror::Error;
use types::primitives::{Slot, H256};

/// Failure kinds surfaced by the state generation core.
///
/// Nothing is recovered silently and nothing is retried. Store and
/// transition-function failures propagate as the underlying errors without
/// being wrapped in this enum.
#[derive(Debug, Error)]
pub enum Error {
    #[error("end block roots don't match")]
    EndBlockRootsMismatch,
    #[error("block not found in store: {block_root:?}")]
    BlockNotFound { block_root: H256 },
    #[error("no hot state summary for block root {block_root:?}")]
    SummaryNotFound { block_root: H256 },
    #[error("boundary state is missing for root {boundary_root:?}")]
    BoundaryStateMissing { boundary_root: H256 },
    #[error("epoch boundary root is not cached for slot {slot}")]
    BoundaryRootNotCached { slot: Slot },
    #[error("incorrect length for epoch boundary root")]
    IncorrectBoundaryRootCount,
    #[error("cache key {slot} is not an epoch boundary slot")]
    SlotNotEpochBoundary { slot: Slot },
    #[error("no blocks in slot range [{start_slot}, {end_slot}]")]
    NoBlockInRange { start_slot: Slot, end_slot: Slot },
    #[error("cannot replay state at slot {state_slot} back to slot {target_slot}")]
    ReplayTargetBeforeState { state_slot: Slot, target_slot: Slot },
    #[error("no archived state at or before slot {slot}")]
    ArchivedStateMissing { slot: Slot },
    #[error("genesis block is not in the store")]
    GenesisBlockMissing,
    #[error("operation canceled")]
    Cancelled,
}
