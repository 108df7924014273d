use crate::primitives::{Slot, H256};

/// Read-only view of a beacon block as seen by the state generation core.
///
/// The payload is opaque. The core inspects the attributes below and the
/// block's own hash tree root, nothing else.
pub trait BeaconBlock {
    fn slot(&self) -> Slot;

    fn parent_root(&self) -> H256;

    fn state_root(&self) -> H256;

    /// The block's own root under the system's tree hasher.
    fn hash_tree_root(&self) -> H256;
}

/// Read-only view of a consensus state.
///
/// States are values: the transition function produces new ones instead of
/// mutating in place, so regeneration is free to clone an anchor.
pub trait BeaconState: Clone {
    fn slot(&self) -> Slot;
}
