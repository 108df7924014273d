use anyhow::Result;
use types::{
    primitives::Slot,
    traits::{BeaconBlock, BeaconState},
};

/// The consensus state-transition function, consumed as a capability.
///
/// Both operations are pure: they return a new state and leave the input
/// untouched. Failures propagate to the caller unchanged; the core never
/// retries them.
pub trait StateTransition: Send + Sync {
    type Block: BeaconBlock;
    type State: BeaconState;

    /// Advances `state` through empty slots until it sits at `target_slot`.
    /// A target equal to the state's slot is a no-op.
    fn process_slots(&self, state: &Self::State, target_slot: Slot) -> Result<Self::State>;

    /// Applies `block` on top of `state`. The caller advances the state to
    /// the block's slot first.
    fn state_transition(&self, state: &Self::State, block: &Self::Block) -> Result<Self::State>;
}
