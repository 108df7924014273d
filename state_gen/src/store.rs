use std::sync::Arc;

use anyhow::Result;
use types::{
    primitives::{Slot, H256},
    traits::{BeaconBlock, BeaconState},
};

use crate::misc::HotStateSummary;

/// Narrow interface over the block and state database.
///
/// This trait is the sole seam between the state generation core and
/// persistence; the core performs no other storage access. Implementations
/// must be thread-safe and must uphold the [`block_roots`] ordering
/// contract, which the chain reconstruction algorithm depends on.
///
/// [`block_roots`]: StateStore::block_roots
pub trait StateStore: Send + Sync {
    type Block: BeaconBlock;
    type State: BeaconState;

    fn block(&self, block_root: H256) -> Result<Option<Arc<Self::Block>>>;

    /// Full state persisted under the root of the block it belongs to.
    fn state(&self, block_root: H256) -> Result<Option<Arc<Self::State>>>;

    fn genesis_block(&self) -> Result<Arc<Self::Block>>;

    fn has_hot_state_summary(&self, block_root: H256) -> Result<bool>;

    fn hot_state_summary(&self, block_root: H256) -> Result<Option<HotStateSummary>>;

    /// Every persisted block root whose slot lies in `[start_slot, end_slot]`,
    /// ascending by slot. Roots sharing a slot keep their insertion order.
    fn block_roots(&self, start_slot: Slot, end_slot: Slot) -> Result<Vec<H256>>;

    fn save_state(&self, state: Arc<Self::State>, block_root: H256) -> Result<()>;

    fn save_hot_state_summary(&self, summary: HotStateSummary) -> Result<()>;
}
