use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use types::{
    config::Config,
    primitives::{Slot, H256},
    traits::{BeaconBlock as _, BeaconState as _},
};

use crate::{
    boundary_cache::EpochBoundaryCache,
    error::Error,
    metrics::Metrics,
    misc::{verify_not_cancelled, SplitInfo},
    store::StateStore,
    transition::StateTransition,
};

/// Regenerates beacon states on demand from sparsely persisted anchors.
///
/// Reads and writes route through the hot or cold section depending on the
/// finalized split. All operations are safe to call from parallel readers;
/// mutations of the boundary cache and the split go through their own
/// locks, and no lock is ever held across a store call.
pub struct StateGen<S: StateStore, T> {
    pub(crate) config: Arc<Config>,
    pub(crate) store: Arc<S>,
    pub(crate) transition: T,
    pub(crate) split: RwLock<SplitInfo>,
    pub(crate) boundary_cache: EpochBoundaryCache,
    pub(crate) metrics: Option<Arc<Metrics>>,
}

impl<S, T> StateGen<S, T>
where
    S: StateStore,
    T: StateTransition<Block = S::Block, State = S::State>,
{
    #[must_use]
    pub fn new(
        config: Arc<Config>,
        store: Arc<S>,
        transition: T,
        split: SplitInfo,
        metrics: Option<Arc<Metrics>>,
    ) -> Self {
        let boundary_cache = EpochBoundaryCache::build(Arc::clone(&config));

        Self {
            config,
            store,
            transition,
            split: RwLock::new(split),
            boundary_cache,
            metrics,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &Arc<Config> {
        &self.config
    }

    #[must_use]
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    #[must_use]
    pub const fn boundary_cache(&self) -> &EpochBoundaryCache {
        &self.boundary_cache
    }

    /// Snapshot of the finalized split point.
    #[must_use]
    pub fn split(&self) -> SplitInfo {
        *self.split.read()
    }

    /// Replaces the split when finalization advances.
    pub fn set_split(&self, split: SplitInfo) {
        *self.split.write() = split;
    }

    /// True if the state for `block_root` is either persisted in the hot
    /// section or regenerable from it.
    pub fn hot_state_exists(&self, cancel: &CancellationToken, block_root: H256) -> Result<bool> {
        verify_not_cancelled(cancel)?;

        self.store.has_hot_state_summary(block_root)
    }

    /// Materializes the state at `block_root`, routing on the split.
    pub fn state_by_root(
        &self,
        cancel: &CancellationToken,
        block_root: H256,
    ) -> Result<Arc<S::State>> {
        let split = self.split();

        if block_root == split.root {
            return self.load_cold_state_by_root(cancel, block_root);
        }

        verify_not_cancelled(cancel)?;

        let block = self
            .store
            .block(block_root)?
            .ok_or(Error::BlockNotFound { block_root })?;

        if block.slot() <= split.slot {
            self.load_cold_state_by_root(cancel, block_root)
        } else {
            self.load_hot_state_by_root(cancel, block_root)
        }
    }

    /// Materializes the canonical state at `slot`, routing on the split.
    pub fn state_by_slot(&self, cancel: &CancellationToken, slot: Slot) -> Result<Arc<S::State>> {
        if slot <= self.split().slot {
            self.load_cold_state_by_slot(cancel, slot)
        } else {
            self.load_hot_state_by_slot(cancel, slot)
        }
    }

    /// Persists `state` under `block_root`, routing on the split.
    pub fn save_state(
        &self,
        cancel: &CancellationToken,
        block_root: H256,
        state: Arc<S::State>,
    ) -> Result<()> {
        let split = self.split();

        if block_root == split.root || state.slot() <= split.slot {
            self.save_cold_state(cancel, block_root, state)
        } else {
            self.save_hot_state(cancel, block_root, state)
        }
    }
}
