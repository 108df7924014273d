use std::sync::Arc;

use anyhow::{bail, Result};
use helper_functions::misc;
use log::{debug, info};
use tokio_util::sync::CancellationToken;
use types::{
    primitives::{Slot, H256},
    traits::{BeaconBlock as _, BeaconState as _},
};

use crate::{
    error::Error,
    misc::{verify_not_cancelled, HotStateSummary},
    state_gen::StateGen,
    store::StateStore,
    transition::StateTransition,
};

impl<S, T> StateGen<S, T>
where
    S: StateStore,
    T: StateTransition<Block = S::Block, State = S::State>,
{
    /// Saves a post-finalization state. On an epoch boundary the full state
    /// is persisted; every slot additionally gets a summary pointing at its
    /// epoch-boundary ancestor so the state can be regenerated later.
    ///
    /// The state write happens before the summary write, so a reader that
    /// observes a summary may rely on its boundary state being present.
    /// Idempotent under identical inputs.
    pub fn save_hot_state(
        &self,
        cancel: &CancellationToken,
        block_root: H256,
        state: Arc<S::State>,
    ) -> Result<()> {
        verify_not_cancelled(cancel)?;

        if misc::is_epoch_start(&self.config, state.slot()) {
            self.store.save_state(Arc::clone(&state), block_root)?;
            self.boundary_cache.put(state.slot(), block_root)?;

            info!(
                "saved full state on epoch boundary (slot: {}, block_root: {block_root:?})",
                state.slot(),
            );

            if let Some(metrics) = self.metrics.as_ref() {
                metrics.hot_state_saved.inc();
            }
        }

        let boundary_root = self.epoch_boundary_root(cancel, block_root, &state)?;

        verify_not_cancelled(cancel)?;

        self.store.save_hot_state_summary(HotStateSummary {
            slot: state.slot(),
            latest_root: block_root,
            boundary_root,
        })?;

        if let Some(metrics) = self.metrics.as_ref() {
            metrics.hot_summary_saved.inc();
        }

        Ok(())
    }

    /// Loads a post-finalization state, replaying blocks from the nearest
    /// epoch-boundary ancestor when the requested slot is intermediate.
    pub fn load_hot_state_by_root(
        &self,
        cancel: &CancellationToken,
        block_root: H256,
    ) -> Result<Arc<S::State>> {
        verify_not_cancelled(cancel)?;

        let summary = self
            .store
            .hot_state_summary(block_root)?
            .ok_or(Error::SummaryNotFound { block_root })?;

        verify_not_cancelled(cancel)?;

        let boundary_state =
            self.store
                .state(summary.boundary_root)?
                .ok_or(Error::BoundaryStateMissing {
                    boundary_root: summary.boundary_root,
                })?;

        // Already anchored on a boundary; nothing to replay.
        if misc::is_epoch_start(&self.config, summary.slot) {
            return Ok(boundary_state);
        }

        let blocks = self.load_blocks(
            cancel,
            boundary_state.slot() + 1,
            summary.slot,
            summary.latest_root,
        )?;

        self.replay_blocks(cancel, &boundary_state, &blocks, summary.slot)
            .map(Arc::new)
    }

    /// Loads a hot state given only a slot. Slower than by-root: the whole
    /// window from the epoch boundary has to be fetched and walked.
    pub fn load_hot_state_by_slot(
        &self,
        cancel: &CancellationToken,
        slot: Slot,
    ) -> Result<Arc<S::State>> {
        let boundary_slot = misc::epoch_boundary_slot(&self.config, slot);

        let boundary_root = self
            .boundary_cache
            .get(boundary_slot)?
            .ok_or(Error::BoundaryRootNotCached {
                slot: boundary_slot,
            })?;

        verify_not_cancelled(cancel)?;

        let boundary_state =
            self.store
                .state(boundary_root)?
                .ok_or(Error::BoundaryStateMissing { boundary_root })?;

        let (last_root, last_slot) = self.last_valid_block(cancel, slot)?;

        // Nothing was proposed past the anchor; only empty slots remain.
        if last_slot <= boundary_state.slot() {
            return self
                .replay_blocks(cancel, &boundary_state, &[], slot)
                .map(Arc::new);
        }

        let blocks = self.load_blocks(cancel, boundary_state.slot() + 1, last_slot, last_root)?;

        self.replay_blocks(cancel, &boundary_state, &blocks, slot)
            .map(Arc::new)
    }

    /// Root of the canonical block at the most recent epoch-boundary slot
    /// at or below the state's slot.
    ///
    /// If the boundary slot itself is a skip slot, the last block before it
    /// anchors the epoch and its state is backfilled into the store.
    pub(crate) fn epoch_boundary_root(
        &self,
        cancel: &CancellationToken,
        block_root: H256,
        state: &S::State,
    ) -> Result<H256> {
        let boundary_slot = misc::epoch_boundary_slot(&self.config, state.slot());

        if let Some(root) = self.boundary_cache.get(boundary_slot)? {
            return Ok(root);
        }

        // A state sitting on the boundary anchors itself.
        if state.slot() == boundary_slot {
            self.boundary_cache.put(boundary_slot, block_root)?;

            return Ok(block_root);
        }

        if boundary_slot == 0 {
            verify_not_cancelled(cancel)?;

            let root = self.store.genesis_block()?.hash_tree_root();

            self.boundary_cache.put(boundary_slot, root)?;

            return Ok(root);
        }

        verify_not_cancelled(cancel)?;

        let roots = self.store.block_roots(boundary_slot, boundary_slot)?;

        let root = match roots.as_slice() {
            [] => self.last_valid_state(cancel, boundary_slot)?,
            [root] => *root,
            _ => {
                if let Some(metrics) = self.metrics.as_ref() {
                    metrics.epoch_boundary_violations.inc();
                }

                bail!(Error::IncorrectBoundaryRootCount)
            }
        };

        self.boundary_cache.put(boundary_slot, root)?;

        Ok(root)
    }

    /// Skip-slot backfill: `boundary_slot` has no block, so the last block
    /// before it anchors the epoch. The anchor state is replayed from the
    /// previous boundary and persisted so later loads do not repeat the
    /// work. This is the only write the hot path performs during a read.
    /// An epoch without a single block writes nothing: the previous anchor
    /// is reused as is.
    fn last_valid_state(
        &self,
        cancel: &CancellationToken,
        boundary_slot: Slot,
    ) -> Result<H256> {
        let split = self.split();

        verify_not_cancelled(cancel)?;

        let roots = self.store.block_roots(split.slot, boundary_slot)?;

        let last_root = roots.last().copied().ok_or(Error::NoBlockInRange {
            start_slot: split.slot,
            end_slot: boundary_slot,
        })?;

        let previous_boundary = boundary_slot - self.config.slots_per_epoch.get();

        let previous_root =
            self.boundary_cache
                .get(previous_boundary)?
                .ok_or(Error::BoundaryRootNotCached {
                    slot: previous_boundary,
                })?;

        // An epoch with no blocks at all: the previous anchor carries over.
        // Its state is already persisted at its true slot, and writing a
        // replayed state under the same root would clobber it.
        if last_root == previous_root {
            return Ok(previous_root);
        }

        verify_not_cancelled(cancel)?;

        let start_state =
            self.store
                .state(previous_root)?
                .ok_or(Error::BoundaryStateMissing {
                    boundary_root: previous_root,
                })?;

        let blocks = self.load_blocks(cancel, start_state.slot() + 1, boundary_slot, last_root)?;
        let state = self.replay_blocks(cancel, &start_state, &blocks, boundary_slot)?;

        verify_not_cancelled(cancel)?;

        self.store.save_state(Arc::new(state), last_root)?;

        debug!(
            "backfilled epoch boundary state \
             (boundary_slot: {boundary_slot}, block_root: {last_root:?})",
        );

        Ok(last_root)
    }

    /// Root and slot of the last block at or before `slot`.
    fn last_valid_block(
        &self,
        cancel: &CancellationToken,
        slot: Slot,
    ) -> Result<(H256, Slot)> {
        let split = self.split();

        verify_not_cancelled(cancel)?;

        let roots = self.store.block_roots(split.slot, slot)?;

        let last_root = roots.last().copied().ok_or(Error::NoBlockInRange {
            start_slot: split.slot,
            end_slot: slot,
        })?;

        verify_not_cancelled(cancel)?;

        let block = self
            .store
            .block(last_root)?
            .ok_or(Error::BlockNotFound {
                block_root: last_root,
            })?;

        Ok((last_root, block.slot()))
    }
}
