use std::sync::Arc;

use anyhow::Result;
use helper_functions::misc;
use log::debug;
use tokio_util::sync::CancellationToken;
use types::{
    primitives::{Slot, H256},
    traits::{BeaconBlock as _, BeaconState as _},
};

use crate::{
    error::Error, misc::verify_not_cancelled, state_gen::StateGen, store::StateStore,
    transition::StateTransition,
};

impl<S, T> StateGen<S, T>
where
    S: StateStore,
    T: StateTransition<Block = S::Block, State = S::State>,
{
    /// Saves a pre-finalization state. Only archival-stride slots persist a
    /// full state; everything else is regenerable from the nearest archived
    /// point and is dropped.
    pub fn save_cold_state(
        &self,
        cancel: &CancellationToken,
        block_root: H256,
        state: Arc<S::State>,
    ) -> Result<()> {
        verify_not_cancelled(cancel)?;

        if !misc::is_archived_point(&self.config, state.slot()) {
            return Ok(());
        }

        self.store.save_state(Arc::clone(&state), block_root)?;

        debug!(
            "saved archived state (slot: {}, block_root: {block_root:?})",
            state.slot(),
        );

        if let Some(metrics) = self.metrics.as_ref() {
            metrics.cold_state_saved.inc();
        }

        Ok(())
    }

    /// Loads a pre-finalization state by replaying forward from the nearest
    /// archived point at or below the block's slot.
    pub fn load_cold_state_by_root(
        &self,
        cancel: &CancellationToken,
        block_root: H256,
    ) -> Result<Arc<S::State>> {
        verify_not_cancelled(cancel)?;

        // The block may sit on an archived point itself.
        if let Some(state) = self.store.state(block_root)? {
            return Ok(state);
        }

        verify_not_cancelled(cancel)?;

        let block = self
            .store
            .block(block_root)?
            .ok_or(Error::BlockNotFound { block_root })?;

        let slot = block.slot();
        let anchor_state = self.archived_state_at_or_before(cancel, slot)?;

        if anchor_state.slot() >= slot {
            return self
                .replay_blocks(cancel, &anchor_state, &[], slot)
                .map(Arc::new);
        }

        let blocks = self.load_blocks(cancel, anchor_state.slot() + 1, slot, block_root)?;

        self.replay_blocks(cancel, &anchor_state, &blocks, slot)
            .map(Arc::new)
    }

    /// Loads the canonical pre-finalization state at `slot`, which may be a
    /// skip slot.
    pub fn load_cold_state_by_slot(
        &self,
        cancel: &CancellationToken,
        slot: Slot,
    ) -> Result<Arc<S::State>> {
        let anchor_state = self.archived_state_at_or_before(cancel, slot)?;

        verify_not_cancelled(cancel)?;

        // The last block at or below the requested slot bounds the replay
        // window; anything after it is empty slots.
        let roots = self.store.block_roots(anchor_state.slot(), slot)?;

        let Some(last_root) = roots.last().copied() else {
            return self
                .replay_blocks(cancel, &anchor_state, &[], slot)
                .map(Arc::new);
        };

        verify_not_cancelled(cancel)?;

        let last_block = self.store.block(last_root)?.ok_or(Error::BlockNotFound {
            block_root: last_root,
        })?;

        if last_block.slot() <= anchor_state.slot() {
            return self
                .replay_blocks(cancel, &anchor_state, &[], slot)
                .map(Arc::new);
        }

        let blocks = self.load_blocks(
            cancel,
            anchor_state.slot() + 1,
            last_block.slot(),
            last_root,
        )?;

        self.replay_blocks(cancel, &anchor_state, &blocks, slot)
            .map(Arc::new)
    }

    /// Nearest archived full state at or below `slot`, walking archived
    /// points backward across skip slots. Terminates at the genesis state.
    fn archived_state_at_or_before(
        &self,
        cancel: &CancellationToken,
        slot: Slot,
    ) -> Result<Arc<S::State>> {
        let mut point = misc::start_of_archived_point(&self.config, slot);

        loop {
            verify_not_cancelled(cancel)?;

            // Archived states live under the root of the block proposed on
            // the stride slot. A skipped stride slot has no block and the
            // walk falls through to the previous point.
            let roots = self.store.block_roots(point, point)?;

            for root in roots.iter().rev() {
                if let Some(state) = self.store.state(*root)? {
                    return Ok(state);
                }
            }

            if point == 0 {
                verify_not_cancelled(cancel)?;

                let genesis_root = self.store.genesis_block()?.hash_tree_root();

                return self
                    .store
                    .state(genesis_root)?
                    .ok_or(Error::ArchivedStateMissing { slot })
                    .map_err(Into::into);
            }

            point = point.saturating_sub(self.config.slots_per_archived_point.get());
        }
    }
}
