use std::sync::Arc;

use anyhow::{ensure, Result};
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
    /// Collects the chain of blocks ending in `end_root` whose slots lie in
    /// `[start_slot, end_slot]`, leaf first.
    ///
    /// The candidate roots form a tree, not a line: forks may overlap the
    /// window and siblings may share a slot. Walking parent roots from the
    /// end block downward keeps exactly the ancestral path and drops every
    /// branch the leaf does not descend from.
    pub fn load_blocks(
        &self,
        cancel: &CancellationToken,
        start_slot: Slot,
        end_slot: Slot,
        end_root: H256,
    ) -> Result<Vec<Arc<S::Block>>> {
        verify_not_cancelled(cancel)?;

        let roots = self.store.block_roots(start_slot, end_slot)?;

        ensure!(
            !roots.is_empty(),
            Error::NoBlockInRange {
                start_slot,
                end_slot,
            },
        );

        let blocks = roots
            .iter()
            .map(|root| {
                verify_not_cancelled(cancel)?;

                self.store
                    .block(*root)?
                    .ok_or(Error::BlockNotFound { block_root: *root })
                    .map_err(Into::into)
            })
            .collect::<Result<Vec<_>>>()?;

        // The walk starts at the leaf, so the highest candidate must be the
        // leaf itself.
        ensure!(
            roots[roots.len() - 1] == end_root,
            Error::EndBlockRootsMismatch,
        );

        let mut chain = vec![Arc::clone(&blocks[blocks.len() - 1])];

        // Remaining candidates, highest slot first. A candidate is kept only
        // if it is the parent of the newest block kept so far.
        for (root, block) in roots.iter().zip(&blocks).rev().skip(1) {
            let cursor = chain[chain.len() - 1].parent_root();

            if *root != cursor {
                continue;
            }

            chain.push(Arc::clone(block));
        }

        Ok(chain)
    }

    /// Replays `blocks` (leaf first, as produced by [`load_blocks`]) on top
    /// of `state`, then advances empty slots until `target_slot`.
    ///
    /// Blocks at or below the state's slot are skipped: the anchor state
    /// already reflects them.
    ///
    /// [`load_blocks`]: Self::load_blocks
    pub fn replay_blocks(
        &self,
        cancel: &CancellationToken,
        state: &S::State,
        blocks: &[Arc<S::Block>],
        target_slot: Slot,
    ) -> Result<S::State> {
        let mut state = state.clone();

        // Leaf first on the way in, oldest first on the way through.
        for block in blocks.iter().rev() {
            if block.slot() <= state.slot() {
                continue;
            }

            verify_not_cancelled(cancel)?;

            state = self.transition.process_slots(&state, block.slot())?;
            state = self.transition.state_transition(&state, block)?;
        }

        ensure!(
            state.slot() <= target_slot,
            Error::ReplayTargetBeforeState {
                state_slot: state.slot(),
                target_slot,
            },
        );

        if state.slot() < target_slot {
            verify_not_cancelled(cancel)?;

            state = self.transition.process_slots(&state, target_slot)?;
        }

        Ok(state)
    }
}
