use core::ops::RangeInclusive;
use std::sync::Arc;

use anyhow::{ensure, Result};
use nonzero_ext::nonzero;
use sha2::{Digest as _, Sha256};
use tokio_util::sync::CancellationToken;
use types::{
    config::Config,
    primitives::{Slot, H256},
    traits::{BeaconBlock, BeaconState},
};

use crate::{
    memory_store::MemoryStore, metrics::Metrics, misc::SplitInfo, state_gen::StateGen,
    transition::StateTransition,
};

pub type TestStateGen = StateGen<MemoryStore<TestBlock, TestState>, TestTransition>;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TestBlock {
    pub slot: Slot,
    pub parent_root: H256,
    pub state_root: H256,
}

impl BeaconBlock for TestBlock {
    fn slot(&self) -> Slot {
        self.slot
    }

    fn parent_root(&self) -> H256 {
        self.parent_root
    }

    fn state_root(&self) -> H256 {
        self.state_root
    }

    fn hash_tree_root(&self) -> H256 {
        let mut hasher = Sha256::new();

        hasher.update(self.slot.to_le_bytes());
        hasher.update(self.parent_root.as_bytes());
        hasher.update(self.state_root.as_bytes());

        H256::from_slice(&hasher.finalize())
    }
}

/// State that records the roots of the blocks applied to reach it.
#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct TestState {
    pub slot: Slot,
    pub applied: Vec<H256>,
}

impl BeaconState for TestState {
    fn slot(&self) -> Slot {
        self.slot
    }
}

pub struct TestTransition;

impl StateTransition for TestTransition {
    type Block = TestBlock;
    type State = TestState;

    fn process_slots(&self, state: &TestState, target_slot: Slot) -> Result<TestState> {
        ensure!(
            state.slot <= target_slot,
            "cannot process slots from {} back to {target_slot}",
            state.slot,
        );

        Ok(TestState {
            slot: target_slot,
            applied: state.applied.clone(),
        })
    }

    fn state_transition(&self, state: &TestState, block: &TestBlock) -> Result<TestState> {
        let mut applied = state.applied.clone();
        applied.push(block.hash_tree_root());

        Ok(TestState {
            slot: block.slot,
            applied,
        })
    }
}

/// Small epochs and a short archival stride keep the fixtures readable.
pub fn test_config() -> Config {
    Config {
        slots_per_epoch: nonzero!(8_u64),
        slots_per_archived_point: nonzero!(16_u64),
    }
}

pub fn new_state_gen(config: Config, split: SplitInfo) -> TestStateGen {
    let metrics = Metrics::new().expect("all metric names are valid");

    StateGen::new(
        Arc::new(config),
        Arc::new(MemoryStore::new()),
        TestTransition,
        split,
        Some(Arc::new(metrics)),
    )
}

pub fn cancel() -> CancellationToken {
    CancellationToken::new()
}

pub fn block(slot: Slot, parent_root: H256) -> TestBlock {
    TestBlock {
        slot,
        parent_root,
        state_root: H256::zero(),
    }
}

/// A block distinguishable from its same-slot siblings by its state root.
pub fn sibling_block(slot: Slot, parent_root: H256, tag: u8) -> TestBlock {
    TestBlock {
        slot,
        parent_root,
        state_root: H256::repeat_byte(tag),
    }
}

pub fn state_at_slot(slot: Slot) -> TestState {
    TestState {
        slot,
        applied: Vec::new(),
    }
}

/// A linear chain with one block per slot, returned indexable by slot.
pub fn chain_of_blocks(
    store: &MemoryStore<TestBlock, TestState>,
    slots: RangeInclusive<Slot>,
) -> (Vec<H256>, Vec<TestBlock>) {
    assert_eq!(*slots.start(), 0, "roots are indexed by slot");

    let mut roots = Vec::new();
    let mut blocks = Vec::new();
    let mut parent_root = H256::zero();

    for slot in slots {
        let block = block(slot, parent_root);

        parent_root = store.save_block(Arc::new(block.clone()));

        roots.push(parent_root);
        blocks.push(block);
    }

    (roots, blocks)
}

/// The first test forest:
///
/// ```text
/// B0 - B1 - - B3 -- B5
///        \- B2 -- B4 -- B6 ----- B8
///                         \- B7
/// ```
pub fn tree1(
    store: &MemoryStore<TestBlock, TestState>,
    genesis_root: H256,
) -> (Vec<H256>, Vec<TestBlock>) {
    let b0 = block(0, genesis_root);
    let r0 = store.save_block(Arc::new(b0.clone()));
    let b1 = block(1, r0);
    let r1 = store.save_block(Arc::new(b1.clone()));
    let b2 = block(2, r1);
    let r2 = store.save_block(Arc::new(b2.clone()));
    let b3 = block(3, r1);
    let r3 = store.save_block(Arc::new(b3.clone()));
    let b4 = block(4, r2);
    let r4 = store.save_block(Arc::new(b4.clone()));
    let b5 = block(5, r3);
    let r5 = store.save_block(Arc::new(b5.clone()));
    let b6 = block(6, r4);
    let r6 = store.save_block(Arc::new(b6.clone()));
    let b7 = block(7, r6);
    let r7 = store.save_block(Arc::new(b7.clone()));
    let b8 = block(8, r6);
    let r8 = store.save_block(Arc::new(b8.clone()));

    (
        vec![r0, r1, r2, r3, r4, r5, r6, r7, r8],
        vec![b0, b1, b2, b3, b4, b5, b6, b7, b8],
    )
}

/// The second test forest, with four siblings sharing slot 2:
///
/// ```text
/// B0 - B1
///        \- B21
///        \- B22
///        \- B23
///        \- B24 -- B3
/// ```
pub fn tree2(
    store: &MemoryStore<TestBlock, TestState>,
    genesis_root: H256,
) -> (Vec<H256>, Vec<TestBlock>) {
    let b0 = block(0, genesis_root);
    let r0 = store.save_block(Arc::new(b0.clone()));
    let b1 = block(1, r0);
    let r1 = store.save_block(Arc::new(b1.clone()));
    let b21 = sibling_block(2, r1, 1);
    let r21 = store.save_block(Arc::new(b21.clone()));
    let b22 = sibling_block(2, r1, 2);
    let r22 = store.save_block(Arc::new(b22.clone()));
    let b23 = sibling_block(2, r1, 3);
    let r23 = store.save_block(Arc::new(b23.clone()));
    let b24 = sibling_block(2, r1, 4);
    let r24 = store.save_block(Arc::new(b24.clone()));
    let b3 = block(3, r24);
    let r3 = store.save_block(Arc::new(b3.clone()));

    (
        vec![r0, r1, r21, r22, r23, r24, r3],
        vec![b0, b1, b21, b22, b23, b24, b3],
    )
}
