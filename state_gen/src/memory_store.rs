use std::sync::Arc;

use anyhow::Result;
use im::{HashMap, OrdMap};
use itertools::Itertools as _;
use parking_lot::Mutex;
use tap::Pipe as _;
use types::{
    primitives::{Slot, H256},
    traits::{BeaconBlock, BeaconState},
};

use crate::{error::Error, misc::HotStateSummary, store::StateStore};

/// In-memory [`StateStore`].
///
/// Used by tests and by ephemeral deployments that never touch disk. The
/// slot index preserves insertion order among roots sharing a slot, which
/// is observable through [`StateStore::block_roots`].
pub struct MemoryStore<B, S> {
    blocks: Mutex<HashMap<H256, Arc<B>>>,
    block_roots_by_slot: Mutex<OrdMap<Slot, Vec<H256>>>,
    states: Mutex<HashMap<H256, Arc<S>>>,
    summaries: Mutex<HashMap<H256, HotStateSummary>>,
    genesis_root: Mutex<Option<H256>>,
}

impl<B, S> Default for MemoryStore<B, S> {
    fn default() -> Self {
        Self {
            blocks: Mutex::default(),
            block_roots_by_slot: Mutex::default(),
            states: Mutex::default(),
            summaries: Mutex::default(),
            genesis_root: Mutex::default(),
        }
    }
}

impl<B: BeaconBlock, S> MemoryStore<B, S> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes `block` under its hash tree root and returns the root.
    ///
    /// The first block saved at slot 0 becomes the genesis block unless one
    /// was designated explicitly with [`set_genesis_root`].
    ///
    /// [`set_genesis_root`]: Self::set_genesis_root
    pub fn save_block(&self, block: Arc<B>) -> H256 {
        let block_root = block.hash_tree_root();
        let slot = block.slot();

        let mut blocks = self.blocks.lock();

        if blocks.insert(block_root, block).is_none() {
            self.block_roots_by_slot
                .lock()
                .entry(slot)
                .or_insert_with(Vec::new)
                .push(block_root);

            if slot == 0 {
                self.genesis_root.lock().get_or_insert(block_root);
            }
        }

        block_root
    }

    pub fn set_genesis_root(&self, block_root: H256) {
        *self.genesis_root.lock() = Some(block_root);
    }
}

impl<B, S> StateStore for MemoryStore<B, S>
where
    B: BeaconBlock + Send + Sync,
    S: BeaconState + Send + Sync,
{
    type Block = B;
    type State = S;

    fn block(&self, block_root: H256) -> Result<Option<Arc<B>>> {
        self.blocks.lock().get(&block_root).cloned().pipe(Ok)
    }

    fn state(&self, block_root: H256) -> Result<Option<Arc<S>>> {
        self.states.lock().get(&block_root).cloned().pipe(Ok)
    }

    fn genesis_block(&self) -> Result<Arc<B>> {
        let genesis_root = self.genesis_root.lock().ok_or(Error::GenesisBlockMissing)?;

        self.blocks
            .lock()
            .get(&genesis_root)
            .cloned()
            .ok_or(Error::GenesisBlockMissing)
            .map_err(Into::into)
    }

    fn has_hot_state_summary(&self, block_root: H256) -> Result<bool> {
        self.summaries.lock().contains_key(&block_root).pipe(Ok)
    }

    fn hot_state_summary(&self, block_root: H256) -> Result<Option<HotStateSummary>> {
        self.summaries.lock().get(&block_root).copied().pipe(Ok)
    }

    fn block_roots(&self, start_slot: Slot, end_slot: Slot) -> Result<Vec<H256>> {
        self.block_roots_by_slot
            .lock()
            .range(start_slot..=end_slot)
            .flat_map(|(_, roots)| roots.iter().copied())
            .collect_vec()
            .pipe(Ok)
    }

    fn save_state(&self, state: Arc<S>, block_root: H256) -> Result<()> {
        self.states.lock().insert(block_root, state);

        Ok(())
    }

    fn save_hot_state_summary(&self, summary: HotStateSummary) -> Result<()> {
        self.summaries.lock().insert(summary.latest_root, summary);

        Ok(())
    }
}
