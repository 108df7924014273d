use core::time::Duration;
use std::sync::Arc;

use anyhow::{anyhow, ensure, Result};
use cached::{Cached as _, SizedCache};
use log::warn;
use parking_lot::{Mutex, MutexGuard};
use tap::Pipe as _;
use thiserror::Error as ThisError;
use types::{
    config::Config,
    primitives::{Slot, H256},
};

use crate::error::Error;

const CACHE_LOCK_TIMEOUT: Duration = Duration::from_secs(1);
// A handful of epochs is enough: lookups cluster around the head epoch and
// whatever the skip-slot backfill touches below it.
const CACHE_SIZE: usize = 16;

#[derive(Debug, ThisError)]
enum CacheLockError {
    #[error("could not obtain epoch boundary cache lock in {} ms", timeout.as_millis())]
    CacheLockTimeout { timeout: Duration },
}

/// Bounded map from epoch-boundary slots to the root of the last block at
/// or before that slot on the queried ancestry.
///
/// Entries are a latency optimization only: the cache may be cleared at any
/// time and every reader falls through to the store. A reorg can invalidate
/// an entry, so [`put`] overwrites.
///
/// [`put`]: Self::put
pub struct EpochBoundaryCache {
    cache: Mutex<SizedCache<Slot, H256>>,
    config: Arc<Config>,
    try_lock_timeout: Duration,
}

impl EpochBoundaryCache {
    #[must_use]
    pub fn build(config: Arc<Config>) -> Self {
        Self::new(config, CACHE_SIZE, CACHE_LOCK_TIMEOUT)
    }

    #[must_use]
    pub fn new(config: Arc<Config>, cache_size: usize, try_lock_timeout: Duration) -> Self {
        Self {
            cache: Mutex::new(SizedCache::with_size(cache_size)),
            config,
            try_lock_timeout,
        }
    }

    pub fn get(&self, slot: Slot) -> Result<Option<H256>> {
        self.try_lock_cache()?.cache_get(&slot).copied().pipe(Ok)
    }

    /// Inserts `block_root` at the epoch-boundary slot `slot`, overwriting
    /// any previous entry. The newest canonical ancestry wins.
    pub fn put(&self, slot: Slot, block_root: H256) -> Result<()> {
        ensure!(
            helper_functions::misc::is_epoch_start(&self.config, slot),
            Error::SlotNotEpochBoundary { slot },
        );

        self.try_lock_cache()?.cache_set(slot, block_root);

        Ok(())
    }

    pub fn len(&self) -> Result<usize> {
        self.try_lock_cache()?.cache_size().pipe(Ok)
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.len().map(|len| len == 0)
    }

    pub fn clear(&self) -> Result<()> {
        self.try_lock_cache()?.cache_clear();

        Ok(())
    }

    fn try_lock_cache(&self) -> Result<MutexGuard<SizedCache<Slot, H256>>> {
        let timeout = self.try_lock_timeout;

        self.cache.try_lock_for(timeout).ok_or_else(|| {
            let error = CacheLockError::CacheLockTimeout { timeout };

            warn!("{error}");

            anyhow!(error)
        })
    }
}
