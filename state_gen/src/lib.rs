//! Materializes beacon states at arbitrary block roots and slots.
//!
//! Full states are persisted sparsely: on epoch boundaries after the last
//! finalized checkpoint (the hot section) and on archival-stride slots
//! before it (the cold section). Everything in between is regenerated on
//! demand by loading the chain of blocks leading to the requested root and
//! replaying it on top of the nearest persisted ancestor state.
//!
//! The crate never validates blocks and never chooses a head. It trusts the
//! store to uphold the [`StateStore::block_roots`] ordering contract and the
//! transition function to be deterministic.

pub use crate::{
    boundary_cache::EpochBoundaryCache,
    error::Error,
    memory_store::MemoryStore,
    metrics::Metrics,
    misc::{HotStateSummary, SplitInfo},
    state_gen::StateGen,
    store::StateStore,
    transition::StateTransition,
};

mod boundary_cache;
mod cold;
mod error;
mod hot;
mod memory_store;
mod metrics;
mod misc;
mod replay;
mod state_gen;
mod store;
mod transition;

#[cfg(test)]
mod helpers;
