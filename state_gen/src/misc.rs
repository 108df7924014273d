use anyhow::{ensure, Result};
use tokio_util::sync::CancellationToken;
use types::primitives::{Slot, H256};

use crate::error::Error;

/// The last finalized checkpoint, dividing the hot section of the store
/// from the cold one. Replaced wholesale when finalization advances.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct SplitInfo {
    pub slot: Slot,
    pub root: H256,
}

impl SplitInfo {
    #[must_use]
    pub const fn new(slot: Slot, root: H256) -> Self {
        Self { slot, root }
    }
}

/// Back pointer persisted for every hot block, linking it to the nearest
/// epoch-boundary ancestor whose full state is on disk. Replay cost for any
/// hot state is therefore bounded by one epoch of blocks.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct HotStateSummary {
    /// Slot of the block the summary describes.
    pub slot: Slot,
    /// Root of the block itself.
    pub latest_root: H256,
    /// Root of the most recent epoch-boundary ancestor, inclusive.
    pub boundary_root: H256,
}

pub(crate) fn verify_not_cancelled(cancel: &CancellationToken) -> Result<()> {
    ensure!(!cancel.is_cancelled(), Error::Cancelled);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_not_cancelled() {
        let cancel = CancellationToken::new();

        assert!(verify_not_cancelled(&cancel).is_ok());

        cancel.cancel();

        let error = verify_not_cancelled(&cancel).expect_err("token is canceled");

        assert!(matches!(
            error.downcast_ref::<Error>(),
            Some(Error::Cancelled),
        ));
    }
}
