pub use ethereum_types::H256;

pub type Slot = u64;
pub type Epoch = u64;
