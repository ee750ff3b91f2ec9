use crate::crypto::Hash256;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EthashError>;

#[derive(Debug, Error)]
pub enum EthashError {
    /// A cache or full dataset buffer could not be reserved.
    #[error("failed to allocate {what} ({bytes} bytes)")]
    Allocation { what: &'static str, bytes: u64 },

    /// Full-mode hashing was requested before `init_full_dataset`.
    #[error("full dataset is not initialized for this epoch context")]
    FullDatasetNotInitialized,

    #[error("epoch {epoch} is out of range (max {max})")]
    EpochOutOfRange { epoch: u32, max: u32 },

    #[error("invalid epoch parameters: {0}")]
    InvalidParameters(String),

    #[error("dataset item index {index} is out of range ({items} items)")]
    ItemOutOfRange { index: u32, items: usize },

    #[error("mix hash mismatch: expected {expected}, computed {computed}")]
    InvalidMixHash { expected: Hash256, computed: Hash256 },

    #[error("final hash {final_hash} does not meet the target")]
    TargetNotMet { final_hash: Hash256 },

    #[error("invalid hex digest: {0}")]
    InvalidHex(String),
}
