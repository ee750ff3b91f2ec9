//! Ethash proof-of-work: epoch caches, the lazily materialized full dataset,
//! hashimoto in light and full mode, nonce search and verification.

pub mod config;
pub mod consensus;
pub mod crypto;
pub mod error;

pub use consensus::*;
pub use crypto::{Hash256, Hash512};
pub use error::{EthashError, Result};
