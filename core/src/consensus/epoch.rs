// Epoch parameters: sizes and seeds as pure functions of the epoch number

use crate::config::{
    CACHE_BYTES_GROWTH, CACHE_BYTES_INIT, DATASET_BYTES_GROWTH, DATASET_BYTES_INIT, EPOCH_LENGTH,
    HASH_BYTES, MAX_EPOCH_NUMBER, MIX_BYTES, MIX_HASHES,
};
use crate::crypto::{Hash256, keccak256};
use crate::error::{EthashError, Result};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Compute epoch from block number
pub fn epoch_of(block_number: u64) -> u32 {
    u32::try_from(block_number / EPOCH_LENGTH).unwrap_or(u32::MAX)
}

/// Seed of an epoch: Keccak-256 applied `epoch` times to the zero digest.
/// Epoch 0 uses the zero digest itself.
pub fn seed_hash(epoch: u32) -> Hash256 {
    let mut seed = Hash256::ZERO;
    for _ in 0..epoch {
        seed = keccak256(seed.as_bytes());
    }
    seed
}

/// Reverse lookup of [`seed_hash`]. Pool jobs carry seeds rather than epochs.
pub fn find_epoch_number(seed: &Hash256) -> Option<u32> {
    let mut candidate = Hash256::ZERO;
    for epoch in 0..=MAX_EPOCH_NUMBER {
        if candidate == *seed {
            return Some(epoch);
        }
        candidate = keccak256(candidate.as_bytes());
    }
    None
}

/// Trial division; candidates stay below 2^33 so this is cheap enough
fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n.is_multiple_of(2) {
        return n == 2;
    }
    let mut d = 3u64;
    while d * d <= n {
        if n.is_multiple_of(d) {
            return false;
        }
        d += 2;
    }
    true
}

fn compute_cache_size(epoch: u32) -> u64 {
    let step = HASH_BYTES as u64;
    let mut sz = CACHE_BYTES_INIT + CACHE_BYTES_GROWTH * epoch as u64 - step;
    while !is_prime(sz / step) {
        sz -= 2 * step;
    }
    sz
}

fn compute_dataset_size(epoch: u32) -> u64 {
    let step = MIX_BYTES as u64;
    let mut sz = DATASET_BYTES_INIT + DATASET_BYTES_GROWTH * epoch as u64 - step;
    while !is_prime(sz / step) {
        sz -= 2 * step;
    }
    sz
}

#[derive(Debug, Clone, Copy)]
struct EpochSizes {
    cache: u64,
    dataset: u64,
}

// Memoized size schedule; values never change once inserted.
static SIZES: Lazy<RwLock<HashMap<u32, EpochSizes>>> = Lazy::new(|| RwLock::new(HashMap::new()));

fn sizes(epoch: u32) -> EpochSizes {
    if let Some(sizes) = SIZES.read().get(&epoch) {
        return *sizes;
    }
    let sizes = EpochSizes {
        cache: compute_cache_size(epoch),
        dataset: compute_dataset_size(epoch),
    };
    SIZES.write().insert(epoch, sizes);
    sizes
}

/// Cache size in bytes; `cache_size / 64` is prime
pub fn cache_size(epoch: u32) -> u64 {
    sizes(epoch).cache
}

/// Full dataset size in bytes; `dataset_size / 128` is prime
pub fn dataset_size(epoch: u32) -> u64 {
    sizes(epoch).dataset
}

/// Everything an epoch context needs to build its cache and address its dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpochParameters {
    pub epoch_number: u32,
    /// Number of 64-byte cache items
    pub cache_items: usize,
    /// Number of 64-byte dataset items (always even)
    pub dataset_items: usize,
    pub seed: Hash256,
}

impl EpochParameters {
    pub fn for_epoch(epoch_number: u32) -> Result<Self> {
        if epoch_number > MAX_EPOCH_NUMBER {
            return Err(EthashError::EpochOutOfRange {
                epoch: epoch_number,
                max: MAX_EPOCH_NUMBER,
            });
        }
        let sizes = sizes(epoch_number);
        Ok(EpochParameters {
            epoch_number,
            cache_items: (sizes.cache / HASH_BYTES as u64) as usize,
            dataset_items: (sizes.dataset / HASH_BYTES as u64) as usize,
            seed: seed_hash(epoch_number),
        })
    }

    pub fn cache_bytes(&self) -> u64 {
        self.cache_items as u64 * HASH_BYTES as u64
    }

    pub fn dataset_bytes(&self) -> u64 {
        self.dataset_items as u64 * HASH_BYTES as u64
    }

    /// Number of 128-byte pages hashimoto addresses; identical in light and full mode
    pub fn light_pages(&self) -> usize {
        self.dataset_items / MIX_HASHES
    }
}
