// Light cache construction, dataset item derivation and the lazily filled
// full dataset (the DAG)

use crate::config::{CACHE_ROUNDS, DATASET_PARENTS, HASH_BYTES, HASH_WORDS, fnv1, fnv1_mix};
use crate::crypto::{Hash256, Hash512, keccak512};
use crate::error::{EthashError, Result};
use rayon::prelude::*;
use std::alloc::{self, Layout};

/// Items generated per parallel batch during prewarm (4 MiB of dataset)
const PREWARM_CHUNK_ITEMS: usize = 1 << 16;

/// Types whose all-zero bit pattern is a valid value.
///
/// # Safety
/// Implementors must accept any all-zero byte buffer as a valid `Self`.
unsafe trait ZeroValid: Sized {}

// SAFETY: a plain byte array; zero bytes are the zero digest.
unsafe impl ZeroValid for Hash512 {}
// SAFETY: the zero byte is `false`.
unsafe impl ZeroValid for bool {}

/// Allocate `len` zeroed items straight from the allocator.
///
/// Zeroed pages come from the allocator untouched, so the full dataset only
/// commits physical memory as items are generated. Oversized or refused
/// requests return `Allocation` instead of aborting.
fn try_allocate<T: ZeroValid>(len: usize, what: &'static str) -> Result<Vec<T>> {
    let failed = || EthashError::Allocation {
        what,
        bytes: (len as u64).saturating_mul(std::mem::size_of::<T>() as u64),
    };
    let layout = Layout::array::<T>(len).map_err(|_| failed())?;
    if layout.size() == 0 {
        return Ok(Vec::new());
    }
    // SAFETY: `layout` has a non-zero size.
    let ptr = unsafe { alloc::alloc_zeroed(layout) }.cast::<T>();
    if ptr.is_null() {
        return Err(failed());
    }
    // SAFETY: `ptr` comes from the global allocator with the layout of
    // `[T; len]`, and every element is all-zero bytes, a valid `T`.
    Ok(unsafe { Vec::from_raw_parts(ptr, len, len) })
}

/// Build the light cache for `seed` with `num_items` 64-byte items.
///
/// Phase 1 chains Keccak-512 from the seed. Phase 2 runs `CACHE_ROUNDS`
/// passes of RandMemoHash, where every slot is rewritten from its
/// predecessor and a slot chosen by its own current content. Both phases are
/// strictly sequential.
pub fn build_cache(seed: &Hash256, num_items: usize) -> Result<Box<[Hash512]>> {
    if num_items == 0 {
        return Ok(Box::default());
    }

    let mut cache: Vec<Hash512> = try_allocate(num_items, "light cache")?;

    cache[0] = keccak512(seed.as_bytes());
    for i in 1..num_items {
        cache[i] = keccak512(cache[i - 1].as_bytes());
    }

    let n = num_items as u64;
    for _ in 0..CACHE_ROUNDS {
        for i in 0..num_items {
            let prev = if i == 0 { num_items - 1 } else { i - 1 };
            let dep = (cache[i].word32(0) as u64 % n) as usize;
            let mixed = cache[prev].xor(&cache[dep]);
            cache[i] = keccak512(mixed.as_bytes());
        }
    }

    Ok(cache.into_boxed_slice())
}

/// Derive dataset item `index` from the light cache.
///
/// Pure and independent per index, so bulk generation parallelizes freely.
pub fn calculate_dataset_item(cache: &[Hash512], index: u32) -> Hash512 {
    let n = cache.len() as u64;

    let mut seed = cache[(index as u64 % n) as usize];
    seed.set_word32(0, seed.word32(0) ^ index);
    let mut mix = keccak512(seed.as_bytes()).words32();

    for round in 0..DATASET_PARENTS {
        let parent = fnv1(index ^ round, mix[round as usize % HASH_WORDS]) as u64 % n;
        fnv1_mix(&mut mix, &cache[parent as usize].words32());
    }

    keccak512(Hash512::from_words32(&mix).as_bytes())
}

/// Full dataset slots plus a parallel "generated" flag per slot.
///
/// Sized once from the epoch parameters and never resized. Each slot is
/// written at most once; after that it only serves reads.
pub struct FullDataset {
    items: Vec<Hash512>,
    generated: Vec<bool>,
}

impl FullDataset {
    /// Reserve `num_items` zeroed slots, all marked not-generated. Memory is
    /// committed page by page as items are generated. On failure nothing is
    /// kept.
    pub fn allocate(num_items: usize) -> Result<Self> {
        let items = try_allocate(num_items, "full dataset")?;
        let generated = try_allocate(num_items, "full dataset flags")?;
        log::debug!(
            "[DAG] Allocated full dataset: {} items ({} MiB)",
            num_items,
            (num_items * HASH_BYTES) >> 20
        );
        Ok(FullDataset { items, generated })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn generated_count(&self) -> usize {
        self.generated.iter().filter(|g| **g).count()
    }

    pub fn is_generated(&self, index: u32) -> bool {
        self.generated.get(index as usize).copied().unwrap_or(false)
    }

    /// Return item `index`, deriving and storing it on first access.
    ///
    /// `index` must be below `len()`; hashimoto only produces in-range indices.
    #[inline]
    pub fn item(&mut self, cache: &[Hash512], index: u32) -> Hash512 {
        let i = index as usize;
        if !self.generated[i] {
            self.items[i] = calculate_dataset_item(cache, index);
            self.generated[i] = true;
        }
        self.items[i]
    }

    /// Checked variant of [`FullDataset::item`]
    pub fn try_item(&mut self, cache: &[Hash512], index: u32) -> Result<Hash512> {
        if index as usize >= self.items.len() {
            return Err(EthashError::ItemOutOfRange {
                index,
                items: self.items.len(),
            });
        }
        Ok(self.item(cache, index))
    }

    /// Generate every missing item using the rayon pool. Workers write
    /// disjoint slots, so no synchronization beyond the split is needed.
    pub fn generate_all(&mut self, cache: &[Hash512]) {
        let total = self.items.len();
        let total_chunks = total.div_ceil(PREWARM_CHUNK_ITEMS);

        let chunks = self
            .items
            .chunks_mut(PREWARM_CHUNK_ITEMS)
            .zip(self.generated.chunks_mut(PREWARM_CHUNK_ITEMS));

        for (chunk_idx, (items, generated)) in chunks.enumerate() {
            let base = chunk_idx * PREWARM_CHUNK_ITEMS;
            items
                .par_iter_mut()
                .zip(generated.par_iter_mut())
                .enumerate()
                .filter(|(_, (_, done))| !**done)
                .for_each(|(offset, (item, done))| {
                    *item = calculate_dataset_item(cache, (base + offset) as u32);
                    *done = true;
                });

            if chunk_idx % 16 == 0 {
                log::info!("[DAG] Prewarm progress: {}%", chunk_idx * 100 / total_chunks);
            }
        }

        log::info!("[DAG] Prewarm complete: {} items", total);
    }
}
