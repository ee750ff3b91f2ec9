// hashimoto: the proof-of-work mixing loop shared by light and full mode

use crate::config::{ACCESSES, HASH_WORDS, MIX_HASHES, MIX_WORDS, fnv1, fnv1_mix};
use crate::crypto::{Hash256, Hash512, keccak256_concat, keccak512_concat};
use serde::{Deserialize, Serialize};

/// Output of one hashimoto evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashResult {
    pub final_hash: Hash256,
    pub mix_hash: Hash256,
}

/// Keccak-512(header_hash || nonce_le)
pub fn hash_seed(header_hash: &Hash256, nonce: u64) -> Hash512 {
    keccak512_concat(header_hash.as_bytes(), &nonce.to_le_bytes())
}

/// Keccak-256(seed || mix_hash)
pub fn hash_final(seed: &Hash512, mix_hash: &Hash256) -> Hash256 {
    keccak256_concat(seed.as_bytes(), mix_hash.as_bytes())
}

/// Run hashimoto over a dataset of `pages` 128-byte pages.
///
/// `lookup(i)` must return dataset item `i`; it is called for the pair
/// `2 * page` and `2 * page + 1` on each of the 64 accesses. Light mode
/// derives items from the cache, full mode reads (or lazily fills) the
/// dataset; both address the same logical dataset and agree bit for bit.
pub fn hashimoto<F>(header_hash: &Hash256, nonce: u64, pages: usize, mut lookup: F) -> HashResult
where
    F: FnMut(u32) -> Hash512,
{
    let seed = hash_seed(header_hash, nonce);
    let seed_words = seed.words32();
    let seed_head = seed_words[0];

    let mut mix = [0u32; MIX_WORDS];
    for (i, word) in mix.iter_mut().enumerate() {
        *word = seed_words[i % HASH_WORDS];
    }

    let pages = pages as u64;
    let mut fetched = [0u32; MIX_WORDS];
    for access in 0..ACCESSES {
        let page = (fnv1(access ^ seed_head, mix[access as usize % MIX_WORDS]) as u64 % pages) as u32;
        for j in 0..MIX_HASHES {
            let item = lookup(page * MIX_HASHES as u32 + j as u32);
            fetched[j * HASH_WORDS..(j + 1) * HASH_WORDS].copy_from_slice(&item.words32());
        }
        fnv1_mix(&mut mix, &fetched);
    }

    let mut compressed = [0u32; MIX_WORDS / 4];
    for (i, out) in compressed.iter_mut().enumerate() {
        let group = &mix[i * 4..i * 4 + 4];
        *out = fnv1(fnv1(fnv1(group[0], group[1]), group[2]), group[3]);
    }
    let mix_hash = Hash256::from_words32(&compressed);

    HashResult {
        final_hash: hash_final(&seed, &mix_hash),
        mix_hash,
    }
}
