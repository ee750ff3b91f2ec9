// Ethash algorithm constants and the FNV mixing primitive

// ========== Epochs ==========
/// Blocks sharing one cache / dataset generation
pub const EPOCH_LENGTH: u64 = 30_000;

/// Largest supported epoch: beyond it dataset item indices no longer fit 32 bits
pub const MAX_EPOCH_NUMBER: u32 = 32_639;

// ========== Sizes (bytes) ==========
pub const CACHE_BYTES_INIT: u64 = 1 << 24; // 16 MiB
pub const CACHE_BYTES_GROWTH: u64 = 1 << 17; // 128 KiB per epoch
pub const DATASET_BYTES_INIT: u64 = 1 << 30; // 1 GiB
pub const DATASET_BYTES_GROWTH: u64 = 1 << 23; // 8 MiB per epoch

/// Width of one cache or dataset item (Keccak-512 output)
pub const HASH_BYTES: usize = 64;
/// Width of the hashimoto mix
pub const MIX_BYTES: usize = 128;
pub const WORD_BYTES: usize = 4;

pub const HASH_WORDS: usize = HASH_BYTES / WORD_BYTES;
pub const MIX_WORDS: usize = MIX_BYTES / WORD_BYTES;
/// Dataset items fetched per hashimoto access
pub const MIX_HASHES: usize = MIX_BYTES / HASH_BYTES;

// ========== Rounds ==========
pub const CACHE_ROUNDS: usize = 3;
pub const DATASET_PARENTS: u32 = 256;
pub const ACCESSES: u32 = 64;

// ========== FNV ==========
pub const FNV_PRIME: u32 = 0x0100_0193;

/// `(a * FNV_PRIME) ^ b` in wrapping 32-bit arithmetic
#[inline(always)]
pub fn fnv1(a: u32, b: u32) -> u32 {
    a.wrapping_mul(FNV_PRIME) ^ b
}

/// Element-wise `fnv1` of `mix` with `data`
#[inline(always)]
pub fn fnv1_mix(mix: &mut [u32], data: &[u32]) {
    for (m, d) in mix.iter_mut().zip(data) {
        *m = fnv1(*m, *d);
    }
}
