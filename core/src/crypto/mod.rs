/// Keccak primitives and the fixed-width digest types they produce
use tiny_keccak::{Hasher, Keccak};

mod digest;

pub use digest::{Hash256, Hash512};

/// Keccak-256 (original Keccak padding, not NIST SHA3-256)
pub fn keccak256(data: &[u8]) -> Hash256 {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    Hash256(output)
}

/// Keccak-512 (original Keccak padding, not NIST SHA3-512)
pub fn keccak512(data: &[u8]) -> Hash512 {
    let mut hasher = Keccak::v512();
    hasher.update(data);
    let mut output = [0u8; 64];
    hasher.finalize(&mut output);
    Hash512(output)
}

/// Keccak-512 over the concatenation of two slices, without an intermediate buffer
pub fn keccak512_concat(a: &[u8], b: &[u8]) -> Hash512 {
    let mut hasher = Keccak::v512();
    hasher.update(a);
    hasher.update(b);
    let mut output = [0u8; 64];
    hasher.finalize(&mut output);
    Hash512(output)
}

/// Keccak-256 over the concatenation of two slices
pub fn keccak256_concat(a: &[u8], b: &[u8]) -> Hash256 {
    let mut hasher = Keccak::v256();
    hasher.update(a);
    hasher.update(b);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    Hash256(output)
}
