// Target comparison strategies for search and verification

use crate::crypto::Hash256;
use primitive_types::U256;

/// Decides whether a final hash is a valid proof of work
pub trait Target {
    fn is_met_by(&self, final_hash: &Hash256) -> bool;
}

/// Compact 64-bit target: the leading 64 bits of the final hash, read
/// big-endian, must not exceed it.
impl Target for u64 {
    fn is_met_by(&self, final_hash: &Hash256) -> bool {
        final_hash.leading_u64_be() <= *self
    }
}

/// Full 256-bit boundary: the final hash read as a big-endian number must
/// not exceed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary(pub U256);

impl Boundary {
    pub fn from_hash(hash: &Hash256) -> Self {
        Boundary(U256::from_big_endian(hash.as_bytes()))
    }

    /// Boundary whose leading 64 bits equal `target` and whose remaining
    /// bits are all set; accepts exactly the hashes the compact form accepts.
    pub fn from_compact(target: u64) -> Self {
        Boundary((U256::from(target) << 192usize) | (U256::MAX >> 64usize))
    }
}

impl Target for Boundary {
    fn is_met_by(&self, final_hash: &Hash256) -> bool {
        U256::from_big_endian(final_hash.as_bytes()) <= self.0
    }
}

impl<T: Target + ?Sized> Target for &T {
    fn is_met_by(&self, final_hash: &Hash256) -> bool {
        (**self).is_met_by(final_hash)
    }
}
