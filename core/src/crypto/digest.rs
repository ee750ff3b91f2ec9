use crate::error::EthashError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[inline]
fn le32(bytes: &[u8], i: usize) -> u32 {
    let o = i * 4;
    u32::from_le_bytes([bytes[o], bytes[o + 1], bytes[o + 2], bytes[o + 3]])
}

#[inline]
fn le64(bytes: &[u8], i: usize) -> u64 {
    let o = i * 8;
    let mut word = [0u8; 8];
    word.copy_from_slice(&bytes[o..o + 8]);
    u64::from_le_bytes(word)
}

/// 256-bit digest.
///
/// Stored as 32 raw bytes. The 32-bit and 64-bit word views always read the
/// bytes little-endian, independent of the host, so results are bit-exact
/// across targets.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    pub const ZERO: Hash256 = Hash256([0u8; 32]);

    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Hash256(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// `i`-th little-endian 32-bit word, `i < 8`
    pub fn word32(&self, i: usize) -> u32 {
        le32(&self.0, i)
    }

    /// `i`-th little-endian 64-bit word, `i < 4`
    pub fn word64(&self, i: usize) -> u64 {
        le64(&self.0, i)
    }

    pub fn words32(&self) -> [u32; 8] {
        std::array::from_fn(|i| self.word32(i))
    }

    pub fn words64(&self) -> [u64; 4] {
        std::array::from_fn(|i| self.word64(i))
    }

    pub fn from_words32(words: &[u32; 8]) -> Self {
        let mut bytes = [0u8; 32];
        for (chunk, word) in bytes.chunks_exact_mut(4).zip(words) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        Hash256(bytes)
    }

    /// The first eight bytes read as a big-endian integer, i.e. the most
    /// significant 64 bits when the digest is treated as a 256-bit number.
    pub fn leading_u64_be(&self) -> u64 {
        let mut word = [0u8; 8];
        word.copy_from_slice(&self.0[..8]);
        u64::from_be_bytes(word)
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(bytes: [u8; 32]) -> Self {
        Hash256(bytes)
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash256({})", hex::encode(self.0))
    }
}

impl FromStr for Hash256 {
    type Err = EthashError;

    /// Parses 64 hex digits, with or without a `0x` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| EthashError::InvalidHex(format!("{s:?}: {e}")))?;
        Ok(Hash256(bytes))
    }
}

impl Serialize for Hash256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{self}"))
    }
}

impl<'de> Deserialize<'de> for Hash256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// 512-bit digest used for cache items, dataset items and the hashimoto seed.
/// Same little-endian word discipline as [`Hash256`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hash512(pub [u8; 64]);

impl Hash512 {
    pub const ZERO: Hash512 = Hash512([0u8; 64]);

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    pub fn word32(&self, i: usize) -> u32 {
        le32(&self.0, i)
    }

    pub fn set_word32(&mut self, i: usize, value: u32) {
        self.0[i * 4..i * 4 + 4].copy_from_slice(&value.to_le_bytes());
    }

    pub fn word64(&self, i: usize) -> u64 {
        le64(&self.0, i)
    }

    pub fn words32(&self) -> [u32; 16] {
        std::array::from_fn(|i| self.word32(i))
    }

    pub fn from_words32(words: &[u32; 16]) -> Self {
        let mut bytes = [0u8; 64];
        for (chunk, word) in bytes.chunks_exact_mut(4).zip(words) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        Hash512(bytes)
    }

    pub fn xor(&self, other: &Hash512) -> Hash512 {
        let mut out = [0u8; 64];
        for (o, (a, b)) in out.iter_mut().zip(self.0.iter().zip(other.0.iter())) {
            *o = a ^ b;
        }
        Hash512(out)
    }
}

impl Default for Hash512 {
    fn default() -> Self {
        Hash512::ZERO
    }
}

impl fmt::Debug for Hash512 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash512({})", hex::encode(self.0))
    }
}
