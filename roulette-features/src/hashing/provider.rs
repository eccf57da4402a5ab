//! 64-bit hash primitives used for partitioning.

use serde::{Deserialize, Serialize};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0100_0000_01b3;

/// A 64-bit hash function over UTF-8 bytes.
///
/// A feature picks one primitive for its whole lifetime; the partition hash,
/// the exposure gate and the variant assigner all use it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HashPrimitive {
    /// XXH64 with seed 0
    #[default]
    #[serde(rename = "xxhash")]
    XxHash,
    /// FNV-1a, 64-bit variant
    #[serde(rename = "fnv1a")]
    Fnv1a,
}

impl HashPrimitive {
    /// Hash raw bytes.
    #[inline]
    pub fn hash64(self, bytes: &[u8]) -> u64 {
        match self {
            HashPrimitive::XxHash => twox_hash::XxHash64::oneshot(0, bytes),
            HashPrimitive::Fnv1a => fnv1a(bytes),
        }
    }

    /// Hash the UTF-8 encoding of a string.
    #[inline]
    pub fn hash_str(self, text: &str) -> u64 {
        self.hash64(text.as_bytes())
    }
}

#[inline]
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut h = FNV_OFFSET_BASIS;
    for &b in bytes {
        h ^= u64::from(b);
        h = h.wrapping_mul(FNV_PRIME);
    }
    h
}
