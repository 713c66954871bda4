//! Width configuration for the trie.
//!
//! A [`Config`] fixes the digit width `b`, the effective hash width, the
//! grading thresholds, and the hash function itself. The two shipped
//! configurations mirror the two classic HAMT widths: 32-way tables over a
//! 30-bit hash and 64-way tables over a 60-bit hash.

use crate::key;

/// Static parameters of one trie width.
///
/// Implementors are zero-sized markers; the whole crate is monomorphized
/// per configuration. The derived constants must not be overridden.
pub trait Config: 'static {
    /// Number of hash bits consumed per level (`b`).
    const INDEX_BITS: u32;

    /// Effective hash width in bits; a whole multiple of `INDEX_BITS`.
    const HASH_BITS: u32;

    /// Number of levels; valid depths are `0..DEPTH_LIMIT`.
    const DEPTH_LIMIT: u32 = Self::HASH_BITS / Self::INDEX_BITS;

    /// Largest valid depth (`DEPTH_LIMIT - 1`).
    const MAX_DEPTH: u32 = Self::DEPTH_LIMIT - 1;

    /// Width of an interior table (`B = 2^b`).
    const INDEX_LIMIT: usize = 1 << Self::INDEX_BITS;

    /// Population at which a sparse table upgrades to fixed, checked after
    /// an insertion. Only consulted under the hybrid option.
    const UPGRADE_THRESHOLD: usize = Self::INDEX_LIMIT / 2;

    /// Population at or below which a fixed table downgrades to sparse,
    /// checked after a slot removal. Must stay below `UPGRADE_THRESHOLD`
    /// so the two conversions cannot thrash.
    const DOWNGRADE_THRESHOLD: usize;

    /// Hashes a key to `HASH_BITS` bits.
    ///
    /// The result must be deterministic for the lifetime of any map built
    /// with this configuration, and must not set bits above `HASH_BITS`:
    /// hash equality and digit-path equality have to coincide.
    fn hash(key: &[u8]) -> u64;
}

/// 32-way tables over a 30-bit hash: FNV-1a/32 xor-folded, 5-bit digits,
/// 6 levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hash32;

impl Config for Hash32 {
    const INDEX_BITS: u32 = 5;
    const HASH_BITS: u32 = 30;
    const DOWNGRADE_THRESHOLD: usize = Self::INDEX_LIMIT * 3 / 8;

    fn hash(key: &[u8]) -> u64 {
        key::fold32(key::fnv1a32(key))
    }
}

/// 64-way tables over a 60-bit hash: FNV-1a/64 xor-folded, 6-bit digits,
/// 10 levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hash64;

impl Config for Hash64 {
    const INDEX_BITS: u32 = 6;
    const HASH_BITS: u32 = 60;
    const DOWNGRADE_THRESHOLD: usize = Self::INDEX_LIMIT / 8;

    fn hash(key: &[u8]) -> u64 {
        key::fold64(key::fnv1a64(key))
    }
}
