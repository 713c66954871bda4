//! Hash array mapped trie with transient and persistent flavors.
//!
//! A HAMT consumes a key's hash a few bits at a time, using each fragment as
//! an index into a wide interior table. Leaves hold the key/value pairs;
//! interior tables come in a dense fixed layout and a bitmap-compressed
//! sparse layout, with optional adaptive conversion between the two.
//!
//! Two flavors share one trie representation:
//!
//! - [`TransientHamt`] mutates in place and has a single writer.
//! - [`PersistentHamt`] is copy-on-write: every update returns a new map and
//!   every older version stays valid, structurally shared, and safe to use
//!   from other threads.
//!
//! # Key properties
//!
//! - **Path copying**: a persistent update rebuilds only the root-to-leaf
//!   spine; everything off the path is shared.
//! - **Adaptive tables**: sparse tables upgrade to fixed when half full,
//!   fixed tables downgrade when they empty out (the `Hybrid` option).
//! - **Two widths**: 32-way tables over a 30-bit hash ([`Hash32`]) and
//!   64-way tables over a 60-bit hash ([`Hash64`]).
//! - **Zero `unsafe`**: enforced by `#![forbid(unsafe_code)]`.
//!
//! # Example
//!
//! ```
//! use hamt::{Hamt32, TableOption};
//!
//! let map = Hamt32::new(true, TableOption::HybridTables);
//! let (map, inserted) = map.put(b"one", 1);
//! assert!(inserted);
//! assert_eq!(map.get(b"one"), Some(&1));
//!
//! let (map, val) = map.del(b"one");
//! assert_eq!(val, Some(1));
//! assert!(map.is_empty());
//! ```
//!
//! # References
//!
//! - Bagwell, 2001 — "Ideal Hash Trees"
//! - <https://en.wikipedia.org/wiki/Hash_array_mapped_trie>

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod counts;
pub mod iter;

mod base;
mod key;
mod leaf;
mod map;
mod node;
mod ops;
mod persistent;
mod table;
mod transient;

#[cfg(test)]
mod tests;

pub use config::{Config, Hash32, Hash64};
pub use counts::Counts;
pub use iter::{Iter, IterCancel};
pub use leaf::KeyVal;
pub use map::{Hamt, TableOption};
pub use persistent::PersistentHamt;
pub use transient::TransientHamt;

/// Flavor-erased map over the 32-way, 30-bit-hash configuration.
pub type Hamt32<V> = Hamt<Hash32, V>;

/// Flavor-erased map over the 64-way, 60-bit-hash configuration.
pub type Hamt64<V> = Hamt<Hash64, V>;
