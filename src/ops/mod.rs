//! Trie operations shared by the two flavors.
//!
//! Lookup is a plain loop over shared references. The mutating walks are
//! recursive: the call stack is the ancestor path, so the transient flavor
//! mutates on the way down and the persistent flavor rebuilds the spine on
//! the way back up.

pub(crate) mod del;
pub(crate) mod get;
pub(crate) mod put;
