//! Flavor-erased map and the table configuration option.

use std::fmt;

use crossbeam_channel::Receiver;

use crate::config::Config;
use crate::counts::Counts;
use crate::iter::{Iter, IterCancel};
use crate::leaf::KeyVal;
use crate::persistent::PersistentHamt;
use crate::transient::TransientHamt;

/// Which physical table layouts a map uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableOption {
    /// Every table is born fixed; no adaptation.
    FixedTables,
    /// Every non-root table is born sparse; no adaptation.
    SparseTables,
    /// Tables are born sparse and upgrade/downgrade at the thresholds.
    HybridTables,
}

impl TableOption {
    /// `(grade, start_fixed)` as the base stores them.
    pub(crate) fn flags(self) -> (bool, bool) {
        match self {
            Self::FixedTables => (false, true),
            Self::SparseTables => (false, false),
            Self::HybridTables => (true, false),
        }
    }
}

impl fmt::Display for TableOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FixedTables => "FixedTables",
            Self::SparseTables => "SparseTables",
            Self::HybridTables => "HybridTables",
        })
    }
}

/// Either map flavor behind one type.
///
/// The flavors' update signatures differ (`&mut self` versus a returned
/// version), so the erased API moves `self` through [`put`](Self::put) and
/// [`del`](Self::del): the transient arm mutates and hands itself back, the
/// persistent arm hands back the new version. Keep a [`Clone`] of the
/// persistent arm first if the old version should survive.
pub enum Hamt<C: Config, V> {
    /// Mutate-in-place flavor.
    Transient(TransientHamt<C, V>),
    /// Copy-on-write flavor.
    Persistent(PersistentHamt<C, V>),
}

impl<C: Config, V> Hamt<C, V> {
    /// Creates an empty map of the requested flavor and table option.
    #[must_use]
    pub fn new(persistent: bool, opt: TableOption) -> Self {
        if persistent {
            Self::Persistent(PersistentHamt::new(opt))
        } else {
            Self::Transient(TransientHamt::new(opt))
        }
    }

    /// Returns `true` for the copy-on-write flavor.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self, Self::Persistent(_))
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Transient(m) => m.is_empty(),
            Self::Persistent(m) => m.is_empty(),
        }
    }

    /// Returns the number of key/value pairs.
    #[must_use]
    pub fn nentries(&self) -> usize {
        match self {
            Self::Transient(m) => m.nentries(),
            Self::Persistent(m) => m.nentries(),
        }
    }

    /// Returns a reference to the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &[u8]) -> Option<&V> {
        match self {
            Self::Transient(m) => m.get(key),
            Self::Persistent(m) => m.get(key),
        }
    }

    /// Returns `true` if the map contains the given key.
    #[must_use]
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }

    /// Walks the whole trie and tallies node statistics.
    ///
    /// # Panics
    ///
    /// Panics if the leaf contents disagree with the entry count.
    #[must_use]
    pub fn count(&self) -> (u32, Counts) {
        match self {
            Self::Transient(m) => m.count(),
            Self::Persistent(m) => m.count(),
        }
    }

    /// Returns an iterator over `(&[u8], &V)` pairs in hash order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, C, V> {
        match self {
            Self::Transient(m) => m.iter(),
            Self::Persistent(m) => m.iter(),
        }
    }
}

impl<C: Config, V: Clone> Hamt<C, V> {
    /// Stores a pair, returning the map to keep using and `true` iff the
    /// key was new.
    #[must_use = "put returns the map to keep using"]
    pub fn put(self, key: &[u8], val: V) -> (Self, bool) {
        match self {
            Self::Transient(mut m) => {
                let added = m.put(key, val);
                (Self::Transient(m), added)
            }
            Self::Persistent(m) => {
                let (next, added) = m.put(key, val);
                (Self::Persistent(next), added)
            }
        }
    }

    /// Removes a key, returning the map to keep using and the removed
    /// value; a miss returns the map unchanged and `None`.
    #[must_use = "del returns the map to keep using"]
    pub fn del(self, key: &[u8]) -> (Self, Option<V>) {
        match self {
            Self::Transient(mut m) => {
                let val = m.del(key);
                (Self::Transient(m), val)
            }
            Self::Persistent(m) => {
                let (next, val) = m.del(key);
                (Self::Persistent(next), val)
            }
        }
    }

    /// Converts to the persistent flavor; already-persistent maps come back
    /// unchanged. Consuming the transient writer makes this O(1).
    #[must_use]
    pub fn to_persistent(self) -> Self {
        match self {
            Self::Transient(m) => Self::Persistent(m.into_persistent()),
            persistent => persistent,
        }
    }

    /// Converts to the transient flavor; already-transient maps come back
    /// unchanged. Leaving the persistent flavor deep-copies the table
    /// graph, since other versions may share it.
    #[must_use]
    pub fn to_transient(self) -> Self {
        match self {
            Self::Persistent(m) => Self::Transient(m.to_transient()),
            transient => transient,
        }
    }

    /// Copies the table graph regardless of flavor; leaves stay shared.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        match self {
            Self::Transient(m) => Self::Transient(m.deep_copy()),
            Self::Persistent(m) => Self::Persistent(m.deep_copy()),
        }
    }
}

impl<C: Config, V> Hamt<C, V>
where
    C: Send + Sync,
    V: Clone + Send + Sync + 'static,
{
    /// Starts a producer thread feeding every pair through a bounded
    /// channel; see the flavor methods for the snapshot cost.
    #[must_use]
    pub fn iter_chan(&self, buffer: usize) -> Receiver<KeyVal<V>> {
        self.iter_chan_with_cancel(buffer).0
    }

    /// Like [`iter_chan`](Self::iter_chan), plus a cancellation handle.
    #[must_use]
    pub fn iter_chan_with_cancel(&self, buffer: usize) -> (Receiver<KeyVal<V>>, IterCancel) {
        match self {
            Self::Transient(m) => m.iter_chan_with_cancel(buffer),
            Self::Persistent(m) => m.iter_chan_with_cancel(buffer),
        }
    }
}

impl<C: Config, V: fmt::Debug> Hamt<C, V> {
    /// Full recursive dump of the trie, one node per line.
    #[must_use]
    pub fn long_string(&self, indent: &str) -> String {
        match self {
            Self::Transient(m) => m.long_string(indent),
            Self::Persistent(m) => m.long_string(indent),
        }
    }
}

impl<C: Config, V> fmt::Debug for Hamt<C, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flavor = if self.is_persistent() {
            "Persistent"
        } else {
            "Transient"
        };
        f.debug_struct("Hamt")
            .field("flavor", &flavor)
            .field("nentries", &self.nentries())
            .finish_non_exhaustive()
    }
}
