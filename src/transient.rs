//! Transient flavor: a single-writer map that mutates in place.

use std::fmt;
use std::ops::Index;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crossbeam_channel::Receiver;

use crate::base::Base;
use crate::config::Config;
use crate::counts::Counts;
use crate::iter::{self, Iter, IterCancel};
use crate::leaf::KeyVal;
use crate::map::TableOption;
use crate::ops;
use crate::persistent::PersistentHamt;

/// Mutate-in-place HAMT.
///
/// Exactly one writer at a time, enforced by `&mut self`; reads may share
/// the map freely between writes. Converting to the persistent flavor via
/// [`into_persistent`](Self::into_persistent) is O(1) because consuming the
/// single writer proves nothing else can touch the structure.
pub struct TransientHamt<C: Config, V> {
    pub(crate) base: Base<C, V>,
}

impl<C: Config, V> TransientHamt<C, V> {
    /// Creates an empty map with the given table option.
    #[must_use]
    pub fn new(opt: TableOption) -> Self {
        Self {
            base: Base::new(opt),
        }
    }

    pub(crate) fn from_base(base: Base<C, V>) -> Self {
        Self { base }
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    /// Returns the number of key/value pairs.
    #[must_use]
    pub fn nentries(&self) -> usize {
        self.base.nentries
    }

    /// Returns a reference to the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &[u8]) -> Option<&V> {
        self.base.get(key)
    }

    /// Returns `true` if the map contains the given key.
    #[must_use]
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }

    /// Walks the whole trie and tallies node statistics.
    ///
    /// Returns the deepest table depth and the [`Counts`] breakdown.
    ///
    /// # Panics
    ///
    /// Panics if the leaf contents disagree with the entry count; that is
    /// structural corruption, not a recoverable condition.
    #[must_use]
    pub fn count(&self) -> (u32, Counts) {
        self.base.count()
    }

    /// Returns an iterator over `(&[u8], &V)` pairs in hash order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, C, V> {
        self.base.iter()
    }
}

impl<C: Config, V: Clone> TransientHamt<C, V> {
    /// Stores a pair, replacing any existing value for the key.
    ///
    /// Returns `true` iff the key was not present before; a replacement
    /// returns `false` even though it rewrites the leaf.
    pub fn put(&mut self, key: &[u8], val: V) -> bool {
        let hash = C::hash(key);
        let added = ops::put::put_in_place(
            &mut self.base.root,
            0,
            hash,
            key,
            val,
            self.base.grade,
            self.base.start_fixed,
        );
        if added {
            self.base.nentries += 1;
        }
        added
    }

    /// Removes a key, returning its value, or `None` on a miss.
    pub fn del(&mut self, key: &[u8]) -> Option<V> {
        let hash = C::hash(key);
        let val = ops::del::del_in_place(&mut self.base.root, 0, hash, key, self.base.grade)?;
        self.base.nentries -= 1;
        Some(val)
    }

    /// Converts into the persistent flavor in O(1).
    ///
    /// Consuming the single writer means no alias can mutate the structure
    /// afterwards, so the table graph is handed over as-is.
    #[must_use]
    pub fn into_persistent(self) -> PersistentHamt<C, V> {
        PersistentHamt::from_base(self.base)
    }

    /// Copies the table graph; leaves stay shared.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        Self {
            base: self.base.deep_copy(),
        }
    }
}

impl<C: Config, V> TransientHamt<C, V>
where
    C: Send + Sync,
    V: Clone + Send + Sync + 'static,
{
    /// Starts a producer thread feeding every pair through a bounded
    /// channel.
    ///
    /// The producer walks a deep copy of the table graph taken up front —
    /// the single writer stays free to mutate — and blocks whenever the
    /// channel holds `buffer` undelivered pairs. Dropping the receiver
    /// stops it.
    #[must_use]
    pub fn iter_chan(&self, buffer: usize) -> Receiver<KeyVal<V>> {
        self.iter_chan_with_cancel(buffer).0
    }

    /// Like [`iter_chan`](Self::iter_chan), plus a cancellation handle the
    /// producer honors between emissions.
    #[must_use]
    pub fn iter_chan_with_cancel(&self, buffer: usize) -> (Receiver<KeyVal<V>>, IterCancel) {
        let flag = Arc::new(AtomicBool::new(false));
        let rx = iter::spawn_producer(self.base.root.deep_copy(), buffer, Arc::clone(&flag));
        (rx, IterCancel::new(flag))
    }
}

impl<C: Config, V: fmt::Debug> TransientHamt<C, V> {
    /// Full recursive dump of the trie, one node per line.
    #[must_use]
    pub fn long_string(&self, indent: &str) -> String {
        self.base.long_string("TransientHamt", indent)
    }
}

impl<C: Config, V> Default for TransientHamt<C, V> {
    /// An empty hybrid-table map.
    fn default() -> Self {
        Self::new(TableOption::HybridTables)
    }
}

// Deep copy: a shallow clone would alias tables the original keeps mutating.
impl<C: Config, V> Clone for TransientHamt<C, V> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.deep_copy(),
        }
    }
}

impl<C: Config, V> fmt::Debug for TransientHamt<C, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransientHamt")
            .field("nentries", &self.base.nentries)
            .finish_non_exhaustive()
    }
}

impl<C: Config, V: Clone, K: AsRef<[u8]>> Extend<(K, V)> for TransientHamt<C, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, val) in iter {
            self.put(key.as_ref(), val);
        }
    }
}

impl<C: Config, V: Clone, K: AsRef<[u8]>> FromIterator<(K, V)> for TransientHamt<C, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<C: Config, V> Index<&[u8]> for TransientHamt<C, V> {
    type Output = V;

    fn index(&self, key: &[u8]) -> &V {
        self.get(key).expect("key not found")
    }
}

impl<'a, C: Config, V> IntoIterator for &'a TransientHamt<C, V> {
    type Item = (&'a [u8], &'a V);
    type IntoIter = Iter<'a, C, V>;

    fn into_iter(self) -> Iter<'a, C, V> {
        self.iter()
    }
}
