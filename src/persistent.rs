//! Persistent flavor: copy-on-write versions with structural sharing.

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
use crate::ops::del::{del_cow, Replacement};
use crate::ops::put::put_cow;
use crate::transient::TransientHamt;

/// Copy-on-write HAMT.
///
/// `put` and `del` leave the receiver untouched and return a new map that
/// shares every subtree off the rebuilt root-to-leaf path. `Clone` is O(1).
/// Distinct versions are independent values: they may be read and updated
/// from different threads, and a shared subtree is freed when the last
/// version holding it drops.
pub struct PersistentHamt<C: Config, V> {
    pub(crate) base: Base<C, V>,
}

impl<C: Config, V> PersistentHamt<C, V> {
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

impl<C: Config, V: Clone> PersistentHamt<C, V> {
    /// Stores a pair into a new version of the map.
    ///
    /// Returns the new map and `true` iff the key was not present; the
    /// receiver is unchanged either way. A replacement returns `false`
    /// even though it rebuilds the leaf.
    #[must_use = "put returns the updated map; the receiver is unchanged"]
    pub fn put(&self, key: &[u8], val: V) -> (Self, bool) {
        let hash = C::hash(key);
        let (root, added) = put_cow(
            &self.base.root,
            0,
            hash,
            key,
            val,
            self.base.grade,
            self.base.start_fixed,
        );
        let next = Self {
            base: Base {
                root,
                nentries: self.base.nentries + usize::from(added),
                grade: self.base.grade,
                start_fixed: self.base.start_fixed,
            },
        };
        (next, added)
    }

    /// Removes a key into a new version of the map.
    ///
    /// On a hit, returns the new map and the removed value. On a miss the
    /// value is `None` and the returned map is this version, shared.
    #[must_use = "del returns the updated map; the receiver is unchanged"]
    pub fn del(&self, key: &[u8]) -> (Self, Option<V>) {
        let hash = C::hash(key);
        match del_cow(&self.base.root, 0, hash, key, self.base.grade) {
            None => (self.clone(), None),
            Some(deleted) => {
                let root = match deleted.repl {
                    Replacement::Table(root) => root,
                    Replacement::Leaf(_) => unreachable!("root cannot collapse"),
                };
                let next = Self {
                    base: Base {
                        root,
                        nentries: self.base.nentries - 1,
                        grade: self.base.grade,
                        start_fixed: self.base.start_fixed,
                    },
                };
                (next, Some(deleted.val))
            }
        }
    }

    /// Converts to the transient flavor.
    ///
    /// Always deep-copies the table graph: any number of versions may share
    /// these tables, and the transient flavor must be free to mutate.
    #[must_use]
    pub fn to_transient(&self) -> TransientHamt<C, V> {
        TransientHamt::from_base(self.base.deep_copy())
    }

    /// Copies the table graph; leaves stay shared.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        Self {
            base: self.base.deep_copy(),
        }
    }
}

impl<C: Config, V> PersistentHamt<C, V>
where
    C: Send + Sync,
    V: Clone + Send + Sync + 'static,
{
    /// Starts a producer thread feeding every pair through a bounded
    /// channel.
    ///
    /// The producer walks this version, which is immutable, so the snapshot
    /// is free. It blocks whenever the channel holds `buffer` undelivered
    /// pairs; dropping the receiver stops it.
    #[must_use]
    pub fn iter_chan(&self, buffer: usize) -> Receiver<KeyVal<V>> {
        self.iter_chan_with_cancel(buffer).0
    }

    /// Like [`iter_chan`](Self::iter_chan), plus a cancellation handle the
    /// producer honors between emissions.
    #[must_use]
    pub fn iter_chan_with_cancel(&self, buffer: usize) -> (Receiver<KeyVal<V>>, IterCancel) {
        let flag = Arc::new(AtomicBool::new(false));
        let rx = iter::spawn_producer(self.base.root.clone(), buffer, Arc::clone(&flag));
        (rx, IterCancel::new(flag))
    }
}

impl<C: Config, V: fmt::Debug> PersistentHamt<C, V> {
    /// Full recursive dump of the trie, one node per line.
    #[must_use]
    pub fn long_string(&self, indent: &str) -> String {
        self.base.long_string("PersistentHamt", indent)
    }
}

impl<C: Config, V> Default for PersistentHamt<C, V> {
    /// An empty hybrid-table map.
    fn default() -> Self {
        Self::new(TableOption::HybridTables)
    }
}

// O(1): versions share the table graph.
impl<C: Config, V> Clone for PersistentHamt<C, V> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
        }
    }
}

impl<C: Config, V> fmt::Debug for PersistentHamt<C, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistentHamt")
            .field("nentries", &self.base.nentries)
            .finish_non_exhaustive()
    }
}

impl<C: Config, V: Clone, K: AsRef<[u8]>> Extend<(K, V)> for PersistentHamt<C, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, val) in iter {
            let (next, _) = self.put(key.as_ref(), val);
            *self = next;
        }
    }
}

impl<C: Config, V: Clone, K: AsRef<[u8]>> FromIterator<(K, V)> for PersistentHamt<C, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<C: Config, V> Index<&[u8]> for PersistentHamt<C, V> {
    type Output = V;

    fn index(&self, key: &[u8]) -> &V {
        self.get(key).expect("key not found")
    }
}

impl<'a, C: Config, V> IntoIterator for &'a PersistentHamt<C, V> {
    type Item = (&'a [u8], &'a V);
    type IntoIter = Iter<'a, C, V>;

    fn into_iter(self) -> Iter<'a, C, V> {
        self.iter()
    }
}
