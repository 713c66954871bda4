//! Leaf nodes: terminal storage for key/value pairs.
//!
//! A [`FlatLeaf`] holds exactly one pair. A [`CollisionLeaf`] holds two or
//! more pairs whose keys share the identical hash; it is the only way
//! hash-equal keys coexist. Leaf operations are functional: they return the
//! replacement leaf and the caller installs it into the table slot, which is
//! an in-place write for the transient flavor and a copy-on-write for the
//! persistent one.

use smallvec::{smallvec, SmallVec};

/// An owned key/value pair.
///
/// This is the item type of the channel-based iterator; internally it is
/// also the unit of leaf storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyVal<V> {
    /// Key bytes.
    pub key: Box<[u8]>,
    /// Stored value.
    pub val: V,
}

/// Leaf holding a single pair.
#[derive(Clone)]
pub(crate) struct FlatLeaf<V> {
    pub(crate) hash: u64,
    pub(crate) kv: KeyVal<V>,
}

/// Leaf holding every pair whose key hashes to the same value.
///
/// Invariant: at least two pairs, all keys byte-distinct. Pair order is
/// insertion order and survives value replacement.
#[derive(Clone)]
pub(crate) struct CollisionLeaf<V> {
    pub(crate) hash: u64,
    pub(crate) kvs: SmallVec<[KeyVal<V>; 2]>,
}

/// Either leaf variant.
#[derive(Clone)]
pub(crate) enum Leaf<V> {
    Flat(FlatLeaf<V>),
    Collision(CollisionLeaf<V>),
}

impl<V> Leaf<V> {
    /// Creates a flat leaf from a fresh pair.
    pub(crate) fn flat(hash: u64, key: &[u8], val: V) -> Self {
        Self::Flat(FlatLeaf {
            hash,
            kv: KeyVal {
                key: Box::from(key),
                val,
            },
        })
    }

    /// The hash shared by every key in this leaf.
    pub(crate) fn hash(&self) -> u64 {
        match self {
            Self::Flat(l) => l.hash,
            Self::Collision(l) => l.hash,
        }
    }

    /// Number of pairs stored.
    pub(crate) fn nentries(&self) -> usize {
        match self {
            Self::Flat(_) => 1,
            Self::Collision(l) => l.kvs.len(),
        }
    }

    /// The stored pairs, in insertion order.
    pub(crate) fn kvs(&self) -> &[KeyVal<V>] {
        match self {
            Self::Flat(l) => std::slice::from_ref(&l.kv),
            Self::Collision(l) => &l.kvs,
        }
    }

    /// Looks up a key by byte equality.
    pub(crate) fn get(&self, key: &[u8]) -> Option<&V> {
        match self {
            Self::Flat(l) => (&l.kv.key[..] == key).then_some(&l.kv.val),
            Self::Collision(l) => l
                .kvs
                .iter()
                .find(|kv| &kv.key[..] == key)
                .map(|kv| &kv.val),
        }
    }
}

impl<V: Clone> Leaf<V> {
    /// Stores a pair into this leaf, whose hash the caller has already
    /// matched against `hash`.
    ///
    /// Returns the replacement leaf and `true` iff the key was new. A
    /// matching key has its value replaced; a new key turns a flat leaf
    /// into a collision leaf or extends an existing one.
    pub(crate) fn put(&self, hash: u64, key: &[u8], val: V) -> (Leaf<V>, bool) {
        debug_assert_eq!(self.hash(), hash);
        match self {
            Self::Flat(l) => {
                if &l.kv.key[..] == key {
                    (Leaf::flat(hash, key, val), false)
                } else {
                    let kvs = smallvec![
                        l.kv.clone(),
                        KeyVal {
                            key: Box::from(key),
                            val,
                        },
                    ];
                    (Leaf::Collision(CollisionLeaf { hash, kvs }), true)
                }
            }
            Self::Collision(l) => {
                let mut kvs = l.kvs.clone();
                match kvs.iter().position(|kv| &kv.key[..] == key) {
                    Some(pos) => {
                        kvs[pos].val = val;
                        (Leaf::Collision(CollisionLeaf { hash, kvs }), false)
                    }
                    None => {
                        kvs.push(KeyVal {
                            key: Box::from(key),
                            val,
                        });
                        (Leaf::Collision(CollisionLeaf { hash, kvs }), true)
                    }
                }
            }
        }
    }

    /// Removes a key from this leaf.
    ///
    /// `None` means the key was not present. Otherwise the first element is
    /// the replacement leaf — `None` when the slot should be emptied — and
    /// the second is the removed value. A collision leaf shrunk to one pair
    /// comes back as a flat leaf.
    pub(crate) fn del(&self, key: &[u8]) -> Option<(Option<Leaf<V>>, V)> {
        match self {
            Self::Flat(l) => {
                (&l.kv.key[..] == key).then(|| (None, l.kv.val.clone()))
            }
            Self::Collision(l) => {
                let pos = l.kvs.iter().position(|kv| &kv.key[..] == key)?;
                let mut kvs = l.kvs.clone();
                let removed = kvs.remove(pos);
                let leaf = if kvs.len() == 1 {
                    let kv = kvs.into_iter().next().expect("one pair left");
                    Leaf::Flat(FlatLeaf { hash: l.hash, kv })
                } else {
                    Leaf::Collision(CollisionLeaf { hash: l.hash, kvs })
                };
                Some((Some(leaf), removed.val))
            }
        }
    }
}

impl<V: std::fmt::Debug> Leaf<V> {
    /// One-line rendering for diagnostic dumps.
    pub(crate) fn summary(&self) -> String {
        match self {
            Self::Flat(l) => format!(
                "FlatLeaf{{ hash: {:#x}, key: {:?}, val: {:?} }}",
                l.hash,
                String::from_utf8_lossy(&l.kv.key),
                l.kv.val,
            ),
            Self::Collision(l) => {
                let pairs: Vec<String> = l
                    .kvs
                    .iter()
                    .map(|kv| {
                        format!("{:?}: {:?}", String::from_utf8_lossy(&kv.key), kv.val)
                    })
                    .collect();
                format!(
                    "CollisionLeaf{{ hash: {:#x}, kvs: [{}] }}",
                    l.hash,
                    pairs.join(", "),
                )
            }
        }
    }
}
