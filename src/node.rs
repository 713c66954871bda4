//! Trie node: the closed variant every table slot ranges over.
//!
//! A slot is either empty (`Option::None` at the table layer), a leaf, or a
//! nested table. Keeping the set closed lets the walk dispatch with a plain
//! `match` and is what the structural invariants are stated against.

use std::sync::Arc;

use crate::config::Config;
use crate::leaf::Leaf;
use crate::table::Table;

/// Shared handle to a node.
///
/// The persistent flavor retains arbitrarily many versions; a node lives
/// until the last root that can reach it is dropped.
pub(crate) type NodeRef<C, V> = Arc<Node<C, V>>;

/// One occupied table slot.
pub(crate) enum Node<C: Config, V> {
    /// Terminal pair storage.
    Leaf(Leaf<V>),
    /// Nested interior table.
    Table(Table<C, V>),
}

impl<C: Config, V> Node<C, V> {
    /// Copies the table graph under `node`.
    ///
    /// Tables are rebuilt; leaves are immutable by contract and stay shared.
    pub(crate) fn deep_copy(node: &NodeRef<C, V>) -> NodeRef<C, V> {
        match &**node {
            Self::Leaf(_) => Arc::clone(node),
            Self::Table(t) => Arc::new(Self::Table(t.deep_copy())),
        }
    }
}

// Manual impl — `Table` is clonable without bounds (its children are shared
// handles), so only the leaf arm needs `V: Clone`.
impl<C: Config, V: Clone> Clone for Node<C, V> {
    fn clone(&self) -> Self {
        match self {
            Self::Leaf(l) => Self::Leaf(l.clone()),
            Self::Table(t) => Self::Table(t.clone()),
        }
    }
}
