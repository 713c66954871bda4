//! Deletion for both flavors, including structural collapse.
//!
//! Removing a pair may empty a leaf's slot; a table that shrank is a
//! downgrade candidate, and a non-root table left holding a single leaf is
//! folded back into its parent, cascading upward. Only leaves collapse — a
//! single table child is left alone.

use std::sync::Arc;

use crate::config::Config;
use crate::key;
use crate::leaf::Leaf;
use crate::node::{Node, NodeRef};
use crate::table::Table;

/// Peek outcome for the in-place walk.
enum Action<V> {
    /// The slot's leaf resolved the delete: replacement leaf (or none) plus
    /// the removed value.
    Gone(Option<Leaf<V>>, V),
    /// Child table: recurse.
    Descend,
}

/// In-place delete for the transient flavor.
///
/// Returns the removed value, or `None` on a miss. The caller at depth 0
/// owns the root, which never collapses and never downgrades.
pub(crate) fn del_in_place<C: Config, V: Clone>(
    table: &mut Table<C, V>,
    depth: u32,
    hash: u64,
    key: &[u8],
    grade: bool,
) -> Option<V> {
    let idx = key::index::<C>(hash, depth);

    let action = match table.get(idx) {
        None => return None,
        Some(node) => match &**node {
            Node::Leaf(leaf) => {
                let (replacement, val) = leaf.del(key)?;
                Action::Gone(replacement, val)
            }
            Node::Table(_) => Action::Descend,
        },
    };

    match action {
        Action::Gone(Some(leaf), val) => {
            table.replace(idx, Arc::new(Node::Leaf(leaf)));
            Some(val)
        }
        Action::Gone(None, val) => {
            table.remove(idx);
            if grade && depth > 0 {
                table.maybe_downgrade();
            }
            Some(val)
        }
        Action::Descend => {
            if depth == C::MAX_DEPTH {
                unreachable!("table child at max depth {depth}");
            }
            let (val, collapse) = {
                let slot = table.get_mut(idx).expect("peeked an occupied slot");
                let child = match Arc::make_mut(slot) {
                    Node::Table(child) => child,
                    Node::Leaf(_) => unreachable!("peeked a table child"),
                };
                let val = del_in_place(child, depth + 1, hash, key, grade)?;
                (val, child.lone_leaf())
            };
            if let Some(leaf) = collapse {
                table.replace(idx, leaf);
            }
            Some(val)
        }
    }
}

/// Replacement a copy-on-write delete hands to its parent.
pub(crate) enum Replacement<C: Config, V> {
    /// The rebuilt table for this level (possibly downgraded, possibly
    /// empty at the root).
    Table(Table<C, V>),
    /// The table collapsed away; install this leaf in its slot instead.
    Leaf(NodeRef<C, V>),
}

/// Outcome of a successful copy-on-write delete.
pub(crate) struct Deleted<C: Config, V> {
    pub(crate) repl: Replacement<C, V>,
    pub(crate) val: V,
}

/// Copy-on-write delete for the persistent flavor.
///
/// `None` means a miss and the original tree stands. On success the copied
/// path comes back one level at a time; a level that collapsed is omitted
/// from the new spine, its lone leaf handed up instead.
pub(crate) fn del_cow<C: Config, V: Clone>(
    table: &Table<C, V>,
    depth: u32,
    hash: u64,
    key: &[u8],
    grade: bool,
) -> Option<Deleted<C, V>> {
    let idx = key::index::<C>(hash, depth);
    let node = table.get(idx)?;

    match &**node {
        Node::Leaf(leaf) => {
            let (replacement, val) = leaf.del(key)?;
            let mut new = table.clone();
            match replacement {
                Some(leaf) => new.replace(idx, Arc::new(Node::Leaf(leaf))),
                None => {
                    new.remove(idx);
                    if grade && depth > 0 {
                        new.maybe_downgrade();
                    }
                }
            }
            Some(collapse_or_keep(new, depth, val))
        }
        Node::Table(child) => {
            if depth == C::MAX_DEPTH {
                unreachable!("table child at max depth {depth}");
            }
            let deleted = del_cow(child, depth + 1, hash, key, grade)?;
            let mut new = table.clone();
            match deleted.repl {
                Replacement::Table(child) => {
                    new.replace(idx, Arc::new(Node::Table(child)));
                    Some(Deleted {
                        repl: Replacement::Table(new),
                        val: deleted.val,
                    })
                }
                Replacement::Leaf(leaf) => {
                    new.replace(idx, leaf);
                    Some(collapse_or_keep(new, depth, deleted.val))
                }
            }
        }
    }
}

/// Collapse test on the way back up: a non-root table reduced to a single
/// leaf child is replaced by that leaf.
fn collapse_or_keep<C: Config, V>(table: Table<C, V>, depth: u32, val: V) -> Deleted<C, V> {
    if depth > 0 {
        if let Some(leaf) = table.lone_leaf() {
            return Deleted {
                repl: Replacement::Leaf(leaf),
                val,
            };
        }
    }
    Deleted {
        repl: Replacement::Table(table),
        val,
    }
}
