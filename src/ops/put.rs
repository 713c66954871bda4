//! Insertion for both flavors.
//!
//! The walk stops at the first empty slot or at a leaf. An empty slot takes
//! a fresh flat leaf; a hash-equal leaf absorbs the pair; a hash-distinct
//! leaf is pushed down into a new subtree built one level per agreeing
//! digit. Tables graded sparse upgrade once the insertion lands.

use std::sync::Arc;

use crate::config::Config;
use crate::key;
use crate::leaf::Leaf;
use crate::node::{Node, NodeRef};
use crate::table::{create_table, Table};

/// What the peek at the terminal slot decided; owns everything the mutation
/// needs so no table borrow is held across it.
enum Action<C: Config, V> {
    /// Slot empty: write a fresh flat leaf.
    Insert(V),
    /// Hash-equal leaf already resolved the pair; install the replacement.
    Replace(Leaf<V>, bool),
    /// Hash-distinct leaf: push it down alongside the new pair.
    Push(NodeRef<C, V>, V),
    /// Child table: recurse.
    Descend(V),
}

/// In-place insert for the transient flavor.
///
/// Returns `true` iff the key was not present before.
pub(crate) fn put_in_place<C: Config, V: Clone>(
    table: &mut Table<C, V>,
    depth: u32,
    hash: u64,
    key: &[u8],
    val: V,
    grade: bool,
    start_fixed: bool,
) -> bool {
    let idx = key::index::<C>(hash, depth);

    let action = match table.get(idx) {
        None => Action::Insert(val),
        Some(node) => match &**node {
            Node::Leaf(leaf) if leaf.hash() == hash => {
                let (leaf, added) = leaf.put(hash, key, val);
                Action::Replace(leaf, added)
            }
            Node::Leaf(_) => Action::Push(Arc::clone(node), val),
            Node::Table(_) => Action::Descend(val),
        },
    };

    match action {
        Action::Insert(val) => {
            table.insert(idx, Arc::new(Node::Leaf(Leaf::flat(hash, key, val))));
            if grade {
                table.maybe_upgrade();
            }
            true
        }
        Action::Replace(leaf, added) => {
            table.replace(idx, Arc::new(Node::Leaf(leaf)));
            added
        }
        Action::Push(old, val) => {
            if depth == C::MAX_DEPTH {
                unreachable!("hash-distinct leaf at max depth {depth}");
            }
            let fresh = Arc::new(Node::Leaf(Leaf::flat(hash, key, val)));
            let child_path = key::build_hash_path::<C>(table.hash_path(), idx, depth);
            let subtree = create_table(depth + 1, child_path, old, fresh, start_fixed);
            table.replace(idx, Arc::new(Node::Table(subtree)));
            true
        }
        Action::Descend(val) => {
            if depth == C::MAX_DEPTH {
                unreachable!("table child at max depth {depth}");
            }
            let slot = table.get_mut(idx).expect("peeked an occupied slot");
            match Arc::make_mut(slot) {
                Node::Table(child) => {
                    put_in_place(child, depth + 1, hash, key, val, grade, start_fixed)
                }
                Node::Leaf(_) => unreachable!("peeked a table child"),
            }
        }
    }
}

/// Copy-on-write insert for the persistent flavor.
///
/// Rebuilds the tables on the walked path and shares everything else;
/// returns the replacement table for this level.
pub(crate) fn put_cow<C: Config, V: Clone>(
    table: &Table<C, V>,
    depth: u32,
    hash: u64,
    key: &[u8],
    val: V,
    grade: bool,
    start_fixed: bool,
) -> (Table<C, V>, bool) {
    let idx = key::index::<C>(hash, depth);

    match table.get(idx) {
        None => {
            let mut new = table.clone();
            new.insert(idx, Arc::new(Node::Leaf(Leaf::flat(hash, key, val))));
            if grade {
                new.maybe_upgrade();
            }
            (new, true)
        }
        Some(node) => match &**node {
            Node::Leaf(leaf) if leaf.hash() == hash => {
                let (leaf, added) = leaf.put(hash, key, val);
                let mut new = table.clone();
                new.replace(idx, Arc::new(Node::Leaf(leaf)));
                (new, added)
            }
            Node::Leaf(_) => {
                if depth == C::MAX_DEPTH {
                    unreachable!("hash-distinct leaf at max depth {depth}");
                }
                let fresh = Arc::new(Node::Leaf(Leaf::flat(hash, key, val)));
                let child_path = key::build_hash_path::<C>(table.hash_path(), idx, depth);
                let subtree =
                    create_table(depth + 1, child_path, Arc::clone(node), fresh, start_fixed);
                let mut new = table.clone();
                new.replace(idx, Arc::new(Node::Table(subtree)));
                (new, true)
            }
            Node::Table(child) => {
                if depth == C::MAX_DEPTH {
                    unreachable!("table child at max depth {depth}");
                }
                let (child, added) =
                    put_cow(child, depth + 1, hash, key, val, grade, start_fixed);
                let mut new = table.clone();
                new.replace(idx, Arc::new(Node::Table(child)));
                (new, added)
            }
        },
    }
}
