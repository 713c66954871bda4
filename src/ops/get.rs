//! Lookup: the hash-guided descent.

use crate::config::Config;
use crate::key;
use crate::node::Node;
use crate::table::Table;

/// Walks the trie by successive hash digits and resolves `key` in the leaf
/// that stops the descent, if any.
pub(crate) fn lookup<'a, C: Config, V>(
    root: &'a Table<C, V>,
    hash: u64,
    key: &[u8],
) -> Option<&'a V> {
    let mut table = root;
    for depth in 0..C::DEPTH_LIMIT {
        let idx = key::index::<C>(hash, depth);
        let node = table.get(idx)?;
        match &**node {
            Node::Leaf(leaf) => return leaf.get(key),
            Node::Table(child) => {
                if depth == C::MAX_DEPTH {
                    unreachable!("table child at max depth {depth}");
                }
                table = child;
            }
        }
    }
    unreachable!("descent ran past the depth limit");
}
