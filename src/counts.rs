//! Read-only statistics walk over the trie.

use crate::config::Config;
use crate::leaf::Leaf;
use crate::node::Node;
use crate::table::Table;

/// Node tallies gathered by the statistics walk.
///
/// `key_vals` must equal the map's entry count; the walk verifies this and
/// treats divergence as structural corruption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counts {
    /// Allocated but unused slots (fixed tables only; sparse tables do not
    /// materialize empty slots).
    pub nils: usize,
    /// Total nodes: `tables + leaves`.
    pub nodes: usize,
    /// Total interior tables, the root included.
    pub tables: usize,
    /// Total leaves of both kinds.
    pub leaves: usize,
    /// Tables in the fixed layout.
    pub fixed_tables: usize,
    /// Tables in the sparse layout.
    pub sparse_tables: usize,
    /// Leaves holding one pair.
    pub flat_leaves: usize,
    /// Leaves holding hash-colliding pairs.
    pub collision_leaves: usize,
    /// Total key/value pairs.
    pub key_vals: usize,
    /// Tables per population; slots `0..=B`. A populated slot 0 or (except
    /// for the root) slot 1-with-a-leaf would be an invariant breach.
    pub table_counts_by_nentries: Vec<usize>,
    /// Tables per depth; slots `0..DEPTH_LIMIT`.
    pub table_counts_by_depth: Vec<usize>,
}

/// Tallies the trie under `root`.
///
/// Returns the deepest table depth observed and the [`Counts`].
///
/// # Panics
///
/// Panics if the summed leaf pair count disagrees with `nentries`.
pub(crate) fn count<C: Config, V>(root: &Table<C, V>, nentries: usize) -> (u32, Counts) {
    let mut counts = Counts {
        nils: 0,
        nodes: 0,
        tables: 0,
        leaves: 0,
        fixed_tables: 0,
        sparse_tables: 0,
        flat_leaves: 0,
        collision_leaves: 0,
        key_vals: 0,
        table_counts_by_nentries: vec![0; C::INDEX_LIMIT + 1],
        table_counts_by_depth: vec![0; C::DEPTH_LIMIT as usize],
    };
    let max_depth = visit_table::<C, V>(root, &mut counts);
    assert_eq!(
        counts.key_vals, nentries,
        "entry count diverged from leaf contents",
    );
    (max_depth, counts)
}

fn visit_table<C: Config, V>(table: &Table<C, V>, counts: &mut Counts) -> u32 {
    counts.nodes += 1;
    counts.tables += 1;
    match table {
        Table::Fixed(_) => {
            counts.fixed_tables += 1;
            counts.nils += C::INDEX_LIMIT - table.nentries();
        }
        Table::Sparse(_) => counts.sparse_tables += 1,
    }
    counts.table_counts_by_nentries[table.nentries()] += 1;
    counts.table_counts_by_depth[table.depth() as usize] += 1;

    let mut deepest = table.depth();
    for (_, node) in table.entries() {
        match &**node {
            Node::Leaf(leaf) => {
                counts.nodes += 1;
                counts.leaves += 1;
                match leaf {
                    Leaf::Flat(_) => counts.flat_leaves += 1,
                    Leaf::Collision(_) => counts.collision_leaves += 1,
                }
                counts.key_vals += leaf.nentries();
            }
            Node::Table(child) => {
                deepest = deepest.max(visit_table::<C, V>(child, counts));
            }
        }
    }
    deepest
}
