//! Interior tables: the trie's branch nodes.
//!
//! A table is logically `B = 2^b` optional child slots. [`FixedTable`]
//! stores them as a dense array with O(1) access; [`SparseTable`] keeps a
//! presence bitmap plus a packed child array in ascending bit order, paying
//! a popcount per access to save memory in the sparse upper levels. Under
//! the hybrid option a sparse table upgrades to fixed once it is half full
//! and a fixed table downgrades once it has emptied far enough; the two
//! thresholds are kept apart so the conversions cannot thrash.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::config::Config;
use crate::key;
use crate::node::{Node, NodeRef};

// ---------------------------------------------------------------------------
// Fixed layout
// ---------------------------------------------------------------------------

/// Dense table: `B` slots, population tracked separately.
pub(crate) struct FixedTable<C: Config, V> {
    pub(crate) depth: u32,
    pub(crate) hash_path: u64,
    slots: Vec<Option<NodeRef<C, V>>>,
    used: usize,
    _config: PhantomData<C>,
}

impl<C: Config, V> FixedTable<C, V> {
    pub(crate) fn new(depth: u32, hash_path: u64) -> Self {
        Self {
            depth,
            hash_path,
            slots: vec![None; C::INDEX_LIMIT],
            used: 0,
            _config: PhantomData,
        }
    }

    pub(crate) fn get(&self, idx: usize) -> Option<&NodeRef<C, V>> {
        self.slots[idx].as_ref()
    }

    pub(crate) fn get_mut(&mut self, idx: usize) -> Option<&mut NodeRef<C, V>> {
        self.slots[idx].as_mut()
    }

    pub(crate) fn insert(&mut self, idx: usize, node: NodeRef<C, V>) {
        debug_assert!(self.slots[idx].is_none(), "insert into occupied slot {idx}");
        self.slots[idx] = Some(node);
        self.used += 1;
    }

    pub(crate) fn replace(&mut self, idx: usize, node: NodeRef<C, V>) {
        debug_assert!(self.slots[idx].is_some(), "replace of empty slot {idx}");
        self.slots[idx] = Some(node);
    }

    pub(crate) fn remove(&mut self, idx: usize) {
        debug_assert!(self.slots[idx].is_some(), "remove of empty slot {idx}");
        self.slots[idx] = None;
        self.used -= 1;
    }

    pub(crate) fn nentries(&self) -> usize {
        self.used
    }

    pub(crate) fn deep_copy(&self) -> Self {
        Self {
            depth: self.depth,
            hash_path: self.hash_path,
            slots: self
                .slots
                .iter()
                .map(|slot| slot.as_ref().map(Node::deep_copy))
                .collect(),
            used: self.used,
            _config: PhantomData,
        }
    }

    /// Repacks this table into the sparse layout, sharing the children.
    pub(crate) fn to_sparse(&self) -> SparseTable<C, V> {
        let mut sparse = SparseTable::new(self.depth, self.hash_path);
        for (idx, slot) in self.slots.iter().enumerate() {
            if let Some(node) = slot {
                sparse.insert(idx, Arc::clone(node));
            }
        }
        sparse
    }
}

impl<C: Config, V> Clone for FixedTable<C, V> {
    fn clone(&self) -> Self {
        Self {
            depth: self.depth,
            hash_path: self.hash_path,
            slots: self.slots.clone(),
            used: self.used,
            _config: PhantomData,
        }
    }
}

// ---------------------------------------------------------------------------
// Sparse layout
// ---------------------------------------------------------------------------

/// Bitmap-compressed table: bit `i` set iff slot `i` is occupied, children
/// packed in ascending bit order.
pub(crate) struct SparseTable<C: Config, V> {
    pub(crate) depth: u32,
    pub(crate) hash_path: u64,
    bitmap: u64,
    nodes: Vec<NodeRef<C, V>>,
    _config: PhantomData<C>,
}

impl<C: Config, V> SparseTable<C, V> {
    pub(crate) fn new(depth: u32, hash_path: u64) -> Self {
        Self {
            depth,
            hash_path,
            bitmap: 0,
            nodes: Vec::new(),
            _config: PhantomData,
        }
    }

    fn present(&self, idx: usize) -> bool {
        self.bitmap & (1 << idx) != 0
    }

    /// Packed position of slot `idx`: the number of occupied slots below it.
    fn pos(&self, idx: usize) -> usize {
        (self.bitmap & ((1u64 << idx) - 1)).count_ones() as usize
    }

    pub(crate) fn get(&self, idx: usize) -> Option<&NodeRef<C, V>> {
        self.present(idx).then(|| &self.nodes[self.pos(idx)])
    }

    pub(crate) fn get_mut(&mut self, idx: usize) -> Option<&mut NodeRef<C, V>> {
        if self.present(idx) {
            let pos = self.pos(idx);
            Some(&mut self.nodes[pos])
        } else {
            None
        }
    }

    pub(crate) fn insert(&mut self, idx: usize, node: NodeRef<C, V>) {
        debug_assert!(!self.present(idx), "insert into occupied slot {idx}");
        let pos = self.pos(idx);
        self.nodes.insert(pos, node);
        self.bitmap |= 1 << idx;
    }

    pub(crate) fn replace(&mut self, idx: usize, node: NodeRef<C, V>) {
        debug_assert!(self.present(idx), "replace of empty slot {idx}");
        let pos = self.pos(idx);
        self.nodes[pos] = node;
    }

    pub(crate) fn remove(&mut self, idx: usize) {
        debug_assert!(self.present(idx), "remove of empty slot {idx}");
        let pos = self.pos(idx);
        self.nodes.remove(pos);
        self.bitmap &= !(1 << idx);
    }

    pub(crate) fn nentries(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn deep_copy(&self) -> Self {
        Self {
            depth: self.depth,
            hash_path: self.hash_path,
            bitmap: self.bitmap,
            nodes: self.nodes.iter().map(Node::deep_copy).collect(),
            _config: PhantomData,
        }
    }

    /// Unpacks this table into the fixed layout, sharing the children.
    pub(crate) fn to_fixed(&self) -> FixedTable<C, V> {
        let mut fixed = FixedTable::new(self.depth, self.hash_path);
        for idx in 0..C::INDEX_LIMIT {
            if let Some(node) = self.get(idx) {
                fixed.insert(idx, Arc::clone(node));
            }
        }
        fixed
    }
}

impl<C: Config, V> Clone for SparseTable<C, V> {
    fn clone(&self) -> Self {
        Self {
            depth: self.depth,
            hash_path: self.hash_path,
            bitmap: self.bitmap,
            nodes: self.nodes.clone(),
            _config: PhantomData,
        }
    }
}

// ---------------------------------------------------------------------------
// Variant dispatch
// ---------------------------------------------------------------------------

/// Either table layout; both expose the same slot contract.
pub(crate) enum Table<C: Config, V> {
    Fixed(FixedTable<C, V>),
    Sparse(SparseTable<C, V>),
}

impl<C: Config, V> Table<C, V> {
    /// Creates an empty table of the configured birth kind.
    ///
    /// The root (depth 0) is always created fixed by its owner, whatever
    /// the option says.
    pub(crate) fn empty(depth: u32, hash_path: u64, start_fixed: bool) -> Self {
        if start_fixed {
            Self::Fixed(FixedTable::new(depth, hash_path))
        } else {
            Self::Sparse(SparseTable::new(depth, hash_path))
        }
    }

    pub(crate) fn depth(&self) -> u32 {
        match self {
            Self::Fixed(t) => t.depth,
            Self::Sparse(t) => t.depth,
        }
    }

    pub(crate) fn hash_path(&self) -> u64 {
        match self {
            Self::Fixed(t) => t.hash_path,
            Self::Sparse(t) => t.hash_path,
        }
    }

    pub(crate) fn get(&self, idx: usize) -> Option<&NodeRef<C, V>> {
        match self {
            Self::Fixed(t) => t.get(idx),
            Self::Sparse(t) => t.get(idx),
        }
    }

    pub(crate) fn get_mut(&mut self, idx: usize) -> Option<&mut NodeRef<C, V>> {
        match self {
            Self::Fixed(t) => t.get_mut(idx),
            Self::Sparse(t) => t.get_mut(idx),
        }
    }

    /// Fills an empty slot.
    pub(crate) fn insert(&mut self, idx: usize, node: NodeRef<C, V>) {
        match self {
            Self::Fixed(t) => t.insert(idx, node),
            Self::Sparse(t) => t.insert(idx, node),
        }
    }

    /// Overwrites an occupied slot.
    pub(crate) fn replace(&mut self, idx: usize, node: NodeRef<C, V>) {
        match self {
            Self::Fixed(t) => t.replace(idx, node),
            Self::Sparse(t) => t.replace(idx, node),
        }
    }

    /// Empties an occupied slot.
    pub(crate) fn remove(&mut self, idx: usize) {
        match self {
            Self::Fixed(t) => t.remove(idx),
            Self::Sparse(t) => t.remove(idx),
        }
    }

    pub(crate) fn nentries(&self) -> usize {
        match self {
            Self::Fixed(t) => t.nentries(),
            Self::Sparse(t) => t.nentries(),
        }
    }

    /// Occupied slots in ascending index order.
    pub(crate) fn entries(&self) -> impl Iterator<Item = (usize, &NodeRef<C, V>)> + '_ {
        (0..C::INDEX_LIMIT).filter_map(move |idx| self.get(idx).map(|node| (idx, node)))
    }

    /// The single child, if this table holds exactly one and it is a leaf.
    ///
    /// This is the collapse test: such a table must be folded back into its
    /// parent. A single child that is a table is legal and never collapses.
    pub(crate) fn lone_leaf(&self) -> Option<NodeRef<C, V>> {
        if self.nentries() != 1 {
            return None;
        }
        let (_, node) = self.entries().next()?;
        match &**node {
            Node::Leaf(_) => Some(Arc::clone(node)),
            Node::Table(_) => None,
        }
    }

    /// Copies the whole table graph below this table; leaves stay shared.
    pub(crate) fn deep_copy(&self) -> Self {
        match self {
            Self::Fixed(t) => Self::Fixed(t.deep_copy()),
            Self::Sparse(t) => Self::Sparse(t.deep_copy()),
        }
    }

    /// Converts to the fixed layout if sparse and at the upgrade threshold.
    ///
    /// Callers gate this on the map's `grade` flag; the mutation it reacts
    /// to must already be reflected in the population.
    pub(crate) fn maybe_upgrade(&mut self) {
        let upgraded = match self {
            Self::Sparse(t) if t.nentries() >= C::UPGRADE_THRESHOLD => Some(t.to_fixed()),
            _ => None,
        };
        if let Some(fixed) = upgraded {
            *self = Self::Fixed(fixed);
        }
    }

    /// Converts to the sparse layout if fixed and at or below the downgrade
    /// threshold. Never called on the root.
    pub(crate) fn maybe_downgrade(&mut self) {
        let downgraded = match self {
            Self::Fixed(t) if t.nentries() <= C::DOWNGRADE_THRESHOLD => Some(t.to_sparse()),
            _ => None,
        };
        if let Some(sparse) = downgraded {
            *self = Self::Sparse(sparse);
        }
    }
}

impl<C: Config, V> Clone for Table<C, V> {
    fn clone(&self) -> Self {
        match self {
            Self::Fixed(t) => Self::Fixed(t.clone()),
            Self::Sparse(t) => Self::Sparse(t.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// Deep construction
// ---------------------------------------------------------------------------

/// Builds the subtree holding two leaves whose hashes collide at the
/// caller's depth but are not equal.
///
/// Descends one table per agreeing digit until the two paths split; the
/// folded hash guarantees a split by the maximum depth. Intermediate tables
/// on the way down hold a single table child, which is the one legal
/// single-child form.
pub(crate) fn create_table<C: Config, V>(
    depth: u32,
    hash_path: u64,
    leaf1: NodeRef<C, V>,
    leaf2: NodeRef<C, V>,
    start_fixed: bool,
) -> Table<C, V> {
    let hash1 = leaf_hash(&leaf1);
    let hash2 = leaf_hash(&leaf2);
    debug_assert!(depth >= 1, "deep construction below the root only");

    let idx1 = key::index::<C>(hash1, depth);
    let idx2 = key::index::<C>(hash2, depth);

    let mut table = Table::empty(depth, hash_path, start_fixed);
    if idx1 == idx2 {
        if depth == C::MAX_DEPTH {
            panic!(
                "distinct hashes {hash1:#x} and {hash2:#x} share the full digit path",
            );
        }
        let child_path = key::build_hash_path::<C>(hash_path, idx1, depth);
        let child = create_table(depth + 1, child_path, leaf1, leaf2, start_fixed);
        table.insert(idx1, Arc::new(Node::Table(child)));
    } else {
        table.insert(idx1, leaf1);
        table.insert(idx2, leaf2);
    }
    table
}

fn leaf_hash<C: Config, V>(node: &NodeRef<C, V>) -> u64 {
    match &**node {
        Node::Leaf(leaf) => leaf.hash(),
        Node::Table(_) => unreachable!("deep construction takes leaves"),
    }
}
