//! Shared fixtures: key generators, a raw-bytes hash configuration, and a
//! structural checker walked after bulk operations.

use crate::base::Base;
use crate::config::Config;
use crate::counts::Counts;
use crate::key;
use crate::leaf::Leaf;
use crate::node::Node;
use crate::table::Table;

/// Config whose hash is the key's first eight bytes, little-endian, masked
/// to 30 bits. Lets a test dictate the exact digit path, and makes keys
/// that share an eight-byte prefix collide in full.
pub(crate) struct RawKey32;

impl Config for RawKey32 {
    const INDEX_BITS: u32 = 5;
    const HASH_BITS: u32 = 30;
    const DOWNGRADE_THRESHOLD: usize = Self::INDEX_LIMIT * 3 / 8;

    fn hash(key: &[u8]) -> u64 {
        let mut buf = [0u8; 8];
        for (i, b) in key.iter().take(8).enumerate() {
            buf[i] = *b;
        }
        u64::from_le_bytes(buf) & ((1 << 30) - 1)
    }
}

/// Key whose [`RawKey32`] hash is exactly `hash` (which must fit 30 bits).
pub(crate) fn key_for(hash: u64) -> Vec<u8> {
    hash.to_le_bytes().to_vec()
}

/// Key with the [`RawKey32`] hash `hash` plus a distinguishing tag byte;
/// different tags give byte-distinct keys with identical hashes.
pub(crate) fn colliding_key(hash: u64, tag: u8) -> Vec<u8> {
    let mut key = hash.to_le_bytes().to_vec();
    key.push(tag);
    key
}

/// "aaa", "aab", … — the successor sequence of the original test driver.
pub(crate) fn seq_keys(n: usize) -> Vec<String> {
    let mut keys = Vec::with_capacity(n);
    let mut cur = "aaa".to_string();
    for _ in 0..n {
        keys.push(cur.clone());
        cur = digital_inc(&cur);
    }
    keys
}

fn digital_inc(s: &str) -> String {
    let mut bytes = s.as_bytes().to_vec();
    let mut i = bytes.len();
    while i > 0 {
        i -= 1;
        if bytes[i] == b'z' {
            bytes[i] = b'a';
        } else {
            bytes[i] += 1;
            return String::from_utf8(bytes).expect("ascii");
        }
    }
    bytes.insert(0, b'a');
    String::from_utf8(bytes).expect("ascii")
}

/// Walks the whole trie and asserts every structural invariant.
pub(crate) fn check_base<C: Config, V>(base: &Base<C, V>) {
    check_table(&base.root, 0, base.grade);
    assert!(
        matches!(base.root, Table::Fixed(_)),
        "root must stay in the fixed layout",
    );
}

fn check_table<C: Config, V>(table: &Table<C, V>, depth: u32, grade: bool) {
    assert_eq!(table.depth(), depth, "table depth disagrees with its position");
    let n = table.nentries();
    if depth > 0 {
        assert!(n >= 1, "empty interior table");
        if n == 1 {
            let (_, node) = table.entries().next().expect("one entry");
            assert!(
                matches!(&**node, Node::Table(_)),
                "non-root table left holding a single leaf",
            );
        }
        if grade {
            match table {
                Table::Fixed(_) => assert!(
                    n > C::DOWNGRADE_THRESHOLD,
                    "graded fixed table at population {n}",
                ),
                Table::Sparse(_) => assert!(
                    n < C::UPGRADE_THRESHOLD,
                    "graded sparse table at population {n}",
                ),
            }
        }
    }

    for (idx, node) in table.entries() {
        match &**node {
            Node::Leaf(leaf) => {
                assert_eq!(
                    key::index::<C>(leaf.hash(), depth),
                    idx,
                    "leaf parked at the wrong slot",
                );
                for kv in leaf.kvs() {
                    assert_eq!(
                        C::hash(&kv.key),
                        leaf.hash(),
                        "stored hash disagrees with the key's hash",
                    );
                }
                if let Leaf::Collision(c) = leaf {
                    assert!(c.kvs.len() >= 2, "collision leaf shorter than two pairs");
                }
            }
            Node::Table(child) => {
                assert_eq!(
                    child.hash_path(),
                    key::build_hash_path::<C>(table.hash_path(), idx, depth),
                    "child table carries the wrong prefix",
                );
                check_table(child, depth + 1, grade);
            }
        }
    }
}

/// Asserts the internal arithmetic of a [`Counts`] breakdown.
pub(crate) fn assert_count_parity(counts: &Counts) {
    assert_eq!(counts.nodes, counts.tables + counts.leaves);
    assert_eq!(counts.tables, counts.fixed_tables + counts.sparse_tables);
    assert_eq!(counts.leaves, counts.flat_leaves + counts.collision_leaves);
    assert_eq!(
        counts.table_counts_by_nentries.iter().sum::<usize>(),
        counts.tables,
    );
    assert_eq!(
        counts.table_counts_by_depth.iter().sum::<usize>(),
        counts.tables,
    );
    assert!(
        counts.table_counts_by_nentries[0] <= 1,
        "only the root may be empty",
    );
}
