//! Statistics walk consistency, across options and flavors.

use rstest::rstest;

use crate::config::{Config, Hash32};
use crate::map::TableOption;
use crate::tests::util;
use crate::Hamt;

/// Fresh maps hold exactly the empty fixed root.
#[test]
fn empty_map_counts() {
    let map = Hamt::<Hash32, i32>::new(false, TableOption::HybridTables);
    let (max_depth, counts) = map.count();
    assert_eq!(max_depth, 0);
    assert_eq!(counts.tables, 1);
    assert_eq!(counts.fixed_tables, 1);
    assert_eq!(counts.key_vals, 0);
    assert_eq!(counts.nils, Hash32::INDEX_LIMIT);
    assert_eq!(counts.table_counts_by_nentries[0], 1);
}

/// One entry: a flat leaf in the root, one slot used.
#[test]
fn single_entry_counts() {
    let map = Hamt::<Hash32, i32>::new(false, TableOption::HybridTables);
    let (map, _) = map.put(b"aaa", 1);
    let (max_depth, counts) = map.count();
    assert_eq!(max_depth, 0);
    assert_eq!(counts.flat_leaves, 1);
    assert_eq!(counts.key_vals, 1);
    assert_eq!(counts.nils, Hash32::INDEX_LIMIT - 1);
    assert_eq!(counts.table_counts_by_nentries[1], 1);
}

/// After a churn of inserts and deletes, every tally line adds up.
#[rstest]
#[case::transient_fixed(false, TableOption::FixedTables)]
#[case::transient_sparse(false, TableOption::SparseTables)]
#[case::transient_hybrid(false, TableOption::HybridTables)]
#[case::persistent_fixed(true, TableOption::FixedTables)]
#[case::persistent_sparse(true, TableOption::SparseTables)]
#[case::persistent_hybrid(true, TableOption::HybridTables)]
fn counts_add_up_after_churn(#[case] persistent: bool, #[case] opt: TableOption) {
    let keys = util::seq_keys(1_000);
    let mut map = Hamt::<Hash32, usize>::new(persistent, opt);
    for (i, key) in keys.iter().enumerate() {
        let (next, inserted) = map.put(key.as_bytes(), i);
        assert!(inserted);
        map = next;
    }
    for key in keys.iter().step_by(2) {
        let (next, deleted) = map.del(key.as_bytes());
        assert!(deleted.is_some());
        map = next;
    }

    let (max_depth, counts) = map.count();
    assert_eq!(counts.key_vals, map.nentries());
    assert_eq!(map.nentries(), 500);
    assert!(max_depth < Hash32::DEPTH_LIMIT);
    util::assert_count_parity(&counts);

    match &map {
        Hamt::Transient(m) => util::check_base(&m.base),
        Hamt::Persistent(m) => util::check_base(&m.base),
    }
}

/// The depth histogram puts the root at depth zero and nothing above the
/// hash width's limit.
#[test]
fn depth_histogram_bounds() {
    let keys = util::seq_keys(2_000);
    let mut map = Hamt::<Hash32, usize>::new(false, TableOption::HybridTables);
    for (i, key) in keys.iter().enumerate() {
        let (next, _) = map.put(key.as_bytes(), i);
        map = next;
    }

    let (_, counts) = map.count();
    assert_eq!(counts.table_counts_by_depth[0], 1);
    assert_eq!(counts.table_counts_by_depth.len(), Hash32::DEPTH_LIMIT as usize);
}
