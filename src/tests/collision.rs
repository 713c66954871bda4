//! Hash collisions and the deep subtrees digit agreement creates.

use crate::config::Config;
use crate::map::TableOption;
use crate::persistent::PersistentHamt;
use crate::tests::util::{self, colliding_key, key_for, RawKey32};
use crate::transient::TransientHamt;

type Map = TransientHamt<RawKey32, i32>;

/// Two byte-distinct keys with one hash share a collision leaf.
#[test]
fn two_colliding_keys() {
    let k1 = colliding_key(0xABC, 1);
    let k2 = colliding_key(0xABC, 2);

    let mut map = Map::new(TableOption::HybridTables);
    assert!(map.put(&k1, 10));
    assert!(map.put(&k2, 20));
    assert_eq!(map.nentries(), 2);
    assert_eq!(map.get(&k1), Some(&10));
    assert_eq!(map.get(&k2), Some(&20));

    let (_, counts) = map.count();
    assert_eq!(counts.collision_leaves, 1);
    assert_eq!(counts.flat_leaves, 0);
    util::check_base(&map.base);
}

/// Three-way collision, removing the middle pair.
#[test]
fn remove_from_collision() {
    let keys: Vec<Vec<u8>> = (0..3).map(|tag| colliding_key(0xCAFE, tag)).collect();

    let mut map = Map::new(TableOption::HybridTables);
    for (i, key) in keys.iter().enumerate() {
        map.put(key, i as i32);
    }
    assert_eq!(map.del(&keys[1]), Some(1));
    assert_eq!(map.nentries(), 2);
    assert_eq!(map.get(&keys[0]), Some(&0));
    assert_eq!(map.get(&keys[1]), None);
    assert_eq!(map.get(&keys[2]), Some(&2));

    let (_, counts) = map.count();
    assert_eq!(counts.collision_leaves, 1);
}

/// A collision leaf shrunk to one pair becomes a flat leaf.
#[test]
fn collision_shrinks_to_flat() {
    let k1 = colliding_key(0xBEEF, 1);
    let k2 = colliding_key(0xBEEF, 2);

    let mut map = Map::new(TableOption::HybridTables);
    map.put(&k1, 1);
    map.put(&k2, 2);
    assert_eq!(map.del(&k1), Some(1));

    let (_, counts) = map.count();
    assert_eq!(counts.collision_leaves, 0);
    assert_eq!(counts.flat_leaves, 1);
    assert_eq!(map.get(&k2), Some(&2));
    util::check_base(&map.base);
}

/// Replacing inside a collision leaf keeps the pair count and order.
#[test]
fn overwrite_in_collision() {
    let k1 = colliding_key(0xDDD, 1);
    let k2 = colliding_key(0xDDD, 2);

    let mut map = Map::new(TableOption::HybridTables);
    map.put(&k1, 1);
    map.put(&k2, 2);
    assert!(!map.put(&k1, 100));
    assert_eq!(map.nentries(), 2);
    assert_eq!(map.get(&k1), Some(&100));
    assert_eq!(map.get(&k2), Some(&2));
}

/// Hashes that agree on four digits push the pair four tables deep, and
/// deleting one cascades the collapse all the way back to the root.
#[test]
fn deep_chain_builds_and_collapses()
{
    let k1 = key_for(0);
    let k2 = key_for(1 << 20); // digits 0..=3 agree, digit 4 differs

    let mut map = Map::new(TableOption::HybridTables);
    map.put(&k1, 1);
    map.put(&k2, 2);

    let (max_depth, counts) = map.count();
    assert_eq!(max_depth, 4);
    assert_eq!(counts.tables, 5);
    assert_eq!(counts.flat_leaves, 2);
    util::check_base(&map.base);

    assert_eq!(map.del(&k2), Some(2));
    let (max_depth, counts) = map.count();
    assert_eq!(max_depth, 0);
    assert_eq!(counts.tables, 1);
    assert_eq!(map.get(&k1), Some(&1));
    util::check_base(&map.base);
}

/// The collapse never folds a table child, only a leaf.
#[test]
fn collapse_stops_at_table_child() {
    let k1 = key_for(0);
    let k2 = key_for(1 << 20);
    let k3 = key_for(3);

    let mut map = Map::new(TableOption::HybridTables);
    map.put(&k1, 1);
    map.put(&k2, 2);
    map.put(&k3, 3);

    // Root holds the chain at slot 0 and the k3 leaf at slot 3; removing
    // k3 leaves the root with the chain table alone, which must stand.
    assert_eq!(map.del(&k3), Some(3));
    let (max_depth, counts) = map.count();
    assert_eq!(max_depth, 4);
    assert_eq!(counts.tables, 5);
    util::check_base(&map.base);
}

/// Collisions behave identically under copy-on-write.
#[test]
fn persistent_collision_versions() {
    let k1 = colliding_key(0x111, 1);
    let k2 = colliding_key(0x111, 2);

    let m0 = PersistentHamt::<RawKey32, i32>::new(TableOption::HybridTables);
    let (m1, _) = m0.put(&k1, 1);
    let (m2, _) = m1.put(&k2, 2);
    let (m3, val) = m2.del(&k1);

    assert_eq!(val, Some(1));
    assert_eq!(m1.nentries(), 1);
    assert_eq!(m2.get(&k1), Some(&1));
    assert_eq!(m2.get(&k2), Some(&2));
    assert_eq!(m3.get(&k1), None);
    assert_eq!(m3.get(&k2), Some(&2));
    util::check_base(&m2.base);
    util::check_base(&m3.base);
}

/// Folded hashes keep digit paths and hash equality in agreement even at
/// the deepest level the width allows.
#[test]
fn max_depth_is_reachable() {
    // Digits 0..=4 agree; digit 5 (the last) differs.
    let k1 = key_for(0);
    let k2 = key_for(1 << 25);

    let mut map = Map::new(TableOption::HybridTables);
    map.put(&k1, 1);
    map.put(&k2, 2);

    let (max_depth, _) = map.count();
    assert_eq!(max_depth, RawKey32::MAX_DEPTH);
    assert_eq!(map.get(&k1), Some(&1));
    assert_eq!(map.get(&k2), Some(&2));
    util::check_base(&map.base);
}
