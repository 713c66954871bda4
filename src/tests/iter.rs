//! Pull and push iteration.

use std::collections::HashMap;

use crate::config::Hash32;
use crate::map::TableOption;
use crate::persistent::PersistentHamt;
use crate::tests::util::{self, colliding_key, RawKey32};
use crate::transient::TransientHamt;

fn filled(n: usize) -> (TransientHamt<Hash32, usize>, Vec<String>) {
    let keys = util::seq_keys(n);
    let mut map = TransientHamt::new(TableOption::HybridTables);
    for (i, key) in keys.iter().enumerate() {
        map.put(key.as_bytes(), i);
    }
    (map, keys)
}

/// Iteration yields exactly the live pairs, each once.
#[test]
fn yields_every_pair_once() {
    let (map, _) = filled(500);
    let mut seen: HashMap<Vec<u8>, usize> = HashMap::new();
    for (key, val) in map.iter() {
        assert!(seen.insert(key.to_vec(), *val).is_none(), "pair emitted twice");
    }
    assert_eq!(seen.len(), map.nentries());
    for (key, val) in &seen {
        assert_eq!(map.get(key), Some(val));
    }
}

/// Order is unspecified but deterministic for a given tree.
#[test]
fn order_is_deterministic() {
    let (map, _) = filled(300);
    let first: Vec<Vec<u8>> = map.iter().map(|(k, _)| k.to_vec()).collect();
    let second: Vec<Vec<u8>> = map.iter().map(|(k, _)| k.to_vec()).collect();
    assert_eq!(first, second);
}

/// Collision leaves emit each of their pairs.
#[test]
fn collision_pairs_emitted() {
    let mut map = TransientHamt::<RawKey32, i32>::new(TableOption::HybridTables);
    map.put(&colliding_key(9, 1), 1);
    map.put(&colliding_key(9, 2), 2);
    map.put(&colliding_key(77, 1), 3);

    assert_eq!(map.iter().count(), 3);
}

#[test]
fn empty_map_yields_nothing() {
    let map = TransientHamt::<Hash32, i32>::new(TableOption::HybridTables);
    assert_eq!(map.iter().next(), None);
}

/// The channel delivers the whole map and then disconnects.
#[test]
fn chan_drains_map() {
    let keys = util::seq_keys(300);
    let mut map = PersistentHamt::<Hash32, usize>::new(TableOption::HybridTables);
    for (i, key) in keys.iter().enumerate() {
        let (next, _) = map.put(key.as_bytes(), i);
        map = next;
    }

    let received: HashMap<Vec<u8>, usize> = map
        .iter_chan(8)
        .iter()
        .map(|kv| (kv.key.to_vec(), kv.val))
        .collect();
    assert_eq!(received.len(), 300);
    for (key, val) in &received {
        assert_eq!(map.get(key), Some(val));
    }
}

/// A zero-capacity buffer degenerates to a rendezvous hand-off.
#[test]
fn chan_zero_buffer() {
    let (map, _) = filled(10);
    assert_eq!(map.iter_chan(0).iter().count(), 10);
}

/// Cancellation stops the producer between emissions.
#[test]
fn chan_cancel_stops_producer() {
    let (map, _) = filled(1_000);
    let (rx, cancel) = map.iter_chan_with_cancel(4);

    let taken = rx.iter().take(10).count();
    assert_eq!(taken, 10);
    cancel.cancel();

    // Whatever was already buffered or mid-send may still arrive; the walk
    // itself must stop, which is what lets this drain terminate.
    let rest = rx.iter().count();
    assert!(taken + rest < 1_000, "producer kept walking after cancel");
}

/// Dropping the receiver also stops the producer.
#[test]
fn chan_receiver_drop() {
    let (map, _) = filled(1_000);
    let rx = map.iter_chan(2);
    drop(rx);
}

/// The transient channel walks a snapshot, immune to later writes.
#[test]
fn transient_chan_snapshot() {
    let (mut map, _) = filled(100);
    let rx = map.iter_chan(16);
    for key in util::seq_keys(200).iter().skip(100) {
        map.put(key.as_bytes(), 0);
    }
    assert_eq!(rx.iter().count(), 100);
}
