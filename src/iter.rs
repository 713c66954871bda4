//! Iteration over the trie, pull and push style.
//!
//! The pull iterator keeps a stack of `(table, next slot)` frames and a
//! cursor into the leaf it is currently draining. The push style runs the
//! same walk on a producer thread, handing pairs through a bounded channel
//! so a slow consumer back-pressures the walk; a cancellation flag is
//! checked between emissions and while blocked on a full channel.
//!
//! Both visit each live pair exactly once, in hash order: unspecified, but
//! deterministic for a given tree.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, SendTimeoutError};

use crate::config::Config;
use crate::leaf::{KeyVal, Leaf};
use crate::node::Node;
use crate::table::Table;

/// How often a producer blocked on a full channel rechecks cancellation.
const CANCEL_POLL: Duration = Duration::from_millis(25);

struct Frame<'a, C: Config, V> {
    table: &'a Table<C, V>,
    next: usize,
}

/// Pull iterator over `(&[u8], &V)` pairs.
///
/// Dropping it is the cancellation.
pub struct Iter<'a, C: Config, V> {
    stack: Vec<Frame<'a, C, V>>,
    leaf: Option<(&'a Leaf<V>, usize)>,
}

impl<'a, C: Config, V> Iter<'a, C, V> {
    pub(crate) fn new(root: &'a Table<C, V>) -> Self {
        Self {
            stack: vec![Frame {
                table: root,
                next: 0,
            }],
            leaf: None,
        }
    }
}

impl<'a, C: Config, V> Iterator for Iter<'a, C, V> {
    type Item = (&'a [u8], &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            // Drain the current leaf before touching the frame stack.
            if let Some((leaf, pos)) = self.leaf {
                let kvs = leaf.kvs();
                if pos < kvs.len() {
                    self.leaf = Some((leaf, pos + 1));
                    let kv = &kvs[pos];
                    return Some((&kv.key[..], &kv.val));
                }
                self.leaf = None;
            }

            let frame = self.stack.last_mut()?;
            if frame.next >= C::INDEX_LIMIT {
                self.stack.pop();
                continue;
            }
            let idx = frame.next;
            frame.next += 1;
            let table = frame.table;

            match table.get(idx) {
                None => {}
                Some(node) => match &**node {
                    Node::Leaf(leaf) => self.leaf = Some((leaf, 0)),
                    Node::Table(child) => self.stack.push(Frame {
                        table: child,
                        next: 0,
                    }),
                },
            }
        }
    }
}

/// Cancellation handle for a channel-based iteration.
///
/// Cancelling is idempotent and honored by the producer between emissions;
/// entries already buffered in the channel may still be delivered.
#[derive(Clone)]
pub struct IterCancel {
    flag: Arc<AtomicBool>,
}

impl IterCancel {
    pub(crate) fn new(flag: Arc<AtomicBool>) -> Self {
        Self { flag }
    }

    /// Stops the producer at the next emission boundary.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }
}

/// Walks `root` on a new thread, sending every pair into a channel holding
/// at most `buffer` undelivered entries.
///
/// The producer exits when the walk finishes, the receiver is dropped, or
/// `flag` is raised; the channel disconnects on exit, which is how the
/// receiver observes completion.
pub(crate) fn spawn_producer<C: Config, V>(
    root: Table<C, V>,
    buffer: usize,
    flag: Arc<AtomicBool>,
) -> Receiver<KeyVal<V>>
where
    C: Send + Sync,
    V: Clone + Send + Sync + 'static,
{
    let (tx, rx) = bounded(buffer);
    thread::spawn(move || {
        let iter = Iter::new(&root);
        'walk: for (key, val) in iter {
            if flag.load(Ordering::Relaxed) {
                break;
            }
            let mut item = KeyVal {
                key: Box::from(key),
                val: val.clone(),
            };
            loop {
                match tx.send_timeout(item, CANCEL_POLL) {
                    Ok(()) => break,
                    Err(SendTimeoutError::Timeout(back)) => {
                        if flag.load(Ordering::Relaxed) {
                            break 'walk;
                        }
                        item = back;
                    }
                    Err(SendTimeoutError::Disconnected(_)) => break 'walk,
                }
            }
        }
    });
    rx
}
