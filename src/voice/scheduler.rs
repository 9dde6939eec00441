//! Cancellable delayed tasks on a virtual clock.
//!
//! Nothing here sleeps. The owner moves the clock forward with
//! [`Scheduler::pop_due`] and handles each payload as it comes out; a task
//! that was cancelled before its due time is never returned.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::Duration;

/// Handle for a single scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// Min-heap of `(due, seq)` with payloads and keys held on the side so that
/// cancellation is a map removal.
#[derive(Debug)]
pub struct Scheduler<K, T> {
    now: Duration,
    next_seq: u64,
    queue: BinaryHeap<Reverse<(Duration, u64)>>,
    payloads: HashMap<u64, (K, T)>,
}

impl<K, T> Default for Scheduler<K, T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            queue: BinaryHeap::new(),
            payloads: HashMap::new(),
        }
    }
}

impl<K: PartialEq, T> Scheduler<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `payload` to fire `delay` from now under `key`.
    /// Tasks with the same due time fire in the order they were scheduled.
    pub fn schedule(&mut self, key: K, delay: Duration, payload: T) -> TaskId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse((self.now + delay, seq)));
        self.payloads.insert(seq, (key, payload));
        TaskId(seq)
    }

    /// Cancel one task. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, task: TaskId) -> bool {
        self.payloads.remove(&task.0).is_some()
    }

    /// Cancel every pending task scheduled under `key`. Returns how many.
    pub fn cancel_key(&mut self, key: &K) -> usize {
        let before = self.payloads.len();
        self.payloads.retain(|_, (k, _)| k != key);
        before - self.payloads.len()
    }

    /// Number of live tasks under `key`.
    pub fn pending_for(&self, key: &K) -> usize {
        self.payloads
            .values()
            .filter(|(k, _)| k == key)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    /// Due time of the earliest live task.
    pub fn next_due(&mut self) -> Option<Duration> {
        self.discard_cancelled();
        self.queue.peek().map(|Reverse((due, _))| *due)
    }

    /// Pop the earliest live task due at or before `deadline`, moving the
    /// clock to its due time. Returns `None` (clock untouched) when nothing
    /// is due yet.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<(K, T)> {
        self.discard_cancelled();
        let Reverse((due, seq)) = *self.queue.peek()?;
        if due > deadline {
            return None;
        }
        self.queue.pop();
        let (key, payload) = self.payloads.remove(&seq)?;
        self.now = self.now.max(due);
        Some((key, payload))
    }

    /// Move the clock forward without firing anything. Never moves it back.
    pub fn advance_to(&mut self, at: Duration) {
        self.now = self.now.max(at);
    }

    fn discard_cancelled(&mut self) {
        while let Some(Reverse((_, seq))) = self.queue.peek() {
            if self.payloads.contains_key(seq) {
                break;
            }
            self.queue.pop();
        }
    }
}
