//! Min-heap of per-queue wake-ups with O(log n) arbitrary removal.
//!
//! Ordered by `(time, seq)` where `seq` is assigned from a monotonically
//! increasing counter on every insert and change-key, so equal-time wake-ups
//! pop FIFO by update order. The side index maps each queue to its current
//! position (its heap handle) and is maintained through every sift; a queue
//! with no pending wake-up has no index entry.

use std::collections::HashMap;

use sched_abi::{QueueId, WakeUp};

/// Position of a queue's entry in the backing array.
///
/// Only valid until the next heap mutation; always re-read through
/// [`WakeUpHeap::handle_for`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct HeapHandle(pub(crate) usize);

/// One pending wake-up and the queue it belongs to.
#[derive(Clone, Copy, Debug)]
pub(crate) struct HeapEntry {
    pub(crate) wake_up: WakeUp,
    pub(crate) queue: QueueId,
    seq: u64,
}

#[derive(Debug, Default)]
pub(crate) struct WakeUpHeap {
    entries: Vec<HeapEntry>,
    index: HashMap<QueueId, usize>,
    next_seq: u64,
}

impl WakeUpHeap {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entry with the smallest `(time, seq)` key.
    pub(crate) fn min(&self) -> Option<&HeapEntry> {
        self.entries.first()
    }

    /// Returns `queue`'s pending wake-up, if it has one.
    pub(crate) fn get(&self, queue: QueueId) -> Option<&WakeUp> {
        self.index.get(&queue).map(|&pos| &self.entries[pos].wake_up)
    }

    /// Returns `queue`'s current heap handle, if it has an entry.
    pub(crate) fn handle_for(&self, queue: QueueId) -> Option<HeapHandle> {
        self.index.get(&queue).copied().map(HeapHandle)
    }

    /// Adds an entry for a queue that must not already be present.
    pub(crate) fn insert(&mut self, queue: QueueId, wake_up: WakeUp) {
        debug_assert!(
            !self.index.contains_key(&queue),
            "queue {queue:?} already has a wake-up entry"
        );
        let seq = self.take_seq();
        let pos = self.entries.len();
        self.entries.push(HeapEntry {
            wake_up,
            queue,
            seq,
        });
        self.index.insert(queue, pos);
        self.sift_up(pos);
    }

    /// Replaces the wake-up of a queue that must already be present,
    /// re-heapifying from its current position.
    pub(crate) fn change_key(&mut self, queue: QueueId, wake_up: WakeUp) {
        let pos = *self
            .index
            .get(&queue)
            .expect("change_key on a queue with no wake-up entry");
        let seq = self.take_seq();
        self.entries[pos].wake_up = wake_up;
        self.entries[pos].seq = seq;
        if self.sift_up(pos) == pos {
            self.sift_down(pos);
        }
    }

    /// Removes `queue`'s entry, if any, by moving the last element into the
    /// freed slot and sifting. Returns whether an entry existed.
    pub(crate) fn erase(&mut self, queue: QueueId) -> bool {
        let Some(pos) = self.index.remove(&queue) else {
            return false;
        };
        let last = self.entries.len() - 1;
        if pos != last {
            self.entries.swap(pos, last);
            self.index.insert(self.entries[pos].queue, pos);
        }
        self.entries.pop();
        if pos < self.entries.len() && self.sift_up(pos) == pos {
            self.sift_down(pos);
        }
        true
    }

    fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn less(&self, a: usize, b: usize) -> bool {
        let (ea, eb) = (&self.entries[a], &self.entries[b]);
        (ea.wake_up.time, ea.seq) < (eb.wake_up.time, eb.seq)
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.entries.swap(a, b);
        self.index.insert(self.entries[a].queue, a);
        self.index.insert(self.entries[b].queue, b);
    }

    fn sift_up(&mut self, mut pos: usize) -> usize {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if !self.less(pos, parent) {
                break;
            }
            self.swap(pos, parent);
            pos = parent;
        }
        pos
    }

    fn sift_down(&mut self, mut pos: usize) -> usize {
        loop {
            let left = 2 * pos + 1;
            if left >= self.entries.len() {
                break;
            }
            let mut smallest = pos;
            if self.less(left, smallest) {
                smallest = left;
            }
            let right = left + 1;
            if right < self.entries.len() && self.less(right, smallest) {
                smallest = right;
            }
            if smallest == pos {
                break;
            }
            self.swap(pos, smallest);
            pos = smallest;
        }
        pos
    }

    /// Verifies the heap property and index consistency; test support.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        for pos in 1..self.entries.len() {
            let parent = (pos - 1) / 2;
            assert!(
                !self.less(pos, parent),
                "heap property violated at position {pos}"
            );
        }
        assert_eq!(self.index.len(), self.entries.len());
        for (queue, &pos) in &self.index {
            assert_eq!(self.entries[pos].queue, *queue, "stale index for {queue:?}");
        }
    }
}
