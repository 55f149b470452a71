use std::cmp::Ordering;
use std::collections::BinaryHeap;

use sched_abi::{WakeUp, WakeUpResolution};
use timebase::TimeTicks;

use crate::{Task, WorkQueue};

/// Per-queue store of not-yet-due tasks, ordered by `(due time, sequence)`.
///
/// Tasks sharing a due time surface in posting order.
#[derive(Debug, Default)]
pub struct DelayedTaskStore {
    heap: BinaryHeap<DelayedEntry>,
}

impl DelayedTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Adds `task`, due at `due`, waking at the given timer resolution.
    pub fn schedule(&mut self, task: Task, due: TimeTicks, resolution: WakeUpResolution) {
        self.heap.push(DelayedEntry {
            due,
            resolution,
            task,
        });
    }

    /// Due time of the earliest pending task.
    pub fn peek_due_time(&self) -> Option<TimeTicks> {
        self.heap.peek().map(|entry| entry.due)
    }

    /// Wake-up the owning queue should register for its earliest task.
    pub fn next_wake_up(&self) -> Option<WakeUp> {
        self.heap.peek().map(|entry| WakeUp {
            time: entry.due,
            resolution: entry.resolution,
        })
    }

    /// Moves every task due at or before `now` into `out`, earliest first.
    pub fn take_due(&mut self, now: TimeTicks, out: &mut WorkQueue) {
        while self.heap.peek().map_or(false, |entry| entry.due <= now) {
            if let Some(entry) = self.heap.pop() {
                out.push(entry.task);
            }
        }
    }
}

struct DelayedEntry {
    due: TimeTicks,
    resolution: WakeUpResolution,
    task: Task,
}

impl DelayedEntry {
    fn key(&self) -> (TimeTicks, u64) {
        (self.due, self.task.sequence())
    }
}

impl PartialEq for DelayedEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for DelayedEntry {}

impl PartialOrd for DelayedEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DelayedEntry {
    // `BinaryHeap` is a max-heap; reversed keys surface the earliest-due,
    // lowest-sequence task first.
    fn cmp(&self, other: &Self) -> Ordering {
        other.key().cmp(&self.key())
    }
}

impl std::fmt::Debug for DelayedEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelayedEntry")
            .field("due", &self.due)
            .field("resolution", &self.resolution)
            .field("sequence", &self.task.sequence())
            .finish()
    }
}
