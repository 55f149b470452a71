use log::debug;
use sched_abi::{DomainBoundQueue, QueueId, QueuePriority, WakeUp, WakeUpResolution};
use timebase::TimeTicks;

use crate::{DelayedTaskStore, Task, WorkQueue};

/// One task queue: identity, priority band, and its two task stores.
///
/// A disabled queue keeps accepting tasks but carries no wake-up in the time
/// domain and is never selected; re-enabling re-registers the earliest
/// pending wake-up through [`pending_wake_up`](Self::pending_wake_up).
#[derive(Debug)]
pub struct TaskQueue {
    id: QueueId,
    name: &'static str,
    priority: QueuePriority,
    enabled: bool,
    delayed: DelayedTaskStore,
    work: WorkQueue,
}

impl TaskQueue {
    /// Creates an enabled, empty queue.
    pub fn new(id: QueueId, name: &'static str, priority: QueuePriority) -> Self {
        Self {
            id,
            name,
            priority,
            enabled: true,
            delayed: DelayedTaskStore::new(),
            work: WorkQueue::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn priority(&self) -> QueuePriority {
        self.priority
    }

    /// Enqueues an immediately runnable task.
    pub fn post(&mut self, task: Task) {
        self.work.push(task);
    }

    /// Stores a delayed task and returns the wake-up this queue should now
    /// carry in the time domain.
    pub fn schedule(
        &mut self,
        task: Task,
        due: TimeTicks,
        resolution: WakeUpResolution,
    ) -> Option<WakeUp> {
        self.delayed.schedule(task, due, resolution);
        self.pending_wake_up()
    }

    /// The wake-up this queue should carry right now. `None` while disabled
    /// or when no delayed task is pending.
    pub fn pending_wake_up(&self) -> Option<WakeUp> {
        if self.enabled {
            self.delayed.next_wake_up()
        } else {
            None
        }
    }

    /// Flips the enabled flag; returns whether it changed.
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        if self.enabled == enabled {
            return false;
        }
        self.enabled = enabled;
        debug!(
            "queue {:?} ({}) {}",
            self.id,
            self.name,
            if enabled { "enabled" } else { "disabled" }
        );
        true
    }

    /// Pops the next runnable task.
    pub fn take_next_task(&mut self) -> Option<Task> {
        self.work.pop()
    }

    pub fn has_ready_work(&self) -> bool {
        !self.work.is_empty()
    }

    pub fn work_len(&self) -> usize {
        self.work.len()
    }

    pub fn delayed_len(&self) -> usize {
        self.delayed.len()
    }
}

impl DomainBoundQueue for TaskQueue {
    fn id(&self) -> QueueId {
        self.id
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn take_due_tasks(&mut self, now: TimeTicks) -> Option<WakeUp> {
        self.delayed.take_due(now, &mut self.work);
        self.pending_wake_up()
    }
}
