use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, trace};
use parking_lot::Mutex;
use sched_abi::{DomainBoundQueue, QueueId, QueuePriority};
use task_queue::{PostError, PostedTask, Task, TaskQueue};
use time_domain::TimeDomain;
use timebase::{Clock, LazyNow, SystemClock, TimeTicks};

use crate::host::{ManagerHost, WakeState};
use crate::inspector::{priority_label, QueueSnapshot, SequencerSnapshot};
use crate::selector::{QueueSelector, Selection};

/// How many tasks one [`SequenceManager::do_work`] pass may run.
pub const DEFAULT_TASK_BUDGET: usize = 32;

/// What one scheduling pass accomplished.
#[derive(Debug, Default)]
pub struct DoWorkSummary {
    /// Tasks executed this pass.
    pub tasks_run: usize,
    /// Selector decisions, in execution order.
    pub selections: Vec<Selection>,
    /// System-wide next delayed run time after the pass.
    pub next_run_time: Option<TimeTicks>,
}

enum Ingress {
    Post { queue: QueueId, posted: PostedTask },
}

/// Cloneable, `Send` posting handle for one queue.
///
/// Posts are marshalled through the manager's ingress channel and sequenced
/// on the manager thread; a delayed task's due time is measured from when the
/// post is drained there.
#[derive(Clone)]
pub struct QueueHandle {
    id: QueueId,
    ingress: Sender<Ingress>,
}

impl QueueHandle {
    pub fn id(&self) -> QueueId {
        self.id
    }

    /// Posts a task to run as soon as its queue is selected.
    pub fn post(&self, run: impl FnOnce() + Send + 'static) -> Result<(), PostError> {
        self.post_task(PostedTask::new(run))
    }

    /// Posts a task to run `delay` after the post reaches the manager thread.
    pub fn post_delayed(
        &self,
        run: impl FnOnce() + Send + 'static,
        delay: Duration,
    ) -> Result<(), PostError> {
        self.post_task(PostedTask::new(run).after(delay))
    }

    /// Posts a pre-built [`PostedTask`].
    pub fn post_task(&self, posted: PostedTask) -> Result<(), PostError> {
        self.ingress
            .send(Ingress::Post {
                queue: self.id,
                posted,
            })
            .map_err(|_| PostError::QueueClosed)
    }
}

/// Owns the queues, the time domain, and the selector of one sequencing
/// context, and runs its scheduling passes.
pub struct SequenceManager {
    clock: Arc<dyn Clock>,
    domain: TimeDomain,
    queues: Vec<Option<TaskQueue>>,
    selector: QueueSelector,
    wake: Arc<Mutex<WakeState>>,
    ingress_tx: Sender<Ingress>,
    ingress_rx: Receiver<Ingress>,
    next_sequence: u64,
}

impl SequenceManager {
    /// Creates a manager over the real monotonic clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::new()))
    }

    /// Creates a manager over `clock`; deterministic tests drive a
    /// [`timebase::ManualClock`] through this.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let wake = Arc::new(Mutex::new(WakeState::default()));
        let mut domain = TimeDomain::new();
        domain.register_host(Box::new(ManagerHost::new(Arc::clone(&wake))));
        let (ingress_tx, ingress_rx) = unbounded();
        Self {
            clock,
            domain,
            queues: Vec::new(),
            selector: QueueSelector::new(),
            wake,
            ingress_tx,
            ingress_rx,
            next_sequence: 0,
        }
    }

    /// Registers a queue and returns its cross-thread posting handle.
    pub fn create_queue(&mut self, name: &'static str, priority: QueuePriority) -> QueueHandle {
        let id = QueueId(self.queues.len() as u32);
        self.queues.push(Some(TaskQueue::new(id, name, priority)));
        debug!("created queue {id:?} ({name}, {priority:?})");
        QueueHandle {
            id,
            ingress: self.ingress_tx.clone(),
        }
    }

    /// Enables or disables a queue.
    ///
    /// Disabling withdraws the queue's pending wake-up; re-enabling
    /// re-registers the earliest one.
    pub fn set_queue_enabled(&mut self, id: QueueId, enabled: bool) {
        let clock = Arc::clone(&self.clock);
        let mut lazy_now = LazyNow::new(&*clock);
        let Some(queue) = self
            .queues
            .get_mut(id.index() as usize)
            .and_then(Option::as_mut)
        else {
            return;
        };
        if !queue.set_enabled(enabled) {
            return;
        }
        self.domain
            .set_next_wake_up(queue, queue.pending_wake_up(), &mut lazy_now);
    }

    /// Unregisters and drops a queue; tasks it still held are dropped too.
    pub fn shutdown_queue(&mut self, id: QueueId) {
        let clock = Arc::clone(&self.clock);
        let mut lazy_now = LazyNow::new(&*clock);
        let Some(slot) = self.queues.get_mut(id.index() as usize) else {
            return;
        };
        if slot.take().is_some() {
            self.domain.unregister_queue(id, &mut lazy_now);
            debug!("shut down queue {id:?}");
        }
    }

    /// Posts directly on the manager thread, skipping the ingress channel.
    pub fn post(&mut self, id: QueueId, posted: PostedTask) {
        let clock = Arc::clone(&self.clock);
        let mut lazy_now = LazyNow::new(&*clock);
        self.apply_post(id, posted, &mut lazy_now);
    }

    /// One scheduling pass: drain cross-thread posts, promote due delayed
    /// tasks, then run up to `budget` selector-picked tasks.
    pub fn do_work(&mut self, budget: usize) -> DoWorkSummary {
        let clock = Arc::clone(&self.clock);
        let mut lazy_now = LazyNow::new(&*clock);
        self.wake.lock().immediate = false;

        self.drain_ingress(&mut lazy_now);

        let domain = &mut self.domain;
        let queues = &mut self.queues;
        domain.move_ready_delayed_tasks(&mut lazy_now, |id, now| {
            queues
                .get_mut(id.index() as usize)
                .and_then(Option::as_mut)
                .and_then(|queue| queue.take_due_tasks(now))
        });

        let mut summary = DoWorkSummary::default();
        while summary.tasks_run < budget {
            let ready = self.queues.iter().filter_map(|slot| {
                slot.as_ref()
                    .filter(|queue| queue.is_enabled() && queue.has_ready_work())
                    .map(|queue| (queue.id(), queue.priority()))
            });
            let Some(selection) = self.selector.select(ready) else {
                break;
            };
            let task = self.queues[selection.queue.index() as usize]
                .as_mut()
                .and_then(TaskQueue::take_next_task);
            if let Some(task) = task {
                trace!(
                    "running task {} from queue {:?} ({:?})",
                    task.sequence(),
                    selection.queue,
                    selection.reason
                );
                task.run();
                summary.tasks_run += 1;
                summary.selections.push(selection);
            }
        }

        summary.next_run_time = self.domain.next_scheduled_run_time();
        trace!(
            "pass ran {} task(s); next run time {:?}",
            summary.tasks_run,
            summary.next_run_time
        );
        summary
    }

    /// Runs passes until the context is drained: no runnable task, no queued
    /// cross-thread post, and no pending delayed wake-up.
    ///
    /// Between passes the loop sleeps on the ingress channel with a timeout
    /// derived from the armed next wake time, so cross-thread posts interrupt
    /// the wait.
    pub fn run_until_idle(&mut self) {
        loop {
            self.do_work(DEFAULT_TASK_BUDGET);
            if self.has_ready_work() || !self.ingress_rx.is_empty() {
                continue;
            }
            if self.wake.lock().immediate {
                continue;
            }
            let Some(run_time) = self.domain.next_scheduled_run_time() else {
                return;
            };
            let now = self.clock.now();
            if run_time <= now {
                continue;
            }
            match self
                .ingress_rx
                .recv_timeout(run_time.saturating_duration_since(now))
            {
                Ok(Ingress::Post { queue, posted }) => {
                    let clock = Arc::clone(&self.clock);
                    let mut lazy_now = LazyNow::new(&*clock);
                    self.apply_post(queue, posted, &mut lazy_now);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }
    }

    /// Captures a serializable snapshot of the whole context.
    pub fn snapshot(&self) -> SequencerSnapshot {
        let queues = self
            .queues
            .iter()
            .flatten()
            .map(|queue| QueueSnapshot {
                id: queue.id().index(),
                name: queue.name(),
                priority: priority_label(queue.priority()),
                enabled: queue.is_enabled(),
                ready_tasks: queue.work_len(),
                delayed_tasks: queue.delayed_len(),
                next_wake_up_nanos: queue.pending_wake_up().map(|w| w.time.as_nanos()),
            })
            .collect();
        let wake = self.wake.lock();
        SequencerSnapshot {
            queues,
            next_run_time_nanos: self
                .domain
                .next_scheduled_run_time()
                .map(TimeTicks::as_nanos),
            armed_run_time_nanos: wake.next_run_time.map(TimeTicks::as_nanos),
            immediate_pass_requested: wake.immediate,
            pending_high_res_wake_ups: self.domain.pending_high_res_count(),
        }
    }

    /// The system-wide next delayed run time.
    pub fn next_scheduled_run_time(&self) -> Option<TimeTicks> {
        self.domain.next_scheduled_run_time()
    }

    fn has_ready_work(&self) -> bool {
        self.queues
            .iter()
            .flatten()
            .any(|queue| queue.is_enabled() && queue.has_ready_work())
    }

    fn drain_ingress(&mut self, lazy_now: &mut LazyNow<'_>) {
        while let Ok(Ingress::Post { queue, posted }) = self.ingress_rx.try_recv() {
            self.apply_post(queue, posted, lazy_now);
        }
    }

    fn apply_post(&mut self, id: QueueId, posted: PostedTask, lazy_now: &mut LazyNow<'_>) {
        let Some(queue) = self
            .queues
            .get_mut(id.index() as usize)
            .and_then(Option::as_mut)
        else {
            trace!("dropping task posted to missing queue {id:?}");
            return;
        };
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        let (run, delay, resolution) = posted.into_parts();
        let task = Task::new(sequence, run);
        match delay {
            None => queue.post(task),
            Some(delay) => {
                let due = lazy_now.now() + delay;
                let wake_up = queue.schedule(task, due, resolution);
                if queue.is_enabled() {
                    self.domain.set_next_wake_up(queue, wake_up, &mut *lazy_now);
                }
            }
        }
    }
}

impl Default for SequenceManager {
    fn default() -> Self {
        Self::new()
    }
}
