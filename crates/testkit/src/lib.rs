//! Shared test fixtures for the sequencing crates.
//!
//! [`RecordingHost`] captures every host-scheduler call so tests can assert
//! exactly when the wake timer was rearmed. [`ScriptedQueue`] stands in for a
//! real task queue when a test only cares about wake-up bookkeeping.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use sched_abi::{DomainBoundQueue, QueueId, SchedulerHost, WakeUp};
use timebase::TimeTicks;

/// One recorded host-scheduler call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostCall {
    /// The domain asked for an immediate scheduling pass.
    RequestDoWork,
    /// The domain armed (`Some`) or disarmed (`None`) the delayed wake timer.
    SetNextDelayedDoWork {
        now: TimeTicks,
        run_time: Option<TimeTicks>,
    },
}

/// Cloneable observation side of a [`RecordingHost`].
///
/// Clone it before boxing the host away into the time domain.
#[derive(Clone, Debug, Default)]
pub struct HostCallLog {
    calls: Arc<Mutex<Vec<HostCall>>>,
}

impl HostCallLog {
    /// Copies out every call recorded so far.
    pub fn snapshot(&self) -> Vec<HostCall> {
        self.calls.lock().clone()
    }

    /// Removes and returns every recorded call.
    pub fn take(&self) -> Vec<HostCall> {
        std::mem::take(&mut *self.calls.lock())
    }

    /// Number of calls recorded so far.
    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns `true` when no call has been recorded.
    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }

    fn push(&self, call: HostCall) {
        self.calls.lock().push(call);
    }
}

/// Scheduler host that records every call for later assertions.
#[derive(Debug, Default)]
pub struct RecordingHost {
    log: HostCallLog,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the shared call log.
    pub fn log(&self) -> HostCallLog {
        self.log.clone()
    }
}

impl SchedulerHost for RecordingHost {
    fn request_do_work(&mut self) {
        self.log.push(HostCall::RequestDoWork);
    }

    fn set_next_delayed_do_work(&mut self, now: TimeTicks, run_time: Option<TimeTicks>) {
        self.log.push(HostCall::SetNextDelayedDoWork { now, run_time });
    }
}

/// Queue stand-in scripted with a list of pending wake-ups.
///
/// `pending` must be pushed in ascending time order; promotion drains every
/// due entry and reports the next one, the way a real delayed store does.
#[derive(Debug)]
pub struct ScriptedQueue {
    id: QueueId,
    enabled: bool,
    pending: VecDeque<WakeUp>,
    promotions: usize,
}

impl ScriptedQueue {
    pub fn new(id: QueueId) -> Self {
        Self {
            id,
            enabled: true,
            pending: VecDeque::new(),
            promotions: 0,
        }
    }

    /// Creates a queue with pending wake-ups, earliest first.
    pub fn with_pending(id: QueueId, pending: impl IntoIterator<Item = WakeUp>) -> Self {
        let mut queue = Self::new(id);
        queue.pending.extend(pending);
        queue
    }

    /// Appends a pending wake-up; must be no earlier than the last one.
    pub fn push_pending(&mut self, wake_up: WakeUp) {
        debug_assert!(
            self.pending.back().map_or(true, |last| last.time <= wake_up.time),
            "scripted wake-ups must be pushed in ascending time order"
        );
        self.pending.push_back(wake_up);
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// How many times the domain promoted this queue.
    pub fn promotions(&self) -> usize {
        self.promotions
    }

    /// The earliest still-pending wake-up.
    pub fn next_pending(&self) -> Option<WakeUp> {
        self.pending.front().copied()
    }
}

impl DomainBoundQueue for ScriptedQueue {
    fn id(&self) -> QueueId {
        self.id
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn take_due_tasks(&mut self, now: TimeTicks) -> Option<WakeUp> {
        self.promotions += 1;
        while self.pending.front().map_or(false, |w| w.time <= now) {
            self.pending.pop_front();
        }
        self.pending.front().copied()
    }
}
