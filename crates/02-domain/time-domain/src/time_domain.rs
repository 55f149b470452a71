use log::{debug, trace};
use sched_abi::{DomainBoundQueue, QueueId, SchedulerHost, WakeUp, WakeUpResolution};
use timebase::{LazyNow, TimeTicks};

use crate::affinity::ThreadAffinity;
use crate::heap::WakeUpHeap;

/// System-wide delayed wake-up tracker for one sequencing context.
///
/// Every queue registers the due time of its earliest pending delayed task
/// here; the domain keeps the minimum across all queues and owns the decision
/// of when the host scheduler's wake timer has to move. A wake-up is replaced
/// wholesale on every update, so the heap holds at most one entry per queue.
pub struct TimeDomain {
    heap: WakeUpHeap,
    pending_high_res_count: usize,
    host: Option<Box<dyn SchedulerHost>>,
    affinity: ThreadAffinity,
}

impl TimeDomain {
    /// Creates an unbound domain. [`register_host`](Self::register_host) must
    /// run before any queue operation.
    pub fn new() -> Self {
        Self {
            heap: WakeUpHeap::new(),
            pending_high_res_count: 0,
            host: None,
            affinity: ThreadAffinity::new(),
        }
    }

    /// Binds the domain to its host scheduler.
    ///
    /// One-time transition; a second call is a caller bug and panics in every
    /// build.
    pub fn register_host(&mut self, host: Box<dyn SchedulerHost>) {
        self.affinity.check();
        assert!(
            self.host.is_none(),
            "time domain is already bound to a host scheduler"
        );
        self.host = Some(host);
    }

    /// Replaces `queue`'s pending wake-up and rearms the host wake timer when
    /// the system-wide minimum actually changed.
    ///
    /// `None` cancels the queue's wake-up. A queue carrying a wake-up must be
    /// enabled. Queue mutations far outnumber changes to the true global
    /// minimum, so the minimum is compared before and after the heap edit and
    /// the host is only told about real changes.
    pub fn set_next_wake_up(
        &mut self,
        queue: &dyn DomainBoundQueue,
        wake_up: Option<WakeUp>,
        lazy_now: &mut LazyNow<'_>,
    ) {
        self.affinity.check();
        debug_assert!(self.host.is_some(), "time domain is not bound yet");
        debug_assert!(
            wake_up.is_none() || queue.is_enabled(),
            "disabled queue {:?} may not carry a pending wake-up",
            queue.id()
        );
        self.apply_wake_up(queue.id(), wake_up, lazy_now);
    }

    /// Promotes every due delayed task into its queue's work queue.
    ///
    /// `promote` runs once per due queue; it must drain everything due at or
    /// before `now` into the queue's runnable work queue and return the
    /// queue's next still-pending wake-up. Calling this again with no new due
    /// work is a no-op.
    pub fn move_ready_delayed_tasks(
        &mut self,
        lazy_now: &mut LazyNow<'_>,
        mut promote: impl FnMut(QueueId, TimeTicks) -> Option<WakeUp>,
    ) {
        self.affinity.check();
        debug_assert!(self.host.is_some(), "time domain is not bound yet");
        let now = lazy_now.now();
        while let Some(entry) = self.heap.min() {
            if entry.wake_up.time > now {
                break;
            }
            let queue = entry.queue;
            let next = promote(queue, now);
            debug_assert!(
                next.map_or(true, |w| w.time > now),
                "queue {queue:?} kept a due wake-up after promotion"
            );
            self.apply_wake_up(queue, next, lazy_now);
        }
    }

    /// The current system-wide minimum wake time, if any queue has one.
    pub fn next_scheduled_run_time(&self) -> Option<TimeTicks> {
        self.affinity.check();
        self.heap.min().map(|entry| entry.wake_up.time)
    }

    /// Withdraws any pending wake-up for a queue being torn down.
    ///
    /// Safe to call when the queue has no entry.
    pub fn unregister_queue(&mut self, queue: QueueId, lazy_now: &mut LazyNow<'_>) {
        self.affinity.check();
        debug_assert!(self.host.is_some(), "time domain is not bound yet");
        debug!("unregistering queue {queue:?}");
        self.apply_wake_up(queue, None, lazy_now);
    }

    /// Asks the host scheduler for an immediate scheduling pass.
    ///
    /// Pass-through for callers that hold the domain but not the host.
    pub fn request_do_work(&mut self) {
        self.affinity.check();
        let host = self
            .host
            .as_mut()
            .expect("time domain is not bound to a host scheduler");
        host.request_do_work();
    }

    /// Number of pending wake-ups that need a high-resolution timer.
    pub fn pending_high_res_count(&self) -> usize {
        self.affinity.check();
        self.pending_high_res_count
    }

    /// Whether the host should hold a high-resolution OS timer right now.
    pub fn has_pending_high_res_wake_ups(&self) -> bool {
        self.pending_high_res_count() > 0
    }

    fn apply_wake_up(
        &mut self,
        queue: QueueId,
        wake_up: Option<WakeUp>,
        lazy_now: &mut LazyNow<'_>,
    ) {
        let previous_min = self.heap.min().map(|entry| entry.wake_up.time);
        let previous_resolution = self.heap.get(queue).map(|w| w.resolution);

        match wake_up {
            Some(wake_up) if previous_resolution.is_some() => self.heap.change_key(queue, wake_up),
            Some(wake_up) => self.heap.insert(queue, wake_up),
            None => {
                self.heap.erase(queue);
            }
        }
        let new_min = self.heap.min().map(|entry| entry.wake_up.time);

        if previous_resolution == Some(WakeUpResolution::High) {
            self.pending_high_res_count = self
                .pending_high_res_count
                .checked_sub(1)
                .expect("pending high-res wake-up count underflowed");
        }
        if wake_up.map(|w| w.resolution) == Some(WakeUpResolution::High) {
            self.pending_high_res_count += 1;
        }

        if new_min == previous_min {
            trace!("wake-up change for {queue:?} kept the global minimum at {previous_min:?}");
            return;
        }

        let host = self
            .host
            .as_mut()
            .expect("time domain is not bound to a host scheduler");
        match new_min {
            None => {
                trace!("last pending wake-up gone; disarming the wake timer");
                host.set_next_delayed_do_work(lazy_now.now(), None);
            }
            Some(run_time) => {
                let now = lazy_now.now();
                if run_time <= now {
                    trace!("new global minimum {run_time:?} is already due");
                    host.request_do_work();
                } else {
                    trace!("rearming the wake timer for {run_time:?}");
                    host.set_next_delayed_do_work(now, Some(run_time));
                }
            }
        }
    }
}

impl Default for TimeDomain {
    fn default() -> Self {
        Self::new()
    }
}
