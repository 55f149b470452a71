//! Boundary types shared between the time domain, task queues, and the
//! sequencing loop.
//!
//! This crate defines the contract between the wake-up scheduling core
//! (layer 02) and the queue/loop layers above it, with no policy or storage
//! of its own. Queues are referred to by [`QueueId`] everywhere; nothing in
//! the scheduling core ever owns a queue through one.

use timebase::TimeTicks;

/// Non-owning identity of a task queue.
///
/// Indexes into the sequencer's queue registry (arena pattern). The wake-up
/// heap stores these, never queue references.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueueId(pub u32);

impl QueueId {
    /// Returns the raw registry index.
    pub const fn index(self) -> u32 {
        self.0
    }
}

/// Precision the OS timer must provide for a wake-up.
///
/// High-resolution timers are costly (power, interrupt rate); the host only
/// requests one while at least one pending wake-up needs it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WakeUpResolution {
    /// Coarse timing is acceptable.
    Low,
    /// The wake must fire with precise timing.
    High,
}

/// When a queue next wants to run delayed work, and at what precision.
///
/// Immutable value; a queue's wake-up is replaced wholesale on update, never
/// mutated in place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WakeUp {
    /// Due time of the queue's earliest pending delayed task.
    pub time: TimeTicks,
    /// Timer precision that task asked for.
    pub resolution: WakeUpResolution,
}

impl WakeUp {
    /// Creates a low-resolution wake-up at `time`.
    pub const fn low(time: TimeTicks) -> Self {
        Self {
            time,
            resolution: WakeUpResolution::Low,
        }
    }

    /// Creates a high-resolution wake-up at `time`.
    pub const fn high(time: TimeTicks) -> Self {
        Self {
            time,
            resolution: WakeUpResolution::High,
        }
    }
}

/// Priority band of a task queue (P0 is highest).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QueuePriority {
    /// Highest band, reserved for latency-critical queues.
    P0,
    /// Default band for ordinary work.
    P1,
    /// Lowest band for maintenance or background queues.
    P2,
}

impl QueuePriority {
    /// All bands ordered from highest to lowest.
    pub const ALL: [Self; 3] = [Self::P0, Self::P1, Self::P2];
}

/// Why the selector chose a particular work queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SelectionReason {
    /// The queue sat in the highest non-empty priority band.
    PriorityBand,
    /// A lower band was picked to relieve starvation by higher bands.
    StarvationRelief,
}

/// Host scheduler interface consumed by the time domain.
///
/// The host owns the actual OS wait primitive; the domain only tells it when
/// the next wake must happen. Both calls are non-blocking and must be made on
/// the thread the domain is bound to.
pub trait SchedulerHost {
    /// Requests an immediate scheduling pass, without waiting for a timer.
    fn request_do_work(&mut self);

    /// Arms or moves the host's delayed wake timer to fire at `run_time`.
    ///
    /// `None` disarms the timer: no delayed work is pending anywhere.
    fn set_next_delayed_do_work(&mut self, now: TimeTicks, run_time: Option<TimeTicks>);
}

/// Interface the time domain requires from a task queue.
///
/// The domain never touches a queue's runnable work queue directly; it only
/// commands the queue to move its own due tasks.
pub trait DomainBoundQueue {
    /// Returns this queue's registry identity.
    fn id(&self) -> QueueId;

    /// Returns whether the queue is currently enabled.
    ///
    /// A disabled queue may not carry a pending wake-up.
    fn is_enabled(&self) -> bool;

    /// Moves every delayed task due at or before `now` into the queue's
    /// runnable work queue and returns the wake-up for the next still-pending
    /// delayed task, if any.
    fn take_due_tasks(&mut self, now: TimeTicks) -> Option<WakeUp>;
}
