use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::TimeTicks;

/// Source of monotonic [`TimeTicks`] readings.
pub trait Clock: Send + Sync {
    /// Returns the current time on this clock.
    fn now(&self) -> TimeTicks;
}

/// Monotonic wall clock anchored to an [`Instant`] captured at construction.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Creates a clock whose epoch is the moment of construction.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> TimeTicks {
        let elapsed = self.origin.elapsed();
        TimeTicks::ZERO.saturating_add(elapsed)
    }
}

/// Manually driven clock for tests and deterministic drivers.
///
/// The reading only changes through [`set`](Self::set) and
/// [`advance`](Self::advance), both usable through a shared reference so the
/// clock can sit behind an `Arc` while the sequencing loop holds it.
#[derive(Debug, Default)]
pub struct ManualClock {
    nanos: AtomicU64,
}

impl ManualClock {
    /// Creates a clock reading `start`.
    pub fn new(start: TimeTicks) -> Self {
        Self {
            nanos: AtomicU64::new(start.as_nanos()),
        }
    }

    /// Moves the clock to `now`. Moving backwards is a caller bug.
    pub fn set(&self, now: TimeTicks) {
        debug_assert!(
            now.as_nanos() >= self.nanos.load(Ordering::Relaxed),
            "manual clock moved backwards"
        );
        self.nanos.store(now.as_nanos(), Ordering::Relaxed);
    }

    /// Advances the clock by `delta`.
    pub fn advance(&self, delta: Duration) {
        let nanos = u64::try_from(delta.as_nanos()).unwrap_or(u64::MAX);
        self.nanos.fetch_add(nanos, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> TimeTicks {
        TimeTicks::from_nanos(self.nanos.load(Ordering::Relaxed))
    }
}
