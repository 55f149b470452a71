//! Monotonic time primitives shared across the sequencing runtime.
//!
//! [`TimeTicks`] is a point on a monotonic clock in nanoseconds from an
//! arbitrary epoch. [`Clock`] abstracts where those readings come from so the
//! scheduling layers can run against the real [`SystemClock`] or a
//! test-controlled [`ManualClock`]. [`LazyNow`] caches a single clock reading
//! for the duration of one scheduling call.

mod clock;
mod lazy_now;
mod ticks;

pub use clock::{Clock, ManualClock, SystemClock};
pub use lazy_now::LazyNow;
pub use ticks::TimeTicks;
