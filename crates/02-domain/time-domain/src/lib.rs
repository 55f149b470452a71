//! Delayed wake-up scheduling core.
//!
//! A [`TimeDomain`] tracks, across every task queue in a sequencing context,
//! when the next delayed task becomes due. Queues register their earliest
//! pending wake-up; the domain keeps the system-wide minimum in a min-heap
//! and tells the host scheduler when its wake timer actually has to move.
//! Queue mutations vastly outnumber changes to the true global minimum, so
//! the domain compares the minimum before and after every mutation and only
//! talks to the host when it changed.
//!
//! The domain is single-threaded by design: it is bound to the thread that
//! registers the host scheduler and every entry point checks that affinity.
//! Cross-thread task posting is marshalled onto the owning thread by the
//! layers above before any call lands here.

mod affinity;
mod heap;
mod time_domain;


pub use time_domain::TimeDomain;
