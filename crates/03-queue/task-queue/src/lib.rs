//! Task queues feeding the sequencing loop.
//!
//! A [`TaskQueue`] pairs a [`DelayedTaskStore`] (not-yet-due tasks ordered by
//! due time) with a runnable [`WorkQueue`] (FIFO of tasks ready to execute).
//! The time domain decides *when* delayed tasks become due; only the queue
//! itself moves them across, via
//! [`DomainBoundQueue::take_due_tasks`](sched_abi::DomainBoundQueue).

mod delayed;
mod queue;
mod task;
mod work;

pub use delayed::DelayedTaskStore;
pub use queue::TaskQueue;
pub use task::{PostedTask, Task};
pub use work::WorkQueue;

use thiserror::Error;

/// Failure at the cross-thread posting boundary.
///
/// Contract violations inside the sequencing core are assertions, not errors;
/// this is the one expected runtime failure a producer has to handle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PostError {
    /// The sequencing context shut down; the task was dropped.
    #[error("task queue is closed")]
    QueueClosed,
}
