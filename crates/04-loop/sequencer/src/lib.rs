//! Sequencing loop over prioritized task queues.
//!
//! [`SequenceManager`] owns the queue registry, the time domain, and the
//! [`QueueSelector`]. Producers on other threads post through cloneable
//! [`QueueHandle`]s; everything else happens on the manager's thread, one
//! budgeted [`do_work`](SequenceManager::do_work) pass at a time.

mod host;
mod inspector;
mod manager;
mod selector;

pub use inspector::{QueueSnapshot, SequencerSnapshot};
pub use manager::{DoWorkSummary, QueueHandle, SequenceManager, DEFAULT_TASK_BUDGET};
pub use selector::{QueueSelector, Selection, STARVATION_THRESHOLD};
