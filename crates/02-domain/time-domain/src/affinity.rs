use std::cell::Cell;
use std::thread::{self, ThreadId};

/// Owner-thread guard for the single-threaded scheduling core.
///
/// The owning thread is captured on the first checked call; every later call
/// must come from that thread. The `Cell` keeps the holder `!Sync`, so the
/// compiler already rules out shared cross-thread access; the runtime check
/// catches moves followed by use from a second thread.
#[derive(Debug, Default)]
pub(crate) struct ThreadAffinity {
    owner: Cell<Option<ThreadId>>,
}

impl ThreadAffinity {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Asserts the caller runs on the owning thread, adopting the current
    /// thread on first use.
    #[track_caller]
    pub(crate) fn check(&self) {
        let current = thread::current().id();
        match self.owner.get() {
            None => self.owner.set(Some(current)),
            Some(owner) => debug_assert_eq!(
                owner, current,
                "sequencing core accessed from a foreign thread"
            ),
        }
    }
}
