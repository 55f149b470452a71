use std::sync::Arc;

use parking_lot::Mutex;
use sched_abi::SchedulerHost;
use timebase::TimeTicks;

/// Wake requests shared between the time domain's host binding and the
/// manager's run loop.
#[derive(Debug, Default)]
pub(crate) struct WakeState {
    /// An immediate scheduling pass was requested.
    pub(crate) immediate: bool,
    /// Where the delayed wake timer is armed, if anywhere.
    pub(crate) next_run_time: Option<TimeTicks>,
}

/// Host binding handed to the time domain.
///
/// The manager polls the shared state between passes instead of being called
/// back directly, which keeps the domain free of any reference back into the
/// manager.
pub(crate) struct ManagerHost {
    state: Arc<Mutex<WakeState>>,
}

impl ManagerHost {
    pub(crate) fn new(state: Arc<Mutex<WakeState>>) -> Self {
        Self { state }
    }
}

impl SchedulerHost for ManagerHost {
    fn request_do_work(&mut self) {
        self.state.lock().immediate = true;
    }

    fn set_next_delayed_do_work(&mut self, _now: TimeTicks, run_time: Option<TimeTicks>) {
        self.state.lock().next_run_time = run_time;
    }
}
