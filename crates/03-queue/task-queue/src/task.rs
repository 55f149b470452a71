use std::fmt;
use std::time::Duration;

use sched_abi::WakeUpResolution;

/// A unit of work, stamped with its posting sequence number.
pub struct Task {
    sequence: u64,
    run: Box<dyn FnOnce() + Send + 'static>,
}

impl Task {
    /// Wraps `run` with the given posting sequence number.
    pub fn new(sequence: u64, run: impl FnOnce() + Send + 'static) -> Self {
        Self {
            sequence,
            run: Box::new(run),
        }
    }

    /// Position of this task in the context-wide posting order.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Consumes and executes the task.
    pub fn run(self) {
        (self.run)();
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}

/// What a producer hands to the posting API, before it is sequenced.
pub struct PostedTask {
    run: Box<dyn FnOnce() + Send + 'static>,
    delay: Option<Duration>,
    resolution: WakeUpResolution,
}

impl PostedTask {
    /// An immediately runnable task.
    pub fn new(run: impl FnOnce() + Send + 'static) -> Self {
        Self {
            run: Box::new(run),
            delay: None,
            resolution: WakeUpResolution::Low,
        }
    }

    /// Delays the task by `delay`, measured from when the post reaches the
    /// manager thread.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Requests precise timing for the delayed wake.
    pub fn high_resolution(mut self) -> Self {
        self.resolution = WakeUpResolution::High;
        self
    }

    pub fn delay(&self) -> Option<Duration> {
        self.delay
    }

    pub fn resolution(&self) -> WakeUpResolution {
        self.resolution
    }

    /// Splits into the runnable and its scheduling attributes.
    pub fn into_parts(
        self,
    ) -> (
        Box<dyn FnOnce() + Send + 'static>,
        Option<Duration>,
        WakeUpResolution,
    ) {
        (self.run, self.delay, self.resolution)
    }
}

impl fmt::Debug for PostedTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostedTask")
            .field("delay", &self.delay)
            .field("resolution", &self.resolution)
            .finish_non_exhaustive()
    }
}
