use crate::{Clock, TimeTicks};

/// A clock reading computed at most once per scheduling call.
///
/// Scheduling operations touch "now" from several branches; reading the clock
/// once keeps those branches consistent and avoids repeated clock queries on
/// hot paths. Callers construct one `LazyNow` per call and pass it down.
pub struct LazyNow<'a> {
    clock: &'a dyn Clock,
    cached: Option<TimeTicks>,
}

impl<'a> LazyNow<'a> {
    /// Creates a lazy reading over `clock`.
    pub fn new(clock: &'a dyn Clock) -> Self {
        Self {
            clock,
            cached: None,
        }
    }

    /// Creates a reading pinned to an already-known `now`.
    pub fn with_now(clock: &'a dyn Clock, now: TimeTicks) -> Self {
        Self {
            clock,
            cached: Some(now),
        }
    }

    /// Returns the cached reading, querying the clock on first use.
    pub fn now(&mut self) -> TimeTicks {
        *self.cached.get_or_insert_with(|| self.clock.now())
    }

    /// Returns the cached reading without querying the clock.
    pub fn peek(&self) -> Option<TimeTicks> {
        self.cached
    }
}

impl std::fmt::Debug for LazyNow<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyNow").field("cached", &self.cached).finish()
    }
}
