use std::fmt;
use std::ops::{Add, Sub};
use std::time::Duration;

/// A point on a monotonic clock, in nanoseconds from an arbitrary epoch.
///
/// Values from different [`Clock`](crate::Clock) instances share no epoch and
/// must not be compared against each other.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeTicks(u64);

impl TimeTicks {
    /// The clock epoch itself.
    pub const ZERO: Self = Self(0);

    /// Creates a tick value from nanoseconds since the epoch.
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Returns nanoseconds since the epoch.
    pub const fn as_nanos(self) -> u64 {
        self.0
    }

    /// Adds a duration, returning `None` on overflow.
    pub fn checked_add(self, duration: Duration) -> Option<Self> {
        let nanos = u64::try_from(duration.as_nanos()).ok()?;
        self.0.checked_add(nanos).map(Self)
    }

    /// Adds a duration, clamping at the representable maximum.
    pub fn saturating_add(self, duration: Duration) -> Self {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(nanos))
    }

    /// Returns the duration since `earlier`, or zero when `earlier` is later.
    pub fn saturating_duration_since(self, earlier: Self) -> Duration {
        Duration::from_nanos(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for TimeTicks {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self {
        self.checked_add(rhs)
            .expect("TimeTicks addition overflowed")
    }
}

impl Sub<Duration> for TimeTicks {
    type Output = Self;

    fn sub(self, rhs: Duration) -> Self {
        let nanos = u64::try_from(rhs.as_nanos()).expect("duration exceeds tick range");
        Self(
            self.0
                .checked_sub(nanos)
                .expect("TimeTicks subtraction underflowed"),
        )
    }
}

impl Sub for TimeTicks {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Duration {
        Duration::from_nanos(
            self.0
                .checked_sub(rhs.0)
                .expect("TimeTicks subtraction underflowed"),
        )
    }
}

impl fmt::Debug for TimeTicks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimeTicks({}ns)", self.0)
    }
}
