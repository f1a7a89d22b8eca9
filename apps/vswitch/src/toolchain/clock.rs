//! Clock capability used for catalog cache staleness checks.

use std::time::SystemTime;

/// Source of the current time.
///
/// Only [`Clock::now`] must be implemented; the comparison helpers are
/// derived from it so fake clocks stay trivial.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;

    /// Returns `true` if `time` is strictly earlier than `other`.
    ///
    /// Part of the clock contract; the binary itself only needs [`Clock::is_after`].
    #[allow(dead_code)]
    fn is_before(&self, time: SystemTime, other: SystemTime) -> bool {
        time < other
    }

    /// Returns `true` if `time` is strictly later than `other`.
    fn is_after(&self, time: SystemTime, other: SystemTime) -> bool {
        time > other
    }

    /// Hours elapsed between `time` and [`Clock::now`].
    ///
    /// Times in the future yield a negative value.
    fn hours_since(&self, time: SystemTime) -> f64 {
        let now = self.now();
        match now.duration_since(time) {
            Ok(elapsed) => elapsed.as_secs_f64() / 3600.0,
            Err(err) => -(err.duration().as_secs_f64() / 3600.0),
        }
    }
}

/// [`Clock`] backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// A clock pinned to a fixed instant.
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub SystemTime);

#[cfg(test)]
impl FixedClock {
    /// A clock that reads `offset` after the system time at construction.
    #[must_use]
    pub fn offset_from_now(offset: std::time::Duration) -> Self {
        Self(SystemTime::now() + offset)
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> SystemTime {
        self.0
    }
}
