//! Monotonic time and elapsed-period checks
//!
//! Nothing in the core sleeps. Every wait is written as "at least N ms have
//! elapsed since T" and checked once per loop iteration.

/// Milliseconds since power-on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Instant(u64);

impl Instant {
    /// Power-on
    pub const ZERO: Instant = Instant(0);

    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Milliseconds between `earlier` and `self`, zero if `earlier` is later
    pub fn millis_since(self, earlier: Instant) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// True once at least `period_ms` have passed since `since`
    pub fn has_elapsed(self, since: Instant, period_ms: u32) -> bool {
        self.millis_since(since) >= u64::from(period_ms)
    }
}

/// Fixed-period timer anchored at the last time it fired
///
/// Starts anchored at power-on, so the first firing happens one period
/// after boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Interval {
    period_ms: u32,
    last: Instant,
}

impl Interval {
    pub const fn new(period_ms: u32) -> Self {
        Self {
            period_ms,
            last: Instant::ZERO,
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now.has_elapsed(self.last, self.period_ms)
    }

    /// Re-anchor at `now`
    pub fn restart(&mut self, now: Instant) {
        self.last = now;
    }

    /// Fire if due, re-anchoring at `now`
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.last = now;
            true
        } else {
            false
        }
    }
}
