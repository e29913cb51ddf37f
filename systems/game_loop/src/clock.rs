//! Accumulator that turns wall-clock time into whole fixed ticks.

use std::time::Duration;

use tracing::warn;

const NANOS_PER_SECOND: u128 = 1_000_000_000;

/// Converts elapsed wall-clock time into a bounded number of fixed ticks.
///
/// Time is accumulated as `nanoseconds × rate` so that one second at 60 ticks
/// per second yields exactly 60 ticks regardless of how it was sliced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedClock {
    rate: u32,
    max_ticks: u32,
    accumulator: u128,
}

impl FixedClock {
    /// Creates a clock ticking `rate` times per second that never reports more
    /// than `max_ticks` for a single call to [`FixedClock::accumulate`].
    #[must_use]
    pub fn new(rate: u32, max_ticks: u32) -> Self {
        Self {
            rate: rate.max(1),
            max_ticks: max_ticks.max(1),
            accumulator: 0,
        }
    }

    /// Adds `elapsed` to the accumulator and returns the number of ticks due.
    ///
    /// Ticks beyond the per-call limit are dropped; the sub-tick remainder is
    /// carried into the next call.
    pub fn accumulate(&mut self, elapsed: Duration) -> u32 {
        let scaled = elapsed.as_nanos().saturating_mul(u128::from(self.rate));
        self.accumulator = self.accumulator.saturating_add(scaled);

        let due = self.accumulator / NANOS_PER_SECOND;
        self.accumulator %= NANOS_PER_SECOND;

        let limit = u128::from(self.max_ticks);
        if due > limit {
            warn!(
                due = %due,
                max_ticks = self.max_ticks,
                "dropping simulation backlog"
            );
            return self.max_ticks;
        }
        u32::try_from(due).unwrap_or(self.max_ticks)
    }

    /// Time carried over from previous calls that has not produced a tick yet.
    #[must_use]
    pub fn pending(&self) -> Duration {
        let nanos = self.accumulator / u128::from(self.rate);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    /// Discards any carried-over time.
    pub fn reset(&mut self) {
        self.accumulator = 0;
    }
}
