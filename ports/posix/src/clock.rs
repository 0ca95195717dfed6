//! Monotonic clock for POSIX hosts.

use std::time::{Duration, Instant};

use tempo::{Clock, Span, Tick};

/// Millisecond ticks elapsed since the clock was created.
///
/// Backed by [`Instant`], so wall-clock adjustments never move it backwards.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn origin(&self) -> Instant {
        self.origin
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Tick {
        let millis = self.origin.elapsed().as_millis();
        Tick::new(u64::try_from(millis).unwrap_or(u64::MAX))
    }
}

/// Real time covered by a span of millisecond ticks.
pub fn span_to_duration(span: Span) -> Duration {
    Duration::from_millis(span.ticks())
}

/// Millisecond ticks in a duration, rounded down.
pub fn duration_to_span(duration: Duration) -> Span {
    Span::from_millis(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}
