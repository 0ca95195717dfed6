//! Timestamps, spans and clock sources.

use core::fmt;
use core::ops::Add;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Monotonic timestamp in dispatcher ticks.
///
/// The unit is up to the clock source; host ports use milliseconds.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tick(u64);

impl Tick {
    /// Zero tick
    pub const ZERO: Self = Self(0);

    /// Maximum tick value
    pub const MAX: Self = Self(u64::MAX);

    pub const fn new(ticks: u64) -> Self {
        Self(ticks)
    }

    /// Get the raw tick value
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Adds a span, returning `None` if the result does not fit.
    pub fn checked_add(self, span: Span) -> Option<Self> {
        self.0.checked_add(span.0).map(Self)
    }

    /// Adds a span, saturating at [`Tick::MAX`].
    pub fn saturating_add(self, span: Span) -> Self {
        Self(self.0.saturating_add(span.0))
    }

    /// Span elapsed since an earlier tick, zero if `earlier` is in the future.
    pub fn saturating_since(self, earlier: Tick) -> Span {
        Span(self.0.saturating_sub(earlier.0))
    }
}

impl From<u64> for Tick {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tick:{}", self.0)
    }
}

/// Length of time in dispatcher ticks.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span(u64);

impl Span {
    /// Zero span
    pub const ZERO: Self = Self(0);

    pub const fn from_ticks(ticks: u64) -> Self {
        Self(ticks)
    }

    /// Create a span from milliseconds (assuming a 1ms tick period)
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Create a span from seconds (assuming a 1ms tick period)
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(1000))
    }

    pub const fn ticks(self) -> u64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Add<Span> for Tick {
    type Output = Tick;

    /// Saturating; use [`Tick::checked_add`] where overflow must be detected.
    fn add(self, rhs: Span) -> Tick {
        self.saturating_add(rhs)
    }
}

impl From<u64> for Span {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ticks", self.0)
    }
}

/// Monotonic time source consulted when timers are scheduled.
///
/// Implementations must never go backwards between reads.
pub trait Clock: Send {
    fn now(&self) -> Tick;
}

impl<C: Clock + Sync> Clock for Arc<C> {
    fn now(&self) -> Tick {
        (**self).now()
    }
}

/// Settable clock shared between a test or simulation and the dispatcher.
///
/// Clones observe the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    ticks: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: Tick) -> Self {
        Self {
            ticks: Arc::new(AtomicU64::new(start.raw())),
        }
    }

    /// Moves the clock to `tick`. Earlier values are ignored to keep the
    /// clock monotonic.
    pub fn set(&self, tick: Tick) {
        self.ticks.fetch_max(tick.raw(), Ordering::SeqCst);
    }

    /// Advances the clock by `span` and returns the new time.
    pub fn advance(&self, span: Span) -> Tick {
        let mut current = self.ticks.load(Ordering::SeqCst);
        loop {
            let next = current.saturating_add(span.ticks());
            match self
                .ticks
                .compare_exchange(current, next, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return Tick::new(next),
                Err(actual) => current = actual,
            }
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Tick {
        Tick::new(self.ticks.load(Ordering::SeqCst))
    }
}
