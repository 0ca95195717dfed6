//! Timer entities and the actions they run.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ActionError;
use crate::time::{Span, Tick};

/// Opaque handle to a timer owned by a [`Dispatcher`](crate::Dispatcher).
///
/// Ids are allocated from a monotonic counter and never reused, so a stale
/// handle can only ever refer to its own (possibly finished) timer.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

impl TimerId {
    pub(crate) const FIRST: Self = Self(1);

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub(crate) fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Scheduled,
    Cancelled,
    /// Terminal state of a one-shot timer after its action ran.
    Fired,
}

/// Side-effecting operation run when a timer fires.
///
/// Actions execute synchronously inside
/// [`Dispatcher::run_once`](crate::Dispatcher::run_once) and delay every
/// timer behind them, so they must be short.
pub trait Action: Send {
    fn fire(&mut self) -> Result<(), ActionError>;
}

impl<F> Action for F
where
    F: FnMut() -> Result<(), ActionError> + Send,
{
    fn fire(&mut self) -> Result<(), ActionError> {
        self()
    }
}

pub(crate) struct Timer {
    pub(crate) due_at: Tick,
    pub(crate) period: Option<Span>,
    pub(crate) state: TimerState,
    pub(crate) action: Box<dyn Action>,
}

impl Timer {
    pub(crate) fn new(due_at: Tick, period: Option<Span>, action: Box<dyn Action>) -> Self {
        Self {
            due_at,
            period,
            state: TimerState::Scheduled,
            action,
        }
    }

    pub(crate) fn is_periodic(&self) -> bool {
        self.period.is_some()
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("due_at", &self.due_at)
            .field("period", &self.period)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
