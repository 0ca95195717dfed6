//! Dispatcher handle for multi-threaded hosts.
//!
//! Every operation runs under one coarse lock. Actions execute while that
//! lock is held, so an action must never call back into the same
//! [`SharedDispatcher`]; the lock is not reentrant and the call deadlocks.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::dispatcher::{DispatchReport, Dispatcher};
use crate::error::DispatchError;
use crate::time::{Clock, Span, Tick};
use crate::timer::{Action, TimerId, TimerState};

pub struct SharedDispatcher<C: Clock> {
    inner: Arc<Mutex<Dispatcher<C>>>,
}

impl<C: Clock> Clone for SharedDispatcher<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Clock> SharedDispatcher<C> {
    pub fn new(dispatcher: Dispatcher<C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(dispatcher)),
        }
    }

    pub fn schedule_once<A>(&self, delay: Span, action: A) -> Result<TimerId, DispatchError>
    where
        A: Action + 'static,
    {
        self.inner.lock().schedule_once(delay, action)
    }

    pub fn schedule_periodic<A>(&self, period: Span, action: A) -> Result<TimerId, DispatchError>
    where
        A: Action + 'static,
    {
        self.inner.lock().schedule_periodic(period, action)
    }

    pub fn cancel(&self, id: TimerId) -> bool {
        self.inner.lock().cancel(id)
    }

    pub fn run_once(&self, now: Tick) -> DispatchReport {
        self.inner.lock().run_once(now)
    }

    pub fn next_due(&self) -> Option<Tick> {
        self.inner.lock().next_due()
    }

    pub fn now(&self) -> Tick {
        self.inner.lock().now()
    }

    pub fn state(&self, id: TimerId) -> Option<TimerState> {
        self.inner.lock().state(id)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Runs `f` with exclusive access to the dispatcher.
    pub fn with<R>(&self, f: impl FnOnce(&mut Dispatcher<C>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}
