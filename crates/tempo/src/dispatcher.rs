//! Cooperative timer dispatch.
//!
//! The dispatcher owns every timer and does no work on its own: timers only
//! fire when the embedding loop calls [`Dispatcher::run_once`]. Scheduling
//! reads the clock, dispatch is handed the time explicitly, which keeps a
//! pass fully deterministic under a [`ManualClock`](crate::ManualClock).

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};

use crate::config::DispatcherConfig;
use crate::error::{ActionFailure, DispatchError};
use crate::time::{Clock, Span, Tick};
use crate::timer::{Action, Timer, TimerId, TimerState};
use crate::trace::{TraceHook, TraceRecord};

/// Outcome of one dispatch pass.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Time the pass was run for.
    pub now: Tick,
    /// Timers whose action ran, in firing order. Failed firings are included.
    pub fired: Vec<TimerId>,
    /// Cancelled timers dropped from the pending set.
    pub purged: usize,
    pub failures: Vec<ActionFailure>,
}

impl DispatchReport {
    fn new(now: Tick) -> Self {
        Self {
            now,
            ..Self::default()
        }
    }

    /// True when every action in the pass succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Single-threaded timer dispatch core.
pub struct Dispatcher<C: Clock> {
    config: DispatcherConfig,
    clock: C,
    /// Every timer not yet retired, including cancelled ones awaiting purge.
    timers: BTreeMap<TimerId, Timer>,
    /// Scheduled timers ordered by due time, ties broken by creation order.
    queue: BTreeSet<(Tick, TimerId)>,
    cancelled: Vec<TimerId>,
    /// `None` once the id space is used up.
    next_id: Option<TimerId>,
    last_pass: Option<Tick>,
    trace: Option<TraceHook>,
}

impl<C: Clock> Dispatcher<C> {
    pub fn new(clock: C) -> Self {
        Self::with_config(DispatcherConfig::default(), clock)
    }

    pub fn with_config(config: DispatcherConfig, clock: C) -> Self {
        Self {
            config,
            clock,
            timers: BTreeMap::new(),
            queue: BTreeSet::new(),
            cancelled: Vec::new(),
            next_id: Some(TimerId::FIRST),
            last_pass: None,
            trace: None,
        }
    }

    pub fn with_trace_hook(mut self, hook: TraceHook) -> Self {
        self.trace = Some(hook);
        self
    }

    pub fn set_trace_hook(&mut self, hook: Option<TraceHook>) {
        self.trace = hook;
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Current time according to the dispatcher's clock.
    pub fn now(&self) -> Tick {
        self.clock.now()
    }

    /// Runs `action` once, `delay` ticks from now. A zero delay makes the
    /// timer due on the next pass.
    pub fn schedule_once<A>(&mut self, delay: Span, action: A) -> Result<TimerId, DispatchError>
    where
        A: Action + 'static,
    {
        self.arm(delay, None, Box::new(action))
    }

    /// Runs `action` every `period` ticks, first at `now + period`.
    pub fn schedule_periodic<A>(
        &mut self,
        period: Span,
        action: A,
    ) -> Result<TimerId, DispatchError>
    where
        A: Action + 'static,
    {
        if period.is_zero() {
            return Err(DispatchError::InvalidDuration);
        }
        self.arm(period, Some(period), Box::new(action))
    }

    /// Cancels a scheduled timer.
    ///
    /// Returns `false` without error when `id` is unknown or already
    /// cancelled or fired. The timer keeps its slot until the next pass.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.timers.get_mut(&id) {
            Some(timer) if timer.state == TimerState::Scheduled => {
                timer.state = TimerState::Cancelled;
                self.queue.remove(&(timer.due_at, id));
                self.cancelled.push(id);
                debug!("{}: {id} disarmed (was due at {})", self.config.name, timer.due_at);
                emit(
                    &self.trace,
                    TraceRecord::Disarmed {
                        id,
                        due_at: timer.due_at,
                    },
                );
                true
            }
            _ => {
                debug!("{}: disarm of inactive {id} ignored", self.config.name);
                emit(&self.trace, TraceRecord::DisarmAttempt { id });
                false
            }
        }
    }

    /// Cancels every scheduled timer and returns how many were cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let ids: Vec<TimerId> = self.queue.iter().map(|&(_, id)| id).collect();
        ids.into_iter().filter(|&id| self.cancel(id)).count()
    }

    /// Dispatch pass: fires every scheduled timer due at or before `now`.
    ///
    /// Cancelled timers are purged first. Due timers then fire in ascending
    /// `(due_at, id)` order, each at most once per pass. Recurring timers move
    /// to `due_at + period`, so dispatch latency never accumulates; if that is
    /// still not after `now` they fire again on the next pass. A failing action
    /// is reported and does not stop the pass, and a failing recurring timer
    /// stays scheduled.
    pub fn run_once(&mut self, now: Tick) -> DispatchReport {
        if let Some(last) = self.last_pass {
            if now < last {
                warn!(
                    "{}: dispatch time went backwards ({now} < {last})",
                    self.config.name
                );
            }
        }
        self.last_pass = Some(self.last_pass.map_or(now, |last| last.max(now)));

        let mut report = DispatchReport::new(now);
        report.purged = self.purge_cancelled();

        let due: Vec<(Tick, TimerId)> = self
            .queue
            .iter()
            .take_while(|&&(due_at, _)| due_at <= now)
            .copied()
            .collect();

        for key in due {
            self.queue.remove(&key);
            let (due_at, id) = key;
            let Some(timer) = self.timers.get_mut(&id) else {
                continue;
            };
            if timer.state != TimerState::Scheduled {
                continue;
            }

            if let Some(threshold) = self.config.late_warning {
                let late = now.saturating_since(due_at);
                if late > threshold {
                    warn!("{}: {id} fired {late} late", self.config.name);
                }
            }

            emit(&self.trace, TraceRecord::Posted { id, due_at, now });
            let result = timer.action.fire();
            report.fired.push(id);
            if let Err(error) = result {
                warn!("{}: action of {id} failed: {error}", self.config.name);
                report.failures.push(ActionFailure { id, due_at, error });
            }

            let next = match timer.period {
                Some(period) => match due_at.checked_add(period) {
                    Some(next) => Some(next),
                    None => {
                        warn!(
                            "{}: {id} period overflows the tick counter, retiring",
                            self.config.name
                        );
                        None
                    }
                },
                None => None,
            };

            match next {
                Some(next) => {
                    timer.due_at = next;
                    self.queue.insert((next, id));
                }
                None => {
                    timer.state = TimerState::Fired;
                    self.timers.remove(&id);
                    debug!("{}: {id} auto-disarmed", self.config.name);
                    emit(&self.trace, TraceRecord::AutoDisarm { id });
                }
            }
        }

        report
    }

    /// Earliest due time among scheduled timers.
    pub fn next_due(&self) -> Option<Tick> {
        self.queue.first().map(|&(due_at, _)| due_at)
    }

    /// Lifecycle state of a timer still held by the dispatcher.
    ///
    /// Retired one-shots and purged timers are no longer tracked and yield
    /// `None`.
    pub fn state(&self, id: TimerId) -> Option<TimerState> {
        self.timers.get(&id).map(|timer| timer.state)
    }

    /// Next due time of a scheduled timer.
    pub fn due_at(&self, id: TimerId) -> Option<Tick> {
        self.timers
            .get(&id)
            .filter(|timer| timer.state == TimerState::Scheduled)
            .map(|timer| timer.due_at)
    }

    pub fn is_periodic(&self, id: TimerId) -> bool {
        self.timers.get(&id).is_some_and(Timer::is_periodic)
    }

    /// Number of scheduled timers.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Slots in use, counting cancelled timers that await purge.
    pub fn occupied(&self) -> usize {
        self.timers.len()
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }
}

impl<C: Clock> Dispatcher<C> {
    fn arm(
        &mut self,
        delay: Span,
        period: Option<Span>,
        action: Box<dyn Action>,
    ) -> Result<TimerId, DispatchError> {
        if self.timers.len() >= self.config.capacity {
            return Err(DispatchError::CapacityExceeded {
                capacity: self.config.capacity,
            });
        }
        let due_at = self
            .clock
            .now()
            .checked_add(delay)
            .ok_or(DispatchError::DeadlineOverflow)?;
        let id = self.next_id.ok_or(DispatchError::IdsExhausted)?;
        self.next_id = id.next();

        self.timers.insert(id, Timer::new(due_at, period, action));
        self.queue.insert((due_at, id));

        match period {
            Some(period) => debug!(
                "{}: {id} armed at {due_at}, every {period}",
                self.config.name
            ),
            None => debug!("{}: {id} armed at {due_at}", self.config.name),
        }
        emit(
            &self.trace,
            TraceRecord::Armed {
                id,
                due_at,
                period,
            },
        );
        Ok(id)
    }

    fn purge_cancelled(&mut self) -> usize {
        let mut purged = 0;
        for id in self.cancelled.drain(..) {
            if self.timers.remove(&id).is_some() {
                purged += 1;
                emit(&self.trace, TraceRecord::Purged { id });
            }
        }
        purged
    }
}

fn emit(trace: &Option<TraceHook>, record: TraceRecord) {
    if let Some(hook) = trace {
        hook(&record);
    }
}
