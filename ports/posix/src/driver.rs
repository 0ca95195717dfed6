//! Driver loop for POSIX hosts.
//!
//! Repeatedly reads the clock, runs a dispatch pass and sleeps until the
//! next known due time. Sleeps are capped by [`DriverConfig::max_idle`] so
//! timers scheduled from other threads and stop requests are noticed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use tempo::{ActionFailure, Clock, SharedDispatcher};

use crate::clock::span_to_duration;

/// Default upper bound on a single sleep.
const DEFAULT_MAX_IDLE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Longest time the loop sleeps without re-checking the dispatcher.
    pub max_idle: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            max_idle: DEFAULT_MAX_IDLE,
        }
    }
}

/// Counters accumulated over a driver's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    pub passes: u64,
    pub fired: u64,
    pub failures: u64,
}

/// Callback invoked for every failed action.
pub type FailureHook = Box<dyn FnMut(&ActionFailure) + Send>;

/// Drives a shared dispatcher whose clock counts milliseconds.
pub struct Driver<C: Clock> {
    dispatcher: SharedDispatcher<C>,
    config: DriverConfig,
    on_failure: Option<FailureHook>,
    stats: DriverStats,
}

impl<C: Clock> Driver<C> {
    pub fn new(dispatcher: SharedDispatcher<C>) -> Self {
        Self::with_config(dispatcher, DriverConfig::default())
    }

    pub fn with_config(dispatcher: SharedDispatcher<C>, config: DriverConfig) -> Self {
        Self {
            dispatcher,
            config,
            on_failure: None,
            stats: DriverStats::default(),
        }
    }

    pub fn on_failure(mut self, hook: FailureHook) -> Self {
        self.on_failure = Some(hook);
        self
    }

    pub fn dispatcher(&self) -> &SharedDispatcher<C> {
        &self.dispatcher
    }

    pub fn stats(&self) -> DriverStats {
        self.stats
    }

    /// Runs one dispatch pass at the clock's current time and returns how
    /// long the loop may sleep afterwards.
    pub fn step(&mut self) -> Duration {
        let now = self.dispatcher.now();
        let report = self.dispatcher.run_once(now);

        self.stats.passes += 1;
        self.stats.fired += report.fired.len() as u64;
        self.stats.failures += report.failures.len() as u64;

        for failure in &report.failures {
            warn!(
                "{} (due at {}) failed: {}",
                failure.id, failure.due_at, failure.error
            );
            if let Some(hook) = self.on_failure.as_mut() {
                hook(failure);
            }
        }

        match self.dispatcher.next_due() {
            Some(due) => span_to_duration(due.saturating_since(now)).min(self.config.max_idle),
            None => self.config.max_idle,
        }
    }

    /// Runs until `stop` is set.
    pub fn run(&mut self, stop: &AtomicBool) -> DriverStats {
        info!("driver started");
        while !stop.load(Ordering::Relaxed) {
            let idle = self.step();
            if !idle.is_zero() {
                thread::sleep(idle);
            }
        }
        info!("driver stopped after {} passes", self.stats.passes);
        self.stats
    }

    /// Runs for `duration` of wall time, or until `stop` is set.
    pub fn run_for(&mut self, duration: Duration, stop: &AtomicBool) -> DriverStats {
        let deadline = Instant::now() + duration;
        loop {
            if stop.load(Ordering::Relaxed) {
                break;
            }
            let idle = self.step();
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            let nap = idle.min(remaining);
            if !nap.is_zero() {
                thread::sleep(nap);
            }
        }
        debug!("driver ran for {duration:?}: {:?}", self.stats);
        self.stats
    }
}

/// Sets `stop` when the process receives Ctrl-C.
pub fn install_ctrlc(stop: Arc<AtomicBool>) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        stop.store(true, Ordering::SeqCst);
    })
}
