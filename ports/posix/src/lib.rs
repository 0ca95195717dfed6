//! POSIX host port for the tempo dispatcher.
//!
//! Supplies the two pieces a host process needs around the portable core: a
//! [`MonotonicClock`] measuring milliseconds since start-up and a [`Driver`]
//! that keeps calling the dispatcher until asked to stop.

pub mod clock;
pub mod driver;

pub use clock::{duration_to_span, span_to_duration, MonotonicClock};
pub use driver::{install_ctrlc, Driver, DriverConfig, DriverStats, FailureHook};

use tempo::{Dispatcher, DispatcherConfig, SharedDispatcher};

/// Creates a shared dispatcher running on a fresh monotonic clock.
pub fn host_dispatcher(config: DispatcherConfig) -> SharedDispatcher<MonotonicClock> {
    SharedDispatcher::new(Dispatcher::with_config(config, MonotonicClock::new()))
}
