//! # tempo
//!
//! Deterministic timer dispatch for resource-constrained, single-threaded
//! control loops. Callers schedule actions to run once after a delay or
//! repeatedly at a fixed period; an external driver loop calls
//! [`Dispatcher::run_once`] with the current time and the dispatcher fires
//! whatever is due, in a reproducible order.
//!
//! ## Module Overview
//! - [`time`]       – Tick timestamps, spans and clock sources.
//! - [`timer`]      – Timer ids, lifecycle states and the [`Action`] trait.
//! - [`dispatcher`] – The dispatch core.
//! - [`sync`]       – Mutex-guarded handle for multi-threaded hosts.
//! - [`config`]     – Dispatcher sizing and diagnostics.
//! - [`trace`]      – Structured trace records and hooks.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod sync;
pub mod time;
pub mod timer;
pub mod trace;

pub use config::{DispatcherConfig, DispatcherConfigBuilder};
pub use dispatcher::{DispatchReport, Dispatcher};
pub use error::{ActionError, ActionFailure, DispatchError};
pub use sync::SharedDispatcher;
pub use time::{Clock, ManualClock, Span, Tick};
pub use timer::{Action, TimerId, TimerState};
pub use trace::{TraceHook, TraceRecord};

#[cfg(test)]
mod tests;
