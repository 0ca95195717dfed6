//! Error types for scheduling and action execution.

use std::borrow::Cow;
use std::error::Error as StdError;

use thiserror::Error;

use crate::time::Tick;
use crate::timer::TimerId;

/// Errors returned by the scheduling calls. All of them are raised before the
/// pending set is touched, so a failed call leaves no partial state.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    #[error("period must be greater than zero")]
    InvalidDuration,
    #[error("pending set is full ({capacity} timers)")]
    CapacityExceeded { capacity: usize },
    #[error("deadline does not fit in a tick counter")]
    DeadlineOverflow,
    #[error("timer id space exhausted")]
    IdsExhausted,
}

/// Error raised by an [`Action`](crate::Action) while firing.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ActionError {
    message: Cow<'static, str>,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl ActionError {
    pub fn msg(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an underlying error, keeping it reachable through `source()`.
    pub fn from_error<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: Cow::Owned(error.to_string()),
            source: Some(Box::new(error)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// An action that failed during a dispatch pass.
#[derive(Debug)]
pub struct ActionFailure {
    pub id: TimerId,
    /// Nominal due time of the firing that failed.
    pub due_at: Tick,
    pub error: ActionError,
}
