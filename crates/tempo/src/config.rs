//! Dispatcher configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::time::Span;

/// Default bound on the number of live timers.
pub const DEFAULT_CAPACITY: usize = 32;

/// Configuration for a [`Dispatcher`](crate::Dispatcher).
///
/// Sizes the pending set and controls diagnostics.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Name used in log messages.
    pub name: String,
    /// Maximum number of scheduled timers.
    pub capacity: usize,
    /// Log a warning when a timer fires more than this many ticks late.
    pub late_warning: Option<Span>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            name: "tempo".to_string(),
            capacity: DEFAULT_CAPACITY,
            late_warning: None,
        }
    }
}

impl DispatcherConfig {
    pub fn builder() -> DispatcherConfigBuilder {
        DispatcherConfigBuilder::default()
    }
}

/// Builder for [`DispatcherConfig`].
#[derive(Debug, Clone, Default)]
pub struct DispatcherConfigBuilder {
    config: DispatcherConfig,
}

impl DispatcherConfigBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Sets the maximum number of scheduled timers.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Sets the lateness threshold for warnings.
    pub fn late_warning(mut self, threshold: Span) -> Self {
        self.config.late_warning = Some(threshold);
        self
    }

    pub fn build(self) -> DispatcherConfig {
        self.config
    }
}
