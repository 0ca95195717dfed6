//! Common error types for HAL operations

use core::fmt;

/// HAL operation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HalError {
    /// Pin number outside the bank
    InvalidPin(u32),
    /// Pin used before being configured
    NotInitialized(u32),
    /// Unrecognized pin mode string
    InvalidMode(String),
    /// Unrecognized pull setting string
    InvalidPull(String),
    /// Hardware error occurred
    HardwareError,
    /// LED written before `init`
    LedNotInitialized,
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPin(pin) => write!(f, "invalid GPIO pin: {}", pin),
            Self::NotInitialized(pin) => {
                write!(f, "GPIO {} not initialized, configure it first", pin)
            }
            Self::InvalidMode(mode) => write!(
                f,
                "invalid mode: {} (use: out, in, in_pullup, in_pulldown)",
                mode
            ),
            Self::InvalidPull(pull) => {
                write!(f, "invalid pull mode: {} (use: up, down, none)", pull)
            }
            Self::HardwareError => write!(f, "hardware error"),
            Self::LedNotInitialized => {
                write!(f, "LED not initialized, call init(gpio) first")
            }
        }
    }
}

impl std::error::Error for HalError {}

/// Result type for HAL operations
pub type HalResult<T> = Result<T, HalError>;
