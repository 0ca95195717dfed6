//! Hardware Abstraction Layer (HAL) for timer-driven digital I/O
//!
//! This crate provides the pin-level collaborator the tempo dispatcher
//! drives: a vendor-agnostic [`GpioBank`](gpio::GpioBank) trait, a simulated
//! bank for hosts, an RGB status LED, and an adapter for `embedded-hal` output pins. With the
//! `dispatch` feature it also builds timer actions such as blinking and
//! pulsing a pin.

pub mod embedded;
pub mod error;
pub mod gpio;
pub mod led;
pub mod sim;

#[cfg(feature = "dispatch")]
pub mod integration;

// Re-export commonly used types
pub use error::{HalError, HalResult};
pub use gpio::{GpioBank, Level, PinMode, Pull, MAX_PINS};
pub use led::{Rgb, RgbLed, SimLed, DEFAULT_LED_GPIO};
pub use sim::{SimGpio, DEFAULT_WRITE_HISTORY};
