//! Adapter from `embedded-hal` output pins to [`GpioBank`].
//!
//! Board support crates hand out typed pins implementing
//! [`StatefulOutputPin`]; wrapping one in [`OutputPinBank`] lets the same
//! timer actions drive real hardware.

use embedded_hal::digital::{Error as _, PinState, StatefulOutputPin};
use log::warn;

use crate::error::{HalError, HalResult};
use crate::gpio::{GpioBank, Level, PinMode, Pull};

/// Single output pin exposed under a fixed pin number.
pub struct OutputPinBank<P> {
    number: u32,
    pin: P,
}

impl<P: StatefulOutputPin> OutputPinBank<P> {
    pub fn new(number: u32, pin: P) -> Self {
        Self { number, pin }
    }

    pub fn into_inner(self) -> P {
        self.pin
    }

    fn check(&self, pin: u32) -> HalResult<()> {
        if pin == self.number {
            Ok(())
        } else {
            Err(HalError::InvalidPin(pin))
        }
    }
}

fn hardware_error<E: embedded_hal::digital::Error>(err: E) -> HalError {
    warn!("output pin error: {:?} ({:?})", err, err.kind());
    HalError::HardwareError
}

impl<P: StatefulOutputPin + Send> GpioBank for OutputPinBank<P> {
    /// The pin is already an output; any other mode is rejected.
    fn configure(&mut self, pin: u32, mode: PinMode) -> HalResult<()> {
        self.check(pin)?;
        match mode {
            PinMode::Output => Ok(()),
            other => Err(HalError::InvalidMode(other.to_string())),
        }
    }

    fn set_pull(&mut self, pin: u32, pull: Pull) -> HalResult<()> {
        self.check(pin)?;
        match pull {
            Pull::Floating => Ok(()),
            other => Err(HalError::InvalidPull(other.to_string())),
        }
    }

    fn set_level(&mut self, pin: u32, level: Level) -> HalResult<()> {
        self.check(pin)?;
        self.pin
            .set_state(PinState::from(level.is_high()))
            .map_err(hardware_error)
    }

    fn get_level(&mut self, pin: u32) -> HalResult<Level> {
        self.check(pin)?;
        self.pin
            .is_set_high()
            .map(Level::from)
            .map_err(hardware_error)
    }

    fn toggle(&mut self, pin: u32) -> HalResult<Level> {
        self.check(pin)?;
        self.pin.toggle().map_err(hardware_error)?;
        self.get_level(pin)
    }
}
