//! GPIO (General Purpose Input/Output) abstraction

use core::fmt;
use core::str::FromStr;

use crate::error::{HalError, HalResult};

/// Number of addressable pins in a bank.
pub const MAX_PINS: u32 = 64;

/// GPIO pin modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    /// Input (floating)
    Input,
    /// Input with pull-up resistor
    InputPullUp,
    /// Input with pull-down resistor
    InputPullDown,
    /// Output (push-pull)
    Output,
}

impl PinMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "in",
            Self::InputPullUp => "in_pullup",
            Self::InputPullDown => "in_pulldown",
            Self::Output => "out",
        }
    }

    /// Pull resistor implied by the mode.
    pub fn pull(&self) -> Pull {
        match self {
            Self::InputPullUp => Pull::Up,
            Self::InputPullDown => Pull::Down,
            Self::Input | Self::Output => Pull::Floating,
        }
    }
}

impl FromStr for PinMode {
    type Err = HalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(Self::Input),
            "in_pullup" => Ok(Self::InputPullUp),
            "in_pulldown" => Ok(Self::InputPullDown),
            "out" => Ok(Self::Output),
            other => Err(HalError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for PinMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pull resistor configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pull {
    Up,
    Down,
    #[default]
    Floating,
}

impl FromStr for Pull {
    type Err = HalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "none" => Ok(Self::Floating),
            other => Err(HalError::InvalidPull(other.to_string())),
        }
    }
}

impl fmt::Display for Pull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Floating => "none",
        })
    }
}

/// GPIO pin levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Level {
    /// Low level (0V)
    #[default]
    Low,
    /// High level (VCC)
    High,
}

impl Level {
    /// The opposite level.
    pub const fn toggled(self) -> Self {
        match self {
            Self::Low => Self::High,
            Self::High => Self::Low,
        }
    }

    /// Interprets a raw value the way scripting bindings do: non-zero is high.
    pub const fn from_raw(raw: i32) -> Self {
        if raw != 0 {
            Self::High
        } else {
            Self::Low
        }
    }

    pub const fn as_raw(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::High => 1,
        }
    }

    pub const fn is_high(self) -> bool {
        matches!(self, Self::High)
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Self::High
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_raw())
    }
}

/// Bank of digital pins addressed by number.
///
/// Actions scheduled on a dispatcher capture a shared bank and a pin number,
/// so the dispatcher itself never sees pins or levels.
pub trait GpioBank: Send {
    /// Configure pin mode
    fn configure(&mut self, pin: u32, mode: PinMode) -> HalResult<()>;

    /// Change the pull resistor of a configured pin
    fn set_pull(&mut self, pin: u32, pull: Pull) -> HalResult<()>;

    /// Write level (for output pins)
    fn set_level(&mut self, pin: u32, level: Level) -> HalResult<()>;

    /// Read current level
    fn get_level(&mut self, pin: u32) -> HalResult<Level>;

    /// Toggle output, returning the new level
    fn toggle(&mut self, pin: u32) -> HalResult<Level> {
        let next = self.get_level(pin)?.toggled();
        self.set_level(pin, next)?;
        Ok(next)
    }
}

/// Rejects pin numbers outside the bank.
pub fn check_pin(pin: u32) -> HalResult<usize> {
    if pin < MAX_PINS {
        Ok(pin as usize)
    } else {
        Err(HalError::InvalidPin(pin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_strings_parse() {
        assert_eq!("out".parse::<PinMode>(), Ok(PinMode::Output));
        assert_eq!("in_pullup".parse::<PinMode>(), Ok(PinMode::InputPullUp));
        assert_eq!(PinMode::InputPullDown.pull(), Pull::Down);
        assert_eq!(
            "output".parse::<PinMode>(),
            Err(HalError::InvalidMode("output".into()))
        );
    }

    #[test]
    fn pull_strings_parse() {
        assert_eq!("none".parse::<Pull>(), Ok(Pull::Floating));
        assert_eq!("up".parse::<Pull>(), Ok(Pull::Up));
        assert!("sideways".parse::<Pull>().is_err());
    }

    #[test]
    fn level_helpers() {
        assert_eq!(Level::Low.toggled(), Level::High);
        assert_eq!(Level::High.toggled(), Level::Low);
        assert_eq!(Level::from_raw(7), Level::High);
        assert_eq!(Level::from_raw(0), Level::Low);
        assert_eq!(Level::from(true).as_raw(), 1);
    }

    #[test]
    fn pin_range() {
        assert_eq!(check_pin(63), Ok(63));
        assert_eq!(check_pin(64), Err(HalError::InvalidPin(64)));
    }
}
