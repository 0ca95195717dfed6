//! Simulated GPIO bank for hosts without pin hardware.
//!
//! Behaves like a driver stub: every operation is validated and logged, and
//! written levels read back unchanged. Only the most recent writes are kept,
//! so a long-running host does not grow without bound.

use std::collections::VecDeque;

use log::info;

use crate::error::{HalError, HalResult};
use crate::gpio::{check_pin, GpioBank, Level, PinMode, Pull, MAX_PINS};

#[derive(Debug, Clone, Copy, Default)]
struct PinSlot {
    mode: Option<PinMode>,
    pull: Pull,
    level: Level,
}

/// Writes remembered by [`SimGpio::new`].
pub const DEFAULT_WRITE_HISTORY: usize = 256;

#[derive(Debug, Clone)]
pub struct SimGpio {
    pins: Vec<PinSlot>,
    history: VecDeque<(u32, Level)>,
    history_limit: usize,
    write_count: u64,
}

impl Default for SimGpio {
    fn default() -> Self {
        Self::new()
    }
}

impl SimGpio {
    pub fn new() -> Self {
        Self::with_history(DEFAULT_WRITE_HISTORY)
    }

    /// Bank remembering at most `limit` writes. A limit of zero disables the
    /// history; [`write_count`](Self::write_count) still counts every write.
    pub fn with_history(limit: usize) -> Self {
        Self {
            pins: vec![PinSlot::default(); MAX_PINS as usize],
            history: VecDeque::with_capacity(limit.min(DEFAULT_WRITE_HISTORY)),
            history_limit: limit,
            write_count: 0,
        }
    }

    /// Most recent successful writes, oldest first.
    pub fn writes(&self) -> Vec<(u32, Level)> {
        self.history.iter().copied().collect()
    }

    /// Drains the write history.
    pub fn take_writes(&mut self) -> Vec<(u32, Level)> {
        self.history.drain(..).collect()
    }

    /// Successful writes since creation, including ones dropped from the history.
    pub fn write_count(&self) -> u64 {
        self.write_count
    }

    pub fn mode(&self, pin: u32) -> Option<PinMode> {
        self.slot(pin).ok().and_then(|slot| slot.mode)
    }

    pub fn pull(&self, pin: u32) -> Option<Pull> {
        self.slot(pin)
            .ok()
            .filter(|slot| slot.mode.is_some())
            .map(|slot| slot.pull)
    }

    fn slot(&self, pin: u32) -> HalResult<&PinSlot> {
        let index = check_pin(pin)?;
        self.pins.get(index).ok_or(HalError::InvalidPin(pin))
    }

    fn configured(&mut self, pin: u32) -> HalResult<&mut PinSlot> {
        let index = check_pin(pin)?;
        match self.pins.get_mut(index) {
            Some(slot) if slot.mode.is_some() => Ok(slot),
            Some(_) => Err(HalError::NotInitialized(pin)),
            None => Err(HalError::InvalidPin(pin)),
        }
    }
}

impl GpioBank for SimGpio {
    fn configure(&mut self, pin: u32, mode: PinMode) -> HalResult<()> {
        let index = check_pin(pin)?;
        let slot = self.pins.get_mut(index).ok_or(HalError::InvalidPin(pin))?;
        slot.mode = Some(mode);
        slot.pull = mode.pull();
        info!("[GPIO] init(pin={pin}, mode={mode})");
        Ok(())
    }

    fn set_pull(&mut self, pin: u32, pull: Pull) -> HalResult<()> {
        self.configured(pin)?.pull = pull;
        info!("[GPIO] setPull(pin={pin}, pull={pull})");
        Ok(())
    }

    fn set_level(&mut self, pin: u32, level: Level) -> HalResult<()> {
        self.configured(pin)?.level = level;
        self.write_count += 1;
        if self.history_limit > 0 {
            if self.history.len() == self.history_limit {
                self.history.pop_front();
            }
            self.history.push_back((pin, level));
        }
        info!("[GPIO] write(pin={pin}, level={level})");
        Ok(())
    }

    fn get_level(&mut self, pin: u32) -> HalResult<Level> {
        let level = self.configured(pin)?.level;
        info!("[GPIO] read(pin={pin}) -> {level}");
        Ok(level)
    }
}
