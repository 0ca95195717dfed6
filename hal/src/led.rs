//! Addressable RGB status LED.
//!
//! Boards with a single WS2812-style LED expose it through [`RgbLed`]. The
//! LED remembers the last colour set with [`RgbLed::set_rgb`], so
//! [`RgbLed::on`] after [`RgbLed::off`] restores it.

use core::fmt;

use log::{info, warn};

use crate::error::{HalError, HalResult};
use crate::gpio::check_pin;

/// Data pin used when none is given (ESP32-S3 devkits).
pub const DEFAULT_LED_GPIO: u32 = 38;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const OFF: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    /// Colour shown by `on()` before any colour was set.
    pub const DIM_WHITE: Rgb = Rgb::new(64, 64, 64);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Builds a colour from unchecked channel values, clamping each to 0..=255.
    pub fn clamped(r: i32, g: i32, b: i32) -> Self {
        let channel = |value: i32| value.clamp(0, u8::MAX as i32) as u8;
        Self::new(channel(r), channel(g), channel(b))
    }

    pub fn is_off(&self) -> bool {
        *self == Self::OFF
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::DIM_WHITE
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

pub trait RgbLed: Send {
    /// Binds the LED to its data pin.
    fn init(&mut self, gpio: u32) -> HalResult<()>;

    /// Pushes a colour to the LED without touching the saved colour.
    fn show(&mut self, color: Rgb) -> HalResult<()>;

    fn saved(&self) -> Rgb;

    fn save(&mut self, color: Rgb);

    /// Saves `color` and shows it. The colour is kept even if the write fails.
    fn set_rgb(&mut self, color: Rgb) -> HalResult<()> {
        self.save(color);
        self.show(color)
    }

    fn on(&mut self) -> HalResult<()> {
        let color = self.saved();
        self.show(color)
    }

    fn off(&mut self) -> HalResult<()> {
        self.show(Rgb::OFF)
    }
}

/// Host stand-in for a WS2812 LED that logs every frame.
#[derive(Debug, Clone, Default)]
pub struct SimLed {
    gpio: Option<u32>,
    saved: Rgb,
    current: Option<Rgb>,
    frames: u64,
}

impl SimLed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gpio(&self) -> Option<u32> {
        self.gpio
    }

    /// Colour last pushed to the LED, if any.
    pub fn current(&self) -> Option<Rgb> {
        self.current
    }

    /// Number of colours pushed since creation.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl RgbLed for SimLed {
    fn init(&mut self, gpio: u32) -> HalResult<()> {
        check_pin(gpio)?;
        self.gpio = Some(gpio);
        info!("[LED] init(gpio={gpio})");
        Ok(())
    }

    fn show(&mut self, color: Rgb) -> HalResult<()> {
        let Some(gpio) = self.gpio else {
            warn!("[LED] not initialized - call led.init(gpio) first");
            return Err(HalError::LedNotInitialized);
        };
        self.current = Some(color);
        self.frames += 1;
        info!("[LED] {color} on GPIO {gpio}");
        Ok(())
    }

    fn saved(&self) -> Rgb {
        self.saved
    }

    fn save(&mut self, color: Rgb) {
        self.saved = color;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_are_clamped() {
        assert_eq!(Rgb::clamped(-5, 128, 300), Rgb::new(0, 128, 255));
        assert_eq!(Rgb::clamped(0, 0, 0), Rgb::OFF);
    }

    #[test]
    fn on_restores_saved_color_after_off() {
        let mut led = SimLed::new();
        led.init(DEFAULT_LED_GPIO).unwrap();

        led.on().unwrap();
        assert_eq!(led.current(), Some(Rgb::DIM_WHITE));

        led.set_rgb(Rgb::new(255, 0, 0)).unwrap();
        led.off().unwrap();
        assert!(led.current().is_some_and(|c| c.is_off()));

        led.on().unwrap();
        assert_eq!(led.current(), Some(Rgb::new(255, 0, 0)));
        assert_eq!(led.frames(), 4);
    }

    #[test]
    fn writes_before_init_fail_but_color_is_kept() {
        let mut led = SimLed::new();

        assert_eq!(
            led.set_rgb(Rgb::new(0, 0, 255)),
            Err(HalError::LedNotInitialized)
        );
        assert_eq!(led.current(), None);

        led.init(5).unwrap();
        led.on().unwrap();
        assert_eq!(led.current(), Some(Rgb::new(0, 0, 255)));
        assert_eq!(led.gpio(), Some(5));
    }

    #[test]
    fn init_rejects_out_of_range_gpio() {
        let mut led = SimLed::new();

        assert_eq!(led.init(64), Err(HalError::InvalidPin(64)));
        assert_eq!(led.gpio(), None);
    }
}
