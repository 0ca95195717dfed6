//! tempo integration layer
//!
//! Builds timer actions that drive GPIO pins and the status LED. Actions
//! capture a shared device (and a pin number) at scheduling time; the
//! dispatcher never learns about pins, and HAL failures surface as action
//! failures in the dispatch report.

use core::fmt;
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;
use tempo::{ActionError, Clock, DispatchError, Dispatcher, Span, TimerId, TimerState};

use crate::error::HalError;
use crate::gpio::{GpioBank, Level};
use crate::led::RgbLed;

/// GPIO bank shared between the application and scheduled actions.
pub type SharedBank<B> = Arc<Mutex<B>>;

/// LED shared between the application and scheduled actions.
pub type SharedLed<L> = Arc<Mutex<L>>;

pub fn shared<T>(device: T) -> Arc<Mutex<T>> {
    Arc::new(Mutex::new(device))
}

impl From<HalError> for ActionError {
    fn from(value: HalError) -> Self {
        ActionError::from_error(value)
    }
}

/// Action writing a fixed level to `pin`.
pub fn set_level_action<B>(
    bank: SharedBank<B>,
    pin: u32,
    level: Level,
) -> impl FnMut() -> Result<(), ActionError> + Send + 'static
where
    B: GpioBank + 'static,
{
    move || {
        bank.lock().set_level(pin, level)?;
        Ok(())
    }
}

/// Action reading `pin` and writing back the opposite level.
pub fn toggle_action<B>(
    bank: SharedBank<B>,
    pin: u32,
) -> impl FnMut() -> Result<(), ActionError> + Send + 'static
where
    B: GpioBank + 'static,
{
    move || {
        let mut bank = bank.lock();
        let next = bank.get_level(pin)?.toggled();
        bank.set_level(pin, next)?;
        Ok(())
    }
}

#[derive(Debug)]
pub enum BlinkError {
    Hal(HalError),
    Dispatch(DispatchError),
}

impl From<HalError> for BlinkError {
    fn from(value: HalError) -> Self {
        Self::Hal(value)
    }
}

impl From<DispatchError> for BlinkError {
    fn from(value: DispatchError) -> Self {
        Self::Dispatch(value)
    }
}

impl fmt::Display for BlinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hal(err) => write!(f, "gpio error: {err}"),
            Self::Dispatch(err) => write!(f, "dispatch error: {err}"),
        }
    }
}

impl std::error::Error for BlinkError {}

/// Blinks one pin from a single recurring timer.
///
/// The pin goes high when started and is toggled every `half_period`.
/// A blinker owns at most one live timer: starting it again replaces the
/// previous timer instead of stacking a second one on the same pin.
pub struct Blinker<B> {
    bank: SharedBank<B>,
    pin: u32,
    half_period: Span,
    timer: Option<TimerId>,
}

impl<B: GpioBank + 'static> Blinker<B> {
    pub fn new(bank: SharedBank<B>, pin: u32, half_period: Span) -> Self {
        Self {
            bank,
            pin,
            half_period,
            timer: None,
        }
    }

    pub fn pin(&self) -> u32 {
        self.pin
    }

    pub fn timer(&self) -> Option<TimerId> {
        self.timer
    }

    /// Starts blinking, replacing any timer from an earlier start.
    ///
    /// On error the blinker is left as it was: a running blink keeps its
    /// timer.
    pub fn start<C: Clock>(&mut self, dispatcher: &mut Dispatcher<C>) -> Result<TimerId, BlinkError> {
        let id = dispatcher.schedule_periodic(
            self.half_period,
            toggle_action(Arc::clone(&self.bank), self.pin),
        )?;
        if let Err(err) = self.bank.lock().set_level(self.pin, Level::High) {
            dispatcher.cancel(id);
            return Err(err.into());
        }

        if let Some(previous) = self.timer.replace(id) {
            dispatcher.cancel(previous);
        }
        debug!("blink on pin {} every {} via {id}", self.pin, self.half_period);
        Ok(id)
    }

    /// Cancels the blink timer and drives the pin low. Returns whether a
    /// timer was running.
    pub fn stop<C: Clock>(&mut self, dispatcher: &mut Dispatcher<C>) -> Result<bool, HalError> {
        let running = self
            .timer
            .take()
            .map(|id| dispatcher.cancel(id))
            .unwrap_or(false);
        self.bank.lock().set_level(self.pin, Level::Low)?;
        Ok(running)
    }

    pub fn is_running<C: Clock>(&self, dispatcher: &Dispatcher<C>) -> bool {
        self.timer
            .is_some_and(|id| dispatcher.state(id) == Some(TimerState::Scheduled))
    }
}

/// Drives `pin` high after `delay` and low again `width` later.
///
/// Both timers are scheduled or neither is.
pub fn pulse<B, C>(
    dispatcher: &mut Dispatcher<C>,
    bank: &SharedBank<B>,
    pin: u32,
    delay: Span,
    width: Span,
) -> Result<(TimerId, TimerId), DispatchError>
where
    B: GpioBank + 'static,
    C: Clock,
{
    let off_delay = Span::from_ticks(
        delay
            .ticks()
            .checked_add(width.ticks())
            .ok_or(DispatchError::DeadlineOverflow)?,
    );
    let on = dispatcher.schedule_once(delay, set_level_action(Arc::clone(bank), pin, Level::High))?;
    match dispatcher.schedule_once(off_delay, set_level_action(Arc::clone(bank), pin, Level::Low)) {
        Ok(off) => Ok((on, off)),
        Err(err) => {
            dispatcher.cancel(on);
            Err(err)
        }
    }
}

/// Action turning the LED on with its saved colour.
pub fn led_on_action<L>(led: SharedLed<L>) -> impl FnMut() -> Result<(), ActionError> + Send + 'static
where
    L: RgbLed + 'static,
{
    move || {
        led.lock().on()?;
        Ok(())
    }
}

pub fn led_off_action<L>(led: SharedLed<L>) -> impl FnMut() -> Result<(), ActionError> + Send + 'static
where
    L: RgbLed + 'static,
{
    move || {
        led.lock().off()?;
        Ok(())
    }
}

/// Action alternating the LED between on and off, starting with on.
///
/// The phase only advances when the write succeeds.
pub fn led_blink_action<L>(led: SharedLed<L>) -> impl FnMut() -> Result<(), ActionError> + Send + 'static
where
    L: RgbLed + 'static,
{
    let mut lit = false;
    move || {
        let mut led = led.lock();
        if lit {
            led.off()?;
        } else {
            led.on()?;
        }
        lit = !lit;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempo::{ManualClock, Tick};

    use super::*;
    use crate::gpio::PinMode;
    use crate::led::{Rgb, SimLed, DEFAULT_LED_GPIO};
    use crate::sim::SimGpio;

    const LED_PIN: u32 = 8;

    fn output_bank() -> SharedBank<SimGpio> {
        let mut gpio = SimGpio::new();
        gpio.configure(LED_PIN, PinMode::Output).unwrap();
        shared(gpio)
    }

    fn levels(bank: &SharedBank<SimGpio>) -> Vec<Level> {
        bank.lock().writes().iter().map(|&(_, level)| level).collect()
    }

    #[test]
    fn blinker_alternates_levels() {
        let bank = output_bank();
        let mut dispatcher = Dispatcher::new(ManualClock::default());
        let mut blinker = Blinker::new(Arc::clone(&bank), LED_PIN, Span::from_millis(500));

        blinker.start(&mut dispatcher).unwrap();
        for t in [500, 1000, 1500, 2000] {
            assert!(dispatcher.run_once(Tick::new(t)).is_clean());
        }

        use Level::{High, Low};
        assert_eq!(levels(&bank), vec![High, Low, High, Low, High]);
        assert!(blinker.is_running(&dispatcher));
    }

    #[test]
    fn restarting_replaces_the_timer() {
        let bank = output_bank();
        let mut dispatcher = Dispatcher::new(ManualClock::default());
        let mut blinker = Blinker::new(Arc::clone(&bank), LED_PIN, Span::from_millis(100));

        let first = blinker.start(&mut dispatcher).unwrap();
        let second = blinker.start(&mut dispatcher).unwrap();

        assert_ne!(first, second);
        assert_eq!(dispatcher.state(first), Some(TimerState::Cancelled));
        assert_eq!(dispatcher.len(), 1);
        let report = dispatcher.run_once(Tick::new(100));
        assert_eq!(report.fired, vec![second]);
    }

    #[test]
    fn failed_restart_keeps_the_running_blink() {
        let bank = output_bank();
        let config = tempo::DispatcherConfig::builder().capacity(1).build();
        let mut dispatcher = Dispatcher::with_config(config, ManualClock::default());
        let mut blinker = Blinker::new(Arc::clone(&bank), LED_PIN, Span::from_millis(100));

        let first = blinker.start(&mut dispatcher).unwrap();
        let err = blinker.start(&mut dispatcher).unwrap_err();

        assert!(matches!(
            err,
            BlinkError::Dispatch(DispatchError::CapacityExceeded { capacity: 1 })
        ));
        assert_eq!(blinker.timer(), Some(first));
        assert_eq!(dispatcher.state(first), Some(TimerState::Scheduled));
        assert_eq!(dispatcher.run_once(Tick::new(100)).fired, vec![first]);
        assert!(blinker.is_running(&dispatcher));
    }

    #[test]
    fn stop_cancels_and_drives_low() {
        let bank = output_bank();
        let mut dispatcher = Dispatcher::new(ManualClock::default());
        let mut blinker = Blinker::new(Arc::clone(&bank), LED_PIN, Span::from_millis(100));

        blinker.start(&mut dispatcher).unwrap();
        assert_eq!(blinker.stop(&mut dispatcher), Ok(true));
        assert_eq!(blinker.stop(&mut dispatcher), Ok(false));

        assert!(dispatcher.run_once(Tick::new(1000)).fired.is_empty());
        assert_eq!(bank.lock().get_level(LED_PIN), Ok(Level::Low));
        assert!(!blinker.is_running(&dispatcher));
    }

    #[test]
    fn blinking_an_unconfigured_pin_fails_without_a_timer() {
        let bank = shared(SimGpio::new());
        let mut dispatcher = Dispatcher::new(ManualClock::default());
        let mut blinker = Blinker::new(bank, 3, Span::from_millis(100));

        let err = blinker.start(&mut dispatcher).unwrap_err();

        assert!(matches!(err, BlinkError::Hal(HalError::NotInitialized(3))));
        assert!(dispatcher.is_empty());
        assert_eq!(blinker.timer(), None);
    }

    #[test]
    fn hal_errors_are_reported_as_action_failures() {
        let bank = shared(SimGpio::new());
        let mut dispatcher = Dispatcher::new(ManualClock::default());
        let id = dispatcher
            .schedule_periodic(Span::from_millis(10), toggle_action(bank, 5))
            .unwrap();

        let report = dispatcher.run_once(Tick::new(10));

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].id, id);
        assert_eq!(
            report.failures[0].error.message(),
            "GPIO 5 not initialized, configure it first"
        );
        assert_eq!(dispatcher.state(id), Some(TimerState::Scheduled));
    }

    #[test]
    fn pulse_turns_on_then_off() {
        let bank = output_bank();
        let mut dispatcher = Dispatcher::new(ManualClock::default());

        pulse(
            &mut dispatcher,
            &bank,
            LED_PIN,
            Span::from_millis(500),
            Span::from_millis(500),
        )
        .unwrap();

        dispatcher.run_once(Tick::new(500));
        assert_eq!(levels(&bank), vec![Level::High]);
        dispatcher.run_once(Tick::new(1000));
        assert_eq!(levels(&bank), vec![Level::High, Level::Low]);
        dispatcher.run_once(Tick::new(2000));
        assert_eq!(levels(&bank).len(), 2);
    }

    #[test]
    fn pulse_is_all_or_nothing() {
        let bank = output_bank();
        let config = tempo::DispatcherConfig::builder().capacity(1).build();
        let mut dispatcher = Dispatcher::with_config(config, ManualClock::default());

        let err = pulse(
            &mut dispatcher,
            &bank,
            LED_PIN,
            Span::from_millis(1),
            Span::from_millis(1),
        )
        .unwrap_err();

        assert_eq!(err, DispatchError::CapacityExceeded { capacity: 1 });
        assert!(dispatcher.is_empty());
    }

    fn lit_led() -> SharedLed<SimLed> {
        let mut led = SimLed::new();
        led.init(DEFAULT_LED_GPIO).unwrap();
        shared(led)
    }

    #[test]
    fn led_actions_follow_schedule() {
        let led = lit_led();
        led.lock().save(Rgb::new(0, 255, 0));
        let mut dispatcher = Dispatcher::new(ManualClock::default());

        dispatcher
            .schedule_once(Span::from_millis(500), led_on_action(Arc::clone(&led)))
            .unwrap();
        dispatcher
            .schedule_once(Span::from_millis(1000), led_off_action(Arc::clone(&led)))
            .unwrap();

        dispatcher.run_once(Tick::new(500));
        assert_eq!(led.lock().current(), Some(Rgb::new(0, 255, 0)));
        dispatcher.run_once(Tick::new(1000));
        assert_eq!(led.lock().current(), Some(Rgb::OFF));
        assert_eq!(led.lock().frames(), 2);
    }

    #[test]
    fn led_blink_alternates_from_on() {
        let led = lit_led();
        let mut dispatcher = Dispatcher::new(ManualClock::default());
        dispatcher
            .schedule_periodic(Span::from_millis(250), led_blink_action(Arc::clone(&led)))
            .unwrap();

        let mut seen = Vec::new();
        for t in [250, 500, 750] {
            assert!(dispatcher.run_once(Tick::new(t)).is_clean());
            seen.push(led.lock().current());
        }

        assert_eq!(
            seen,
            vec![Some(Rgb::DIM_WHITE), Some(Rgb::OFF), Some(Rgb::DIM_WHITE)]
        );
    }

    #[test]
    fn uninitialized_led_reports_action_failure() {
        let led = shared(SimLed::new());
        let mut dispatcher = Dispatcher::new(ManualClock::default());
        let id = dispatcher
            .schedule_periodic(Span::from_millis(10), led_blink_action(led))
            .unwrap();

        let report = dispatcher.run_once(Tick::new(10));

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].id, id);
        assert_eq!(
            report.failures[0].error.message(),
            "LED not initialized, call init(gpio) first"
        );
    }
}
