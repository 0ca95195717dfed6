use std::fs;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tempo::{DispatcherConfig, Span, TraceHook, TraceRecord};
use tempo_hal::integration::{
    led_blink_action, pulse, shared, toggle_action, Blinker, SharedBank, SharedLed,
};
use tempo_hal::{GpioBank, PinMode, RgbLed, SimGpio, SimLed, DEFAULT_LED_GPIO, MAX_PINS};
use tempo_posix::{host_dispatcher, install_ctrlc, Driver, MonotonicClock};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Drive the pin high, then flip it every period.
    Blink,
    /// Flip the pin every period, starting from low.
    Toggle,
    /// Single high pulse one period long, after one period.
    Pulse,
    /// Blink the RGB status LED on its data pin instead of a GPIO.
    Led,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Drive a simulated GPIO pin from tempo timers")]
struct Opts {
    #[arg(long, default_value_t = 8)]
    pin: u32,

    /// Data pin of the RGB status LED, used by `--mode led`.
    #[arg(long = "led-gpio", default_value_t = DEFAULT_LED_GPIO)]
    led_gpio: u32,

    #[arg(long, value_enum, default_value_t = Mode::Blink)]
    mode: Mode,

    #[arg(long = "period-ms", default_value_t = 500, value_name = "MS")]
    period_ms: u64,

    /// Stop after this many milliseconds instead of waiting for Ctrl-C.
    #[arg(long = "run-ms", value_name = "MS")]
    run_ms: Option<u64>,

    /// JSON file with dispatcher settings.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log every timer lifecycle event.
    #[arg(long)]
    trace: bool,
}

impl Opts {
    fn validate(&self) -> Result<()> {
        if self.pin >= MAX_PINS {
            bail!("pin {} out of range, expected 0..{MAX_PINS}", self.pin);
        }
        if self.led_gpio >= MAX_PINS {
            bail!("LED gpio {} out of range, expected 0..{MAX_PINS}", self.led_gpio);
        }
        if self.period_ms == 0 {
            bail!("--period-ms must be greater than zero");
        }
        Ok(())
    }

    fn period(&self) -> Span {
        Span::from_millis(self.period_ms)
    }

    fn dispatcher_config(&self) -> Result<DispatcherConfig> {
        match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
            }
            None => Ok(DispatcherConfig::default()),
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn trace_hook() -> TraceHook {
    Arc::new(|record: &TraceRecord| info!(target: "tempo::trace", "{record:?}"))
}

/// Simulated devices the timers drive.
struct Outputs {
    bank: SharedBank<SimGpio>,
    led: SharedLed<SimLed>,
}

impl Outputs {
    fn new(opts: &Opts) -> Result<Self> {
        let mut gpio = SimGpio::new();
        let mut led = SimLed::new();
        if opts.mode == Mode::Led {
            led.init(opts.led_gpio)?;
        } else {
            gpio.configure(opts.pin, PinMode::Output)?;
        }
        Ok(Self {
            bank: shared(gpio),
            led: shared(led),
        })
    }

    fn writes(&self) -> u64 {
        self.bank.lock().write_count() + self.led.lock().frames()
    }
}

fn arm(
    opts: &Opts,
    driver: &Driver<MonotonicClock>,
    outputs: &Outputs,
) -> Result<Option<Blinker<SimGpio>>> {
    let dispatcher = driver.dispatcher();
    let bank = &outputs.bank;
    match opts.mode {
        Mode::Blink => {
            let mut blinker = Blinker::new(Arc::clone(bank), opts.pin, opts.period());
            dispatcher.with(|d| blinker.start(d))?;
            Ok(Some(blinker))
        }
        Mode::Toggle => {
            dispatcher.schedule_periodic(opts.period(), toggle_action(Arc::clone(bank), opts.pin))?;
            Ok(None)
        }
        Mode::Pulse => {
            dispatcher.with(|d| pulse(d, bank, opts.pin, opts.period(), opts.period()))?;
            Ok(None)
        }
        Mode::Led => {
            dispatcher.schedule_periodic(opts.period(), led_blink_action(Arc::clone(&outputs.led)))?;
            Ok(None)
        }
    }
}

fn main() -> Result<()> {
    let opts = Opts::parse();
    init_tracing();
    opts.validate()?;

    let config = opts.dispatcher_config()?;
    let shared_dispatcher = host_dispatcher(config);
    if opts.trace {
        let hook = trace_hook();
        shared_dispatcher.with(|d| d.set_trace_hook(Some(hook)));
    }

    let outputs = Outputs::new(&opts)?;
    let mut driver = Driver::new(shared_dispatcher).on_failure(Box::new(|failure| {
        warn!(timer = %failure.id, "action failed: {}", failure.error);
    }));
    let mut blinker = arm(&opts, &driver, &outputs)?;

    let stop = Arc::new(AtomicBool::new(false));
    install_ctrlc(Arc::clone(&stop)).context("installing Ctrl-C handler")?;

    info!(pin = opts.pin, mode = ?opts.mode, period_ms = opts.period_ms, "running");
    let stats = match opts.run_ms {
        Some(ms) => driver.run_for(Duration::from_millis(ms), &stop),
        None => driver.run(&stop),
    };

    if let Some(blinker) = blinker.as_mut() {
        driver.dispatcher().with(|d| blinker.stop(d))?;
    }

    if opts.mode == Mode::Led {
        outputs.led.lock().off()?;
    }

    let writes = outputs.writes();
    println!(
        "passes={} fired={} failures={} writes={writes}",
        stats.passes, stats.fired, stats.failures
    );
    Ok(())
}
