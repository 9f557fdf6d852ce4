//! motionfan: main entry point
//!
//! Hexagonal architecture with a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter    LogEventSink   CsvFailureLog  SystemClock  │
//! │  (Device+Actuator)  (EventSink)    (FailureLog)   (Clock)      │
//! │  JsonConfigFile                                                │
//! │  (ConfigPort)                                                  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            MonitorService (pure logic)                 │    │
//! │  │  SensorPool · Debounce · Hold                          │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::env;
use std::thread;

use anyhow::{Context, Result, bail};
use log::info;

use motionfan::adapters::config_file::JsonConfigFile;
use motionfan::adapters::failure_log::CsvFailureLog;
use motionfan::adapters::hardware::HardwareAdapter;
use motionfan::adapters::log_sink::LogEventSink;
use motionfan::adapters::sim::{SimBoard, SimOpener, SimPin};
use motionfan::adapters::time::SystemClock;
use motionfan::app::ports::{ActuatorPort, ConfigPort, DevicePort};
use motionfan::app::service::MonitorService;
use motionfan::config::SystemConfig;
use motionfan::drivers::lis3dhtr::DeviceSettings;

const CONFIG_ENV: &str = "MOTIONFAN_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "motionfan.json";

const USAGE: &str = "usage: motionfan [--simulate] [CONFIG.json]";

/// Simulated sensors get shaken this often (cycles) ...
const SIM_SHAKE_EVERY: u64 = 90;
/// ... for this many reads.
const SIM_SHAKE_READS: u32 = 8;

struct Args {
    simulate: bool,
    config_path: String,
    /// Path came from the command line or the environment.
    config_named: bool,
}

fn parse_args() -> Result<Args> {
    let mut simulate = false;
    let mut path: Option<String> = None;
    for arg in env::args().skip(1) {
        if arg == "--simulate" {
            simulate = true;
        } else if arg == "-h" || arg == "--help" {
            println!("{USAGE}");
            std::process::exit(0);
        } else if arg.starts_with('-') {
            bail!("unknown option {arg}\n{USAGE}");
        } else if path.replace(arg).is_some() {
            bail!("only one config file may be given\n{USAGE}");
        }
    }
    let named = path.or_else(|| env::var(CONFIG_ENV).ok());
    let config_named = named.is_some();
    let config_path = named.unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_owned());
    Ok(Args {
        simulate,
        config_path,
        config_named,
    })
}

/// A named file must exist; only the default path may be missing.
fn load_config(args: &Args) -> Result<SystemConfig> {
    let file = if args.config_named {
        JsonConfigFile::new(&args.config_path)
    } else {
        JsonConfigFile::optional(&args.config_path)
    };
    file.load()
        .with_context(|| format!("loading {}", args.config_path))
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("motionfan v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration (fatal on error) ─────────────────────
    let args = parse_args()?;
    let config = load_config(&args)?;
    let service = MonitorService::new(config.clone()).context("invalid configuration")?;
    info!(
        "Config: buses={:?} threshold={}g hold={}s",
        config.buses.iter().map(|b| b.0).collect::<Vec<_>>(),
        config.motion_threshold_g,
        config.fan_hold_secs
    );

    // ── 3. Failure log (console-only if it cannot be opened) ──
    let journal = CsvFailureLog::append_or_discard(&config.failure_log_path);

    // ── 4. Hardware and the control loop ──────────────────────
    if args.simulate {
        run_simulated(service, &config, journal)
    } else {
        run_linux(service, &config, journal)
    }
}

#[cfg(feature = "linux-hal")]
fn run_linux(
    service: MonitorService,
    config: &SystemConfig,
    journal: CsvFailureLog<Box<dyn std::io::Write>>,
) -> Result<()> {
    use motionfan::adapters::linux::{LinuxBusOpener, open_fan_pin};

    let pin = open_fan_pin(config.fan_gpio, config.fan_active_low)
        .with_context(|| format!("fan GPIO {}", config.fan_gpio))?;
    let hw = HardwareAdapter::new(
        LinuxBusOpener,
        pin,
        config.fan_active_low,
        DeviceSettings::default(),
    );
    run_forever(service, hw, journal, |_| {})
}

#[cfg(not(feature = "linux-hal"))]
fn run_linux(
    _service: MonitorService,
    _config: &SystemConfig,
    _journal: CsvFailureLog<Box<dyn std::io::Write>>,
) -> Result<()> {
    bail!("built without the linux-hal feature; only --simulate is available");
}

/// One resting sensor at the top of the address range on every bus,
/// shaken in turn so the fan has something to do.
fn run_simulated(
    service: MonitorService,
    config: &SystemConfig,
    journal: CsvFailureLog<Box<dyn std::io::Write>>,
) -> Result<()> {
    let board = SimBoard::new();
    for &bus in &config.buses {
        board.add_device(bus, config.address_high);
    }
    let devices = board.devices();
    info!("Sim: {} simulated sensor(s)", devices.len());

    let hw = HardwareAdapter::new(
        SimOpener::new(board.clone()),
        SimPin::new(),
        config.fan_active_low,
        DeviceSettings::default(),
    );
    run_forever(service, hw, journal, move |cycle| {
        if cycle % SIM_SHAKE_EVERY != 0 || devices.is_empty() {
            return;
        }
        let (bus, address) = devices[(cycle / SIM_SHAKE_EVERY) as usize % devices.len()];
        info!("Sim: shaking {}@0x{:02X}", bus, address);
        board.shake(bus, address, SIM_SHAKE_READS);
    })
}

// ── Control loop ──────────────────────────────────────────────

fn run_forever(
    mut service: MonitorService,
    mut hw: impl DevicePort + ActuatorPort,
    mut journal: CsvFailureLog<Box<dyn std::io::Write>>,
    mut before_tick: impl FnMut(u64),
) -> ! {
    let mut sink = LogEventSink::new();
    let clock = SystemClock::new();

    service.start(&mut hw, &mut sink);
    info!("Entering control loop");

    loop {
        before_tick(service.cycle_count() + 1);
        let interval = service.tick(&mut hw, &mut sink, &mut journal, &clock);
        thread::sleep(interval);
    }
}
