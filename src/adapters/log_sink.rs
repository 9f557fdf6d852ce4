//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (stderr via `env_logger` in the binary).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | cycle={} | buses={} ({} reinit) | sensors={} moving={} | \
                     fan={} hold={:.1}s",
                    t.cycle,
                    t.buses,
                    t.buses_reinitializing,
                    t.sensors,
                    t.moving,
                    if t.fan_on { "ON" } else { "OFF" },
                    t.hold_remaining.as_secs_f32(),
                );
            }
            AppEvent::Started { buses, sensors } => {
                info!("START | buses={} sensors={}", buses, sensors);
            }
            AppEvent::SensorsDiscovered { bus, addresses } => {
                let list: Vec<String> = addresses.iter().map(|a| format!("0x{:02X}", a)).collect();
                info!("BUS | {} discovered [{}]", bus, list.join(" "));
            }
            AppEvent::BusFailed { sensor, error } => {
                warn!("BUS | {} failed: {}", sensor, error);
            }
            AppEvent::RescanDeferred { bus, cycles } => {
                info!("BUS | {} re-scan in {} cycle(s)", bus, cycles);
            }
            AppEvent::BusReinitialized { bus, sensors } => {
                info!("BUS | {} reinitialized, sensors={}", bus, sensors);
            }
            AppEvent::MotionChanged { sensor, moving } => {
                info!("MOTION | {} {}", sensor, if *moving { "moving" } else { "still" });
            }
            AppEvent::FanChanged { on } => {
                info!("FAN | {}", if *on { "ON" } else { "OFF" });
            }
        }
    }
}
