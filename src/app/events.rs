//! Outbound application events.
//!
//! The [`MonitorService`](super::service::MonitorService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them (console lines, test
//! recorders).

use core::time::Duration;

use crate::error::DeviceError;
use crate::sensors::{AddressSet, BusId, SensorHandle};

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Initial discovery finished on every bus.
    Started { buses: usize, sensors: usize },

    /// A startup scan of `bus` kept these addresses.
    SensorsDiscovered { bus: BusId, addresses: AddressSet },

    /// Reading `sensor` failed; its bus loses all sensors until re-scanned.
    BusFailed {
        sensor: SensorHandle,
        error: DeviceError,
    },

    /// A repeatedly failing bus waits `cycles` poll cycles before re-scanning.
    RescanDeferred { bus: BusId, cycles: u32 },

    /// A failed bus was re-scanned and is polling again.
    BusReinitialized { bus: BusId, sensors: usize },

    /// A sensor's debounced motion flag flipped.
    MotionChanged { sensor: SensorHandle, moving: bool },

    /// The fan command flipped.
    FanChanged { on: bool },

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// A point-in-time telemetry snapshot suitable for logging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryData {
    /// Control cycles completed since startup.
    pub cycle: u64,
    pub buses: usize,
    /// Buses waiting out a re-scan backoff.
    pub buses_reinitializing: usize,
    pub sensors: usize,
    pub moving: usize,
    pub fan_on: bool,
    pub hold_remaining: Duration,
}
