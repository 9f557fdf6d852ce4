//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ MonitorService (domain)
//! ```
//!
//! Driven adapters (I2C buses, the fan relay, the failure log, the wall
//! clock) implement these traits.  The
//! [`MonitorService`](super::service::MonitorService) consumes them via
//! generics, so the control loop never touches hardware directly.
//!
//! All port errors are typed; the service maps each kind to exactly one
//! recovery action (see [`crate::error`]).

use core::time::Duration;

use chrono::{DateTime, Utc};

use crate::config::SystemConfig;
use crate::error::{ActuatorError, ConfigError, DeviceError, LogError};
use crate::sensors::{AddressRange, AddressSet, BusId, Sample, SensorHandle};

// ───────────────────────────────────────────────────────────────
// Device port (driven adapter: I2C → domain)
// ───────────────────────────────────────────────────────────────

/// Bus scanner and device reader for LIS3DHTR accelerometers.
pub trait DevicePort {
    /// Probe every address in `range` on `bus` and return those that
    /// answered as an accelerometer.  An empty set is a valid result.
    fn scan(&mut self, bus: BusId, range: AddressRange) -> Result<AddressSet, DeviceError>;

    /// Write the operating registers of a freshly discovered sensor.
    fn configure(&mut self, sensor: SensorHandle) -> Result<(), DeviceError>;

    /// Read one acceleration sample.
    fn read_sample(&mut self, sensor: SensorHandle) -> Result<Sample, DeviceError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → GPIO)
// ───────────────────────────────────────────────────────────────

/// Logical output level.  `High` means "fan on" regardless of relay polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    High,
    Low,
}

impl From<bool> for Level {
    fn from(on: bool) -> Self {
        if on { Self::High } else { Self::Low }
    }
}

/// Write-side port: the single fan output.  The pin is bound when the
/// adapter is constructed.
pub trait ActuatorPort {
    fn set_output(&mut self, level: Level) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → console)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Failure log port (driven adapter: domain → persisted record)
// ───────────────────────────────────────────────────────────────

/// Append-only record of bus failures, one `timestamp, message` line each.
///
/// A failed append is reported back but never stops the control loop.
pub trait FailureLog {
    fn append(&mut self, timestamp: DateTime<Utc>, message: &str) -> Result<(), LogError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Time source: wall clock for failure-log timestamps, monotonic
/// uptime for the fan hold.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Monotonic time since the clock was created.
    fn uptime(&self) -> Duration;
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: file → domain)
// ───────────────────────────────────────────────────────────────

/// Loads system configuration.
///
/// Implementations return [`ConfigError::NotFound`] when there is no
/// stored config so the caller can fall back to
/// [`SystemConfig::default()`].  Range validation is the caller's job
/// ([`SystemConfig::validate`]).
pub trait ConfigPort {
    fn load(&self) -> Result<SystemConfig, ConfigError>;
}
