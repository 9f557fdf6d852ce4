//! Unified error types for the motion monitor.
//!
//! Every variant is `Copy` so errors can be carried through events and
//! the control loop without allocation.  Each kind has exactly one
//! recovery action:
//!
//! | Error           | Recovery                                        |
//! |-----------------|-------------------------------------------------|
//! | `DeviceError`   | reinitialize the affected bus only              |
//! | `ActuatorError` | log, retry on the next cycle                    |
//! | `LogError`      | log to console, drop the line                   |
//! | `ConfigError`   | fatal at startup, process exits non-zero        |

use core::fmt;

use embedded_hal::i2c::ErrorKind;

// ---------------------------------------------------------------------------
// Device errors
// ---------------------------------------------------------------------------

/// A single I2C transaction against one accelerometer failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    /// The device (or a data byte) was not acknowledged.
    Nack,
    /// Bus-level fault: arbitration loss, overrun, stuck line.
    Bus,
    /// Timeout or any other driver-reported failure.
    Other,
    /// The bus itself could not be opened.
    Unavailable,
    /// Something answered, but WHO_AM_I did not identify a LIS3DHTR.
    WrongDevice(u8),
}

/// Classify an `embedded-hal` I2C error kind.
impl From<ErrorKind> for DeviceError {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NoAcknowledge(_) => Self::Nack,
            ErrorKind::Bus | ErrorKind::ArbitrationLoss | ErrorKind::Overrun => Self::Bus,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nack => write!(f, "not acknowledged"),
            Self::Bus => write!(f, "bus fault"),
            Self::Other => write!(f, "transfer failed"),
            Self::Unavailable => write!(f, "bus unavailable"),
            Self::WrongDevice(id) => write!(f, "unexpected WHO_AM_I 0x{id:02X}"),
        }
    }
}

impl std::error::Error for DeviceError {}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// GPIO export / direction setup failed.
    GpioInitFailed,
    /// GPIO set failed.
    GpioWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioInitFailed => write!(f, "GPIO init failed"),
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
        }
    }
}

impl std::error::Error for ActuatorError {}

// ---------------------------------------------------------------------------
// Failure-log errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogError {
    /// The underlying writer rejected the line.
    Io(std::io::ErrorKind),
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(kind) => write!(f, "failure log write failed: {kind}"),
        }
    }
}

impl std::error::Error for LogError {}

impl From<std::io::Error> for LogError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.kind())
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from loading or validating [`SystemConfig`](crate::config::SystemConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config file at the given path (callers fall back to defaults).
    NotFound,
    /// The file exists but could not be read.
    Io(std::io::ErrorKind),
    /// The file is not valid JSON for `SystemConfig`.
    Corrupted,
    /// The bus list is empty; there is nothing to monitor.
    NoBuses,
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Io(kind) => write!(f, "config unreadable: {kind}"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::NoBuses => write!(f, "no I2C buses configured"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
