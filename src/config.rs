//! System configuration parameters
//!
//! All tunable parameters for the motion monitor.  Read once at startup
//! from a JSON file (see [`JsonConfigFile`](crate::adapters::config_file::JsonConfigFile));
//! fields missing from the file keep their defaults.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::control::DebounceParams;
use crate::error::ConfigError;
use crate::pins;
use crate::sensors::{AddressRange, AxisMask, BusId};

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Buses ---
    /// I2C buses to scan and poll, in polling order.
    pub buses: Vec<BusId>,
    /// Lowest 7-bit address probed during discovery.
    pub address_low: u8,
    /// Highest 7-bit address probed during discovery.
    pub address_high: u8,

    // --- Motion detection ---
    /// Per-axis delta (g) between successive samples that counts as movement
    pub motion_threshold_g: f32,
    /// Axes compared when computing the delta
    pub axes: AxisMask,
    /// Over-threshold samples needed (exclusive) before motion is declared
    pub on_run_limit: u32,
    /// Quiet samples needed (exclusive) before motion is cleared
    pub off_run_limit: u32,

    // --- Fan ---
    /// BCM GPIO driving the fan relay
    pub fan_gpio: u32,
    /// Relay board energises on a LOW level
    pub fan_active_low: bool,
    /// Minimum time the fan stays on after motion stops (seconds)
    pub fan_hold_secs: u32,

    // --- Timing ---
    /// Poll interval while the fan is commanded on (milliseconds)
    pub busy_poll_interval_ms: u32,
    /// Poll interval while idle (milliseconds)
    pub idle_poll_interval_ms: u32,
    /// Upper bound on the re-scan backoff for a repeatedly failing bus (cycles, 0 = off)
    pub rescan_backoff_max_cycles: u32,
    /// Telemetry report interval (cycles, 0 = off)
    pub telemetry_interval_cycles: u32,

    // --- Logging ---
    /// Append-only CSV file receiving bus failure records
    pub failure_log_path: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Buses
            buses: vec![BusId(pins::DEFAULT_I2C_BUS)],
            address_low: pins::LIS3DHTR_ADDR_SECONDARY,
            address_high: pins::LIS3DHTR_ADDR_PRIMARY,

            // Motion detection
            motion_threshold_g: 0.10,
            axes: AxisMask::ALL,
            on_run_limit: 2,
            off_run_limit: 4,

            // Fan
            fan_gpio: pins::FAN_RELAY_GPIO,
            fan_active_low: false,
            fan_hold_secs: 25,

            // Timing
            busy_poll_interval_ms: 500,
            idle_poll_interval_ms: 1000,
            rescan_backoff_max_cycles: 32,
            telemetry_interval_cycles: 60,

            // Logging
            failure_log_path: "motion_errors.csv".into(),
        }
    }
}

impl SystemConfig {
    /// Reject configurations the control loop cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buses.is_empty() {
            return Err(ConfigError::NoBuses);
        }
        for (i, bus) in self.buses.iter().enumerate() {
            if self.buses[..i].contains(bus) {
                return Err(ConfigError::ValidationFailed("buses: duplicate bus id"));
            }
        }
        if !self.motion_threshold_g.is_finite() || self.motion_threshold_g <= 0.0 {
            return Err(ConfigError::ValidationFailed(
                "motion_threshold_g: must be a positive number",
            ));
        }
        if !self.axes.any() {
            return Err(ConfigError::ValidationFailed("axes: at least one axis must be enabled"));
        }
        if self.address_high > 0x7F {
            return Err(ConfigError::ValidationFailed("address_high: outside 7-bit range"));
        }
        if self.address_low > self.address_high {
            return Err(ConfigError::ValidationFailed(
                "address_low: must not exceed address_high",
            ));
        }
        if self.busy_poll_interval_ms == 0 || self.idle_poll_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("poll intervals must be non-zero"));
        }
        Ok(())
    }

    pub fn debounce_params(&self) -> DebounceParams {
        DebounceParams {
            threshold: self.motion_threshold_g,
            on_run_limit: self.on_run_limit,
            off_run_limit: self.off_run_limit,
            axes: self.axes,
        }
    }

    pub fn address_range(&self) -> AddressRange {
        AddressRange::new(self.address_low, self.address_high)
    }

    pub fn fan_hold(&self) -> Duration {
        Duration::from_secs(u64::from(self.fan_hold_secs))
    }

    pub fn busy_poll_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.busy_poll_interval_ms))
    }

    pub fn idle_poll_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.idle_poll_interval_ms))
    }
}
