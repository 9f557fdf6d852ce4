//! Sensor data model and the per-bus [`SensorPool`].
//!
//! A sensor is identified by the pair (bus, address).  The pool owns one
//! [`pool::BusSlot`] per configured bus; each slot owns the sensors found
//! on that bus by the last discovery scan.

pub mod pool;

use core::fmt;

use serde::{Deserialize, Serialize};

pub use pool::{BusPhase, BusSlot, Sensor, SensorId, SensorPool};

/// Identifier of an I2C bus (`/dev/i2c-N` on Linux).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusId(pub u8);

impl fmt::Display for BusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i2c-{}", self.0)
    }
}

/// Identifies one accelerometer by (bus, 7-bit address).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SensorHandle {
    pub bus: BusId,
    pub address: u8,
}

impl SensorHandle {
    pub const fn new(bus: BusId, address: u8) -> Self {
        Self { bus, address }
    }
}

impl fmt::Display for SensorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@0x{:02X}", self.bus, self.address)
    }
}

/// Addresses that answered a scan.  The 7-bit address space bounds it.
pub type AddressSet = heapless::Vec<u8, 128>;

/// Inclusive 7-bit address range probed by a discovery scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange {
    pub low: u8,
    pub high: u8,
}

impl AddressRange {
    pub const fn new(low: u8, high: u8) -> Self {
        Self { low, high }
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> {
        self.low..=self.high
    }
}

/// Which axes take part in the motion delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisMask {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

impl AxisMask {
    pub const ALL: Self = Self {
        x: true,
        y: true,
        z: true,
    };

    pub fn any(&self) -> bool {
        self.x || self.y || self.z
    }
}

impl Default for AxisMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// One 3-axis acceleration reading in g.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Sample {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Scale raw two's-complement counts by a fixed divisor.
    pub fn from_raw(raw: [i16; 3], counts_per_g: f32) -> Self {
        Self {
            x: f32::from(raw[0]) / counts_per_g,
            y: f32::from(raw[1]) / counts_per_g,
            z: f32::from(raw[2]) / counts_per_g,
        }
    }

    /// Largest absolute per-axis difference over the enabled axes.
    pub fn max_delta(&self, other: &Sample, axes: AxisMask) -> f32 {
        let mut delta = 0.0_f32;
        if axes.x {
            delta = delta.max((self.x - other.x).abs());
        }
        if axes.y {
            delta = delta.max((self.y - other.y).abs());
        }
        if axes.z {
            delta = delta.max((self.z - other.z).abs());
        }
        delta
    }
}
