//! LIS3DHTR 3-axis accelerometer driver (ST LIS3DH die).
//!
//! One [`Lis3dhtrBus`] wraps one I2C bus and talks to any number of
//! LIS3DHTRs on it, addressed per call.  Only the registers the motion
//! monitor needs are covered: identity, the two control registers that
//! set rate / range, and the six output bytes.
//!
//! ## Sample format
//!
//! Output registers hold a left-justified 16-bit two's-complement value
//! per axis, low byte first.  Readings are scaled into g by the counts
//! per g of the full-scale range the bus was configured with; at the
//! default ±2 g that is [`RAW_PER_G`].

use embedded_hal::i2c::{Error as _, I2c};
use log::debug;

use crate::error::DeviceError;
use crate::sensors::Sample;

/// WHO_AM_I value of every LIS3DH-family part.
pub const WHO_AM_I_VALUE: u8 = 0x33;

/// Raw counts per g at ±2 g.
pub const RAW_PER_G: f32 = 16_000.0;

/// Register map (subset).
pub mod reg {
    pub const WHO_AM_I: u8 = 0x0F;
    pub const CTRL_REG1: u8 = 0x20;
    pub const CTRL_REG4: u8 = 0x23;
    pub const OUT_X_L: u8 = 0x28;
}

/// Set on the sub-address to auto-increment through consecutive registers.
pub const AUTO_INCREMENT: u8 = 0x80;

/// CTRL_REG1 bits enabling X, Y and Z.
const AXES_XYZ: u8 = 0x07;
/// CTRL_REG4 block-data-update bit.
const BDU: u8 = 0x80;
/// CTRL_REG4 high-resolution bit.
const HR: u8 = 0x08;

/// Output data rate (CTRL_REG1[7:4]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DataRate {
    PowerDown = 0x00,
    Hz1 = 0x10,
    Hz10 = 0x20,
    Hz25 = 0x30,
    Hz50 = 0x40,
    Hz100 = 0x50,
    Hz200 = 0x60,
    Hz400 = 0x70,
}

/// Full-scale selection (CTRL_REG4[5:4]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FullScale {
    G2 = 0x00,
    G4 = 0x10,
    G8 = 0x20,
    G16 = 0x30,
}

impl FullScale {
    /// Counts per g of the left-justified output at this range.
    ///
    /// Sensitivity steps 1:2:4:12 from ±2 g to ±16 g.
    pub fn counts_per_g(self) -> f32 {
        match self {
            Self::G2 => RAW_PER_G,
            Self::G4 => RAW_PER_G / 2.0,
            Self::G8 => RAW_PER_G / 4.0,
            Self::G16 => RAW_PER_G / 12.0,
        }
    }
}

/// Register settings written to each device after discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceSettings {
    pub data_rate: DataRate,
    pub full_scale: FullScale,
    /// Hold output registers until both bytes have been read.
    pub block_data_update: bool,
    pub high_resolution: bool,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            data_rate: DataRate::Hz10,
            full_scale: FullScale::G2,
            block_data_update: false,
            high_resolution: false,
        }
    }
}

impl DeviceSettings {
    pub fn ctrl_reg1(&self) -> u8 {
        self.data_rate as u8 | AXES_XYZ
    }

    pub fn ctrl_reg4(&self) -> u8 {
        let mut v = self.full_scale as u8;
        if self.block_data_update {
            v |= BDU;
        }
        if self.high_resolution {
            v |= HR;
        }
        v
    }
}

/// All LIS3DHTRs reachable through one I2C bus.
///
/// Every device on the bus is configured with the same [`DeviceSettings`],
/// so one scale applies to all readings.
pub struct Lis3dhtrBus<I> {
    i2c: I,
    settings: DeviceSettings,
}

impl<I: I2c> Lis3dhtrBus<I> {
    pub fn new(i2c: I, settings: DeviceSettings) -> Self {
        Self { i2c, settings }
    }

    /// Check that `address` answers and identifies as a LIS3DH part.
    pub fn probe(&mut self, address: u8) -> Result<(), DeviceError> {
        let id = self.read_register(address, reg::WHO_AM_I)?;
        if id == WHO_AM_I_VALUE {
            Ok(())
        } else {
            debug!("lis3dhtr: 0x{:02X} answered with WHO_AM_I 0x{:02X}", address, id);
            Err(DeviceError::WrongDevice(id))
        }
    }

    /// Write rate, axis enables and range.
    pub fn configure(&mut self, address: u8) -> Result<(), DeviceError> {
        let (reg1, reg4) = (self.settings.ctrl_reg1(), self.settings.ctrl_reg4());
        self.write_register(address, reg::CTRL_REG1, reg1)?;
        self.write_register(address, reg::CTRL_REG4, reg4)
    }

    /// Burst-read OUT_X_L..OUT_Z_H and scale to g.
    pub fn read_sample(&mut self, address: u8) -> Result<Sample, DeviceError> {
        let mut buf = [0u8; 6];
        self.i2c
            .write_read(address, &[reg::OUT_X_L | AUTO_INCREMENT], &mut buf)
            .map_err(|e| DeviceError::from(e.kind()))?;
        let raw = [
            i16::from_le_bytes([buf[0], buf[1]]),
            i16::from_le_bytes([buf[2], buf[3]]),
            i16::from_le_bytes([buf[4], buf[5]]),
        ];
        Ok(Sample::from_raw(raw, self.settings.full_scale.counts_per_g()))
    }

    fn read_register(&mut self, address: u8, register: u8) -> Result<u8, DeviceError> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(address, &[register], &mut buf)
            .map_err(|e| DeviceError::from(e.kind()))?;
        Ok(buf[0])
    }

    fn write_register(&mut self, address: u8, register: u8, value: u8) -> Result<(), DeviceError> {
        self.i2c
            .write(address, &[register, value])
            .map_err(|e| DeviceError::from(e.kind()))
    }
}
