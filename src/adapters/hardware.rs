//! Hardware adapter: bridges I2C buses and the fan relay to domain ports.
//!
//! Owns one [`Lis3dhtrBus`] per opened bus and the [`FanRelay`], exposing
//! them through [`DevicePort`] and [`ActuatorPort`].  Buses are opened
//! lazily through a [`BusOpener`]; after a failed read the handle is
//! dropped so the next scan reopens the device node from scratch.
//!
//! The same adapter drives real hardware (`linux::LinuxBusOpener`) and
//! the host simulation (`sim::SimOpener`).

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;
use log::{debug, info};

use crate::app::ports::{ActuatorPort, DevicePort, Level};
use crate::drivers::fan::FanRelay;
use crate::drivers::lis3dhtr::{DeviceSettings, Lis3dhtrBus};
use crate::error::{ActuatorError, DeviceError};
use crate::sensors::{AddressRange, AddressSet, BusId, Sample, SensorHandle};

/// Source of I2C bus handles.
pub trait BusOpener {
    type Bus: I2c;

    fn open(&mut self, bus: BusId) -> Result<Self::Bus, DeviceError>;
}

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<O: BusOpener, P> {
    opener: O,
    buses: BTreeMap<BusId, Lis3dhtrBus<O::Bus>>,
    settings: DeviceSettings,
    fan: FanRelay<P>,
}

impl<O: BusOpener, P: OutputPin> HardwareAdapter<O, P> {
    pub fn new(opener: O, fan_pin: P, fan_active_low: bool, settings: DeviceSettings) -> Self {
        Self {
            opener,
            buses: BTreeMap::new(),
            settings,
            fan: FanRelay::new(fan_pin, fan_active_low),
        }
    }

    pub fn fan(&self) -> &FanRelay<P> {
        &self.fan
    }

    /// Buses with an open handle.
    pub fn open_buses(&self) -> impl Iterator<Item = BusId> + '_ {
        self.buses.keys().copied()
    }

    fn bus(&mut self, id: BusId) -> Result<&mut Lis3dhtrBus<O::Bus>, DeviceError> {
        match self.buses.entry(id) {
            Entry::Occupied(e) => Ok(e.into_mut()),
            Entry::Vacant(v) => {
                let i2c = self.opener.open(id)?;
                info!("Hardware: opened {}", id);
                Ok(v.insert(Lis3dhtrBus::new(i2c, self.settings)))
            }
        }
    }
}

// ── DevicePort implementation ─────────────────────────────────

impl<O: BusOpener, P: OutputPin> DevicePort for HardwareAdapter<O, P> {
    fn scan(&mut self, bus: BusId, range: AddressRange) -> Result<AddressSet, DeviceError> {
        let lis = self.bus(bus)?;
        let mut found = AddressSet::new();
        for address in range.iter() {
            match lis.probe(address) {
                Ok(()) => {
                    let _ = found.push(address);
                }
                Err(e) => debug!("Hardware: {} 0x{:02X} skipped ({})", bus, address, e),
            }
        }
        Ok(found)
    }

    fn configure(&mut self, sensor: SensorHandle) -> Result<(), DeviceError> {
        self.bus(sensor.bus)?.configure(sensor.address)
    }

    fn read_sample(&mut self, sensor: SensorHandle) -> Result<Sample, DeviceError> {
        let result = self.bus(sensor.bus)?.read_sample(sensor.address);
        if result.is_err() {
            self.buses.remove(&sensor.bus);
        }
        result
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<O: BusOpener, P: OutputPin> ActuatorPort for HardwareAdapter<O, P> {
    fn set_output(&mut self, level: Level) -> Result<(), ActuatorError> {
        self.fan.set(level)
    }
}
