//! Sensor pool: owns every discovered accelerometer, grouped per bus.
//!
//! Buses live in a `Vec<BusSlot>` in configuration order and sensors in a
//! `Vec<Sensor>` per slot, so a sensor is addressed by the arena index
//! pair [`SensorId`] `(bus, slot)`.  Re-discovering a bus replaces its
//! sensor list wholesale; other buses are never touched.

use log::{info, warn};

use super::{AddressRange, AddressSet, BusId, SensorHandle};
use crate::app::ports::DevicePort;
use crate::control::SensorState;

/// Arena index of a sensor: position of its bus, then position on that bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SensorId {
    pub bus: usize,
    pub slot: usize,
}

/// Lifecycle phase of one bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusPhase {
    /// Not scanned yet.
    Discovering,
    /// Sensors are read every cycle.
    Polling,
    /// A read failed; the bus has no sensors until it is re-scanned.
    /// `cycles_left` counts down the re-scan backoff.
    Reinitializing { cycles_left: u32 },
}

/// A discovered sensor and its debounce state.
#[derive(Debug, Clone, Copy)]
pub struct Sensor {
    pub handle: SensorHandle,
    pub state: SensorState,
}

/// Everything the pool tracks for one bus.
#[derive(Debug, Clone)]
pub struct BusSlot {
    pub id: BusId,
    pub phase: BusPhase,
    pub sensors: Vec<Sensor>,
    /// Failed passes since the last clean one; drives re-scan backoff.
    pub consecutive_failures: u32,
}

impl BusSlot {
    fn new(id: BusId) -> Self {
        Self {
            id,
            phase: BusPhase::Discovering,
            sensors: Vec::new(),
            consecutive_failures: 0,
        }
    }
}

/// Owns all buses and their sensors.
pub struct SensorPool {
    buses: Vec<BusSlot>,
}

impl SensorPool {
    pub fn new(bus_ids: &[BusId]) -> Self {
        Self {
            buses: bus_ids.iter().copied().map(BusSlot::new).collect(),
        }
    }

    /// Scan one bus and replace its sensor set.
    ///
    /// Every responding address is configured and read once; the first
    /// reading seeds its [`SensorState`].  Addresses that fail either
    /// step are skipped, so every sensor in the new set has just been
    /// read successfully.  A failed scan leaves the bus empty.
    ///
    /// Returns the addresses of the sensors now on the bus.
    pub fn discover(
        &mut self,
        bus: usize,
        dev: &mut impl DevicePort,
        range: AddressRange,
    ) -> AddressSet {
        let slot = &mut self.buses[bus];
        slot.sensors.clear();
        slot.phase = BusPhase::Polling;

        let found = match dev.scan(slot.id, range) {
            Ok(found) => found,
            Err(e) => {
                warn!("pool: scan of {} failed ({}), treating as empty", slot.id, e);
                AddressSet::new()
            }
        };

        let mut kept = AddressSet::new();
        for address in found {
            let handle = SensorHandle::new(slot.id, address);
            if let Err(e) = dev.configure(handle) {
                warn!("pool: {} configure failed ({}), skipping", handle, e);
                continue;
            }
            match dev.read_sample(handle) {
                Ok(first) => {
                    slot.sensors.push(Sensor {
                        handle,
                        state: SensorState::new(first),
                    });
                    let _ = kept.push(address);
                }
                Err(e) => warn!("pool: {} first read failed ({}), skipping", handle, e),
            }
        }

        if kept.is_empty() {
            info!("pool: no sensors on {}", slot.id);
        }
        kept
    }

    /// Drop a bus's sensors after a failure; their motion no longer counts.
    pub fn clear_bus(&mut self, bus: usize, phase: BusPhase) {
        let slot = &mut self.buses[bus];
        slot.sensors.clear();
        slot.phase = phase;
    }

    pub fn buses(&self) -> &[BusSlot] {
        &self.buses
    }

    pub fn bus(&self, bus: usize) -> &BusSlot {
        &self.buses[bus]
    }

    pub fn bus_mut(&mut self, bus: usize) -> &mut BusSlot {
        &mut self.buses[bus]
    }

    /// Position of `id` in polling order.
    pub fn bus_index(&self, id: BusId) -> Option<usize> {
        self.buses.iter().position(|b| b.id == id)
    }

    pub fn sensor(&self, id: SensorId) -> Option<&Sensor> {
        self.buses.get(id.bus)?.sensors.get(id.slot)
    }

    /// Debounce state of every sensor on every bus.
    pub fn states(&self) -> impl Iterator<Item = &SensorState> {
        self.buses
            .iter()
            .flat_map(|b| b.sensors.iter().map(|s| &s.state))
    }

    pub fn sensor_count(&self) -> usize {
        self.buses.iter().map(|b| b.sensors.len()).sum()
    }

    pub fn moving_count(&self) -> usize {
        self.states().filter(|s| s.motion).count()
    }
}
