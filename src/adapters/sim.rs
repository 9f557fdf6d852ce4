//! Simulated I2C buses, LIS3DHTR devices and fan pin.
//!
//! Stands in for real peripherals when the monitor runs on a host
//! (`--simulate`, unit tests).  A [`SimBoard`] is a cheap shared handle:
//! clone it into the adapter and keep a copy to script the hardware
//! (plug devices, set readings, inject read failures, pull a bus).

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use embedded_hal::digital::{self, OutputPin};
use embedded_hal::i2c::{self, I2c, NoAcknowledgeSource, Operation};

use super::hardware::BusOpener;
use crate::drivers::lis3dhtr::{WHO_AM_I_VALUE, reg};
use crate::error::DeviceError;
use crate::sensors::BusId;

const REGISTER_COUNT: usize = 0x40;

/// Raw offset applied while a device is being shaken (0.5 g).
const SHAKE_COUNTS: i16 = 8_000;

struct SimDevice {
    regs: [u8; REGISTER_COUNT],
    pointer: u8,
    /// Sample reads that will fail before the device answers again.
    failing_reads: u32,
    /// Sample reads left with an alternating offset on X.
    shake_left: u32,
    rest: [i16; 3],
}

impl SimDevice {
    fn new() -> Self {
        let mut regs = [0u8; REGISTER_COUNT];
        regs[usize::from(reg::WHO_AM_I)] = WHO_AM_I_VALUE;
        let mut dev = Self {
            regs,
            pointer: 0,
            failing_reads: 0,
            shake_left: 0,
            rest: [0, 0, 0],
        };
        dev.load_output([0, 0, 0]);
        dev
    }

    fn load_output(&mut self, raw: [i16; 3]) {
        let base = usize::from(reg::OUT_X_L);
        for (i, value) in raw.iter().enumerate() {
            let [lo, hi] = value.to_le_bytes();
            self.regs[base + 2 * i] = lo;
            self.regs[base + 2 * i + 1] = hi;
        }
    }

    fn write(&mut self, bytes: &[u8]) {
        let Some((&sub, data)) = bytes.split_first() else {
            return;
        };
        self.pointer = sub & 0x7F;
        for &b in data {
            if let Some(r) = self.regs.get_mut(usize::from(self.pointer)) {
                *r = b;
            }
            self.pointer = self.pointer.wrapping_add(1);
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<(), i2c::ErrorKind> {
        if self.pointer == reg::OUT_X_L {
            if self.failing_reads > 0 {
                self.failing_reads -= 1;
                return Err(i2c::ErrorKind::Bus);
            }
            if self.shake_left > 0 {
                self.shake_left -= 1;
                let offset = if self.shake_left % 2 == 0 {
                    SHAKE_COUNTS
                } else {
                    -SHAKE_COUNTS
                };
                let mut raw = self.rest;
                raw[0] = raw[0].saturating_add(offset);
                self.load_output(raw);
            } else {
                self.load_output(self.rest);
            }
        }
        for b in buf.iter_mut() {
            *b = self
                .regs
                .get(usize::from(self.pointer))
                .copied()
                .unwrap_or(0);
            self.pointer = self.pointer.wrapping_add(1);
        }
        Ok(())
    }
}

#[derive(Default)]
struct SimBusState {
    unplugged: bool,
    devices: BTreeMap<u8, SimDevice>,
}

#[derive(Default)]
struct BoardState {
    buses: BTreeMap<BusId, SimBusState>,
}

/// Shared handle to a set of simulated buses.
#[derive(Clone, Default)]
pub struct SimBoard {
    inner: Rc<RefCell<BoardState>>,
}

impl SimBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Board with one resting sensor at each `(bus, address)`.
    pub fn with_sensors(sensors: &[(BusId, u8)]) -> Self {
        let board = Self::new();
        for &(bus, address) in sensors {
            board.add_device(bus, address);
        }
        board
    }

    /// Make `bus` exist (empty).
    pub fn add_bus(&self, bus: BusId) {
        self.inner.borrow_mut().buses.entry(bus).or_default();
    }

    /// Plug a LIS3DHTR at `address`, resting at 0 g on every axis.
    pub fn add_device(&self, bus: BusId, address: u8) {
        self.inner
            .borrow_mut()
            .buses
            .entry(bus)
            .or_default()
            .devices
            .insert(address, SimDevice::new());
    }

    pub fn remove_device(&self, bus: BusId, address: u8) {
        if let Some(b) = self.inner.borrow_mut().buses.get_mut(&bus) {
            b.devices.remove(&address);
        }
    }

    /// Pull (or reconnect) the whole bus: opening and every transfer fail.
    pub fn set_unplugged(&self, bus: BusId, unplugged: bool) {
        self.inner
            .borrow_mut()
            .buses
            .entry(bus)
            .or_default()
            .unplugged = unplugged;
    }

    /// Set the resting reading of a device in raw counts.
    pub fn set_raw(&self, bus: BusId, address: u8, raw: [i16; 3]) {
        self.with_device(bus, address, |d| {
            d.rest = raw;
            d.load_output(raw);
        });
    }

    /// Fail the next `count` sample reads of a device.
    pub fn fail_reads(&self, bus: BusId, address: u8, count: u32) {
        self.with_device(bus, address, |d| d.failing_reads = count);
    }

    /// Alternate the X reading by ±0.5 g for the next `reads` sample reads.
    pub fn shake(&self, bus: BusId, address: u8, reads: u32) {
        self.with_device(bus, address, |d| d.shake_left = reads);
    }

    pub fn set_who_am_i(&self, bus: BusId, address: u8, value: u8) {
        self.with_device(bus, address, |d| {
            d.regs[usize::from(reg::WHO_AM_I)] = value;
        });
    }

    /// Current register contents, `None` if the device does not exist.
    pub fn register(&self, bus: BusId, address: u8, register: u8) -> Option<u8> {
        let state = self.inner.borrow();
        let dev = state.buses.get(&bus)?.devices.get(&address)?;
        dev.regs.get(usize::from(register)).copied()
    }

    /// Every `(bus, address)` currently plugged in.
    pub fn devices(&self) -> Vec<(BusId, u8)> {
        let state = self.inner.borrow();
        state
            .buses
            .iter()
            .flat_map(|(&bus, b)| b.devices.keys().map(move |&a| (bus, a)))
            .collect()
    }

    /// I2C handle onto `bus`.
    pub fn bus(&self, bus: BusId) -> SimBus {
        SimBus {
            board: self.clone(),
            bus,
        }
    }

    fn with_device(&self, bus: BusId, address: u8, f: impl FnOnce(&mut SimDevice)) {
        if let Some(dev) = self
            .inner
            .borrow_mut()
            .buses
            .get_mut(&bus)
            .and_then(|b| b.devices.get_mut(&address))
        {
            f(dev);
        }
    }

    fn is_open(&self, bus: BusId) -> bool {
        self.inner
            .borrow()
            .buses
            .get(&bus)
            .is_some_and(|b| !b.unplugged)
    }
}

/// One simulated I2C bus.
pub struct SimBus {
    board: SimBoard,
    bus: BusId,
}

impl i2c::ErrorType for SimBus {
    type Error = i2c::ErrorKind;
}

impl I2c for SimBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut state = self.board.inner.borrow_mut();
        let bus = match state.buses.get_mut(&self.bus) {
            Some(b) if !b.unplugged => b,
            _ => return Err(i2c::ErrorKind::Bus),
        };
        let dev = bus
            .devices
            .get_mut(&address)
            .ok_or(i2c::ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))?;
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => dev.write(bytes),
                Operation::Read(buf) => dev.read(buf)?,
            }
        }
        Ok(())
    }
}

/// Opens [`SimBus`]es from a shared [`SimBoard`].
pub struct SimOpener {
    board: SimBoard,
}

impl SimOpener {
    pub fn new(board: SimBoard) -> Self {
        Self { board }
    }
}

impl BusOpener for SimOpener {
    type Bus = SimBus;

    fn open(&mut self, bus: BusId) -> Result<SimBus, DeviceError> {
        if self.board.is_open(bus) {
            Ok(self.board.bus(bus))
        } else {
            Err(DeviceError::Unavailable)
        }
    }
}

#[derive(Default)]
struct PinState {
    level: Option<bool>,
    broken: bool,
    writes: u32,
}

/// Output pin recording its level.  Clones share the same pin.
#[derive(Clone, Default)]
pub struct SimPin {
    inner: Rc<RefCell<PinState>>,
}

impl SimPin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Electrical level, `None` until first written.
    pub fn level(&self) -> Option<bool> {
        self.inner.borrow().level
    }

    /// Successful writes so far.
    pub fn writes(&self) -> u32 {
        self.inner.borrow().writes
    }

    /// Make every following write fail.
    pub fn set_broken(&self, broken: bool) {
        self.inner.borrow_mut().broken = broken;
    }

    fn drive(&mut self, high: bool) -> Result<(), digital::ErrorKind> {
        let mut pin = self.inner.borrow_mut();
        if pin.broken {
            return Err(digital::ErrorKind::Other);
        }
        pin.level = Some(high);
        pin.writes += 1;
        Ok(())
    }
}

impl digital::ErrorType for SimPin {
    type Error = digital::ErrorKind;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true)
    }
}
