//! Mock adapters for integration tests.
//!
//! `MockHardware` is a scripted device port plus a recording fan output:
//! each sensor answers from a queue of scripted results and falls back
//! to its resting sample once the queue is empty.  Every scan, read and
//! output write is recorded so tests can assert on the full history.

use core::time::Duration;
use std::cell::Cell;
use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, TimeZone, Utc};
use motionfan::app::events::AppEvent;
use motionfan::app::ports::{ActuatorPort, Clock, DevicePort, EventSink, FailureLog, Level};
use motionfan::error::{ActuatorError, DeviceError, LogError};
use motionfan::sensors::{AddressRange, AddressSet, BusId, Sample, SensorHandle};

// ── MockSensor ────────────────────────────────────────────────

struct MockSensor {
    script: VecDeque<Result<Sample, DeviceError>>,
    resting: Sample,
}

// ── MockHardware ──────────────────────────────────────────────

#[derive(Default)]
pub struct MockHardware {
    sensors: BTreeMap<BusId, BTreeMap<u8, MockSensor>>,
    pub scans: Vec<BusId>,
    pub reads: Vec<SensorHandle>,
    pub outputs: Vec<Level>,
    pub fail_output: bool,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self::default()
    }

    /// One resting sensor at `address` on each of `buses`.
    pub fn with_sensor_per_bus(buses: &[u8], address: u8) -> Self {
        let mut hw = Self::new();
        for &b in buses {
            hw.add_sensor(BusId(b), address);
        }
        hw
    }

    pub fn add_sensor(&mut self, bus: BusId, address: u8) {
        self.sensors.entry(bus).or_default().insert(
            address,
            MockSensor {
                script: VecDeque::new(),
                resting: Sample::default(),
            },
        );
    }

    pub fn remove_sensor(&mut self, bus: BusId, address: u8) {
        if let Some(b) = self.sensors.get_mut(&bus) {
            b.remove(&address);
        }
    }

    /// Queue readings; the last one becomes the resting sample.
    pub fn push_samples(&mut self, bus: BusId, address: u8, samples: &[Sample]) {
        let s = self.sensor(bus, address);
        s.script.extend(samples.iter().copied().map(Ok));
    }

    /// Queue one failing read.
    pub fn push_failure(&mut self, bus: BusId, address: u8, error: DeviceError) {
        self.sensor(bus, address).script.push_back(Err(error));
    }

    /// Logical fan level after the last successful write.
    pub fn fan_on(&self) -> bool {
        self.outputs.last() == Some(&Level::High)
    }

    pub fn scans_of(&self, bus: BusId) -> usize {
        self.scans.iter().filter(|&&b| b == bus).count()
    }

    pub fn reads_of(&self, bus: BusId) -> usize {
        self.reads.iter().filter(|h| h.bus == bus).count()
    }

    fn sensor(&mut self, bus: BusId, address: u8) -> &mut MockSensor {
        self.sensors
            .get_mut(&bus)
            .and_then(|b| b.get_mut(&address))
            .expect("sensor must be added first")
    }
}

impl DevicePort for MockHardware {
    fn scan(&mut self, bus: BusId, range: AddressRange) -> Result<AddressSet, DeviceError> {
        self.scans.push(bus);
        let mut found = AddressSet::new();
        if let Some(devices) = self.sensors.get(&bus) {
            for address in range.iter().filter(|a| devices.contains_key(a)) {
                found.push(address).unwrap();
            }
        }
        Ok(found)
    }

    fn configure(&mut self, sensor: SensorHandle) -> Result<(), DeviceError> {
        match self.sensors.get(&sensor.bus) {
            Some(b) if b.contains_key(&sensor.address) => Ok(()),
            _ => Err(DeviceError::Nack),
        }
    }

    fn read_sample(&mut self, sensor: SensorHandle) -> Result<Sample, DeviceError> {
        self.reads.push(sensor);
        let Some(dev) = self
            .sensors
            .get_mut(&sensor.bus)
            .and_then(|b| b.get_mut(&sensor.address))
        else {
            return Err(DeviceError::Nack);
        };
        match dev.script.pop_front() {
            Some(Ok(sample)) => {
                dev.resting = sample;
                Ok(sample)
            }
            Some(Err(e)) => Err(e),
            None => Ok(dev.resting),
        }
    }
}

impl ActuatorPort for MockHardware {
    fn set_output(&mut self, level: Level) -> Result<(), ActuatorError> {
        if self.fail_output {
            return Err(ActuatorError::GpioWriteFailed);
        }
        self.outputs.push(level);
        Ok(())
    }
}

// ── EventLog ──────────────────────────────────────────────────

#[derive(Default)]
pub struct EventLog {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── MemFailureLog ─────────────────────────────────────────────

#[derive(Default)]
pub struct MemFailureLog {
    pub lines: Vec<(DateTime<Utc>, String)>,
    pub broken: bool,
}

impl FailureLog for MemFailureLog {
    fn append(&mut self, timestamp: DateTime<Utc>, message: &str) -> Result<(), LogError> {
        if self.broken {
            return Err(LogError::Io(std::io::ErrorKind::PermissionDenied));
        }
        self.lines.push((timestamp, message.to_owned()));
        Ok(())
    }
}

// ── ManualClock ───────────────────────────────────────────────

/// Wall time frozen at a fixed instant; uptime moves only when a test
/// advances it.
pub struct ManualClock {
    pub wall: DateTime<Utc>,
    uptime: Cell<Duration>,
}

#[allow(dead_code)]
impl ManualClock {
    pub fn advance(&self, by: Duration) {
        self.uptime.set(self.uptime.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            wall: Utc.with_ymd_and_hms(2025, 1, 15, 8, 30, 0).unwrap(),
            uptime: Cell::new(Duration::ZERO),
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.wall
    }

    fn uptime(&self) -> Duration {
        self.uptime.get()
    }
}
