//! End-to-end tests over the simulated board.
//!
//! The real `HardwareAdapter` and LIS3DHTR driver run against
//! `SimBoard`, so register traffic, scaling and the relay pin are all
//! exercised exactly as on the Pi.

use motionfan::adapters::failure_log::CsvFailureLog;
use motionfan::adapters::hardware::HardwareAdapter;
use motionfan::adapters::sim::{SimBoard, SimOpener, SimPin};
use motionfan::app::events::AppEvent;
use motionfan::app::ports::DevicePort;
use motionfan::app::service::MonitorService;
use motionfan::config::SystemConfig;
use motionfan::drivers::lis3dhtr::DeviceSettings;
use motionfan::sensors::BusId;

use crate::mock_hw::{EventLog, ManualClock};

type SimHardware = HardwareAdapter<SimOpener, SimPin>;

struct SimRig {
    board: SimBoard,
    pin: SimPin,
    svc: MonitorService,
    hw: SimHardware,
    sink: EventLog,
    journal: CsvFailureLog<Vec<u8>>,
    clock: ManualClock,
}

impl SimRig {
    fn new(board: SimBoard, config: SystemConfig) -> Self {
        let pin = SimPin::new();
        let mut hw = HardwareAdapter::new(
            SimOpener::new(board.clone()),
            pin.clone(),
            config.fan_active_low,
            DeviceSettings::default(),
        );
        let mut svc = MonitorService::new(config).unwrap();
        let mut sink = EventLog::new();
        svc.start(&mut hw, &mut sink);
        Self {
            board,
            pin,
            svc,
            hw,
            sink,
            journal: CsvFailureLog::new(Vec::new()),
            clock: ManualClock::default(),
        }
    }

    fn tick(&mut self) {
        let interval = self
            .svc
            .tick(&mut self.hw, &mut self.sink, &mut self.journal, &self.clock);
        self.clock.advance(interval);
    }
}

fn config(buses: &[u8]) -> SystemConfig {
    SystemConfig {
        buses: buses.iter().map(|&b| BusId(b)).collect(),
        ..SystemConfig::default()
    }
}

#[test]
fn every_discovered_sensor_reads_immediately() {
    let board = SimBoard::with_sensors(&[
        (BusId(0), 0x18),
        (BusId(0), 0x19),
        (BusId(1), 0x19),
        (BusId(3), 0x18),
    ]);
    board.add_bus(BusId(2));
    let mut r = SimRig::new(board, config(&[0, 1, 2, 3]));

    assert_eq!(r.svc.pool().sensor_count(), r.board.devices().len());
    let handles: Vec<_> = r
        .svc
        .pool()
        .buses()
        .iter()
        .flat_map(|b| b.sensors.iter().map(|s| s.handle))
        .collect();
    for h in handles {
        assert!(r.hw.read_sample(h).is_ok(), "{h} not readable");
    }
}

#[test]
fn discovery_configures_sensors() {
    let board = SimBoard::with_sensors(&[(BusId(1), 0x19)]);
    let r = SimRig::new(board, config(&[1]));
    assert_eq!(r.board.register(BusId(1), 0x19, 0x20), Some(0x27));
}

#[test]
fn shaken_sensor_runs_the_fan() {
    let board = SimBoard::with_sensors(&[(BusId(1), 0x18), (BusId(1), 0x19)]);
    let mut r = SimRig::new(board, config(&[1]));
    r.tick();
    assert_eq!(r.pin.level(), Some(false));

    r.board.shake(BusId(1), 0x18, 4);
    for _ in 0..3 {
        r.tick();
    }
    assert_eq!(r.pin.level(), Some(true));
    assert!(r.svc.fan_commanded());
    assert_eq!(r.svc.pool().moving_count(), 1);
}

#[test]
fn active_low_relay_is_inverted_on_the_pin() {
    let board = SimBoard::with_sensors(&[(BusId(1), 0x19)]);
    let cfg = SystemConfig {
        fan_active_low: true,
        ..config(&[1])
    };
    let mut r = SimRig::new(board, cfg);
    r.tick();
    assert_eq!(r.pin.level(), Some(true), "fan off drives the pin high");
}

#[test]
fn unplugged_bus_is_journaled_and_comes_back_empty() {
    let board = SimBoard::with_sensors(&[(BusId(0), 0x19), (BusId(1), 0x19)]);
    let mut r = SimRig::new(board, config(&[0, 1]));
    r.tick();

    r.board.set_unplugged(BusId(1), true);
    r.tick();
    assert_eq!(r.svc.pool().bus(1).sensors.len(), 0);
    assert_eq!(r.svc.pool().bus(0).sensors.len(), 1);
    assert!(r.sink.events.iter().any(|e| matches!(
        e,
        AppEvent::BusReinitialized {
            bus: BusId(1),
            sensors: 0
        }
    )));

    let text = String::from_utf8(r.journal.into_inner()).unwrap();
    assert_eq!(text, "2025-01-15T08:30:00Z, i2c-1 read failure at 0x19: bus fault\n");
}

#[test]
fn replugged_device_is_found_after_next_failure() {
    let board = SimBoard::with_sensors(&[(BusId(0), 0x18), (BusId(0), 0x19)]);
    let mut r = SimRig::new(board, config(&[0]));

    r.board.fail_reads(BusId(0), 0x18, 1);
    r.board.remove_device(BusId(0), 0x19);
    r.tick();
    assert_eq!(r.svc.pool().sensor_count(), 1);

    r.board.add_device(BusId(0), 0x19);
    r.board.fail_reads(BusId(0), 0x18, 1);
    r.tick();
    r.tick();
    r.tick();
    // Second failure waits one cycle, then the re-scan sees both again.
    assert_eq!(r.svc.pool().sensor_count(), 2);
}
