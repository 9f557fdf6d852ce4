//! Monitor service: the hexagonal core.
//!
//! [`MonitorService`] owns the sensor pool, the debounce parameters and
//! the fan hold state.  All I/O flows through port traits injected at
//! call sites, so the whole control loop runs against mock adapters in
//! tests.
//!
//! ```text
//!   DevicePort ──▶ ┌─────────────────────────┐ ──▶ EventSink
//!                  │     MonitorService       │
//! ActuatorPort ◀── │ Pool · Debounce · Hold   │ ──▶ FailureLog
//!                  └─────────────────────────┘
//! ```
//!
//! Every bus runs its own small lifecycle:
//!
//! ```text
//! Discovering ─▶ Polling ─(read failure)─▶ Reinitializing ─▶ Polling
//! ```
//!
//! A failure on one bus never touches the sensors of another.

use core::time::Duration;

use log::{debug, info, warn};

use crate::config::SystemConfig;
use crate::control::{ActuatorState, DebounceParams, debounce, hold};
use crate::error::{ConfigError, DeviceError};
use crate::sensors::{BusPhase, SensorHandle, SensorPool};

use super::events::{AppEvent, TelemetryData};
use super::ports::{ActuatorPort, Clock, DevicePort, EventSink, FailureLog, Level};

/// Poll cycles a bus waits before re-scanning after its `failures`-th
/// consecutive failed pass.
///
/// The first failure re-scans at once; later ones wait `2^(n-1) - 1`
/// cycles, capped at `max_cycles`.  `max_cycles == 0` turns the backoff off.
pub fn rescan_backoff(failures: u32, max_cycles: u32) -> u32 {
    if max_cycles == 0 || failures <= 1 {
        return 0;
    }
    let exp = (failures - 1).min(31);
    let wait = (1u64 << exp) - 1;
    wait.min(u64::from(max_cycles)) as u32
}

// ───────────────────────────────────────────────────────────────
// MonitorService
// ───────────────────────────────────────────────────────────────

pub struct MonitorService {
    config: SystemConfig,
    params: DebounceParams,
    pool: SensorPool,
    actuator: ActuatorState,
    /// Clock uptime at the start of the previous tick; the time since
    /// then is charged against the hold timer.
    last_tick: Option<Duration>,
    cycle_count: u64,
}

impl MonitorService {
    /// Validate `config` and build the service.
    ///
    /// Does **not** touch hardware; call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let params = config.debounce_params();
        let pool = SensorPool::new(&config.buses);
        Ok(Self {
            config,
            params,
            pool,
            actuator: ActuatorState::default(),
            last_tick: None,
            cycle_count: 0,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive the fan off and run discovery on every bus.
    pub fn start(&mut self, hw: &mut (impl DevicePort + ActuatorPort), sink: &mut impl EventSink) {
        if let Err(e) = hw.set_output(Level::Low) {
            warn!("Monitor: initial fan write failed: {}", e);
        }

        let range = self.config.address_range();
        for bus in 0..self.pool.buses().len() {
            let addresses = self.pool.discover(bus, hw, range);
            let id = self.pool.bus(bus).id;
            info!("Monitor: {} has {} sensor(s)", id, addresses.len());
            sink.emit(&AppEvent::SensorsDiscovered { bus: id, addresses });
        }

        let sensors = self.pool.sensor_count();
        info!(
            "Monitor started: {} bus(es), {} sensor(s)",
            self.pool.buses().len(),
            sensors
        );
        sink.emit(&AppEvent::Started {
            buses: self.pool.buses().len(),
            sensors,
        });
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle: service every bus → decide → drive the fan.
    ///
    /// Returns how long the caller should sleep before the next tick.
    /// The `hw` parameter satisfies **both** [`DevicePort`] and
    /// [`ActuatorPort`], the same way one adapter owns buses and relay.
    pub fn tick(
        &mut self,
        hw: &mut (impl DevicePort + ActuatorPort),
        sink: &mut impl EventSink,
        journal: &mut impl FailureLog,
        clock: &impl Clock,
    ) -> Duration {
        self.cycle_count += 1;
        let now = clock.uptime();
        let elapsed = self
            .last_tick
            .map_or(Duration::ZERO, |prev| now.saturating_sub(prev));
        self.last_tick = Some(now);

        // 1. Buses, strictly in configuration order
        for bus in 0..self.pool.buses().len() {
            self.service_bus(bus, hw, sink, journal, clock);
        }

        // 2. Fan decision over every live sensor
        let was_on = self.actuator.commanded;
        let (command, next) = hold::decide(
            self.pool.states(),
            self.actuator,
            self.config.fan_hold(),
            elapsed,
        );
        self.actuator = next;

        // 3. Actuator; a failed write is retried next cycle
        if let Err(e) = hw.set_output(Level::from(command)) {
            warn!("Monitor: fan write failed: {}", e);
        }
        if command != was_on {
            info!("Monitor: fan {}", if command { "ON" } else { "OFF" });
            sink.emit(&AppEvent::FanChanged { on: command });
        }

        // 4. Telemetry
        let every = u64::from(self.config.telemetry_interval_cycles);
        if every > 0 && self.cycle_count % every == 0 {
            sink.emit(&AppEvent::Telemetry(self.build_telemetry()));
        }

        if command {
            self.config.busy_poll_interval()
        } else {
            self.config.idle_poll_interval()
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn build_telemetry(&self) -> TelemetryData {
        let buses = self.pool.buses();
        TelemetryData {
            cycle: self.cycle_count,
            buses: buses.len(),
            buses_reinitializing: buses
                .iter()
                .filter(|b| matches!(b.phase, BusPhase::Reinitializing { .. }))
                .count(),
            sensors: self.pool.sensor_count(),
            moving: self.pool.moving_count(),
            fan_on: self.actuator.commanded,
            hold_remaining: self.actuator.hold_remaining,
        }
    }

    pub fn pool(&self) -> &SensorPool {
        &self.pool
    }

    pub fn actuator_state(&self) -> ActuatorState {
        self.actuator
    }

    pub fn fan_commanded(&self) -> bool {
        self.actuator.commanded
    }

    /// Control cycles executed since startup.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn service_bus(
        &mut self,
        bus: usize,
        hw: &mut (impl DevicePort + ActuatorPort),
        sink: &mut impl EventSink,
        journal: &mut impl FailureLog,
        clock: &impl Clock,
    ) {
        let phase = self.pool.bus(bus).phase;
        match phase {
            BusPhase::Discovering => {
                let addresses = self.pool.discover(bus, hw, self.config.address_range());
                let id = self.pool.bus(bus).id;
                sink.emit(&AppEvent::SensorsDiscovered { bus: id, addresses });
            }
            BusPhase::Polling => {
                if let Some((sensor, error)) = self.poll_bus(bus, hw, sink) {
                    self.handle_failure(bus, sensor, error, hw, sink, journal, clock);
                } else {
                    self.pool.bus_mut(bus).consecutive_failures = 0;
                }
            }
            BusPhase::Reinitializing { cycles_left: 0 } => self.reinitialize(bus, hw, sink),
            BusPhase::Reinitializing { cycles_left } => {
                self.pool.bus_mut(bus).phase = BusPhase::Reinitializing {
                    cycles_left: cycles_left - 1,
                };
            }
        }
    }

    /// Read every sensor on `bus`, stopping at the first failure.
    fn poll_bus(
        &mut self,
        bus: usize,
        hw: &mut impl DevicePort,
        sink: &mut impl EventSink,
    ) -> Option<(SensorHandle, DeviceError)> {
        let params = &self.params;
        for sensor in self.pool.bus_mut(bus).sensors.iter_mut() {
            let sample = match hw.read_sample(sensor.handle) {
                Ok(sample) => sample,
                Err(e) => return Some((sensor.handle, e)),
            };
            let was_moving = sensor.state.motion;
            sensor.state = debounce::update(sensor.state, sample, params);
            if sensor.state.motion != was_moving {
                debug!("Monitor: {} motion={}", sensor.handle, sensor.state.motion);
                sink.emit(&AppEvent::MotionChanged {
                    sensor: sensor.handle,
                    moving: sensor.state.motion,
                });
            }
        }
        None
    }

    #[allow(clippy::too_many_arguments)]
    fn handle_failure(
        &mut self,
        bus: usize,
        sensor: SensorHandle,
        error: DeviceError,
        hw: &mut impl DevicePort,
        sink: &mut impl EventSink,
        journal: &mut impl FailureLog,
        clock: &impl Clock,
    ) {
        warn!("Monitor: read from {} failed ({}), dropping bus sensors", sensor, error);
        sink.emit(&AppEvent::BusFailed { sensor, error });

        let line = format!(
            "{} read failure at 0x{:02X}: {}",
            sensor.bus, sensor.address, error
        );
        if let Err(e) = journal.append(clock.now(), &line) {
            warn!("Monitor: {}", e);
        }

        for dropped in self.pool.bus(bus).sensors.iter().filter(|s| s.state.motion) {
            sink.emit(&AppEvent::MotionChanged {
                sensor: dropped.handle,
                moving: false,
            });
        }

        let slot = self.pool.bus_mut(bus);
        slot.consecutive_failures = slot.consecutive_failures.saturating_add(1);
        let wait = rescan_backoff(
            slot.consecutive_failures,
            self.config.rescan_backoff_max_cycles,
        );
        self.pool
            .clear_bus(bus, BusPhase::Reinitializing { cycles_left: wait });

        if wait == 0 {
            self.reinitialize(bus, hw, sink);
        } else {
            info!("Monitor: {} re-scan deferred {} cycle(s)", sensor.bus, wait);
            sink.emit(&AppEvent::RescanDeferred {
                bus: sensor.bus,
                cycles: wait,
            });
        }
    }

    fn reinitialize(&mut self, bus: usize, hw: &mut impl DevicePort, sink: &mut impl EventSink) {
        let found = self.pool.discover(bus, hw, self.config.address_range());
        let id = self.pool.bus(bus).id;
        info!("Monitor: {} reinitialized with {} sensor(s)", id, found.len());
        sink.emit(&AppEvent::BusReinitialized {
            bus: id,
            sensors: found.len(),
        });
    }
}
