//! Fan relay driver.
//!
//! Two-state digital output behind any `embedded-hal` [`OutputPin`].
//! Relay boards differ in polarity, so the logical level the control
//! loop asks for is translated through `active_low` before it reaches
//! the pin.
//!
//! The driver is a dumb actuator: when and for how long the fan runs is
//! decided by [`control::hold`](crate::control::hold).

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::Level;
use crate::error::ActuatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanState {
    /// Never written since construction.
    Unknown,
    Off,
    On,
}

pub struct FanRelay<P> {
    pin: P,
    active_low: bool,
    state: FanState,
}

impl<P: OutputPin> FanRelay<P> {
    pub fn new(pin: P, active_low: bool) -> Self {
        Self {
            pin,
            active_low,
            state: FanState::Unknown,
        }
    }

    /// Drive the relay to the logical `level` (`High` = fan on).
    pub fn set(&mut self, level: Level) -> Result<(), ActuatorError> {
        let on = level == Level::High;
        let pin_high = on != self.active_low;
        let result = if pin_high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if let Err(e) = result {
            warn!("fan: GPIO write failed ({:?})", e);
            return Err(ActuatorError::GpioWriteFailed);
        }
        self.state = if on { FanState::On } else { FanState::Off };
        Ok(())
    }

    pub fn state(&self) -> FanState {
        self.state
    }

    pub fn is_on(&self) -> bool {
        self.state == FanState::On
    }
}
