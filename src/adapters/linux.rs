//! Linux peripherals: `/dev/i2c-N` character devices and sysfs GPIO.
//!
//! Only built with the `linux-hal` feature.

use linux_embedded_hal::sysfs_gpio::Direction;
use linux_embedded_hal::{I2cdev, SysfsPin};
use log::{info, warn};

use super::hardware::BusOpener;
use crate::error::{ActuatorError, DeviceError};
use crate::sensors::BusId;

/// Opens `/dev/i2c-N` for each requested bus.
#[derive(Debug, Default)]
pub struct LinuxBusOpener;

impl BusOpener for LinuxBusOpener {
    type Bus = I2cdev;

    fn open(&mut self, bus: BusId) -> Result<I2cdev, DeviceError> {
        let path = format!("/dev/i2c-{}", bus.0);
        I2cdev::new(&path).map_err(|e| {
            warn!("Linux: cannot open {}: {}", path, e);
            DeviceError::Unavailable
        })
    }
}

/// Export the fan GPIO and make it an output that starts with the fan off.
pub fn open_fan_pin(gpio: u32, active_low: bool) -> Result<SysfsPin, ActuatorError> {
    let pin = SysfsPin::new(u64::from(gpio));
    pin.export().map_err(|e| {
        warn!("Linux: export of GPIO {} failed: {}", gpio, e);
        ActuatorError::GpioInitFailed
    })?;
    let off = if active_low { Direction::High } else { Direction::Low };
    pin.set_direction(off).map_err(|e| {
        warn!("Linux: GPIO {} direction failed: {}", gpio, e);
        ActuatorError::GpioInitFailed
    })?;
    info!("Linux: fan relay on GPIO {}", gpio);
    Ok(pin)
}
