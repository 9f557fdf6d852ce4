//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to                  |
//! |----------------|--------------------|------------------------------|
//! | `hardware`     | DevicePort         | LIS3DHTRs on I2C buses       |
//! |                | ActuatorPort       | Fan relay GPIO               |
//! | `linux`        | BusOpener          | `/dev/i2c-N`, sysfs GPIO     |
//! | `sim`          | BusOpener          | Simulated buses and pin      |
//! | `log_sink`     | EventSink          | Console log output           |
//! | `failure_log`  | FailureLog         | Append-only CSV file         |
//! | `config_file`  | ConfigPort         | JSON file                    |
//! | `time`         | Clock              | System wall clock (UTC)      |

pub mod config_file;
pub mod failure_log;
pub mod hardware;
#[cfg(feature = "linux-hal")]
pub mod linux;
pub mod log_sink;
pub mod sim;
pub mod time;
