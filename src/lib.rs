//! motionfan library.
//!
//! Motion-triggered fan control over LIS3DHTR accelerometers spread
//! across several I2C buses.  Exposes the domain core, the adapters and
//! the drivers for the binary and for integration testing.  Linux
//! peripheral access is guarded by the `linux-hal` feature.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod sensors;
