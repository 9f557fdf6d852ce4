//! Peripheral drivers: the LIS3DHTR accelerometer and the fan relay.

pub mod fan;
pub mod lis3dhtr;
