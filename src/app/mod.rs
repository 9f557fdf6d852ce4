//! Application core: domain logic with all I/O behind ports.
//!
//! This module holds the control loop of the motion monitor: bus
//! lifecycle, debounce feeding and the held fan decision.  Hardware,
//! the failure log and the clock are reached only through the **port
//! traits** in [`ports`], so the layer is testable without peripherals.

pub mod events;
pub mod ports;
pub mod service;
