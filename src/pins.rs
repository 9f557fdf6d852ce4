//! Board wiring defaults for a Raspberry Pi carrier.
//!
//! Single source of truth for the reference wiring: config defaults read
//! from here rather than hard-coding numbers.

// ---------------------------------------------------------------------------
// Fan relay
// ---------------------------------------------------------------------------

/// Digital output driving the fan relay (BCM numbering, pin 12 on the header).
pub const FAN_RELAY_GPIO: u32 = 18;

// ---------------------------------------------------------------------------
// I2C
// ---------------------------------------------------------------------------

/// Bus the header I2C pins (SDA1/SCL1) are routed to.
pub const DEFAULT_I2C_BUS: u8 = 1;

/// LIS3DHTR with SDO/SA0 pulled high.
pub const LIS3DHTR_ADDR_PRIMARY: u8 = 0x19;
/// LIS3DHTR with SDO/SA0 pulled low.
pub const LIS3DHTR_ADDR_SECONDARY: u8 = 0x18;
