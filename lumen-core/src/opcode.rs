//! BH1750 instruction set
//!
//! The sensor has no addressable registers. Every command is a single
//! opcode byte written to the device address; results are read back as
//! two bytes with no address phase.

/// No active state
pub const POWER_DOWN: u8 = 0x00;
/// Waiting for a measurement command
pub const POWER_ON: u8 = 0x01;
/// Clear the data register (ignored while powered down)
pub const RESET: u8 = 0x07;

/// Continuous measurement, 1 lx resolution
pub const CONTINUOUS_HIGH_RES: u8 = 0x10;
/// Continuous measurement, 0.5 lx resolution
pub const CONTINUOUS_HIGH_RES2: u8 = 0x11;
/// Continuous measurement, 4 lx resolution
pub const CONTINUOUS_LOW_RES: u8 = 0x13;

/// Single measurement, 1 lx resolution, then power down
pub const ONE_TIME_HIGH_RES: u8 = 0x20;
/// Single measurement, 0.5 lx resolution, then power down
pub const ONE_TIME_HIGH_RES2: u8 = 0x21;
/// Single measurement, 4 lx resolution, then power down
pub const ONE_TIME_LOW_RES: u8 = 0x23;

/// Measurement time register, bits 7..5 go in the low 3 bits
pub const MTREG_HIGH: u8 = 0x40;
/// Measurement time register, bits 4..0 go in the low 5 bits
pub const MTREG_LOW: u8 = 0x60;

/// Device address with ADDR pin tied low
pub const ADDRESS_LOW: u8 = 0x23;
/// Device address with ADDR pin tied high
pub const ADDRESS_HIGH: u8 = 0x5C;
