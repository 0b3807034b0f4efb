//! Board-agnostic core logic for the Lumen light sensor stack
//!
//! This crate contains everything about the sensor that does not touch
//! the bus:
//!
//! - Instruction set (opcodes, addresses)
//! - Mirrored device state machine
//! - Conversion time and raw-to-lux arithmetic
//! - Light sensor trait and error taxonomy
//! - Configuration and calibration types

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod opcode;
pub mod state;
pub mod traits;
