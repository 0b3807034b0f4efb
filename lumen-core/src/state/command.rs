//! Commands the driver can issue to the device

use core::ops::Deref;

use super::mode::{MeasurementTime, Mode};
use crate::opcode;

/// Opcode bytes for one command, each written as its own transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcodes {
    bytes: [u8; 2],
    len: usize,
}

impl Opcodes {
    const fn one(op: u8) -> Self {
        Self {
            bytes: [op, 0],
            len: 1,
        }
    }

    const fn two(first: u8, second: u8) -> Self {
        Self {
            bytes: [first, second],
            len: 2,
        }
    }

    /// Opcodes as a slice
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

impl Deref for Opcodes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl IntoIterator for Opcodes {
    type Item = u8;
    type IntoIter = core::iter::Take<core::array::IntoIter<u8, 2>>;

    fn into_iter(self) -> Self::IntoIter {
        self.bytes.into_iter().take(self.len)
    }
}

/// Commands that change the mirrored device state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Enter the power-down state
    PowerDown,
    /// Leave power-down and wait for a measurement command
    PowerOn,
    /// Clear the data register
    Reset,
    /// Select a measuring mode (also starts a one-time conversion)
    SetMode(Mode),
    /// Change the measurement time register
    SetMeasurementTime(MeasurementTime),
}

impl Command {
    /// Opcodes to write, in order
    pub fn opcodes(self) -> Opcodes {
        match self {
            Command::PowerDown => Opcodes::one(opcode::POWER_DOWN),
            Command::PowerOn => Opcodes::one(opcode::POWER_ON),
            Command::Reset => Opcodes::one(opcode::RESET),
            Command::SetMode(mode) => Opcodes::one(mode.opcode()),
            Command::SetMeasurementTime(time) => {
                Opcodes::two(time.high_bits_opcode(), time.low_bits_opcode())
            }
        }
    }

    /// Check if the device only honours this command while powered on
    pub const fn requires_power(self) -> bool {
        !matches!(self, Command::PowerDown | Command::PowerOn)
    }
}
