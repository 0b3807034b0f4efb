//! Device state machine
//!
//! Pure, bus-free model of the sensor: modes, the commands that move
//! between them, and the timing and scaling derived from the current
//! state. The driver owns one [`DeviceState`] and advances it after each
//! successful write.

pub mod command;
pub mod machine;
pub mod mode;

pub use command::{Command, Opcodes};
pub use machine::DeviceState;
pub use mode::{
    conversion_cycle_time_ms, raw_to_lux, scale_factor, MeasurementTime, Mode, Resolution,
    MTREG_DEFAULT, MTREG_MAX, MTREG_MIN,
};
