//! Mirrored device state
//!
//! The sensor cannot be queried, so the driver keeps its own record of
//! what it last told the device. Transitions are driven only by commands
//! the driver issued successfully.
//!
//! Known divergences the record cannot detect:
//! - the device resets its mode on power-on, but the record keeps the
//!   last mode until the caller sets it again
//! - a one-time conversion drops the device back to power down, but the
//!   record stays powered with the one-time mode
//! - external resets, brown-outs, or another master on the bus

use super::command::Command;
use super::mode::{self, MeasurementTime, Mode};

/// Driver-side record of the device state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceState {
    powered: bool,
    mode: Mode,
    measurement_time: MeasurementTime,
}

impl DeviceState {
    /// State of a freshly attached device
    pub const fn new() -> Self {
        Self {
            powered: false,
            mode: Mode::PowerDown,
            measurement_time: MeasurementTime::DEFAULT,
        }
    }

    /// Check if the last power command was power-on
    pub const fn is_powered(&self) -> bool {
        self.powered
    }

    /// Last mode commanded
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Last measurement time commanded
    pub const fn measurement_time(&self) -> MeasurementTime {
        self.measurement_time
    }

    /// Check if the device will honour `command` in this state
    pub const fn accepts(&self, command: Command) -> bool {
        self.powered || !command.requires_power()
    }

    /// Typical conversion time for the recorded mode
    pub const fn conversion_cycle_time_ms(&self) -> u32 {
        mode::conversion_cycle_time_ms(self.mode, self.measurement_time)
    }

    /// Raw counts per lux for the recorded mode
    pub fn scale_factor(&self) -> Option<f32> {
        mode::scale_factor(self.mode, self.measurement_time)
    }

    /// Process a command and return the next state
    ///
    /// Commands the state does not accept leave it unchanged.
    pub fn transition(self, command: Command) -> Self {
        if !self.accepts(command) {
            return self;
        }

        match command {
            // Mode is remembered across power cycles
            Command::PowerDown => Self {
                powered: false,
                ..self
            },
            Command::PowerOn => Self {
                powered: true,
                ..self
            },
            Command::Reset => self,
            Command::SetMode(mode) => Self { mode, ..self },
            Command::SetMeasurementTime(measurement_time) => Self {
                measurement_time,
                ..self
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = DeviceState::new();
        assert!(!state.is_powered());
        assert_eq!(state.mode(), Mode::PowerDown);
        assert_eq!(state.measurement_time(), MeasurementTime::DEFAULT);
        assert_eq!(state, DeviceState::default());
    }

    #[test]
    fn test_set_mode_rejected_while_powered_down() {
        let state = DeviceState::new();
        let command = Command::SetMode(Mode::ContinuousHighRes);
        assert!(!state.accepts(command));
        assert_eq!(state.transition(command), state);
    }

    #[test]
    fn test_power_cycle_keeps_mode() {
        let state = DeviceState::new()
            .transition(Command::PowerOn)
            .transition(Command::SetMode(Mode::ContinuousHighRes))
            .transition(Command::PowerDown);
        assert!(!state.is_powered());
        assert_eq!(state.mode(), Mode::ContinuousHighRes);

        let state = state.transition(Command::PowerOn);
        assert!(state.is_powered());
        assert_eq!(state.mode(), Mode::ContinuousHighRes);
    }

    #[test]
    fn test_measurement_time_changes_derived_values() {
        let state = DeviceState::new()
            .transition(Command::PowerOn)
            .transition(Command::SetMode(Mode::OneTimeHighRes));
        assert_eq!(state.conversion_cycle_time_ms(), 120);

        let t = MeasurementTime::new(138).unwrap();
        let state = state.transition(Command::SetMeasurementTime(t));
        assert_eq!(state.conversion_cycle_time_ms(), 240);
        assert!((state.scale_factor().unwrap() - 2.4).abs() < 1e-6);
    }

    #[test]
    fn test_reset_is_state_neutral() {
        let state = DeviceState::new()
            .transition(Command::PowerOn)
            .transition(Command::SetMode(Mode::ContinuousLowRes));
        assert_eq!(state.transition(Command::Reset), state);
    }
}
