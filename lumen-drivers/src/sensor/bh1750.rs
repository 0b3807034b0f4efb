//! BH1750 ambient light sensor
//!
//! 16-bit digital light sensor with an opcode-only I2C interface: every
//! command is a single byte written to the device, and a measurement is
//! two bytes read back with no register address.
//!
//! # Protocol
//!
//! - Power: 0x00 down, 0x01 on, 0x07 reset (data register only)
//! - Mode: 0x1x continuous, 0x2x one-time; low nibble 0 = 1 lx,
//!   1 = 0.5 lx, 3 = 4 lx
//! - Measurement time: 0x40 | bits 7..5, then 0x60 | bits 4..0
//! - Result: big-endian u16, lux = counts / 1.2 at default settings
//!
//! # State
//!
//! The device cannot be queried. The driver records what it last sent
//! in a [`DeviceState`] and updates it only after the write succeeded.
//! Power-down keeps the recorded mode, and power-on does not resend it,
//! while the device itself comes back in its own default mode. Call
//! [`Bh1750::set_mode`] again after re-powering.
//!
//! Device-facing configuration while powered down is rejected with
//! [`SensorError::PoweredDown`] and sends nothing. The accuracy
//! multiplier is host-side only and can be changed at any time.
//!
//! # Pacing
//!
//! The driver never sleeps. Wait [`Bh1750::conversion_cycle_time_ms`]
//! between reads; reading sooner returns the previous conversion again.
//!
//! In one-time modes, selecting the mode starts the first conversion.
//! Each read takes the finished result and immediately sends the
//! one-time opcode again, so the next conversion runs while the caller
//! waits. Changing the measurement time also restarts the pending
//! conversion. When no conversion is pending at the recorded settings
//! (after a power cycle or a failed restart), the next read sends the
//! opcode first and returns the previous conversion.

use lumen_core::config::{Address, SensorConfig};
use lumen_core::state::{self, Command, DeviceState, MeasurementTime, Mode};
use lumen_core::traits::{LightSensor, SensorError};
use lumen_hal::BusAdapter;

/// Bytes in one measurement result
const RESULT_LEN: usize = 2;

/// BH1750 driver
///
/// Generic over the bus adapter. Pass `&mut adapter` to keep the adapter
/// (and the bus behind it) owned by the caller.
pub struct Bh1750<B> {
    bus: B,
    address: u8,
    state: DeviceState,
    /// Calibration multiplier applied to every reading
    accuracy: f32,
    /// A one-time conversion was started at the recorded settings
    armed: bool,
}

impl<B> Bh1750<B> {
    /// Create a driver for a sensor at `address`
    ///
    /// Sends nothing. The recorded state starts powered down.
    pub fn new(bus: B, address: Address) -> Self {
        Self {
            bus,
            address: address.value(),
            state: DeviceState::new(),
            accuracy: 1.0,
            armed: false,
        }
    }

    /// 7-bit bus address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Recorded device state
    pub fn state(&self) -> DeviceState {
        self.state
    }

    /// Check if the last power command was power-on
    pub fn is_powered(&self) -> bool {
        self.state.is_powered()
    }

    /// Last mode sent to the device
    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    /// Last measurement time sent to the device
    pub fn measurement_time(&self) -> MeasurementTime {
        self.state.measurement_time()
    }

    /// Calibration multiplier
    pub fn accuracy(&self) -> f32 {
        self.accuracy
    }

    /// Set the calibration multiplier
    ///
    /// Datasheet range is 0.96 to 1.44 (typical 1.2). Not clamped and
    /// never sent to the device.
    pub fn set_accuracy(&mut self, accuracy: f32) {
        self.accuracy = accuracy;
    }

    /// Typical time one conversion takes, in milliseconds
    ///
    /// 120 ms for the high-resolution modes, 16 ms for low resolution,
    /// scaled by `mtreg / 69`. Zero while no measuring mode is set.
    pub fn conversion_cycle_time_ms(&self) -> u32 {
        self.state.conversion_cycle_time_ms()
    }

    /// Raw counts per lux in the current mode
    pub fn scale_factor(&self) -> Option<f32> {
        self.state.scale_factor()
    }

    /// Give the bus adapter back
    ///
    /// The device is left as it is; nothing is sent.
    pub fn release(self) -> B {
        self.bus
    }
}

impl<B: BusAdapter> Bh1750<B> {
    /// Write the opcodes of `command` and advance the recorded state
    fn issue(&mut self, command: Command) -> Result<(), SensorError> {
        if !self.state.accepts(command) {
            log_warn!("bh1750: {} rejected while powered down", command);
            return Err(SensorError::PoweredDown);
        }

        for opcode in command.opcodes() {
            log_trace!("bh1750 @{=u8:#x}: opcode {=u8:#x}", self.address, opcode);
            self.bus.write(self.address, &[opcode])?;
        }

        self.state = self.state.transition(command);
        self.armed = match command {
            Command::SetMode(mode) => mode.is_one_time(),
            Command::PowerDown | Command::SetMeasurementTime(_) => false,
            Command::PowerOn | Command::Reset => self.armed,
        };
        log_debug!("bh1750: {}", self.state);
        Ok(())
    }

    /// Power the device on or down
    ///
    /// The recorded mode survives a power cycle; the device's does not.
    pub fn power(&mut self, on: bool) -> Result<(), SensorError> {
        if on {
            self.issue(Command::PowerOn)
        } else {
            self.issue(Command::PowerDown)
        }
    }

    /// Power the device on
    pub fn power_on(&mut self) -> Result<(), SensorError> {
        self.power(true)
    }

    /// Power the device down
    pub fn power_down(&mut self) -> Result<(), SensorError> {
        self.power(false)
    }

    /// Clear the device data register
    pub fn reset(&mut self) -> Result<(), SensorError> {
        self.issue(Command::Reset)
    }

    /// Select continuous or one-time measurement at high or low resolution
    ///
    /// High resolution is the 1 lx mode. The 0.5 lx modes are only
    /// available through [`set_measurement_mode`](Self::set_measurement_mode).
    pub fn set_mode(
        &mut self,
        continuously: bool,
        high_resolution: bool,
    ) -> Result<(), SensorError> {
        let mode = Mode::from_flags(continuously, high_resolution);
        self.issue(Command::SetMode(mode))
    }

    /// Select any measuring mode
    ///
    /// [`Mode::PowerDown`] is not a measuring mode; use
    /// [`power`](Self::power) instead.
    pub fn set_measurement_mode(&mut self, mode: Mode) -> Result<(), SensorError> {
        if !mode.is_measuring() {
            return Err(SensorError::InvalidArgument);
        }
        self.issue(Command::SetMode(mode))
    }

    /// Change the measurement time register (31..=254, default 69)
    ///
    /// Sent as two opcodes. If the second write fails the device may hold
    /// a half-updated value while the record keeps the old one.
    ///
    /// In one-time modes the mode opcode follows, so the pending
    /// conversion runs with the new value.
    pub fn set_measurement_time(&mut self, value: u8) -> Result<(), SensorError> {
        let time = MeasurementTime::new(value).ok_or(SensorError::MeasurementTimeOutOfRange)?;
        self.issue(Command::SetMeasurementTime(time))?;

        let mode = self.state.mode();
        if mode.is_one_time() {
            self.issue(Command::SetMode(mode))?;
        }
        Ok(())
    }

    /// Apply a configuration
    ///
    /// Powers on, sets the measurement time, selects the mode and sets
    /// the accuracy, in that order. The address is fixed at construction
    /// and is not taken from `config`.
    pub fn configure(&mut self, config: &SensorConfig) -> Result<(), SensorError> {
        config.validate()?;
        self.power_on()?;
        self.issue(Command::SetMeasurementTime(config.measurement_time()?))?;
        self.issue(Command::SetMode(config.mode()))?;
        self.set_accuracy(config.accuracy);
        Ok(())
    }

    fn measuring_mode(&self) -> Result<Mode, SensorError> {
        if !self.state.is_powered() {
            return Err(SensorError::PoweredDown);
        }
        let mode = self.state.mode();
        if !mode.is_measuring() {
            return Err(SensorError::NoMeasurementMode);
        }
        Ok(mode)
    }

    /// Read the raw 16-bit count
    ///
    /// In one-time modes the mode opcode is sent again after the read to
    /// start the next conversion. A failure there does not discard the
    /// count; the next read sends the opcode before reading instead.
    pub fn read_raw(&mut self) -> Result<u16, SensorError> {
        let mode = self.measuring_mode()?;
        if mode.is_one_time() && !self.armed {
            self.issue(Command::SetMode(mode))?;
        }

        let bytes = self.bus.read(self.address, RESULT_LEN)?;
        let raw = match bytes[..] {
            [high, low] => u16::from_be_bytes([high, low]),
            _ => {
                log_warn!("bh1750: {=usize} byte result", bytes.len());
                return Err(SensorError::ConversionError);
            }
        };

        if mode.is_one_time() && self.issue(Command::SetMode(mode)).is_err() {
            log_warn!("bh1750: one-time restart failed");
            self.armed = false;
        }

        Ok(raw)
    }

    /// Read the current illuminance in lux
    ///
    /// `counts / scale_factor * accuracy`. Errors are returned as-is;
    /// a failed read never turns into a reading.
    pub fn read_lux(&mut self) -> Result<f32, SensorError> {
        let raw = self.read_raw()?;
        let current = self.state;
        state::raw_to_lux(raw, current.mode(), current.measurement_time(), self.accuracy)
            .ok_or(SensorError::NoMeasurementMode)
    }
}

impl<B: BusAdapter> LightSensor for Bh1750<B> {
    fn read_lux(&mut self) -> Result<f32, SensorError> {
        Bh1750::read_lux(self)
    }

    fn conversion_cycle_time_ms(&self) -> u32 {
        Bh1750::conversion_cycle_time_ms(self)
    }
}

/// Endless stream of readings
///
/// Every `next()` is one [`Bh1750::read_lux`]; it never returns `None`
/// and never sleeps. Iterate over `&mut sensor` to keep the driver
/// usable after the loop ends.
impl<B: BusAdapter> Iterator for Bh1750<B> {
    type Item = Result<f32, SensorError>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.read_lux())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}
