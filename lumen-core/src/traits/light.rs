//! Light sensor trait and errors

use lumen_hal::BusError;

use crate::config::ConfigError;

/// Errors that can occur with light sensing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Bus transaction failed, passed through unchanged
    Bus(BusError),
    /// Malformed request to the bus adapter
    InvalidArgument,
    /// Measurement response was short or malformed
    ConversionError,
    /// Device-facing call made while the device is powered down
    PoweredDown,
    /// Measurement requested before a measuring mode was selected
    NoMeasurementMode,
    /// Measurement time register value outside 31..=254
    MeasurementTimeOutOfRange,
}

impl From<lumen_hal::Error> for SensorError {
    fn from(e: lumen_hal::Error) -> Self {
        match e {
            lumen_hal::Error::Bus(bus) => SensorError::Bus(bus),
            lumen_hal::Error::InvalidArgument => SensorError::InvalidArgument,
        }
    }
}

impl From<ConfigError> for SensorError {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::MeasurementTimeOutOfRange => SensorError::MeasurementTimeOutOfRange,
            ConfigError::InvalidAccuracy | ConfigError::InvalidAddress => {
                SensorError::InvalidArgument
            }
        }
    }
}

/// Trait for ambient light sensors
///
/// Measurements are pulled by the caller. Implementations never sleep;
/// the caller waits [`conversion_cycle_time_ms`](Self::conversion_cycle_time_ms)
/// between reads or risks getting the previous conversion again.
pub trait LightSensor {
    /// Read the current illuminance in lux
    ///
    /// Takes `&mut self` because reads go over the bus.
    fn read_lux(&mut self) -> Result<f32, SensorError>;

    /// Time one conversion takes in the current configuration
    fn conversion_cycle_time_ms(&self) -> u32;

    /// Check if the sensor answers with a valid reading
    fn is_valid(&mut self) -> bool {
        self.read_lux().is_ok()
    }
}
