//! Configuration type definitions
//!
//! These types describe how a sensor should be brought up. They are
//! plain data; the driver applies them with `Bh1750::configure`.

use serde::{Deserialize, Serialize};

use crate::opcode;
use crate::state::{MeasurementTime, Mode, MTREG_DEFAULT};

/// Highest 7-bit bus address
const MAX_ADDRESS: u8 = 0x7F;

/// Configuration validation error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Measurement time register outside 31..=254
    MeasurementTimeOutOfRange,
    /// Accuracy multiplier is not a positive finite number
    InvalidAccuracy,
    /// Custom address does not fit in 7 bits
    InvalidAddress,
}

/// Sensor bus address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Address {
    /// ADDR pin low (0x23)
    #[default]
    Low,
    /// ADDR pin high (0x5C)
    High,
    /// Modified board with a non-standard address
    Custom(u8),
}

impl Address {
    /// 7-bit bus address
    pub const fn value(self) -> u8 {
        match self {
            Address::Low => opcode::ADDRESS_LOW,
            Address::High => opcode::ADDRESS_HIGH,
            Address::Custom(addr) => addr,
        }
    }
}

/// Sensor bring-up configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorConfig {
    /// Bus address
    pub address: Address,
    /// Continuous (true) or one-time (false) measurement
    pub continuously: bool,
    /// 1 lx (true) or 4 lx (false) resolution
    pub high_resolution: bool,
    /// Calibration multiplier (datasheet typical 0.96 to 1.44)
    pub accuracy: f32,
    /// Measurement time register value
    pub measurement_time: u8,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            address: Address::Low,
            continuously: true,
            high_resolution: true,
            accuracy: 1.0,
            measurement_time: MTREG_DEFAULT,
        }
    }
}

impl SensorConfig {
    /// Mode selected by the two flags
    pub const fn mode(&self) -> Mode {
        Mode::from_flags(self.continuously, self.high_resolution)
    }

    /// Validated measurement time
    pub fn measurement_time(&self) -> Result<MeasurementTime, ConfigError> {
        MeasurementTime::new(self.measurement_time).ok_or(ConfigError::MeasurementTimeOutOfRange)
    }

    /// Check the configuration before applying it
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.measurement_time()?;

        if !self.accuracy.is_finite() || self.accuracy <= 0.0 {
            return Err(ConfigError::InvalidAccuracy);
        }

        if self.address.value() > MAX_ADDRESS {
            return Err(ConfigError::InvalidAddress);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SensorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.mode(), Mode::ContinuousHighRes);
        assert_eq!(config.address.value(), 0x23);
    }

    #[test]
    fn test_address_values() {
        assert_eq!(Address::Low.value(), 0x23);
        assert_eq!(Address::High.value(), 0x5C);
        assert_eq!(Address::Custom(0x29).value(), 0x29);
    }

    #[test]
    fn test_invalid_measurement_time() {
        let config = SensorConfig {
            measurement_time: 20,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::MeasurementTimeOutOfRange));
    }

    #[test]
    fn test_invalid_accuracy() {
        for accuracy in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let config = SensorConfig {
                accuracy,
                ..Default::default()
            };
            assert_eq!(config.validate(), Err(ConfigError::InvalidAccuracy));
        }
    }

    #[test]
    fn test_invalid_address() {
        let config = SensorConfig {
            address: Address::Custom(0x80),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidAddress));
    }
}
