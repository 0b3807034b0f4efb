//! Sensor calibration record
//!
//! Stores the per-unit accuracy multiplier and measurement time so they
//! survive a reboot. The record is serialized with postcard and guarded
//! by a magic number, a version and a CRC32.

use serde::{Deserialize, Serialize};

use super::types::{ConfigError, SensorConfig};
use crate::state::MeasurementTime;

/// Magic number to identify valid calibration data
pub const CALIBRATION_MAGIC: u32 = 0x4C55_5843; // "LUXC"

/// Current calibration data version
pub const CALIBRATION_VERSION: u8 = 1;

/// Upper bound on the encoded size of a record
pub const CALIBRATION_MAX_LEN: usize = 24;

/// Calibration encode/decode error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationError {
    /// Output buffer too small
    Encode,
    /// Bytes are not a calibration record
    Decode,
    /// Magic, version, CRC or values do not check out
    Invalid,
}

/// Calibration data for one sensor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorCalibration {
    /// Magic number for validation
    pub magic: u32,
    /// Data format version
    pub version: u8,
    /// Accuracy multiplier
    pub accuracy: f32,
    /// Measurement time register value
    pub measurement_time: u8,
    /// CRC32 checksum (calculated over magic..measurement_time)
    pub crc: u32,
}

impl Default for SensorCalibration {
    fn default() -> Self {
        Self::new(1.0, MeasurementTime::DEFAULT)
    }
}

impl SensorCalibration {
    /// Create a record with a valid CRC
    pub fn new(accuracy: f32, measurement_time: MeasurementTime) -> Self {
        let mut cal = Self {
            magic: CALIBRATION_MAGIC,
            version: CALIBRATION_VERSION,
            accuracy,
            measurement_time: measurement_time.value(),
            crc: 0,
        };
        cal.update_crc();
        cal
    }

    /// Capture the calibration part of a configuration
    ///
    /// The configuration must validate; a record is never built from
    /// out-of-range values.
    pub fn from_config(config: &SensorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config.accuracy, config.measurement_time()?))
    }

    /// Check header, CRC and value ranges
    pub fn is_valid(&self) -> bool {
        self.magic == CALIBRATION_MAGIC
            && self.version == CALIBRATION_VERSION
            && self.verify_crc()
            && MeasurementTime::new(self.measurement_time).is_some()
            && self.accuracy.is_finite()
            && self.accuracy > 0.0
    }

    /// Overwrite the calibration fields of a configuration
    pub fn apply_to(&self, config: &mut SensorConfig) {
        config.accuracy = self.accuracy;
        config.measurement_time = self.measurement_time;
    }

    /// Calculate CRC32 for the data (excluding the crc field itself)
    pub fn calculate_crc(&self) -> u32 {
        let mut crc: u32 = 0xFFFFFFFF;

        crc = crc32_update(crc, &self.magic.to_le_bytes());
        crc = crc32_update(crc, &[self.version]);
        crc = crc32_update(crc, &self.accuracy.to_le_bytes());
        crc = crc32_update(crc, &[self.measurement_time]);

        !crc
    }

    /// Update the CRC field
    pub fn update_crc(&mut self) {
        self.crc = self.calculate_crc();
    }

    /// Verify the CRC is correct
    pub fn verify_crc(&self) -> bool {
        self.crc == self.calculate_crc()
    }

    /// Serialize into `buf`, returning the used part
    pub fn encode<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], CalibrationError> {
        postcard::to_slice(self, buf).map_err(|_| CalibrationError::Encode)
    }

    /// Deserialize and validate a record
    pub fn decode(bytes: &[u8]) -> Result<Self, CalibrationError> {
        let cal: Self = postcard::from_bytes(bytes).map_err(|_| CalibrationError::Decode)?;
        if cal.is_valid() {
            Ok(cal)
        } else {
            Err(CalibrationError::Invalid)
        }
    }
}

/// Simple CRC32 update function (IEEE 802.3 polynomial)
fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB88320;
    let mut crc = crc;

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}
