//! Measurement modes and the arithmetic derived from them
//!
//! Conversion time and raw-to-lux scaling are pure functions of the
//! current mode and measurement time register. They are recomputed on
//! every call and never cached.

use crate::opcode;

/// Default measurement time register value
pub const MTREG_DEFAULT: u8 = 69;
/// Smallest accepted measurement time register value
pub const MTREG_MIN: u8 = 31;
/// Largest accepted measurement time register value
pub const MTREG_MAX: u8 = 254;

/// Counts per lux at the default measurement time, times 10
const COUNTS_PER_LUX_X10: u32 = 12;

/// Measurement resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resolution {
    /// 4 lx steps
    Low,
    /// 1 lx steps
    High,
    /// 0.5 lx steps
    High2,
}

impl Resolution {
    /// Typical conversion time at the default measurement time
    pub const fn typical_cycle_ms(self) -> u32 {
        match self {
            Resolution::Low => 16,
            Resolution::High | Resolution::High2 => 120,
        }
    }

    /// Extra divisor applied on top of the counts-per-lux ratio
    const fn divisor(self) -> u32 {
        match self {
            Resolution::High2 => 2,
            Resolution::Low | Resolution::High => 1,
        }
    }
}

/// Device mode as last commanded by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    #[default]
    PowerDown,
    OneTimeLowRes,
    OneTimeHighRes,
    OneTimeHighRes2,
    ContinuousLowRes,
    ContinuousHighRes,
    ContinuousHighRes2,
}

impl Mode {
    /// Map the two mode flags to a mode
    ///
    /// High resolution always selects the 1 lx variant. The 0.5 lx
    /// variants are only reachable by naming the mode directly.
    pub const fn from_flags(continuously: bool, high_resolution: bool) -> Self {
        match (continuously, high_resolution) {
            (true, true) => Mode::ContinuousHighRes,
            (true, false) => Mode::ContinuousLowRes,
            (false, true) => Mode::OneTimeHighRes,
            (false, false) => Mode::OneTimeLowRes,
        }
    }

    /// Opcode that selects this mode
    pub const fn opcode(self) -> u8 {
        match self {
            Mode::PowerDown => opcode::POWER_DOWN,
            Mode::OneTimeLowRes => opcode::ONE_TIME_LOW_RES,
            Mode::OneTimeHighRes => opcode::ONE_TIME_HIGH_RES,
            Mode::OneTimeHighRes2 => opcode::ONE_TIME_HIGH_RES2,
            Mode::ContinuousLowRes => opcode::CONTINUOUS_LOW_RES,
            Mode::ContinuousHighRes => opcode::CONTINUOUS_HIGH_RES,
            Mode::ContinuousHighRes2 => opcode::CONTINUOUS_HIGH_RES2,
        }
    }

    /// Resolution of a measuring mode, `None` for power down
    pub const fn resolution(self) -> Option<Resolution> {
        match self {
            Mode::PowerDown => None,
            Mode::OneTimeLowRes | Mode::ContinuousLowRes => Some(Resolution::Low),
            Mode::OneTimeHighRes | Mode::ContinuousHighRes => Some(Resolution::High),
            Mode::OneTimeHighRes2 | Mode::ContinuousHighRes2 => Some(Resolution::High2),
        }
    }

    /// Check if the device keeps converting without further commands
    pub const fn is_continuous(self) -> bool {
        matches!(
            self,
            Mode::ContinuousLowRes | Mode::ContinuousHighRes | Mode::ContinuousHighRes2
        )
    }

    /// Check if the device converts once per command
    pub const fn is_one_time(self) -> bool {
        matches!(
            self,
            Mode::OneTimeLowRes | Mode::OneTimeHighRes | Mode::OneTimeHighRes2
        )
    }

    /// Check if this mode produces measurements
    pub const fn is_measuring(self) -> bool {
        !matches!(self, Mode::PowerDown)
    }
}

/// Measurement time register value (MTreg)
///
/// Scales both sensitivity and conversion time linearly. Always within
/// `MTREG_MIN..=MTREG_MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MeasurementTime(u8);

impl Default for MeasurementTime {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl MeasurementTime {
    /// Power-on value of the register
    pub const DEFAULT: Self = Self(MTREG_DEFAULT);

    /// Validate a register value
    pub const fn new(value: u8) -> Option<Self> {
        if value >= MTREG_MIN && value <= MTREG_MAX {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Raw register value
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Opcode carrying bits 7..5
    pub const fn high_bits_opcode(self) -> u8 {
        opcode::MTREG_HIGH | (self.0 >> 5)
    }

    /// Opcode carrying bits 4..0
    pub const fn low_bits_opcode(self) -> u8 {
        opcode::MTREG_LOW | (self.0 & 0x1F)
    }

    /// Check if the register holds its power-on value
    pub const fn is_default(self) -> bool {
        self.0 == MTREG_DEFAULT
    }
}

/// Typical time for one conversion in `mode`, in milliseconds
///
/// Zero when powered down. Scales by `mtreg / 69`, rounded up so that
/// waiting this long never cuts a conversion short.
pub const fn conversion_cycle_time_ms(mode: Mode, time: MeasurementTime) -> u32 {
    match mode.resolution() {
        None => 0,
        Some(resolution) => {
            (resolution.typical_cycle_ms() * time.value() as u32).div_ceil(MTREG_DEFAULT as u32)
        }
    }
}

/// Raw counts per lux in `mode`
///
/// 1.2 at the default measurement time, doubled for the 0.5 lx modes,
/// scaled by `mtreg / 69`. `None` when powered down.
pub fn scale_factor(mode: Mode, time: MeasurementTime) -> Option<f32> {
    let resolution = mode.resolution()?;
    let numerator = COUNTS_PER_LUX_X10 * time.value() as u32 * resolution.divisor();
    let denominator = 10 * MTREG_DEFAULT as u32;
    Some(numerator as f32 / denominator as f32)
}

/// Convert a raw count to calibrated lux
///
/// Computed as `raw * 690 / (12 * mtreg * divisor) * accuracy` in f64 so
/// the default-time results are exact. `None` when powered down.
pub fn raw_to_lux(raw: u16, mode: Mode, time: MeasurementTime, accuracy: f32) -> Option<f32> {
    let resolution = mode.resolution()?;
    let numerator = raw as f64 * (10 * MTREG_DEFAULT as u32) as f64;
    let denominator = (COUNTS_PER_LUX_X10 * time.value() as u32 * resolution.divisor()) as f64;
    Some((numerator / denominator * accuracy as f64) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_flags_to_mode() {
        assert_eq!(Mode::from_flags(true, true), Mode::ContinuousHighRes);
        assert_eq!(Mode::from_flags(true, false), Mode::ContinuousLowRes);
        assert_eq!(Mode::from_flags(false, true), Mode::OneTimeHighRes);
        assert_eq!(Mode::from_flags(false, false), Mode::OneTimeLowRes);
    }

    #[test]
    fn test_opcodes_match_datasheet() {
        assert_eq!(Mode::PowerDown.opcode(), 0x00);
        assert_eq!(Mode::ContinuousHighRes.opcode(), 0x10);
        assert_eq!(Mode::ContinuousHighRes2.opcode(), 0x11);
        assert_eq!(Mode::ContinuousLowRes.opcode(), 0x13);
        assert_eq!(Mode::OneTimeHighRes.opcode(), 0x20);
        assert_eq!(Mode::OneTimeHighRes2.opcode(), 0x21);
        assert_eq!(Mode::OneTimeLowRes.opcode(), 0x23);
    }

    #[test]
    fn test_cycle_time_per_flags() {
        let t = MeasurementTime::DEFAULT;
        assert_eq!(conversion_cycle_time_ms(Mode::from_flags(true, true), t), 120);
        assert_eq!(conversion_cycle_time_ms(Mode::from_flags(false, true), t), 120);
        assert_eq!(conversion_cycle_time_ms(Mode::from_flags(true, false), t), 16);
        assert_eq!(conversion_cycle_time_ms(Mode::from_flags(false, false), t), 16);
        assert_eq!(conversion_cycle_time_ms(Mode::PowerDown, t), 0);
    }

    #[test]
    fn test_cycle_time_scales_with_mtreg() {
        let max = MeasurementTime::new(254).unwrap();
        let min = MeasurementTime::new(31).unwrap();
        // 120 * 254 / 69 = 441.7
        assert_eq!(conversion_cycle_time_ms(Mode::ContinuousHighRes, max), 442);
        // 120 * 31 / 69 = 53.9
        assert_eq!(conversion_cycle_time_ms(Mode::ContinuousHighRes, min), 54);
        // 16 * 138 / 69 = 32, exact
        let double = MeasurementTime::new(138).unwrap();
        assert_eq!(conversion_cycle_time_ms(Mode::OneTimeLowRes, double), 32);
    }

    #[test]
    fn test_cycle_time_never_undershoots() {
        // 16 * 100 / 69 = 23.2
        let t = MeasurementTime::new(100).unwrap();
        assert_eq!(conversion_cycle_time_ms(Mode::ContinuousLowRes, t), 24);

        for v in MTREG_MIN..=MTREG_MAX {
            let t = MeasurementTime::new(v).unwrap();
            let cycle = conversion_cycle_time_ms(Mode::OneTimeHighRes, t);
            assert!(cycle as f64 >= 120.0 * v as f64 / 69.0);
            assert!((cycle as f64) < 120.0 * v as f64 / 69.0 + 1.0);
        }
    }

    #[test]
    fn test_measurement_time_bounds() {
        assert!(MeasurementTime::new(30).is_none());
        assert!(MeasurementTime::new(31).is_some());
        assert!(MeasurementTime::new(254).is_some());
        assert!(MeasurementTime::new(255).is_none());
        assert!(MeasurementTime::default().is_default());
    }

    #[test]
    fn test_measurement_time_opcodes() {
        // 69 = 0b010_00101
        let t = MeasurementTime::DEFAULT;
        assert_eq!(t.high_bits_opcode(), 0x42);
        assert_eq!(t.low_bits_opcode(), 0x65);

        let t = MeasurementTime::new(254).unwrap();
        assert_eq!(t.high_bits_opcode(), 0x47);
        assert_eq!(t.low_bits_opcode(), 0x7E);
    }

    #[test]
    fn test_scale_factor_nominal() {
        let t = MeasurementTime::DEFAULT;
        let high = scale_factor(Mode::ContinuousHighRes, t).unwrap();
        let high2 = scale_factor(Mode::ContinuousHighRes2, t).unwrap();
        assert!((high - 1.2).abs() < 1e-6);
        assert!((high2 - 2.4).abs() < 1e-6);
        assert!(scale_factor(Mode::PowerDown, t).is_none());
    }

    #[test]
    fn test_raw_to_lux_reference_points() {
        let t = MeasurementTime::DEFAULT;
        assert_eq!(raw_to_lux(1200, Mode::ContinuousHighRes, t, 1.0), Some(1000.0));
        assert_eq!(raw_to_lux(0xFFFF, Mode::ContinuousHighRes, t, 1.0), Some(54612.5));
        assert_eq!(raw_to_lux(1200, Mode::ContinuousHighRes2, t, 1.0), Some(500.0));
        assert_eq!(raw_to_lux(1200, Mode::PowerDown, t, 1.0), None);
    }

    proptest! {
        #[test]
        fn prop_derived_values_are_pure(v in MTREG_MIN..=MTREG_MAX, continuous in any::<bool>(), high in any::<bool>()) {
            let mode = Mode::from_flags(continuous, high);
            let t = MeasurementTime::new(v).unwrap();
            prop_assert_eq!(conversion_cycle_time_ms(mode, t), conversion_cycle_time_ms(mode, t));
            prop_assert_eq!(scale_factor(mode, t), scale_factor(mode, t));
        }

        #[test]
        fn prop_zero_counts_is_zero_lux(v in MTREG_MIN..=MTREG_MAX, accuracy in 0.5f32..2.0) {
            let t = MeasurementTime::new(v).unwrap();
            prop_assert_eq!(raw_to_lux(0, Mode::ContinuousHighRes, t, accuracy), Some(0.0));
        }

        #[test]
        fn prop_lux_matches_scale_factor(raw in any::<u16>(), v in MTREG_MIN..=MTREG_MAX) {
            let t = MeasurementTime::new(v).unwrap();
            let lux = raw_to_lux(raw, Mode::OneTimeHighRes2, t, 1.0).unwrap();
            let scale = scale_factor(Mode::OneTimeHighRes2, t).unwrap();
            let expected = raw as f32 / scale;
            prop_assert!((lux - expected).abs() <= expected * 1e-5 + 1e-3);
        }
    }
}
