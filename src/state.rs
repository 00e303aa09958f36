//! Measurement state and raw-to-lux conversion

use crate::ll::{Mode, DEFAULT_MTREG};

/// Conversion factor from counts to lux.
///
/// Typical value from the datasheet, the per-device value ranges from 0.96
/// to 1.44 (datasheet p.2, Measurement Accuracy).
pub const CONVERSION_FACTOR: f32 = 1.2;

/// Measurement time budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum MeasurementWait {
    /// Typical measurement time (16 ms low resolution, 120 ms high resolution)
    #[default]
    Typical,
    /// Maximum measurement time (24 ms low resolution, 180 ms high resolution)
    Maximum,
}

/// Scale a default-MTreg duration to `mtreg`
pub(crate) const fn scale_ms(time_ms: u32, mtreg: u8) -> u32 {
    time_ms * mtreg as u32 / DEFAULT_MTREG as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct State {
    pub mode: Option<Mode>,
    pub mtreg: u8,
    pub last_read_ms: u64,
}

impl State {
    pub const fn new() -> Self {
        Self {
            mode: None,
            mtreg: DEFAULT_MTREG,
            last_read_ms: 0,
        }
    }

    /// Conversion time of the current mode, zero when unconfigured
    pub fn measurement_time_ms(&self, wait: MeasurementWait) -> u32 {
        match self.mode {
            Some(mode) => scale_ms(mode.time_ms(wait), self.mtreg),
            None => 0,
        }
    }

    /// Wait needed after an MTreg change before continuous results are valid
    pub fn settle_time_ms(&self) -> u32 {
        match self.mode {
            Some(mode) if !mode.is_one_shot() => scale_ms(mode.max_time_ms(), self.mtreg),
            _ => 0,
        }
    }

    pub fn is_ready(&self, now_ms: u64, wait: MeasurementWait) -> bool {
        now_ms.saturating_sub(self.last_read_ms) >= u64::from(self.measurement_time_ms(wait))
    }
}

/// Convert a raw 16-bit measurement to lux
pub fn raw_to_lux(raw: u16, mode: Mode, mtreg: u8) -> f32 {
    log::debug!("Raw value: {}", raw);

    let mut level = f32::from(raw);
    if mtreg != DEFAULT_MTREG {
        let factor = f32::from(DEFAULT_MTREG) / f32::from(mtreg);
        log::debug!("MTreg factor: {}", factor);
        level *= factor;
    }
    if mode.is_high_res_2() {
        level /= 2.0;
    }
    level /= CONVERSION_FACTOR;

    log::debug!("Converted value: {}", level);
    level
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        a > b - 0.01 && a < b + 0.01
    }

    #[test]
    fn test_lux_high_res() {
        let lux = raw_to_lux(u16::from_be_bytes([0x03, 0xE8]), Mode::OneTimeHighRes, 69);
        assert!(approx_eq(lux, 833.33), "got {}", lux);
    }

    #[test]
    fn test_lux_high_res_2_is_halved() {
        let lux = raw_to_lux(1000, Mode::ContinuousHighRes2, 69);
        assert!(approx_eq(lux, 416.67), "got {}", lux);
    }

    #[test]
    fn test_lux_mtreg_correction() {
        let lux = raw_to_lux(1000, Mode::OneTimeHighRes2, 34);
        let expected = 1000.0 * (69.0 / 34.0) / 2.0 / 1.2;
        assert!(approx_eq(lux, expected), "got {}", lux);
    }

    #[test]
    fn test_lux_full_scale() {
        let lux = raw_to_lux(u16::MAX, Mode::ContinuousHighRes, 69);
        assert!(approx_eq(lux, 54612.5), "got {}", lux);
    }

    #[test]
    fn test_measurement_time_scaling() {
        let mut state = State::new();
        assert_eq!(state.measurement_time_ms(MeasurementWait::Maximum), 0);

        state.mode = Some(Mode::ContinuousLowRes);
        assert_eq!(state.measurement_time_ms(MeasurementWait::Typical), 16);
        assert_eq!(state.measurement_time_ms(MeasurementWait::Maximum), 24);

        state.mode = Some(Mode::OneTimeHighRes);
        state.mtreg = 138;
        assert_eq!(state.measurement_time_ms(MeasurementWait::Typical), 240);
        state.mtreg = 31;
        // 120 * 31 / 69, truncated
        assert_eq!(state.measurement_time_ms(MeasurementWait::Typical), 53);
    }

    #[test]
    fn test_settle_time_only_for_continuous_modes() {
        let mut state = State::new();
        assert_eq!(state.settle_time_ms(), 0);
        state.mode = Some(Mode::OneTimeLowRes);
        assert_eq!(state.settle_time_ms(), 0);
        state.mode = Some(Mode::ContinuousLowRes);
        assert_eq!(state.settle_time_ms(), 24);
        state.mode = Some(Mode::ContinuousHighRes2);
        state.mtreg = 254;
        assert_eq!(state.settle_time_ms(), 180 * 254 / 69);
    }

    #[test]
    fn test_readiness_window() {
        let mut state = State::new();
        state.mode = Some(Mode::ContinuousHighRes);
        state.last_read_ms = 1_000;
        assert!(!state.is_ready(1_000, MeasurementWait::Typical));
        assert!(!state.is_ready(1_119, MeasurementWait::Typical));
        assert!(state.is_ready(1_120, MeasurementWait::Typical));
        assert!(!state.is_ready(1_120, MeasurementWait::Maximum));
        assert!(state.is_ready(1_180, MeasurementWait::Maximum));
    }

    #[test]
    fn test_clock_behind_last_read_is_not_ready() {
        let mut state = State::new();
        state.mode = Some(Mode::OneTimeLowRes);
        state.last_read_ms = 500;
        assert!(!state.is_ready(10, MeasurementWait::Typical));
    }
}
