//! Low-level instruction set definitions for the BH1750
//!
//! The BH1750 has no addressable registers. Every command is a single
//! instruction byte written to the device, and a measurement result is read
//! back as two bytes, high byte first.

use crate::{MeasurementWait, WriteSteps};

/// I2C address of the BH1750 with the ADDR pin low or floating
pub const DEFAULT_ADDRESS: u8 = 0x23;

/// I2C address of the BH1750 with the ADDR pin high
pub const ALT_ADDRESS: u8 = 0x5C;

/// Default measurement time register (MTreg) value
pub const DEFAULT_MTREG: u8 = 69;

/// Smallest accepted MTreg value
pub const MTREG_MIN: u8 = 31;

/// Largest accepted MTreg value
pub const MTREG_MAX: u8 = 254;

// Instruction opcodes
pub(crate) const POWER_DOWN: u8 = 0x00;
pub(crate) const POWER_ON: u8 = 0x01;
pub(crate) const RESET: u8 = 0x07;
const MTREG_HIGH: u8 = 0b0100_0000; // 01000_MT[7,6,5]
const MTREG_LOW: u8 = 0b0110_0000; // 011_MT[4,3,2,1,0]

/// Warm-up time after a mode instruction, in milliseconds
pub(crate) const WAKEUP_DELAY_MS: u32 = 10;

/// Measurement modes of the BH1750
///
/// The discriminant is the instruction byte that selects the mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[repr(u8)]
pub enum Mode {
    /// Continuous measurement at 1 lx resolution, 120 ms typical
    ContinuousHighRes = 0x10,
    /// Continuous measurement at 0.5 lx resolution, 120 ms typical
    ContinuousHighRes2 = 0x11,
    /// Continuous measurement at 4 lx resolution, 16 ms typical
    ContinuousLowRes = 0x13,
    /// Single measurement at 1 lx resolution, then power down
    OneTimeHighRes = 0x20,
    /// Single measurement at 0.5 lx resolution, then power down
    OneTimeHighRes2 = 0x21,
    /// Single measurement at 4 lx resolution, then power down
    OneTimeLowRes = 0x23,
}

impl Mode {
    /// Instruction byte selecting this mode
    pub const fn opcode(self) -> u8 {
        self as u8
    }

    /// True for modes where the sensor powers down after one measurement
    pub const fn is_one_shot(self) -> bool {
        matches!(
            self,
            Mode::OneTimeHighRes | Mode::OneTimeHighRes2 | Mode::OneTimeLowRes
        )
    }

    /// True for the 0.5 lx resolution modes, which double the raw count
    pub const fn is_high_res_2(self) -> bool {
        matches!(self, Mode::ContinuousHighRes2 | Mode::OneTimeHighRes2)
    }

    /// True for the 4 lx resolution modes
    pub const fn is_low_res(self) -> bool {
        matches!(self, Mode::ContinuousLowRes | Mode::OneTimeLowRes)
    }

    /// Typical measurement time at the default MTreg, in milliseconds
    pub const fn nominal_time_ms(self) -> u32 {
        if self.is_low_res() {
            16
        } else {
            120
        }
    }

    /// Maximum measurement time at the default MTreg, in milliseconds
    pub const fn max_time_ms(self) -> u32 {
        if self.is_low_res() {
            24
        } else {
            180
        }
    }

    /// Measurement time at the default MTreg for the given wait budget
    pub const fn time_ms(self, wait: MeasurementWait) -> u32 {
        match wait {
            MeasurementWait::Typical => self.nominal_time_ms(),
            MeasurementWait::Maximum => self.max_time_ms(),
        }
    }
}

impl From<Mode> for u8 {
    fn from(mode: Mode) -> Self {
        mode.opcode()
    }
}

impl TryFrom<u8> for Mode {
    /// The rejected instruction byte
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0x10 => Ok(Mode::ContinuousHighRes),
            0x11 => Ok(Mode::ContinuousHighRes2),
            0x13 => Ok(Mode::ContinuousLowRes),
            0x20 => Ok(Mode::OneTimeHighRes),
            0x21 => Ok(Mode::OneTimeHighRes2),
            0x23 => Ok(Mode::OneTimeLowRes),
            other => Err(other),
        }
    }
}

/// Instruction bytes that program `mtreg` and then re-assert `mode`.
///
/// Without a mode the device is sent back to power down.
pub(crate) const fn timing_sequence(mtreg: u8, mode: Option<Mode>) -> [(WriteSteps, u8); 3] {
    let mode_byte = match mode {
        Some(mode) => mode.opcode(),
        None => POWER_DOWN,
    };
    [
        (WriteSteps::HIGH_BITS, MTREG_HIGH | (mtreg >> 5)),
        (WriteSteps::LOW_BITS, MTREG_LOW | (mtreg & 0b1_1111)),
        (WriteSteps::MODE, mode_byte),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_opcodes_round_trip() {
        for mode in [
            Mode::ContinuousHighRes,
            Mode::ContinuousHighRes2,
            Mode::ContinuousLowRes,
            Mode::OneTimeHighRes,
            Mode::OneTimeHighRes2,
            Mode::OneTimeLowRes,
        ] {
            assert_eq!(Mode::try_from(mode.opcode()), Ok(mode));
        }
    }

    #[test]
    fn test_unknown_opcodes_rejected() {
        for code in [POWER_DOWN, POWER_ON, RESET, 0x12, 0x22, 0x40, 0xFF] {
            assert_eq!(Mode::try_from(code), Err(code));
        }
    }

    #[test]
    fn test_mode_timing() {
        assert_eq!(Mode::ContinuousLowRes.nominal_time_ms(), 16);
        assert_eq!(Mode::OneTimeLowRes.max_time_ms(), 24);
        assert_eq!(Mode::OneTimeHighRes2.nominal_time_ms(), 120);
        assert_eq!(Mode::ContinuousHighRes.time_ms(MeasurementWait::Maximum), 180);
    }

    #[test]
    fn test_timing_sequence_default_mtreg() {
        // 69 = 0b010_00101
        let sequence = timing_sequence(DEFAULT_MTREG, Some(Mode::ContinuousHighRes));
        assert_eq!(sequence[0], (WriteSteps::HIGH_BITS, 0b0100_0010));
        assert_eq!(sequence[1], (WriteSteps::LOW_BITS, 0b0110_0101));
        assert_eq!(sequence[2], (WriteSteps::MODE, 0x10));
    }

    #[test]
    fn test_timing_sequence_unconfigured_powers_down() {
        let sequence = timing_sequence(MTREG_MAX, None);
        assert_eq!(sequence[0].1, 0x47);
        assert_eq!(sequence[1].1, 0x7E);
        assert_eq!(sequence[2].1, POWER_DOWN);
    }
}
