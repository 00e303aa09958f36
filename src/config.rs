//! Driver configuration

use crate::ll::DEFAULT_ADDRESS;

/// Runtime configuration of a [`Bh1750`](crate::Bh1750) driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct Config {
    /// 7-bit I2C address of the sensor
    pub address: u8,
    /// Re-send the mode instruction on blocking reads in continuous modes.
    ///
    /// One-shot modes are always re-triggered by a blocking read.
    pub retrigger_continuous: bool,
    /// Program the default MTreg after the mode in `begin`
    pub apply_default_timing_on_begin: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            address: DEFAULT_ADDRESS,
            retrigger_continuous: false,
            apply_default_timing_on_begin: true,
        }
    }
}

impl Config {
    /// Use a different I2C address
    pub const fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Set the continuous-mode re-trigger policy
    pub const fn with_retrigger_continuous(mut self, retrigger: bool) -> Self {
        self.retrigger_continuous = retrigger;
        self
    }

    /// Choose whether `begin` resets the MTreg to its default
    pub const fn with_default_timing_on_begin(mut self, apply: bool) -> Self {
        self.apply_default_timing_on_begin = apply;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ll::ALT_ADDRESS;

    #[test]
    fn test_builder() {
        let config = Config::default()
            .with_address(ALT_ADDRESS)
            .with_retrigger_continuous(true)
            .with_default_timing_on_begin(false);
        assert_eq!(config.address, 0x5C);
        assert!(config.retrigger_continuous);
        assert!(!config.apply_default_timing_on_begin);
        assert_eq!(Config::default().address, 0x23);
    }
}
