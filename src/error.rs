//! Error types

use core::fmt::Debug;

use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

/// Sentinel lux value reported for a driver that was never configured
pub const NOT_CONFIGURED_LUX: f32 = -2.0;

/// Sentinel lux value reported when the bus returned no measurement
pub const NO_VALID_READING_LUX: f32 = -1.0;

/// Classification of a failed bus transaction
///
/// The variants follow the classic two-wire transaction status codes
/// (1 to 4, anything else undefined).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum BusFault {
    /// Data too long for the transmit buffer (status 1)
    #[error("Data are too long for transmit buffer")]
    TransmitBufferOverflow,
    /// NACK on transmit of the address, the device is absent (status 2)
    #[error("Received NACK on transmit of address")]
    AddressNack,
    /// NACK on transmit of data, the device rejected the instruction (status 3)
    #[error("Received NACK on transmit of data")]
    DataNack,
    /// Any other bus error (status 4)
    #[error("Other error of the bus")]
    Other,
    /// A failure that does not fit the categories above
    #[error("Undefined error of the bus")]
    Undefined,
}

impl BusFault {
    /// Classify an embedded-hal I2C error kind
    pub fn from_kind(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Overrun => BusFault::TransmitBufferOverflow,
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address) => BusFault::AddressNack,
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data) => BusFault::DataNack,
            ErrorKind::Bus | ErrorKind::ArbitrationLoss | ErrorKind::Other => BusFault::Other,
            _ => BusFault::Undefined,
        }
    }

    /// Classify a HAL error
    pub fn of<E: embedded_hal::i2c::Error>(error: &E) -> Self {
        Self::from_kind(error.kind())
    }

    /// Map a raw transaction status code, `None` meaning success
    pub const fn from_status(status: u8) -> Option<Self> {
        match status {
            0 => None,
            1 => Some(BusFault::TransmitBufferOverflow),
            2 => Some(BusFault::AddressNack),
            3 => Some(BusFault::DataNack),
            4 => Some(BusFault::Other),
            _ => Some(BusFault::Undefined),
        }
    }

    /// Transaction status code of this fault, if it has one
    pub const fn status_code(self) -> Option<u8> {
        match self {
            BusFault::TransmitBufferOverflow => Some(1),
            BusFault::AddressNack => Some(2),
            BusFault::DataNack => Some(3),
            BusFault::Other => Some(4),
            BusFault::Undefined => None,
        }
    }
}

bitflags::bitflags! {
    /// Sub-writes of the MTreg programming sequence
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WriteSteps: u8 {
        /// Upper three MTreg bits
        const HIGH_BITS = 0b001;
        /// Lower five MTreg bits
        const LOW_BITS = 0b010;
        /// Re-asserted measurement mode
        const MODE = 0b100;
    }
}

#[cfg(feature = "defmt-03")]
impl defmt::Format for WriteSteps {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "WriteSteps({=u8:#05b})", self.bits())
    }
}

/// All possible errors in this crate
#[derive(Debug, thiserror::Error)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Error<E> {
    /// Instruction byte is not one of the six measurement modes
    #[error("Invalid mode {0:#04x}")]
    InvalidMode(u8),
    /// MTreg value outside `MTREG_MIN..=MTREG_MAX`
    #[error("MTreg value {0} is out of range")]
    TimingRegisterOutOfRange(u8),
    /// No measurement mode has been configured
    #[error("Device is not configured")]
    NotConfigured,
    /// The measurement could not be read back
    #[error("No valid reading: {0:?}")]
    NoValidReading(E),
    /// An instruction was not accepted by the bus
    #[error("{fault}: {error:?}")]
    Bus {
        /// Classified failure
        fault: BusFault,
        /// Underlying HAL error
        error: E,
    },
    /// One or more sub-writes of the MTreg sequence failed
    #[error("MTreg write failed ({failed:?}): {fault}: {error:?}")]
    TimingRegisterWrite {
        /// Classification of the first failing sub-write
        fault: BusFault,
        /// Every sub-write that failed
        failed: WriteSteps,
        /// HAL error of the first failing sub-write
        error: E,
    },
}

impl<E> Error<E> {
    /// Bus fault behind this error, if the bus caused it
    pub fn fault(&self) -> Option<BusFault> {
        match self {
            Error::Bus { fault, .. } | Error::TimingRegisterWrite { fault, .. } => Some(*fault),
            _ => None,
        }
    }

    /// Legacy float sentinel for read failures
    ///
    /// `-2.0` when the driver is not configured and `-1.0` when no valid
    /// reading was returned. Other errors have no sentinel.
    pub fn sentinel(&self) -> Option<f32> {
        match self {
            Error::NotConfigured => Some(NOT_CONFIGURED_LUX),
            Error::NoValidReading(_) => Some(NO_VALID_READING_LUX),
            _ => None,
        }
    }

    /// True if only part of the MTreg sequence failed
    pub fn is_partial(&self) -> bool {
        match self {
            Error::TimingRegisterWrite { failed, .. } => *failed != WriteSteps::all(),
            _ => false,
        }
    }
}

impl<E: Debug> Error<E> {
    pub(crate) fn logged(self) -> Self {
        log::error!("{}", self);
        self
    }
}

impl<E: embedded_hal::i2c::Error> Error<E> {
    pub(crate) fn bus(error: E) -> Self {
        Error::Bus {
            fault: BusFault::of(&error),
            error,
        }
    }
}

/// Collects the outcome of the three MTreg sub-writes
pub(crate) struct StepFailures<E> {
    failed: WriteSteps,
    first: Option<E>,
}

impl<E: embedded_hal::i2c::Error> StepFailures<E> {
    pub(crate) fn new() -> Self {
        Self {
            failed: WriteSteps::empty(),
            first: None,
        }
    }

    pub(crate) fn record(&mut self, step: WriteSteps, result: Result<(), E>) {
        if let Err(error) = result {
            self.failed |= step;
            if self.first.is_none() {
                self.first = Some(error);
            }
        }
    }

    pub(crate) fn finish(self) -> Result<(), Error<E>> {
        match self.first {
            None => Ok(()),
            Some(error) => Err(Error::TimingRegisterWrite {
                fault: BusFault::of(&error),
                failed: self.failed,
                error,
            }),
        }
    }
}
