//! # BH1750 Digital Ambient Light Sensor Driver
//!
//! This is a platform-agnostic Rust driver for the ROHM BH1750 (BH1750FVI) ambient light
//! sensor, built using the [`embedded-hal`] traits for I2C communication.
//!
//! The BH1750 is a 16-bit digital light sensor that provides:
//! - Illuminance in lux from 1 to 65535 counts
//! - Three resolutions (4 lx, 1 lx and 0.5 lx)
//! - Continuous and one-time measurement modes
//! - Adjustable measurement time (MTreg, 31 to 254)
//! - I2C interface (address 0x23 or 0x5C)
//!
//! ## Features
//!
//! - **Mode state machine** that only commits a mode once the sensor acknowledged it
//! - **MTreg tuning** with measurement times and lux conversion scaled accordingly
//! - **Blocking reads** that wait for the conversion to finish
//! - **Readiness polling** for callers that must not block
//! - **Async/await support** with feature gating (optional)
//!
//! ## Quick Start
//!
//! ```rust
//! use bh1750::{Bh1750, MeasurementWait, Mode};
//! use embedded_hal_mock::eh1::delay::NoopDelay;
//! use embedded_hal_mock::eh1::i2c::{Mock, Transaction};
//!
//! # let i2c = Mock::new(&[
//! #     Transaction::write(0x23, vec![0x10]),
//! #     Transaction::write(0x23, vec![0x42]),
//! #     Transaction::write(0x23, vec![0x65]),
//! #     Transaction::write(0x23, vec![0x10]),
//! #     Transaction::read(0x23, vec![0x03, 0xE8]),
//! # ]);
//! // Any `Fn() -> u64` returning milliseconds works as a clock
//! let mut sensor = Bh1750::new(i2c, NoopDelay::new(), || 0u64);
//!
//! // Select continuous high resolution mode and the default MTreg
//! sensor.begin(Mode::ContinuousHighRes).unwrap();
//!
//! let lux = sensor.read_light_level(MeasurementWait::Typical).unwrap();
//! assert!(lux > 833.0 && lux < 834.0);
//! # sensor.destroy().done();
//! ```
//!
//! ## Polling
//!
//! [`Bh1750::measurement_ready`] never touches the bus. Combined with
//! [`Bh1750::start_measurement`] and [`Bh1750::read_measurement`] it lets
//! one-time modes run without blocking:
//!
//! ```rust,ignore
//! sensor.configure(Mode::OneTimeHighRes)?;
//! loop {
//!     if sensor.measurement_ready(MeasurementWait::Typical) {
//!         let lux = sensor.read_measurement()?;
//!         sensor.start_measurement()?;
//!     }
//!     // do other work
//! }
//! ```
//!
//! ## Async Usage
//!
//! Enable the `async` feature to use async/await patterns:
//!
//! ```toml
//! [dependencies]
//! bh1750 = { version = "0.1", features = ["async"] }
//! ```
//!
//! ```rust,ignore
//! let mut sensor = Bh1750::new(i2c, delay, clock);
//! sensor.begin_async(Mode::OneTimeHighRes2).await?;
//! let lux = sensor.read_light_level_async(MeasurementWait::Maximum).await?;
//! ```
//!
//! ## Logging
//!
//! Failures are logged through the [`log`] facade at error level. The raw
//! count, the MTreg correction factor and the converted lux value are logged
//! at debug level.
//!
//! [`embedded-hal`]: https://crates.io/crates/embedded-hal
//! [`log`]: https://crates.io/crates/log

#![no_std]
#![deny(missing_docs)]

#[cfg(feature = "std")]
extern crate std;

use core::fmt::Debug;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

#[cfg(feature = "async")]
use embedded_hal_async::delay::DelayNs as AsyncDelayNs;
#[cfg(feature = "async")]
use embedded_hal_async::i2c::I2c as AsyncI2c;

mod clock;
mod config;
mod error;
pub mod ll;
mod state;

pub use clock::Clock;
#[cfg(feature = "std")]
pub use clock::StdClock;
pub use config::Config;
pub use error::{BusFault, Error, WriteSteps, NOT_CONFIGURED_LUX, NO_VALID_READING_LUX};
pub use ll::{Mode, ALT_ADDRESS, DEFAULT_ADDRESS, DEFAULT_MTREG, MTREG_MAX, MTREG_MIN};
pub use state::{raw_to_lux, MeasurementWait, CONVERSION_FACTOR};

use error::StepFailures;
use ll::{timing_sequence, POWER_DOWN, POWER_ON, RESET, WAKEUP_DELAY_MS};
use state::State;

/// High-level BH1750 driver
///
/// Owns the I2C bus, a delay provider and a millisecond [`Clock`]. The
/// driver starts unconfigured with the default MTreg.
pub struct Bh1750<I2C, D, C> {
    i2c: I2C,
    delay: D,
    clock: C,
    config: Config,
    state: State,
}

impl<I2C, D, C> Bh1750<I2C, D, C> {
    /// Create a new BH1750 driver at the default address
    pub fn new(i2c: I2C, delay: D, clock: C) -> Self {
        Self::with_config(i2c, delay, clock, Config::default())
    }

    /// Create a new BH1750 driver with a custom configuration
    pub fn with_config(i2c: I2C, delay: D, clock: C, config: Config) -> Self {
        Self {
            i2c,
            delay,
            clock,
            config,
            state: State::new(),
        }
    }

    /// Current measurement mode, `None` while unconfigured
    pub fn mode(&self) -> Option<Mode> {
        self.state.mode
    }

    /// Current MTreg value
    pub fn timing_register(&self) -> u8 {
        self.state.mtreg
    }

    /// I2C address of the sensor
    pub fn address(&self) -> u8 {
        self.config.address
    }

    /// Driver configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Measurement time of the current mode scaled by the MTreg, in milliseconds
    pub fn measurement_time_ms(&self, wait: MeasurementWait) -> u32 {
        self.state.measurement_time_ms(wait)
    }

    /// Destroy the driver and return the I2C interface
    pub fn destroy(self) -> I2C {
        self.i2c
    }

    fn current_mode<E: Debug>(&self) -> Result<Mode, Error<E>> {
        self.state
            .mode
            .ok_or(Error::NotConfigured)
            .map_err(Error::logged)
    }
}

impl<I2C, D, C> Bh1750<I2C, D, C>
where
    C: Clock,
{
    /// Check whether a conversion has had time to complete
    ///
    /// Compares the time since the mode was set or the last read against the
    /// measurement time of the current mode. No bus activity.
    pub fn measurement_ready(&self, wait: MeasurementWait) -> bool {
        self.state.is_ready(self.clock.now_ms(), wait)
    }

    fn commit_mode(&mut self, mode: Mode) {
        self.state.mode = Some(mode);
        self.restart_conversion();
        log::debug!("Mode set to {:?}", mode);
    }

    /// A mode instruction was acknowledged, the readiness window starts over
    fn restart_conversion(&mut self) {
        self.state.last_read_ms = self.clock.now_ms();
    }

    fn finish_read<E: Debug>(
        &mut self,
        mode: Mode,
        result: Result<(), E>,
        buffer: [u8; 2],
    ) -> Result<f32, Error<E>> {
        self.state.last_read_ms = self.clock.now_ms();
        match result {
            Ok(()) => Ok(raw_to_lux(
                u16::from_be_bytes(buffer),
                mode,
                self.state.mtreg,
            )),
            Err(error) => Err(Error::NoValidReading(error).logged()),
        }
    }
}

impl<I2C, E, D, C> Bh1750<I2C, D, C>
where
    I2C: I2c<Error = E>,
    E: embedded_hal::i2c::Error,
    D: DelayNs,
    C: Clock,
{
    /// Configure the sensor in `mode` and, unless disabled in the
    /// [`Config`], reset the MTreg to its default
    pub fn begin(&mut self, mode: Mode) -> Result<(), Error<E>> {
        self.configure(mode)?;
        if self.config.apply_default_timing_on_begin {
            self.set_timing_register(DEFAULT_MTREG)?;
        }
        Ok(())
    }

    /// Select a measurement mode
    ///
    /// Sends the mode instruction and waits the 10 ms wake-up time. The mode
    /// is only committed if the sensor acknowledged the instruction.
    pub fn configure(&mut self, mode: Mode) -> Result<(), Error<E>> {
        let result = self.send_instruction(mode.opcode());
        self.delay.delay_ms(WAKEUP_DELAY_MS);
        result.map_err(|e| Error::bus(e).logged())?;
        self.commit_mode(mode);
        Ok(())
    }

    /// Select a measurement mode from its raw instruction byte
    ///
    /// Anything but the six mode instructions fails with
    /// [`Error::InvalidMode`] before touching the bus.
    pub fn configure_code(&mut self, code: u8) -> Result<(), Error<E>> {
        let mode = Mode::try_from(code).map_err(|code| Error::<E>::InvalidMode(code).logged())?;
        self.configure(mode)
    }

    /// Set the measurement time register
    ///
    /// Programs the high and low MTreg bits and re-asserts the current mode.
    /// All three writes are attempted; if any of them fails the MTreg is left
    /// unchanged. The re-asserted mode starts a new conversion, so the
    /// readiness window restarts. In continuous modes this blocks until a
    /// measurement with the new MTreg is available.
    pub fn set_timing_register(&mut self, value: u8) -> Result<(), Error<E>> {
        if !(MTREG_MIN..=MTREG_MAX).contains(&value) {
            return Err(Error::TimingRegisterOutOfRange(value).logged());
        }

        let mut failures = StepFailures::new();
        for (step, instruction) in timing_sequence(value, self.state.mode) {
            let result = self.send_instruction(instruction);
            failures.record(step, result);
        }
        self.delay.delay_ms(WAKEUP_DELAY_MS);
        failures.finish().map_err(Error::logged)?;

        self.state.mtreg = value;
        self.restart_conversion();
        log::debug!("MTreg set to {}", value);

        let settle_ms = self.state.settle_time_ms();
        if settle_ms > 0 {
            self.delay.delay_ms(settle_ms);
        }
        Ok(())
    }

    /// Read the light level in lux, waiting for the conversion
    ///
    /// One-time modes are re-triggered and the measurement time for `wait`
    /// is awaited. Continuous modes are read right away, re-triggered first
    /// only if [`Config::retrigger_continuous`] is set. A rejected re-trigger
    /// fails like the read itself, with [`Error::NoValidReading`].
    pub fn read_light_level(&mut self, wait: MeasurementWait) -> Result<f32, Error<E>> {
        let mode = self.current_mode::<E>()?;
        if mode.is_one_shot() || self.config.retrigger_continuous {
            if let Err(error) = self.send_instruction(mode.opcode()) {
                return self.finish_read(mode, Err(error), [0; 2]);
            }
        }
        if mode.is_one_shot() {
            self.delay.delay_ms(self.state.measurement_time_ms(wait));
        }
        self.fetch(mode)
    }

    /// Read the light level in lux without triggering or waiting
    ///
    /// Meant to be called once [`measurement_ready`](Self::measurement_ready)
    /// reports a finished conversion.
    pub fn read_measurement(&mut self) -> Result<f32, Error<E>> {
        let mode = self.current_mode::<E>()?;
        self.fetch(mode)
    }

    /// Re-send the current mode instruction to start a new conversion
    ///
    /// Restarts the readiness window. Needed after every read in one-time
    /// modes, since the sensor powers down after each measurement.
    pub fn start_measurement(&mut self) -> Result<(), Error<E>> {
        let mode = self.current_mode::<E>()?;
        self.send_instruction(mode.opcode())
            .map_err(|e| Error::bus(e).logged())?;
        self.commit_mode(mode);
        Ok(())
    }

    /// Power the sensor down, returning the driver to the unconfigured state
    pub fn power_down(&mut self) -> Result<(), Error<E>> {
        self.send_instruction(POWER_DOWN)
            .map_err(|e| Error::bus(e).logged())?;
        self.state.mode = None;
        Ok(())
    }

    /// Power the sensor on, waiting for a measurement instruction
    pub fn power_on(&mut self) -> Result<(), Error<E>> {
        self.send_instruction(POWER_ON)
            .map_err(|e| Error::bus(e).logged())
    }

    /// Reset the data register
    ///
    /// The sensor ignores this instruction while powered down.
    pub fn reset(&mut self) -> Result<(), Error<E>> {
        self.send_instruction(RESET)
            .map_err(|e| Error::bus(e).logged())
    }

    fn fetch(&mut self, mode: Mode) -> Result<f32, Error<E>> {
        let mut buffer = [0u8; 2];
        let result = self.i2c.read(self.config.address, &mut buffer);
        self.finish_read(mode, result, buffer)
    }

    fn send_instruction(&mut self, instruction: u8) -> Result<(), E> {
        log::trace!("Instruction {:#04x}", instruction);
        self.i2c.write(self.config.address, &[instruction])
    }
}

#[cfg(feature = "async")]
impl<I2C, E, D, C> Bh1750<I2C, D, C>
where
    I2C: AsyncI2c<Error = E>,
    E: embedded_hal::i2c::Error,
    D: AsyncDelayNs,
    C: Clock,
{
    /// Configure the sensor and reset the MTreg (async version)
    pub async fn begin_async(&mut self, mode: Mode) -> Result<(), Error<E>> {
        self.configure_async(mode).await?;
        if self.config.apply_default_timing_on_begin {
            self.set_timing_register_async(DEFAULT_MTREG).await?;
        }
        Ok(())
    }

    /// Select a measurement mode (async version)
    pub async fn configure_async(&mut self, mode: Mode) -> Result<(), Error<E>> {
        let result = self.send_instruction_async(mode.opcode()).await;
        self.delay.delay_ms(WAKEUP_DELAY_MS).await;
        result.map_err(|e| Error::bus(e).logged())?;
        self.commit_mode(mode);
        Ok(())
    }

    /// Select a measurement mode from its raw instruction byte (async version)
    pub async fn configure_code_async(&mut self, code: u8) -> Result<(), Error<E>> {
        let mode = Mode::try_from(code).map_err(|code| Error::<E>::InvalidMode(code).logged())?;
        self.configure_async(mode).await
    }

    /// Set the measurement time register (async version)
    pub async fn set_timing_register_async(&mut self, value: u8) -> Result<(), Error<E>> {
        if !(MTREG_MIN..=MTREG_MAX).contains(&value) {
            return Err(Error::TimingRegisterOutOfRange(value).logged());
        }

        let mut failures = StepFailures::new();
        for (step, instruction) in timing_sequence(value, self.state.mode) {
            let result = self.send_instruction_async(instruction).await;
            failures.record(step, result);
        }
        self.delay.delay_ms(WAKEUP_DELAY_MS).await;
        failures.finish().map_err(Error::logged)?;

        self.state.mtreg = value;
        self.restart_conversion();
        log::debug!("MTreg set to {}", value);

        let settle_ms = self.state.settle_time_ms();
        if settle_ms > 0 {
            self.delay.delay_ms(settle_ms).await;
        }
        Ok(())
    }

    /// Read the light level in lux, waiting for the conversion (async version)
    pub async fn read_light_level_async(
        &mut self,
        wait: MeasurementWait,
    ) -> Result<f32, Error<E>> {
        let mode = self.current_mode::<E>()?;
        if mode.is_one_shot() || self.config.retrigger_continuous {
            if let Err(error) = self.send_instruction_async(mode.opcode()).await {
                return self.finish_read(mode, Err(error), [0; 2]);
            }
        }
        if mode.is_one_shot() {
            self.delay
                .delay_ms(self.state.measurement_time_ms(wait))
                .await;
        }
        self.fetch_async(mode).await
    }

    /// Read the light level in lux without triggering or waiting (async version)
    pub async fn read_measurement_async(&mut self) -> Result<f32, Error<E>> {
        let mode = self.current_mode::<E>()?;
        self.fetch_async(mode).await
    }

    /// Re-send the current mode instruction (async version)
    pub async fn start_measurement_async(&mut self) -> Result<(), Error<E>> {
        let mode = self.current_mode::<E>()?;
        self.send_instruction_async(mode.opcode())
            .await
            .map_err(|e| Error::bus(e).logged())?;
        self.commit_mode(mode);
        Ok(())
    }

    /// Power the sensor down (async version)
    pub async fn power_down_async(&mut self) -> Result<(), Error<E>> {
        self.send_instruction_async(POWER_DOWN)
            .await
            .map_err(|e| Error::bus(e).logged())?;
        self.state.mode = None;
        Ok(())
    }

    /// Power the sensor on (async version)
    pub async fn power_on_async(&mut self) -> Result<(), Error<E>> {
        self.send_instruction_async(POWER_ON)
            .await
            .map_err(|e| Error::bus(e).logged())
    }

    /// Reset the data register (async version)
    pub async fn reset_async(&mut self) -> Result<(), Error<E>> {
        self.send_instruction_async(RESET)
            .await
            .map_err(|e| Error::bus(e).logged())
    }

    async fn fetch_async(&mut self, mode: Mode) -> Result<f32, Error<E>> {
        let mut buffer = [0u8; 2];
        let result = self.i2c.read(self.config.address, &mut buffer).await;
        self.finish_read(mode, result, buffer)
    }

    async fn send_instruction_async(&mut self, instruction: u8) -> Result<(), E> {
        log::trace!("Instruction {:#04x}", instruction);
        self.i2c.write(self.config.address, &[instruction]).await
    }
}
