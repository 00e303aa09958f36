//! One-time measurement example
//!
//! This example demonstrates how to:
//! - Initialize the BH1750 sensor
//! - Take blocking one-time high resolution measurements
//! - Fall back to the legacy sentinel values on errors
//!
//! Run with `RUST_LOG=debug` to see the raw counts and conversion steps.

use bh1750::{Bh1750, MeasurementWait, Mode, StdClock, NO_VALID_READING_LUX};
use embedded_hal::delay::DelayNs;

// This example uses linux-embedded-hal for demonstration
// Replace with your platform's I2C implementation
use linux_embedded_hal::{Delay, I2cdev};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let bus = std::env::args().nth(1).unwrap_or_else(|| "/dev/i2c-1".into());
    let i2c = I2cdev::new(&bus)?;
    let mut sensor = Bh1750::new(i2c, Delay, StdClock::new());

    println!("Initializing BH1750 on {}...", bus);
    sensor.begin(Mode::OneTimeHighRes)?;

    let mut pause = Delay;
    loop {
        let lux = match sensor.read_light_level(MeasurementWait::Maximum) {
            Ok(lux) => lux,
            Err(e) => {
                log::warn!("Reading failed: {}", e);
                e.sentinel().unwrap_or(NO_VALID_READING_LUX)
            }
        };
        println!("Light: {:8.2} lx", lux);

        pause.delay_ms(1000);
    }
}
