//! Non-blocking continuous measurement example
//!
//! This example demonstrates how to:
//! - Start continuous low resolution measurements
//! - Poll for finished conversions without blocking
//! - Do other work between readings

use std::time::Duration;

use bh1750::{Bh1750, MeasurementWait, Mode, StdClock};
use linux_embedded_hal::{Delay, I2cdev};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let i2c = I2cdev::new("/dev/i2c-1")?;
    let mut sensor = Bh1750::new(i2c, Delay, StdClock::new());
    sensor.configure(Mode::ContinuousLowRes)?;

    println!(
        "Continuous low resolution mode, {} ms per conversion",
        sensor.measurement_time_ms(MeasurementWait::Typical)
    );

    let mut idle_loops = 0u32;
    loop {
        if sensor.measurement_ready(MeasurementWait::Typical) {
            match sensor.read_measurement() {
                Ok(lux) => println!("Light: {:8.1} lx ({} idle loops)", lux, idle_loops),
                Err(e) => println!("Reading failed: {}", e),
            }
            idle_loops = 0;
        } else {
            // Stand-in for application work
            idle_loops += 1;
            std::thread::sleep(Duration::from_millis(2));
        }
    }
}
