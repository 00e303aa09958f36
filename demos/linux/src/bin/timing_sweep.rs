//! Measurement time register sweep
//!
//! This example demonstrates how to:
//! - Change the MTreg to trade measurement time for sensitivity
//! - Observe the effect on conversion time and lux resolution
//! - Tell partial from total MTreg write failures

use bh1750::{Bh1750, Error, MeasurementWait, Mode, StdClock, MTREG_MAX, MTREG_MIN};
use linux_embedded_hal::{Delay, I2cdev};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let i2c = I2cdev::new("/dev/i2c-1")?;
    let mut sensor = Bh1750::new(i2c, Delay, StdClock::new());
    sensor.begin(Mode::OneTimeHighRes2)?;

    println!("┌───────┬──────────┬────────────┐");
    println!("│ MTreg │ Time(ms) │    Lux     │");
    println!("├───────┼──────────┼────────────┤");

    for mtreg in [MTREG_MIN, 50, 69, 100, 138, 200, MTREG_MAX] {
        match sensor.set_timing_register(mtreg) {
            Ok(()) => {}
            Err(e @ Error::TimingRegisterWrite { .. }) if e.is_partial() => {
                println!("│ {:5} │ partial write, sensor state unknown: {}", mtreg, e);
                continue;
            }
            Err(e) => {
                println!("│ {:5} │ {}", mtreg, e);
                continue;
            }
        }

        let time_ms = sensor.measurement_time_ms(MeasurementWait::Maximum);
        match sensor.read_light_level(MeasurementWait::Maximum) {
            Ok(lux) => println!("│ {:5} │ {:8} │ {:10.3} │", mtreg, time_ms, lux),
            Err(e) => println!("│ {:5} │ {:8} │ {:>10} │", mtreg, time_ms, e),
        }
    }

    println!("└───────┴──────────┴────────────┘");
    Ok(())
}
