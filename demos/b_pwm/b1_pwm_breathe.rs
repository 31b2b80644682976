//! Breathe an LED on channel 0, dim to bright to dim.
//!
//! Wire an LED (with resistor) to output 0 of a PCA9685 board, then:
//!
//! ```text
//! cargo run --features demos --bin demo_b1_pwm_breathe [I2C_PATH] [HEX_ADDRESS]
//! ```
//!
//! Defaults to `/dev/i2c-1` and address 0x40. Runs a fixed number of
//! breaths so the drop handler can force the outputs off on exit.

use std::{thread, time::Duration};

use pca9685_envoy::Result;
use pca9685_envoy::pca9685::Pca9685;
use pca9685_envoy::registers::DEFAULT_ADDRESS;

fn main() {
    env_logger::init();
    if let Err(err) = inner_main() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn inner_main() -> Result<()> {
    let (path, address) = device_args();
    let mut pca = Pca9685::new();
    pca.open(&path, address)?;
    pca.set_frequency(200.0)?;

    let mut channel = pca.pwm(0)?;
    println!("breathing on {path} at 0x{address:02x}");
    for _ in 0..20 {
        // Up then down in 2% steps; duty 0.0 is not expressible as
        // counters, so the floor stays just above it.
        for step in (1_u16..50).chain((1_u16..50).rev()) {
            channel.set_duty_cycle(f32::from(step) / 50.0)?;
            thread::sleep(Duration::from_millis(20));
        }
    }

    pca.close()
}

fn device_args() -> (String, u16) {
    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "/dev/i2c-1".into());
    let address = args
        .next()
        .and_then(|raw| u16::from_str_radix(raw.trim_start_matches("0x"), 16).ok())
        .unwrap_or(DEFAULT_ADDRESS);
    (path, address)
}
