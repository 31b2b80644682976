//! Sweep a servo on channel 0 from end to end and back.
//!
//! Wire a hobby servo's signal line to output 0 (servos want their own
//! 5 V supply, not the logic rail), then:
//!
//! ```text
//! cargo run --features demos --bin demo_c1_servo_sweep [I2C_PATH] [HEX_ADDRESS]
//! ```
//!
//! Defaults to `/dev/i2c-1` and address 0x40.

use std::{thread, time::Duration};

use pca9685_envoy::Result;
use pca9685_envoy::pca9685::Pca9685;
use pca9685_envoy::registers::DEFAULT_ADDRESS;
use pca9685_envoy::servo::Servo;

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
    // The carrier all sixteen channels share; servos expect 50 Hz.
    pca.set_frequency(50.0)?;

    let mut servo = Servo::new(pca.pwm(0)?);
    servo.init()?;
    println!("sweeping on {path} at 0x{address:02x}");

    servo.set_angle(0.0)?;
    thread::sleep(Duration::from_millis(400));

    for pass in 0..4 {
        let angles = (-9_i8..=9).map(|step| f32::from(step) * 10.0);
        let angles: Vec<f32> = if pass % 2 == 0 {
            angles.collect()
        } else {
            angles.rev().collect()
        };
        for angle in angles {
            servo.set_angle(angle)?;
            thread::sleep(Duration::from_millis(200));
        }
    }

    servo.set_angle(0.0)?;
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
