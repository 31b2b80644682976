//! Tour the driver against the register simulator, no hardware needed.
//!
//! Run with `RUST_LOG=trace` to watch the register traffic:
//!
//! ```text
//! RUST_LOG=trace cargo run --features "demos,mock" --bin demo_a1_virtual_tour
//! ```

use pca9685_envoy::Result;
use pca9685_envoy::mock::VirtualPca9685;
use pca9685_envoy::pca9685::{Pca9685, SubAddress};
use pca9685_envoy::registers::{DEFAULT_ADDRESS, PRESCALE};
use pca9685_envoy::servo::Servo;

fn main() {
    env_logger::init();
    if let Err(err) = inner_main() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn inner_main() -> Result<()> {
    let device = VirtualPca9685::new();
    let mut pca = Pca9685::new();
    pca.open_with(device.connect(DEFAULT_ADDRESS))?;
    println!("power-on state: asleep={}", pca.asleep()?);

    // Frequency is one prescale register under the hood.
    pca.set_frequency(50.0)?;
    println!(
        "50 Hz requested, prescale register now {}, read back {:.2} Hz",
        device.register(PRESCALE),
        pca.frequency()?
    );

    // A channel handle and a raw channel write land in the same block.
    let mut channel = pca.pwm(1)?;
    channel.set_duty_cycle(0.25)?;
    pca.set_on_off_times(0, 0.0, 0.25)?;
    for ch in [0, 1] {
        let times = pca.on_off_times(ch)?;
        println!("channel {ch}: on={:.3} off={:.3}", times.on, times.off);
    }

    // Sleep interrupts the outputs; restart resumes them.
    pca.sleep()?;
    println!("asleep, restart pending: {}", pca.needs_restart()?);
    println!("woke with {:?}", pca.restart()?);

    // A servo is just a calibrated consumer of one channel.
    let mut servo = Servo::new(pca.pwm(15)?);
    servo.init()?;
    servo.set_angle(45.0)?;
    let times = pca.on_off_times(15)?;
    println!("servo at 45 degrees drives a {:.2} ms pulse", times.off * 20.0);

    // The device answers on a second address once one is enabled.
    pca.set_sub_address(SubAddress::Sub1, 0xEA)?;
    pca.set_sub_address_enabled(SubAddress::Sub1, true)?;
    let mut second = Pca9685::new();
    second.open_with(device.connect(0xEA >> 1))?;
    println!("reached the same device via SUB1: asleep={}", second.asleep()?);

    pca.close()?;
    println!("closed, all outputs forced off");
    Ok(())
}
