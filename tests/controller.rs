#![allow(missing_docs)]
//! Device-level scenarios against the register simulator.

use pca9685_envoy::Error;
use pca9685_envoy::mock::VirtualPca9685;
use pca9685_envoy::pca9685::{Pca9685, Restart, SubAddress};
use pca9685_envoy::registers::{DEFAULT_ADDRESS, INTERNAL_CLOCK_HZ, PRESCALE, TICKS_PER_PERIOD};

fn open_controller(device: &VirtualPca9685) -> Pca9685<pca9685_envoy::mock::MockTransport> {
    let mut pca = Pca9685::new();
    pca.open_with(device.connect(DEFAULT_ADDRESS)).unwrap();
    pca
}

#[test]
fn power_on_defaults_read_back_as_documented() {
    let device = VirtualPca9685::new();
    let mut pca = open_controller(&device);

    // The chip powers up asleep, answering its all-call address, with
    // totem-pole outputs and a roughly 200 Hz prescale.
    assert!(pca.asleep().unwrap());
    assert!(!pca.needs_restart().unwrap());
    assert!(pca.all_call_enabled().unwrap());
    assert!(pca.external_driver().unwrap());
    assert_eq!(pca.frequency().unwrap().round() as u32, 197);
    for channel in 0..16 {
        assert!(pca.on_off_times(channel).unwrap().always_off);
    }
}

#[test]
fn prescale_values_match_the_datasheet_table() {
    let device = VirtualPca9685::new();
    let mut pca = open_controller(&device);

    for (frequency, prescale) in [
        (24.0, 253),
        (50.0, 121),
        (60.0, 101),
        (200.0, 30),
        (1000.0, 5),
        (1526.0, 3),
    ] {
        pca.set_frequency(frequency).unwrap();
        assert_eq!(
            device.register(PRESCALE),
            prescale,
            "wrong prescale for {frequency} Hz"
        );
        // The read-back is the frequency the prescaler actually produces,
        // not the request: 200 Hz quantizes to 196.9 Hz, 1000 Hz to 1017.3.
        let achievable =
            INTERNAL_CLOCK_HZ / ((f32::from(prescale) + 1.0) * f32::from(TICKS_PER_PERIOD));
        let read_back = pca.frequency().unwrap();
        assert!(
            (read_back - achievable).abs() < 0.01,
            "{frequency} Hz read back as {read_back} Hz, achievable {achievable} Hz"
        );
    }
}

#[test]
fn broadcast_times_appear_on_all_sixteen_channels() {
    let device = VirtualPca9685::new();
    let mut pca = open_controller(&device);

    pca.set_on_off_times(pca9685_envoy::registers::ALL_CHANNELS, 0.1, 0.6)
        .unwrap();
    for channel in 0..16 {
        let times = pca.on_off_times(channel).unwrap();
        assert!((times.on - 0.1).abs() < 1.0 / 4096.0, "channel {channel}");
        assert!((times.off - 0.6).abs() < 1.0 / 4096.0, "channel {channel}");
        assert!(!times.always_off, "channel {channel}");
    }
}

#[test]
fn configuration_survives_a_sleep_wake_cycle() {
    let device = VirtualPca9685::new();
    let mut pca = open_controller(&device);

    pca.set_frequency(50.0).unwrap();
    for channel in 0..4 {
        pca.set_on_off_times(channel, 0.0, 0.2 + 0.1 * channel as f32)
            .unwrap();
    }

    pca.sleep().unwrap();
    assert!(pca.asleep().unwrap());
    assert!(pca.needs_restart().unwrap());
    assert_eq!(pca.restart().unwrap(), Restart::Performed);
    assert!(!pca.asleep().unwrap());
    assert!(!pca.needs_restart().unwrap());

    assert_eq!(pca.frequency().unwrap().round() as u32, 50);
    for channel in 0..4 {
        let times = pca.on_off_times(channel).unwrap();
        assert!((times.off - (0.2 + 0.1 * channel as f32)).abs() < 1.0 / 4096.0);
    }
}

#[test]
fn an_unmatched_address_fails_until_its_sub_address_is_enabled() {
    let device = VirtualPca9685::new();
    let mut stranger = Pca9685::new();
    let err = stranger.open_with(device.connect(0x75)).unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert_eq!(err.errno_name(), "EREMOTEIO");

    // Program and enable SUB1 = 0xEA through the primary address.
    let mut pca = open_controller(&device);
    pca.set_sub_address(SubAddress::Sub1, 0xEA).unwrap();
    pca.set_sub_address_enabled(SubAddress::Sub1, true).unwrap();

    // The same wire address now reaches the device.
    stranger.open_with(device.connect(0x75)).unwrap();
    assert!(stranger.asleep().is_ok());

    pca.set_sub_address_enabled(SubAddress::Sub1, false).unwrap();
    assert_eq!(stranger.asleep().unwrap_err().errno_name(), "EREMOTEIO");
}

#[test]
fn open_failure_leaves_the_controller_closed() {
    let device = VirtualPca9685::new();
    let mut pca: Pca9685<pca9685_envoy::mock::MockTransport> = Pca9685::new();
    pca.open_with(device.connect(0x33)).unwrap_err();
    // Still closed, so operations report EBADF rather than retrying the bus.
    assert_eq!(pca.sleep().unwrap_err().errno_name(), "EBADF");
}
