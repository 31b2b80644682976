#![allow(missing_docs)]
//! Channel and channel-handle scenarios against the register simulator.

use embedded_hal::pwm::SetDutyCycle;
use pca9685_envoy::mock::{MockTransport, VirtualPca9685};
use pca9685_envoy::pca9685::Pca9685;
use pca9685_envoy::registers::{ALL_CHANNELS, DEFAULT_ADDRESS, channel_block};

fn open_controller(device: &VirtualPca9685) -> Pca9685<MockTransport> {
    let mut pca = Pca9685::new();
    pca.open_with(device.connect(DEFAULT_ADDRESS)).unwrap();
    pca
}

#[test]
fn writing_one_channel_leaves_the_others_untouched() {
    let device = VirtualPca9685::new();
    let mut pca = open_controller(&device);

    let before: Vec<[u8; 4]> = (0..16).map(|ch| snapshot(&device, ch)).collect();
    pca.set_on_off_times(5, 0.3, 0.7).unwrap();
    for (ch, old) in before.iter().enumerate() {
        let now = snapshot(&device, ch as u8);
        if ch == 5 {
            assert_ne!(&now, old);
        } else {
            assert_eq!(&now, old, "channel {ch} changed");
        }
    }
}

#[test]
fn always_flags_layer_over_the_counters() {
    let device = VirtualPca9685::new();
    let mut pca = open_controller(&device);

    pca.set_on_off_times(2, 0.25, 0.5).unwrap();
    pca.set_always_on(2, true).unwrap();
    let times = pca.on_off_times(2).unwrap();
    assert!(times.always_on);
    assert!(!times.always_off);
    // The counters beneath the flag are preserved.
    assert!((times.off - 0.5).abs() < 1.0 / 4096.0);

    pca.set_always_off(2, true).unwrap();
    let times = pca.on_off_times(2).unwrap();
    assert!(times.always_on && times.always_off);

    // A fresh times write clears both flags.
    pca.set_on_off_times(2, 0.25, 0.5).unwrap();
    let times = pca.on_off_times(2).unwrap();
    assert!(!times.always_on && !times.always_off);
}

#[test]
fn sixteen_handles_drive_their_own_channels() {
    let device = VirtualPca9685::new();
    let mut pca = open_controller(&device);

    let mut handles: Vec<_> = (0..16).map(|ch| pca.pwm(ch).unwrap()).collect();
    for (index, handle) in handles.iter_mut().enumerate() {
        handle.set_duty_cycle(0.05 + 0.05 * index as f32).unwrap();
    }
    for channel in 0..16 {
        let times = pca.on_off_times(channel).unwrap();
        let expected = 0.05 + 0.05 * f32::from(channel);
        assert!(
            (times.off - expected).abs() < 1.0 / 4096.0,
            "channel {channel}"
        );
    }
}

#[test]
fn a_broadcast_handle_reaches_every_channel() {
    let device = VirtualPca9685::new();
    let mut pca = open_controller(&device);

    let mut all = pca.pwm(ALL_CHANNELS).unwrap();
    all.set_duty_cycle(0.5).unwrap();
    for channel in 0..16 {
        let times = pca.on_off_times(channel).unwrap();
        assert!((times.off - 0.5).abs() < 1.0 / 4096.0, "channel {channel}");
    }
}

#[test]
fn handles_expose_the_embedded_hal_duty_contract() {
    let device = VirtualPca9685::new();
    let mut pca = open_controller(&device);
    let mut handle = pca.pwm(9).unwrap();

    // Drive through the trait, as a generic consumer would.
    fn drive<P: SetDutyCycle>(pwm: &mut P, percent: u8) -> Result<(), P::Error> {
        pwm.set_duty_cycle_percent(percent)
    }
    drive(&mut handle, 25).unwrap();
    let times = pca.on_off_times(9).unwrap();
    assert!((times.off - 0.25).abs() < 2.0 / 4096.0);

    drive(&mut handle, 0).unwrap();
    assert!(pca.on_off_times(9).unwrap().always_off);
}

#[test]
fn handles_outlive_reconfiguration_but_not_the_controller() {
    let device = VirtualPca9685::new();
    let mut pca = open_controller(&device);
    let mut handle = pca.pwm(1).unwrap();

    handle.set_duty_cycle(0.2).unwrap();
    pca.set_frequency(50.0).unwrap();
    handle.set_duty_cycle(0.4).unwrap();

    drop(pca);
    let err = handle.set_duty_cycle(0.6).unwrap_err();
    assert_eq!(err.errno_name(), "ENODEV");
    // The request is recorded before delivery is attempted.
    assert!((handle.duty_cycle() - 0.6).abs() < f32::EPSILON);
}

fn snapshot(device: &VirtualPca9685, channel: u8) -> [u8; 4] {
    let base = channel_block(channel);
    [
        device.register(base),
        device.register(base + 1),
        device.register(base + 2),
        device.register(base + 3),
    ]
}
