//! PCA9685 register map, bit masks, and timing constants.
//!
//! Offsets and masks follow the NXP PCA9685 datasheet (Rev. 4). Everything
//! here is compile-time; the only layout choice made at runtime is the
//! ALL_CALL register placement (see
//! [`Pca9685::new_with_all_call_register`](crate::pca9685::Pca9685::new_with_all_call_register)).

use core::time::Duration;

// ============================================================================
// Bus addresses
// ============================================================================

/// Factory-default 7-bit bus address (all address pins low).
pub const DEFAULT_ADDRESS: u16 = 0x40;

// ============================================================================
// Register offsets
// ============================================================================

/// Mode register 1: restart, clock, addressing, and sleep control.
pub const MODE1: u8 = 0x00;

/// Mode register 2: output polarity, driver, and disabled-state control.
pub const MODE2: u8 = 0x01;

/// Sub-address register 1.
pub const SUB1: u8 = 0x02;
/// Sub-address register 2.
pub const SUB2: u8 = 0x03;
/// Sub-address register 3.
pub const SUB3: u8 = 0x04;

/// ALL_CALL address register per the datasheet (ALLCALLADR). Some existing
/// deployments instead alias this onto [`SUB3`]; the controller accepts
/// either placement.
pub const ALL_CALL: u8 = 0x05;

/// First byte of the channel 0 on/off block (LED0_ON_L).
pub const LED0: u8 = 0x06;

/// First byte of the broadcast on/off block (ALL_LED_ON_L). Writes here fan
/// out to every channel.
pub const ALL_LED: u8 = 0xFA;

/// PWM period prescaler. Writable only while the device sleeps.
pub const PRESCALE: u8 = 0xFE;

// ============================================================================
// MODE1 bits
// ============================================================================

/// Set by hardware when sleep interrupts active outputs; write 1 to run the
/// restart sequence.
pub const RESTART: u8 = 0x80;

/// External clock select. Sticky until power cycle.
pub const EXTCLK: u8 = 0x40;

/// Register auto-increment, required for multi-byte block transfers.
pub const AUTO_INCREMENT: u8 = 0x20;

/// Oscillator off; outputs hold their state.
pub const SLEEP: u8 = 0x10;

/// Respond on sub-address 1.
pub const SUB1_ENABLE: u8 = 0x08;
/// Respond on sub-address 2.
pub const SUB2_ENABLE: u8 = 0x04;
/// Respond on sub-address 3.
pub const SUB3_ENABLE: u8 = 0x02;
/// Respond on the ALL_CALL address.
pub const ALL_CALL_ENABLE: u8 = 0x01;

// ============================================================================
// MODE2 bits
// ============================================================================

/// Output logic state inverted.
pub const INVRT: u8 = 0x10;

/// Outputs change on ACK instead of STOP.
pub const OCH: u8 = 0x08;

/// Totem-pole output structure instead of open-drain.
pub const OUTDRV: u8 = 0x04;

/// Two-bit field selecting what disabled outputs drive (OUTNE).
pub const OUTNE: u8 = 0x03;

// ============================================================================
// Channel blocks
// ============================================================================

/// Number of physical PWM channels.
pub const CHANNEL_COUNT: u8 = 16;

/// Pseudo-channel addressing all 16 channels at once. The value is chosen so
/// the block formula lands on [`ALL_LED`]: 61 * 4 + 6 = 250.
pub const ALL_CHANNELS: u8 = 61;

/// Bit 4 of the on-high / off-high byte: forces the channel fully on or
/// fully off regardless of the counter values.
pub const ALWAYS_FLAG: u8 = 0x10;

/// First register of a channel's 4-byte on/off block
/// (on-low, on-high+flag, off-low, off-high+flag).
///
/// `channel` must be 0 to 15 or [`ALL_CHANNELS`]. Anything else maps onto
/// unrelated registers (62 would land on [`PRESCALE`], 63 past the 8-bit
/// space) and panics in debug builds.
#[must_use]
pub const fn channel_block(channel: u8) -> u8 {
    debug_assert!(
        channel < CHANNEL_COUNT || channel == ALL_CHANNELS,
        "channel is 0 to 15 or ALL_CHANNELS"
    );
    channel * 4 + LED0
}

// ============================================================================
// Timing
// ============================================================================

/// PWM counter resolution per period.
pub const TICKS_PER_PERIOD: u16 = 4096;

/// Built-in oscillator frequency.
pub const INTERNAL_CLOCK_HZ: f32 = 25_000_000.0;

/// Lowest accepted prescale, about 1526 Hz on the internal clock.
pub const PRESCALE_MIN: u8 = 3;
/// Highest accepted prescale, about 24 Hz on the internal clock.
pub const PRESCALE_MAX: u8 = 255;

/// Minimum oscillator stabilization time between clearing sleep and
/// triggering a restart.
pub const RESTART_SETTLE: Duration = Duration::from_micros(500);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_sentinel_lands_on_the_all_led_block() {
        assert_eq!(channel_block(ALL_CHANNELS), ALL_LED);
    }

    #[test]
    fn channel_blocks_are_four_bytes_apart_from_led0() {
        assert_eq!(channel_block(0), LED0);
        assert_eq!(channel_block(1), 0x0A);
        assert_eq!(channel_block(15), 0x42);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "channel is 0 to 15 or ALL_CHANNELS")]
    fn channel_indexes_outside_the_map_are_rejected() {
        let _ = channel_block(ALL_CHANNELS + 1);
    }

    #[test]
    fn datasheet_places_all_call_after_sub3() {
        assert_ne!(ALL_CALL, SUB3);
        assert_eq!(ALL_CALL, SUB3 + 1);
    }
}
