//! The capability a PWM consumer needs, with the producer abstracted away.
//!
//! [`PwmChannel`](crate::pca9685::PwmChannel) implements this over one
//! PCA9685 output; [`Servo`](crate::servo::Servo) consumes it without
//! knowing which chip, or which test double, sits underneath.

use crate::Result;

/// A single PWM signal: a frequency and a duty cycle.
pub trait Pwm {
    /// Request a carrier frequency in hertz.
    ///
    /// Implementations where frequency is fixed elsewhere (for example a
    /// device-wide prescaler shared by many channels) may accept and
    /// ignore the request.
    fn set_frequency(&mut self, frequency: f32) -> Result<()>;

    /// Drive the output high for `duty_cycle` of each period, 0.0 to 1.0.
    fn set_duty_cycle(&mut self, duty_cycle: f32) -> Result<()>;
}
