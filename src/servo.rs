//! Hobby-servo positioning on top of any [`Pwm`] signal.
//!
//! A standard analog servo reads a 50 Hz signal and maps the pulse width
//! onto its travel: 1.5 ms centers the horn, 1.0 ms and 2.0 ms are the two
//! extremes. [`Servo`] turns an angle in degrees into that duty cycle and
//! leaves the signal generation to whatever implements [`Pwm`], typically
//! a [`PwmChannel`](crate::pca9685::PwmChannel).
//!
//! Servos vary, so the two mapping constants can be overridden with
//! [`Servo::new_with_calibration`] when a horn does not reach its
//! mechanical extremes or buzzes against them.
//!
//! # Examples
//! ```rust,no_run
//! use pca9685_envoy::pca9685::Pca9685;
//! use pca9685_envoy::registers::DEFAULT_ADDRESS;
//! use pca9685_envoy::servo::Servo;
//!
//! # fn main() -> pca9685_envoy::Result<()> {
//! let mut pca = Pca9685::new();
//! pca.open("/dev/i2c-1", DEFAULT_ADDRESS)?;
//! pca.set_frequency(50.0)?;
//!
//! let mut servo = Servo::new(pca.pwm(0)?);
//! servo.init()?;
//! servo.set_angle(-45.0)?;
//! # Ok(())
//! # }
//! ```

use log::info;

use crate::pwm::Pwm;
use crate::{Error, Result};

/// One positional servo driven through a [`Pwm`] signal.
///
/// See the [module docs](self) for an example.
pub struct Servo<P: Pwm> {
    pwm: P,
    half_angle_duty_cycle: f32,
    offset: f32,
    angle: f32,
}

impl<P: Pwm> Servo<P> {
    /// Lowest accepted angle, in degrees.
    pub const MIN_ANGLE: f32 = -90.0;
    /// Highest accepted angle, in degrees.
    pub const MAX_ANGLE: f32 = 90.0;

    /// Standard analog-servo carrier, requested by [`Servo::init`].
    const FREQUENCY: f32 = 50.0;
    /// Duty-cycle swing from center to either extreme (0.5 ms of 20 ms).
    const HALF_ANGLE_DUTY_CYCLE: f32 = 0.025;
    /// Duty cycle at center (1.5 ms of 20 ms).
    const OFFSET: f32 = 0.075;

    /// A servo with the standard 1.0 ms to 2.0 ms pulse calibration.
    #[must_use]
    pub fn new(pwm: P) -> Self {
        Self::new_with_calibration(pwm, Self::HALF_ANGLE_DUTY_CYCLE, Self::OFFSET)
    }

    /// A servo with a custom pulse calibration.
    ///
    /// `half_angle_duty_cycle` is the duty-cycle swing between center and
    /// either extreme; `offset` is the duty cycle at center.
    #[must_use]
    pub fn new_with_calibration(pwm: P, half_angle_duty_cycle: f32, offset: f32) -> Self {
        Self {
            pwm,
            half_angle_duty_cycle,
            offset,
            angle: 0.0,
        }
    }

    /// Request the 50 Hz servo carrier from the underlying signal.
    ///
    /// Call once before the first [`Servo::set_angle`]. Signals with a
    /// fixed, device-wide frequency accept this as a no-op; set 50 Hz on
    /// the owning controller instead.
    pub fn init(&mut self) -> Result<()> {
        info!("servo init, requesting {} Hz carrier", Self::FREQUENCY);
        self.pwm.set_frequency(Self::FREQUENCY)
    }

    /// Move the horn to `angle` degrees, negative values left of center.
    ///
    /// Accepts [`Servo::MIN_ANGLE`] to [`Servo::MAX_ANGLE`].
    pub fn set_angle(&mut self, angle: f32) -> Result<()> {
        if !(Self::MIN_ANGLE..=Self::MAX_ANGLE).contains(&angle) {
            return Err(Error::invalid_argument("angle"));
        }
        self.angle = angle;
        self.pwm
            .set_duty_cycle(angle / Self::MAX_ANGLE * self.half_angle_duty_cycle + self.offset)
    }

    /// The last successfully commanded angle, 0 before the first command.
    #[must_use]
    pub fn angle(&self) -> f32 {
        self.angle
    }
}
