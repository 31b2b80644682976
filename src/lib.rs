//! Linux userspace driver for the PCA9685 16-channel, 12-bit PWM controller.
//!
//! The chip sits on an I2C bus and generates up to sixteen PWM signals from
//! one shared frequency, for LEDs and hobby servos. [`pca9685::Pca9685`] is
//! the controller; [`pca9685::PwmChannel`] hands single outputs to
//! consumers such as [`servo::Servo`]. With the `mock` feature enabled, a
//! register-level simulator in [`mock`] stands in for the hardware.
//!
//! Controllers and channel handles are single-threaded by design: handles
//! share state with their controller through non-atomic reference counts,
//! so none of these types are `Send`. Keep each device on one thread.
//!
//! # Glossary
//!
//! - **Tick:** 1/4096 of a PWM period. On/off times quantize to ticks.
//! - **Prescale:** divider turning the 25 MHz internal clock into the PWM
//!   period; writable only while the device sleeps.
//! - **Restart:** the hardware sequence that resumes interrupted outputs
//!   after sleep, with a 500 µs oscillator settle in between.
//! - **ALL_CALL / SUB1..SUB3:** extra bus addresses the chip can answer on,
//!   so one write can reach a group of devices.

mod error;
pub mod mock;
pub mod pca9685;
pub mod pwm;
pub mod registers;
pub mod servo;
pub mod transport;

// Re-export error types and result (used throughout)
pub use crate::error::{Error, Result};
