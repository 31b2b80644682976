//! A device abstraction for the PCA9685 16-channel PWM controller.
//!
//! [`Pca9685`] owns the register transport and exposes the chip's whole
//! configuration surface: the sleep/restart state machine, the PWM
//! frequency prescaler, per-channel on/off times, the secondary bus
//! addresses, and the MODE2 output behavior. [`Pca9685::pwm`] hands out
//! [`PwmChannel`] proxies for individual outputs, which implement the
//! [`Pwm`](crate::pwm::Pwm) contract consumed by higher layers such as
//! [`Servo`](crate::servo::Servo).
//!
//! # Examples
//! ```rust,no_run
//! use pca9685_envoy::pca9685::Pca9685;
//! use pca9685_envoy::registers::DEFAULT_ADDRESS;
//!
//! # fn main() -> pca9685_envoy::Result<()> {
//! let mut pca = Pca9685::new();
//! pca.open("/dev/i2c-1", DEFAULT_ADDRESS)?;
//! pca.set_frequency(50.0)?;
//!
//! // 25% pulse on channel 0, starting at the beginning of each period.
//! pca.set_on_off_times(0, 0.0, 0.25)?;
//!
//! // Or drive it through a channel handle.
//! let mut channel = pca.pwm(1)?;
//! channel.set_duty_cycle(0.5)?;
//! # Ok(())
//! # }
//! ```

use std::cell::RefCell;
use std::path::Path;
use std::rc::{Rc, Weak};
use std::thread;

use log::debug;
use nix::errno::Errno;

use crate::registers::{
    ALL_CALL, ALL_CALL_ENABLE, ALL_CHANNELS, ALWAYS_FLAG, AUTO_INCREMENT, CHANNEL_COUNT, EXTCLK,
    INTERNAL_CLOCK_HZ, INVRT, MODE1, MODE2, OCH, OUTDRV, OUTNE, PRESCALE, PRESCALE_MAX,
    PRESCALE_MIN, RESTART, RESTART_SETTLE, SLEEP, SUB1, SUB1_ENABLE, SUB2, SUB2_ENABLE, SUB3,
    SUB3_ENABLE, TICKS_PER_PERIOD, channel_block,
};
use crate::transport::{I2cTransport, RegisterTransport};
use crate::{Error, Result};

// ============================================================================
// Value types
// ============================================================================

/// On/off times of one PWM channel, as fractions of the 4096-tick period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OnOffTimes {
    /// Position within the period where the signal turns on, 0.0 to 1.0.
    pub on: f32,
    /// Position within the period where the signal turns off, 0.0 to 1.0.
    pub off: f32,
    /// The channel is forced on, ignoring the counters.
    pub always_on: bool,
    /// The channel is forced off, ignoring the counters and `always_on`.
    pub always_off: bool,
}

/// Clock source feeding the PWM counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockMode {
    /// The built-in 25 MHz oscillator.
    Internal,
    /// The EXTCLK pin. Selecting it is sticky until power-down, so there is
    /// no setter here.
    External,
}

/// When output changes latch after a configuration write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputChange {
    /// On the bus STOP condition.
    OnStop,
    /// On each byte's ACK.
    OnAck,
}

/// What disabled outputs drive (the MODE2 OUTNE field).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputDisabledMode {
    /// Outputs low.
    Low,
    /// Outputs high when an external driver is used, else high-impedance.
    Driver,
    /// Outputs high-impedance.
    HighImpedance,
}

impl OutputDisabledMode {
    const fn bits(self) -> u8 {
        match self {
            Self::Low => 0b00,
            Self::Driver => 0b01,
            Self::HighImpedance => 0b10,
        }
    }

    const fn from_bits(bits: u8) -> Self {
        match bits {
            0b00 => Self::Low,
            0b01 => Self::Driver,
            _ => Self::HighImpedance,
        }
    }
}

/// One of the three configurable secondary bus addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubAddress {
    /// SUBADR1, enabled by MODE1 bit 3.
    Sub1,
    /// SUBADR2, enabled by MODE1 bit 2.
    Sub2,
    /// SUBADR3, enabled by MODE1 bit 1.
    Sub3,
}

impl SubAddress {
    const fn register(self) -> u8 {
        match self {
            Self::Sub1 => SUB1,
            Self::Sub2 => SUB2,
            Self::Sub3 => SUB3,
        }
    }

    const fn enable_mask(self) -> u8 {
        match self {
            Self::Sub1 => SUB1_ENABLE,
            Self::Sub2 => SUB2_ENABLE,
            Self::Sub3 => SUB3_ENABLE,
        }
    }
}

/// Outcome of [`Pca9685::restart`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restart {
    /// Outputs had been interrupted by sleep; the restart sequence ran.
    Performed,
    /// Nothing was pending; sleep was simply cleared.
    NotNeeded,
}

// ============================================================================
// Controller
// ============================================================================

struct Inner<T: RegisterTransport> {
    transport: Option<T>,
    all_call_register: u8,
}

/// One PCA9685 device.
///
/// Constructed closed; [`Pca9685::open`] binds the bus transport and enables
/// register auto-increment (required for the block transfers the channel
/// operations use). Dropping the controller, or calling
/// [`Pca9685::close`], forces every channel to always-off first so outputs
/// are not left driven by a dead process.
///
/// The controller assumes a single owner thread per device and is
/// deliberately not `Send`; see the crate docs.
///
/// See the [module docs](self) for an example.
pub struct Pca9685<T: RegisterTransport = I2cTransport> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T: RegisterTransport> Pca9685<T> {
    /// A closed controller with the datasheet register layout.
    #[must_use]
    pub fn new() -> Self {
        Self::new_with_all_call_register(ALL_CALL)
    }

    /// A closed controller with the ALL_CALL address register at a custom
    /// offset.
    ///
    /// The datasheet places ALLCALLADR at offset 5 (the default used by
    /// [`Pca9685::new`]); some deployments alias it onto
    /// [`SUB3`](crate::registers::SUB3) instead, making the two addresses
    /// share storage. Pass the offset your hardware documentation calls for.
    #[must_use]
    pub fn new_with_all_call_register(register: u8) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                transport: None,
                all_call_register: register,
            })),
        }
    }

    /// Bind an already-constructed transport and enable auto-increment.
    ///
    /// On failure the transport is dropped and the controller stays closed.
    /// Any previously bound transport is released first, without the
    /// always-off sweep `close` performs.
    pub fn open_with(&mut self, transport: T) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        inner.transport = Some(transport);
        if let Err(err) = inner.write_flag(MODE1, AUTO_INCREMENT, true) {
            inner.transport = None;
            return Err(err);
        }
        debug!("auto-increment enabled, controller open");
        Ok(())
    }

    /// Force every channel to always-off, then release the transport.
    ///
    /// Fails with `EBADF` when the controller is not open. If the sweep
    /// itself fails, the transport stays bound so the caller can retry.
    pub fn close(&mut self) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.transport.is_none() {
            return Err(Error::NotOpen);
        }
        inner.set_always_off(ALL_CHANNELS, true)?;
        inner.transport = None;
        debug!("all channels forced off, controller closed");
        Ok(())
    }

    /// Stop the oscillator. Outputs freeze in their current state.
    pub fn sleep(&mut self) -> Result<()> {
        self.inner.borrow_mut().write_flag(MODE1, SLEEP, true)
    }

    /// Whether the oscillator is stopped.
    pub fn asleep(&mut self) -> Result<bool> {
        self.inner.borrow_mut().read_flag(MODE1, SLEEP)
    }

    /// Whether sleep interrupted active outputs, so the next wake-up must
    /// run the restart sequence.
    pub fn needs_restart(&mut self) -> Result<bool> {
        self.inner.borrow_mut().read_flag(MODE1, RESTART)
    }

    /// Wake the device, running the hardware restart sequence if one is
    /// pending.
    ///
    /// With nothing pending this only clears sleep. Otherwise it clears
    /// sleep, blocks for the 500 µs oscillator settle time, and then
    /// triggers the restart; the order and the delay are a hardware timing
    /// contract.
    pub fn restart(&mut self) -> Result<Restart> {
        self.inner.borrow_mut().restart()
    }

    /// Set the PWM frequency in hertz, assuming the internal 25 MHz clock.
    ///
    /// The device must sleep while the prescaler is written, so this
    /// briefly stops and restarts the outputs. If a step fails after the
    /// device went to sleep it is left asleep; retry with
    /// [`Pca9685::restart`].
    pub fn set_frequency(&mut self, frequency: f32) -> Result<()> {
        self.set_frequency_with_clock(frequency, INTERNAL_CLOCK_HZ)
    }

    /// Set the PWM frequency for a custom clock, e.g. a signal on the
    /// EXTCLK pin.
    pub fn set_frequency_with_clock(&mut self, frequency: f32, clock_frequency: f32) -> Result<()> {
        self.inner
            .borrow_mut()
            .set_frequency(frequency, clock_frequency)
    }

    /// The PWM frequency implied by the prescale register and the internal
    /// clock.
    ///
    /// A lossy inverse of [`Pca9685::set_frequency`]: read-back matches the
    /// value written only within the prescale quantization step.
    pub fn frequency(&mut self) -> Result<f32> {
        self.frequency_with_clock(INTERNAL_CLOCK_HZ)
    }

    /// The PWM frequency implied by the prescale register and a custom
    /// clock.
    pub fn frequency_with_clock(&mut self, clock_frequency: f32) -> Result<f32> {
        self.inner.borrow_mut().frequency(clock_frequency)
    }

    /// Set where in the period a channel's signal rises and falls.
    ///
    /// `channel` is 0 to 15 or
    /// [`ALL_CHANNELS`](crate::registers::ALL_CHANNELS); `on_time` and
    /// `off_time` are fractions in [0, 1] and must quantize to different
    /// ticks. The four bytes go out as one block write so a PWM cycle never
    /// sees a torn update.
    pub fn set_on_off_times(&mut self, channel: u8, on_time: f32, off_time: f32) -> Result<()> {
        self.inner
            .borrow_mut()
            .set_on_off_times(channel, on_time, off_time)
    }

    /// Read back a channel's on/off times and forced-state flags.
    pub fn on_off_times(&mut self, channel: u8) -> Result<OnOffTimes> {
        self.inner.borrow_mut().on_off_times(channel)
    }

    /// Force a channel (or all of them) fully on, or release the force.
    pub fn set_always_on(&mut self, channel: u8, enabled: bool) -> Result<()> {
        self.inner.borrow_mut().set_always_on(channel, enabled)
    }

    /// Force a channel (or all of them) fully off, or release the force.
    ///
    /// Full-off wins over both the counters and full-on.
    pub fn set_always_off(&mut self, channel: u8, enabled: bool) -> Result<()> {
        self.inner.borrow_mut().set_always_off(channel, enabled)
    }

    /// A handle to one PWM output, or to the broadcast pseudo-channel.
    ///
    /// Handles stay valid while the controller exists and is open; a handle
    /// used after the controller closed or dropped fails with `ENODEV`
    /// instead of touching freed state.
    pub fn pwm(&self, channel: u8) -> Result<PwmChannel<T>> {
        ensure_channel(channel)?;
        Ok(PwmChannel {
            controller: Rc::downgrade(&self.inner),
            channel,
            phase: 0.0,
            duty_cycle: 0.0,
        })
    }

    /// Store a secondary bus address. The low bit is forced to zero, as the
    /// hardware keeps only the high seven bits.
    pub fn set_sub_address(&mut self, which: SubAddress, address: u8) -> Result<()> {
        self.inner
            .borrow_mut()
            .write_register(which.register(), address & 0xFE)
    }

    /// Read back a stored secondary bus address.
    pub fn sub_address(&mut self, which: SubAddress) -> Result<u8> {
        self.inner.borrow_mut().read_register(which.register())
    }

    /// Enable or disable response on a secondary bus address.
    pub fn set_sub_address_enabled(&mut self, which: SubAddress, enabled: bool) -> Result<()> {
        self.inner
            .borrow_mut()
            .write_flag(MODE1, which.enable_mask(), enabled)
    }

    /// Whether the device responds on a secondary bus address.
    pub fn sub_address_enabled(&mut self, which: SubAddress) -> Result<bool> {
        self.inner.borrow_mut().read_flag(MODE1, which.enable_mask())
    }

    /// Store the ALL_CALL group address. The low bit is forced to zero.
    pub fn set_all_call_address(&mut self, address: u8) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        let register = inner.all_call_register;
        inner.write_register(register, address & 0xFE)
    }

    /// Read back the stored ALL_CALL group address.
    pub fn all_call_address(&mut self) -> Result<u8> {
        let mut inner = self.inner.borrow_mut();
        let register = inner.all_call_register;
        inner.read_register(register)
    }

    /// Enable or disable response on the ALL_CALL address.
    pub fn set_all_call_enabled(&mut self, enabled: bool) -> Result<()> {
        self.inner
            .borrow_mut()
            .write_flag(MODE1, ALL_CALL_ENABLE, enabled)
    }

    /// Whether the device responds on the ALL_CALL address.
    pub fn all_call_enabled(&mut self) -> Result<bool> {
        self.inner.borrow_mut().read_flag(MODE1, ALL_CALL_ENABLE)
    }

    /// Which clock feeds the PWM counter.
    pub fn clock_mode(&mut self) -> Result<ClockMode> {
        let external = self.inner.borrow_mut().read_flag(MODE1, EXTCLK)?;
        Ok(if external {
            ClockMode::External
        } else {
            ClockMode::Internal
        })
    }

    /// Invert the output logic state, for use without an external driver.
    pub fn set_output_inverted(&mut self, inverted: bool) -> Result<()> {
        self.inner.borrow_mut().write_flag(MODE2, INVRT, inverted)
    }

    /// Whether the output logic state is inverted.
    pub fn output_inverted(&mut self) -> Result<bool> {
        self.inner.borrow_mut().read_flag(MODE2, INVRT)
    }

    /// Set when configuration writes reach the outputs.
    pub fn set_output_change(&mut self, value: OutputChange) -> Result<()> {
        self.inner
            .borrow_mut()
            .write_flag(MODE2, OCH, value == OutputChange::OnAck)
    }

    /// When configuration writes reach the outputs.
    pub fn output_change(&mut self) -> Result<OutputChange> {
        let on_ack = self.inner.borrow_mut().read_flag(MODE2, OCH)?;
        Ok(if on_ack {
            OutputChange::OnAck
        } else {
            OutputChange::OnStop
        })
    }

    /// Configure the outputs as totem-pole (external driver) or open-drain.
    pub fn set_external_driver(&mut self, enabled: bool) -> Result<()> {
        self.inner.borrow_mut().write_flag(MODE2, OUTDRV, enabled)
    }

    /// Whether the outputs are configured totem-pole.
    pub fn external_driver(&mut self) -> Result<bool> {
        self.inner.borrow_mut().read_flag(MODE2, OUTDRV)
    }

    /// Set what the outputs drive while disabled via the OE pin.
    pub fn set_output_disabled_mode(&mut self, mode: OutputDisabledMode) -> Result<()> {
        self.inner.borrow_mut().write_field(MODE2, OUTNE, mode.bits())
    }

    /// What the outputs drive while disabled via the OE pin.
    pub fn output_disabled_mode(&mut self) -> Result<OutputDisabledMode> {
        let mode2 = self.inner.borrow_mut().read_register(MODE2)?;
        Ok(OutputDisabledMode::from_bits(mode2 & OUTNE))
    }
}

impl Pca9685<I2cTransport> {
    /// Open a Linux I2C character device and bind the device address.
    ///
    /// Fails with the transport's error for a missing path (`ENOENT`); an
    /// absent device at a valid address surfaces as `EREMOTEIO` when the
    /// auto-increment enable write is not acknowledged.
    pub fn open<P>(&mut self, path: P, address: u16) -> Result<()>
    where
        P: AsRef<Path>,
    {
        self.open_with(I2cTransport::open(path, address)?)
    }
}

impl<T: RegisterTransport> Default for Pca9685<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RegisterTransport> Inner<T> {
    fn transport(&mut self) -> Result<&mut T> {
        self.transport.as_mut().ok_or(Error::NotOpen)
    }

    fn read_register(&mut self, register: u8) -> Result<u8> {
        self.transport()?.read_register(register)
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<()> {
        self.transport()?.write_register(register, value)
    }

    fn read_flag(&mut self, register: u8, mask: u8) -> Result<bool> {
        Ok(self.read_register(register)? & mask != 0)
    }

    /// Masked read-modify-write of one flag, leaving the register's other
    /// fields untouched.
    fn write_flag(&mut self, register: u8, mask: u8, enabled: bool) -> Result<()> {
        let old = self.read_register(register)?;
        let new = if enabled { old | mask } else { old & !mask };
        self.write_register(register, new)
    }

    /// Masked read-modify-write of a multi-bit field.
    fn write_field(&mut self, register: u8, mask: u8, value: u8) -> Result<()> {
        let old = self.read_register(register)?;
        self.write_register(register, (old & !mask) | (value & mask))
    }

    fn restart(&mut self) -> Result<Restart> {
        let mode1 = self.read_register(MODE1)?;
        let pending = mode1 & RESTART != 0;
        // Wake first. The restart bit is hardware-managed: writing 1 would
        // trigger the restart right here, before the oscillator settles.
        self.write_register(MODE1, mode1 & !SLEEP & !RESTART)?;
        if !pending {
            return Ok(Restart::NotNeeded);
        }
        thread::sleep(RESTART_SETTLE);
        self.write_register(MODE1, (mode1 & !SLEEP) | RESTART)?;
        debug!("restart sequence completed");
        Ok(Restart::Performed)
    }

    fn set_frequency(&mut self, frequency: f32, clock_frequency: f32) -> Result<()> {
        if frequency <= 0.0 {
            return Err(Error::invalid_argument("frequency"));
        }
        if clock_frequency < 0.0 {
            return Err(Error::invalid_argument("clock_frequency"));
        }
        let ticks = f32::from(TICKS_PER_PERIOD);
        let prescale = (clock_frequency / (ticks * frequency)).round() - 1.0;
        if !(f32::from(PRESCALE_MIN)..=f32::from(PRESCALE_MAX)).contains(&prescale) {
            return Err(Error::invalid_argument(format!(
                "prescale value out of range: [{PRESCALE_MIN}, {PRESCALE_MAX}]"
            )));
        }

        // Prescale only latches while asleep.
        self.write_flag(MODE1, SLEEP, true)?;
        self.write_register(PRESCALE, prescale as u8)?;
        debug!("prescale {prescale} written for {frequency} Hz");
        self.restart()?;
        Ok(())
    }

    fn frequency(&mut self, clock_frequency: f32) -> Result<f32> {
        if clock_frequency < 0.0 {
            return Err(Error::invalid_argument("clock_frequency"));
        }
        let prescale = self.read_register(PRESCALE)?;
        Ok(clock_frequency / ((f32::from(prescale) + 1.0) * f32::from(TICKS_PER_PERIOD)))
    }

    fn set_on_off_times(&mut self, channel: u8, on_time: f32, off_time: f32) -> Result<()> {
        ensure_channel(channel)?;
        ensure_fraction(on_time, "on_time")?;
        ensure_fraction(off_time, "off_time")?;

        let on_ticks = quantize(on_time);
        let off_ticks = quantize(off_time);
        if on_ticks == off_ticks {
            return Err(Error::invalid_argument(
                "on_time and off_time must have different values",
            ));
        }

        // The high nibbles carry only counter bits, so this write also
        // clears both always-on/off flags.
        let block = [
            (on_ticks & 0xFF) as u8,
            ((on_ticks >> 8) & 0x0F) as u8,
            (off_ticks & 0xFF) as u8,
            ((off_ticks >> 8) & 0x0F) as u8,
        ];
        self.transport()?.write_block(channel_block(channel), &block)
    }

    fn on_off_times(&mut self, channel: u8) -> Result<OnOffTimes> {
        ensure_channel(channel)?;
        let block = self.transport()?.read_block(channel_block(channel), 4)?;
        let &[on_low, on_high, off_low, off_high] = block.as_slice() else {
            return Err(Error::Transport(Errno::EIO));
        };
        let ticks = f32::from(TICKS_PER_PERIOD);
        Ok(OnOffTimes {
            on: f32::from(u16::from(on_high & 0x0F) << 8 | u16::from(on_low)) / ticks,
            off: f32::from(u16::from(off_high & 0x0F) << 8 | u16::from(off_low)) / ticks,
            always_on: on_high & ALWAYS_FLAG != 0,
            always_off: off_high & ALWAYS_FLAG != 0,
        })
    }

    fn set_always_on(&mut self, channel: u8, enabled: bool) -> Result<()> {
        ensure_channel(channel)?;
        self.write_flag(channel_block(channel) + 1, ALWAYS_FLAG, enabled)
    }

    fn set_always_off(&mut self, channel: u8, enabled: bool) -> Result<()> {
        ensure_channel(channel)?;
        self.write_flag(channel_block(channel) + 3, ALWAYS_FLAG, enabled)
    }
}

impl<T: RegisterTransport> Drop for Inner<T> {
    fn drop(&mut self) {
        // Outputs must not stay driven after the last owner is gone. Errors
        // here have nowhere to go.
        if self.transport.is_some() {
            let _ = self.set_always_off(ALL_CHANNELS, true);
        }
    }
}

// ============================================================================
// Channel handle
// ============================================================================

/// A handle to one PWM output of a [`Pca9685`], or to the broadcast
/// pseudo-channel.
///
/// The handle keeps a non-owning reference to its controller and checks it
/// on every hardware call: once the controller is closed or dropped, calls
/// fail with `ENODEV` rather than reaching a dead device.
///
/// Handles implement the crate's [`Pwm`](crate::pwm::Pwm) contract and
/// `embedded_hal`'s [`SetDutyCycle`](embedded_hal::pwm::SetDutyCycle).
pub struct PwmChannel<T: RegisterTransport = I2cTransport> {
    controller: Weak<RefCell<Inner<T>>>,
    channel: u8,
    phase: f32,
    duty_cycle: f32,
}

impl<T: RegisterTransport> PwmChannel<T> {
    /// The channel index this handle drives.
    #[must_use]
    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// The phase offset applied to duty-cycle writes.
    #[must_use]
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// The most recently requested duty cycle.
    #[must_use]
    pub fn duty_cycle(&self) -> f32 {
        self.duty_cycle
    }

    /// Store a phase offset for subsequent duty-cycle writes.
    ///
    /// Takes effect on the next [`PwmChannel::set_duty_cycle`]; this call
    /// itself does not touch the hardware, and the value is range-checked
    /// there together with the duty cycle.
    pub fn set_phase(&mut self, phase: f32) {
        self.phase = phase;
    }

    /// Drive the channel high for `duty_cycle` of each period, starting at
    /// the stored phase offset.
    pub fn set_duty_cycle(&mut self, duty_cycle: f32) -> Result<()> {
        self.duty_cycle = duty_cycle;
        let (channel, phase) = (self.channel, self.phase);
        self.with_controller(|inner| inner.set_on_off_times(channel, phase, phase + duty_cycle))
    }

    /// Accepted and ignored: frequency is a device-wide property, set once
    /// on the controller for all sixteen channels.
    pub fn set_frequency(&mut self, _frequency: f32) -> Result<()> {
        Ok(())
    }

    fn with_controller<R>(&self, op: impl FnOnce(&mut Inner<T>) -> Result<R>) -> Result<R> {
        let inner = self.controller.upgrade().ok_or(Error::ControllerGone)?;
        let mut inner = inner.borrow_mut();
        if inner.transport.is_none() {
            return Err(Error::ControllerGone);
        }
        op(&mut inner)
    }
}

impl<T: RegisterTransport> crate::pwm::Pwm for PwmChannel<T> {
    fn set_frequency(&mut self, frequency: f32) -> Result<()> {
        PwmChannel::set_frequency(self, frequency)
    }

    fn set_duty_cycle(&mut self, duty_cycle: f32) -> Result<()> {
        PwmChannel::set_duty_cycle(self, duty_cycle)
    }
}

impl<T: RegisterTransport> embedded_hal::pwm::ErrorType for PwmChannel<T> {
    type Error = Error;
}

impl<T: RegisterTransport> embedded_hal::pwm::SetDutyCycle for PwmChannel<T> {
    fn max_duty_cycle(&self) -> u16 {
        TICKS_PER_PERIOD
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<()> {
        // A zero fraction cannot be expressed as on/off counters (they may
        // not be equal); use the full-off flag the hardware provides.
        if duty == 0 {
            let channel = self.channel;
            return self.with_controller(|inner| inner.set_always_off(channel, true));
        }
        let fraction = f32::from(duty.min(TICKS_PER_PERIOD)) / f32::from(TICKS_PER_PERIOD);
        PwmChannel::set_duty_cycle(self, fraction)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn ensure_channel(channel: u8) -> Result<()> {
    if channel < CHANNEL_COUNT || channel == ALL_CHANNELS {
        Ok(())
    } else {
        Err(Error::invalid_argument("channel"))
    }
}

fn ensure_fraction(value: f32, name: &str) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::invalid_argument(name))
    }
}

/// Fraction of the period to a counter tick, saturated to the last tick so
/// 1.0 stays expressible.
fn quantize(value: f32) -> u16 {
    (value * f32::from(TICKS_PER_PERIOD)).min(f32::from(TICKS_PER_PERIOD - 1)) as u16
}
