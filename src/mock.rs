//! In-process PCA9685 simulator for tests and hardware-free demos.
//!
//! [`VirtualPca9685`] models one chip's register file the way the silicon
//! behaves, not the way the driver is expected to call it: broadcast writes
//! fan out to every channel block, the restart-pending bit is set and
//! cleared by the hardware rules, prescale writes are ignored while awake,
//! and block transfers only advance when auto-increment is enabled. A driver
//! bug therefore shows up as wrong data, exactly as it would on the bus.
//!
//! # Feature gate
//!
//! Available during test builds (`#[cfg(test)]`) and when the `mock` feature
//! is enabled.
//!
//! # Examples
//! ```
//! use pca9685_envoy::mock::VirtualPca9685;
//! use pca9685_envoy::transport::RegisterTransport;
//!
//! # fn main() -> pca9685_envoy::Result<()> {
//! let device = VirtualPca9685::new();
//! let mut transport = device.connect(0x40);
//! transport.write_register(0x02, 0xEA)?;
//! assert_eq!(device.register(0x02), 0xEA);
//! # Ok(())
//! # }
//! ```

#![cfg(any(test, feature = "mock"))]

use std::cell::RefCell;
use std::rc::Rc;

use nix::errno::Errno;

use crate::pwm::Pwm;
use crate::registers::{
    ALL_CALL, ALL_CALL_ENABLE, ALL_LED, ALWAYS_FLAG, AUTO_INCREMENT, CHANNEL_COUNT, DEFAULT_ADDRESS,
    MODE1, MODE2, OUTDRV, PRESCALE, RESTART, SLEEP, SUB1, SUB1_ENABLE, SUB2, SUB2_ENABLE, SUB3,
    SUB3_ENABLE, channel_block,
};
use crate::transport::RegisterTransport;
use crate::{Error, Result};

/// Power-on MODE1: sleep plus ALL_CALL enabled.
const POR_MODE1: u8 = 0x11;

/// Power-on prescale (about 200 Hz on the internal clock).
const POR_PRESCALE: u8 = 0x1E;

#[derive(Debug)]
struct DeviceState {
    regs: [u8; 256],
    address: u16,
}

impl DeviceState {
    fn new(address: u16) -> Self {
        let mut regs = [0_u8; 256];
        regs[usize::from(MODE1)] = POR_MODE1;
        regs[usize::from(MODE2)] = OUTDRV;
        regs[usize::from(PRESCALE)] = POR_PRESCALE;
        // Datasheet power-on secondary addresses.
        regs[usize::from(SUB1)] = 0xE2;
        regs[usize::from(SUB2)] = 0xE4;
        regs[usize::from(SUB3)] = 0xE8;
        regs[usize::from(ALL_CALL)] = 0xE0;
        // Every channel, and the broadcast block, powers up forced off.
        for channel in 0..=CHANNEL_COUNT {
            let block = if channel == CHANNEL_COUNT {
                ALL_LED
            } else {
                channel_block(channel)
            };
            regs[usize::from(block) + 3] = ALWAYS_FLAG;
        }
        Self { regs, address }
    }

    fn auto_increment(&self) -> bool {
        self.regs[usize::from(MODE1)] & AUTO_INCREMENT != 0
    }

    fn any_channel_driving(&self) -> bool {
        (0..CHANNEL_COUNT)
            .any(|channel| self.regs[usize::from(channel_block(channel)) + 3] & ALWAYS_FLAG == 0)
    }

    /// The set of bus addresses the chip currently acknowledges: the primary
    /// address plus every enabled secondary address. Secondary registers
    /// store the address in their high seven bits.
    fn responds_to(&self, address: u16) -> bool {
        if address == self.address {
            return true;
        }
        let mode1 = self.regs[usize::from(MODE1)];
        let secondary = [
            (SUB1_ENABLE, SUB1),
            (SUB2_ENABLE, SUB2),
            (SUB3_ENABLE, SUB3),
            (ALL_CALL_ENABLE, ALL_CALL),
        ];
        secondary.iter().any(|&(enable, register)| {
            mode1 & enable != 0 && u16::from(self.regs[usize::from(register)] >> 1) == address
        })
    }

    fn read_byte(&self, register: u8) -> u8 {
        self.regs[usize::from(register)]
    }

    fn write_byte(&mut self, register: u8, value: u8) {
        match register {
            MODE1 => self.write_mode1(value),
            PRESCALE => {
                // The real chip only latches prescale while asleep.
                if self.regs[usize::from(MODE1)] & SLEEP != 0 {
                    self.regs[usize::from(PRESCALE)] = value;
                }
            }
            reg if (ALL_LED..ALL_LED + 4).contains(&reg) => {
                let offset = reg - ALL_LED;
                self.regs[usize::from(reg)] = value;
                for channel in 0..CHANNEL_COUNT {
                    self.regs[usize::from(channel_block(channel) + offset)] = value;
                }
            }
            reg => self.regs[usize::from(reg)] = value,
        }
    }

    /// MODE1 with the hardware-managed restart-pending bit: writing 1 clears
    /// it, entering sleep while a channel drives sets it, and it is never
    /// stored directly from the written value.
    fn write_mode1(&mut self, value: u8) {
        let old = self.regs[usize::from(MODE1)];
        let mut pending = old & RESTART != 0;
        if value & RESTART != 0 {
            pending = false;
        }
        if old & SLEEP == 0 && value & SLEEP != 0 && self.any_channel_driving() {
            pending = true;
        }
        let restart = if pending { RESTART } else { 0 };
        self.regs[usize::from(MODE1)] = (value & !RESTART) | restart;
    }
}

/// One simulated PCA9685, shared by any number of [`MockTransport`]
/// connections.
///
/// See the [module docs](self) for the behavior it models and an example.
#[derive(Debug)]
pub struct VirtualPca9685 {
    state: Rc<RefCell<DeviceState>>,
}

impl VirtualPca9685 {
    /// A powered-up chip at the factory-default primary address.
    #[must_use]
    pub fn new() -> Self {
        Self::new_at(DEFAULT_ADDRESS)
    }

    /// A powered-up chip at a custom primary address.
    #[must_use]
    pub fn new_at(address: u16) -> Self {
        Self {
            state: Rc::new(RefCell::new(DeviceState::new(address))),
        }
    }

    /// Bind a bus address, as the kernel would: binding always succeeds, and
    /// transfers fail with `EREMOTEIO` while no enabled address matches.
    #[must_use]
    pub fn connect(&self, address: u16) -> MockTransport {
        MockTransport {
            state: Rc::clone(&self.state),
            address,
        }
    }

    /// Inspect one register directly, bypassing the bus.
    #[must_use]
    pub fn register(&self, register: u8) -> u8 {
        self.state.borrow().read_byte(register)
    }

    /// Overwrite one register directly, bypassing the bus and the hardware
    /// write rules.
    pub fn set_register(&self, register: u8, value: u8) {
        self.state.borrow_mut().regs[usize::from(register)] = value;
    }
}

impl Default for VirtualPca9685 {
    fn default() -> Self {
        Self::new()
    }
}

/// A [`RegisterTransport`] bound to one bus address of a [`VirtualPca9685`].
#[derive(Clone, Debug)]
pub struct MockTransport {
    state: Rc<RefCell<DeviceState>>,
    address: u16,
}

impl MockTransport {
    fn checked<T>(&self, op: impl FnOnce(&mut DeviceState) -> T) -> Result<T> {
        let mut state = self.state.borrow_mut();
        if !state.responds_to(self.address) {
            return Err(Error::Transport(Errno::EREMOTEIO));
        }
        Ok(op(&mut state))
    }
}

impl RegisterTransport for MockTransport {
    fn read_register(&mut self, register: u8) -> Result<u8> {
        self.checked(|state| state.read_byte(register))
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<()> {
        self.checked(|state| state.write_byte(register, value))
    }

    fn read_block(&mut self, register: u8, len: u8) -> Result<Vec<u8>> {
        self.checked(|state| {
            (0..len)
                .map(|i| {
                    // Without auto-increment the chip re-reads one register.
                    let reg = if state.auto_increment() {
                        register + i
                    } else {
                        register
                    };
                    state.read_byte(reg)
                })
                .collect()
        })
    }

    fn write_block(&mut self, register: u8, values: &[u8]) -> Result<()> {
        self.checked(|state| {
            for (i, &value) in values.iter().enumerate() {
                let reg = if state.auto_increment() {
                    register + i as u8
                } else {
                    register
                };
                state.write_byte(reg, value);
            }
        })
    }
}

// ============================================================================
// MockPwm
// ============================================================================

/// A [`Pwm`](crate::pwm::Pwm) that records requests instead of driving
/// hardware, for testing consumers such as
/// [`Servo`](crate::servo::Servo).
#[derive(Debug, Default)]
pub struct MockPwm {
    frequency: Option<f32>,
    duty_cycles: Vec<f32>,
}

impl MockPwm {
    /// A recorder with nothing requested yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently requested frequency, if any.
    #[must_use]
    pub fn frequency(&self) -> Option<f32> {
        self.frequency
    }

    /// The most recently requested duty cycle, if any.
    #[must_use]
    pub fn duty_cycle(&self) -> Option<f32> {
        self.duty_cycles.last().copied()
    }

    /// Every requested duty cycle, oldest first.
    #[must_use]
    pub fn duty_cycles(&self) -> &[f32] {
        &self.duty_cycles
    }
}

impl Pwm for MockPwm {
    fn set_frequency(&mut self, frequency: f32) -> Result<()> {
        self.frequency = Some(frequency);
        Ok(())
    }

    fn set_duty_cycle(&mut self, duty_cycle: f32) -> Result<()> {
        self.duty_cycles.push(duty_cycle);
        Ok(())
    }
}
