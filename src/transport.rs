//! Register-level access to the bus.
//!
//! [`RegisterTransport`] is the seam between the controller and the wire: a
//! byte/block register interface over one bound bus address. The shipped
//! implementation is [`I2cTransport`] on top of `/dev/i2c-*` via the
//! [`i2cdev`] crate; tests and hardware-free demos substitute the simulator
//! from [`crate::mock`].

use std::path::Path;

use i2cdev::core::I2CDevice;
use i2cdev::linux::LinuxI2CDevice;
use log::{debug, trace};

use crate::{Error, Result};

/// Byte and block register access over one bound bus address.
///
/// Opening is constructing a value (for [`I2cTransport`], binding path and
/// address); closing is dropping it. All operations may fail with the
/// transport's POSIX error code, carried through [`Error::Transport`].
pub trait RegisterTransport {
    /// Read one register byte.
    fn read_register(&mut self, register: u8) -> Result<u8>;

    /// Write one register byte.
    fn write_register(&mut self, register: u8, value: u8) -> Result<()>;

    /// Read `len` consecutive register bytes starting at `register`.
    ///
    /// Requires the device side to have auto-increment addressing enabled.
    fn read_block(&mut self, register: u8, len: u8) -> Result<Vec<u8>>;

    /// Write consecutive register bytes starting at `register`, as one bus
    /// transaction.
    fn write_block(&mut self, register: u8, values: &[u8]) -> Result<()>;
}

/// SMBus transport over a Linux `/dev/i2c-*` character device.
///
/// Binding an address never probes the remote device: Linux accepts the
/// ioctl even when nothing answers, and the first transfer is what fails
/// (with `EREMOTEIO`).
///
/// # Examples
/// ```rust,no_run
/// use pca9685_envoy::transport::{I2cTransport, RegisterTransport};
///
/// # fn main() -> pca9685_envoy::Result<()> {
/// let mut transport = I2cTransport::open("/dev/i2c-1", 0x40)?;
/// let mode1 = transport.read_register(0x00)?;
/// # let _ = mode1;
/// # Ok(())
/// # }
/// ```
pub struct I2cTransport {
    device: LinuxI2CDevice,
}

impl I2cTransport {
    /// Open a character device and bind a 7-bit bus address.
    ///
    /// Fails with `ENOENT` for a missing device path. A wrong-but-plausible
    /// address does not fail here; see the type-level note.
    pub fn open<P>(path: P, address: u16) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let device = LinuxI2CDevice::new(path, address).map_err(Error::from)?;
        debug!("opened {} at address {address:#04x}", path.display());
        Ok(Self { device })
    }
}

impl RegisterTransport for I2cTransport {
    fn read_register(&mut self, register: u8) -> Result<u8> {
        let value = self.device.smbus_read_byte_data(register)?;
        trace!("read  reg {register:#04x} -> {value:#04x}");
        Ok(value)
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<()> {
        trace!("write reg {register:#04x} <- {value:#04x}");
        self.device.smbus_write_byte_data(register, value)?;
        Ok(())
    }

    fn read_block(&mut self, register: u8, len: u8) -> Result<Vec<u8>> {
        let values = self.device.smbus_read_i2c_block_data(register, len)?;
        trace!("read  reg {register:#04x} -> {values:02x?}");
        Ok(values)
    }

    fn write_block(&mut self, register: u8, values: &[u8]) -> Result<()> {
        trace!("write reg {register:#04x} <- {values:02x?}");
        self.device.smbus_write_i2c_block_data(register, values)?;
        Ok(())
    }
}
