//! Linux I2C register bus.
//!
//! # Example
//!
//! ```no_run
//! use fmtuner_i2c::I2cBus;
//! use fmtuner_core::RegisterBus;
//!
//! # async fn example() -> fmtuner_core::Result<()> {
//! // Open the chip at address 0x10 on the first I2C adapter.
//! let mut bus = I2cBus::open("/dev/i2c-1", 0x10)?;
//!
//! // Read the chip identity register.
//! let id = bus.read_register(0x06).await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use i2cdev::core::I2CDevice;
use i2cdev::linux::LinuxI2CDevice;

use fmtuner_core::error::{Error, Result};
use fmtuner_core::RegisterBus;

/// A Linux I2C character device bound to one fixed chip address.
///
/// Register transactions are SMBus "read/write byte data" transfers: the
/// register address is sent first, then one data byte is read or written.
/// These complete in well under a millisecond at standard bus speeds, so
/// they are issued inline rather than through a blocking-task pool.
pub struct I2cBus {
    device: Option<LinuxI2CDevice>,
    /// Device path for logging/debugging.
    path: String,
}

impl I2cBus {
    /// Open an I2C adapter and bind it to the given 7-bit chip address.
    ///
    /// # Arguments
    ///
    /// * `path` - I2C character device path (e.g. "/dev/i2c-1")
    /// * `address` - 7-bit chip address (e.g. 0x10)
    pub fn open(path: &str, address: u16) -> Result<Self> {
        let device = LinuxI2CDevice::new(path, address)
            .map_err(|e| Error::Bus(format!("failed to open {path}: {e}")))?;
        tracing::debug!(path, address, "opened I2C bus");
        Ok(I2cBus {
            device: Some(device),
            path: path.to_string(),
        })
    }

    /// Return the device path this bus was opened on.
    pub fn path(&self) -> &str {
        &self.path
    }
}

#[async_trait]
impl RegisterBus for I2cBus {
    async fn read_register(&mut self, register: u8) -> Result<u8> {
        let device = self.device.as_mut().ok_or(Error::NotOpen)?;
        device
            .smbus_read_byte_data(register)
            .map_err(|e| Error::Bus(format!("read of register {register:#04x} failed: {e}")))
    }

    async fn write_register(&mut self, register: u8, value: u8) -> Result<()> {
        let device = self.device.as_mut().ok_or(Error::NotOpen)?;
        device
            .smbus_write_byte_data(register, value)
            .map_err(|e| Error::Bus(format!("write of register {register:#04x} failed: {e}")))
    }

    async fn close(&mut self) -> Result<()> {
        self.device = None;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.device.is_some()
    }
}
