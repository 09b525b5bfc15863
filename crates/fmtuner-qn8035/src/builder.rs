//! Qn8035Builder -- builder for constructing [`Qn8035Tuner`] instances.
//!
//! Separates configuration from construction so that callers can pick the
//! I2C adapter and chip address before the driver opens the bus, verifies
//! the chip identity, and brings the receiver up.
//!
//! # Example
//!
//! ```no_run
//! use fmtuner_qn8035::Qn8035Builder;
//!
//! # async fn example() -> fmtuner_core::Result<()> {
//! let tuner = Qn8035Builder::new()
//!     .i2c_path("/dev/i2c-1")
//!     .build()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use fmtuner_core::error::{Error, Result};
use fmtuner_core::RegisterBus;
use fmtuner_i2c::I2cBus;

use crate::registers::QN8035_ADDRESS;
use crate::tuner::Qn8035Tuner;

/// Builder for [`Qn8035Tuner`].
///
/// `build()` performs the full initialization sequence: open the bus,
/// verify the chip identity register, software-reset the chip, program the
/// default frequency and volume, and start the RDS decode task. Failure to
/// open the bus or an identity mismatch abort construction -- there is no
/// degraded half-initialized driver.
pub struct Qn8035Builder {
    i2c_path: Option<String>,
    address: u16,
}

impl Qn8035Builder {
    /// Create a new builder with the chip's standard bus address.
    pub fn new() -> Self {
        Qn8035Builder {
            i2c_path: None,
            address: QN8035_ADDRESS,
        }
    }

    /// Set the I2C character device path (e.g. `/dev/i2c-1`).
    pub fn i2c_path(mut self, path: &str) -> Self {
        self.i2c_path = Some(path.to_string());
        self
    }

    /// Override the chip's bus address. Only useful for boards with an
    /// address translator in front of the chip.
    pub fn address(mut self, address: u16) -> Self {
        self.address = address;
        self
    }

    /// Open the configured I2C device and initialize the tuner.
    pub async fn build(self) -> Result<Qn8035Tuner> {
        let path = self
            .i2c_path
            .as_deref()
            .ok_or_else(|| Error::InvalidParameter("no I2C device path configured".into()))?
            .to_string();
        let bus = I2cBus::open(&path, self.address)?;
        Qn8035Tuner::initialize(Box::new(bus), path).await
    }

    /// Initialize the tuner on an already constructed bus.
    ///
    /// This is how tests wire in a mock register bus, and how applications
    /// with unusual transports bypass [`build`](Qn8035Builder::build).
    pub async fn build_with_bus(
        self,
        bus: Box<dyn RegisterBus>,
        bus_name: &str,
    ) -> Result<Qn8035Tuner> {
        Qn8035Tuner::initialize(bus, bus_name.to_string()).await
    }
}

impl Default for Qn8035Builder {
    fn default() -> Self {
        Self::new()
    }
}
