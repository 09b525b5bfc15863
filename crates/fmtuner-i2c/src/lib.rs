//! fmtuner-i2c: Linux I2C implementation of the fmtuner register bus.
//!
//! Provides [`I2cBus`], which implements
//! [`RegisterBus`](fmtuner_core::RegisterBus) on top of a Linux I2C
//! character device (`/dev/i2c-*`) using SMBus byte-data transfers. This is
//! the transport used when the receiver chip hangs off the I2C header of a
//! single-board computer.

mod i2c;

pub use i2c::I2cBus;
