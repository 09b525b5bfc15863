//! Register bus trait for tuner chip communication.
//!
//! The [`RegisterBus`] trait abstracts over the physical link to a receiver
//! chip exposing 8-bit registers at a fixed device address. Implementations
//! exist for Linux I2C adapters (`fmtuner-i2c`) and for an in-memory mock
//! register file (`fmtuner-test-harness`).
//!
//! Drivers operate on a `RegisterBus` rather than directly on an I2C device,
//! enabling both real hardware control and deterministic unit testing of the
//! scan and RDS decode algorithms.

use async_trait::async_trait;

use crate::error::Result;

/// Asynchronous byte-register access to a tuner chip.
///
/// Implementations perform exactly one bus transaction per call: no retries,
/// no caching, no interpretation of the bytes. A failed transaction is
/// reported to the caller as whatever the underlying transport reports;
/// callers other than driver initialization treat it as non-fatal.
#[async_trait]
pub trait RegisterBus: Send + Sync {
    /// Read one 8-bit register.
    async fn read_register(&mut self, register: u8) -> Result<u8>;

    /// Write one 8-bit register.
    async fn write_register(&mut self, register: u8, value: u8) -> Result<()>;

    /// Close the bus.
    ///
    /// After calling `close()`, subsequent register operations should return
    /// [`Error::NotOpen`](crate::error::Error::NotOpen).
    async fn close(&mut self) -> Result<()>;

    /// Check whether the bus is currently open.
    fn is_open(&self) -> bool;
}
