//! fmtuner-test-harness: mock register bus for testing drivers without
//! hardware.
//!
//! Provides [`MockRegisterBus`], an in-memory register file implementing
//! [`RegisterBus`](fmtuner_core::RegisterBus), together with the
//! [`MockChip`] control handle that tests keep to pre-load registers,
//! script auto-scan completion, inspect writes, and inject faults.

mod mock_bus;

pub use mock_bus::{MockChip, MockRegisterBus};
