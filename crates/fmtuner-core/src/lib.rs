//! fmtuner-core: Core traits, types, and error definitions for fmtuner.
//!
//! This crate defines the chip-agnostic abstractions that all fmtuner
//! backends implement. Front ends and status displays depend on these types
//! without pulling in any specific receiver driver.
//!
//! # Key types
//!
//! - [`Tuner`] -- the unified trait for controlling any FM receiver
//! - [`RegisterBus`] -- byte-register access to the chip
//! - [`TunerEvent`] -- asynchronous state change notifications
//! - [`ScanWorker`] -- background task that runs channel scans off the UI path
//! - [`Error`] / [`Result`] -- error handling

pub mod bus;
pub mod error;
pub mod events;
pub mod helpers;
pub mod tuner;
pub mod types;
pub mod worker;

// Re-export key types at crate root for ergonomic `use fmtuner_core::*`.
pub use bus::RegisterBus;
pub use error::{Error, Result};
pub use events::TunerEvent;
pub use helpers::{format_frequency_mhz, parse_frequency_mhz};
pub use tuner::Tuner;
pub use types::*;
pub use worker::{ScanWorker, ScanWorkerState};
