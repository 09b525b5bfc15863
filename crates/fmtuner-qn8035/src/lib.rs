//! QN8035 backend for fmtuner.
//!
//! This crate implements the fmtuner capability interface for the Quintic
//! QN8035, a single-chip I2C FM receiver with an autonomous channel scan
//! engine and an RDS demodulator. It provides:
//!
//! - **Register map** ([`registers`]) -- addresses, bit fields, the fixed
//!   auto-scan sensitivity constants, and the MHz <-> channel word codec.
//! - **Driver** (`tuner`) -- full [`Tuner`](fmtuner_core::Tuner) trait
//!   implementation with a shared-bus lock, non-blocking status readings,
//!   and event emission.
//! - **Scan engine** -- drives the chip's hardware scan under a bounded
//!   poll, including the boundary-glitch correction some chip batches need
//!   near the middle of the band.
//! - **RDS decode task** -- background capture with two-sample character
//!   confirmation to keep noisy broadcast text off the display.
//! - **Builder** ([`builder`]) -- opens the bus, verifies the chip
//!   identity, and brings the receiver up.
//!
//! # Example
//!
//! ```no_run
//! use fmtuner_core::{ScanDirection, Tuner};
//! use fmtuner_qn8035::Qn8035Builder;
//!
//! # async fn example() -> fmtuner_core::Result<()> {
//! let tuner = Qn8035Builder::new().i2c_path("/dev/i2c-1").build().await?;
//! tuner.set_frequency(98.3).await?;
//! tuner.scan_channel(ScanDirection::Up).await?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod registers;
pub mod tuner;

mod rds;
mod scan;

/// Lower edge of the supported FM band in MHz.
pub const BAND_LOW_MHZ: f64 = 88.0;

/// Upper edge of the supported FM band in MHz.
pub const BAND_HIGH_MHZ: f64 = 108.0;

// Re-export the primary types for ergonomic `use fmtuner_qn8035::*`.
pub use builder::Qn8035Builder;
pub use tuner::Qn8035Tuner;
