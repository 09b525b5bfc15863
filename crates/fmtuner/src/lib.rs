//! # fmtuner -- FM receiver control for I2C tuner chips
//!
//! `fmtuner` is an asynchronous Rust library for controlling single-chip FM
//! broadcast receivers attached over I2C, the kind found on hobbyist radio
//! hats for single-board computers. It covers tuning, volume, hardware
//! channel scanning, signal quality readings, and RDS program text decoding
//! with denoising.
//!
//! ## Quick Start
//!
//! Add `fmtuner` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! fmtuner = "0.1"
//! tokio = { version = "1", features = ["full"] }
//! ```
//!
//! Bring a QN8035 up and tune it:
//!
//! ```no_run
//! use fmtuner::{ScanDirection, Tuner};
//! use fmtuner::qn8035::Qn8035Builder;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let tuner = Qn8035Builder::new()
//!         .i2c_path("/dev/i2c-1")
//!         .build()
//!         .await?;
//!
//!     tuner.set_frequency(98.3).await?;
//!     tuner.scan_channel(ScanDirection::Up).await?;
//!     if let Some(mhz) = tuner.frequency().await? {
//!         println!("tuned to {mhz:.2} MHz");
//!     }
//!     tuner.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized as a workspace of focused crates:
//!
//! | Crate                  | Purpose                                       |
//! |------------------------|-----------------------------------------------|
//! | `fmtuner-core`         | Traits ([`Tuner`], [`RegisterBus`]), types, errors |
//! | `fmtuner-i2c`          | Linux I2C register bus implementation         |
//! | `fmtuner-qn8035`       | QN8035 driver (scan engine, RDS decode)       |
//! | `fmtuner-test-harness` | Mock register bus for hardware-free testing   |
//! | **`fmtuner`**          | This facade crate -- re-exports everything    |
//!
//! Chip drivers implement the [`Tuner`] trait, so application code works
//! with `dyn Tuner` and stays chip-agnostic.
//!
//! ## Concurrency model
//!
//! One mutex serializes every register transaction. Control operations
//! (tune, scan, volume) lock it; periodic display readings only try it and
//! report "momentarily unavailable" instead of stalling -- important
//! because a channel scan legitimately owns the bus for ~125 ms. Channel
//! scans can be pushed off the caller's task entirely with [`ScanWorker`],
//! and RDS text is decoded continuously on a background task the driver
//! owns.
//!
//! ## Events
//!
//! Drivers emit [`TunerEvent`]s through a broadcast channel. Subscribe to
//! pick up frequency changes, scan results, and volume changes without
//! polling:
//!
//! ```no_run
//! use fmtuner::{Tuner, TunerEvent};
//! # async fn example(tuner: &dyn Tuner) -> fmtuner::Result<()> {
//! let mut events = tuner.subscribe()?;
//! while let Ok(event) = events.recv().await {
//!     if let TunerEvent::ScanCompleted { mhz } = event {
//!         println!("found a station at {mhz:.2} MHz");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub use fmtuner_core::*;

/// Linux I2C register bus.
///
/// Provides [`I2cBus`](i2c::I2cBus) for chips wired to a `/dev/i2c-*`
/// adapter.
pub mod i2c {
    pub use fmtuner_i2c::*;
}

/// QN8035 receiver backend.
///
/// Provides [`Qn8035Tuner`](qn8035::Qn8035Tuner) and
/// [`Qn8035Builder`](qn8035::Qn8035Builder) for the Quintic QN8035
/// single-chip FM receiver, including its hardware channel scan engine and
/// RDS program text decoding.
#[cfg(feature = "qn8035")]
pub mod qn8035 {
    pub use fmtuner_qn8035::*;
}
