//! The `Tuner` trait -- unified interface for FM receiver drivers.
//!
//! This trait is the primary API surface of fmtuner. Front ends and status
//! displays program against `dyn Tuner` without needing to know which
//! receiver chip is wired to the board.
//!
//! Each chip backend (currently `fmtuner-qn8035`) provides a concrete type
//! that implements this trait.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::Result;
use crate::events::TunerEvent;
use crate::types::*;

/// Unified asynchronous interface for controlling an FM receiver.
///
/// All methods that talk to the chip are `async` because every register
/// transaction goes through a shared bus that may momentarily be held by the
/// scan engine or the RDS decode task. Methods returning cached state
/// ([`info()`](Tuner::info), [`capabilities()`](Tuner::capabilities)) are
/// synchronous.
///
/// # Non-blocking readings
///
/// Status readings meant for periodic display refresh --
/// [`frequency`](Tuner::frequency), [`snr`](Tuner::snr),
/// [`rssi`](Tuner::rssi), and [`stereo_status`](Tuner::stereo_status) --
/// never wait for the bus. While
/// another task holds it (most notably a channel scan, which keeps the bus
/// for its whole poll window) they return `Ok(None)` or
/// [`StereoStatus::Unknown`] instead of stalling the caller. Callers should
/// keep displaying the previous value.
///
/// # Optional capabilities
///
/// Readings a concrete chip cannot provide have default implementations
/// returning [`Error::Unsupported`](crate::error::Error::Unsupported), and
/// the corresponding [`TunerCapabilities`] flag is `false`. Consumers must
/// treat absence as "field not displayed", never as a failure.
#[async_trait]
pub trait Tuner: Send + Sync {
    /// Return static information about the connected chip.
    fn info(&self) -> &TunerInfo;

    /// Return the capabilities of the connected chip.
    fn capabilities(&self) -> &TunerCapabilities;

    /// Stop RDS decoding, power the chip down into standby, and release it.
    ///
    /// Idempotent: calling `shutdown` on an already stopped tuner re-issues
    /// the standby sequence and succeeds. The RDS decode task exits
    /// cooperatively within one of its sleep intervals; shutdown does not
    /// wait for it.
    async fn shutdown(&self) -> Result<()>;

    /// Tune to the given frequency in MHz.
    ///
    /// The caller is expected to validate the frequency against
    /// [`TunerCapabilities::band`] first (see
    /// [`parse_frequency_mhz`](crate::helpers::parse_frequency_mhz));
    /// the driver does not clamp.
    ///
    /// Any previously decoded RDS text is discarded before this method
    /// returns; the decode engine restarts on the new channel.
    async fn set_frequency(&self, mhz: f64) -> Result<()>;

    /// Read back the currently tuned frequency in MHz.
    ///
    /// Returns `Ok(None)` if the bus is momentarily held by another task.
    async fn frequency(&self) -> Result<Option<f64>>;

    /// Run the chip's hardware channel scan in the given direction.
    ///
    /// Blocks (asynchronously) until the scan completes or its poll budget
    /// is exhausted. Returns [`Error::Timeout`](crate::error::Error::Timeout)
    /// if no station was found; the tuned frequency is then unchanged.
    async fn scan_channel(&self, direction: ScanDirection) -> Result<()>;

    /// Set the volume level.
    ///
    /// Levels outside [`VOLUME_MIN`]..=[`VOLUME_MAX`] are rejected with
    /// [`Error::InvalidParameter`](crate::error::Error::InvalidParameter)
    /// without touching the hardware.
    async fn set_volume(&self, level: u8) -> Result<()>;

    /// Return the current volume level (0-7).
    ///
    /// Refreshes from the hardware when the bus is free, otherwise returns
    /// the last known level.
    async fn volume(&self) -> u8;

    /// Step the volume up or down by one level, saturating at the bounds.
    ///
    /// Returns the new level. Stepping past a bound is a no-op.
    async fn change_volume(&self, direction: VolumeDirection) -> Result<u8>;

    /// Read the chip's signal-to-noise estimate.
    ///
    /// Returns `Ok(None)` if the bus is momentarily held by another task.
    async fn snr(&self) -> Result<Option<u8>> {
        Err(crate::error::Error::Unsupported(
            "SNR reading not supported".into(),
        ))
    }

    /// Read the chip's received-signal-strength indicator.
    ///
    /// Returns `Ok(None)` if the bus is momentarily held by another task.
    async fn rssi(&self) -> Result<Option<u8>> {
        Err(crate::error::Error::Unsupported(
            "RSSI reading not supported".into(),
        ))
    }

    /// Read the stereo/mono reception status of the current channel.
    ///
    /// Returns [`StereoStatus::Unknown`] if the bus is momentarily held by
    /// another task.
    async fn stereo_status(&self) -> Result<StereoStatus> {
        Err(crate::error::Error::Unsupported(
            "stereo status not supported".into(),
        ))
    }

    /// Return the current RDS program text.
    ///
    /// The string is a fixed-width, space-padded snapshot of the confirmed
    /// decode buffer; it only ever contains characters that were decoded
    /// identically on two consecutive RDS group receptions. It is updated
    /// asynchronously by the decode task and blanked on every retune.
    fn rds_text(&self) -> Result<String> {
        Err(crate::error::Error::Unsupported(
            "RDS decoding not supported".into(),
        ))
    }

    /// Subscribe to tuner events.
    ///
    /// Returns a broadcast receiver. The channel is bounded; if the consumer
    /// falls behind, older events will be dropped (lagged).
    fn subscribe(&self) -> Result<broadcast::Receiver<TunerEvent>>;
}
