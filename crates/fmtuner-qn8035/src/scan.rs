//! Hardware channel scan engine.
//!
//! The QN8035 scans autonomously: the driver programs a start/stop channel
//! range and the CCA sensitivity thresholds, raises the scan request bit,
//! and polls until the chip drops it again. The whole operation runs under
//! the shared bus lock -- the hardware scan cannot be interrupted, and
//! touching other registers while it runs corrupts it.
//!
//! The result read-back includes a correction for a chip quirk: scanning
//! across an internal frequency transition near the middle of the band has
//! been observed to land the receiver way outside the band (85 MHz or
//! 111 MHz). When that happens and the pre-scan frequency sat in the window
//! next to the transition point, the engine reprograms a known-good
//! frequency just past it instead. The window and fallback constants are
//! hardware-batch specific and are kept as-is rather than derived.

use std::time::Duration;

use tracing::debug;

use fmtuner_core::error::{Error, Result};
use fmtuner_core::{RegisterBus, ScanDirection};

use crate::registers::*;
use crate::{BAND_HIGH_MHZ, BAND_LOW_MHZ};

/// Interval between polls of the scan-active bit.
const SCAN_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Number of polls before the scan is reported failed (~125 ms total).
const SCAN_POLL_ATTEMPTS: u32 = 25;

/// Scan start offset from the current channel, in channel words (200 kHz).
const SCAN_START_OFFSET: u16 = 4;

/// Settle delay between programming a channel and requesting receive.
const TUNE_SETTLE: Duration = Duration::from_micros(100);

/// Interior transition frequency the scanner misbehaves around.
const SCAN_GLITCH_PIVOT_MHZ: f64 = 98.3;

/// Fallback frequency applied when an upward scan from below the pivot
/// lands under the band.
const SCAN_GLITCH_FALLBACK_UP_MHZ: f64 = 98.4;

/// Fallback frequency applied when a scan from above the pivot lands over
/// the band.
const SCAN_GLITCH_FALLBACK_DOWN_MHZ: f64 = 98.2;

/// Run one hardware channel scan and return the channel word to adopt as
/// current.
///
/// The caller must hold the bus lock for the duration of the call and pass
/// the pre-scan channel word. On success the returned word is strictly
/// inside the band -- either the station the scanner stopped on, or
/// `current` unchanged when the scanner stopped somewhere invalid. A poll
/// budget overrun returns [`Error::Timeout`] and implies no state change.
pub(crate) async fn run_scan(
    bus: &mut dyn RegisterBus,
    current: u16,
    direction: ScanDirection,
) -> Result<u16> {
    let band_low = freq_to_word(BAND_LOW_MHZ);
    let band_high = freq_to_word(BAND_HIGH_MHZ);

    // At the band edge for the requested direction there is nothing to
    // scan; skip the hardware programming and let the poll below observe
    // an idle scanner.
    match direction {
        ScanDirection::Up if current < band_high => {
            program_scan(bus, current, current + SCAN_START_OFFSET, band_high).await?;
        }
        ScanDirection::Down if current > band_low => {
            program_scan(bus, current, current - SCAN_START_OFFSET, band_low).await?;
        }
        _ => {}
    }

    // Wait for the chip to drop the scan-active bit.
    let mut found = false;
    for _ in 0..SCAN_POLL_ATTEMPTS {
        if bus.read_register(REG_SYSTEM1).await? & SYSTEM1_CHSC == 0 {
            found = true;
            break;
        }
        tokio::time::sleep(SCAN_POLL_INTERVAL).await;
    }
    if !found {
        debug!("channel scan timed out");
        return Err(Error::Timeout);
    }

    // Read back where the scanner stopped.
    let low = bus.read_register(REG_CH).await?;
    let step = bus.read_register(REG_CH_STEP).await?;
    let mut new = channel_word(low, step);
    debug!(word = new, "channel scan stopped");

    // Chip quirk: scanning past the internal transition point can land the
    // receiver far outside the band. Substitute the known-good frequency on
    // the other side of the transition and reprogram the hardware.
    let pivot = freq_to_word(SCAN_GLITCH_PIVOT_MHZ);
    let mut corrected = false;
    if new < band_low && current > band_low && current < pivot {
        new = freq_to_word(SCAN_GLITCH_FALLBACK_UP_MHZ);
        corrected = true;
    } else if new > band_high && current > pivot && current < band_high {
        new = freq_to_word(SCAN_GLITCH_FALLBACK_DOWN_MHZ);
        corrected = true;
    }

    if corrected {
        debug!(word = new, "applying scan boundary correction");
        bus.write_register(REG_CH, (new & 0xFF) as u8).await?;
        bus.write_register(REG_CH_STEP, ((new >> 8) & 0x03) as u8).await?;
        tokio::time::sleep(TUNE_SETTLE).await;
        bus.write_register(
            REG_SYSTEM1,
            SYSTEM1_CCA_CH_DIS | SYSTEM1_RXREQ | SYSTEM1_RDSEN,
        )
        .await?;
    }

    // Accept the result only when it sits strictly inside the band.
    if new > band_low && new < band_high {
        Ok(new)
    } else {
        Ok(current)
    }
}

/// Program the scan range, sensitivity thresholds, and scan request.
async fn program_scan(
    bus: &mut dyn RegisterBus,
    current: u16,
    start: u16,
    stop: u16,
) -> Result<()> {
    bus.write_register(REG_CCA_SNR_TH_1, CCA_SNR_TH_1_LEVEL).await?;
    bus.write_register(REG_CCA_SNR_TH_2, CCA_SNR_TH_2_LEVEL).await?;
    bus.write_register(REG_NCCFIR3, NCCFIR3_LEVEL).await?;

    bus.write_register(REG_CH_START, (start & 0xFF) as u8).await?;
    bus.write_register(REG_CH_STOP, (stop & 0xFF) as u8).await?;
    bus.write_register(REG_CH_STEP, scan_step_byte(current, stop)).await?;

    bus.write_register(REG_CCA, CCA_LEVEL).await?;

    bus.write_register(
        REG_SYSTEM1,
        SYSTEM1_RXREQ | SYSTEM1_CHSC | SYSTEM1_RDSEN,
    )
    .await
}
