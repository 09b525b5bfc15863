//! Band survey using the hardware channel scan engine.
//!
//! Walks the whole FM band from the bottom edge upward, letting the chip's
//! autonomous scan stop on every station that passes its channel condition
//! assessment, and prints each hit with its signal quality readings.
//!
//! Scans are dispatched through a [`ScanWorker`] the way a UI would do it:
//! the request returns immediately and the result is picked up from the
//! periodic status refresh.
//!
//! # Requirements
//!
//! - A QN8035 wired to a Linux I2C adapter (path adjusted for your board)
//!
//! # Usage
//!
//! ```sh
//! cargo run -p fmtuner --example scan_stations
//! ```

use std::sync::Arc;
use std::time::Duration;

use fmtuner::qn8035::{Qn8035Builder, BAND_HIGH_MHZ, BAND_LOW_MHZ};
use fmtuner::{format_frequency_mhz, ScanDirection, ScanWorker, ScanWorkerState, Tuner};

/// How often the "UI" refreshes while a scan runs.
const REFRESH_INTERVAL: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let i2c_path = "/dev/i2c-1";

    println!("Connecting to QN8035 on {i2c_path}...");
    let tuner: Arc<dyn Tuner> = Arc::new(
        Qn8035Builder::new().i2c_path(i2c_path).build().await?,
    );
    let info = tuner.info();
    println!(
        "Connected: {} (id {:#04x}) on {}\n",
        info.chip_name, info.chip_id, info.bus_name
    );

    tuner.set_frequency(BAND_LOW_MHZ).await?;
    let worker = ScanWorker::spawn(Arc::clone(&tuner));

    println!("{:<14} {:>6} {:>6}  {}", "Frequency", "SNR", "RSSI", "MPX");
    println!("{:-<14} {:-<6} {:-<6}  {:-<7}", "", "", "", "");

    let mut last_mhz = BAND_LOW_MHZ;
    loop {
        worker.request_scan(ScanDirection::Up);

        // Poll the way a display refresh would, until the worker goes idle.
        loop {
            tokio::time::sleep(REFRESH_INTERVAL).await;
            if worker.state() == ScanWorkerState::Idle {
                break;
            }
        }

        let Some(mhz) = tuner.frequency().await? else {
            continue;
        };
        if mhz <= last_mhz || mhz >= BAND_HIGH_MHZ {
            // Scan stopped moving up: the band has been covered.
            break;
        }
        last_mhz = mhz;

        let snr = tuner.snr().await?.map_or("-".into(), |v| v.to_string());
        let rssi = tuner.rssi().await?.map_or("-".into(), |v| v.to_string());
        let mpx = tuner.stereo_status().await?;
        println!(
            "{:<14} {snr:>6} {rssi:>6}  {mpx}",
            format_frequency_mhz(mhz)
        );
    }

    println!("\nBand covered, shutting down.");
    worker.shutdown();
    tuner.shutdown().await?;
    Ok(())
}
