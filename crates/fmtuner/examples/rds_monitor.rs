//! RDS program text monitor.
//!
//! Tunes a station and watches the confirmed RDS text build up as the
//! decode task accumulates twice-seen characters, alongside the signal
//! quality readings a status bar would show.
//!
//! # Usage
//!
//! ```sh
//! cargo run -p fmtuner --example rds_monitor -- 98.3
//! ```

use std::io::Write;
use std::time::Duration;

use fmtuner::qn8035::Qn8035Builder;
use fmtuner::{format_frequency_mhz, parse_frequency_mhz, Tuner};

const REFRESH_INTERVAL: Duration = Duration::from_millis(500);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let tuner = Qn8035Builder::new().i2c_path("/dev/i2c-1").build().await?;

    let requested = std::env::args().nth(1).unwrap_or_else(|| "98.3".into());
    let mhz = parse_frequency_mhz(&requested, &tuner.capabilities().band)?;
    tuner.set_frequency(mhz).await?;
    println!("Monitoring {} -- Ctrl-C to stop\n", format_frequency_mhz(mhz));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = tokio::time::sleep(REFRESH_INTERVAL) => {}
        }

        let snr = tuner.snr().await?.map_or("--".into(), |v| v.to_string());
        let rssi = tuner.rssi().await?.map_or("--".into(), |v| v.to_string());
        let mpx = tuner.stereo_status().await?;
        let text = tuner.rds_text()?;
        print!("\rRDS [{text}]  SNR {snr:>3}  RSSI {rssi:>3}  {mpx}   ");
        std::io::stdout().flush()?;
    }

    println!("\nShutting down.");
    tuner.shutdown().await?;
    Ok(())
}
