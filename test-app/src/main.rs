// fmtuner test application -- CLI tool for exercising the QN8035 backend
// against real hardware or the mock register bus.
//
// Usage:
//   fmtuner-test-app --i2c /dev/i2c-1 status
//   fmtuner-test-app --i2c /dev/i2c-1 tune 98.3
//   fmtuner-test-app --i2c /dev/i2c-1 scan up
//   fmtuner-test-app --i2c /dev/i2c-1 volume set 5
//   fmtuner-test-app --i2c /dev/i2c-1 volume up
//   fmtuner-test-app --i2c /dev/i2c-1 rds --duration 30
//   fmtuner-test-app --mock status
//
// The --mock flag wires the driver onto the in-memory register file from
// fmtuner-test-harness, which is useful for verifying CLI parsing and
// builder wiring without a chip on the bench.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use fmtuner::qn8035::{registers, Qn8035Builder, Qn8035Tuner};
use fmtuner::{
    format_frequency_mhz, parse_frequency_mhz, ScanDirection, ScanWorker, ScanWorkerState,
    Tuner, VolumeDirection,
};
use fmtuner_test_harness::MockRegisterBus;

/// fmtuner test application -- exercises the tuner backend from the
/// command line.
#[derive(Parser)]
#[command(name = "fmtuner-test-app", version, about)]
struct Cli {
    /// I2C character device the chip is attached to (e.g. /dev/i2c-1).
    /// Required unless --mock is used.
    #[arg(long)]
    i2c: Option<String>,

    /// Use the in-memory mock register bus instead of real hardware.
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print chip info, capabilities, and the current readings.
    Status,

    /// Tune to a frequency in MHz.
    Tune {
        /// Frequency in MHz (e.g. 98.3).
        frequency: String,
    },

    /// Scan for the next station in the given direction.
    Scan {
        /// Direction: up or down.
        direction: ScanDirection,
    },

    /// Volume control.
    Volume {
        #[command(subcommand)]
        command: VolumeCommand,
    },

    /// Monitor the decoded RDS program text.
    Rds {
        /// How long to monitor, in seconds.
        #[arg(long, default_value_t = 30)]
        duration: u64,
    },
}

#[derive(Subcommand)]
enum VolumeCommand {
    /// Print the current volume level.
    Get,
    /// Set the volume level (0-7).
    Set { level: u8 },
    /// Step the volume up one level.
    Up,
    /// Step the volume down one level.
    Down,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let tuner = connect(&cli).await?;

    match cli.command {
        Command::Status => cmd_status(&tuner).await?,
        Command::Tune { frequency } => cmd_tune(&tuner, &frequency).await?,
        Command::Scan { direction } => cmd_scan(tuner.clone(), direction).await?,
        Command::Volume { command } => cmd_volume(&tuner, command).await?,
        Command::Rds { duration } => cmd_rds(&tuner, duration).await?,
    }

    tuner.shutdown().await?;
    Ok(())
}

async fn connect(cli: &Cli) -> Result<Arc<Qn8035Tuner>> {
    let tuner = if cli.mock {
        let (bus, chip) = MockRegisterBus::new();
        chip.load(registers::REG_CID2, registers::QN8035_CHIP_ID);
        Qn8035Builder::new()
            .build_with_bus(Box::new(bus), "mock")
            .await?
    } else {
        let Some(path) = cli.i2c.as_deref() else {
            bail!("either --i2c <path> or --mock is required");
        };
        Qn8035Builder::new().i2c_path(path).build().await?
    };
    Ok(Arc::new(tuner))
}

async fn cmd_status(tuner: &Arc<Qn8035Tuner>) -> Result<()> {
    let info = tuner.info();
    let caps = tuner.capabilities();

    println!("Chip:  {} (id {:#04x}) on {}", info.chip_name, info.chip_id, info.bus_name);
    println!("Band:  {}", caps.band);

    match tuner.frequency().await? {
        Some(mhz) => println!("Freq:  {}", format_frequency_mhz(mhz)),
        None => println!("Freq:  (bus busy)"),
    }
    println!("Vol:   {}", tuner.volume().await);

    if caps.has_snr {
        match tuner.snr().await? {
            Some(snr) => println!("SNR:   {snr}"),
            None => println!("SNR:   (bus busy)"),
        }
    }
    if caps.has_rssi {
        match tuner.rssi().await? {
            Some(rssi) => println!("RSSI:  {rssi}"),
            None => println!("RSSI:  (bus busy)"),
        }
    }
    if caps.has_stereo_status {
        println!("MPX:   {}", tuner.stereo_status().await?);
    }
    if caps.has_rds {
        println!("RDS:   [{}]", tuner.rds_text()?);
    }
    Ok(())
}

async fn cmd_tune(tuner: &Arc<Qn8035Tuner>, frequency: &str) -> Result<()> {
    let mhz = parse_frequency_mhz(frequency, &tuner.capabilities().band)?;
    tuner.set_frequency(mhz).await?;
    println!("Tuned to {}", format_frequency_mhz(mhz));
    Ok(())
}

/// Run the scan through the worker, polling like a display refresh would.
async fn cmd_scan(tuner: Arc<Qn8035Tuner>, direction: ScanDirection) -> Result<()> {
    let worker = ScanWorker::spawn(tuner.clone());
    if !worker.request_scan(direction) {
        bail!("scan worker rejected the request");
    }
    println!("Scanning {direction}...");

    loop {
        tokio::time::sleep(Duration::from_millis(50)).await;
        if worker.state() == ScanWorkerState::Idle {
            break;
        }
    }
    worker.shutdown();

    match tuner.frequency().await? {
        Some(mhz) => println!("Stopped at {}", format_frequency_mhz(mhz)),
        None => println!("Scan finished (bus busy, retry status)"),
    }
    Ok(())
}

async fn cmd_volume(tuner: &Arc<Qn8035Tuner>, command: VolumeCommand) -> Result<()> {
    match command {
        VolumeCommand::Get => println!("Volume: {}", tuner.volume().await),
        VolumeCommand::Set { level } => {
            tuner.set_volume(level).await?;
            println!("Volume: {level}");
        }
        VolumeCommand::Up => {
            let level = tuner.change_volume(VolumeDirection::Up).await?;
            println!("Volume: {level}");
        }
        VolumeCommand::Down => {
            let level = tuner.change_volume(VolumeDirection::Down).await?;
            println!("Volume: {level}");
        }
    }
    Ok(())
}

async fn cmd_rds(tuner: &Arc<Qn8035Tuner>, duration: u64) -> Result<()> {
    let deadline = Instant::now() + Duration::from_secs(duration);
    let mut last = String::new();

    println!("Monitoring RDS for {duration} s...");
    while Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(500)).await;
        let text = tuner.rds_text()?;
        if text != last {
            println!("[{text}]");
            last = text;
        }
    }
    Ok(())
}
