//! Core types used throughout fmtuner.
//!
//! These types provide a chip-agnostic abstraction layer over concrete
//! receiver drivers, so that display and control code never depends on a
//! specific tuner IC.

use std::fmt;
use std::str::FromStr;

/// Lowest volume level supported by the capability interface.
pub const VOLUME_MIN: u8 = 0;

/// Highest volume level supported by the capability interface.
pub const VOLUME_MAX: u8 = 7;

/// Direction of a channel scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanDirection {
    /// Scan toward the lower band edge.
    Down,
    /// Scan toward the upper band edge.
    Up,
}

impl fmt::Display for ScanDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanDirection::Down => write!(f, "down"),
            ScanDirection::Up => write!(f, "up"),
        }
    }
}

/// Error returned when a string cannot be parsed into a direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDirectionError(String);

impl fmt::Display for ParseDirectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown direction: '{}'. Expected: up, down", self.0)
    }
}

impl std::error::Error for ParseDirectionError {}

impl FromStr for ScanDirection {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" => Ok(ScanDirection::Up),
            "down" => Ok(ScanDirection::Down),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}

/// Direction of a one-step volume change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeDirection {
    /// Decrease the volume by one step.
    Down,
    /// Increase the volume by one step.
    Up,
}

impl fmt::Display for VolumeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolumeDirection::Down => write!(f, "down"),
            VolumeDirection::Up => write!(f, "up"),
        }
    }
}

impl FromStr for VolumeDirection {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" => Ok(VolumeDirection::Up),
            "down" => Ok(VolumeDirection::Down),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}

/// Stereo multiplex status of the currently tuned channel.
///
/// `Unknown` is returned when the reading is momentarily unavailable, for
/// example because another task holds the bus; consumers should keep the
/// previous display value rather than treat it as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StereoStatus {
    /// A stereo multiplex signal is being received.
    Stereo,
    /// The channel is received in mono.
    Mono,
    /// The status could not be read at this instant.
    Unknown,
}

impl fmt::Display for StereoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StereoStatus::Stereo => write!(f, "stereo"),
            StereoStatus::Mono => write!(f, "mono"),
            StereoStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// A contiguous tuning range in MHz.
///
/// Used in [`TunerCapabilities`] to describe the band a driver enforces.
/// Both edges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyBand {
    /// Lower band edge in MHz (inclusive).
    pub low_mhz: f64,
    /// Upper band edge in MHz (inclusive).
    pub high_mhz: f64,
}

impl FrequencyBand {
    /// Create a new band from its edges in MHz.
    pub fn new(low_mhz: f64, high_mhz: f64) -> Self {
        FrequencyBand { low_mhz, high_mhz }
    }

    /// Check whether a frequency in MHz falls within this band (inclusive).
    pub fn contains(&self, mhz: f64) -> bool {
        mhz >= self.low_mhz && mhz <= self.high_mhz
    }
}

impl fmt::Display for FrequencyBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}-{:.2} MHz", self.low_mhz, self.high_mhz)
    }
}

/// Static information about a connected tuner.
///
/// Returned by [`crate::tuner::Tuner::info()`] to identify the specific
/// receiver chip in use.
#[derive(Debug, Clone)]
pub struct TunerInfo {
    /// Human-readable chip name (e.g. "QN8035").
    pub chip_name: String,
    /// The chip identity value read from the identity register at startup.
    pub chip_id: u8,
    /// Description of the bus the chip is attached to (e.g. "/dev/i2c-1").
    pub bus_name: String,
}

/// Capabilities of a specific tuner driver.
///
/// Obtained via [`crate::tuner::Tuner::capabilities()`]. Drivers populate
/// this struct at initialization time so display code can omit fields the
/// concrete chip cannot provide (e.g. hiding the SNR readout entirely)
/// instead of treating the absence as an error.
#[derive(Debug, Clone)]
pub struct TunerCapabilities {
    /// The tuning range the driver enforces.
    pub band: FrequencyBand,
    /// Whether the driver can report a signal-to-noise reading.
    pub has_snr: bool,
    /// Whether the driver can report a received-signal-strength reading.
    pub has_rssi: bool,
    /// Whether the driver can report stereo/mono reception status.
    pub has_stereo_status: bool,
    /// Whether the driver decodes RDS program text.
    pub has_rds: bool,
}
