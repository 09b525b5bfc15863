//! Asynchronous tuner event types.
//!
//! Events are emitted by tuner drivers through a [`tokio::sync::broadcast`]
//! channel when receiver state changes. Display code subscribes to these for
//! prompt UI updates between its periodic status refreshes.

use crate::types::ScanDirection;

/// An event emitted by a tuner driver when receiver state changes.
///
/// Subscribe via [`crate::tuner::Tuner::subscribe()`]. Events are delivered
/// on a best-effort basis through a bounded broadcast channel; slow consumers
/// may miss events.
#[derive(Debug, Clone)]
pub enum TunerEvent {
    /// The tuned frequency changed.
    FrequencyChanged {
        /// New frequency in MHz.
        mhz: f64,
    },

    /// The volume level changed.
    VolumeChanged {
        /// New volume level (0-7).
        level: u8,
    },

    /// A channel scan finished and found a station.
    ScanCompleted {
        /// Frequency of the found station in MHz.
        mhz: f64,
    },

    /// A channel scan gave up without finding a station.
    ScanFailed {
        /// The direction that was scanned.
        direction: ScanDirection,
    },

    /// The tuner was shut down and entered standby.
    Shutdown,
}
