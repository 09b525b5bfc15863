//! Scan worker -- bridges scan requests to a [`Tuner`] without blocking
//! the requesting task.
//!
//! A channel scan holds the register bus for its whole poll window (up to
//! about 125 ms), far too long for a UI thread to wait on. The worker runs
//! the scan on its own task: the front end calls
//! [`request_scan`](ScanWorker::request_scan) and then keeps polling
//! frequency/status as usual; the new frequency shows up in the next
//! refresh once the scan lands.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::tuner::Tuner;
use crate::types::ScanDirection;

/// Interval between worker wake-ups. Also bounds how long a pending request
/// or a shutdown waits before the task notices it.
const WORKER_POLL_INTERVAL: Duration = Duration::from_micros(7_500);

/// State of the scan worker task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ScanWorkerState {
    /// No scan running and none requested.
    Idle = 0,
    /// A scan request is pending pickup by the worker task.
    Start = 1,
    /// The tuner's scan engine is running.
    Busy = 2,
    /// Terminal: the worker task exits at its next wake-up.
    End = 3,
}

impl ScanWorkerState {
    fn from_u8(raw: u8) -> ScanWorkerState {
        match raw {
            0 => ScanWorkerState::Idle,
            1 => ScanWorkerState::Start,
            2 => ScanWorkerState::Busy,
            _ => ScanWorkerState::End,
        }
    }
}

struct WorkerShared {
    state: AtomicU8,
    /// 0 = down, 1 = up. Only read by the worker right after it observes
    /// `Start`, which `request_scan` stores the direction before.
    direction: AtomicU8,
}

impl WorkerShared {
    fn state(&self) -> ScanWorkerState {
        ScanWorkerState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn direction(&self) -> ScanDirection {
        if self.direction.load(Ordering::SeqCst) == 0 {
            ScanDirection::Down
        } else {
            ScanDirection::Up
        }
    }
}

/// Handle to the background scan worker task.
///
/// Created with [`ScanWorker::spawn`]. The task lives until
/// [`shutdown`](ScanWorker::shutdown) is called; it then exits within one
/// poll interval. Dropping the handle does not stop the task.
pub struct ScanWorker {
    shared: Arc<WorkerShared>,
    task: JoinHandle<()>,
}

impl ScanWorker {
    /// Spawn the worker task for the given tuner.
    pub fn spawn(tuner: Arc<dyn Tuner>) -> ScanWorker {
        let shared = Arc::new(WorkerShared {
            state: AtomicU8::new(ScanWorkerState::Idle as u8),
            direction: AtomicU8::new(0),
        });
        let task = tokio::spawn(run_worker(tuner, Arc::clone(&shared)));
        ScanWorker { shared, task }
    }

    /// Request a channel scan in the given direction.
    ///
    /// Returns `true` if the request was accepted. A request is accepted
    /// only while the worker is idle; while a scan is pending, running, or
    /// the worker has been shut down, the request is ignored and `false`
    /// is returned.
    pub fn request_scan(&self, direction: ScanDirection) -> bool {
        let dir = match direction {
            ScanDirection::Down => 0,
            ScanDirection::Up => 1,
        };
        self.shared.direction.store(dir, Ordering::SeqCst);
        self.shared
            .state
            .compare_exchange(
                ScanWorkerState::Idle as u8,
                ScanWorkerState::Start as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
    }

    /// Return the current worker state.
    pub fn state(&self) -> ScanWorkerState {
        self.shared.state()
    }

    /// Ask the worker task to exit.
    ///
    /// The task observes the request at its next wake-up, at most one
    /// poll interval later. `shutdown` does not wait for it.
    pub fn shutdown(&self) {
        self.shared
            .state
            .store(ScanWorkerState::End as u8, Ordering::SeqCst);
    }

    /// Whether the worker task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

async fn run_worker(tuner: Arc<dyn Tuner>, shared: Arc<WorkerShared>) {
    debug!("scan worker started");
    loop {
        tokio::time::sleep(WORKER_POLL_INTERVAL).await;
        match shared.state() {
            ScanWorkerState::End => break,
            ScanWorkerState::Start => {
                // Start -> Busy, unless a shutdown raced the pickup.
                if shared
                    .state
                    .compare_exchange(
                        ScanWorkerState::Start as u8,
                        ScanWorkerState::Busy as u8,
                        Ordering::SeqCst,
                        Ordering::SeqCst,
                    )
                    .is_err()
                {
                    continue;
                }
                let direction = shared.direction();
                if let Err(e) = tuner.scan_channel(direction).await {
                    debug!(%direction, error = %e, "channel scan failed");
                }
                // Busy -> Idle, without clobbering an End stored mid-scan.
                let _ = shared.state.compare_exchange(
                    ScanWorkerState::Busy as u8,
                    ScanWorkerState::Idle as u8,
                    Ordering::SeqCst,
                    Ordering::SeqCst,
                );
            }
            ScanWorkerState::Idle | ScanWorkerState::Busy => {}
        }
    }
    debug!("scan worker stopped");
}
