//! Qn8035Tuner -- the [`Tuner`] trait implementation for the QN8035.
//!
//! This module ties the register map ([`crate::registers`]), the scan
//! engine ([`crate::scan`]), and the RDS decode task ([`crate::rds`]) to a
//! [`RegisterBus`] to produce a working driver.
//!
//! All register traffic is serialized by one `tokio::sync::Mutex` around
//! the bus. Control-path operations (tune, volume, scan, shutdown) take the
//! lock; display-path readings (frequency, SNR, RSSI, stereo) only
//! `try_lock` so a periodic refresh never stalls behind a scan, which holds
//! the lock for its whole poll window.

use std::sync::atomic::{AtomicU16, AtomicU8, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, Mutex};
use tracing::debug;

use fmtuner_core::error::{Error, Result};
use fmtuner_core::events::TunerEvent;
use fmtuner_core::tuner::Tuner;
use fmtuner_core::types::*;
use fmtuner_core::RegisterBus;

use crate::rds::{self, RdsBuffers, RdsState};
use crate::registers::*;
use crate::scan;
use crate::{BAND_HIGH_MHZ, BAND_LOW_MHZ};

/// Settle delay after reprogramming the channel registers.
const TUNE_SETTLE: Duration = Duration::from_micros(100);

/// Settle delay for the software reset issued at initialization.
const RESET_SETTLE: Duration = Duration::from_millis(1500);

/// Settle delay between the recalibrate and standby writes at shutdown.
const SHUTDOWN_SETTLE: Duration = Duration::from_micros(100);

/// Volume level programmed at initialization.
const DEFAULT_VOLUME: u8 = VOLUME_MAX;

/// Driver state shared between the caller, the scan engine, and the RDS
/// decode task.
pub(crate) struct Shared {
    /// The register bus. One mutex serializes every transaction; the scan
    /// engine holds it for the full scan duration.
    pub(crate) bus: Mutex<Box<dyn RegisterBus>>,
    /// Cache of the currently tuned channel word.
    current_word: AtomicU16,
    /// Cache of the current volume level.
    volume: AtomicU8,
    rds_state: AtomicU8,
    rds_buffers: StdMutex<RdsBuffers>,
}

impl Shared {
    pub(crate) fn rds_state(&self) -> RdsState {
        RdsState::from_u8(self.rds_state.load(Ordering::SeqCst))
    }

    pub(crate) fn set_rds_state(&self, state: RdsState) {
        self.rds_state.store(state as u8, Ordering::SeqCst);
    }

    pub(crate) fn lock_rds_buffers(&self) -> MutexGuard<'_, RdsBuffers> {
        self.rds_buffers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A connected QN8035 FM receiver.
///
/// Constructed via [`Qn8035Builder`](crate::builder::Qn8035Builder). All
/// register traffic goes through the [`RegisterBus`] provided at build
/// time.
pub struct Qn8035Tuner {
    shared: Arc<Shared>,
    info: TunerInfo,
    capabilities: TunerCapabilities,
    event_tx: broadcast::Sender<TunerEvent>,
    /// Handle to the RDS decode task. Never joined; the task exits
    /// cooperatively when the state machine reaches `End`.
    #[allow(dead_code)]
    rds_task: tokio::task::JoinHandle<()>,
}

impl std::fmt::Debug for Qn8035Tuner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Qn8035Tuner")
            .field("info", &self.info)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

impl Qn8035Tuner {
    /// Verify, reset, and program the chip, then spawn the RDS decode task.
    ///
    /// Called by [`Qn8035Builder`](crate::builder::Qn8035Builder); callers
    /// should use the builder API instead.
    pub(crate) async fn initialize(
        mut bus: Box<dyn RegisterBus>,
        bus_name: String,
    ) -> Result<Qn8035Tuner> {
        debug!("initializing QN8035 tuner");

        let id = bus.read_register(REG_CID2).await?;
        if id != QN8035_CHIP_ID {
            debug!(found = id, "chip identity mismatch");
            return Err(Error::IdMismatch {
                expected: QN8035_CHIP_ID,
                found: id,
            });
        }

        // Reset all registers and give the chip time to come back up.
        bus.write_register(REG_SYSTEM1, SYSTEM1_SWRST).await?;
        tokio::time::sleep(RESET_SETTLE).await;

        let (event_tx, _) = broadcast::channel(64);
        let shared = Arc::new(Shared {
            bus: Mutex::new(bus),
            current_word: AtomicU16::new(freq_to_word(BAND_LOW_MHZ)),
            volume: AtomicU8::new(DEFAULT_VOLUME),
            rds_state: AtomicU8::new(RdsState::Idle as u8),
            rds_buffers: StdMutex::new(RdsBuffers::new()),
        });

        let rds_task = rds::spawn_decoder(Arc::clone(&shared));
        let tuner = Qn8035Tuner {
            shared,
            info: TunerInfo {
                chip_name: "QN8035".to_string(),
                chip_id: id,
                bus_name,
            },
            capabilities: TunerCapabilities {
                band: FrequencyBand::new(BAND_LOW_MHZ, BAND_HIGH_MHZ),
                has_snr: true,
                has_rssi: true,
                has_stereo_status: true,
                has_rds: true,
            },
            event_tx,
            rds_task,
        };

        // Program the startup defaults.
        tuner.set_frequency(BAND_LOW_MHZ).await?;
        tuner.set_volume(DEFAULT_VOLUME).await?;

        Ok(tuner)
    }

    fn emit(&self, event: TunerEvent) {
        // Nobody listening is fine.
        let _ = self.event_tx.send(event);
    }
}

#[async_trait]
impl Tuner for Qn8035Tuner {
    fn info(&self) -> &TunerInfo {
        &self.info
    }

    fn capabilities(&self) -> &TunerCapabilities {
        &self.capabilities
    }

    async fn shutdown(&self) -> Result<()> {
        debug!("shutting down QN8035 tuner");
        self.shared.set_rds_state(RdsState::End);

        {
            let mut bus = self.shared.bus.lock().await;
            // Reset and recalibrate the receiver, then drop into standby.
            bus.write_register(REG_SYSTEM1, SYSTEM1_RECAL | SYSTEM1_SWRST)
                .await?;
            tokio::time::sleep(SHUTDOWN_SETTLE).await;
            bus.write_register(REG_SYSTEM1, SYSTEM1_STNBY).await?;
        }

        self.emit(TunerEvent::Shutdown);
        Ok(())
    }

    async fn set_frequency(&self, mhz: f64) -> Result<()> {
        let word = freq_to_word(mhz);
        debug!(mhz, word, "tuning");

        // Stop the decoder from sampling a channel that is about to change.
        self.shared.set_rds_state(RdsState::Idle);

        {
            let mut bus = self.shared.bus.lock().await;
            bus.write_register(REG_CH, (word & 0xFF) as u8).await?;
            bus.write_register(REG_CH_STEP, ((word >> 8) & 0x03) as u8)
                .await?;
            tokio::time::sleep(TUNE_SETTLE).await;
            bus.write_register(
                REG_SYSTEM1,
                SYSTEM1_CCA_CH_DIS | SYSTEM1_RXREQ | SYSTEM1_RDSEN,
            )
            .await?;
        }

        self.shared.current_word.store(word, Ordering::SeqCst);
        // Blank the decode buffers and restart capture on the new channel.
        self.shared.set_rds_state(RdsState::Clear);

        self.emit(TunerEvent::FrequencyChanged {
            mhz: word_to_freq(word),
        });
        Ok(())
    }

    async fn frequency(&self) -> Result<Option<f64>> {
        match self.shared.bus.try_lock() {
            Ok(mut bus) => {
                let low = bus.read_register(REG_CH).await?;
                let step = bus.read_register(REG_CH_STEP).await?;
                Ok(Some(word_to_freq(channel_word(low, step))))
            }
            Err(_) => Ok(None),
        }
    }

    async fn scan_channel(&self, direction: ScanDirection) -> Result<()> {
        debug!(%direction, "scanning for a channel");

        self.shared.set_rds_state(RdsState::Idle);

        let outcome = {
            let mut bus = self.shared.bus.lock().await;
            let current = self.shared.current_word.load(Ordering::SeqCst);
            scan::run_scan(bus.as_mut(), current, direction).await
        };

        // Capture restarts for whatever channel the receiver is now on,
        // whether or not the scan landed anywhere new.
        self.shared.set_rds_state(RdsState::Clear);

        match outcome {
            Ok(word) => {
                self.shared.current_word.store(word, Ordering::SeqCst);
                self.emit(TunerEvent::ScanCompleted {
                    mhz: word_to_freq(word),
                });
                Ok(())
            }
            Err(e) => {
                self.emit(TunerEvent::ScanFailed { direction });
                Err(e)
            }
        }
    }

    async fn set_volume(&self, level: u8) -> Result<()> {
        if level > VOLUME_MAX {
            return Err(Error::InvalidParameter(format!(
                "volume level {level} outside supported range {VOLUME_MIN}-{VOLUME_MAX}"
            )));
        }
        debug!(level, "setting volume");

        {
            let mut bus = self.shared.bus.lock().await;
            let ctl = bus.read_register(REG_VOL_CTL).await?;
            bus.write_register(REG_VOL_CTL, (ctl & !VOL_GAIN_MASK) | level)
                .await?;
        }

        self.shared.volume.store(level, Ordering::SeqCst);
        self.emit(TunerEvent::VolumeChanged { level });
        Ok(())
    }

    async fn volume(&self) -> u8 {
        if let Ok(mut bus) = self.shared.bus.try_lock() {
            if let Ok(ctl) = bus.read_register(REG_VOL_CTL).await {
                let level = ctl & VOL_GAIN_MASK;
                self.shared.volume.store(level, Ordering::SeqCst);
                return level;
            }
        }
        self.shared.volume.load(Ordering::SeqCst)
    }

    async fn change_volume(&self, direction: VolumeDirection) -> Result<u8> {
        let current = self.shared.volume.load(Ordering::SeqCst);
        let level = match direction {
            VolumeDirection::Up => (current + 1).min(VOLUME_MAX),
            VolumeDirection::Down => current.saturating_sub(1),
        };
        if level != current {
            self.set_volume(level).await?;
        }
        Ok(level)
    }

    async fn snr(&self) -> Result<Option<u8>> {
        match self.shared.bus.try_lock() {
            Ok(mut bus) => Ok(Some(bus.read_register(REG_SNR).await?)),
            Err(_) => Ok(None),
        }
    }

    async fn rssi(&self) -> Result<Option<u8>> {
        match self.shared.bus.try_lock() {
            Ok(mut bus) => Ok(Some(bus.read_register(REG_RSSISIG).await?)),
            Err(_) => Ok(None),
        }
    }

    async fn stereo_status(&self) -> Result<StereoStatus> {
        match self.shared.bus.try_lock() {
            Ok(mut bus) => {
                let status = bus.read_register(REG_STATUS1).await?;
                if status & STATUS1_ST_MO_RX != 0 {
                    Ok(StereoStatus::Mono)
                } else {
                    Ok(StereoStatus::Stereo)
                }
            }
            Err(_) => Ok(StereoStatus::Unknown),
        }
    }

    fn rds_text(&self) -> Result<String> {
        let buffers = self.shared.lock_rds_buffers();
        Ok(String::from_utf8_lossy(&buffers.confirmed).into_owned())
    }

    fn subscribe(&self) -> Result<broadcast::Receiver<TunerEvent>> {
        Ok(self.event_tx.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fmtuner_test_harness::{MockChip, MockRegisterBus};

    async fn mock_tuner() -> (Qn8035Tuner, MockChip) {
        let (bus, chip) = MockRegisterBus::new();
        chip.load(REG_CID2, QN8035_CHIP_ID);
        let tuner = Qn8035Tuner::initialize(Box::new(bus), "mock".to_string())
            .await
            .expect("mock tuner should initialize");
        (tuner, chip)
    }

    /// Script the scanner to stop on `word` once the scan-active bit drops.
    fn stop_on(chip: &MockChip, word: u16, polls: u32) {
        chip.auto_clear_after(REG_SYSTEM1, SYSTEM1_CHSC, polls);
        chip.load_on_clear(REG_CH, (word & 0xFF) as u8);
        chip.load_on_clear(REG_CH_STEP, ((word >> 8) & 0x03) as u8);
    }

    fn blank_text() -> String {
        " ".repeat(rds::RDS_TEXT_LEN)
    }

    #[tokio::test(start_paused = true)]
    async fn initialize_rejects_wrong_chip_identity() {
        let (bus, chip) = MockRegisterBus::new();
        chip.load(REG_CID2, 0x11);

        let err = Qn8035Tuner::initialize(Box::new(bus), "mock".to_string())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::IdMismatch {
                expected: QN8035_CHIP_ID,
                found: 0x11
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn initialize_reports_bus_failure() {
        let (bus, chip) = MockRegisterBus::new();
        chip.induce_fault(true);

        let err = Qn8035Tuner::initialize(Box::new(bus), "mock".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Bus(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn initialize_resets_and_programs_defaults() {
        let (tuner, chip) = mock_tuner().await;
        let writes = chip.writes();

        assert_eq!(writes[0], (REG_SYSTEM1, SYSTEM1_SWRST));
        // Default tune to the low band edge (word 560 = 0x230).
        assert!(writes.contains(&(REG_CH, 0x30)));
        assert!(writes.contains(&(
            REG_SYSTEM1,
            SYSTEM1_CCA_CH_DIS | SYSTEM1_RXREQ | SYSTEM1_RDSEN
        )));
        // Default volume is the maximum analog gain.
        assert!(writes.contains(&(REG_VOL_CTL, VOLUME_MAX)));
        assert_eq!(tuner.volume().await, VOLUME_MAX);

        assert_eq!(tuner.info().chip_name, "QN8035");
        assert!(tuner.capabilities().has_rds);
    }

    #[tokio::test(start_paused = true)]
    async fn set_frequency_writes_channel_then_receive_request() {
        let (tuner, chip) = mock_tuner().await;
        chip.clear_writes();

        tuner.set_frequency(98.3).await.unwrap();

        // Word 766 = 0x2FE: low byte, high bits, then the receive command.
        assert_eq!(
            chip.writes(),
            vec![
                (REG_CH, 0xFE),
                (REG_CH_STEP, 0x02),
                (
                    REG_SYSTEM1,
                    SYSTEM1_CCA_CH_DIS | SYSTEM1_RXREQ | SYSTEM1_RDSEN
                ),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn frequency_reads_back_tuned_value() {
        let (tuner, _chip) = mock_tuner().await;
        tuner.set_frequency(101.7).await.unwrap();

        let mhz = tuner.frequency().await.unwrap().expect("bus is free");
        assert!((mhz - 101.7).abs() < CHANNEL_STEP_MHZ);
    }

    #[tokio::test(start_paused = true)]
    async fn set_volume_accepts_exactly_supported_range() {
        let (tuner, chip) = mock_tuner().await;

        for level in VOLUME_MIN..=VOLUME_MAX {
            tuner.set_volume(level).await.unwrap();
            assert_eq!(chip.peek(REG_VOL_CTL) & VOL_GAIN_MASK, level);
            assert_eq!(tuner.volume().await, level);
        }

        let err = tuner.set_volume(VOLUME_MAX + 1).await.unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
        // The rejected request must not have touched anything.
        assert_eq!(chip.peek(REG_VOL_CTL) & VOL_GAIN_MASK, VOLUME_MAX);
        assert_eq!(tuner.volume().await, VOLUME_MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn set_volume_preserves_non_gain_bits() {
        let (tuner, chip) = mock_tuner().await;
        chip.load(REG_VOL_CTL, 0xF8);

        tuner.set_volume(2).await.unwrap();
        assert_eq!(chip.peek(REG_VOL_CTL), 0xFA);
    }

    #[tokio::test(start_paused = true)]
    async fn change_volume_saturates_at_both_bounds() {
        let (tuner, chip) = mock_tuner().await;

        // Already at maximum: stepping up is a no-op.
        chip.clear_writes();
        assert_eq!(
            tuner.change_volume(VolumeDirection::Up).await.unwrap(),
            VOLUME_MAX
        );
        assert!(chip.writes().is_empty());

        for expected in (VOLUME_MIN..VOLUME_MAX).rev() {
            assert_eq!(
                tuner.change_volume(VolumeDirection::Down).await.unwrap(),
                expected
            );
        }

        // At minimum: stepping down is a no-op.
        chip.clear_writes();
        assert_eq!(
            tuner.change_volume(VolumeDirection::Down).await.unwrap(),
            VOLUME_MIN
        );
        assert!(chip.writes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn scan_success_lands_inside_band() {
        let (tuner, chip) = mock_tuner().await;
        tuner.set_frequency(92.0).await.unwrap();

        let station = freq_to_word(95.5);
        stop_on(&chip, station, 2);

        tuner.scan_channel(ScanDirection::Up).await.unwrap();

        let mhz = tuner.frequency().await.unwrap().expect("bus is free");
        assert!((mhz - 95.5).abs() < CHANNEL_STEP_MHZ);
        assert!(tuner.capabilities().band.contains(mhz));
    }

    #[tokio::test(start_paused = true)]
    async fn scan_timeout_reports_failure_and_keeps_frequency() {
        let (tuner, _chip) = mock_tuner().await;
        tuner.set_frequency(92.0).await.unwrap();

        // No auto-clear script: the scanner never finishes.
        let err = tuner.scan_channel(ScanDirection::Up).await.unwrap_err();
        assert!(matches!(err, Error::Timeout));

        let mhz = tuner.frequency().await.unwrap().expect("bus is free");
        assert!((mhz - 92.0).abs() < CHANNEL_STEP_MHZ);
    }

    #[tokio::test(start_paused = true)]
    async fn readings_do_not_block_while_scan_holds_the_bus() {
        let (tuner, _chip) = mock_tuner().await;
        tuner.set_frequency(92.0).await.unwrap();

        let tuner = Arc::new(tuner);
        let scanning = Arc::clone(&tuner);
        let scan_task =
            tokio::spawn(async move { scanning.scan_channel(ScanDirection::Up).await });

        // Land inside the scan's poll window; it holds the bus throughout.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(tuner.frequency().await.unwrap(), None);
        assert_eq!(tuner.snr().await.unwrap(), None);
        assert_eq!(tuner.rssi().await.unwrap(), None);
        assert_eq!(tuner.stereo_status().await.unwrap(), StereoStatus::Unknown);
        // The cached volume is still served.
        assert_eq!(tuner.volume().await, VOLUME_MAX);

        let outcome = scan_task.await.expect("scan task must not panic");
        assert!(matches!(outcome.unwrap_err(), Error::Timeout));
    }

    #[tokio::test(start_paused = true)]
    async fn snr_rssi_and_stereo_read_status_registers() {
        let (tuner, chip) = mock_tuner().await;
        chip.load(REG_SNR, 28);
        chip.load(REG_RSSISIG, 41);
        chip.load(REG_STATUS1, 0x00);

        assert_eq!(tuner.snr().await.unwrap(), Some(28));
        assert_eq!(tuner.rssi().await.unwrap(), Some(41));
        assert_eq!(tuner.stereo_status().await.unwrap(), StereoStatus::Stereo);

        chip.load(REG_STATUS1, STATUS1_ST_MO_RX);
        assert_eq!(tuner.stereo_status().await.unwrap(), StereoStatus::Mono);
    }

    #[tokio::test(start_paused = true)]
    async fn rds_text_appears_after_repeated_groups() {
        let (tuner, chip) = mock_tuner().await;
        assert_eq!(tuner.rds_text().unwrap(), blank_text());

        // Latch a program-service group: segment 0, characters "RA".
        chip.load(REG_RDSD2, 0x00);
        chip.load(REG_RDSD3, 0x00);
        chip.load(REG_RDSD6, b'R');
        chip.load(REG_RDSD7, b'A');

        // The decode task samples the same group on consecutive passes,
        // which is exactly the two sightings confirmation needs.
        tokio::time::sleep(Duration::from_millis(100)).await;
        let text = tuner.rds_text().unwrap();
        assert_eq!(&text[..2], "RA");
        assert_eq!(text.len(), rds::RDS_TEXT_LEN);
    }

    #[tokio::test(start_paused = true)]
    async fn retune_blanks_decoded_text() {
        let (tuner, chip) = mock_tuner().await;
        chip.load(REG_RDSD6, b'R');
        chip.load(REG_RDSD7, b'A');
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_ne!(tuner.rds_text().unwrap(), blank_text());

        // Quiet the latched group, then retune.
        chip.load(REG_RDSD6, 0x00);
        chip.load(REG_RDSD7, 0x00);
        tuner.set_frequency(100.0).await.unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(tuner.rds_text().unwrap(), blank_text());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_powers_down_and_stops_decode_task() {
        let (tuner, chip) = mock_tuner().await;
        chip.clear_writes();

        tuner.shutdown().await.unwrap();
        assert_eq!(
            chip.writes(),
            vec![
                (REG_SYSTEM1, SYSTEM1_RECAL | SYSTEM1_SWRST),
                (REG_SYSTEM1, SYSTEM1_STNBY),
            ]
        );

        // The decode task observes End within one of its sleep intervals.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(tuner.rds_task.is_finished());

        // Shutdown is idempotent.
        tuner.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn events_are_broadcast_to_subscribers() {
        let (tuner, chip) = mock_tuner().await;
        let mut events = tuner.subscribe().unwrap();

        tuner.set_frequency(98.3).await.unwrap();
        match events.recv().await.unwrap() {
            TunerEvent::FrequencyChanged { mhz } => {
                assert!((mhz - 98.3).abs() < CHANNEL_STEP_MHZ)
            }
            other => panic!("unexpected event: {other:?}"),
        }

        tuner.set_volume(3).await.unwrap();
        assert!(matches!(
            events.recv().await.unwrap(),
            TunerEvent::VolumeChanged { level: 3 }
        ));

        stop_on(&chip, freq_to_word(99.9), 1);
        tuner.scan_channel(ScanDirection::Up).await.unwrap();
        assert!(matches!(
            events.recv().await.unwrap(),
            TunerEvent::ScanCompleted { .. }
        ));
    }
}

