//! RDS capture and decode engine.
//!
//! The QN8035 latches one RDS group at a time into its data registers; the
//! decode task samples them on a fixed cadence, filters for the group types
//! that carry program service text, and reconstructs a stable string from
//! the noisy stream.
//!
//! Broadcast RDS is unreliable at the single-group level, so a character
//! is only trusted after it has been decoded identically twice in a row at
//! the same text offset: the first sighting goes into a candidate buffer,
//! the matching second sighting promotes it into the confirmed buffer that
//! [`rds_text`](fmtuner_core::Tuner::rds_text) exposes.
//!
//! The task runs for the lifetime of the driver. Retunes do not restart it;
//! they step its state machine through `Idle` (capture suppressed) and
//! `Clear` (buffers blanked, capture resumed), so a reader can never see
//! text left over from a previously tuned channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use fmtuner_core::error::Result;
use fmtuner_core::RegisterBus;

use crate::registers::*;
use crate::tuner::Shared;

/// Number of visible characters in the decoded text.
pub(crate) const RDS_TEXT_LEN: usize = 15;

/// Sampling cadence of the decode task. Also bounds how long shutdown and
/// retune state changes wait before the task observes them.
const RDS_POLL_INTERVAL: Duration = Duration::from_millis(15);

/// State of the RDS decode task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum RdsState {
    /// Capture suppressed (during retune and scan).
    Idle = 0,
    /// Sampling the RDS registers and decoding.
    Capture = 1,
    /// Blank both buffers, then resume capture.
    Clear = 2,
    /// Terminal: the decode task exits at its next wake-up.
    End = 3,
}

impl RdsState {
    pub(crate) fn from_u8(raw: u8) -> RdsState {
        match raw {
            0 => RdsState::Idle,
            1 => RdsState::Capture,
            2 => RdsState::Clear,
            _ => RdsState::End,
        }
    }
}

/// The confirmed (reader-visible) and candidate (pending confirmation)
/// text buffers. Always exactly [`RDS_TEXT_LEN`] bytes, space-padded.
#[derive(Debug)]
pub(crate) struct RdsBuffers {
    pub(crate) confirmed: [u8; RDS_TEXT_LEN],
    pub(crate) candidate: [u8; RDS_TEXT_LEN],
}

impl RdsBuffers {
    pub(crate) fn new() -> RdsBuffers {
        RdsBuffers {
            confirmed: [b' '; RDS_TEXT_LEN],
            candidate: [b' '; RDS_TEXT_LEN],
        }
    }

    /// Blank both buffers back to spaces.
    pub(crate) fn blank(&mut self) {
        self.confirmed.fill(b' ');
        self.candidate.fill(b' ');
    }
}

/// Decode one sampled group into the buffers.
///
/// Block B carries the group type and the 2-character text offset in its
/// low bits; block D carries the two characters themselves. Groups of any
/// other type are ignored, as are offsets that fall outside the buffers.
pub(crate) fn apply_group(buffers: &mut RdsBuffers, block_b: u16, block_d: u16) {
    let group = block_b & RDS_GROUP_TYPE_MASK;
    if group != RDS_GROUP_A0 && group != RDS_GROUP_B0 {
        return;
    }

    let offset = ((block_b & 0x03) << 1) as usize;
    if offset + 1 >= RDS_TEXT_LEN {
        return;
    }

    confirm(buffers, offset, (block_d >> 8) as u8);
    confirm(buffers, offset + 1, (block_d & 0xFF) as u8);
}

/// Two-sample confirmation of one character.
///
/// Promotes the character into the confirmed buffer only when it matches
/// the candidate seen at the same offset on the previous reception; a new
/// printable character replaces the candidate instead.
fn confirm(buffers: &mut RdsBuffers, index: usize, ch: u8) {
    if buffers.candidate[index] == ch {
        buffers.confirmed[index] = ch;
    } else if is_printable(ch) {
        buffers.candidate[index] = ch;
    }
}

fn is_printable(ch: u8) -> bool {
    (0x20..=0x7E).contains(&ch)
}

/// Read the latched group's block B and block D register pairs.
async fn read_group(bus: &mut dyn RegisterBus) -> Result<(u16, u16)> {
    let b_low = bus.read_register(REG_RDSD3).await?;
    let b_high = bus.read_register(REG_RDSD2).await?;
    let d_low = bus.read_register(REG_RDSD7).await?;
    let d_high = bus.read_register(REG_RDSD6).await?;
    Ok((
        (b_high as u16) << 8 | b_low as u16,
        (d_high as u16) << 8 | d_low as u16,
    ))
}

/// Spawn the decode task. It exits only when the state machine reaches
/// [`RdsState::End`].
pub(crate) fn spawn_decoder(shared: Arc<Shared>) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!("RDS decode task started");
        loop {
            tokio::time::sleep(RDS_POLL_INTERVAL).await;
            match shared.rds_state() {
                RdsState::End => break,
                RdsState::Clear => {
                    shared.lock_rds_buffers().blank();
                    shared.set_rds_state(RdsState::Capture);
                }
                RdsState::Capture => {
                    // Never contend with a tune or scan for the bus; skip
                    // this sample and catch the next group.
                    let group = match shared.bus.try_lock() {
                        Ok(mut bus) => read_group(bus.as_mut()).await,
                        Err(_) => continue,
                    };
                    if let Ok((block_b, block_d)) = group {
                        apply_group(&mut shared.lock_rds_buffers(), block_b, block_d);
                    }
                }
                RdsState::Idle => {}
            }
        }
        debug!("RDS decode task stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Block B for a program-service group with the given 2-character
    /// segment index (0-3).
    fn block_b(segment: u16) -> u16 {
        RDS_GROUP_A0 | segment
    }

    fn block_d(first: u8, second: u8) -> u16 {
        (first as u16) << 8 | second as u16
    }

    #[test]
    fn single_reception_stays_out_of_confirmed_buffer() {
        let mut buffers = RdsBuffers::new();
        apply_group(&mut buffers, block_b(0), block_d(b'R', b'A'));

        assert_eq!(&buffers.confirmed[..2], b"  ");
        assert_eq!(&buffers.candidate[..2], b"RA");
    }

    #[test]
    fn second_identical_reception_confirms() {
        let mut buffers = RdsBuffers::new();
        apply_group(&mut buffers, block_b(0), block_d(b'R', b'A'));
        apply_group(&mut buffers, block_b(0), block_d(b'R', b'A'));

        assert_eq!(&buffers.confirmed[..2], b"RA");
    }

    #[test]
    fn differing_receptions_replace_candidate_only() {
        let mut buffers = RdsBuffers::new();
        apply_group(&mut buffers, block_b(0), block_d(b'R', b'A'));
        apply_group(&mut buffers, block_b(0), block_d(b'X', b'Y'));

        // Neither pair was seen twice in a row.
        assert_eq!(&buffers.confirmed[..2], b"  ");
        assert_eq!(&buffers.candidate[..2], b"XY");

        apply_group(&mut buffers, block_b(0), block_d(b'X', b'Y'));
        assert_eq!(&buffers.confirmed[..2], b"XY");
    }

    #[test]
    fn confirmed_character_survives_later_noise() {
        let mut buffers = RdsBuffers::new();
        apply_group(&mut buffers, block_b(0), block_d(b'R', b'A'));
        apply_group(&mut buffers, block_b(0), block_d(b'R', b'A'));
        apply_group(&mut buffers, block_b(0), block_d(b'#', b'%'));

        // One noisy reception never rewrites confirmed text.
        assert_eq!(&buffers.confirmed[..2], b"RA");
    }

    #[test]
    fn segment_index_maps_to_character_offset() {
        let mut buffers = RdsBuffers::new();
        for _ in 0..2 {
            apply_group(&mut buffers, block_b(0), block_d(b'A', b'B'));
            apply_group(&mut buffers, block_b(1), block_d(b'C', b'D'));
            apply_group(&mut buffers, block_b(2), block_d(b'E', b'F'));
            apply_group(&mut buffers, block_b(3), block_d(b'G', b'H'));
        }
        assert_eq!(&buffers.confirmed[..8], b"ABCDEFGH");
    }

    #[test]
    fn unrecognized_group_types_are_ignored() {
        let mut buffers = RdsBuffers::new();
        // Group type 2A (radiotext) -- not handled by this decoder.
        let foreign = 0x2000;
        apply_group(&mut buffers, foreign, block_d(b'R', b'A'));
        apply_group(&mut buffers, foreign, block_d(b'R', b'A'));

        assert_eq!(buffers.confirmed, [b' '; RDS_TEXT_LEN]);
        assert_eq!(buffers.candidate, [b' '; RDS_TEXT_LEN]);
    }

    #[test]
    fn non_printable_characters_never_enter_candidate() {
        let mut buffers = RdsBuffers::new();
        apply_group(&mut buffers, block_b(0), block_d(0x03, 0x7F));
        apply_group(&mut buffers, block_b(0), block_d(0x03, 0x7F));

        assert_eq!(buffers.confirmed, [b' '; RDS_TEXT_LEN]);
        assert_eq!(buffers.candidate, [b' '; RDS_TEXT_LEN]);
    }

    #[test]
    fn blank_resets_both_buffers() {
        let mut buffers = RdsBuffers::new();
        apply_group(&mut buffers, block_b(0), block_d(b'R', b'A'));
        apply_group(&mut buffers, block_b(0), block_d(b'R', b'A'));
        buffers.blank();

        assert_eq!(buffers.confirmed, [b' '; RDS_TEXT_LEN]);
        assert_eq!(buffers.candidate, [b' '; RDS_TEXT_LEN]);
    }

    #[test]
    fn space_padded_buffer_confirms_spaces_immediately() {
        // A broadcast space matches the blank candidate on first sight,
        // which is fine: it is identical to the initial padding.
        let mut buffers = RdsBuffers::new();
        apply_group(&mut buffers, block_b(1), block_d(b' ', b' '));
        assert_eq!(&buffers.confirmed[2..4], b"  ");
    }
}
