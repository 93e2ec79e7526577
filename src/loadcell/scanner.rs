//! # Stream Scanner
//!
//! Turns the accumulating receive buffer into a sequence of validated
//! response frames. Frame boundaries never line up with transport reads on
//! this bus: several broadcast answers can arrive concatenated in one read,
//! one answer can arrive split across several, and line noise can land
//! anywhere. The scanner walks the buffer left to right, accepts every
//! checksum-valid frame it finds, and resynchronizes one byte at a time past
//! anything else, so a corrupted frame never costs more than itself.
//!
//! The scanner owns no state; the caller owns the buffer and compacts it by
//! the reported consumed count after each pass.

use crate::constants::RESPONSE_MIN_LEN;
use crate::loadcell::frame::{classify, parse_response, ResponseFrame};
use crate::util::format_hex_compact;
use log::{debug, trace};

/// Diagnostic counters for scanner activity.
///
/// Rejections are part of normal operation on a noisy bus and are never
/// surfaced as errors; these counters and the debug log are the only way to
/// observe them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Validated frames emitted
    pub frames_emitted: u64,
    /// Bytes passed over during single-byte resynchronization
    pub bytes_skipped: u64,
    /// Plausible frame starts refuted by their checksum
    pub checksum_rejects: u64,
}

/// Result of one scanner pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Validated frames, in stream order
    pub frames: Vec<ResponseFrame>,
    /// Bytes the caller must remove from the front of the buffer
    pub consumed: usize,
}

/// Scans `buf` for response frames.
///
/// `base_offset` is the stream position of `buf[0]`; emitted frames carry
/// `base_offset + i` as their source offset. The scan stops at the first
/// position that might be a frame still in flight, leaving those bytes
/// unconsumed for the next append.
pub fn scan(buf: &[u8], base_offset: usize, stats: &mut ScanStats) -> ScanOutcome {
    let mut frames = Vec::new();
    let mut i = 0;

    while buf.len() - i >= RESPONSE_MIN_LEN {
        match parse_response(&buf[i..]) {
            Ok((_rest, raw)) => {
                trace!(
                    "frame at stream offset {}: {}",
                    base_offset + i,
                    format_hex_compact(raw.bytes)
                );
                let len = raw.bytes.len();
                frames.push(ResponseFrame::from_raw(raw, base_offset + i));
                stats.frames_emitted += 1;
                i += len;
            }
            Err(nom::Err::Incomplete(_)) => {
                // Prefix of a frame not fully arrived; keep the tail.
                break;
            }
            Err(_) => {
                if classify(buf[i + 1], buf[i + 2]).is_some() {
                    stats.checksum_rejects += 1;
                    debug!(
                        "checksum reject at stream offset {}, resyncing",
                        base_offset + i
                    );
                }
                stats.bytes_skipped += 1;
                i += 1;
            }
        }
    }

    ScanOutcome {
        frames,
        consumed: i,
    }
}
