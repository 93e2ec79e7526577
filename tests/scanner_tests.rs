//! Tests for the stream scanner: resynchronization after noise, back-to-back
//! frames in one pass, frames split across appends, and robustness against
//! arbitrary byte garbage.

use loadcell_rs::loadcell::frame::checksum_valid;
use loadcell_rs::loadcell::scanner::{scan, ScanStats};
use loadcell_rs::util::hex_to_bytes;
use proptest::prelude::*;

/// 8-byte BCD weight frame from address 0x01: 291 raw units at 100 g.
fn bcd_frame() -> Vec<u8> {
    hex_to_bytes("01 05 02 00 09 02 91 A4")
}

/// 9-byte binary weight frame from address 0x03.
fn binary_frame() -> Vec<u8> {
    hex_to_bytes("03 06 02 00 00 00 C5 1A EA")
}

/// A clean buffer holding exactly one frame is consumed whole.
#[test]
fn test_single_frame() {
    let buf = bcd_frame();
    let mut stats = ScanStats::default();
    let outcome = scan(&buf, 0, &mut stats);

    assert_eq!(outcome.frames.len(), 1);
    assert_eq!(outcome.frames[0].bytes(), bcd_frame().as_slice());
    assert_eq!(outcome.consumed, 8);
    assert_eq!(stats.frames_emitted, 1);
    assert_eq!(stats.bytes_skipped, 0);
}

/// A garbage byte before two valid frames costs exactly that byte: both
/// frames come out, in order.
#[test]
fn test_recovers_after_noise() {
    let mut buf = vec![0xF7];
    buf.extend(bcd_frame());
    buf.extend(binary_frame());

    let mut stats = ScanStats::default();
    let outcome = scan(&buf, 0, &mut stats);

    assert_eq!(outcome.frames.len(), 2);
    assert_eq!(outcome.frames[0].address(), 0x01);
    assert_eq!(outcome.frames[0].source_offset(), 1);
    assert_eq!(outcome.frames[1].address(), 0x03);
    assert_eq!(outcome.frames[1].source_offset(), 9);
    assert_eq!(outcome.consumed, buf.len());
    assert_eq!(stats.bytes_skipped, 1);
}

/// Two concatenated responses to one broadcast decode in a single pass.
#[test]
fn test_back_to_back_frames() {
    let mut buf = binary_frame();
    buf.extend(bcd_frame());

    let mut stats = ScanStats::default();
    let outcome = scan(&buf, 0, &mut stats);

    assert_eq!(outcome.frames.len(), 2);
    assert_eq!(outcome.frames[0].address(), 0x03);
    assert_eq!(outcome.frames[1].address(), 0x01);
    assert_eq!(outcome.consumed, 17);
}

/// Fewer than 8 buffered bytes can never be a frame; the tail is retained.
#[test]
fn test_short_tail_retained() {
    let buf = &bcd_frame()[..5];
    let mut stats = ScanStats::default();
    let outcome = scan(buf, 0, &mut stats);

    assert!(outcome.frames.is_empty());
    assert_eq!(outcome.consumed, 0);
}

/// The first 8 bytes of a 9-byte frame fail the 8-byte checksum, but the
/// scanner must not resync past them: they are a frame still in flight.
#[test]
fn test_split_binary_frame_deferred() {
    let frame = binary_frame();
    let mut stats = ScanStats::default();

    let outcome = scan(&frame[..8], 0, &mut stats);
    assert!(outcome.frames.is_empty());
    assert_eq!(outcome.consumed, 0);

    let outcome = scan(&frame, 0, &mut stats);
    assert_eq!(outcome.frames.len(), 1);
    assert_eq!(outcome.frames[0].len(), 9);
}

/// A plausible header whose checksum fails at both lengths is noise; the
/// scan advances one byte and counts the rejection.
#[test]
fn test_checksum_reject_counts() {
    let mut buf = hex_to_bytes("01 05 02 00 09 02 91 FF");
    // One more byte so the 8-byte candidate cannot be a deferred 9-byte prefix
    buf.push(0x00);

    let mut stats = ScanStats::default();
    let outcome = scan(&buf, 0, &mut stats);

    assert!(outcome.frames.is_empty());
    assert_eq!(outcome.consumed, 2);
    assert!(stats.checksum_rejects >= 1);
}

/// The base offset is carried through to emitted frames, so source offsets
/// keep counting across scan passes.
#[test]
fn test_base_offset_propagates() {
    let buf = bcd_frame();
    let mut stats = ScanStats::default();
    let outcome = scan(&buf, 1000, &mut stats);
    assert_eq!(outcome.frames[0].source_offset(), 1000);
}

proptest! {
    /// Arbitrary garbage never panics the scanner and never consumes more
    /// than the buffer holds; whatever comes out is checksum-valid.
    #[test]
    fn scan_is_total_over_noise(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let mut stats = ScanStats::default();
        let outcome = scan(&data, 0, &mut stats);
        prop_assert!(outcome.consumed <= data.len());
        for frame in &outcome.frames {
            prop_assert!(checksum_valid(frame.bytes()));
        }
    }

    /// A valid frame is recovered from any position in a noise prefix, as
    /// long as the noise cannot alias a register byte.
    #[test]
    fn embedded_frame_recovered(noise in prop::collection::vec(0x30u8..=0xFF, 0..64)) {
        let mut buf = noise.clone();
        // Continuous-update frame: its own function byte (0x06) cannot act
        // as a register for an overlapping candidate.
        buf.extend(hex_to_bytes("04 06 02 00 00 00 C5 1A EB"));

        let mut stats = ScanStats::default();
        let outcome = scan(&buf, 0, &mut stats);

        prop_assert_eq!(outcome.frames.len(), 1);
        prop_assert_eq!(outcome.frames[0].address(), 0x04);
        prop_assert_eq!(outcome.frames[0].source_offset(), noise.len());
        prop_assert_eq!(outcome.consumed, buf.len());
    }
}
