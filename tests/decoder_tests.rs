//! Golden decode tests for the three payload decoders.

use loadcell_rs::loadcell::frame::ResponseFrame;
use loadcell_rs::payload::{decode_ident, decode_params, WeightDecoder, WeightScaling};
use loadcell_rs::util::hex_to_bytes;
use loadcell_rs::StatusFlags;

fn frame(hex: &str) -> ResponseFrame {
    ResponseFrame::parse(&hex_to_bytes(hex)).unwrap()
}

/// 8-byte legacy frame: BCD 0291 at division 9 is 291 raw units of 100 g.
#[test]
fn test_decode_bcd_weight() {
    let decoder = WeightDecoder::default();
    let sample = decoder.decode(&frame("01 05 02 00 09 02 91 A4"));

    assert_eq!(sample.division, 9);
    assert_eq!(sample.resolution_grams, 100.0);
    assert_eq!(sample.raw_magnitude, 291);
    assert!(!sample.is_negative);
    assert_eq!(sample.weight_grams, 29100.0);
}

/// 9-byte binary frame: the 24-bit magnitude scales by units-per-gram, not
/// by the resolution table.
#[test]
fn test_decode_binary_weight() {
    let decoder = WeightDecoder::default();
    let sample = decoder.decode(&frame("03 06 02 00 00 00 C5 1A EA"));

    assert_eq!(sample.raw_magnitude, 0x00C51A);
    assert!(!sample.is_negative);
    assert!((sample.weight_grams - 50458.0 / 565.4).abs() < 1e-9);
}

/// Bit 7 of byte 4 negates the decoded weight.
#[test]
fn test_decode_sign_bit() {
    let decoder = WeightDecoder::default();
    let sample = decoder.decode(&frame("03 05 02 00 80 00 01 00 8B"));

    assert!(sample.is_negative);
    assert_eq!(sample.raw_magnitude, 256);
    assert!((sample.weight_grams + 256.0 / 565.4).abs() < 1e-9);
}

/// A division index past the resolution table falls back to 1 g instead of
/// failing the frame.
#[test]
fn test_division_fallback() {
    let decoder = WeightDecoder::default();
    let sample = decoder.decode(&frame("02 05 02 00 0F 00 42 5A"));

    assert_eq!(sample.division, 15);
    assert_eq!(sample.resolution_grams, 1.0);
    assert_eq!(sample.raw_magnitude, 42);
    assert_eq!(sample.weight_grams, 42.0);
}

/// The binary scaling constant is configuration, not a literal.
#[test]
fn test_custom_scaling() {
    let decoder = WeightDecoder::new(WeightScaling {
        binary_units_per_gram: 1000.0,
    });
    let sample = decoder.decode(&frame("03 06 02 00 00 00 C5 1A EA"));
    assert!((sample.weight_grams - 50.458).abs() < 1e-9);
}

/// The status byte decodes into typed flags.
#[test]
fn test_status_flags() {
    let decoder = WeightDecoder::default();
    let sample = decoder.decode(&frame("01 05 02 15 09 02 91 B9"));

    let flags = sample.status_flags();
    assert!(flags.contains(StatusFlags::ZERO_ERROR));
    assert!(flags.contains(StatusFlags::OVERLOAD));
    assert!(flags.contains(StatusFlags::CALIBRATION_NEEDED));
    assert!(!flags.contains(StatusFlags::ERROR));
    assert!(!flags.contains(StatusFlags::ZERO_ADJUSTED));
}

/// The ID response carries the four identifier bytes at offsets 7..=10 and
/// the source address at offset 0.
#[test]
fn test_decode_ident() {
    let f = frame("01 05 05 00 00 00 00 41 42 43 44 15");
    assert_eq!(f.address(), 0x01);

    let ident = decode_ident(&f);
    assert_eq!(ident.id, [0x41, 0x42, 0x43, 0x44]);
    assert_eq!(ident.display(), "41-42-43-44");
}

/// The parameter response unpacks its nibble fields and scales the maximum
/// weight by the resolution table.
#[test]
fn test_decode_params() {
    let params = decode_params(&frame("01 05 23 31 25 00 4E 20 ED"));

    assert_eq!(params.division_idx, 3);
    assert_eq!(params.resolution_grams, 1.0);
    assert_eq!(params.kind_idx, 1);
    assert_eq!(params.kind_name, "normal");
    assert_eq!(params.zero_range, 2);
    assert_eq!(params.down_range, 5);
    assert_eq!(params.max_weight_grams, 20000.0);
}
