//! # Weight Payload Decoding
//!
//! Decodes a validated weight frame into grams. Two incompatible wire
//! encodings exist, distinguished purely by frame length:
//!
//! - 8 bytes (legacy): the magnitude is four BCD digits packed into bytes 5
//!   and 6, scaled by the resolution-table entry the division field selects.
//! - 9 bytes (current): the magnitude is a big-endian 24-bit binary value in
//!   bytes 5..=7, scaled by an empirical units-per-gram constant that is a
//!   property of the transducer, not of the resolution table.
//!
//! Bit 7 of byte 4 negates the result; the low nibble of the same byte is
//! the division index. Decoding is total: the scanner already established
//! shape, length, and checksum.

use crate::constants::{RESOLUTION_FALLBACK, RESOLUTION_TABLE, WEIGHT_FRAME_LEN_BINARY};
use crate::loadcell::frame::{FrameShape, ResponseFrame};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Condition flags reported in the status byte of every weight frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StatusFlags: u8 {
        const ZERO_ERROR         = 0x01;
        const ERROR              = 0x02;
        const OVERLOAD           = 0x04;
        const ZERO_ADJUSTED      = 0x08;
        const CALIBRATION_NEEDED = 0x10;
    }
}

/// A weight reading decoded from a single response frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecodedWeight {
    /// Raw status byte; see [`StatusFlags`]
    pub status: u8,
    /// Division field, the 4-bit resolution-table index
    pub division: u8,
    /// Grams per raw unit selected by the division field
    pub resolution_grams: f64,
    /// Unscaled magnitude as carried on the wire
    pub raw_magnitude: u32,
    /// Sign bit from byte 4
    pub is_negative: bool,
    /// Final signed weight in grams
    pub weight_grams: f64,
}

impl DecodedWeight {
    /// The status byte as typed flags.
    pub fn status_flags(&self) -> StatusFlags {
        StatusFlags::from_bits_truncate(self.status)
    }
}

/// Scaling configuration for the 9-byte binary encoding.
///
/// The constant was measured on a transducer configured for 0.1 g resolution
/// and there is no evidence it holds for other division settings, so it is
/// carried as configuration rather than baked into the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightScaling {
    /// Raw 24-bit units per gram
    pub binary_units_per_gram: f64,
}

impl Default for WeightScaling {
    fn default() -> Self {
        WeightScaling {
            binary_units_per_gram: crate::constants::DEFAULT_BINARY_UNITS_PER_GRAM,
        }
    }
}

/// Decoder for weight frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightDecoder {
    scaling: WeightScaling,
}

impl WeightDecoder {
    pub fn new(scaling: WeightScaling) -> Self {
        WeightDecoder { scaling }
    }

    /// Decodes a validated weight frame. Total over both wire encodings.
    pub fn decode(&self, frame: &ResponseFrame) -> DecodedWeight {
        debug_assert_eq!(frame.shape(), FrameShape::Weight);
        let bytes = frame.bytes();

        let status = bytes[3];
        let division = bytes[4] & 0x0F;
        let is_negative = bytes[4] & 0x80 != 0;

        let resolution_grams = RESOLUTION_TABLE
            .get(division as usize)
            .copied()
            .unwrap_or(RESOLUTION_FALLBACK);

        let (raw_magnitude, magnitude_grams) = if frame.len() == WEIGHT_FRAME_LEN_BINARY {
            let raw =
                (u32::from(bytes[5]) << 16) | (u32::from(bytes[6]) << 8) | u32::from(bytes[7]);
            (raw, f64::from(raw) / self.scaling.binary_units_per_gram)
        } else {
            let raw = bcd_magnitude(bytes[5], bytes[6]);
            (raw, resolution_grams * f64::from(raw))
        };

        let weight_grams = if is_negative {
            -magnitude_grams
        } else {
            magnitude_grams
        };

        DecodedWeight {
            status,
            division,
            resolution_grams,
            raw_magnitude,
            is_negative,
            weight_grams,
        }
    }
}

/// Unpacks four BCD digits from two bytes into a decimal value in 0..=9999.
fn bcd_magnitude(hi: u8, lo: u8) -> u32 {
    let digits = [hi >> 4, hi & 0x0F, lo >> 4, lo & 0x0F];
    digits
        .iter()
        .fold(0u32, |acc, d| acc * 10 + u32::from(*d))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bcd_magnitude() {
        assert_eq!(bcd_magnitude(0x00, 0x00), 0);
        assert_eq!(bcd_magnitude(0x02, 0x91), 291);
        assert_eq!(bcd_magnitude(0x99, 0x99), 9999);
    }

    #[test]
    fn test_status_flags() {
        let flags = StatusFlags::from_bits_truncate(0b0001_0101);
        assert!(flags.contains(StatusFlags::ZERO_ERROR));
        assert!(flags.contains(StatusFlags::OVERLOAD));
        assert!(flags.contains(StatusFlags::CALIBRATION_NEEDED));
        assert!(!flags.contains(StatusFlags::ERROR));
    }
}
