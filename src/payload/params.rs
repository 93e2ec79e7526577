//! Parameter payload decoding.
//!
//! The parameter response packs the division index and scale kind into the
//! high and low nibbles of byte 3, the zero and settling ranges into byte 4,
//! and a 24-bit maximum-weight magnitude into bytes 5..=7, scaled by the
//! same resolution table the weight decoder uses.

use crate::constants::{RESOLUTION_FALLBACK, RESOLUTION_TABLE, SCALE_TYPE_NAMES};
use crate::loadcell::frame::{FrameShape, ResponseFrame};
use serde::{Deserialize, Serialize};

/// Device configuration reported by the parameter response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceParams {
    /// Resolution-table index
    pub division_idx: u8,
    /// Grams per raw unit selected by the division index
    pub resolution_grams: f64,
    /// Zero tracking range setting
    pub zero_range: u8,
    /// Settling zero range setting
    pub down_range: u8,
    /// Scale operating-mode index
    pub kind_idx: u8,
    /// Operating-mode name, or "unknown" past the table
    pub kind_name: String,
    /// Configured maximum capacity in grams
    pub max_weight_grams: f64,
}

/// Decodes a validated parameter frame.
pub fn decode_params(frame: &ResponseFrame) -> DeviceParams {
    debug_assert_eq!(frame.shape(), FrameShape::Params);
    let bytes = frame.bytes();

    let division_idx = (bytes[3] & 0xF0) >> 4;
    let kind_idx = bytes[3] & 0x0F;
    let zero_range = (bytes[4] & 0xF0) >> 4;
    let down_range = bytes[4] & 0x0F;

    let max_raw = (u32::from(bytes[5]) << 16) | (u32::from(bytes[6]) << 8) | u32::from(bytes[7]);

    // Past the table the raw magnitude stands as-is, same as the weight path.
    let resolution_grams = RESOLUTION_TABLE
        .get(division_idx as usize)
        .copied()
        .unwrap_or(RESOLUTION_FALLBACK);
    let max_weight_grams = f64::from(max_raw) * resolution_grams;

    let kind_name = SCALE_TYPE_NAMES
        .get(kind_idx as usize)
        .copied()
        .unwrap_or("unknown")
        .to_string();

    DeviceParams {
        division_idx,
        resolution_grams,
        zero_range,
        down_range,
        kind_idx,
        kind_name,
        max_weight_grams,
    }
}
