//! Identifier payload decoding: four one-byte identifier fields at fixed
//! offsets 7..=10 of the 12-byte ID response.

use crate::loadcell::frame::{FrameShape, ResponseFrame};
use serde::{Deserialize, Serialize};

/// Device identifier reported by the ID response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdent {
    /// The four identifier bytes, wire order
    pub id: [u8; 4],
}

impl DeviceIdent {
    /// Identifier formatted the way the vendor tooling prints it.
    pub fn display(&self) -> String {
        format!(
            "{:02X}-{:02X}-{:02X}-{:02X}",
            self.id[0], self.id[1], self.id[2], self.id[3]
        )
    }
}

/// Decodes a validated ID frame.
pub fn decode_ident(frame: &ResponseFrame) -> DeviceIdent {
    debug_assert_eq!(frame.shape(), FrameShape::Ident);
    let bytes = frame.bytes();
    DeviceIdent {
        id: [bytes[7], bytes[8], bytes[9], bytes[10]],
    }
}
