//! The payload module contains the decoders for the three response payloads:
//! weight readings, device identifiers, and the parameter block. Each decoder
//! takes a frame the scanner has already validated and slices fixed fields;
//! decoding never fails.

pub mod ident;
pub mod params;
pub mod weight;

pub use ident::{decode_ident, DeviceIdent};
pub use params::{decode_params, DeviceParams};
pub use weight::{DecodedWeight, StatusFlags, WeightDecoder, WeightScaling};
