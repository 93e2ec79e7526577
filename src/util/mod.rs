//! # Utility Modules
//!
//! Common utilities used throughout the loadcell-rs crate: the streaming
//! receive buffer and hex encoding/decoding helpers.

pub mod hex;
pub mod iobuffer;

// Re-export commonly used types and functions
pub use hex::{decode_hex, encode_hex, format_hex_compact, hex_to_bytes};
pub use iobuffer::{RxBuffer, RxBufferError, RxBufferStats};
