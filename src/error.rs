//! # Load-Cell Error Handling
//!
//! This module defines the LoadCellError enum, which represents the different
//! error types that can occur in the loadcell-rs crate.

use thiserror::Error;

/// Represents the different error types that can occur in the load-cell crate.
#[derive(Debug, Error)]
pub enum LoadCellError {
    /// Indicates an error related to the serial port communication.
    #[error("Serial port error: {0}")]
    SerialPortError(String),

    /// Indicates an error when parsing a response frame.
    #[error("Error parsing response frame: {0}")]
    FrameParseError(String),

    /// Indicates a checksum mismatch.
    #[error("Invalid checksum: expected {expected}, calculated {calculated}")]
    InvalidChecksum { expected: u8, calculated: u8 },

    /// Indicates a command argument outside its wire-format range.
    #[error("Invalid command argument: {0}")]
    InvalidArgument(String),

    /// Indicates an operation on an address that has never reported.
    #[error("Unknown device address: 0x{0:02X}")]
    UnknownDevice(u8),

    /// Indicates a calibration attempt with the load too close to the tare point.
    #[error("Calibration rejected: zeroed reading {zeroed:.3} g is too close to zero")]
    CalibrationTooCloseToZero { zeroed: f64 },

    /// Indicates the receive buffer outgrew its configured limit.
    #[error("Receive buffer limit exceeded: {limit} bytes")]
    BufferOverflow { limit: usize },

    /// A catch-all error for uncategorized cases.
    #[error("Other error: {0}")]
    Other(String),
}
