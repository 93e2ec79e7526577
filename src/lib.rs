//! # loadcell-rs - A Rust Crate for Load-Cell Bus Communication
//!
//! The loadcell-rs crate decodes and demultiplexes the proprietary binary
//! serial protocol spoken by load-cell transducers sharing a single
//! half-duplex bus. One broadcast query makes every device on the bus
//! answer; the crate extracts checksum-valid frames out of the raw byte
//! stream, decodes them, attributes each reading to its source address, and
//! applies per-device zero/scale calibration.
//!
//! ## Features
//!
//! - Build the outbound command frames (weight/id/parameter read, zero set,
//!   address change, parameter write)
//! - Extract validated response frames from an unbounded, bursty byte
//!   stream, recovering after noise and partial frames
//! - Decode both weight encodings (legacy 2-byte BCD and current 3-byte
//!   binary), identifier responses, and parameter blocks
//! - Track every responding address independently with per-device zero
//!   offset, scale factor, and correction curve
//! - Drive a serial port with tokio, or any `SerialPort` implementation
//! - Support for logging and error handling
//!
//! ## Usage
//!
//! ```no_run
//! use loadcell_rs::{connect, weight_read_command, ProtocolEngine};
//!
//! # async fn run() -> Result<(), loadcell_rs::LoadCellError> {
//! let mut handle = connect("/dev/ttyUSB0").await?;
//! let mut engine = ProtocolEngine::new();
//!
//! let events = handle.transact(&mut engine, &weight_read_command()).await?;
//! println!("{} devices answered", events.len());
//! for device in engine.registry().snapshot() {
//!     println!("0x{:02X}: {:.1} g", device.address, device.last_calibrated_weight);
//! }
//! # Ok(())
//! # }
//! ```

pub mod constants;
pub mod device_registry;
pub mod error;
pub mod loadcell;
pub mod logging;
pub mod payload;
pub mod util;

pub use crate::error::LoadCellError;
pub use crate::logging::{init_logger, log_info};

// Core protocol types
pub use device_registry::{CorrectionPolicy, DeviceRegistry, DeviceState};
pub use loadcell::frame::{
    address_change_command, checksum, id_read_command, param_read_command, param_write_command,
    weight_read_command, zero_set_command, ParamWrite, ResponseFrame,
};
pub use loadcell::serial::{LoadCellHandle, SerialConfig};
pub use loadcell::{DecodedEvent, ProtocolEngine};
pub use payload::{DecodedWeight, DeviceIdent, DeviceParams, StatusFlags, WeightScaling};

/// Connect to the load-cell bus via serial port.
///
/// # Arguments
/// * `port` - Serial port path (e.g., "/dev/ttyUSB0" on Linux, "COM3" on Windows)
///
/// # Returns
/// * `Ok(LoadCellHandle)` - Connected handle for communication
/// * `Err(LoadCellError)` - Connection failed
pub async fn connect(port: &str) -> Result<LoadCellHandle, LoadCellError> {
    LoadCellHandle::connect(port).await
}

/// Disconnect from the load-cell bus.
pub async fn disconnect(handle: &mut LoadCellHandle) -> Result<(), LoadCellError> {
    handle.disconnect().await
}
