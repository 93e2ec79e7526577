//! Load-Cell Bus Protocol Constants
//!
//! This module defines the constants used in the load-cell bus protocol
//! implementation: function and register codes, response frame lengths,
//! and the device's fixed lookup tables.

/// Function code for read requests and read responses
pub const FUNC_READ: u8 = 0x05;

/// Function code carried by unsolicited continuous weight updates
pub const FUNC_CONTINUOUS: u8 = 0x06;

/// Function code for write commands (address change, zero set, parameter write)
pub const FUNC_WRITE: u8 = 0x63;

/// Register code for weight readings
pub const REG_WEIGHT: u8 = 0x02;

/// Register code for the device identifier
pub const REG_ID: u8 = 0x05;

/// Register code for the parameter block
pub const REG_PARAM: u8 = 0x23;

/// Register code targeted by the address-change command
pub const REG_ADDRESS: u8 = 0x10;

/// Register code targeted by the zero-set command
pub const REG_ZERO_SET: u8 = 0x06;

/// Broadcast destination address used by all outbound commands
pub const BROADCAST_ADDR: u8 = 0x00;

/// Fixed argument byte carried by every read command
pub const READ_ARG: u8 = 0x05;

/// Fixed argument byte carried by the zero-set command
pub const ZERO_SET_ARG: u8 = 0x03;

// ----------------------------------------------------------------------------
// Response frame lengths (all frames end with a wrapping-sum checksum byte)
// ----------------------------------------------------------------------------

/// Legacy weight response: 2-byte BCD magnitude
pub const WEIGHT_FRAME_LEN_BCD: usize = 8;

/// Current weight response: 3-byte binary magnitude
pub const WEIGHT_FRAME_LEN_BINARY: usize = 9;

/// Parameter response
pub const PARAM_FRAME_LEN: usize = 9;

/// Identifier response
pub const ID_FRAME_LEN: usize = 12;

/// Shortest recognizable response; the scanner stops below this
pub const RESPONSE_MIN_LEN: usize = WEIGHT_FRAME_LEN_BCD;

// ----------------------------------------------------------------------------
// Command argument ranges
// ----------------------------------------------------------------------------

/// Lowest address assignable with the address-change command
pub const MIN_DEVICE_ADDRESS: u8 = 1;

/// Highest address assignable with the address-change command
pub const MAX_DEVICE_ADDRESS: u8 = 10;

// ----------------------------------------------------------------------------
// Device lookup tables
// ----------------------------------------------------------------------------

/// Weight resolution in grams per raw unit, indexed by the 4-bit division field
pub const RESOLUTION_TABLE: [f64; 15] = [
    0.1, 0.2, 0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0, 200.0, 500.0, 1000.0, 2000.0, 5000.0,
];

/// Resolution applied when the division field indexes past the table
pub const RESOLUTION_FALLBACK: f64 = 1.0;

/// Configurable maximum capacities in kilograms, indexed by the parameter-write
/// max-weight field
pub const MAX_WEIGHT_TABLE_KG: [u16; 20] = [
    5, 10, 15, 20, 25, 30, 35, 40, 45, 50, 55, 60, 65, 70, 75, 80, 85, 90, 95, 100,
];

/// Scale operating-mode names, indexed by the parameter kind field
pub const SCALE_TYPE_NAMES: [&str; 4] = ["quick", "normal", "crane", "large crane"];

/// Raw units per gram for the 3-byte binary weight encoding, as observed on a
/// transducer configured for 0.1 g resolution. Device-specific; see
/// `WeightScaling` for the configurable knob.
pub const DEFAULT_BINARY_UNITS_PER_GRAM: f64 = 565.4;
