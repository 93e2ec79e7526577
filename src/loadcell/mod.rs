//! The loadcell module contains the core protocol implementation: the frame
//! codec, the stream scanner, the scan-decode-register engine, and the
//! serial transport adapter.

pub mod frame;
pub mod protocol;
pub mod scanner;
pub mod serial;
pub mod serial_mock;

pub use frame::{FrameShape, ParamWrite, ResponseFrame};
pub use protocol::{DecodedEvent, ProtocolEngine};
pub use scanner::{ScanOutcome, ScanStats};
pub use serial::{LoadCellHandle, SerialConfig, SerialPort};
