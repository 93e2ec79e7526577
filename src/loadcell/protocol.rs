//! # Protocol Engine
//!
//! Ties the pipeline together: transport bytes go in, address-attributed
//! decoded events come out. The engine owns the receive buffer, the scanner
//! diagnostics, and the device registry; it never touches I/O, so exactly
//! one `feed` call can be in flight per bus and the transport task stays
//! free to block on the port.
//!
//! Consumers get events as the return value of `feed` (or through the
//! channel the serial monitor loop forwards them into); the engine holds no
//! reassignable callbacks.

use crate::device_registry::DeviceRegistry;
use crate::error::LoadCellError;
use crate::loadcell::frame::FrameShape;
use crate::loadcell::scanner::{scan, ScanStats};
use crate::payload::{
    decode_ident, decode_params, DecodedWeight, DeviceIdent, DeviceParams, WeightDecoder,
    WeightScaling,
};
use crate::util::{RxBuffer, RxBufferError};
use serde::Serialize;

/// A decoded response, tagged with the address of the device that sent it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DecodedEvent {
    Weight { address: u8, sample: DecodedWeight },
    Ident { address: u8, ident: DeviceIdent },
    Params { address: u8, params: DeviceParams },
}

impl DecodedEvent {
    /// Source address of the device this event came from.
    pub fn address(&self) -> u8 {
        match *self {
            DecodedEvent::Weight { address, .. }
            | DecodedEvent::Ident { address, .. }
            | DecodedEvent::Params { address, .. } => address,
        }
    }
}

/// The scan-decode-register pipeline for one bus.
#[derive(Debug, Default)]
pub struct ProtocolEngine {
    buffer: RxBuffer,
    stats: ScanStats,
    decoder: WeightDecoder,
    registry: DeviceRegistry,
    stream_offset: usize,
}

impl ProtocolEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with a device-specific scaling constant for the binary weight
    /// encoding.
    pub fn with_scaling(scaling: WeightScaling) -> Self {
        ProtocolEngine {
            decoder: WeightDecoder::new(scaling),
            ..Self::default()
        }
    }

    /// Appends transport bytes and drains every frame that is now complete.
    ///
    /// Weight events are also recorded into the registry, keyed by the
    /// frame's source address. Returns events in stream order; an empty
    /// vector just means no frame finished yet.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Vec<DecodedEvent>, LoadCellError> {
        self.buffer.write(bytes).map_err(|e| match e {
            RxBufferError::CapacityExceeded { limit } => LoadCellError::BufferOverflow { limit },
        })?;

        let outcome = scan(self.buffer.as_slice(), self.stream_offset, &mut self.stats);
        self.buffer.consume(outcome.consumed);
        self.stream_offset += outcome.consumed;

        let mut events = Vec::with_capacity(outcome.frames.len());
        for frame in &outcome.frames {
            let address = frame.address();
            let event = match frame.shape() {
                FrameShape::Weight => {
                    let sample = self.decoder.decode(frame);
                    self.registry.record(address, &sample);
                    DecodedEvent::Weight { address, sample }
                }
                FrameShape::Ident => DecodedEvent::Ident {
                    address,
                    ident: decode_ident(frame),
                },
                FrameShape::Params => DecodedEvent::Params {
                    address,
                    params: decode_params(frame),
                },
            };
            events.push(event);
        }
        Ok(events)
    }

    /// Discards any buffered partial response.
    ///
    /// Callers must do this before transmitting a new command so a stale
    /// response cannot be attributed to the new request; the protocol has no
    /// sequence numbers to catch the mixup.
    pub fn clear(&mut self) {
        self.stream_offset += self.buffer.len();
        self.buffer.clear();
    }

    /// Number of bytes waiting for a frame boundary.
    pub fn pending_bytes(&self) -> usize {
        self.buffer.len()
    }

    /// Scanner diagnostics accumulated since creation.
    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    /// The device registry fed by this engine.
    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// Mutable registry access, for zero/calibrate/correction operations.
    pub fn registry_mut(&mut self) -> &mut DeviceRegistry {
        &mut self.registry
    }
}
