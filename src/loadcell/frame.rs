//! # Load-Cell Frame Codec
//!
//! This module builds outbound command frames and recognizes inbound response
//! frames for the load-cell bus protocol. Every frame ends with a checksum
//! byte equal to the wrapping sum of all preceding bytes.
//!
//! ## Features
//! - Builders for the six outbound commands (weight/id/parameter read,
//!   zero set, address change, parameter write) with argument validation.
//! - A `nom`-based parser that recognizes exactly one response frame at the
//!   head of its input, distinguishing "more bytes needed" from "not a frame".
//! - `ResponseFrame`, the owned, checksum-verified slice handed to the
//!   payload decoders.
//!
//! Commands always target the broadcast address; the responding device puts
//! its own address in byte 0 of the response, which is what makes several
//! transducers on one bus attributable.

use crate::constants::*;
use crate::error::LoadCellError;
use bytes::{BufMut, BytesMut};
use nom::bytes::streaming::take;
use nom::error::{Error as NomError, ErrorKind};
use nom::{Err as NomErr, IResult, Needed};

/// Computes the protocol checksum: the unsigned sum of all bytes, modulo 256.
pub fn checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// Checks that the final byte of `frame` is the checksum of the rest.
pub fn checksum_valid(frame: &[u8]) -> bool {
    match frame.split_last() {
        Some((ck, body)) => *ck == checksum(body),
        None => false,
    }
}

fn build_command(function: u8, register: u8, args: &[u8]) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(4 + args.len());
    buf.put_u8(BROADCAST_ADDR);
    buf.put_u8(function);
    buf.put_u8(register);
    buf.put_slice(args);
    let ck = checksum(&buf);
    buf.put_u8(ck);
    buf.to_vec()
}

/// Command to read the device identifier.
pub fn id_read_command() -> Vec<u8> {
    build_command(FUNC_READ, REG_ID, &[READ_ARG])
}

/// Command to read the current weight. All devices on the bus answer.
pub fn weight_read_command() -> Vec<u8> {
    build_command(FUNC_READ, REG_WEIGHT, &[READ_ARG])
}

/// Command to read the parameter block.
pub fn param_read_command() -> Vec<u8> {
    build_command(FUNC_READ, REG_PARAM, &[READ_ARG])
}

/// Command to tare the scale at the device.
pub fn zero_set_command() -> Vec<u8> {
    build_command(FUNC_WRITE, REG_ZERO_SET, &[ZERO_SET_ARG])
}

/// Command to assign a new bus address to the responding device.
///
/// Addresses outside 1..=10 are rejected before any bytes are produced.
pub fn address_change_command(new_address: u8) -> Result<Vec<u8>, LoadCellError> {
    if !(MIN_DEVICE_ADDRESS..=MAX_DEVICE_ADDRESS).contains(&new_address) {
        return Err(LoadCellError::InvalidArgument(format!(
            "device address {new_address} outside {MIN_DEVICE_ADDRESS}..={MAX_DEVICE_ADDRESS}"
        )));
    }
    Ok(build_command(FUNC_WRITE, REG_ADDRESS, &[new_address]))
}

/// Arguments for the parameter-write command, one table index per field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamWrite {
    /// Index into the maximum-capacity table
    pub max_weight_idx: u8,
    /// Index into the resolution table
    pub division_idx: u8,
    /// Zero tracking range, 0..=9
    pub zero_range_idx: u8,
    /// Settling zero range, 1..=10
    pub down_range_idx: u8,
    /// Scale operating mode, 0..=3
    pub kind_idx: u8,
}

/// Command to write the parameter block.
pub fn param_write_command(params: &ParamWrite) -> Result<Vec<u8>, LoadCellError> {
    let checks: [(&str, u8, u8, u8); 5] = [
        (
            "max weight index",
            params.max_weight_idx,
            0,
            MAX_WEIGHT_TABLE_KG.len() as u8 - 1,
        ),
        (
            "division index",
            params.division_idx,
            0,
            RESOLUTION_TABLE.len() as u8 - 1,
        ),
        ("zero range", params.zero_range_idx, 0, 9),
        ("settling range", params.down_range_idx, 1, 10),
        (
            "scale kind",
            params.kind_idx,
            0,
            SCALE_TYPE_NAMES.len() as u8 - 1,
        ),
    ];
    for (name, value, lo, hi) in checks {
        if !(lo..=hi).contains(&value) {
            return Err(LoadCellError::InvalidArgument(format!(
                "{name} {value} outside {lo}..={hi}"
            )));
        }
    }
    Ok(build_command(
        FUNC_WRITE,
        REG_PARAM,
        &[
            params.max_weight_idx,
            params.division_idx,
            params.zero_range_idx,
            params.down_range_idx,
            params.kind_idx,
        ],
    ))
}

/// The response shapes the scanner recognizes, keyed on (function, register).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameShape {
    /// Weight reading, 8 bytes (BCD) or 9 bytes (binary)
    Weight,
    /// Parameter block, 9 bytes
    Params,
    /// Device identifier, 12 bytes
    Ident,
}

/// Classifies a candidate frame start from its function and register bytes.
pub fn classify(function: u8, register: u8) -> Option<FrameShape> {
    match (function, register) {
        (FUNC_READ | FUNC_CONTINUOUS, REG_WEIGHT) => Some(FrameShape::Weight),
        (_, REG_ID) => Some(FrameShape::Ident),
        (_, REG_PARAM) => Some(FrameShape::Params),
        _ => None,
    }
}

/// A borrowed, checksum-verified response produced by `parse_response`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawResponse<'a> {
    pub shape: FrameShape,
    pub bytes: &'a [u8],
}

/// A validated response frame extracted from the byte stream.
///
/// Created by the stream scanner (or `ResponseFrame::parse` for a frame
/// captured whole); immutable; consumed once by the matching decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseFrame {
    bytes: Vec<u8>,
    shape: FrameShape,
    source_offset: usize,
}

impl ResponseFrame {
    pub(crate) fn from_raw(raw: RawResponse<'_>, source_offset: usize) -> Self {
        ResponseFrame {
            bytes: raw.bytes.to_vec(),
            shape: raw.shape,
            source_offset,
        }
    }

    /// Validates a complete captured frame: shape, length, and checksum.
    pub fn parse(bytes: &[u8]) -> Result<ResponseFrame, LoadCellError> {
        if bytes.len() < RESPONSE_MIN_LEN {
            return Err(LoadCellError::FrameParseError(format!(
                "frame of {} bytes is shorter than any response",
                bytes.len()
            )));
        }
        let shape = classify(bytes[1], bytes[2]).ok_or_else(|| {
            LoadCellError::FrameParseError(format!(
                "unrecognized function/register 0x{:02X}/0x{:02X}",
                bytes[1], bytes[2]
            ))
        })?;
        let length_ok = match shape {
            FrameShape::Weight => {
                bytes.len() == WEIGHT_FRAME_LEN_BCD || bytes.len() == WEIGHT_FRAME_LEN_BINARY
            }
            FrameShape::Params => bytes.len() == PARAM_FRAME_LEN,
            FrameShape::Ident => bytes.len() == ID_FRAME_LEN,
        };
        if !length_ok {
            return Err(LoadCellError::FrameParseError(format!(
                "invalid length {} for {:?} frame",
                bytes.len(),
                shape
            )));
        }
        let expected = bytes[bytes.len() - 1];
        let calculated = checksum(&bytes[..bytes.len() - 1]);
        if expected != calculated {
            return Err(LoadCellError::InvalidChecksum {
                expected,
                calculated,
            });
        }
        Ok(ResponseFrame {
            bytes: bytes.to_vec(),
            shape,
            source_offset: 0,
        })
    }

    /// Source device address (byte 0).
    pub fn address(&self) -> u8 {
        self.bytes[0]
    }

    /// Function code (byte 1).
    pub fn function(&self) -> u8 {
        self.bytes[1]
    }

    /// Register code (byte 2).
    pub fn register(&self) -> u8 {
        self.bytes[2]
    }

    /// Which response shape this frame was validated as.
    pub fn shape(&self) -> FrameShape {
        self.shape
    }

    /// Frame length in bytes, checksum included.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Offset of this frame's first byte in the overall receive stream.
    pub fn source_offset(&self) -> usize {
        self.source_offset
    }

    /// The raw frame bytes, checksum included.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Recognizes one response frame at the head of `input`.
///
/// Returns `Err(Incomplete)` when the bytes so far are the prefix of a frame
/// that has not fully arrived, and `Err(Error)` when they cannot start a
/// valid frame at all. The distinction drives the scanner: incomplete input
/// is retained for the next append, an error triggers one-byte resync.
pub fn parse_response(input: &[u8]) -> IResult<&[u8], RawResponse<'_>> {
    if input.len() < RESPONSE_MIN_LEN {
        return Err(NomErr::Incomplete(Needed::new(
            RESPONSE_MIN_LEN - input.len(),
        )));
    }
    match classify(input[1], input[2]) {
        Some(FrameShape::Weight) => parse_weight(input),
        Some(FrameShape::Params) => take_validated(input, PARAM_FRAME_LEN, FrameShape::Params),
        Some(FrameShape::Ident) => take_validated(input, ID_FRAME_LEN, FrameShape::Ident),
        None => Err(NomErr::Error(NomError::new(input, ErrorKind::Tag))),
    }
}

/// Weight frames come in two lengths; the longer shape wins when both
/// checksums validate. With exactly 8 bytes buffered and a failing 8-byte
/// checksum, the candidate may still be the prefix of a split 9-byte frame,
/// so the verdict is deferred until one more byte arrives.
fn parse_weight(input: &[u8]) -> IResult<&[u8], RawResponse<'_>> {
    if input.len() >= WEIGHT_FRAME_LEN_BINARY && checksum_valid(&input[..WEIGHT_FRAME_LEN_BINARY]) {
        let (rest, bytes) = take(WEIGHT_FRAME_LEN_BINARY)(input)?;
        return Ok((
            rest,
            RawResponse {
                shape: FrameShape::Weight,
                bytes,
            },
        ));
    }
    if checksum_valid(&input[..WEIGHT_FRAME_LEN_BCD]) {
        let (rest, bytes) = take(WEIGHT_FRAME_LEN_BCD)(input)?;
        return Ok((
            rest,
            RawResponse {
                shape: FrameShape::Weight,
                bytes,
            },
        ));
    }
    if input.len() == WEIGHT_FRAME_LEN_BCD {
        return Err(NomErr::Incomplete(Needed::new(1)));
    }
    Err(NomErr::Error(NomError::new(input, ErrorKind::Verify)))
}

fn take_validated(input: &[u8], len: usize, shape: FrameShape) -> IResult<&[u8], RawResponse<'_>> {
    let (rest, bytes) = take(len)(input)?;
    if !checksum_valid(bytes) {
        return Err(NomErr::Error(NomError::new(input, ErrorKind::Verify)));
    }
    Ok((rest, RawResponse { shape, bytes }))
}
