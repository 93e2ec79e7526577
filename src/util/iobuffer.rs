//! # RxBuffer - Receive-Side Streaming Buffer
//!
//! This module provides the append-only receive buffer that sits between the
//! transport and the frame scanner. The transport appends whatever the bus
//! delivered; the scanner reads one contiguous slice, and the bytes it has
//! settled (emitted frames plus resync skips) are compacted away so the
//! buffer stays bounded across scans.
//!
//! ## Usage
//!
//! ```rust
//! use loadcell_rs::util::RxBuffer;
//!
//! let mut buffer = RxBuffer::new();
//! buffer.write(&[0x01, 0x02, 0x03]).unwrap();
//!
//! assert_eq!(buffer.as_slice(), &[0x01, 0x02, 0x03]);
//! buffer.consume(2);
//! assert_eq!(buffer.as_slice(), &[0x03]);
//! ```

use thiserror::Error;

/// Errors that can occur during RxBuffer operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RxBufferError {
    #[error("Capacity limit exceeded: {limit}")]
    CapacityExceeded { limit: usize },
}

/// Append/scan/compact buffer for inbound bus bytes
///
/// Responses on this bus are at most a dozen bytes, so the limit is a wedge
/// detector rather than a sizing concern: a buffer anywhere near it means the
/// consumer stopped scanning.
#[derive(Debug, Clone)]
pub struct RxBuffer {
    data: Vec<u8>,
    capacity_limit: usize,
    bytes_written: u64,
    bytes_consumed: u64,
}

impl RxBuffer {
    /// Default capacity limit (64 KiB)
    pub const DEFAULT_CAPACITY_LIMIT: usize = 64 * 1024;

    /// Create a new RxBuffer with the default capacity limit
    pub fn new() -> Self {
        Self::with_capacity_limit(Self::DEFAULT_CAPACITY_LIMIT)
    }

    /// Create a new RxBuffer with a custom capacity limit
    pub fn with_capacity_limit(limit: usize) -> Self {
        Self {
            data: Vec::new(),
            capacity_limit: limit,
            bytes_written: 0,
            bytes_consumed: 0,
        }
    }

    /// Append data to the end of the buffer
    pub fn write(&mut self, data: &[u8]) -> Result<usize, RxBufferError> {
        if self.data.len() + data.len() > self.capacity_limit {
            return Err(RxBufferError::CapacityExceeded {
                limit: self.capacity_limit,
            });
        }
        self.data.extend_from_slice(data);
        self.bytes_written += data.len() as u64;
        Ok(data.len())
    }

    /// View the buffered bytes as one contiguous slice
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Remove up to `count` bytes from the front of the buffer
    ///
    /// Returns the number of bytes actually removed.
    pub fn consume(&mut self, count: usize) -> usize {
        let to_consume = count.min(self.data.len());
        self.data.drain(..to_consume);
        self.bytes_consumed += to_consume as u64;
        to_consume
    }

    /// Number of bytes currently buffered
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Drop all buffered bytes
    ///
    /// Cleared bytes count as consumed so stream offsets stay monotonic.
    pub fn clear(&mut self) {
        self.bytes_consumed += self.data.len() as u64;
        self.data.clear();
    }

    /// Get buffer statistics
    pub fn stats(&self) -> RxBufferStats {
        RxBufferStats {
            current_len: self.data.len(),
            bytes_written: self.bytes_written,
            bytes_consumed: self.bytes_consumed,
        }
    }
}

impl Default for RxBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about an RxBuffer instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RxBufferStats {
    /// Current number of bytes in the buffer
    pub current_len: usize,
    /// Total bytes written since creation
    pub bytes_written: u64,
    /// Total bytes consumed since creation
    pub bytes_consumed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_and_consume() {
        let mut buffer = RxBuffer::new();

        assert_eq!(buffer.write(&[1, 2, 3]).unwrap(), 3);
        assert_eq!(buffer.len(), 3);
        assert!(!buffer.is_empty());

        assert_eq!(buffer.consume(2), 2);
        assert_eq!(buffer.as_slice(), &[3]);

        // Consuming more than available takes what is there
        assert_eq!(buffer.consume(10), 1);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_capacity_limit() {
        let mut buffer = RxBuffer::with_capacity_limit(4);
        assert!(buffer.write(&[1, 2, 3]).is_ok());
        assert_eq!(
            buffer.write(&[4, 5]),
            Err(RxBufferError::CapacityExceeded { limit: 4 })
        );
        // The failed write must not partially apply
        assert_eq!(buffer.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_clear_counts_as_consumed() {
        let mut buffer = RxBuffer::new();
        buffer.write(&[1, 2, 3, 4, 5]).unwrap();
        buffer.consume(2);
        buffer.clear();

        let stats = buffer.stats();
        assert_eq!(stats.current_len, 0);
        assert_eq!(stats.bytes_written, 5);
        assert_eq!(stats.bytes_consumed, 5);
    }
}
