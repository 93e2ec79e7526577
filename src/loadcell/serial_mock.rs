//! Mock serial port implementation for testing
//!
//! Simulates the bus without hardware: tests queue the bytes the devices
//! would answer with and inspect the bytes the handle transmitted.

use crate::loadcell::serial::SerialPort;
use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// Mock serial port with shared, inspectable buffers.
///
/// Clones share the same buffers, so a test can keep one clone for
/// inspection while the handle owns the other.
#[derive(Clone, Default)]
pub struct MockSerialPort {
    /// Bytes written by the code under test (outgoing)
    tx_buffer: Arc<Mutex<Vec<u8>>>,
    /// Bytes queued for the code under test to read (incoming)
    rx_buffer: Arc<Mutex<VecDeque<u8>>>,
}

impl MockSerialPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue data to be read from the port
    pub fn queue_rx_data(&self, data: &[u8]) {
        self.rx_buffer.lock().unwrap().extend(data);
    }

    /// Get data that was written to the port
    pub fn tx_data(&self) -> Vec<u8> {
        self.tx_buffer.lock().unwrap().clone()
    }

    /// Clear both buffers
    pub fn clear(&self) {
        self.tx_buffer.lock().unwrap().clear();
        self.rx_buffer.lock().unwrap().clear();
    }
}

impl AsyncRead for MockSerialPort {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let mut rx = self.rx_buffer.lock().unwrap();
        // Empty queue reads as end-of-stream; tests queue responses up front.
        let n = rx.len().min(buf.remaining());
        for byte in rx.drain(..n) {
            buf.put_slice(&[byte]);
        }
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockSerialPort {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        data: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.tx_buffer.lock().unwrap().extend_from_slice(data);
        Poll::Ready(Ok(data.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

#[async_trait::async_trait]
impl SerialPort for MockSerialPort {
    async fn flush(&mut self) -> Result<(), std::io::Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[test]
    fn test_mock_port_roundtrip() {
        tokio_test::block_on(async {
            let mock = MockSerialPort::new();
            let mut port = mock.clone();
            mock.queue_rx_data(&[1, 2, 3]);

            let mut buf = [0u8; 8];
            let n = port.read(&mut buf).await.unwrap();
            assert_eq!(&buf[..n], &[1, 2, 3]);

            port.write_all(&[9, 8]).await.unwrap();
            assert_eq!(mock.tx_data(), vec![9, 8]);

            mock.clear();
            assert!(mock.tx_data().is_empty());
        });
    }
}
