//! # Load-Cell Serial Communication
//!
//! The transport adapter for the protocol engine: opens the serial port,
//! transmits command frames, and pumps received bytes into a
//! [`ProtocolEngine`]. The engine itself never blocks on I/O; everything
//! that awaits lives here.
//!
//! A request/response exchange on this bus has no correlation tokens, so
//! [`LoadCellHandle::transact`] treats "discard stale bytes, then transmit"
//! as one step: the engine buffer is cleared immediately before the command
//! goes out, and everything decoded until the deadline is attributed to that
//! command's response window.

use crate::error::LoadCellError;
use crate::loadcell::protocol::{DecodedEvent, ProtocolEngine};
use crate::util::format_hex_compact;
use log::{debug, trace};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::time::{timeout, Instant};
use tokio_serial::SerialPortBuilderExt;

/// Configuration for the serial connection.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    pub baudrate: u32,
    /// Deadline for a complete response window after a command
    pub timeout: Duration,
    /// How long to keep listening after the first response, so a second
    /// device answering the same broadcast is not cut off
    pub settle: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig {
            baudrate: 115_200,
            timeout: Duration::from_secs(1),
            settle: Duration::from_millis(50),
        }
    }
}

/// Trait for serial port operations, so the same handle code runs against
/// real hardware and the mock port in tests.
#[async_trait::async_trait]
pub trait SerialPort: AsyncReadExt + AsyncWriteExt + Unpin + Send {
    async fn flush(&mut self) -> Result<(), std::io::Error>;
}

#[async_trait::async_trait]
impl SerialPort for tokio_serial::SerialStream {
    async fn flush(&mut self) -> Result<(), std::io::Error> {
        AsyncWriteExt::flush(self).await
    }
}

/// Handle to one load-cell bus.
pub struct LoadCellHandle<P: SerialPort = tokio_serial::SerialStream> {
    port: P,
    config: SerialConfig,
}

impl LoadCellHandle {
    /// Opens the serial port with default settings (115200 8N1).
    pub async fn connect(port_name: &str) -> Result<Self, LoadCellError> {
        Self::connect_with_config(port_name, SerialConfig::default()).await
    }

    /// Opens the serial port with custom settings.
    pub async fn connect_with_config(
        port_name: &str,
        config: SerialConfig,
    ) -> Result<Self, LoadCellError> {
        let port = tokio_serial::new(port_name, config.baudrate)
            .data_bits(tokio_serial::DataBits::Eight)
            .stop_bits(tokio_serial::StopBits::One)
            .parity(tokio_serial::Parity::None)
            .timeout(config.timeout)
            .open_native_async()
            .map_err(|e| LoadCellError::SerialPortError(e.to_string()))?;

        Ok(LoadCellHandle { port, config })
    }
}

impl<P: SerialPort> LoadCellHandle<P> {
    /// Wraps an already-open port. Used by tests with the mock port.
    pub fn with_port(port: P, config: SerialConfig) -> Self {
        LoadCellHandle { port, config }
    }

    /// Closes the connection. Dropping the handle closes the port; this
    /// exists for symmetry with `connect`.
    pub async fn disconnect(&mut self) -> Result<(), LoadCellError> {
        Ok(())
    }

    /// Transmits one command frame.
    pub async fn send_command(&mut self, command: &[u8]) -> Result<(), LoadCellError> {
        trace!("tx: {}", format_hex_compact(command));
        self.port
            .write_all(command)
            .await
            .map_err(|e| LoadCellError::SerialPortError(e.to_string()))?;
        SerialPort::flush(&mut self.port)
            .await
            .map_err(|e| LoadCellError::SerialPortError(e.to_string()))
    }

    /// Clears stale bytes, sends `command`, and collects every event decoded
    /// before the deadline.
    ///
    /// After the first response arrives the wait shrinks to the settle
    /// window, long enough for the other devices answering the same
    /// broadcast and short enough to keep a polling loop responsive.
    pub async fn transact(
        &mut self,
        engine: &mut ProtocolEngine,
        command: &[u8],
    ) -> Result<Vec<DecodedEvent>, LoadCellError> {
        engine.clear();
        self.send_command(command).await?;

        let deadline = Instant::now() + self.config.timeout;
        let mut events = Vec::new();
        let mut chunk = [0u8; 256];

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            let window = if events.is_empty() {
                remaining
            } else {
                remaining.min(self.config.settle)
            };

            match timeout(window, self.port.read(&mut chunk)).await {
                Ok(Ok(0)) => break,
                Ok(Ok(n)) => events.extend(engine.feed(&chunk[..n])?),
                Ok(Err(e)) => return Err(LoadCellError::SerialPortError(e.to_string())),
                // Quiet line; the response window is over.
                Err(_) => break,
            }
        }

        if events.is_empty() {
            debug!("no response within {:?}", self.config.timeout);
        }
        Ok(events)
    }

    /// Repeats `command` on a fixed interval, forwarding every decoded event
    /// into `events_tx`. Returns when the receiving side hangs up.
    pub async fn monitor(
        &mut self,
        engine: &mut ProtocolEngine,
        command: &[u8],
        interval: Duration,
        events_tx: mpsc::Sender<DecodedEvent>,
    ) -> Result<(), LoadCellError> {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            for event in self.transact(engine, command).await? {
                if events_tx.send(event).await.is_err() {
                    return Ok(());
                }
            }
        }
    }
}
