//! Serial port transport for the DAS link.
//!
//! [`SerialTransport`] implements the [`Transport`] trait over a USB virtual
//! COM port or a physical RS-232 line. The DAS flight hardware speaks
//! 1200 baud, 8 data bits, no parity, one stop bit; those are the defaults
//! in [`SerialConfig`].
//!
//! # Example
//!
//! ```no_run
//! use dastest_transport::SerialTransport;
//! use dastest_core::Transport;
//! use std::time::Duration;
//!
//! # async fn example() -> dastest_core::Result<()> {
//! let mut transport = SerialTransport::open("/dev/ttyUSB0", 1200).await?;
//! transport.send(b"P").await?;
//! let mut buf = [0u8; 256];
//! let n = transport.receive(&mut buf, Duration::from_secs(1)).await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::{SerialPortBuilderExt, SerialStream};

use dastest_core::error::{Error, Result};
use dastest_core::transport::Transport;

/// Serial line configuration.
///
/// Defaults match the documented DAS link: 1200-8-N-1.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Baud rate.
    pub baud_rate: u32,
    /// Number of data bits per character.
    pub data_bits: DataBits,
    /// Number of stop bits.
    pub stop_bits: StopBits,
    /// Parity checking.
    pub parity: Parity,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: 1200,
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
            parity: Parity::None,
        }
    }
}

/// Number of data bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBits {
    Seven,
    Eight,
}

impl From<DataBits> for tokio_serial::DataBits {
    fn from(bits: DataBits) -> Self {
        match bits {
            DataBits::Seven => tokio_serial::DataBits::Seven,
            DataBits::Eight => tokio_serial::DataBits::Eight,
        }
    }
}

/// Number of stop bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

impl From<StopBits> for tokio_serial::StopBits {
    fn from(bits: StopBits) -> Self {
        match bits {
            StopBits::One => tokio_serial::StopBits::One,
            StopBits::Two => tokio_serial::StopBits::Two,
        }
    }
}

/// Parity checking mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Odd,
    Even,
}

impl From<Parity> for tokio_serial::Parity {
    fn from(parity: Parity) -> Self {
        match parity {
            Parity::None => tokio_serial::Parity::None,
            Parity::Odd => tokio_serial::Parity::Odd,
            Parity::Even => tokio_serial::Parity::Even,
        }
    }
}

/// Serial port transport to a DAS device.
pub struct SerialTransport {
    /// The underlying serial stream; `None` after close.
    port: Option<SerialStream>,
    /// Endpoint path, kept for logging.
    endpoint: String,
}

impl SerialTransport {
    /// Open a serial endpoint with the given baud rate and default 8-N-1
    /// settings.
    pub async fn open(endpoint: &str, baud_rate: u32) -> Result<Self> {
        let config = SerialConfig {
            baud_rate,
            ..Default::default()
        };
        Self::open_with_config(endpoint, config).await
    }

    /// Open a serial endpoint with full line configuration.
    pub async fn open_with_config(endpoint: &str, config: SerialConfig) -> Result<Self> {
        tracing::debug!(
            endpoint = %endpoint,
            baud_rate = config.baud_rate,
            data_bits = ?config.data_bits,
            stop_bits = ?config.stop_bits,
            parity = ?config.parity,
            "opening serial port"
        );

        let stream = tokio_serial::new(endpoint, config.baud_rate)
            .data_bits(config.data_bits.into())
            .stop_bits(config.stop_bits.into())
            .parity(config.parity.into())
            .open_native_async()
            .map_err(|e| {
                tracing::error!(endpoint = %endpoint, error = %e, "failed to open serial port");
                Error::Transport(format!("failed to open serial port {endpoint}: {e}"))
            })?;

        tracing::info!(endpoint = %endpoint, baud_rate = config.baud_rate, "serial port opened");

        Ok(Self {
            port: Some(stream),
            endpoint: endpoint.to_string(),
        })
    }

    /// The endpoint path this transport was opened on.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Classify an I/O error from the serial driver.
fn map_io_error(e: std::io::Error) -> Error {
    if e.kind() == std::io::ErrorKind::BrokenPipe || e.kind() == std::io::ErrorKind::NotConnected {
        Error::ConnectionLost
    } else {
        Error::Io(e)
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;

        tracing::trace!(endpoint = %self.endpoint, bytes = data.len(), data = ?data, "sending frame");

        port.write_all(data).await.map_err(|e| {
            tracing::error!(endpoint = %self.endpoint, error = %e, "write failed");
            map_io_error(e)
        })?;

        // Flush so the frame hits the line before the settle delay starts.
        port.flush().await.map_err(|e| {
            tracing::error!(endpoint = %self.endpoint, error = %e, "flush failed");
            Error::Io(e)
        })?;

        Ok(())
    }

    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;

        match tokio::time::timeout(timeout, port.read(buf)).await {
            Ok(Ok(n)) => {
                tracing::trace!(endpoint = %self.endpoint, bytes = n, data = ?&buf[..n], "received data");
                Ok(n)
            }
            Ok(Err(e)) => {
                tracing::error!(endpoint = %self.endpoint, error = %e, "read failed");
                Err(map_io_error(e))
            }
            Err(_) => {
                tracing::trace!(
                    endpoint = %self.endpoint,
                    timeout_ms = timeout.as_millis(),
                    "read timed out"
                );
                Err(Error::Timeout)
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut port) = self.port.take() {
            tracing::debug!(endpoint = %self.endpoint, "closing serial port");
            if let Err(e) = port.flush().await {
                tracing::warn!(endpoint = %self.endpoint, error = %e, "flush before close failed");
            }
            // Dropping the stream releases the port.
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.port.is_some()
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        if self.port.is_some() {
            tracing::debug!(endpoint = %self.endpoint, "SerialTransport dropped, releasing port");
        }
    }
}
