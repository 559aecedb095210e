//! Transport trait for DAS device communication.
//!
//! The [`Transport`] trait abstracts over the byte channel to the device.
//! Implementations exist for real serial ports (`dastest-transport`) and for
//! the in-process simulator and expectation mock (`dastest-sim`). The
//! orchestrator operates on a `Transport` rather than on a serial port
//! directly, so the same conformance suite runs against hardware and against
//! deterministic test doubles.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Asynchronous byte-level channel to a DAS device.
///
/// One orchestrator invocation owns the transport for the duration of one
/// test case and is responsible for closing it on every exit path.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Write raw bytes to the device.
    ///
    /// Implementations should not return until all bytes have been handed to
    /// the underlying channel (serial TX buffer, in-memory queue).
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Read available bytes from the device into `buf`.
    ///
    /// Returns the number of bytes read. Waits up to `timeout` for data;
    /// returns [`Error::Timeout`](crate::error::Error::Timeout) if nothing
    /// arrives within the deadline. A timeout is never reported as an empty
    /// successful read.
    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Close the transport.
    ///
    /// Subsequent `send()` and `receive()` calls return
    /// [`Error::NotConnected`](crate::error::Error::NotConnected).
    async fn close(&mut self) -> Result<()>;

    /// Whether the transport is currently connected.
    fn is_connected(&self) -> bool;
}
