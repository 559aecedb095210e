//! Expectation-based mock transport.
//!
//! Where [`SimulatedDas`](crate::device::SimulatedDas) behaves like a
//! well-formed device, [`MockTransport`] scripts the wire exactly: ordered
//! request/response pairs, a log of every byte sent, and a silence knob for
//! timeout-path tests. Use it when a test cares about the precise bytes on
//! the wire or about infrastructure faults the simulator is too honest to
//! produce.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;

use dastest_core::error::{Error, Result};
use dastest_core::transport::Transport;

/// What the mock does after a matched request.
#[derive(Debug, Clone)]
enum Reply {
    /// Return these bytes from subsequent `receive()` calls.
    Bytes(Vec<u8>),
    /// Return nothing; `receive()` reports a timeout.
    Silence,
}

/// One scripted exchange.
#[derive(Debug, Clone)]
struct Expectation {
    /// The exact bytes that must be sent.
    request: Vec<u8>,
    reply: Reply,
}

/// A scripted [`Transport`] for deterministic wire-level tests.
///
/// Expectations are consumed in order: each `send()` must match the next
/// scripted request, and the corresponding reply is served by following
/// `receive()` calls. A send with no remaining expectation, or with
/// non-matching bytes, is an error.
#[derive(Debug, Default)]
pub struct MockTransport {
    expectations: VecDeque<Expectation>,
    /// Reply bytes pending for `receive()`.
    pending: VecDeque<u8>,
    /// Log of every `send()` payload, in order.
    sent_log: Vec<Vec<u8>>,
    disconnected: bool,
    /// When set, the next I/O call fails with `ConnectionLost`.
    drop_link: bool,
}

impl MockTransport {
    /// Create a connected mock with no expectations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script an exchange: when `request` is sent, `response` becomes
    /// readable.
    pub fn expect(&mut self, request: &[u8], response: &[u8]) {
        self.expectations.push_back(Expectation {
            request: request.to_vec(),
            reply: Reply::Bytes(response.to_vec()),
        });
    }

    /// Script a dead exchange: `request` is accepted but no reply follows,
    /// so reads time out.
    pub fn expect_silence(&mut self, request: &[u8]) {
        self.expectations.push_back(Expectation {
            request: request.to_vec(),
            reply: Reply::Silence,
        });
    }

    /// Make the next I/O call fail with
    /// [`Error::ConnectionLost`], simulating a yanked cable.
    pub fn drop_link(&mut self) {
        self.drop_link = true;
    }

    /// Every payload sent through this transport, in order.
    pub fn sent_data(&self) -> &[Vec<u8>] {
        &self.sent_log
    }

    /// Number of scripted exchanges not yet consumed.
    pub fn remaining_expectations(&self) -> usize {
        self.expectations.len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if self.disconnected {
            return Err(Error::NotConnected);
        }
        if self.drop_link {
            return Err(Error::ConnectionLost);
        }

        self.sent_log.push(data.to_vec());

        let Some(expectation) = self.expectations.pop_front() else {
            return Err(Error::Transport(
                "mock transport: no more scripted exchanges".into(),
            ));
        };
        if data != expectation.request.as_slice() {
            return Err(Error::Transport(format!(
                "mock transport: expected {:02X?}, got {:02X?}",
                expectation.request, data
            )));
        }
        match expectation.reply {
            Reply::Bytes(bytes) => self.pending.extend(bytes),
            Reply::Silence => {}
        }
        Ok(())
    }

    async fn receive(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
        if self.disconnected {
            return Err(Error::NotConnected);
        }
        if self.drop_link {
            return Err(Error::ConnectionLost);
        }
        if self.pending.is_empty() {
            return Err(Error::Timeout);
        }
        let n = buf.len().min(self.pending.len());
        for slot in buf.iter_mut().take(n) {
            *slot = self.pending.pop_front().unwrap_or_default();
        }
        Ok(n)
    }

    async fn close(&mut self) -> Result<()> {
        self.disconnected = true;
        self.pending.clear();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        !self.disconnected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_exchange_round_trip() {
        let mut mock = MockTransport::new();
        mock.expect(b"P", b"DAS status: OFF\r\n");

        mock.send(b"P").await.unwrap();
        let mut buf = [0u8; 64];
        let n = mock.receive(&mut buf, Duration::from_millis(10)).await.unwrap();
        assert_eq!(&buf[..n], b"DAS status: OFF\r\n");
    }

    #[tokio::test]
    async fn mismatched_request_is_an_error() {
        let mut mock = MockTransport::new();
        mock.expect(b"P", b"DAS status: OFF\r\n");
        let err = mock.send(b"A").await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }

    #[tokio::test]
    async fn exhausted_script_is_an_error() {
        let mut mock = MockTransport::new();
        let err = mock.send(b"P").await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }

    #[tokio::test]
    async fn silence_times_out() {
        let mut mock = MockTransport::new();
        mock.expect_silence(b"P");
        mock.send(b"P").await.unwrap();
        let mut buf = [0u8; 8];
        let err = mock
            .receive(&mut buf, Duration::from_millis(10))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout));
    }

    #[tokio::test]
    async fn dropped_link_fails_io() {
        let mut mock = MockTransport::new();
        mock.expect(b"A", b"");
        mock.drop_link();
        let err = mock.send(b"A").await.unwrap_err();
        assert!(matches!(err, Error::ConnectionLost));
    }

    #[tokio::test]
    async fn sent_log_records_order() {
        let mut mock = MockTransport::new();
        mock.expect(b"A", b"");
        mock.expect(b"P", b"DAS status: ARMED\r\n");
        mock.send(b"A").await.unwrap();
        mock.send(b"P").await.unwrap();
        assert_eq!(mock.sent_data(), [b"A".to_vec(), b"P".to_vec()]);
        assert_eq!(mock.remaining_expectations(), 0);
    }

    #[tokio::test]
    async fn close_disconnects() {
        let mut mock = MockTransport::new();
        mock.close().await.unwrap();
        assert!(!mock.is_connected());
        let err = mock.send(b"P").await.unwrap_err();
        assert!(matches!(err, Error::NotConnected));
    }
}
