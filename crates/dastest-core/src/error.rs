//! Error types for the DAS conformance harness.
//!
//! All fallible operations across the workspace return [`Result<T>`], which
//! uses [`Error`] as the error type. The variants fall into three groups:
//! configuration errors (fatal before any device I/O), protocol violations
//! (a malformed reply or frame, reported and never retried), and transport
//! faults (retryable by the caller at whole-test-case granularity).

/// The error type for all harness operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No serial endpoint was available to select.
    ///
    /// Raised by the port resolver when enumeration returned nothing.
    /// Fatal: the harness aborts before any device I/O.
    #[error("no serial port available")]
    NoPortAvailable,

    /// A received frame violated the wire format (bad STX/ETX, wrong
    /// length byte, missing CR/LF).
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// A frame carried a command byte outside the four defined commands.
    ///
    /// The command enumeration is closed, so this indicates a version
    /// mismatch between the framer and the device model.
    #[error("unsupported command byte: 0x{0:02X}")]
    UnsupportedCommand(u8),

    /// Received bytes were not valid under the declared text encoding.
    #[error("undecodable response: {0}")]
    Decode(String),

    /// A decoded line did not contain a recognizable status report.
    ///
    /// Either the `"DAS status: "` marker was absent or the token after it
    /// was not one of `OFF`/`ARMED`/`ACTIVE`. This is a reportable protocol
    /// violation, not a silent default.
    #[error("unrecognized status line: {0:?}")]
    UnrecognizedStatus(String),

    /// A transport-level failure (open error, write error, device gone).
    #[error("transport error: {0}")]
    Transport(String),

    /// Timed out waiting for a response from the device.
    #[error("timeout waiting for response")]
    Timeout,

    /// No connection to the device has been established.
    #[error("not connected")]
    NotConnected,

    /// The connection to the device was lost unexpectedly.
    #[error("connection lost")]
    ConnectionLost,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error is a protocol violation (as opposed to an
    /// infrastructure fault or configuration error).
    ///
    /// Protocol violations indicate a real device or framing defect and are
    /// never retried; retrying would mask them.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Error::MalformedFrame(_)
                | Error::UnsupportedCommand(_)
                | Error::Decode(_)
                | Error::UnrecognizedStatus(_)
        )
    }
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;
