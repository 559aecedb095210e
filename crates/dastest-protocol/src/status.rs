//! DAS status-line parser.
//!
//! The device reports its state as a newline-terminated ASCII line:
//!
//! ```text
//! DAS status: OFF
//! DAS status: ARMED
//! DAS status: ACTIVE
//! ```
//!
//! It emits this line in reply to a `Status` command and also unprompted on
//! a periodic basis (roughly every 5 seconds on the bench hardware). The
//! orchestrator therefore reads *all* buffered lines after a request and
//! parses the most recent one; the helpers here support both halves of that:
//! splitting complete lines out of a receive buffer and parsing one line
//! into a [`DeviceStatus`].

use dastest_core::{DeviceStatus, Error, Result};

/// The marker preceding the status token in every report line.
pub const STATUS_MARKER: &str = "DAS status: ";

/// Text encoding declared for device responses.
///
/// The wire contract is ASCII; `Utf8` is accepted for devices/simulators
/// that are byte-compatible with it. The declaration is explicit so that a
/// reply with bytes outside the encoding is a reportable [`Error::Decode`],
/// never an implicit coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// Strict 7-bit ASCII (the documented device encoding).
    #[default]
    Ascii,
    /// UTF-8 superset, for tolerant bench setups.
    Utf8,
}

/// Parse one received line into a [`DeviceStatus`].
///
/// The line is decoded under `encoding`, then searched for
/// [`STATUS_MARKER`] followed immediately by a known token. Trailing
/// CR/LF is tolerated.
///
/// # Errors
///
/// - [`Error::Decode`] if the bytes are not valid under the declared
///   encoding.
/// - [`Error::UnrecognizedStatus`] if the marker is absent or the token
///   after it is unknown. A malformed reply indicates a real device or
///   framing defect; callers report it rather than retrying.
pub fn parse_status_line(line: &[u8], encoding: TextEncoding) -> Result<DeviceStatus> {
    let text = decode_text(line, encoding)?;

    let Some(marker_pos) = text.find(STATUS_MARKER) else {
        return Err(Error::UnrecognizedStatus(text.trim_end().to_string()));
    };

    let token = text[marker_pos + STATUS_MARKER.len()..].trim_end_matches(['\r', '\n']);
    DeviceStatus::from_token(token)
        .ok_or_else(|| Error::UnrecognizedStatus(text.trim_end().to_string()))
}

/// Decode raw bytes under the declared encoding.
fn decode_text(line: &[u8], encoding: TextEncoding) -> Result<String> {
    match encoding {
        TextEncoding::Ascii => {
            if let Some(bad) = line.iter().find(|b| !b.is_ascii()) {
                return Err(Error::Decode(format!(
                    "non-ASCII byte 0x{bad:02X} in response"
                )));
            }
            // Just checked: all bytes ASCII, so valid UTF-8.
            Ok(String::from_utf8_lossy(line).into_owned())
        }
        TextEncoding::Utf8 => std::str::from_utf8(line)
            .map(str::to_owned)
            .map_err(|e| Error::Decode(e.to_string())),
    }
}

/// Split all complete (newline-terminated) lines out of a receive buffer.
///
/// Returns the lines without their terminators. Bytes after the final
/// newline are an incomplete line and are not included.
pub fn complete_lines(buf: &[u8]) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (i, &byte) in buf.iter().enumerate() {
        if byte == b'\n' {
            let mut line = &buf[start..i];
            if let [head @ .., b'\r'] = line {
                line = head;
            }
            lines.push(line);
            start = i + 1;
        }
    }
    lines
}

/// The most recent complete line in a receive buffer, if any.
///
/// This implements the reply-correlation rule: when unsolicited periodic
/// status lines precede the solicited reply, the solicited reply is the
/// last complete line in the buffer after the settle delay.
pub fn last_complete_line(buf: &[u8]) -> Option<&[u8]> {
    complete_lines(buf).pop()
}
