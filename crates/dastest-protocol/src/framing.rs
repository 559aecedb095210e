//! DAS command frame encoder/decoder.
//!
//! The device accepts its four single-letter commands in either of two wire
//! encodings, selected once per harness run:
//!
//! # Raw mode
//!
//! ```text
//! [CMD]
//! ```
//!
//! One ASCII byte: `P` (status), `A` (arm), `D` (disarm), `T` (trigger).
//!
//! # Delimited mode
//!
//! ```text
//! [STX=0x01][LEN][CMD][RESERVED=0x00][ETX=0x03][CR=0x0D][LF=0x0A]
//! ```
//!
//! `LEN` is the binary payload length (0x01: one command byte). Every field
//! is concretely assigned before a frame is returned; the encoder never
//! emits a placeholder byte.
//!
//! Exactly one mode is active per harness configuration; modes are never
//! mixed within a run.

use bytes::{BufMut, BytesMut};

use dastest_core::{Command, Error, Result};

/// Start-of-frame marker in delimited mode.
pub const STX: u8 = 0x01;
/// End-of-payload marker in delimited mode.
pub const ETX: u8 = 0x03;
/// Carriage return trailer byte.
pub const CR: u8 = 0x0D;
/// Line feed trailer byte.
pub const LF: u8 = 0x0A;
/// Fixed reserved byte following the command byte.
pub const RESERVED: u8 = 0x00;

/// Total length of a delimited-mode frame in bytes.
pub const DELIMITED_FRAME_LEN: usize = 7;

/// Wire encoding for DAS command frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramingMode {
    /// Single ASCII command byte on the wire.
    Raw,
    /// STX/length-prefixed frame with ETX+CR+LF trailer.
    Delimited,
}

impl FramingMode {
    /// The on-wire size of one command frame in this mode.
    pub fn frame_len(self) -> usize {
        match self {
            FramingMode::Raw => 1,
            FramingMode::Delimited => DELIMITED_FRAME_LEN,
        }
    }
}

/// Encode a command into the exact byte sequence placed on the wire.
///
/// Pure function of `(command, mode)`.
///
/// # Example
///
/// ```
/// use dastest_core::Command;
/// use dastest_protocol::framing::{encode, FramingMode};
///
/// assert_eq!(encode(Command::Arm, FramingMode::Raw), b"A");
/// assert_eq!(
///     encode(Command::Arm, FramingMode::Delimited),
///     [0x01, 0x01, b'A', 0x00, 0x03, 0x0D, 0x0A],
/// );
/// ```
pub fn encode(command: Command, mode: FramingMode) -> Vec<u8> {
    match mode {
        FramingMode::Raw => vec![command.wire_byte()],
        FramingMode::Delimited => {
            let mut buf = BytesMut::with_capacity(DELIMITED_FRAME_LEN);
            buf.put_u8(STX);
            buf.put_u8(1); // payload length: one command byte
            buf.put_u8(command.wire_byte());
            buf.put_u8(RESERVED);
            buf.put_u8(ETX);
            buf.put_u8(CR);
            buf.put_u8(LF);
            buf.to_vec()
        }
    }
}

/// Decode a frame back to its command, validating structure.
///
/// This is the structural check used by the conformance suite and by the
/// simulated device: `decode(encode(c, mode), mode) == c` for every command
/// and both modes.
///
/// # Errors
///
/// - [`Error::MalformedFrame`] if the frame length or any fixed field
///   (STX, LEN, RESERVED, ETX, CR, LF) is wrong.
/// - [`Error::UnsupportedCommand`] if the command byte is not one of the
///   four defined commands. The enumeration is closed, so this indicates a
///   framer/model version mismatch rather than line noise.
pub fn decode(frame: &[u8], mode: FramingMode) -> Result<Command> {
    match mode {
        FramingMode::Raw => {
            let [byte] = frame else {
                return Err(Error::MalformedFrame(format!(
                    "raw frame must be exactly 1 byte, got {}",
                    frame.len()
                )));
            };
            Command::from_wire_byte(*byte).ok_or(Error::UnsupportedCommand(*byte))
        }
        FramingMode::Delimited => {
            if frame.len() != DELIMITED_FRAME_LEN {
                return Err(Error::MalformedFrame(format!(
                    "delimited frame must be {DELIMITED_FRAME_LEN} bytes, got {}",
                    frame.len()
                )));
            }
            if frame[0] != STX {
                return Err(Error::MalformedFrame(format!(
                    "bad STX: 0x{:02X}",
                    frame[0]
                )));
            }
            if frame[1] != 1 {
                return Err(Error::MalformedFrame(format!(
                    "bad payload length: {}",
                    frame[1]
                )));
            }
            if frame[3] != RESERVED {
                return Err(Error::MalformedFrame(format!(
                    "bad reserved byte: 0x{:02X}",
                    frame[3]
                )));
            }
            if frame[4] != ETX || frame[5] != CR || frame[6] != LF {
                return Err(Error::MalformedFrame(format!(
                    "bad trailer: {:02X?}",
                    &frame[4..]
                )));
            }
            Command::from_wire_byte(frame[2]).ok_or(Error::UnsupportedCommand(frame[2]))
        }
    }
}
