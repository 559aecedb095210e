//! dastest-protocol: Wire-level encode/decode for the DAS protocol.
//!
//! Two concerns live here, both pure (no I/O):
//!
//! - [`framing`]: encoding a [`Command`](dastest_core::Command) into the
//!   exact bytes placed on the wire (raw single-byte or delimited frame)
//!   and the reverse structural decode.
//! - [`status`]: parsing the device's ASCII `"DAS status: <TOKEN>"` report
//!   lines under a declared text encoding.

pub mod framing;
pub mod status;

pub use framing::{FramingMode, decode, encode};
pub use status::{TextEncoding, last_complete_line, parse_status_line};
