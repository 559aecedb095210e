//! dastest-core: Core types, device model, and error definitions for the
//! DAS conformance harness.
//!
//! This crate defines the vocabulary shared by every other crate in the
//! workspace: the four-command protocol ([`Command`]), the device status
//! values ([`DeviceStatus`]), the reference state machine ([`model`]), the
//! byte-channel seam ([`Transport`]), and error handling
//! ([`Error`] / [`Result`]).
//!
//! Everything here is pure or purely declarative; no I/O happens in this
//! crate.

pub mod command;
pub mod error;
pub mod model;
pub mod transport;

pub use command::{Command, DeviceStatus};
pub use error::{Error, Result};
pub use transport::Transport;
