//! dastest-transport: Serial transport and endpoint resolution.
//!
//! Provides the concrete [`Transport`](dastest_core::Transport)
//! implementation for real hardware ([`SerialTransport`]) plus the endpoint
//! enumeration and first-discovered-wins selection policy ([`resolver`]).

pub mod resolver;
pub mod serial;

pub use resolver::{available_endpoints, resolve};
pub use serial::{DataBits, Parity, SerialConfig, SerialTransport, StopBits};
