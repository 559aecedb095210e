//! dastest-sim: Test doubles for the DAS conformance harness.
//!
//! Two [`Transport`](dastest_core::Transport) implementations that need no
//! hardware:
//!
//! - [`SimulatedDas`]: a behavioral simulator honoring the full wire
//!   contract, including the unsolicited status beacon and fault knobs.
//! - [`MockTransport`]: an ordered expectation mock for byte-exact and
//!   infrastructure-fault tests.

pub mod device;
pub mod mock;

pub use device::SimulatedDas;
pub use mock::MockTransport;
