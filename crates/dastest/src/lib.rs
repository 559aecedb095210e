//! # dastest -- Conformance Testing for DAS Serial Devices
//!
//! `dastest` is an asynchronous Rust toolkit for conformance-testing DAS
//! (Disarm/Arm/Status/Trigger) devices over a serial line. It drives a
//! device through scripted command sequences, predicts the correct status
//! after every step with a reference state machine, and reports where the
//! device diverges.
//!
//! ## Quick Start
//!
//! Add `dastest` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! dastest = "0.1"
//! tokio = { version = "1", features = ["full"] }
//! ```
//!
//! Run the standard suite against a device on a serial port:
//!
//! ```no_run
//! use dastest::harness::{run_suite, scenarios, HarnessConfig};
//! use dastest::serial::SerialTransport;
//! use dastest::Transport;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let cases = scenarios::standard_suite();
//!     let config = HarnessConfig {
//!         prime: true,
//!         ..Default::default()
//!     };
//!     let cancel = CancellationToken::new();
//!
//!     let report = run_suite(
//!         &cases,
//!         &config,
//!         || async {
//!             let t: Box<dyn Transport> =
//!                 Box::new(SerialTransport::open("/dev/ttyUSB0", 1200).await?);
//!             Ok(t)
//!         },
//!         &cancel,
//!     )
//!     .await;
//!
//!     println!("{report}");
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The toolkit is organized as a workspace of focused crates:
//!
//! | Crate                | Purpose                                          |
//! |----------------------|--------------------------------------------------|
//! | `dastest-core`       | [`Command`], [`DeviceStatus`], reference [`model`], [`Transport`] trait, errors |
//! | `dastest-protocol`   | Command framing (raw and delimited) and status line parsing |
//! | `dastest-transport`  | Serial port transport and port resolution        |
//! | `dastest-harness`    | Test cases, orchestrator, suite runner, standard scenarios |
//! | `dastest-sim`        | Simulated device and scripted mock transport     |
//! | **`dastest`**        | This facade crate -- re-exports everything       |
//!
//! Everything that touches a wire goes through the [`Transport`] trait, so
//! the same harness runs unchanged against real hardware, the simulator,
//! or a scripted mock.
//!
//! ## The Wire Protocol
//!
//! Four single-byte commands (`P` status, `A` arm, `D` disarm, `T`
//! trigger), sent either bare (raw mode) or wrapped in a fixed seven-byte
//! frame (delimited mode). The device answers `Status` with a text line of
//! the form `DAS status: ARMED`, and may also emit such lines unsolicited;
//! the harness correlates replies by draining buffered lines and parsing
//! the most recent.
//!
//! ## The Reference Model
//!
//! [`model::apply`](dastest_core::model::apply) is the authoritative
//! three-state machine (`Off` / `Armed` / `Active`): `Arm` only acts from
//! `Off`, `Trigger` only from `Armed`, `Disarm` always returns to `Off`,
//! and `Status` never changes state. Test cases annotate expected statuses
//! for readability, but verdicts always come from the model.
//!
//! ## Feature Flags
//!
//! | Feature  | Enables                                  | Default |
//! |----------|------------------------------------------|---------|
//! | `serial` | [`serial`] module (real port transport)  | yes     |
//! | `sim`    | [`sim`] module (simulator and mock)      | yes     |
//! | `full`   | Both                                     | no      |

pub use dastest_core::*;

/// Wire protocol: command framing and status line parsing.
pub mod protocol {
    pub use dastest_protocol::*;
}

/// Test orchestration: cases, the orchestrator, the suite runner, and the
/// standard scenario catalog.
pub mod harness {
    pub use dastest_harness::*;
}

/// Serial port transport.
///
/// Provides [`SerialTransport`](serial::SerialTransport) with DAS-native
/// defaults (1200 baud, 8-N-1) and port enumeration via
/// [`available_endpoints`](serial::available_endpoints).
#[cfg(feature = "serial")]
pub mod serial {
    pub use dastest_transport::*;
}

/// Hardware-free transports for tests and dry runs.
///
/// Provides [`SimulatedDas`](sim::SimulatedDas), a behavioral simulator
/// honoring the full wire contract, and
/// [`MockTransport`](sim::MockTransport), a scripted expectation mock.
#[cfg(feature = "sim")]
pub mod sim {
    pub use dastest_sim::*;
}
