//! The test orchestrator: drives one [`TestCase`] over a [`Transport`].
//!
//! For each step the orchestrator advances the reference model, encodes and
//! writes the command frame, waits the settle delay, and — on asserted
//! steps — issues a `Status` request, reads the reply, and compares the
//! parsed status against the model's prediction. The first mismatch ends
//! the case (later steps assume the prior state was reached); any transport
//! or parser fault ends it with a distinct `Error` outcome.
//!
//! The orchestrator is the sole owner of the transport for the duration of
//! the case and closes it on every exit path, including cancellation.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use dastest_core::error::{Error, Result};
use dastest_core::transport::Transport;
use dastest_core::{Command, DeviceStatus, model};
use dastest_protocol::framing::{self, FramingMode};
use dastest_protocol::status::{self, TextEncoding};

use crate::testcase::{TestCase, TestResult};

/// Explicit harness configuration.
///
/// Replaces the process-wide mutable port selection of the original bench
/// scripts: everything a run needs travels in this struct.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Wire encoding for command frames. Exactly one mode per run.
    pub mode: FramingMode,
    /// Declared text encoding for device replies.
    pub encoding: TextEncoding,
    /// Bounded wait after each write, before reading, covering the device's
    /// asynchronous processing. Not a busy-poll.
    pub settle_delay: Duration,
    /// Deadline for one transport read.
    pub read_timeout: Duration,
    /// Send a priming `Disarm` (and drain buffered output) before the first
    /// step, bringing a live device to `Off` per the reset contract.
    pub prime: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        HarnessConfig {
            mode: FramingMode::Raw,
            encoding: TextEncoding::Ascii,
            settle_delay: Duration::from_millis(250),
            read_timeout: Duration::from_secs(1),
            prime: false,
        }
    }
}

/// Internal outcome of driving the steps, before transport release.
enum Drive {
    Completed(TestResult),
    Cancelled,
}

/// Run one test case over an exclusively owned transport.
///
/// Returns `None` if the run was cancelled between steps (the partial
/// result is discarded, per the cancellation contract); otherwise the
/// case's [`TestResult`]. The transport is closed before returning in
/// every path.
pub async fn run(
    case: &TestCase,
    mut transport: Box<dyn Transport>,
    config: &HarnessConfig,
    cancel: &CancellationToken,
) -> Option<TestResult> {
    debug!(case = case.name(), mode = ?config.mode, "starting test case");

    let drive = drive_steps(case, transport.as_mut(), config, cancel).await;

    // Scoped acquisition: release the port on every exit path.
    if let Err(e) = transport.close().await {
        warn!(case = case.name(), error = %e, "failed to close transport");
    }

    match drive {
        Ok(Drive::Completed(result)) => {
            debug!(case = case.name(), result = %result, "test case finished");
            Some(result)
        }
        Ok(Drive::Cancelled) => {
            debug!(case = case.name(), "test case cancelled, result discarded");
            None
        }
        Err(cause) => {
            debug!(case = case.name(), error = %cause, "test case aborted");
            Some(TestResult::Error { cause })
        }
    }
}

/// Bring a live device to `Off` before trusting the model's initial state.
///
/// Sends a `Disarm` frame and drains whatever output is buffered (periodic
/// status emissions, boot chatter). The reset contract makes `expected =
/// Off` sound at case start.
pub async fn prime(
    transport: &mut dyn Transport,
    config: &HarnessConfig,
) -> Result<()> {
    debug!("priming device with Disarm");
    transport
        .send(&framing::encode(Command::Disarm, config.mode))
        .await?;
    tokio::time::sleep(config.settle_delay).await;
    drain(transport, config.read_timeout).await?;
    Ok(())
}

async fn drive_steps(
    case: &TestCase,
    transport: &mut dyn Transport,
    config: &HarnessConfig,
    cancel: &CancellationToken,
) -> Result<Drive> {
    if config.prime {
        prime(transport, config).await?;
    }

    // Reset contract: the device is assumed Off at case start.
    let mut expected = model::INITIAL_STATE;

    for (step_index, step) in case.steps().iter().enumerate() {
        // Cancellation is honored between steps, never mid-write.
        if cancel.is_cancelled() {
            return Ok(Drive::Cancelled);
        }

        expected = model::apply(expected, step.command);
        debug!(
            case = case.name(),
            step_index,
            command = %step.command,
            expected = %expected,
            "executing step"
        );

        transport
            .send(&framing::encode(step.command, config.mode))
            .await?;
        tokio::time::sleep(config.settle_delay).await;

        if let Some(annotated) = step.expect {
            if annotated != expected {
                // The case author's annotation disagrees with the model;
                // the model is the source of truth.
                warn!(
                    case = case.name(),
                    step_index,
                    annotated = %annotated,
                    expected = %expected,
                    "step annotation disagrees with device model"
                );
            }

            let observed = request_status(transport, config).await?;
            if observed != expected {
                return Ok(Drive::Completed(TestResult::Fail {
                    step_index,
                    expected,
                    observed,
                }));
            }
        }
    }

    Ok(Drive::Completed(TestResult::Pass))
}

/// Issue a `Status` request and parse the device's reply.
///
/// After the settle delay, all buffered complete lines are drained within
/// the read deadline and the most recent one is parsed. This tolerates the
/// device's unsolicited periodic status emissions: stale lines queued ahead
/// of the solicited reply are skipped, not misread.
async fn request_status(
    transport: &mut dyn Transport,
    config: &HarnessConfig,
) -> Result<DeviceStatus> {
    transport
        .send(&framing::encode(Command::Status, config.mode))
        .await?;
    tokio::time::sleep(config.settle_delay).await;

    let collected = collect_reply(transport, config.read_timeout).await?;
    if collected.is_empty() {
        return Err(Error::Timeout);
    }

    // Fall back to the unterminated tail if the deadline cut a line short;
    // the parser will classify it.
    let line = status::last_complete_line(&collected).unwrap_or(&collected);
    status::parse_status_line(line, config.encoding)
}

/// Read until the line goes silent for one read deadline.
async fn collect_reply(transport: &mut dyn Transport, timeout: Duration) -> Result<Vec<u8>> {
    let mut collected = Vec::new();
    let mut buf = [0u8; 256];
    loop {
        match transport.receive(&mut buf, timeout).await {
            Ok(0) => break,
            Ok(n) => collected.extend_from_slice(&buf[..n]),
            Err(Error::Timeout) => break,
            Err(e) => return Err(e),
        }
    }
    Ok(collected)
}

/// Drain and discard buffered output.
async fn drain(transport: &mut dyn Transport, timeout: Duration) -> Result<()> {
    collect_reply(transport, timeout).await.map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testcase::TestStep;
    use dastest_sim::{MockTransport, SimulatedDas};
    use Command::*;
    use DeviceStatus::*;

    /// Config with no waiting, for fast deterministic tests.
    fn fast_config(mode: FramingMode) -> HarnessConfig {
        HarnessConfig {
            mode,
            settle_delay: Duration::ZERO,
            read_timeout: Duration::from_millis(20),
            ..Default::default()
        }
    }

    fn token() -> CancellationToken {
        CancellationToken::new()
    }

    #[tokio::test]
    async fn arming_sequence_passes_against_simulator() {
        let case = TestCase::new(
            "arming",
            [TestStep::setup(Arm), TestStep::expecting(Status, Armed)],
        );
        let sim = Box::new(SimulatedDas::new(FramingMode::Raw));
        let result = run(&case, sim, &fast_config(FramingMode::Raw), &token())
            .await
            .unwrap();
        assert!(result.is_pass(), "got {result}");
    }

    #[tokio::test]
    async fn delimited_mode_passes_against_simulator() {
        let case = TestCase::new(
            "activation",
            [
                TestStep::setup(Arm),
                TestStep::setup(Trigger),
                TestStep::expecting(Status, Active),
            ],
        );
        let sim = Box::new(SimulatedDas::new(FramingMode::Delimited));
        let result = run(&case, sim, &fast_config(FramingMode::Delimited), &token())
            .await
            .unwrap();
        assert!(result.is_pass(), "got {result}");
    }

    #[tokio::test]
    async fn unsolicited_beacon_lines_are_skipped() {
        // The beacon queues stale status lines ahead of every solicited
        // reply; drain-latest correlation must still find the right one.
        let case = TestCase::new(
            "arming-with-beacon",
            [TestStep::setup(Arm), TestStep::expecting(Status, Armed)],
        );
        let sim = Box::new(SimulatedDas::new(FramingMode::Raw).beacon_on_command());
        let result = run(&case, sim, &fast_config(FramingMode::Raw), &token())
            .await
            .unwrap();
        assert!(result.is_pass(), "got {result}");
    }

    #[tokio::test]
    async fn device_disagreeing_with_model_fails() {
        // Scripted device reports ARMED where the model predicts OFF.
        let mut mock = MockTransport::new();
        mock.expect(b"P", b""); // the asserted step's own Status command
        mock.expect(b"P", b"DAS status: ARMED\r\n"); // assertion request
        let case = TestCase::new("status-while-off", [TestStep::expecting(Status, Off)]);

        let result = run(
            &case,
            Box::new(mock),
            &fast_config(FramingMode::Raw),
            &token(),
        )
        .await
        .unwrap();

        match result {
            TestResult::Fail {
                step_index,
                expected,
                observed,
            } => {
                assert_eq!(step_index, 0);
                assert_eq!(expected, Off);
                assert_eq!(observed, Armed);
            }
            other => panic!("expected Fail, got {other}"),
        }
    }

    #[tokio::test]
    async fn fail_fast_stops_after_first_mismatch() {
        // Two asserted steps; the first fails, so the second must never
        // reach the wire.
        let mut mock = MockTransport::new();
        mock.expect(b"A", b"");
        mock.expect(b"P", b"DAS status: OFF\r\n"); // model expects ARMED
        let case = TestCase::new(
            "arming-then-more",
            [
                TestStep::expecting(Arm, Armed),
                TestStep::expecting(Trigger, Active),
            ],
        );

        let result = run(
            &case,
            Box::new(mock),
            &fast_config(FramingMode::Raw),
            &token(),
        )
        .await
        .unwrap();

        match result {
            TestResult::Fail { step_index, .. } => assert_eq!(step_index, 0),
            other => panic!("expected Fail, got {other}"),
        }
    }

    #[tokio::test]
    async fn silent_device_is_a_timeout_error() {
        let sim = Box::new(SimulatedDas::new(FramingMode::Raw).mute());
        let case = TestCase::new("status-while-off", [TestStep::expecting(Status, Off)]);
        let result = run(&case, sim, &fast_config(FramingMode::Raw), &token())
            .await
            .unwrap();
        match result {
            TestResult::Error { cause } => assert!(matches!(cause, Error::Timeout)),
            other => panic!("expected Error, got {other}"),
        }
    }

    #[tokio::test]
    async fn garbled_reply_is_a_protocol_error_not_a_fail() {
        let sim = Box::new(SimulatedDas::new(FramingMode::Raw).garble_replies());
        let case = TestCase::new("status-while-off", [TestStep::expecting(Status, Off)]);
        let result = run(&case, sim, &fast_config(FramingMode::Raw), &token())
            .await
            .unwrap();
        match result {
            TestResult::Error { cause } => {
                assert!(matches!(cause, Error::UnrecognizedStatus(_)));
                assert!(cause.is_protocol_violation());
            }
            other => panic!("expected Error, got {other}"),
        }
    }

    #[tokio::test]
    async fn dropped_link_is_a_transport_error() {
        let mut mock = MockTransport::new();
        mock.drop_link();
        let case = TestCase::new("arming", [TestStep::setup(Arm)]);
        let result = run(
            &case,
            Box::new(mock),
            &fast_config(FramingMode::Raw),
            &token(),
        )
        .await
        .unwrap();
        match result {
            TestResult::Error { cause } => assert!(matches!(cause, Error::ConnectionLost)),
            other => panic!("expected Error, got {other}"),
        }
    }

    #[tokio::test]
    async fn cancelled_run_discards_partial_result() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let sim = Box::new(SimulatedDas::new(FramingMode::Raw));
        let case = TestCase::new("status-while-off", [TestStep::expecting(Status, Off)]);
        let result = run(&case, sim, &fast_config(FramingMode::Raw), &cancel).await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn priming_sends_disarm_first() {
        let mut mock = MockTransport::new();
        mock.expect(b"D", b"DAS status: OFF\r\n"); // prime + drained chatter
        mock.expect(b"P", b"");
        mock.expect(b"P", b"DAS status: OFF\r\n");
        let case = TestCase::new("status-while-off", [TestStep::expecting(Status, Off)]);

        let config = HarnessConfig {
            prime: true,
            ..fast_config(FramingMode::Raw)
        };
        let result = run(&case, Box::new(mock), &config, &token()).await.unwrap();
        assert!(result.is_pass(), "got {result}");
    }

    #[tokio::test]
    async fn setup_only_case_passes_without_reading() {
        let sim = Box::new(SimulatedDas::new(FramingMode::Raw));
        let case = TestCase::new(
            "setup-only",
            [TestStep::setup(Arm), TestStep::setup(Disarm)],
        );
        let result = run(&case, sim, &fast_config(FramingMode::Raw), &token())
            .await
            .unwrap();
        assert!(result.is_pass());
    }
}
