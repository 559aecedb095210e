//! In-process simulated DAS device.
//!
//! [`SimulatedDas`] implements the [`Transport`] trait and behaves like the
//! device on the other end of the wire: it decodes command frames in the
//! configured framing mode, applies the reference state machine, and replies
//! to `Status` with the exact ASCII line the hardware emits. This makes the
//! conformance suite self-hosting; the same orchestrator code path runs
//! against hardware and against this simulator.
//!
//! The bench hardware also emits its status line unprompted about every
//! 5 seconds. Wall-clock timers would make tests slow and flaky, so the
//! simulator models the beacon deterministically: with
//! [`beacon_on_command`](SimulatedDas::beacon_on_command) enabled, each
//! received frame first queues an unsolicited line reflecting the state
//! *before* the command takes effect, exactly the interleaving a real run
//! sees when the periodic tick lands between a command and its reply.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;

use dastest_core::error::{Error, Result};
use dastest_core::transport::Transport;
use dastest_core::{Command, DeviceStatus, model};
use dastest_protocol::framing::{self, FramingMode};
use dastest_protocol::status::STATUS_MARKER;

/// A simulated DAS device behind the [`Transport`] seam.
pub struct SimulatedDas {
    /// Current device state, driven by the reference model.
    state: DeviceStatus,
    /// Framing mode the simulated device expects on its RX line.
    mode: FramingMode,
    /// Bytes queued for the harness to read.
    pending: VecDeque<u8>,
    /// Emit an unsolicited status line on every received frame.
    beacon: bool,
    /// Swallow solicited replies (simulates a dead or deaf device).
    mute: bool,
    /// Corrupt solicited replies (simulates a firmware defect).
    garble: bool,
    connected: bool,
}

impl SimulatedDas {
    /// Create a simulator in the freshly powered state (`Off`).
    pub fn new(mode: FramingMode) -> Self {
        SimulatedDas {
            state: model::INITIAL_STATE,
            mode,
            pending: VecDeque::new(),
            beacon: false,
            mute: false,
            garble: false,
            connected: true,
        }
    }

    /// Enable the deterministic periodic-status beacon: every received
    /// frame first queues an unsolicited line with the pre-command state.
    pub fn beacon_on_command(mut self) -> Self {
        self.beacon = true;
        self
    }

    /// Stop producing solicited replies. Reads will time out.
    pub fn mute(mut self) -> Self {
        self.mute = true;
        self
    }

    /// Replace solicited replies with a line no conformant parser accepts.
    pub fn garble_replies(mut self) -> Self {
        self.garble = true;
        self
    }

    /// The simulator's current state (for test assertions).
    pub fn state(&self) -> DeviceStatus {
        self.state
    }

    fn queue_status_line(&mut self, status: DeviceStatus) {
        let line = format!("{STATUS_MARKER}{}\r\n", status.token());
        self.pending.extend(line.into_bytes());
    }

    fn queue_garbled_line(&mut self) {
        self.pending.extend(b"DAS telemetry: ?!\r\n".iter().copied());
    }
}

#[async_trait]
impl Transport for SimulatedDas {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        // Strict on purpose: the simulator is part of the conformance
        // surface, so wrong bytes on the wire fail loudly here instead of
        // being dropped the way lenient hardware might.
        let command = framing::decode(data, self.mode)?;

        if self.beacon {
            let stale = self.state;
            self.queue_status_line(stale);
        }

        self.state = model::apply(self.state, command);
        tracing::trace!(?command, state = %self.state, "simulated device applied command");

        if command == Command::Status {
            if self.mute {
                return Ok(());
            }
            if self.garble {
                self.queue_garbled_line();
            } else {
                let state = self.state;
                self.queue_status_line(state);
            }
        }
        Ok(())
    }

    async fn receive(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        if self.pending.is_empty() {
            return Err(Error::Timeout);
        }
        let n = buf.len().min(self.pending.len());
        for slot in buf.iter_mut().take(n) {
            // n is bounded by pending.len(), so the queue cannot run dry.
            *slot = self.pending.pop_front().unwrap_or_default();
        }
        Ok(n)
    }

    async fn close(&mut self) -> Result<()> {
        self.connected = false;
        self.pending.clear();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn send_cmd(sim: &mut SimulatedDas, cmd: Command, mode: FramingMode) {
        sim.send(&framing::encode(cmd, mode)).await.unwrap();
    }

    async fn read_all(sim: &mut SimulatedDas) -> Vec<u8> {
        let mut out = Vec::new();
        let mut buf = [0u8; 64];
        while let Ok(n) = sim.receive(&mut buf, Duration::from_millis(10)).await {
            out.extend_from_slice(&buf[..n]);
        }
        out
    }

    #[tokio::test]
    async fn status_reports_off_when_fresh() {
        let mut sim = SimulatedDas::new(FramingMode::Raw);
        send_cmd(&mut sim, Command::Status, FramingMode::Raw).await;
        assert_eq!(read_all(&mut sim).await, b"DAS status: OFF\r\n");
    }

    #[tokio::test]
    async fn arm_then_status_reports_armed() {
        let mut sim = SimulatedDas::new(FramingMode::Delimited);
        send_cmd(&mut sim, Command::Arm, FramingMode::Delimited).await;
        send_cmd(&mut sim, Command::Status, FramingMode::Delimited).await;
        assert_eq!(read_all(&mut sim).await, b"DAS status: ARMED\r\n");
        assert_eq!(sim.state(), DeviceStatus::Armed);
    }

    #[tokio::test]
    async fn trigger_while_disarmed_is_rejected() {
        let mut sim = SimulatedDas::new(FramingMode::Raw);
        send_cmd(&mut sim, Command::Trigger, FramingMode::Raw).await;
        send_cmd(&mut sim, Command::Status, FramingMode::Raw).await;
        assert_eq!(read_all(&mut sim).await, b"DAS status: OFF\r\n");
    }

    #[tokio::test]
    async fn full_activation_cycle() {
        let mut sim = SimulatedDas::new(FramingMode::Raw);
        for cmd in [Command::Arm, Command::Trigger] {
            send_cmd(&mut sim, cmd, FramingMode::Raw).await;
        }
        assert_eq!(sim.state(), DeviceStatus::Active);
        send_cmd(&mut sim, Command::Disarm, FramingMode::Raw).await;
        assert_eq!(sim.state(), DeviceStatus::Off);
    }

    #[tokio::test]
    async fn non_status_commands_are_silent() {
        let mut sim = SimulatedDas::new(FramingMode::Raw);
        send_cmd(&mut sim, Command::Arm, FramingMode::Raw).await;
        let mut buf = [0u8; 16];
        let err = sim
            .receive(&mut buf, Duration::from_millis(10))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout));
    }

    #[tokio::test]
    async fn beacon_queues_stale_line_before_reply() {
        let mut sim = SimulatedDas::new(FramingMode::Raw).beacon_on_command();
        send_cmd(&mut sim, Command::Arm, FramingMode::Raw).await;
        send_cmd(&mut sim, Command::Status, FramingMode::Raw).await;
        // Beacon before Arm: OFF; beacon before Status: ARMED; reply: ARMED.
        assert_eq!(
            read_all(&mut sim).await,
            b"DAS status: OFF\r\nDAS status: ARMED\r\nDAS status: ARMED\r\n"
        );
    }

    #[tokio::test]
    async fn mute_device_times_out() {
        let mut sim = SimulatedDas::new(FramingMode::Raw).mute();
        send_cmd(&mut sim, Command::Status, FramingMode::Raw).await;
        let mut buf = [0u8; 16];
        let err = sim
            .receive(&mut buf, Duration::from_millis(10))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout));
    }

    #[tokio::test]
    async fn garbled_reply_lacks_status_marker() {
        let mut sim = SimulatedDas::new(FramingMode::Raw).garble_replies();
        send_cmd(&mut sim, Command::Status, FramingMode::Raw).await;
        let reply = read_all(&mut sim).await;
        assert!(!reply.windows(STATUS_MARKER.len()).any(|w| w == STATUS_MARKER.as_bytes()));
    }

    #[tokio::test]
    async fn wrong_mode_frame_is_rejected() {
        let mut sim = SimulatedDas::new(FramingMode::Delimited);
        let err = sim.send(b"A").await.unwrap_err();
        assert!(matches!(err, Error::MalformedFrame(_)));
    }

    #[tokio::test]
    async fn closed_sim_refuses_io() {
        let mut sim = SimulatedDas::new(FramingMode::Raw);
        sim.close().await.unwrap();
        assert!(!sim.is_connected());
        let err = sim.send(b"P").await.unwrap_err();
        assert!(matches!(err, Error::NotConnected));
    }

    #[tokio::test]
    async fn partial_reads_drain_the_queue() {
        let mut sim = SimulatedDas::new(FramingMode::Raw);
        send_cmd(&mut sim, Command::Status, FramingMode::Raw).await;
        let mut buf = [0u8; 4];
        let n = sim.receive(&mut buf, Duration::from_millis(10)).await.unwrap();
        assert_eq!(&buf[..n], b"DAS ");
        let rest = read_all(&mut sim).await;
        assert_eq!(rest, b"status: OFF\r\n");
    }
}
