//! Reference state-machine model of the DAS device.
//!
//! The harness never hardcodes expected status strings per test; instead it
//! consults this model to compute the expected status after each command.
//! The transition function is pure and total: every (state, command) pair
//! has exactly one defined next state.
//!
//! Transition table:
//!
//! | State   | Status | Arm    | Disarm | Trigger |
//! |---------|--------|--------|--------|---------|
//! | Off     | Off    | Armed  | Off    | Off     |
//! | Armed   | Armed  | Armed  | Off    | Active  |
//! | Active  | Active | Active | Off    | Active  |
//!
//! `Trigger` is only effective from `Armed`; from `Off` it is a no-op (the
//! device rejects a faulty trigger while disarmed). `Disarm` is absorbing
//! back to `Off` from any state. `Status` never mutates state.

use crate::command::{Command, DeviceStatus};

/// The state a freshly powered (or explicitly reset) device is in.
pub const INITIAL_STATE: DeviceStatus = DeviceStatus::Off;

/// Apply one command to a device state, returning the next state.
pub fn apply(state: DeviceStatus, command: Command) -> DeviceStatus {
    match command {
        Command::Status => state,
        Command::Disarm => DeviceStatus::Off,
        Command::Arm => match state {
            DeviceStatus::Off => DeviceStatus::Armed,
            other => other,
        },
        Command::Trigger => match state {
            DeviceStatus::Armed => DeviceStatus::Active,
            other => other,
        },
    }
}

/// Fold a command sequence over the initial state.
///
/// Equivalent to repeated [`apply`] starting from [`INITIAL_STATE`].
pub fn predict(commands: &[Command]) -> DeviceStatus {
    commands
        .iter()
        .fold(INITIAL_STATE, |state, &cmd| apply(state, cmd))
}
