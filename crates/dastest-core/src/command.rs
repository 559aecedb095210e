//! The DAS command set and device status values.
//!
//! The device understands exactly four single-letter commands. Each carries
//! no payload; the wire letter is the whole logical content. Status values
//! are what the device reports back in its ASCII status line and what the
//! reference model predicts.

use std::fmt;

/// A command accepted by the DAS device.
///
/// The enumeration is closed: these four values are the entire protocol
/// vocabulary. The wire letters date back to the original flight hardware
/// (`P` for "poll").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Request a status report. Never mutates device state.
    Status,
    /// Arm the device.
    Arm,
    /// Disarm the device. Absorbing: returns to `Off` from any state.
    Disarm,
    /// Trigger the device. Only effective while armed.
    Trigger,
}

impl Command {
    /// All commands, in wire-letter order. Handy for exhaustive tests.
    pub const ALL: [Command; 4] = [
        Command::Status,
        Command::Arm,
        Command::Disarm,
        Command::Trigger,
    ];

    /// The ASCII wire byte for this command.
    pub fn wire_byte(self) -> u8 {
        match self {
            Command::Status => b'P',
            Command::Arm => b'A',
            Command::Disarm => b'D',
            Command::Trigger => b'T',
        }
    }

    /// Map an ASCII wire byte back to a command, if it is one of the four.
    pub fn from_wire_byte(byte: u8) -> Option<Command> {
        match byte {
            b'P' => Some(Command::Status),
            b'A' => Some(Command::Arm),
            b'D' => Some(Command::Disarm),
            b'T' => Some(Command::Trigger),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::Status => "Status",
            Command::Arm => "Arm",
            Command::Disarm => "Disarm",
            Command::Trigger => "Trigger",
        };
        write!(f, "{name}")
    }
}

/// The reported (or predicted) state of the DAS device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceStatus {
    /// Disarmed and inactive. The state after power-up or reset.
    Off,
    /// Armed and awaiting a trigger.
    Armed,
    /// Triggered and active.
    Active,
}

impl DeviceStatus {
    /// All statuses. Handy for exhaustive tests.
    pub const ALL: [DeviceStatus; 3] =
        [DeviceStatus::Off, DeviceStatus::Armed, DeviceStatus::Active];

    /// The ASCII token the device uses for this status in its status line.
    pub fn token(self) -> &'static str {
        match self {
            DeviceStatus::Off => "OFF",
            DeviceStatus::Armed => "ARMED",
            DeviceStatus::Active => "ACTIVE",
        }
    }

    /// Map a status-line token back to a status, if recognized.
    pub fn from_token(token: &str) -> Option<DeviceStatus> {
        match token {
            "OFF" => Some(DeviceStatus::Off),
            "ARMED" => Some(DeviceStatus::Armed),
            "ACTIVE" => Some(DeviceStatus::Active),
            _ => None,
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}
