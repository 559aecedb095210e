//! Test case data model.
//!
//! A [`TestCase`] is an ordered, immutable sequence of [`TestStep`]s: each
//! step sends one command, and steps marked with an expectation additionally
//! assert the device's reported status. The predecessors of this harness
//! were half a dozen near-duplicate scripts with expected strings pasted
//! into each; here the sequences are plain data and the expected values come
//! from the reference model.

use std::fmt;

use dastest_core::{Command, DeviceStatus, Error};

/// One step of a test case: a command, optionally asserted.
///
/// Steps without an expectation are setup steps; they advance the device
/// (and the model) without checking anything on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestStep {
    /// The command to send.
    pub command: Command,
    /// When present, the status this step asserts the device reports.
    ///
    /// The orchestrator checks observed status against the *model's*
    /// prediction; this annotation documents the author's intent and is
    /// cross-checked against the model at run time.
    pub expect: Option<DeviceStatus>,
}

impl TestStep {
    /// A setup step: send the command, assert nothing.
    pub fn setup(command: Command) -> Self {
        TestStep {
            command,
            expect: None,
        }
    }

    /// An asserted step: send the command, then verify the device reports
    /// `status`.
    pub fn expecting(command: Command, status: DeviceStatus) -> Self {
        TestStep {
            command,
            expect: Some(status),
        }
    }
}

/// A named, ordered command sequence with assertions.
#[derive(Debug, Clone)]
pub struct TestCase {
    name: String,
    steps: Vec<TestStep>,
}

impl TestCase {
    /// Build a test case from its steps. Immutable once defined.
    pub fn new(name: impl Into<String>, steps: impl Into<Vec<TestStep>>) -> Self {
        TestCase {
            name: name.into(),
            steps: steps.into(),
        }
    }

    /// The case's name, used in reports.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The ordered steps.
    pub fn steps(&self) -> &[TestStep] {
        &self.steps
    }
}

/// Outcome of running one [`TestCase`].
///
/// `Fail` is an observed assertion violation (the device disagreed with the
/// model); `Error` is an infrastructure fault (transport or parser). The
/// distinction matters for reporting and retry policy: failures are
/// conformance findings, errors are bench problems.
#[derive(Debug)]
pub enum TestResult {
    /// Every assertion in the case held.
    Pass,
    /// An assertion failed; the sequence stopped at this step (later steps
    /// assume the prior state was correctly reached).
    Fail {
        /// Zero-based index of the failing step.
        step_index: usize,
        /// Status the reference model predicted.
        expected: DeviceStatus,
        /// Status the device actually reported.
        observed: DeviceStatus,
    },
    /// The case aborted on an infrastructure fault.
    Error {
        /// The underlying fault.
        cause: Error,
    },
}

impl TestResult {
    /// Whether this outcome counts toward a clean exit code.
    pub fn is_pass(&self) -> bool {
        matches!(self, TestResult::Pass)
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestResult::Pass => write!(f, "PASS"),
            TestResult::Fail {
                step_index,
                expected,
                observed,
            } => write!(
                f,
                "FAIL at step {step_index}: expected {expected}, observed {observed}"
            ),
            TestResult::Error { cause } => write!(f, "ERROR: {cause}"),
        }
    }
}
