//! dastest-harness: Test orchestration for the DAS conformance suite.
//!
//! The harness turns named command sequences ([`TestCase`]) into verdicts
//! ([`TestResult`]) by driving them over any
//! [`Transport`](dastest_core::Transport) and comparing the device's
//! reported status against the reference model in
//! [`dastest_core::model`]. The [`scenarios`] module carries the standard
//! five-case suite; [`suite::run_suite`] runs a slice of cases end to end
//! and aggregates a [`SuiteReport`].

pub mod orchestrator;
pub mod scenarios;
pub mod suite;
pub mod testcase;

pub use orchestrator::{run, HarnessConfig};
pub use suite::{run_suite, CaseOutcome, SuiteReport};
pub use testcase::{TestCase, TestResult, TestStep};
