//! The standard DAS conformance scenarios.
//!
//! Five sequences exercising every arc of the device state machine,
//! including the guard that `Trigger` is ignored outside `Armed`. The
//! expected statuses annotate author intent; at run time the reference
//! model's prediction is authoritative.

use dastest_core::Command::*;
use dastest_core::DeviceStatus::*;

use crate::testcase::{TestCase, TestStep};

/// A fresh device reports `OFF`.
pub fn status_while_off() -> TestCase {
    TestCase::new("status-while-off", [TestStep::expecting(Status, Off)])
}

/// `Arm` from `Off` reaches `ARMED`.
pub fn arming() -> TestCase {
    TestCase::new(
        "arming",
        [TestStep::setup(Arm), TestStep::expecting(Status, Armed)],
    )
}

/// `Trigger` without a prior `Arm` is ignored; the device stays `OFF`.
pub fn faulty_trigger_rejected() -> TestCase {
    TestCase::new(
        "faulty-trigger-rejected",
        [TestStep::setup(Trigger), TestStep::expecting(Status, Off)],
    )
}

/// The full arm-then-trigger path reaches `ACTIVE`.
pub fn activation() -> TestCase {
    TestCase::new(
        "activation",
        [
            TestStep::setup(Arm),
            TestStep::setup(Trigger),
            TestStep::expecting(Status, Active),
        ],
    )
}

/// `Disarm` from `ACTIVE` returns the device to `OFF`.
pub fn disarm_deactivates() -> TestCase {
    TestCase::new(
        "disarm-deactivates",
        [
            TestStep::setup(Arm),
            TestStep::setup(Trigger),
            TestStep::setup(Disarm),
            TestStep::expecting(Status, Off),
        ],
    )
}

/// All standard scenarios, in run order.
pub fn standard_suite() -> Vec<TestCase> {
    vec![
        status_while_off(),
        arming(),
        faulty_trigger_rejected(),
        activation(),
        disarm_deactivates(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use dastest_core::model;

    #[test]
    fn suite_has_the_five_standard_cases() {
        let names: Vec<_> = standard_suite()
            .iter()
            .map(|c| c.name().to_owned())
            .collect();
        assert_eq!(
            names,
            [
                "status-while-off",
                "arming",
                "faulty-trigger-rejected",
                "activation",
                "disarm-deactivates",
            ]
        );
    }

    /// Every annotated expectation must agree with the reference model.
    #[test]
    fn annotations_match_model_predictions() {
        for case in standard_suite() {
            let mut state = model::INITIAL_STATE;
            for (i, step) in case.steps().iter().enumerate() {
                state = model::apply(state, step.command);
                if let Some(annotated) = step.expect {
                    assert_eq!(
                        annotated,
                        state,
                        "{} step {i}: annotation disagrees with model",
                        case.name()
                    );
                }
            }
        }
    }

    #[test]
    fn every_assertion_is_a_trailing_status() {
        // Assertions ride on an explicit Status step, so the command under
        // test and the observation are separate wire exchanges.
        for case in standard_suite() {
            for step in case.steps() {
                if step.expect.is_some() {
                    assert_eq!(step.command, Status, "{}", case.name());
                }
            }
        }
    }
}
