//! Suite runner: executes test cases sequentially and aggregates outcomes.
//!
//! One transport connection per case, opened through a caller-supplied
//! factory. An `Error` outcome on one case does not abort the suite; the
//! remaining cases still run against a fresh connection.

use std::fmt;
use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::info;

use dastest_core::error::Result;
use dastest_core::transport::Transport;

use crate::orchestrator::{self, HarnessConfig};
use crate::testcase::{TestCase, TestResult};

/// One case's name paired with its result.
#[derive(Debug)]
pub struct CaseOutcome {
    pub name: String,
    pub result: TestResult,
}

/// Aggregated outcomes of a suite run.
///
/// Cases skipped by cancellation are absent, not recorded as failures.
#[derive(Debug, Default)]
pub struct SuiteReport {
    outcomes: Vec<CaseOutcome>,
}

impl SuiteReport {
    /// Outcomes in execution order.
    pub fn outcomes(&self) -> &[CaseOutcome] {
        &self.outcomes
    }

    /// True when every recorded case passed. An empty report (everything
    /// cancelled) is not a clean run.
    pub fn all_passed(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(|o| o.result.is_pass())
    }

    /// Number of passing cases.
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_pass()).count()
    }

    fn record(&mut self, name: &str, result: TestResult) {
        info!(case = name, result = %result, "case complete");
        self.outcomes.push(CaseOutcome {
            name: name.to_owned(),
            result,
        });
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            writeln!(f, "{:<28} {}", outcome.name, outcome.result)?;
        }
        write!(
            f,
            "{} of {} cases passed",
            self.passed(),
            self.outcomes.len()
        )
    }
}

/// Run `cases` in order, connecting once per case via `connect`.
///
/// A connect failure is recorded as that case's `Error` outcome and the
/// suite moves on. Cancellation stops before the next case; cases already
/// finished keep their outcomes.
pub async fn run_suite<F, Fut>(
    cases: &[TestCase],
    config: &HarnessConfig,
    mut connect: F,
    cancel: &CancellationToken,
) -> SuiteReport
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Box<dyn Transport>>>,
{
    let mut report = SuiteReport::default();

    for case in cases {
        if cancel.is_cancelled() {
            info!("suite cancelled, skipping remaining cases");
            break;
        }

        let transport = match connect().await {
            Ok(t) => t,
            Err(cause) => {
                report.record(case.name(), TestResult::Error { cause });
                continue;
            }
        };

        match orchestrator::run(case, transport, config, cancel).await {
            Some(result) => report.record(case.name(), result),
            // Cancelled mid-case; the partial result is discarded.
            None => break,
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testcase::TestStep;
    use dastest_core::{Command::*, DeviceStatus::*, Error};
    use dastest_protocol::framing::FramingMode;
    use dastest_sim::SimulatedDas;
    use std::time::Duration;

    fn fast_config() -> HarnessConfig {
        HarnessConfig {
            settle_delay: Duration::ZERO,
            read_timeout: Duration::from_millis(20),
            ..Default::default()
        }
    }

    fn sim_connect() -> impl FnMut() -> std::future::Ready<Result<Box<dyn Transport>>> {
        || {
            let t: Box<dyn Transport> = Box::new(SimulatedDas::new(FramingMode::Raw));
            std::future::ready(Ok(t))
        }
    }

    #[tokio::test]
    async fn full_suite_passes_against_simulator() {
        let cases = crate::scenarios::standard_suite();
        let report = run_suite(
            &cases,
            &fast_config(),
            sim_connect(),
            &CancellationToken::new(),
        )
        .await;
        assert!(report.all_passed(), "\n{report}");
        assert_eq!(report.outcomes().len(), cases.len());
    }

    #[tokio::test]
    async fn connect_failure_is_recorded_not_fatal() {
        let cases = [
            TestCase::new("first", [TestStep::expecting(Status, Off)]),
            TestCase::new("second", [TestStep::expecting(Status, Off)]),
        ];
        let mut attempts = 0;
        let connect = move || {
            attempts += 1;
            let out: Result<Box<dyn Transport>> = if attempts == 1 {
                Err(Error::NoPortAvailable)
            } else {
                Ok(Box::new(SimulatedDas::new(FramingMode::Raw)))
            };
            std::future::ready(out)
        };

        let report = run_suite(&cases, &fast_config(), connect, &CancellationToken::new()).await;

        assert_eq!(report.outcomes().len(), 2);
        assert!(matches!(
            report.outcomes()[0].result,
            TestResult::Error {
                cause: Error::NoPortAvailable
            }
        ));
        assert!(report.outcomes()[1].result.is_pass());
        assert!(!report.all_passed());
    }

    #[tokio::test]
    async fn cancellation_skips_remaining_cases() {
        let cases = [
            TestCase::new("first", [TestStep::expecting(Status, Off)]),
            TestCase::new("second", [TestStep::expecting(Status, Off)]),
        ];
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = run_suite(&cases, &fast_config(), sim_connect(), &cancel).await;
        assert!(report.outcomes().is_empty());
        assert!(!report.all_passed());
    }

    #[test]
    fn empty_report_is_not_a_clean_run() {
        assert!(!SuiteReport::default().all_passed());
    }
}
