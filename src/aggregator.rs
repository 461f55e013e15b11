//! Fan-in of unit results
//!
//! Producers never signal completion. The aggregator knows how many units
//! were discovered and stops once that many results have arrived.

use std::time::{Duration, Instant};
use tokio::sync::mpsc::Receiver;

use crate::error::{Error, Result};
use crate::report::Reporter;
use crate::unit::TestResult;

/// Verdict over every result of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    /// Failed packages, in arrival order
    pub failed: Vec<String>,
    pub duration: Duration,
}

impl RunSummary {
    pub fn success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn exit_code(&self) -> i32 {
        if self.success() {
            0
        } else {
            1
        }
    }

    fn record(&mut self, result: &TestResult) {
        self.total += 1;
        if result.success() {
            self.passed += 1;
        } else {
            self.failed.push(result.package.clone());
        }
    }
}

/// Receive exactly `expected` results from `rx`
///
/// Each result is forwarded to `reporter` as it arrives. Once the count is
/// reached the receiver is closed, so late senders fail instead of blocking.
/// If every sender is dropped before that, [`Error::MissingResults`] is
/// returned rather than waiting forever.
pub async fn collect<R: Reporter + ?Sized>(
    rx: &mut Receiver<TestResult>,
    expected: usize,
    reporter: &mut R,
) -> Result<RunSummary> {
    let start = Instant::now();
    let mut summary = RunSummary::default();

    while summary.total < expected {
        let result = match rx.recv().await {
            Some(result) => result,
            None => {
                return Err(Error::MissingResults {
                    received: summary.total,
                    expected,
                })
            }
        };

        summary.record(&result);
        reporter.on_unit_finished(&result);
    }

    rx.close();
    summary.duration = start.elapsed();
    reporter.on_run_complete(&summary);

    Ok(summary)
}
