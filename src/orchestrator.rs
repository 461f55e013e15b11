//! Wiring of discovery and aggregation into one run

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::aggregator::{collect, RunSummary};
use crate::discovery::{Discoverer, DiscoverySettings};
use crate::error::Result;
use crate::lister::DirectoryLister;
use crate::report::Reporter;
use crate::source::SourceRoot;
use crate::unit::{TestInvoker, TestResult};

/// Slots in the result channel; producers wait while it is full
const RESULT_BUFFER: usize = 1;

/// How a run ended, short of a fatal error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every discovered unit reported
    Completed(RunSummary),
    /// Discovery found nothing to test
    NoTests,
}

impl RunOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Completed(summary) => summary.exit_code(),
            RunOutcome::NoTests => 1,
        }
    }
}

/// Runs discovery and aggregation against one package tree
pub struct Orchestrator<L, I> {
    lister: L,
    invoker: Arc<I>,
    source: SourceRoot,
    settings: DiscoverySettings,
}

impl<L, I> Orchestrator<L, I>
where
    L: DirectoryLister,
    I: TestInvoker,
{
    pub fn new(lister: L, invoker: I, source: SourceRoot, settings: DiscoverySettings) -> Self {
        Self {
            lister,
            invoker: Arc::new(invoker),
            source,
            settings,
        }
    }

    /// Test every package under `root`, forwarding `args` to each test command
    ///
    /// The directory walk is synchronous and blocks the calling task; unit
    /// tasks spawned during the walk run on the runtime meanwhile.
    pub async fn run<R: Reporter + ?Sized>(
        &self,
        root: &str,
        args: &[String],
        reporter: &mut R,
    ) -> Result<RunOutcome> {
        let (tx, mut rx) = mpsc::channel::<TestResult>(RESULT_BUFFER);

        // Consumes the only sender held outside the unit tasks
        let units = Discoverer::new(
            &self.lister,
            &self.source,
            &self.settings,
            self.invoker.clone(),
            Arc::from(args.to_vec()),
            tx,
            reporter,
        )
        .discover(root)?;

        if units.is_empty() {
            reporter.on_no_units(root);
            return Ok(RunOutcome::NoTests);
        }

        let summary = collect(&mut rx, units.len(), reporter).await?;
        Ok(RunOutcome::Completed(summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::lister::MemoryLister;
    use crate::test_support::{RecordingReporter, ScriptedInvoker};

    fn tree() -> MemoryLister {
        let mut lister = MemoryLister::new();
        lister
            .add_file("/go/src/acme/app/main_test.go")
            .add_file("/go/src/acme/app/api/api_test.go")
            .add_file("/go/src/acme/app/empty/README.md")
            .add_file("/go/src/acme/app/vendor/dep/dep_test.go");
        lister
    }

    fn orchestrator(invoker: ScriptedInvoker) -> Orchestrator<MemoryLister, ScriptedInvoker> {
        Orchestrator::new(
            tree(),
            invoker,
            SourceRoot::new("/go/src"),
            DiscoverySettings::default(),
        )
    }

    #[tokio::test]
    async fn test_all_units_pass() {
        let orchestrator = orchestrator(ScriptedInvoker::passing());
        let mut reporter = RecordingReporter::default();

        let outcome = orchestrator.run("acme/app", &[], &mut reporter).await.unwrap();

        assert_eq!(outcome.exit_code(), 0);
        match outcome {
            RunOutcome::Completed(summary) => {
                assert_eq!(summary.total, 2);
                assert_eq!(summary.passed, 2);
            }
            RunOutcome::NoTests => panic!("expected units"),
        }
        assert_eq!(orchestrator.invoker.called_packages(), vec!["acme/app", "acme/app/api"]);
    }

    #[tokio::test]
    async fn test_one_failing_unit_fails_run() {
        let orchestrator = orchestrator(ScriptedInvoker::failing(["acme/app/api"]));
        let mut reporter = RecordingReporter::default();

        let outcome = orchestrator.run("acme/app", &[], &mut reporter).await.unwrap();

        assert_eq!(outcome.exit_code(), 1);
        assert_eq!(reporter.finished.len(), 2);
    }

    #[tokio::test]
    async fn test_no_units_fails_without_aggregating() {
        let orchestrator = orchestrator(ScriptedInvoker::passing());
        let mut reporter = RecordingReporter::default();

        let outcome = orchestrator
            .run("acme/app/empty", &[], &mut reporter)
            .await
            .unwrap();

        assert_eq!(outcome, RunOutcome::NoTests);
        assert_eq!(outcome.exit_code(), 1);
        assert_eq!(reporter.no_units, vec!["acme/app/empty"]);
        assert!(reporter.completed.is_empty());
    }

    #[tokio::test]
    async fn test_missing_root_is_distinct_from_no_units() {
        let orchestrator = orchestrator(ScriptedInvoker::passing());
        let mut reporter = RecordingReporter::default();

        let err = orchestrator
            .run("acme/missing", &[], &mut reporter)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ListDir { .. }));
        assert!(reporter.no_units.is_empty());
    }
}
