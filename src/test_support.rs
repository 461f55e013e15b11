//! Fakes shared by the unit tests

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use crate::aggregator::RunSummary;
use crate::report::Reporter;
use crate::unit::{Invocation, TestInvoker, TestResult, UnitError};

/// Invoker that answers from a script instead of running a process
///
/// Packages listed as failing exit with status 1 and print `FAIL <pkg>`,
/// everything else prints `ok <pkg>`.
#[derive(Default)]
pub struct ScriptedInvoker {
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl ScriptedInvoker {
    pub fn passing() -> Self {
        Self::default()
    }

    pub fn failing<I, S>(packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            failing: packages.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Hold the result of `package` back for `delay`
    pub fn with_delay(mut self, package: &str, delay: Duration) -> Self {
        self.delays.insert(package.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called_packages(&self) -> Vec<String> {
        let mut packages: Vec<String> = self.calls().into_iter().map(|(p, _)| p).collect();
        packages.sort();
        packages
    }
}

impl TestInvoker for ScriptedInvoker {
    fn invoke(&self, package: &str, args: &[String]) -> impl Future<Output = Invocation> + Send {
        self.calls
            .lock()
            .unwrap()
            .push((package.to_string(), args.to_vec()));

        let fails = self.failing.contains(package);
        let delay = self.delays.get(package).copied();
        let package = package.to_string();

        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            if fails {
                Invocation {
                    output: format!("FAIL {}\n", package).into_bytes(),
                    error: Some(UnitError::Exit { code: Some(1) }),
                }
            } else {
                Invocation {
                    output: format!("ok {}\n", package).into_bytes(),
                    error: None,
                }
            }
        }
    }
}

/// Reporter that remembers every event
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub started: Vec<String>,
    pub finished: Vec<(String, bool, Vec<u8>)>,
    pub no_units: Vec<String>,
    pub completed: Vec<RunSummary>,
}

impl Reporter for RecordingReporter {
    fn on_unit_started(&mut self, package: &str) {
        self.started.push(package.to_string());
    }

    fn on_unit_finished(&mut self, result: &TestResult) {
        self.finished
            .push((result.package.clone(), result.success(), result.output.clone()));
    }

    fn on_no_units(&mut self, root: &str) {
        self.no_units.push(root.to_string());
    }

    fn on_run_complete(&mut self, summary: &RunSummary) {
        self.completed.push(summary.clone());
    }
}
