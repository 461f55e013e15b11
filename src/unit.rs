//! Test units and their execution
//!
//! A [`TestUnit`] is one testable package. Executing it hands the package to
//! a [`TestInvoker`] and sends exactly one [`TestResult`] back to the
//! aggregator.

use std::future::Future;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::mpsc::Sender;

use crate::config::RunnerConfig;

/// One testable package, mapped to exactly one test invocation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TestUnit {
    pub package: String,
}

impl TestUnit {
    pub fn new(package: impl Into<String>) -> Self {
        Self { package: package.into() }
    }
}

/// Why a unit failed
#[derive(Debug, Error)]
pub enum UnitError {
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("test command exited with {}", exit_description(.code))]
    Exit { code: Option<i32> },
}

fn exit_description(code: &Option<i32>) -> String {
    match *code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// Outcome of a single unit
#[derive(Debug)]
pub struct TestResult {
    pub package: String,
    pub output: Vec<u8>,
    pub error: Option<UnitError>,
    pub duration: Duration,
}

impl TestResult {
    pub fn success(&self) -> bool {
        self.error.is_none()
    }
}

/// Raw outcome of one test command run
#[derive(Debug, Default)]
pub struct Invocation {
    pub output: Vec<u8>,
    pub error: Option<UnitError>,
}

/// Runs the test command for a package
pub trait TestInvoker: Send + Sync + 'static {
    fn invoke(&self, package: &str, args: &[String]) -> impl Future<Output = Invocation> + Send;
}

/// Runs an external command: `<command> <args...> <package> <passthrough...>`
#[derive(Debug, Clone)]
pub struct CommandInvoker {
    command: String,
    args: Vec<String>,
}

impl CommandInvoker {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    pub fn from_config(config: &RunnerConfig) -> Self {
        Self::new(config.command.clone(), config.args.clone())
    }

    fn build(&self, package: &str, passthrough: &[String]) -> Command {
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args)
            .arg(package)
            .args(passthrough)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

impl TestInvoker for CommandInvoker {
    fn invoke(&self, package: &str, args: &[String]) -> impl Future<Output = Invocation> + Send {
        let mut cmd = self.build(package, args);
        let command = self.command.clone();

        async move {
            match cmd.output().await {
                Ok(output) => {
                    let mut combined = output.stdout;
                    combined.extend_from_slice(&output.stderr);

                    let error = if output.status.success() {
                        None
                    } else {
                        Some(UnitError::Exit {
                            code: output.status.code(),
                        })
                    };

                    Invocation {
                        output: combined,
                        error,
                    }
                }
                Err(source) => Invocation {
                    output: Vec::new(),
                    error: Some(UnitError::Spawn { command, source }),
                },
            }
        }
    }
}

/// Run a unit and send its result to `sink`
///
/// Sends exactly once. If the receiver is already gone the result is dropped.
pub async fn execute<I: TestInvoker>(
    unit: TestUnit,
    invoker: Arc<I>,
    args: Arc<[String]>,
    sink: Sender<TestResult>,
) {
    let start = Instant::now();
    let invocation = invoker.invoke(&unit.package, &args).await;

    let result = TestResult {
        package: unit.package,
        output: invocation.output,
        error: invocation.error,
        duration: start.elapsed(),
    };

    let _ = sink.send(result).await;
}
