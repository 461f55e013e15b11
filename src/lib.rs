//! pkgtest - concurrent package test runner
//!
//! Walks a package tree, starts one test command per testable directory as
//! soon as it is found, and folds the results into a single exit code:
//! - Recursive discovery with excluded directories and skip markers
//! - One tokio task per package, all running concurrently
//! - Count-based fan-in of results over a single channel
//! - Pluggable directory listing, test invocation and reporting

pub mod aggregator;
pub mod config;
pub mod discovery;
pub mod error;
pub mod lister;
pub mod orchestrator;
pub mod report;
pub mod source;
pub mod unit;

#[cfg(test)]
pub(crate) mod test_support;

pub use aggregator::{collect, RunSummary};
pub use config::Config;
pub use discovery::{Discoverer, DiscoverySettings};
pub use error::Error;
pub use lister::{DirectoryEntry, DirectoryLister, FsLister, MemoryLister};
pub use orchestrator::{Orchestrator, RunOutcome};
pub use report::{ConsoleReporter, Reporter};
pub use source::SourceRoot;
pub use unit::{CommandInvoker, Invocation, TestInvoker, TestResult, TestUnit, UnitError};
