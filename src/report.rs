//! Reporting of unit progress and the final verdict

use colored::Colorize;
use std::io::{self, Write};

use crate::aggregator::RunSummary;
use crate::unit::TestResult;

/// Receives progress events from discovery and aggregation.
///
/// Implementations own all formatting; the engine only hands over
/// package names, outcomes and raw output.
pub trait Reporter {
    /// Called when a unit has been discovered and its test command started
    fn on_unit_started(&mut self, _package: &str) {}

    /// Called once per unit, in arrival order
    fn on_unit_finished(&mut self, result: &TestResult);

    /// Called when discovery found nothing to test under `root`
    fn on_no_units(&mut self, root: &str);

    /// Called after the last result was received
    fn on_run_complete(&mut self, summary: &RunSummary);
}

/// Colored terminal reporter
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    /// Only print the output of failed units
    pub quiet: bool,
}

impl ConsoleReporter {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    fn print_output(output: &[u8]) {
        if output.is_empty() {
            return;
        }

        let mut stdout = io::stdout().lock();
        let _ = stdout.write_all(output);
        if !output.ends_with(b"\n") {
            let _ = stdout.write_all(b"\n");
        }
        let _ = stdout.flush();
    }
}

impl Reporter for ConsoleReporter {
    fn on_unit_started(&mut self, package: &str) {
        println!("{} Testing {}", "→".blue(), package.yellow());
    }

    fn on_unit_finished(&mut self, result: &TestResult) {
        let duration = format!("({}ms)", result.duration.as_millis()).dimmed();

        match result.error {
            None => {
                println!("{} {} {}", "✓".green(), result.package.green(), duration);
                if !self.quiet {
                    Self::print_output(&result.output);
                }
            }
            Some(ref error) => {
                println!(
                    "{} {} {} {}",
                    "✗".red(),
                    result.package.red(),
                    duration,
                    error.to_string().dimmed()
                );
                Self::print_output(&result.output);
            }
        }
    }

    fn on_no_units(&mut self, root: &str) {
        println!("{} No tests to run in {}", "✗".red().bold(), root.cyan());
    }

    fn on_run_complete(&mut self, summary: &RunSummary) {
        println!("{}", "─".repeat(50).dimmed());

        if summary.success() {
            println!(
                "{} All {} package(s) passed ({}ms)",
                "✓".green().bold(),
                summary.total,
                summary.duration.as_millis()
            );
        } else {
            println!(
                "{} {}/{} package(s) failed ({}ms)",
                "✗".red().bold(),
                summary.failed.len(),
                summary.total,
                summary.duration.as_millis()
            );

            println!("\n{}", "Failed packages:".red());
            for package in &summary.failed {
                println!("  {} {}", "•".red(), package);
            }
        }
    }
}
