use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

use pkgtest::{
    CommandInvoker, Config, ConsoleReporter, DiscoverySettings, FsLister, Orchestrator, RunOutcome,
    SourceRoot,
};

const CONFIG_FILE: &str = "pkgtest.toml";

#[derive(Parser)]
#[command(name = "pkgtest")]
#[command(about = "Run the tests of a package and all of its subpackages concurrently")]
#[command(version)]
struct Cli {
    /// Path to config file (default: pkgtest.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ignore skip marker files
    #[arg(long)]
    no_skip: bool,

    /// Only print the output of failing packages
    #[arg(short, long)]
    quiet: bool,

    /// Root package, relative to the source root
    root: String,

    /// Flags forwarded unchanged to every test command
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    passthrough: Vec<String>,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // Help and version go to stdout and succeed
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let config = match cli.config {
        Some(ref path) => Config::load(path)?,
        None => Config::load_or_default(&PathBuf::from(CONFIG_FILE))?,
    };

    let settings = DiscoverySettings::from_config(&config.discovery)
        .context("Invalid test file pattern")?
        .with_allow_skip(config.discovery.allow_skip && !cli.no_skip);

    let source = SourceRoot::from_env(&config.source);
    let orchestrator = Orchestrator::new(
        FsLister,
        CommandInvoker::from_config(&config.runner),
        source,
        settings,
    );
    let mut reporter = ConsoleReporter::new(cli.quiet);

    let outcome = cmd_test(&orchestrator, &cli.root, &cli.passthrough, &mut reporter)?;
    Ok(outcome.exit_code())
}

#[tokio::main]
async fn cmd_test(
    orchestrator: &Orchestrator<FsLister, CommandInvoker>,
    root: &str,
    passthrough: &[String],
    reporter: &mut ConsoleReporter,
) -> Result<RunOutcome> {
    println!(
        "\n{} Testing {} and subpackages\n",
        "→".blue(),
        root.bold()
    );

    let outcome = orchestrator
        .run(root, passthrough, reporter)
        .await
        .with_context(|| format!("Could not test {}", root))?;

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_and_passthrough() {
        let cli = Cli::try_parse_from(["pkgtest", "github.com/acme/app", "-race", "-run", "TestX"])
            .unwrap();
        assert_eq!(cli.root, "github.com/acme/app");
        assert_eq!(cli.passthrough, vec!["-race", "-run", "TestX"]);
        assert!(!cli.no_skip);
    }

    #[test]
    fn test_options_before_root() {
        let cli = Cli::try_parse_from(["pkgtest", "--no-skip", "-q", "pkg", "--", "-v"]).unwrap();
        assert!(cli.no_skip);
        assert!(cli.quiet);
        assert_eq!(cli.root, "pkg");
        assert_eq!(cli.passthrough, vec!["-v"]);
    }

    #[test]
    fn test_missing_root_is_usage_error() {
        let err = Cli::try_parse_from(["pkgtest"]).err().unwrap();
        assert!(err.use_stderr());
    }
}
