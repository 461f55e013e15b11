//! Package discovery
//!
//! Walks a package tree depth-first. Every directory holding a recognised
//! test file becomes one [`TestUnit`], and its test command is started on a
//! tokio task the moment the unit is registered, so execution overlaps with
//! the rest of the walk.

use glob::Pattern;
use std::sync::Arc;
use tokio::sync::mpsc::Sender;

use crate::config::DiscoveryConfig;
use crate::error::{Error, Result};
use crate::lister::{DirectoryEntry, DirectoryLister};
use crate::report::Reporter;
use crate::source::SourceRoot;
use crate::unit::{execute, TestInvoker, TestResult, TestUnit};

/// Which entries make a directory testable, skipped, or off limits
#[derive(Debug, Clone)]
pub struct DiscoverySettings {
    pub test_files: Vec<Pattern>,
    pub exclude: Vec<String>,
    pub skip_marker: String,
    pub allow_skip: bool,
}

impl DiscoverySettings {
    pub fn from_config(config: &DiscoveryConfig) -> std::result::Result<Self, glob::PatternError> {
        let test_files = config
            .test_files
            .iter()
            .map(|p| Pattern::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            test_files,
            exclude: config.exclude.clone(),
            skip_marker: config.skip_marker.clone(),
            allow_skip: config.allow_skip,
        })
    }

    pub fn with_allow_skip(mut self, allow_skip: bool) -> Self {
        self.allow_skip = allow_skip;
        self
    }

    fn is_test_file(&self, entry: &DirectoryEntry) -> bool {
        !entry.is_dir && self.test_files.iter().any(|p| p.matches(&entry.name))
    }

    fn is_skip_marker(&self, entry: &DirectoryEntry) -> bool {
        self.allow_skip && !entry.is_dir && entry.name == self.skip_marker
    }

    fn should_descend(&self, entry: &DirectoryEntry) -> bool {
        entry.is_dir && !self.exclude.iter().any(|e| *e == entry.name)
    }
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self::from_config(&DiscoveryConfig::default()).expect("default test file patterns are valid")
    }
}

/// Per-directory walk state, never shared between directories
#[derive(Debug, Default)]
struct DirState {
    has_unit: bool,
    skipped: bool,
}

/// Walks a package tree and launches one test run per testable directory
pub struct Discoverer<'a, L: ?Sized, I, R: ?Sized> {
    lister: &'a L,
    source: &'a SourceRoot,
    settings: &'a DiscoverySettings,
    invoker: Arc<I>,
    args: Arc<[String]>,
    sink: Sender<TestResult>,
    reporter: &'a mut R,
}

impl<'a, L, I, R> Discoverer<'a, L, I, R>
where
    L: DirectoryLister + ?Sized,
    I: TestInvoker,
    R: Reporter + ?Sized,
{
    pub fn new(
        lister: &'a L,
        source: &'a SourceRoot,
        settings: &'a DiscoverySettings,
        invoker: Arc<I>,
        args: Arc<[String]>,
        sink: Sender<TestResult>,
        reporter: &'a mut R,
    ) -> Self {
        Self {
            lister,
            source,
            settings,
            invoker,
            args,
            sink,
            reporter,
        }
    }

    /// Discover every unit under `root`, starting each one as it is found
    ///
    /// Must be called within a tokio runtime. The returned list holds every
    /// unit whose result will be sent on the sink; the discoverer's own
    /// sender is dropped on return. A directory that cannot be listed aborts
    /// the whole walk; units spawned before that keep running.
    pub fn discover(mut self, root: &str) -> Result<Vec<TestUnit>> {
        let root = match root.strip_suffix('/') {
            Some(trimmed) if !trimmed.is_empty() => trimmed,
            _ => root,
        };
        self.walk(root)
    }

    fn walk(&mut self, package: &str) -> Result<Vec<TestUnit>> {
        let path = self.source.resolve(package);
        let mut entries = self
            .lister
            .list(&path)
            .map_err(|source| Error::ListDir { path, source })?;

        // Listing order is filesystem dependent
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        let mut state = DirState {
            skipped: entries.iter().any(|e| self.settings.is_skip_marker(e)),
            ..DirState::default()
        };
        let mut units = Vec::new();

        for entry in &entries {
            if self.settings.should_descend(entry) {
                let child = join_package(package, &entry.name);
                units.extend(self.walk(&child)?);
            } else if !state.skipped && !state.has_unit && self.settings.is_test_file(entry) {
                let unit = TestUnit::new(package);
                self.start(unit.clone());
                units.push(unit);
                state.has_unit = true;
            }
        }

        Ok(units)
    }

    fn start(&mut self, unit: TestUnit) {
        self.reporter.on_unit_started(&unit.package);
        tokio::spawn(execute(
            unit,
            self.invoker.clone(),
            self.args.clone(),
            self.sink.clone(),
        ));
    }
}

fn join_package(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else if parent.ends_with('/') {
        format!("{}{}", parent, name)
    } else {
        format!("{}/{}", parent, name)
    }
}
