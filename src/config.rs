use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_SKIP_MARKER: &str = ".ptestskip";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub source: SourceConfig,
}

/// The external test command
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerConfig {
    #[serde(default = "default_command")]
    pub command: String,
    /// Arguments placed before the package path
    #[serde(default = "default_args")]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryConfig {
    /// Glob patterns for file names that make a directory testable
    #[serde(default = "default_test_files")]
    pub test_files: Vec<String>,
    /// Directory names that are never descended into
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
    #[serde(default = "default_skip_marker")]
    pub skip_marker: String,
    /// Honour skip markers
    #[serde(default = "default_true")]
    pub allow_skip: bool,
}

/// Where package paths live on disk
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Environment variable holding the source root
    #[serde(default = "default_root_var")]
    pub root_var: String,
    /// Subdirectory of the source root that holds packages
    #[serde(default = "default_subdir")]
    pub subdir: String,
}

fn default_command() -> String {
    "go".to_string()
}

fn default_args() -> Vec<String> {
    vec!["test".to_string()]
}

fn default_test_files() -> Vec<String> {
    vec!["*_test.go".to_string()]
}

fn default_exclude() -> Vec<String> {
    vec!["vendor".to_string()]
}

fn default_skip_marker() -> String {
    DEFAULT_SKIP_MARKER.to_string()
}

fn default_true() -> bool {
    true
}

fn default_root_var() -> String {
    "GOPATH".to_string()
}

fn default_subdir() -> String {
    "src".to_string()
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            args: default_args(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            test_files: default_test_files(),
            exclude: default_exclude(),
            skip_marker: default_skip_marker(),
            allow_skip: true,
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            root_var: default_root_var(),
            subdir: default_subdir(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Load `path` if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.runner.command.trim().is_empty() {
            anyhow::bail!("runner.command must not be empty");
        }

        if self.discovery.test_files.is_empty() {
            anyhow::bail!("discovery.test_files must list at least one pattern");
        }

        for pattern in &self.discovery.test_files {
            glob::Pattern::new(pattern)
                .with_context(|| format!("Invalid test file pattern '{}'", pattern))?;
        }

        if self.discovery.skip_marker.is_empty() {
            anyhow::bail!("discovery.skip_marker must not be empty");
        }

        Ok(())
    }
}
