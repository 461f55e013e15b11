//! Mapping package paths to filesystem locations

use std::path::PathBuf;

use crate::config::SourceConfig;

/// Resolves package paths (`github.com/acme/app/api`) to directories.
///
/// With a base directory set, a package lives at `<base>/<package>`.
/// Without one, the package path is already a filesystem path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRoot {
    base: Option<PathBuf>,
}

impl SourceRoot {
    /// Use package paths as filesystem paths
    pub fn identity() -> Self {
        Self { base: None }
    }

    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: Some(base.into()) }
    }

    /// Resolve the base from the process environment
    pub fn from_env(config: &SourceConfig) -> Self {
        Self::from_lookup(config, |name| std::env::var(name).ok())
    }

    /// Resolve the base through an arbitrary variable lookup
    ///
    /// An unset or empty variable yields [`SourceRoot::identity`].
    pub fn from_lookup<F>(config: &SourceConfig, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(&config.root_var) {
            Some(value) if !value.trim().is_empty() => {
                let mut base = PathBuf::from(value.trim());
                if !config.subdir.is_empty() {
                    base.push(&config.subdir);
                }
                Self::new(base)
            }
            _ => Self::identity(),
        }
    }

    pub fn base(&self) -> Option<&PathBuf> {
        self.base.as_ref()
    }

    pub fn resolve(&self, package: &str) -> PathBuf {
        match self.base {
            Some(ref base) => base.join(package.trim_start_matches('/')),
            None => PathBuf::from(package),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn config() -> SourceConfig {
        SourceConfig {
            root_var: "GOPATH".to_string(),
            subdir: "src".to_string(),
        }
    }

    #[test]
    fn test_resolve_under_env_root() {
        let root = SourceRoot::from_lookup(&config(), |name| {
            assert_eq!(name, "GOPATH");
            Some("/home/dev/go".to_string())
        });

        assert_eq!(
            root.resolve("github.com/acme/app"),
            Path::new("/home/dev/go/src/github.com/acme/app")
        );
    }

    #[test]
    fn test_unset_or_empty_variable_is_identity() {
        assert_eq!(SourceRoot::from_lookup(&config(), |_| None), SourceRoot::identity());
        assert_eq!(
            SourceRoot::from_lookup(&config(), |_| Some("  ".to_string())),
            SourceRoot::identity()
        );
        assert_eq!(SourceRoot::identity().resolve("./pkg"), Path::new("./pkg"));
    }

    #[test]
    fn test_empty_subdir() {
        let config = SourceConfig {
            root_var: "CODE".to_string(),
            subdir: String::new(),
        };
        let root = SourceRoot::from_lookup(&config, |_| Some("/code".to_string()));
        assert_eq!(root.resolve("lib/x"), Path::new("/code/lib/x"));
    }
}
