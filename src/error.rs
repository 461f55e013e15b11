//! Errors that abort a whole run

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised by discovery or aggregation.
///
/// Failures of individual test units are not errors at this level; they are
/// carried inside [`crate::TestResult`] and only affect the exit code.
#[derive(Debug, Error)]
pub enum Error {
    /// A directory in the package tree could not be listed
    #[error("cannot list {}: {source}", path.display())]
    ListDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Every producer went away before all expected results were delivered
    #[error("result channel closed after {received} of {expected} results")]
    MissingResults { received: usize, expected: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
