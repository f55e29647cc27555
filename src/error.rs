//! Error types for bigdiff runs.
//!
//! [`BigdiffError`] is the single error type returned by every engine
//! component (resolver, partitioner, merger, recovery, output writer). The
//! orchestrator wraps the first fatal error in a [`RunError`] that also
//! records the [`Phase`] in which it happened.
//!
//! Hash collisions are deliberately absent from this taxonomy: the engine
//! compares hash values, not line text, and any misclassification caused by
//! a collision is part of its documented semantics.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::ConfigError;
use crate::engine::Phase;

// ---------------------------------------------------------------------------
// BigdiffError
// ---------------------------------------------------------------------------

/// Errors returned by engine components.
#[derive(Debug, Error)]
pub enum BigdiffError {
    /// The input directory is missing, empty, or does not hold exactly two
    /// regular files.
    #[error("invalid input directory {}: {reason}", dir.display())]
    InvalidInput {
        /// The input directory that was inspected.
        dir: PathBuf,
        /// Why the directory was rejected.
        reason: String,
    },

    /// A bucket count of zero was requested.
    #[error("invalid bucket count {count}: at least one bucket is required")]
    InvalidBucketCount {
        /// The rejected bucket count.
        count: u32,
    },

    /// The output directory already exists. Outputs are never written into
    /// an existing directory.
    #[error(
        "output directory {} already exists\n  To fix: remove it or choose another output directory",
        path.display()
    )]
    OutputExists {
        /// The output directory that was found.
        path: PathBuf,
    },

    /// A bucket file (or bucket directory entry) is not in the format the
    /// partitioner writes.
    #[error("malformed bucket {} at line {line}: `{value}`", path.display())]
    MalformedBucket {
        /// The offending file.
        path: PathBuf,
        /// 1-based line number, or 0 for a bad file name.
        line: u64,
        /// The raw value that failed to parse.
        value: String,
    },

    /// A read, write, or compression failure.
    #[error("{context} {}: {source}", path.display())]
    Io {
        /// What was being attempted (e.g. `"create bucket file"`).
        context: &'static str,
        /// The file or directory involved.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The run configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl BigdiffError {
    /// Build a [`BigdiffError::Io`] for the given path.
    #[must_use]
    pub fn io(context: &'static str, path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            context,
            path: path.as_ref().to_owned(),
            source,
        }
    }

    pub(crate) fn invalid_input(dir: &Path, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            dir: dir.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Extension for attaching path context to `io::Result`s.
pub(crate) trait IoResultExt<T> {
    fn with_path(self, context: &'static str, path: &Path) -> Result<T, BigdiffError>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path(self, context: &'static str, path: &Path) -> Result<T, BigdiffError> {
        self.map_err(|e| BigdiffError::io(context, path, e))
    }
}

// ---------------------------------------------------------------------------
// RunError
// ---------------------------------------------------------------------------

/// A failed run: the phase that was active and the error that aborted it.
///
/// By the time a `RunError` reaches the caller the working directory has
/// already been removed.
#[derive(Debug, Error)]
#[error("bigdiff failed during {phase}")]
pub struct RunError {
    /// The phase that was active when the error occurred.
    pub phase: Phase,
    /// The underlying cause.
    #[source]
    pub source: BigdiffError,
}

impl RunError {
    /// Returns `true` if the run was rejected before any filesystem state
    /// was created.
    #[must_use]
    pub const fn is_rejected_input(&self) -> bool {
        matches!(
            self.source,
            BigdiffError::InvalidInput { .. }
                | BigdiffError::InvalidBucketCount { .. }
                | BigdiffError::Config(_)
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
