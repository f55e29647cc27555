//! Exclusive scratch directory for one run's bucket files.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{BigdiffError, IoResultExt as _};
use crate::model::InputSide;

/// Owns `<root>/1` and `<root>/2` for the duration of a run.
///
/// The directory is created exclusively: an existing path is an error, so
/// the guard never removes state it did not create. Dropping the guard
/// removes the whole tree; [`WorkDir::close`] does the same but reports the
/// removal error.
#[derive(Debug)]
pub struct WorkDir {
    root: PathBuf,
    armed: bool,
}

impl WorkDir {
    /// Create `root` and one subdirectory per input side.
    ///
    /// # Errors
    /// Returns [`BigdiffError::Io`] if `root` already exists or any
    /// directory cannot be created.
    pub fn create(root: &Path) -> Result<Self, BigdiffError> {
        std::fs::create_dir(root).with_path("create work directory", root)?;
        let guard = Self {
            root: root.to_owned(),
            armed: true,
        };
        for side in InputSide::ALL {
            let dir = guard.side_dir(side);
            std::fs::create_dir(&dir).with_path("create work directory", &dir)?;
        }
        debug!(root = %root.display(), "created work directory");
        Ok(guard)
    }

    /// Bucket directory for `side`.
    #[must_use]
    pub fn side_dir(&self, side: InputSide) -> PathBuf {
        self.root.join(side.dir_name())
    }

    /// Remove the directory tree now.
    ///
    /// # Errors
    /// Returns [`BigdiffError::Io`] if removal fails.
    pub fn close(mut self) -> Result<(), BigdiffError> {
        self.armed = false;
        std::fs::remove_dir_all(&self.root).with_path("remove work directory", &self.root)?;
        debug!(root = %self.root.display(), "removed work directory");
        Ok(())
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.root) {
            warn!(root = %self.root.display(), error = %e, "failed to remove work directory");
        }
    }
}
