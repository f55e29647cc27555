//! Input resolution.
//!
//! The input directory must contain exactly two regular files. The
//! lexicographically smaller path becomes the left side.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::BigdiffError;
use crate::model::InputSide;

/// The two input files of a run, already ordered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolvedInputs {
    pub left: PathBuf,
    pub right: PathBuf,
}

impl ResolvedInputs {
    /// Input file for `side`.
    #[must_use]
    pub fn path(&self, side: InputSide) -> &Path {
        match side {
            InputSide::Left => &self.left,
            InputSide::Right => &self.right,
        }
    }
}

/// Locate and order the two input files in `dir`.
///
/// # Errors
/// Returns [`BigdiffError::InvalidInput`] if `dir` cannot be read, is empty,
/// holds other than two entries, or holds anything but regular files.
pub fn resolve_inputs(dir: &Path) -> Result<ResolvedInputs, BigdiffError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| BigdiffError::invalid_input(dir, format!("cannot read directory: {e}")))?;

    let mut files = Vec::with_capacity(2);
    for entry in entries {
        let entry = entry
            .map_err(|e| BigdiffError::invalid_input(dir, format!("cannot read entry: {e}")))?;
        let path = entry.path();
        // Follows symlinks: a link to a regular file counts as a file.
        let meta = std::fs::metadata(&path).map_err(|e| {
            BigdiffError::invalid_input(dir, format!("cannot stat {}: {e}", path.display()))
        })?;
        if !meta.is_file() {
            return Err(BigdiffError::invalid_input(
                dir,
                format!("{} is not a regular file", path.display()),
            ));
        }
        files.push(path);
        if files.len() > 2 {
            return Err(BigdiffError::invalid_input(
                dir,
                "expected exactly 2 files, found more",
            ));
        }
    }

    match files.len() {
        0 => Err(BigdiffError::invalid_input(dir, "directory is empty")),
        1 => Err(BigdiffError::invalid_input(
            dir,
            "expected exactly 2 files, found 1",
        )),
        _ => {
            files.sort();
            let [left, right]: [PathBuf; 2] = files
                .try_into()
                .map_err(|_| BigdiffError::invalid_input(dir, "expected exactly 2 files"))?;
            info!(left = %left.display(), right = %right.display(), "resolved inputs");
            Ok(ResolvedInputs { left, right })
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::all, clippy::pedantic, clippy::nursery)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, "").unwrap();
        path
    }

    #[test]
    fn orders_two_files_lexicographically() {
        let dir = tempfile::tempdir().unwrap();
        let b = touch(dir.path(), "snapshot-b.gz");
        let a = touch(dir.path(), "snapshot-a.gz");
        let inputs = resolve_inputs(dir.path()).unwrap();
        assert_eq!(inputs.left, a);
        assert_eq!(inputs.right, b);
        assert_eq!(inputs.path(InputSide::Right), b.as_path());
    }

    #[test]
    fn empty_directory_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_inputs(dir.path()).unwrap_err();
        assert!(err.to_string().contains("empty"), "{err}");
    }

    #[test]
    fn single_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "only.gz");
        assert!(matches!(
            resolve_inputs(dir.path()),
            Err(BigdiffError::InvalidInput { .. })
        ));
    }

    #[test]
    fn three_files_rejected() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.gz", "b.gz", "c.gz"] {
            touch(dir.path(), name);
        }
        let err = resolve_inputs(dir.path()).unwrap_err();
        assert!(err.to_string().contains("exactly 2"), "{err}");
    }

    #[test]
    fn subdirectory_rejected() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.gz");
        std::fs::create_dir(dir.path().join("temp")).unwrap();
        let err = resolve_inputs(dir.path()).unwrap_err();
        assert!(err.to_string().contains("not a regular file"), "{err}");
    }

    #[test]
    fn missing_directory_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_inputs(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, BigdiffError::InvalidInput { .. }));
    }
}
