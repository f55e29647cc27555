//! WRITE phase: publish both recovered line sets atomically.
//!
//! Both files are written into a hidden staging directory next to the
//! output directory, fsynced, and then the staging directory is renamed
//! into place. Readers see either no output directory or a complete one.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::codec;
use crate::config::RunConfig;
use crate::error::{BigdiffError, IoResultExt as _};

const STAGING_PREFIX: &str = ".bigdiff-staging-";

/// Fail with [`BigdiffError::OutputExists`] if `output_dir` is present.
///
/// # Errors
/// Returns [`BigdiffError::OutputExists`] when the path exists in any form.
pub fn ensure_absent(output_dir: &Path) -> Result<(), BigdiffError> {
    // symlink_metadata: a dangling link still occupies the name.
    if std::fs::symlink_metadata(output_dir).is_ok() {
        return Err(BigdiffError::OutputExists {
            path: output_dir.to_owned(),
        });
    }
    Ok(())
}

/// Write `left` and `right` as the two diff files of `output_dir`.
///
/// Returns the published output directory.
///
/// # Errors
/// Returns [`BigdiffError::OutputExists`] if `output_dir` already exists
/// (before staging or at publication) and [`BigdiffError::Io`] on any write
/// failure. The staging directory is removed on every error path.
#[instrument(
    skip_all,
    fields(output = %output_dir.display(), left = left.len(), right = right.len())
)]
pub fn write_outputs(
    output_dir: &Path,
    left: &BTreeSet<Vec<u8>>,
    right: &BTreeSet<Vec<u8>>,
    config: &RunConfig,
) -> Result<PathBuf, BigdiffError> {
    ensure_absent(output_dir)?;

    let parent = match output_dir.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).with_path("create output parent", parent)?;

    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(parent)
        .with_path("create staging directory in", parent)?;

    for (name, lines) in [
        (&config.diff_left_file, left),
        (&config.diff_right_file, right),
    ] {
        let path = staging.path().join(name);
        let mut writer = codec::create_gz(&path, config.compression_level)?;
        let written = codec::write_joined(&mut writer, lines.iter().map(Vec::as_slice))
            .with_path("write diff file", &path)?;
        codec::finish_gz(writer, &path, true)?;
        debug!(file = %path.display(), lines = written, "staged diff file");
    }

    // A directory created by someone else since the first check must not be
    // replaced: rename(2) would silently succeed onto an empty one.
    ensure_absent(output_dir)?;
    std::fs::rename(staging.path(), output_dir).with_path("publish output directory", output_dir)?;
    // The staging path is gone; dropping the guard is a no-op now.
    drop(staging);

    Ok(output_dir.to_owned())
}
