//! RECOVER phase: map diff hashes back to the original lines.
//!
//! The partition files only hold hashes, so the text is recovered by
//! re-reading the original input and keeping every line whose hash is in
//! the target set. There is no text check against the other side.

use std::collections::{BTreeSet, HashSet};
use std::hash::BuildHasher;
use std::path::Path;

use tracing::{debug, instrument};

use crate::codec::LineReader;
use crate::error::BigdiffError;
use crate::hash::LineHasher;
use crate::model::HashValue;

/// Lines of `input` whose hash is in `target`.
///
/// An empty `target` returns immediately without opening `input`.
///
/// # Errors
/// Returns [`BigdiffError::Io`] if `input` cannot be read.
#[instrument(skip_all, fields(input = %input.display(), target = target.len()))]
pub fn recover<H, S>(
    target: &HashSet<HashValue, S>,
    hasher: &H,
    input: &Path,
) -> Result<BTreeSet<Vec<u8>>, BigdiffError>
where
    H: LineHasher + ?Sized,
    S: BuildHasher,
{
    let mut lines = BTreeSet::new();
    if target.is_empty() {
        return Ok(lines);
    }

    let mut reader = LineReader::open(input)?;
    while let Some(line) = reader.next_line()? {
        if target.contains(&hasher.hash_line(line)) && !lines.contains(line) {
            lines.insert(line.to_vec());
        }
    }
    debug!(scanned = reader.line_no(), recovered = lines.len(), "recovery scan complete");
    Ok(lines)
}

#[cfg(test)]
#[allow(clippy::all, clippy::pedantic, clippy::nursery)]
mod tests {
    use super::*;

    fn write_input(dir: &Path, contents: &str) -> std::path::PathBuf {
        let path = dir.join("input.txt");
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn len_hash(line: &[u8]) -> u64 {
        line.len() as u64
    }

    #[test]
    fn keeps_lines_with_target_hashes() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), "a\nbb\nccc\ndd\n");
        let target = HashSet::from([2]);
        let lines = recover(&target, &len_hash, &input).unwrap();
        assert_eq!(lines, BTreeSet::from([b"bb".to_vec(), b"dd".to_vec()]));
    }

    #[test]
    fn non_utf8_lines_are_recovered_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        std::fs::write(&path, b"caf\xe9\nab\n").unwrap();
        let lines = recover(&HashSet::from([4]), &len_hash, &path).unwrap();
        assert_eq!(lines, BTreeSet::from([b"caf\xe9".to_vec()]));
    }

    #[test]
    fn duplicate_lines_reported_once() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), "x\nx\nx\n");
        let lines = recover(&HashSet::from([1]), &len_hash, &input).unwrap();
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn empty_target_never_opens_input() {
        let lines = recover(
            &HashSet::new(),
            &len_hash,
            Path::new("/nonexistent/bigdiff/input.gz"),
        )
        .unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn unreadable_input_with_targets_is_an_error() {
        let err = recover(
            &HashSet::from([1]),
            &len_hash,
            Path::new("/nonexistent/bigdiff/input.gz"),
        )
        .unwrap_err();
        assert!(matches!(err, BigdiffError::Io { .. }));
    }

    #[test]
    fn hashes_without_matching_lines_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), "abc\n");
        let lines = recover(&HashSet::from([99]), &len_hash, &input).unwrap();
        assert!(lines.is_empty());
    }
}
