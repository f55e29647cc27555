//! DIFF phase: pair buckets across the two sides and collect hash differences.
//!
//! Both sides' bucket files are listed in bucket-id order and walked with a
//! two-pointer sorted merge ([`BucketPairs`]). Only one bucket pair is held in
//! memory at a time.
//!
//! ```text
//! left:  0 1   3 4
//! right: 0   2 3
//! pairs: Both(0) LeftOnly(1) RightOnly(2) Both(3) LeftOnly(4)
//! ```
//!
//! A bucket missing on one side behaves exactly like an empty bucket.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, instrument};

use crate::codec::LineReader;
use crate::error::{BigdiffError, IoResultExt as _};
use crate::model::{BucketId, HashValue};

use super::differ;

// ---------------------------------------------------------------------------
// BucketFile
// ---------------------------------------------------------------------------

/// One bucket file on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BucketFile {
    pub id: BucketId,
    pub path: PathBuf,
}

/// List the bucket files in `dir`, sorted by bucket id.
///
/// # Errors
/// Returns [`BigdiffError::Io`] if the directory cannot be read and
/// [`BigdiffError::MalformedBucket`] for an entry that is not a bucket file.
pub fn list_bucket_files(dir: &Path, extension: &str) -> Result<Vec<BucketFile>, BigdiffError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).with_path("list bucket directory", dir)? {
        let entry = entry.with_path("list bucket directory", dir)?;
        let path = entry.path();
        let file_type = entry.file_type().with_path("stat bucket file", &path)?;
        let name = entry.file_name();
        let id = name
            .to_str()
            .and_then(|n| BucketId::from_file_name(n, extension))
            .filter(|_| file_type.is_file());
        let Some(id) = id else {
            return Err(BigdiffError::MalformedBucket {
                path,
                line: 0,
                value: name.to_string_lossy().into_owned(),
            });
        };
        files.push(BucketFile { id, path });
    }
    files.sort_by_key(|f| f.id);
    Ok(files)
}

/// Load a bucket file into a hash set.
///
/// # Errors
/// Returns [`BigdiffError::Io`] on read failures and
/// [`BigdiffError::MalformedBucket`] for a line that is not a decimal hash.
pub fn read_bucket(path: &Path) -> Result<HashSet<HashValue>, BigdiffError> {
    let mut reader = LineReader::open(path)?;
    let mut hashes = HashSet::new();
    let mut line_no = 0;
    while let Some(line) = reader.next_line()? {
        line_no += 1;
        let hash = parse_hash(line).ok_or_else(|| BigdiffError::MalformedBucket {
            path: path.to_owned(),
            line: line_no,
            value: String::from_utf8_lossy(line).into_owned(),
        })?;
        hashes.insert(hash);
    }
    Ok(hashes)
}

fn parse_hash(line: &[u8]) -> Option<HashValue> {
    std::str::from_utf8(line).ok()?.parse().ok()
}

// ---------------------------------------------------------------------------
// BucketPairs
// ---------------------------------------------------------------------------

/// One step of the sorted merge over both sides' bucket lists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BucketPair<'a> {
    /// The bucket exists on both sides.
    Both(&'a BucketFile, &'a BucketFile),
    /// The bucket exists on the left side only.
    LeftOnly(&'a BucketFile),
    /// The bucket exists on the right side only.
    RightOnly(&'a BucketFile),
}

/// Sorted-merge join of two bucket lists by bucket id.
///
/// Both slices must be sorted by id, as returned by [`list_bucket_files`].
#[derive(Clone, Debug)]
pub struct BucketPairs<'a> {
    left: &'a [BucketFile],
    right: &'a [BucketFile],
}

impl<'a> BucketPairs<'a> {
    #[must_use]
    pub const fn new(left: &'a [BucketFile], right: &'a [BucketFile]) -> Self {
        Self { left, right }
    }
}

impl<'a> Iterator for BucketPairs<'a> {
    type Item = BucketPair<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (pair, advance_left, advance_right) = match (self.left.first(), self.right.first()) {
            (None, None) => return None,
            (Some(l), None) => (BucketPair::LeftOnly(l), true, false),
            (None, Some(r)) => (BucketPair::RightOnly(r), false, true),
            (Some(l), Some(r)) => match l.id.cmp(&r.id) {
                Ordering::Equal => (BucketPair::Both(l, r), true, true),
                Ordering::Less => (BucketPair::LeftOnly(l), true, false),
                Ordering::Greater => (BucketPair::RightOnly(r), false, true),
            },
        };
        if advance_left {
            self.left = &self.left[1..];
        }
        if advance_right {
            self.right = &self.right[1..];
        }
        Some(pair)
    }
}

// ---------------------------------------------------------------------------
// merge_buckets
// ---------------------------------------------------------------------------

/// Hash values unique to each side, accumulated over all buckets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiffHashes {
    /// Hashes in left buckets but not in the matching right bucket.
    pub left: HashSet<HashValue>,
    /// Hashes in right buckets but not in the matching left bucket.
    pub right: HashSet<HashValue>,
    /// Bucket pairs visited (including one-sided buckets).
    pub pairs_compared: usize,
}

/// Summary counts of a [`DiffHashes`], for reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DiffHashCounts {
    pub left: usize,
    pub right: usize,
    pub pairs_compared: usize,
}

impl DiffHashes {
    #[must_use]
    pub fn counts(&self) -> DiffHashCounts {
        DiffHashCounts {
            left: self.left.len(),
            right: self.right.len(),
            pairs_compared: self.pairs_compared,
        }
    }
}

/// Walk both bucket lists and collect the per-side hash differences.
///
/// # Errors
/// Returns the first error from reading a bucket file.
#[instrument(skip_all, fields(left_buckets = left.len(), right_buckets = right.len()))]
pub fn merge_buckets(
    left: &[BucketFile],
    right: &[BucketFile],
) -> Result<DiffHashes, BigdiffError> {
    let mut result = DiffHashes::default();
    for pair in BucketPairs::new(left, right) {
        match pair {
            BucketPair::Both(l, r) => {
                let (only_left, only_right) =
                    differ::diff(&read_bucket(&l.path)?, &read_bucket(&r.path)?);
                result.left.extend(only_left);
                result.right.extend(only_right);
            }
            BucketPair::LeftOnly(l) => result.left.extend(read_bucket(&l.path)?),
            BucketPair::RightOnly(r) => result.right.extend(read_bucket(&r.path)?),
        }
        result.pairs_compared += 1;
    }
    debug!(
        diff_left = result.left.len(),
        diff_right = result.right.len(),
        pairs = result.pairs_compared,
        "bucket merge complete"
    );
    Ok(result)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
