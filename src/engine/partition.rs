//! PARTITION phase: route every input line's hash into a bucket file.
//!
//! One pass over one input. For each line `h = hash(line)` is appended, as
//! decimal text, to bucket `h mod N`. Bucket writers are opened lazily and
//! kept open for the whole pass so gzip sees long runs of similar data; all
//! of them are closed by [`BucketWriters::finish`] on success and by its
//! `Drop` on every other exit path.
//!
//! ```text
//! input:  "a" "b" "c" "a"        N = 3
//! hashes:  7   5   9   7
//! 1/1.gz: 7 7                    (7 mod 3 = 1)
//! 1/2.gz: 5                      (5 mod 3 = 2)
//! 1/0.gz: 9                      (9 mod 3 = 0)
//! ```

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, instrument};

use crate::codec::{self, GzWriter, LineReader};
use crate::config::RunConfig;
use crate::error::{BigdiffError, IoResultExt as _};
use crate::hash::LineHasher;
use crate::model::{BucketCount, BucketId, HashValue};

// ---------------------------------------------------------------------------
// PartitionStats
// ---------------------------------------------------------------------------

/// What one partition pass produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PartitionStats {
    /// Lines read from the input.
    pub lines: u64,
    /// Bucket files created (at most the bucket count).
    pub buckets: usize,
}

// ---------------------------------------------------------------------------
// BucketWriters
// ---------------------------------------------------------------------------

/// Lazily opened bucket writers for one side, keyed by bucket id.
pub struct BucketWriters<'a> {
    dir: &'a Path,
    count: BucketCount,
    extension: &'a str,
    level: u32,
    open: BTreeMap<BucketId, (PathBuf, GzWriter)>,
}

impl<'a> BucketWriters<'a> {
    #[must_use]
    pub const fn new(dir: &'a Path, count: BucketCount, extension: &'a str, level: u32) -> Self {
        Self {
            dir,
            count,
            extension,
            level,
            open: BTreeMap::new(),
        }
    }

    /// Append `hash` to its bucket, creating the bucket file on first use.
    ///
    /// # Errors
    /// Returns [`BigdiffError::Io`] if the bucket cannot be created or written.
    pub fn append(&mut self, hash: HashValue) -> Result<(), BigdiffError> {
        let bucket = self.count.bucket_of(hash);
        let (path, writer) = match self.open.entry(bucket) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                let path = self.dir.join(self.count.file_name(bucket, self.extension));
                let writer = codec::create_gz(&path, self.level)?;
                e.insert((path, writer))
            }
        };
        writeln!(writer, "{hash}").with_path("write bucket file", path.as_path())
    }

    /// Close every bucket file, surfacing trailer and flush errors.
    ///
    /// Returns the number of bucket files written.
    ///
    /// # Errors
    /// Returns the first [`BigdiffError::Io`]; the remaining writers are
    /// still closed.
    pub fn finish(mut self) -> Result<usize, BigdiffError> {
        let open = std::mem::take(&mut self.open);
        let written = open.len();
        let mut first_err = None;
        for (path, writer) in open.into_values() {
            if let Err(e) = codec::finish_gz(writer, &path, false) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(written), Err)
    }
}

impl Drop for BucketWriters<'_> {
    fn drop(&mut self) {
        // Error path only: finish() has already drained the map on success.
        for (path, writer) in std::mem::take(&mut self.open).into_values() {
            if let Err(e) = writer.finish() {
                debug!(path = %path.display(), error = %e, "failed to close bucket file");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// partition
// ---------------------------------------------------------------------------

/// Hash every line of `input` into at most `count` bucket files in `out_dir`.
///
/// `out_dir` must already exist.
///
/// # Errors
/// Returns [`BigdiffError::Io`] on any read, write, or compression failure.
/// All bucket files opened so far are closed before the error is returned.
#[instrument(skip_all, fields(input = %input.display(), buckets = %count))]
pub fn partition<H>(
    input: &Path,
    count: BucketCount,
    hasher: &H,
    out_dir: &Path,
    config: &RunConfig,
) -> Result<PartitionStats, BigdiffError>
where
    H: LineHasher + ?Sized,
{
    let mut reader = LineReader::open(input)?;
    let mut writers = BucketWriters::new(
        out_dir,
        count,
        &config.bucket_extension,
        config.compression_level,
    );

    while let Some(line) = reader.next_line()? {
        writers.append(hasher.hash_line(line))?;
    }

    let lines = reader.line_no();
    let buckets = writers.finish()?;
    debug!(lines, buckets, "partition pass complete");
    Ok(PartitionStats { lines, buckets })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
