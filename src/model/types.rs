//! Core value types for a bigdiff run.
//!
//! Input sides, bucket identifiers, validated bucket counts, and bucket file
//! naming. All of these live only for the duration of one run.

use std::fmt;

use serde::Serialize;

use crate::error::BigdiffError;

/// Output of a [`LineHasher`](crate::hash::LineHasher). 32-bit hashers use the
/// low 32 bits.
pub type HashValue = u64;

// ---------------------------------------------------------------------------
// InputSide
// ---------------------------------------------------------------------------

/// Which of the two inputs a file, bucket, or result belongs to.
///
/// The lexicographically smaller input path is always [`InputSide::Left`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InputSide {
    /// The first input (smaller path).
    Left,
    /// The second input.
    Right,
}

impl InputSide {
    /// Both sides, in run order.
    pub const ALL: [Self; 2] = [Self::Left, Self::Right];

    /// Name of this side's bucket subdirectory inside the working directory.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Left => "1",
            Self::Right => "2",
        }
    }
}

impl fmt::Display for InputSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

// ---------------------------------------------------------------------------
// BucketCount
// ---------------------------------------------------------------------------

/// A validated, positive number of buckets per input side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BucketCount(u32);

impl BucketCount {
    /// Validate a bucket count.
    ///
    /// # Errors
    /// Returns [`BigdiffError::InvalidBucketCount`] for zero.
    pub fn new(count: u32) -> Result<Self, BigdiffError> {
        if count == 0 {
            return Err(BigdiffError::InvalidBucketCount { count });
        }
        Ok(Self(count))
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Bucket a hash value falls into: `hash mod count`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn bucket_of(self, hash: HashValue) -> BucketId {
        // The remainder is < self.0, so it always fits in u32.
        BucketId((hash % self.0 as u64) as u32)
    }

    /// Number of digits in the largest bucket id; every bucket file name is
    /// zero-padded to this width.
    #[must_use]
    pub const fn name_width(self) -> usize {
        let mut largest = self.0 - 1;
        let mut width = 1;
        while largest >= 10 {
            largest /= 10;
            width += 1;
        }
        width
    }

    /// File name of `bucket`, e.g. `"009.gz"` for bucket 9 of 457.
    ///
    /// Names share one width, so sorting names sorts bucket ids.
    #[must_use]
    pub fn file_name(self, bucket: BucketId, extension: &str) -> String {
        format!(
            "{:0width$}.{extension}",
            bucket.0,
            width = self.name_width()
        )
    }
}

impl fmt::Display for BucketCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// BucketId
// ---------------------------------------------------------------------------

/// Index of a bucket, in `[0, BucketCount)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketId(u32);

impl BucketId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Parse the id from a bucket file name (`"<digits>.<extension>"`).
    ///
    /// Returns `None` if the name does not have that shape.
    #[must_use]
    pub fn from_file_name(name: &str, extension: &str) -> Option<Self> {
        let stem = name.strip_suffix(extension)?.strip_suffix('.')?;
        if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        stem.parse().ok().map(Self)
    }
}

impl fmt::Display for BucketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
