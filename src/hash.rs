//! Line hashing.
//!
//! The engine is generic over [`LineHasher`]: any deterministic,
//! side-effect-free function from a line's bytes to a fixed-width unsigned
//! integer. Two xxHash variants are provided; closures `Fn(&[u8]) -> u64`
//! also qualify, which is how tests inject deliberately colliding hashers.

use std::fmt;
use std::str::FromStr;

use xxhash_rust::{xxh32::xxh32, xxh64::xxh64};

use crate::model::HashValue;

/// A deterministic line hash.
///
/// Implementations must return the same value for the same line for the
/// lifetime of a run. Collisions are allowed.
pub trait LineHasher {
    /// Hash one line (line terminator already stripped).
    fn hash_line(&self, line: &[u8]) -> HashValue;
}

impl<F> LineHasher for F
where
    F: Fn(&[u8]) -> HashValue,
{
    fn hash_line(&self, line: &[u8]) -> HashValue {
        self(line)
    }
}

/// 32-bit xxHash. The default: small bucket files, measurable collision rate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Xxh32Hasher {
    seed: u32,
}

impl Xxh32Hasher {
    #[must_use]
    pub const fn with_seed(seed: u32) -> Self {
        Self { seed }
    }
}

impl LineHasher for Xxh32Hasher {
    fn hash_line(&self, line: &[u8]) -> HashValue {
        HashValue::from(xxh32(line, self.seed))
    }
}

/// 64-bit xxHash.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Xxh64Hasher {
    seed: u64,
}

impl Xxh64Hasher {
    #[must_use]
    pub const fn with_seed(seed: u64) -> Self {
        Self { seed }
    }
}

impl LineHasher for Xxh64Hasher {
    fn hash_line(&self, line: &[u8]) -> HashValue {
        xxh64(line, self.seed)
    }
}

// ---------------------------------------------------------------------------
// HashAlgorithm
// ---------------------------------------------------------------------------

/// Selectable built-in hash algorithm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// 32-bit xxHash.
    #[default]
    Xxh32,
    /// 64-bit xxHash.
    Xxh64,
}

impl HashAlgorithm {
    /// Build a hasher for this algorithm. `xxh32` uses the low 32 bits of `seed`.
    #[must_use]
    pub fn hasher(self, seed: u64) -> Box<dyn LineHasher + Send + Sync> {
        match self {
            #[allow(clippy::cast_possible_truncation)]
            Self::Xxh32 => Box::new(Xxh32Hasher::with_seed(seed as u32)),
            Self::Xxh64 => Box::new(Xxh64Hasher::with_seed(seed)),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xxh32 => write!(f, "xxh32"),
            Self::Xxh64 => write!(f, "xxh64"),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "xxh32" => Ok(Self::Xxh32),
            "xxh64" => Ok(Self::Xxh64),
            other => Err(format!("unknown hash algorithm '{other}' (expected xxh32 or xxh64)")),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
