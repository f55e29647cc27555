//! bigdiff data model — sides, buckets, and hash values.

pub mod types;

pub use types::{BucketCount, BucketId, HashValue, InputSide};
