//! bigdiff: bounded-memory set difference of two very large line files.
//!
//! The primary interface is the `bigdiff` binary. The library exposes the
//! engine so that it can be embedded with a custom [`LineHasher`] or
//! [`RunObserver`], and so integration tests can drive each phase directly.
//!
//! ```no_run
//! use bigdiff::{RunConfig, TracingObserver, Xxh32Hasher};
//!
//! let report = bigdiff::run(
//!     std::path::Path::new("/data/snapshots"),
//!     100,
//!     &Xxh32Hasher::default(),
//!     &RunConfig::default(),
//!     &TracingObserver,
//! )?;
//! println!("{} lines only on the left", report.diff_left_lines);
//! # Ok::<(), bigdiff::RunError>(())
//! ```

pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod hash;
pub mod model;
pub mod resolve;

pub use config::{ConfigError, RunConfig};
pub use engine::{Phase, RunObserver, RunReport, TracingObserver, run};
pub use error::{BigdiffError, RunError};
pub use hash::{HashAlgorithm, LineHasher, Xxh32Hasher, Xxh64Hasher};
pub use model::{BucketCount, BucketId, HashValue, InputSide};
pub use resolve::{ResolvedInputs, resolve_inputs};
