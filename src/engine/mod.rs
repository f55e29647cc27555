//! The bucketed diff engine.
//!
//! [`run`] drives one diff of the two files in an input directory through
//! a fixed sequence of phases:
//!
//! 1. **Resolve** the two inputs ([`crate::resolve`]).
//! 2. **Partition** each input into hash buckets ([`partition`]).
//! 3. **Diff** matching bucket pairs ([`merge`], [`differ`]).
//! 4. **Recover** the lines behind the diff hashes ([`recover`]).
//! 5. **Write** both line sets atomically ([`output`]).
//!
//! Memory use is bounded by the largest bucket pair plus the final diff
//! sets, never by the input size. Bucket files live in a [`WorkDir`] that is
//! removed on every exit path.

pub mod differ;
pub mod merge;
pub mod observer;
pub mod output;
pub mod partition;
pub mod phase;
pub mod recover;
pub mod workdir;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::config::RunConfig;
use crate::error::{BigdiffError, RunError};
use crate::hash::LineHasher;
use crate::model::{BucketCount, InputSide};
use crate::resolve::{self, ResolvedInputs};

pub use merge::{DiffHashCounts, DiffHashes};
pub use observer::{RunObserver, TracingObserver};
pub use partition::PartitionStats;
pub use phase::Phase;
pub use workdir::WorkDir;

// ---------------------------------------------------------------------------
// RunReport
// ---------------------------------------------------------------------------

/// Summary of a successful run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub inputs: ResolvedInputs,
    /// The published output directory.
    pub output_dir: PathBuf,
    pub buckets: BucketCount,
    pub left_partition: PartitionStats,
    pub right_partition: PartitionStats,
    pub diff_hashes: DiffHashCounts,
    /// Lines written to the left diff file.
    pub diff_left_lines: usize,
    /// Lines written to the right diff file.
    pub diff_right_lines: usize,
    pub elapsed_ms: u64,
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

/// Current phase plus the observer that hears about every transition.
struct Progress<'o, O: ?Sized> {
    phase: Phase,
    observer: &'o O,
}

impl<O: RunObserver + ?Sized> Progress<'_, O> {
    fn enter(&mut self, next: Phase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "invalid phase transition {} -> {next}",
            self.phase
        );
        self.phase = next;
        self.observer.phase_entered(next);
    }
}

/// Diff the two files in `input_dir` using `buckets` buckets per side.
///
/// On success `<output_dir>/<diff_left_file>` holds the distinct lines
/// found only in the left input and `<output_dir>/<diff_right_file>` those
/// found only in the right input, both in ascending byte order.
///
/// # Errors
/// Returns a [`RunError`] naming the phase that failed. Bucket count,
/// configuration and output-directory checks happen before anything is
/// created; the working directory is always removed before this returns.
#[instrument(skip_all, fields(input_dir = %input_dir.display(), buckets = buckets))]
pub fn run<H, O>(
    input_dir: &Path,
    buckets: u32,
    hasher: &H,
    config: &RunConfig,
    observer: &O,
) -> Result<RunReport, RunError>
where
    H: LineHasher + ?Sized,
    O: RunObserver + ?Sized,
{
    let started = Instant::now();
    let mut progress = Progress {
        phase: Phase::Init,
        observer,
    };

    match execute(input_dir, buckets, hasher, config, &mut progress) {
        Ok(mut report) => {
            report.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            progress.enter(Phase::Done);
            observer.completed(&report);
            Ok(report)
        }
        Err(source) => {
            let err = RunError {
                phase: progress.phase,
                source,
            };
            progress.enter(Phase::Failed);
            observer.failed(&err);
            Err(err)
        }
    }
}

fn execute<H, O>(
    input_dir: &Path,
    buckets: u32,
    hasher: &H,
    config: &RunConfig,
    progress: &mut Progress<'_, O>,
) -> Result<RunReport, BigdiffError>
where
    H: LineHasher + ?Sized,
    O: RunObserver + ?Sized,
{
    config.validate()?;
    let count = BucketCount::new(buckets)?;
    let output_dir = config.output_path(input_dir);
    output::ensure_absent(&output_dir)?;

    progress.enter(Phase::Resolving);
    let inputs = resolve::resolve_inputs(input_dir)?;

    progress.enter(Phase::Partitioning);
    let work = WorkDir::create(&config.temp_path(input_dir))?;
    let observer = progress.observer;
    let partition_side = |side: InputSide| -> Result<PartitionStats, BigdiffError> {
        let stats = partition::partition(
            inputs.path(side),
            count,
            hasher,
            &work.side_dir(side),
            config,
        )?;
        observer.partitioned(side, &stats);
        Ok(stats)
    };
    let left_partition = partition_side(InputSide::Left)?;
    let right_partition = partition_side(InputSide::Right)?;

    progress.enter(Phase::Diffing);
    let left_buckets =
        merge::list_bucket_files(&work.side_dir(InputSide::Left), &config.bucket_extension)?;
    let right_buckets =
        merge::list_bucket_files(&work.side_dir(InputSide::Right), &config.bucket_extension)?;
    let hashes = merge::merge_buckets(&left_buckets, &right_buckets)?;
    // Buckets are not needed past this point.
    work.close()?;

    progress.enter(Phase::Recovering);
    let diff_left = recover::recover(&hashes.left, hasher, &inputs.left)?;
    let diff_right = recover::recover(&hashes.right, hasher, &inputs.right)?;

    progress.enter(Phase::Writing);
    let output_dir = output::write_outputs(&output_dir, &diff_left, &diff_right, config)?;
    debug!(output = %output_dir.display(), "published diff");

    Ok(RunReport {
        inputs,
        output_dir,
        buckets: count,
        left_partition,
        right_partition,
        diff_hashes: hashes.counts(),
        diff_left_lines: written_lines(&diff_left),
        diff_right_lines: written_lines(&diff_right),
        elapsed_ms: 0,
    })
}

/// Empty lines are dropped by the output writer.
fn written_lines(lines: &BTreeSet<Vec<u8>>) -> usize {
    lines.iter().filter(|l| !l.is_empty()).count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
