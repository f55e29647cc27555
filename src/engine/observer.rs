//! Progress hooks for a run.

use tracing::{error, info};

use crate::error::RunError;
use crate::model::InputSide;

use super::partition::PartitionStats;
use super::{Phase, RunReport};

/// Receives lifecycle events from [`run`](super::run).
///
/// Every method has an empty default, so implementors pick what they need.
/// `()` is the silent observer.
pub trait RunObserver {
    fn phase_entered(&self, _phase: Phase) {}
    fn partitioned(&self, _side: InputSide, _stats: &PartitionStats) {}
    fn completed(&self, _report: &RunReport) {}
    fn failed(&self, _error: &RunError) {}
}

impl RunObserver for () {}

/// Logs run events through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl RunObserver for TracingObserver {
    fn phase_entered(&self, phase: Phase) {
        info!(%phase, "entering phase");
    }

    fn partitioned(&self, side: InputSide, stats: &PartitionStats) {
        info!(%side, lines = stats.lines, buckets = stats.buckets, "partitioned input");
    }

    fn completed(&self, report: &RunReport) {
        info!(
            output = %report.output_dir.display(),
            diff_left = report.diff_left_lines,
            diff_right = report.diff_right_lines,
            elapsed_ms = report.elapsed_ms,
            "diff complete"
        );
    }

    fn failed(&self, err: &RunError) {
        error!(phase = %err.phase, error = %err.source, "diff failed");
    }
}
