//! Run lifecycle phases.

use std::fmt;

use serde::Serialize;

/// The phase a run is in.
///
/// Phases progress strictly forward: `Init → Resolving → Partitioning →
/// Diffing → Recovering → Writing → Done`. `Failed` can be entered from any
/// non-terminal phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Arguments validated, nothing touched yet.
    Init,
    /// Locating and ordering the two input files.
    Resolving,
    /// Hashing both inputs into bucket files.
    Partitioning,
    /// Comparing bucket pairs.
    Diffing,
    /// Re-reading inputs to map diff hashes back to lines.
    Recovering,
    /// Publishing the output directory.
    Writing,
    /// Run completed successfully.
    Done,
    /// Run aborted by a fatal error.
    Failed,
}

impl Phase {
    /// Returns `true` for `Done` and `Failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Phases reachable from this one.
    #[must_use]
    pub const fn valid_transitions(self) -> &'static [Self] {
        match self {
            Self::Init => &[Self::Resolving, Self::Failed],
            Self::Resolving => &[Self::Partitioning, Self::Failed],
            Self::Partitioning => &[Self::Diffing, Self::Failed],
            Self::Diffing => &[Self::Recovering, Self::Failed],
            Self::Recovering => &[Self::Writing, Self::Failed],
            Self::Writing => &[Self::Done, Self::Failed],
            Self::Done | Self::Failed => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.valid_transitions().contains(&next)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Resolving => "resolving",
            Self::Partitioning => "partitioning",
            Self::Diffing => "diffing",
            Self::Recovering => "recovering",
            Self::Writing => "writing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
#[allow(clippy::all, clippy::pedantic, clippy::nursery)]
mod tests {
    use super::*;

    const ORDER: [Phase; 7] = [
        Phase::Init,
        Phase::Resolving,
        Phase::Partitioning,
        Phase::Diffing,
        Phase::Recovering,
        Phase::Writing,
        Phase::Done,
    ];

    #[test]
    fn forward_chain_is_valid() {
        for pair in ORDER.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn no_skipping_or_going_back() {
        assert!(!Phase::Init.can_transition_to(Phase::Diffing));
        assert!(!Phase::Writing.can_transition_to(Phase::Recovering));
        assert!(!Phase::Partitioning.can_transition_to(Phase::Partitioning));
    }

    #[test]
    fn failed_reachable_from_every_non_terminal_phase() {
        for phase in &ORDER[..6] {
            assert!(phase.can_transition_to(Phase::Failed), "{phase}");
        }
        assert!(!Phase::Done.can_transition_to(Phase::Failed));
    }

    #[test]
    fn terminal_phases() {
        assert!(Phase::Done.is_terminal());
        assert!(Phase::Failed.is_terminal());
        assert!(Phase::Done.valid_transitions().is_empty());
        assert!(!Phase::Writing.is_terminal());
    }

    #[test]
    fn serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Phase::Partitioning).unwrap(), "\"partitioning\"");
        assert_eq!(Phase::Recovering.to_string(), "recovering");
    }
}
