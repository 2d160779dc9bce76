pub(crate) mod partition;
pub(crate) mod quotient;

use tracing::debug;

pub use partition::StatePartition;

use crate::automaton::{Automaton, StateId};
use crate::error::MinimizationError;

/// Options for [`Automaton::minimize_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MinimizeOptions {
    /// Drop states that are unreachable from the initial state before refinement. Off by
    /// default: plain minimization keeps unreachable classes in the quotient, pruning is an
    /// explicit pre-pass on top of it.
    pub prune_unreachable: bool,
}

/// Figures collected while minimizing one automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinimizationStats {
    /// Number of states of the input automaton.
    pub original_states: usize,
    /// Number of states of the quotient.
    pub minimized_states: usize,
    /// Number of full refinement passes until the fixpoint was reached.
    pub refinement_passes: usize,
    /// Number of unreachable states dropped by the pre-pass, zero unless
    /// [`MinimizeOptions::prune_unreachable`] was set.
    pub pruned_states: usize,
}

impl MinimizationStats {
    /// Fraction of states that minimization removed, in `0.0..=1.0`.
    pub fn reduction_ratio(&self) -> f64 {
        if self.original_states == 0 {
            return 0.0;
        }
        1.0 - self.minimized_states as f64 / self.original_states as f64
    }
}

impl Automaton {
    /// Returns the minimal automaton accepting the same language as `self`, computed by
    /// table-filling partition refinement followed by quotient construction.
    ///
    /// `self` is never mutated and shares no storage with the result, so both automatons can be
    /// dropped independently in any order. States of the quotient are labelled `q0`, `q1`, … in
    /// the order their equivalence classes are first encountered when scanning the original
    /// states in insertion order, which makes the output reproducible for identical input.
    ///
    /// Fails with [`MinimizationError::EmptyAutomaton`] if `self` has no states. Unreachable
    /// states are kept (each in its own class as usual); use [`Automaton::minimize_with`] to
    /// prune them first.
    pub fn minimize(&self) -> Result<Automaton, MinimizationError> {
        self.minimize_with(MinimizeOptions::default())
    }

    /// Same as [`Automaton::minimize`], with explicit [`MinimizeOptions`].
    pub fn minimize_with(
        &self,
        options: MinimizeOptions,
    ) -> Result<Automaton, MinimizationError> {
        self.minimize_with_stats(options)
            .map(|(minimized, _)| minimized)
    }

    /// Same as [`Automaton::minimize_with`], additionally reporting [`MinimizationStats`].
    pub fn minimize_with_stats(
        &self,
        options: MinimizeOptions,
    ) -> Result<(Automaton, MinimizationStats), MinimizationError> {
        if self.is_empty() {
            return Err(MinimizationError::EmptyAutomaton);
        }

        // the domain stays in insertion order, which refinement and quotient rely on for
        // deterministic class labels
        let domain: Vec<StateId> = if options.prune_unreachable {
            let reachable = self.reachable_state_ids();
            self.state_ids().filter(|q| reachable.contains(q)).collect()
        } else {
            self.state_ids().collect()
        };
        let pruned_states = self.state_count() - domain.len();

        let partition = StatePartition::refine(self, &domain);
        let minimized = quotient::build(self, &partition)?;

        let stats = MinimizationStats {
            original_states: self.state_count(),
            minimized_states: minimized.state_count(),
            refinement_passes: partition.passes(),
            pruned_states,
        };
        debug!(
            "minimized {} states down to {} in {} passes ({} pruned)",
            stats.original_states, stats.minimized_states, stats.refinement_passes, stats.pruned_states
        );
        Ok((minimized, stats))
    }
}
