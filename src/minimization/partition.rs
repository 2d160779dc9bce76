use bit_set::BitSet;
use itertools::Itertools;
use tracing::trace;

use crate::automaton::{Automaton, State, StateId};
use crate::math::Map;

/// The coarsest partition of an automaton's states into equivalence classes, i.e. two states end
/// up in the same class iff no input string distinguishes their accept behavior.
///
/// Computed by the classical table-filling method: all pairs agreeing on acceptance start out
/// tentatively equivalent and are split until no full pass splits anything anymore. Classes are
/// ordered by the first occurrence of their representative in the automaton's insertion order,
/// and every class keeps its members in that order as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatePartition {
    classes: Vec<Vec<StateId>>,
    class_of: Map<StateId, usize>,
    passes: usize,
}

impl std::ops::Deref for StatePartition {
    type Target = [Vec<StateId>];
    fn deref(&self) -> &Self::Target {
        &self.classes
    }
}

impl<'a> IntoIterator for &'a StatePartition {
    type Item = &'a Vec<StateId>;
    type IntoIter = std::slice::Iter<'a, Vec<StateId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.classes.iter()
    }
}

impl StatePartition {
    /// Computes the partition of the states in `domain`, which must be given in insertion order
    /// and be forward-closed under transitions (all states, or the reachable ones).
    ///
    /// The refinement table is owned by this call and released on return.
    pub fn refine(automaton: &Automaton, domain: &[StateId]) -> Self {
        let n = domain.len();
        let position: Map<StateId, usize> = domain
            .iter()
            .enumerate()
            .map(|(pos, &q)| (q, pos))
            .collect();
        let states: Vec<&State> = domain
            .iter()
            .map(|&q| {
                automaton
                    .state(q)
                    .expect("domain states belong to the automaton")
            })
            .collect();

        // states start out tentatively equivalent iff they agree on acceptance
        let mut table: Vec<BitSet> = (0..n)
            .map(|i| {
                let mut row = BitSet::with_capacity(n);
                for j in 0..n {
                    if states[i].is_final() == states[j].is_final() {
                        row.insert(j);
                    }
                }
                row
            })
            .collect();

        let mut passes = 0;
        loop {
            passes += 1;
            let mut changed = false;
            for (i, j) in (0..n).tuple_combinations() {
                if table[i].contains(j) && must_split(&position, &table, states[i], states[j]) {
                    table[i].remove(j);
                    table[j].remove(i);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        // assign classes by scanning in insertion order, so labels downstream are reproducible
        let mut classes: Vec<Vec<StateId>> = Vec::new();
        let mut class_of: Map<StateId, usize> = Map::default();
        let mut assigned = BitSet::with_capacity(n);
        for i in 0..n {
            if assigned.contains(i) {
                continue;
            }
            let k = classes.len();
            let mut members = vec![domain[i]];
            assigned.insert(i);
            class_of.insert(domain[i], k);
            for j in i + 1..n {
                if !assigned.contains(j) && table[i].contains(j) {
                    assigned.insert(j);
                    class_of.insert(domain[j], k);
                    members.push(domain[j]);
                }
            }
            classes.push(members);
        }
        trace!(
            "partition of {n} states into {} classes reached fixpoint after {passes} passes",
            classes.len()
        );

        Self {
            classes,
            class_of,
            passes,
        }
    }

    /// The number of classes.
    pub fn size(&self) -> usize {
        self.classes.len()
    }

    /// The class containing the given state, or `None` if the state was outside the refined
    /// domain.
    pub fn class_of(&self, state: StateId) -> Option<usize> {
        self.class_of.get(&state).copied()
    }

    /// The number of full refinement passes until the fixpoint was reached.
    pub fn passes(&self) -> usize {
        self.passes
    }
}

/// Whether a tentatively equivalent pair has to be separated: some symbol has a transition on
/// exactly one side, or a matched pair of targets is no longer tentatively equivalent. Presence
/// must be compared in both directions, checking only `left` against `right` would let a state
/// with strictly fewer transitions absorb a distinguishable one.
fn must_split(
    position: &Map<StateId, usize>,
    table: &[BitSet],
    left: &State,
    right: &State,
) -> bool {
    for t in left.transitions() {
        match right.target_of(t.symbol()) {
            None => return true,
            Some(other_target) => {
                // the domain is forward-closed, so both targets have a table position
                let a = position[&t.target()];
                let b = position[&other_target];
                if !table[a].contains(b) {
                    return true;
                }
            }
        }
    }
    right
        .transitions()
        .any(|t| left.target_of(t.symbol()).is_none())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes_by_id(automaton: &Automaton, partition: &StatePartition) -> Vec<Vec<String>> {
        partition
            .iter()
            .map(|class| {
                class
                    .iter()
                    .map(|&q| automaton.state(q).unwrap().id().to_string())
                    .collect()
            })
            .collect()
    }

    fn full_domain(automaton: &Automaton) -> Vec<StateId> {
        automaton.state_ids().collect()
    }

    #[test]
    fn acceptance_splits_the_initial_partition() {
        let mut automaton = Automaton::new();
        automaton.add_state("q0", false).unwrap();
        automaton.add_state("q1", true).unwrap();

        let partition = StatePartition::refine(&automaton, &full_domain(&automaton));
        assert_eq!(partition.size(), 2);
    }

    #[test]
    fn refinement_propagates_through_targets() {
        // q0 -a-> q1 -a-> q2, only q2 accepts; q0 and q1 agree on acceptance but their
        // a-successors were already separated, so the second pass splits them
        let mut automaton = Automaton::new();
        automaton.add_state("q0", false).unwrap();
        automaton.add_state("q1", false).unwrap();
        automaton.add_state("q2", true).unwrap();
        automaton.add_transition("q0", "q1", "a").unwrap();
        automaton.add_transition("q1", "q2", "a").unwrap();
        automaton.add_transition("q2", "q2", "a").unwrap();

        let partition = StatePartition::refine(&automaton, &full_domain(&automaton));
        assert_eq!(partition.size(), 3);
        assert!(partition.passes() >= 2);
    }

    #[test]
    fn presence_check_is_symmetric() {
        // "stuck" has no transitions at all while "live" can still reach acceptance, a check
        // comparing only one side's transitions would merge the two
        let mut automaton = Automaton::new();
        automaton.add_state("stuck", false).unwrap();
        automaton.add_state("live", false).unwrap();
        automaton.add_state("accept", true).unwrap();
        automaton.add_transition("live", "accept", "a").unwrap();
        automaton.add_transition("accept", "accept", "a").unwrap();

        let partition = StatePartition::refine(&automaton, &full_domain(&automaton));
        let stuck = automaton.find_state("stuck").unwrap();
        let live = automaton.find_state("live").unwrap();
        assert_ne!(partition.class_of(stuck), partition.class_of(live));
    }

    #[test]
    fn unreachable_twin_joins_the_class_of_its_reachable_twin() {
        // q3 behaves exactly like q1 but cannot be reached, the partition groups them anyway
        let mut automaton = Automaton::new();
        automaton.add_state("q0", false).unwrap();
        automaton.add_state("q1", false).unwrap();
        automaton.add_state("q2", true).unwrap();
        automaton.add_state("q3", false).unwrap();
        automaton.add_transition("q0", "q1", "a").unwrap();
        automaton.add_transition("q1", "q2", "a").unwrap();
        automaton.add_transition("q3", "q2", "a").unwrap();

        let partition = StatePartition::refine(&automaton, &full_domain(&automaton));
        assert_eq!(
            classes_by_id(&automaton, &partition),
            vec![
                vec!["q0".to_string()],
                vec!["q1".to_string(), "q3".to_string()],
                vec!["q2".to_string()],
            ]
        );
    }

    #[test]
    fn restricted_domain_leaves_other_states_unassigned() {
        let mut automaton = Automaton::new();
        automaton.add_state("q0", false).unwrap();
        automaton.add_state("q1", true).unwrap();
        let stray = automaton.add_state("stray", false).unwrap();
        automaton.add_transition("q0", "q1", "a").unwrap();
        automaton.add_transition("q1", "q1", "a").unwrap();

        let domain: Vec<_> = automaton
            .state_ids()
            .filter(|&q| q != stray)
            .collect();
        let partition = StatePartition::refine(&automaton, &domain);
        assert_eq!(partition.size(), 2);
        assert_eq!(partition.class_of(stray), None);
    }
}
