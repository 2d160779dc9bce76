use tracing::trace;

use super::partition::StatePartition;
use crate::automaton::Automaton;
use crate::error::MinimizationError;

/// Builds the quotient automaton for a converged partition: one fresh state per class, labelled
/// `q{k}` in class order, and one transition per (class, symbol) pair.
///
/// Class 0 contains the original initial state (it is the class of the first state in the
/// refined domain), so the very first `add_state` call makes it the quotient's initial state as
/// well. The result shares no storage with `automaton`.
pub(crate) fn build(
    automaton: &Automaton,
    partition: &StatePartition,
) -> Result<Automaton, MinimizationError> {
    let mut quotient = Automaton::new();

    for (k, members) in partition.iter().enumerate() {
        let representative = automaton
            .state(members[0])
            .expect("partition members belong to the automaton");
        quotient.add_state(class_label(k), representative.is_final())?;
    }

    for (k, members) in partition.iter().enumerate() {
        let from = class_label(k);
        let representative = automaton
            .state(members[0])
            .expect("partition members belong to the automaton");

        for t in representative.transitions() {
            let target_class = partition
                .class_of(t.target())
                .expect("targets of domain states stay inside the forward-closed domain");
            quotient.add_transition(&from, &class_label(target_class), t.symbol())?;
        }

        // every member has to mirror the representative symbol for symbol; a converged
        // partition over deterministic input guarantees this, anything else means the
        // determinism contract was broken and the quotient is rejected
        for &member in &members[1..] {
            let state = automaton
                .state(member)
                .expect("partition members belong to the automaton");
            if state.transition_count() != representative.transition_count() {
                let symbol = first_disagreement(representative, state)
                    .unwrap_or_default()
                    .to_string();
                return Err(MinimizationError::InconsistentQuotient {
                    class: from,
                    symbol,
                });
            }
            for t in state.transitions() {
                let agrees = representative
                    .target_of(t.symbol())
                    .and_then(|target| partition.class_of(target))
                    == partition.class_of(t.target());
                if !agrees {
                    return Err(MinimizationError::InconsistentQuotient {
                        class: from,
                        symbol: t.symbol().to_string(),
                    });
                }
            }
        }
    }

    trace!(
        "quotient has {} states for {} original states",
        quotient.state_count(),
        automaton.state_count()
    );
    Ok(quotient)
}

fn class_label(class: usize) -> String {
    format!("q{class}")
}

/// First symbol on which the transition lists of the two states disagree.
fn first_disagreement<'a>(
    left: &'a crate::automaton::State,
    right: &'a crate::automaton::State,
) -> Option<&'a str> {
    left.transitions()
        .map(|t| t.symbol())
        .find(|symbol| right.target_of(symbol).is_none())
        .or_else(|| {
            right
                .transitions()
                .map(|t| t.symbol())
                .find(|symbol| left.target_of(symbol).is_none())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minimization::StatePartition;

    #[test]
    fn quotient_relabels_classes_deterministically() {
        let mut automaton = Automaton::new();
        automaton.add_state("start", false).unwrap();
        automaton.add_state("mid", false).unwrap();
        automaton.add_state("done", true).unwrap();
        automaton.add_state("mid-twin", false).unwrap();
        automaton.add_transition("start", "mid", "x").unwrap();
        automaton.add_transition("mid", "done", "x").unwrap();
        automaton.add_transition("mid-twin", "done", "x").unwrap();

        let domain: Vec<_> = automaton.state_ids().collect();
        let partition = StatePartition::refine(&automaton, &domain);
        let quotient = build(&automaton, &partition).unwrap();

        assert_eq!(quotient.state_count(), 3);
        let ids: Vec<_> = quotient.states().map(|q| q.id().to_string()).collect();
        assert_eq!(ids, vec!["q0", "q1", "q2"]);
        assert_eq!(quotient.initial(), quotient.find_state("q0"));
        assert!(quotient
            .state(quotient.find_state("q2").unwrap())
            .unwrap()
            .is_final());
    }

    #[test]
    fn quotient_shares_no_storage_with_the_source() {
        let mut automaton = Automaton::new();
        automaton.add_state("a", false).unwrap();
        automaton.add_state("b", true).unwrap();
        automaton.add_transition("a", "b", "x").unwrap();

        let domain: Vec<_> = automaton.state_ids().collect();
        let partition = StatePartition::refine(&automaton, &domain);
        let quotient = build(&automaton, &partition).unwrap();
        drop(automaton);

        // the source is gone, the quotient still answers
        assert!(quotient.accepts(["x"]));
    }
}
