use thiserror::Error;

/// Errors that can occur while growing an [`Automaton`](crate::automaton::Automaton).
///
/// Construction never mutates on failure: if adding a state or transition returns an error, the
/// automaton is exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutomatonError {
    /// A state with the given identifier already exists in the automaton.
    #[error("state \"{0}\" already exists")]
    DuplicateState(String),
    /// A transition referenced a state identifier that is not present.
    #[error("unknown state \"{0}\"")]
    UnknownState(String),
    /// The source state already has an outgoing transition on this symbol. Accepting it would
    /// make the automaton non-deterministic.
    #[error("state \"{state}\" already has a transition on symbol \"{symbol}\"")]
    DuplicateTransition {
        /// Identifier of the source state.
        state: String,
        /// The symbol that is already taken.
        symbol: String,
    },
    /// A required argument was empty.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// The backing storage could not grow.
    #[error("backing storage could not grow")]
    Allocation,
}

/// Errors reported by [`Automaton::minimize`](crate::automaton::Automaton::minimize) and its
/// variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MinimizationError {
    /// The automaton has no states, so there is nothing to minimize.
    #[error("cannot minimize an automaton without states")]
    EmptyAutomaton,
    /// Members of one equivalence class disagree on where a symbol leads. This can only happen
    /// if the determinism contract was broken, the quotient is rejected instead of emitting
    /// duplicate transitions.
    #[error("class \"{class}\" has conflicting transitions on symbol \"{symbol}\"")]
    InconsistentQuotient {
        /// Label of the offending class in the quotient.
        class: String,
        /// The symbol on which the members disagree.
        symbol: String,
    },
    /// Building the quotient automaton itself failed, e.g. because storage could not grow.
    #[error(transparent)]
    Automaton(#[from] AutomatonError),
}
