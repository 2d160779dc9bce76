//! Automaton minimization engine for the NexusLink toolchain.
//!
//! The crate implements the classical table-filling (Myhill–Nerode) minimization of
//! deterministic finite automata. An [`automaton::Automaton`] is grown state by state and
//! transition by transition, where states live in an arena and are addressed through stable
//! integer indices ([`automaton::StateId`]). This means that links between states never dangle,
//! no matter how often the backing storage grows.
//!
//! Minimization proceeds in two stages. First, the [`minimization::StatePartition`] computes the
//! coarsest partition of the states into equivalence classes: two states start out tentatively
//! equivalent iff they agree on acceptance, and pairs are split until a fixpoint is reached
//! whenever their transitions disagree, either because a symbol is present on exactly one side or
//! because matched targets have already been separated. Second, the quotient automaton is built
//! from the converged partition, with one fresh state per class and one transition per
//! (class, symbol) pair. The input automaton is never mutated; the quotient owns an entirely
//! disjoint set of states and transitions, so either automaton can be dropped at any time without
//! affecting the other.
//!
//! Construction enforces the determinism contract up front: a second transition on the same
//! (state, symbol) pair is rejected with an error instead of being silently appended, so every
//! automaton that can be built through the public API is a valid DFA. Completeness is not
//! required; a missing transition simply rejects the word during simulation and is handled
//! symmetrically during refinement.
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude re-exports everything needed to build, query and minimize automatons, i.e.
/// `use nlink_minimizer::prelude::*;` should be enough to use the crate.
pub mod prelude {
    pub use super::{
        automaton::{Automaton, State, StateId, Transition},
        error::{AutomatonError, MinimizationError},
        minimization::{MinimizationStats, MinimizeOptions, StatePartition},
    };
}

/// Contains definitions of collection types which are used throughout the crate.
pub mod math;

/// Defines the arena-backed automaton storage and the construction API.
pub mod automaton;

/// Error types surfaced by automaton construction and minimization.
pub mod error;

/// Contains the implementation of partition refinement and quotient construction.
pub mod minimization;
