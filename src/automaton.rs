use std::collections::VecDeque;
use std::fmt::{self, Debug};

use itertools::Itertools;

use crate::error::AutomatonError;
use crate::math::{Map, Set};

/// Stable index of a [`State`] within its owning [`Automaton`].
///
/// States live in an arena, so a `StateId` stays valid for the lifetime of the automaton no
/// matter how often the backing storage grows. Indices are handed out in insertion order and a
/// `StateId` is only meaningful for the automaton that created it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(pub(crate) usize);

impl StateId {
    /// Position of the state in insertion order.
    pub fn index(self) -> usize {
        self.0
    }
}

impl Debug for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// A transition of an [`Automaton`], consisting of an input symbol and the index of the target
/// state. The target is stored as an arena index rather than a reference, which keeps the link
/// intact when the state storage reallocates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    symbol: String,
    target: StateId,
}

impl Transition {
    /// The input symbol this transition is taken on.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Index of the state this transition leads to.
    pub fn target(&self) -> StateId {
        self.target
    }
}

/// A state of an [`Automaton`]: a string identifier that is unique within its automaton, an
/// acceptance flag and the ordered list of outgoing transitions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State {
    id: String,
    is_final: bool,
    transitions: Vec<Transition>,
}

impl State {
    /// The identifier of this state.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether this state accepts.
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// Iterates over the outgoing transitions in insertion order.
    pub fn transitions(&self) -> std::slice::Iter<'_, Transition> {
        self.transitions.iter()
    }

    /// The number of outgoing transitions.
    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    /// Looks up the target reached on `symbol`, if such a transition exists. As duplicate
    /// symbols are rejected at construction, the first match is the only match.
    pub fn target_of(&self, symbol: &str) -> Option<StateId> {
        self.transitions
            .iter()
            .find(|t| t.symbol == symbol)
            .map(|t| t.target)
    }
}

/// A deterministic finite automaton that is grown incrementally.
///
/// All states are owned by the automaton and stored in an arena in insertion order; the first
/// state that is added becomes the initial state, permanently. Identifier lookup goes through a
/// hashed index so construction stays linear in the number of states. The set of final states is
/// a derived view over the acceptance flags, it is never stored separately.
///
/// There is no removal operation. Minimization does not mutate `self` either, it returns a brand
/// new automaton (see [`Automaton::minimize`]).
#[derive(Clone, Default)]
pub struct Automaton {
    states: Vec<State>,
    index: Map<String, StateId>,
    initial: Option<StateId>,
}

impl Automaton {
    /// Creates an empty automaton with no states and no initial state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a state with the given identifier and acceptance flag, returning its index.
    ///
    /// The first state that is ever added becomes the initial state. Fails with
    /// [`AutomatonError::DuplicateState`] if the identifier is already taken and with
    /// [`AutomatonError::InvalidArgument`] if it is empty; the automaton is unchanged in both
    /// cases.
    pub fn add_state(
        &mut self,
        id: impl Into<String>,
        is_final: bool,
    ) -> Result<StateId, AutomatonError> {
        let id = id.into();
        if id.is_empty() {
            return Err(AutomatonError::InvalidArgument(
                "state identifier must be non-empty",
            ));
        }
        if self.index.contains_key(&id) {
            return Err(AutomatonError::DuplicateState(id));
        }
        self.states
            .try_reserve(1)
            .and_then(|_| self.index.try_reserve(1))
            .map_err(|_| AutomatonError::Allocation)?;

        let idx = StateId(self.states.len());
        self.index.insert(id.clone(), idx);
        self.states.push(State {
            id,
            is_final,
            transitions: Vec::new(),
        });
        if self.initial.is_none() {
            self.initial = Some(idx);
        }
        Ok(idx)
    }

    /// Adds a transition from state `from` to state `to` on the given symbol.
    ///
    /// Both endpoints must already exist, otherwise [`AutomatonError::UnknownState`] is returned.
    /// A second transition on the same (state, symbol) pair is rejected with
    /// [`AutomatonError::DuplicateTransition`], which keeps every constructible automaton
    /// deterministic. No mutation happens on any failure.
    pub fn add_transition(
        &mut self,
        from: &str,
        to: &str,
        symbol: &str,
    ) -> Result<(), AutomatonError> {
        if symbol.is_empty() {
            return Err(AutomatonError::InvalidArgument(
                "transition symbol must be non-empty",
            ));
        }
        let from_id = self
            .find_state(from)
            .ok_or_else(|| AutomatonError::UnknownState(from.to_string()))?;
        let to_id = self
            .find_state(to)
            .ok_or_else(|| AutomatonError::UnknownState(to.to_string()))?;

        let state = &mut self.states[from_id.0];
        if state.transitions.iter().any(|t| t.symbol == symbol) {
            return Err(AutomatonError::DuplicateTransition {
                state: from.to_string(),
                symbol: symbol.to_string(),
            });
        }
        state
            .transitions
            .try_reserve(1)
            .map_err(|_| AutomatonError::Allocation)?;
        state.transitions.push(Transition {
            symbol: symbol.to_string(),
            target: to_id,
        });
        Ok(())
    }

    /// Looks up the index of the state with the given identifier.
    pub fn find_state(&self, id: &str) -> Option<StateId> {
        self.index.get(id).copied()
    }

    /// Returns the state with the given index, if it belongs to this automaton.
    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.get(id.0)
    }

    /// The number of states.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Whether the automaton has no states at all.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Index of the initial state, i.e. the state that was added first. `None` iff the automaton
    /// is empty.
    pub fn initial(&self) -> Option<StateId> {
        self.initial
    }

    /// Iterates over all states in insertion order.
    pub fn states(&self) -> std::slice::Iter<'_, State> {
        self.states.iter()
    }

    /// Iterates over the indices of all states in insertion order.
    pub fn state_ids(&self) -> impl Iterator<Item = StateId> + '_ {
        (0..self.states.len()).map(StateId)
    }

    /// Iterates over the indices of all final states, in insertion order. This is the derived
    /// view over the acceptance flags.
    pub fn final_state_ids(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, q)| q.is_final)
            .map(|(i, _)| StateId(i))
    }

    /// Iterates over the transitions leaving the given state, or `None` if the state does not
    /// exist.
    pub fn transitions_from(&self, id: StateId) -> Option<std::slice::Iter<'_, Transition>> {
        self.states.get(id.0).map(|q| q.transitions.iter())
    }

    /// Runs the automaton on the given word starting from the initial state and returns whether
    /// it ends up in a final state. A missing transition rejects, as does an empty automaton.
    pub fn accepts<I>(&self, word: I) -> bool
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        match self.initial {
            Some(origin) => self.accepts_from(origin, word),
            None => false,
        }
    }

    /// Runs the automaton on the given word starting from `origin`. Words that run into a state
    /// without a transition on the current symbol are rejected, and so is an `origin` that does
    /// not belong to this automaton.
    pub fn accepts_from<I>(&self, origin: StateId, word: I) -> bool
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let Some(mut current) = self.state(origin) else {
            return false;
        };
        for symbol in word {
            match current.target_of(symbol.as_ref()) {
                Some(next) => current = &self.states[next.0],
                None => return false,
            }
        }
        current.is_final
    }

    /// Collects the set of states that are reachable from the initial state by a forward
    /// breadth-first traversal. Empty for an automaton without states.
    pub fn reachable_state_ids(&self) -> Set<StateId> {
        let mut seen = Set::default();
        let Some(origin) = self.initial else {
            return seen;
        };
        let mut queue = VecDeque::with_capacity(self.states.len());
        seen.insert(origin);
        queue.push_back(origin);
        while let Some(q) = queue.pop_front() {
            for t in &self.states[q.0].transitions {
                if seen.insert(t.target) {
                    queue.push_back(t.target);
                }
            }
        }
        seen
    }
}

impl Debug for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, state) in self.states.iter().enumerate() {
            let marker = match (Some(StateId(i)) == self.initial, state.is_final) {
                (true, true) => ">*",
                (true, false) => "> ",
                (false, true) => " *",
                (false, false) => "  ",
            };
            writeln!(
                f,
                "{marker}{}: {}",
                state.id,
                state
                    .transitions
                    .iter()
                    .map(|t| format!("{} -> {}", t.symbol, self.states[t.target.0].id))
                    .join(", ")
            )?;
        }
        Ok(())
    }
}
