//! NFA representation and the two named primitives the automaton core is built from:
//! `ε-closure` and `move` (§10.5, grounded on `original_source/src/lexer/datalang_afn.c`,
//! which keeps these as standalone operations over an explicit state-set type rather
//! than inlining them into subset construction).
use crate::token::TokenKind;
use std::collections::BTreeSet;

pub type StateId = usize;

/// A set of NFA states, represented as a sorted set so that two equivalent subsets
/// compare equal regardless of discovery order (needed by subset construction's
/// sorted-state-set → DFA-state-id table).
pub type StateSet = BTreeSet<StateId>;

#[derive(Debug, Clone, Default)]
pub struct NfaState {
    pub epsilon: Vec<StateId>,
    /// Per-byte transitions. Indexed directly by the input symbol (0..=255).
    pub transitions: Vec<(u8, Vec<StateId>)>,
    /// Present on final states: the token kind this state accepts.
    pub accept: Option<TokenKind>,
}

impl NfaState {
    fn targets_for(&self, symbol: u8) -> impl Iterator<Item = StateId> + '_ {
        self.transitions
            .iter()
            .filter(move |(sym, _)| *sym == symbol)
            .flat_map(|(_, targets)| targets.iter().copied())
    }
}

/// A nondeterministic automaton over the 256-symbol input alphabet plus ε.
#[derive(Debug, Clone)]
pub struct Nfa {
    pub states: Vec<NfaState>,
    pub start: StateId,
}

impl Nfa {
    pub fn new(start: StateId) -> Self {
        Self {
            states: Vec::new(),
            start,
        }
    }

    pub fn new_state(&mut self) -> StateId {
        let id = self.states.len();
        self.states.push(NfaState::default());
        id
    }

    pub fn add_epsilon(&mut self, from: StateId, to: StateId) {
        self.states[from].epsilon.push(to);
    }

    pub fn add_transition(&mut self, from: StateId, symbol: u8, to: StateId) {
        self.states[from].transitions.push((symbol, vec![to]));
    }

    pub fn mark_accepting(&mut self, state: StateId, kind: TokenKind) {
        self.states[state].accept = Some(kind);
    }

    /// The set of NFA states reachable from `states` via ε-transitions only.
    pub fn epsilon_closure(&self, states: &StateSet) -> StateSet {
        let mut closure: StateSet = states.clone();
        let mut worklist: Vec<StateId> = states.iter().copied().collect();
        while let Some(state) = worklist.pop() {
            for &next in &self.states[state].epsilon {
                if closure.insert(next) {
                    worklist.push(next);
                }
            }
        }
        closure
    }

    /// The set of NFA states reachable from any state in `states` by consuming one
    /// occurrence of `symbol` (no ε-closure applied — callers close the result).
    pub fn move_set(&self, states: &StateSet, symbol: u8) -> StateSet {
        let mut result = StateSet::new();
        for &state in states {
            for target in self.states[state].targets_for(symbol) {
                result.insert(target);
            }
        }
        result
    }

    /// The first (lowest-id) accepting NFA state within `states`, if any. Because
    /// token families are laid out with disjoint final states and appended in a fixed
    /// order, the lowest id deterministically picks the earliest-declared family when
    /// more than one accepting state is reachable for the same input (§4.A step 4).
    pub fn first_accept(&self, states: &StateSet) -> Option<TokenKind> {
        states
            .iter()
            .find_map(|&id| self.states[id].accept.map(|kind| (id, kind)))
            .map(|(_, kind)| kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epsilon_closure_follows_chains() {
        let mut nfa = Nfa::new(0);
        let a = nfa.new_state();
        let b = nfa.new_state();
        let c = nfa.new_state();
        nfa.add_epsilon(a, b);
        nfa.add_epsilon(b, c);
        let closure = nfa.epsilon_closure(&StateSet::from([a]));
        assert_eq!(closure, StateSet::from([a, b, c]));
    }

    #[test]
    fn move_set_follows_labeled_transition_only() {
        let mut nfa = Nfa::new(0);
        let a = nfa.new_state();
        let b = nfa.new_state();
        nfa.add_transition(a, b'x', b);
        assert_eq!(
            nfa.move_set(&StateSet::from([a]), b'x'),
            StateSet::from([b])
        );
        assert!(nfa.move_set(&StateSet::from([a]), b'y').is_empty());
    }
}
