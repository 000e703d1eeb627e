//! Subset construction (§4.A): compiles the unified NFA into a deterministic,
//! table-driven scanner with exactly one transition lookup per input byte.
use super::nfa::{Nfa, StateSet};
use crate::token::TokenKind;
use std::collections::HashMap;

pub type DfaStateId = usize;

#[derive(Debug, Clone)]
pub struct DfaState {
    /// 256-entry dense transition table; `None` is the implicit error sink.
    pub transitions: Box<[Option<DfaStateId>; 256]>,
    pub accept: Option<TokenKind>,
}

impl DfaState {
    fn empty() -> Self {
        Self {
            transitions: Box::new([None; 256]),
            accept: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Dfa {
    pub states: Vec<DfaState>,
    pub start: DfaStateId,
}

impl Dfa {
    /// Run the DFA from `start_state` over `input`, returning the byte offset and
    /// token kind of the *last* accepting state visited (maximal munch bookkeeping
    /// lives one level up, in the lexer — this just walks as far as transitions
    /// allow and reports every accept point it passed through along the way via the
    /// returned iterator-less scan performed by the caller).
    pub fn step(&self, state: DfaStateId, symbol: u8) -> Option<DfaStateId> {
        self.states[state].transitions[symbol as usize]
    }

    pub fn accept_of(&self, state: DfaStateId) -> Option<TokenKind> {
        self.states[state].accept
    }
}

/// Build a DFA from `nfa` via subset construction:
/// 1. The initial DFA state is `ε-closure({start})`.
/// 2. A worklist of pending DFA states, plus a sorted-state-set → DFA-id table to
///    detect equivalence.
/// 3. For each pending state and each input symbol, compute `ε-closure(move(S, a))`;
///    skip if empty, otherwise allocate (or reuse) a DFA state and record the edge.
/// 4. A DFA state accepts iff its underlying set contains any NFA final state; the
///    token kind is the first (lowest-id) such state within the layered union.
pub fn subset_construction(nfa: &Nfa) -> Dfa {
    let start_set = nfa.epsilon_closure(&StateSet::from([nfa.start]));
    let mut table: HashMap<StateSet, DfaStateId> = HashMap::new();
    let mut states: Vec<DfaState> = Vec::new();
    let mut worklist: Vec<(DfaStateId, StateSet)> = Vec::new();

    let start_id = 0;
    table.insert(start_set.clone(), start_id);
    states.push(DfaState::empty());
    worklist.push((start_id, start_set));

    while let Some((id, set)) = worklist.pop() {
        states[id].accept = nfa.first_accept(&set);
        for symbol in 0u8..=255 {
            let moved = nfa.move_set(&set, symbol);
            if moved.is_empty() {
                continue;
            }
            let closure = nfa.epsilon_closure(&moved);
            let target_id = match table.get(&closure) {
                Some(&existing) => existing,
                None => {
                    let new_id = states.len();
                    states.push(DfaState::empty());
                    table.insert(closure.clone(), new_id);
                    worklist.push((new_id, closure));
                    new_id
                }
            };
            states[id].transitions[symbol as usize] = Some(target_id);
        }
    }

    Dfa {
        states,
        start: start_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::families::build_token_nfa;

    fn run(dfa: &Dfa, input: &[u8]) -> Option<(usize, TokenKind)> {
        let mut state = dfa.start;
        let mut last_accept = dfa.accept_of(state).map(|k| (0, k));
        for (i, &b) in input.iter().enumerate() {
            match dfa.step(state, b) {
                Some(next) => {
                    state = next;
                    if let Some(kind) = dfa.accept_of(state) {
                        last_accept = Some((i + 1, kind));
                    }
                }
                None => break,
            }
        }
        last_accept
    }

    #[test]
    fn maximal_munch_prefers_two_char_operator() {
        let dfa = subset_construction(&build_token_nfa());
        let (len, kind) = run(&dfa, b"==x").unwrap();
        assert_eq!(len, 2);
        assert_eq!(kind, TokenKind::EqEq);
    }

    #[test]
    fn integer_then_dot_when_no_fraction_digits() {
        let dfa = subset_construction(&build_token_nfa());
        let (len, kind) = run(&dfa, b"3.").unwrap();
        assert_eq!(len, 1);
        assert_eq!(kind, TokenKind::Integer);
    }

    #[test]
    fn float_when_fraction_digits_follow() {
        let dfa = subset_construction(&build_token_nfa());
        let (len, kind) = run(&dfa, b"3.14 ").unwrap();
        assert_eq!(len, 4);
        assert_eq!(kind, TokenKind::Float);
    }

    #[test]
    fn scientific_notation_after_digit_stream() {
        let dfa = subset_construction(&build_token_nfa());
        let (len, kind) = run(&dfa, b"3e10;").unwrap();
        assert_eq!(len, 4);
        assert_eq!(kind, TokenKind::Float);
    }

    #[test]
    fn identifier_covers_whole_lexeme() {
        let dfa = subset_construction(&build_token_nfa());
        let (len, kind) = run(&dfa, b"groupby2(").unwrap();
        assert_eq!(len, 8);
        assert_eq!(kind, TokenKind::Identifier);
    }
}
