//! Automaton core (§4.A): builds one NFA fragment per token family, unifies them
//! under a shared root via ε-transitions, and compiles the union to a DFA via
//! subset construction. ≈20% of the front-end's share of the core.
pub mod builder;
pub mod dfa;
pub mod families;
pub mod nfa;

pub use dfa::{subset_construction, Dfa};
pub use nfa::Nfa;

/// Build the DataLang recognizer: the unified NFA, then its DFA.
pub fn build_dfa() -> Dfa {
    let nfa = families::build_token_nfa();
    subset_construction(&nfa)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Brute-force NFA simulation, used only to cross-check the DFA in tests
    /// (§4.A "Testable invariants": any NFA-accepted string is DFA-accepted and
    /// vice versa).
    fn nfa_accepts(nfa: &Nfa, input: &[u8]) -> bool {
        use nfa::StateSet;
        let mut states = nfa.epsilon_closure(&StateSet::from([nfa.start]));
        for &b in input {
            let moved = nfa.move_set(&states, b);
            if moved.is_empty() {
                return false;
            }
            states = nfa.epsilon_closure(&moved);
        }
        nfa.first_accept(&states).is_some()
    }

    #[test]
    fn dfa_agrees_with_nfa_on_sample_lexemes() {
        let nfa = families::build_token_nfa();
        let dfa = subset_construction(&nfa);
        for sample in ["let", "3.14", "42", "\"hi\"", "==", "groupby", "|>"] {
            let bytes = sample.as_bytes();
            let nfa_ok = nfa_accepts(&nfa, bytes);
            let mut state = dfa.start;
            let mut reached_end = true;
            for &b in bytes {
                match dfa.step(state, b) {
                    Some(next) => state = next,
                    None => {
                        reached_end = false;
                        break;
                    }
                }
            }
            let dfa_ok = reached_end && dfa.accept_of(state).is_some();
            assert_eq!(nfa_ok, dfa_ok, "mismatch on {:?}", sample);
        }
    }
}
