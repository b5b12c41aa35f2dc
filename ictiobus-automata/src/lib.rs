//! Generic finite-automaton machinery (C3): an NFA with ε-closure and a
//! subset-construction DFA, both generic over the value carried at each
//! state. States are keyed by name; the empty string is the ε input label.

use ictiobus_collections::OrderedMap;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// The ε input label.
pub const EPSILON: &str = "";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaError {
    UnknownState(String),
    NoStartState,
}

impl fmt::Display for FaError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FaError::UnknownState(s) => write!(f, "no such state: '{s}'"),
            FaError::NoStartState => write!(f, "automaton has no start state"),
        }
    }
}

impl std::error::Error for FaError {}

#[derive(Debug, Clone)]
struct StateData<V> {
    value: V,
    accepting: bool,
}

/// A nondeterministic finite automaton: transitions are a multimap on input
/// symbols, with `""` meaning ε.
#[derive(Debug, Clone)]
pub struct Nfa<V> {
    states: OrderedMap<String, StateData<V>>,
    transitions: BTreeMap<(String, String), BTreeSet<String>>,
    start: Option<String>,
}

impl<V: Clone> Default for Nfa<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> Nfa<V> {
    pub fn new() -> Self {
        Self {
            states: OrderedMap::new(),
            transitions: BTreeMap::new(),
            start: None,
        }
    }

    /// Adds a state. A duplicate name is a no-op (the existing state, and
    /// its value, is left untouched).
    pub fn add_state(&mut self, name: &str, value: V, accepting: bool) {
        if !self.states.contains_key(&name.to_string()) {
            self.states.insert(name.to_string(), StateData { value, accepting });
            if self.start.is_none() {
                self.start = Some(name.to_string());
            }
        }
    }

    pub fn set_start(&mut self, name: &str) {
        self.start = Some(name.to_string());
    }

    pub fn start(&self) -> Option<&str> {
        self.start.as_deref()
    }

    pub fn has_state(&self, name: &str) -> bool {
        self.states.contains_key(&name.to_string())
    }

    pub fn value(&self, name: &str) -> Option<&V> {
        self.states.get(&name.to_string()).map(|s| &s.value)
    }

    pub fn is_accepting(&self, name: &str) -> bool {
        self.states.get(&name.to_string()).map_or(false, |s| s.accepting)
    }

    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(|s| s.as_str())
    }

    /// Both `from` and `to` must already be states.
    pub fn add_transition(&mut self, from: &str, input: &str, to: &str) -> Result<(), FaError> {
        if !self.has_state(from) {
            return Err(FaError::UnknownState(from.to_string()));
        }
        if !self.has_state(to) {
            return Err(FaError::UnknownState(to.to_string()));
        }
        self.transitions
            .entry((from.to_string(), input.to_string()))
            .or_default()
            .insert(to.to_string());
        Ok(())
    }

    /// DFS over ε-labelled out-edges; includes `name` itself.
    pub fn epsilon_closure(&self, name: &str) -> BTreeSet<String> {
        let mut visited = BTreeSet::new();
        let mut stack = vec![name.to_string()];
        while let Some(s) = stack.pop() {
            if !visited.insert(s.clone()) {
                continue;
            }
            if let Some(targets) = self.transitions.get(&(s, EPSILON.to_string())) {
                for t in targets {
                    if !visited.contains(t) {
                        stack.push(t.clone());
                    }
                }
            }
        }
        visited
    }

    pub fn epsilon_closure_set(&self, names: &BTreeSet<String>) -> BTreeSet<String> {
        let mut result = BTreeSet::new();
        for n in names {
            result.extend(self.epsilon_closure(n));
        }
        result
    }

    /// Union of non-ε `a`-transitions out of every state in `states`.
    pub fn move_states(&self, states: &BTreeSet<String>, a: &str) -> BTreeSet<String> {
        debug_assert_ne!(a, EPSILON);
        let mut result = BTreeSet::new();
        for s in states {
            if let Some(targets) = self.transitions.get(&(s.clone(), a.to_string())) {
                result.extend(targets.iter().cloned());
            }
        }
        result
    }

    /// All non-ε transition labels present anywhere in the automaton.
    pub fn input_symbols(&self) -> BTreeSet<String> {
        self.transitions
            .keys()
            .map(|(_, i)| i.clone())
            .filter(|i| i != EPSILON)
            .collect()
    }

    fn canonical_name(subset: &BTreeSet<String>) -> String {
        subset.iter().cloned().collect::<Vec<_>>().join(",")
    }

    /// Subset construction (purple-dragon 3.20): the DFA's states are the
    /// canonical, lexicographically sorted string encodings of NFA-state
    /// subsets, so construction is deterministic.
    pub fn to_dfa(&self) -> Result<Dfa<BTreeSet<String>>, FaError> {
        let start_name = self.start.clone().ok_or(FaError::NoStartState)?;
        let start_set = self.epsilon_closure(&start_name);
        let mut dfa = Dfa::new();
        let start_key = Self::canonical_name(&start_set);
        dfa.add_state(&start_key, start_set.clone(), start_set.iter().any(|s| self.is_accepting(s)));
        dfa.set_start(&start_key);

        let mut unmarked = vec![start_set];
        let mut marked: BTreeSet<String> = BTreeSet::new();
        while let Some(t) = unmarked.pop() {
            let t_key = Self::canonical_name(&t);
            if !marked.insert(t_key.clone()) {
                continue;
            }
            for a in self.input_symbols() {
                let moved = self.move_states(&t, &a);
                if moved.is_empty() {
                    continue;
                }
                let u = self.epsilon_closure_set(&moved);
                let u_key = Self::canonical_name(&u);
                if !dfa.has_state(&u_key) {
                    dfa.add_state(&u_key, u.clone(), u.iter().any(|s| self.is_accepting(s)));
                    unmarked.push(u.clone());
                }
                dfa.add_transition(&t_key, &a, &u_key)?;
            }
        }
        Ok(dfa)
    }
}

#[derive(Debug, Clone)]
struct DfaStateData<V> {
    value: V,
    accepting: bool,
}

/// A deterministic finite automaton: at most one target per (state, input).
#[derive(Debug, Clone)]
pub struct Dfa<V> {
    states: OrderedMap<String, DfaStateData<V>>,
    transitions: BTreeMap<(String, String), String>,
    start: Option<String>,
}

impl<V: Clone> Default for Dfa<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> Dfa<V> {
    pub fn new() -> Self {
        Self {
            states: OrderedMap::new(),
            transitions: BTreeMap::new(),
            start: None,
        }
    }

    pub fn add_state(&mut self, name: &str, value: V, accepting: bool) {
        if !self.states.contains_key(&name.to_string()) {
            self.states.insert(name.to_string(), DfaStateData { value, accepting });
        }
    }

    pub fn has_state(&self, name: &str) -> bool {
        self.states.contains_key(&name.to_string())
    }

    pub fn set_start(&mut self, name: &str) {
        self.start = Some(name.to_string());
    }

    pub fn start(&self) -> Option<&str> {
        self.start.as_deref()
    }

    pub fn value(&self, name: &str) -> Option<&V> {
        self.states.get(&name.to_string()).map(|s| &s.value)
    }

    pub fn is_accepting(&self, name: &str) -> bool {
        self.states.get(&name.to_string()).map_or(false, |s| s.accepting)
    }

    pub fn accepting_states(&self) -> Vec<&str> {
        self.states
            .keys()
            .filter(|k| self.is_accepting(k))
            .map(|s| s.as_str())
            .collect()
    }

    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(|s| s.as_str())
    }

    pub fn add_transition(&mut self, from: &str, input: &str, to: &str) -> Result<(), FaError> {
        if !self.has_state(from) {
            return Err(FaError::UnknownState(from.to_string()));
        }
        if !self.has_state(to) {
            return Err(FaError::UnknownState(to.to_string()));
        }
        self.transitions.insert((from.to_string(), input.to_string()), to.to_string());
        Ok(())
    }

    pub fn transition(&self, from: &str, input: &str) -> Option<&str> {
        self.transitions.get(&(from.to_string(), input.to_string())).map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The ε-NFA for `a(b|c)*`: 0 -a-> 1; 1 -ε-> 2; 2 -b-> 3; 2 -c-> 3;
    /// 3 -ε-> 2; 2 is accepting.
    fn sample_nfa() -> Nfa<()> {
        let mut nfa = Nfa::new();
        for s in ["0", "1", "2", "3"] {
            nfa.add_state(s, (), s == "2");
        }
        nfa.set_start("0");
        nfa.add_transition("0", "a", "1").unwrap();
        nfa.add_transition("1", EPSILON, "2").unwrap();
        nfa.add_transition("2", "b", "3").unwrap();
        nfa.add_transition("2", "c", "3").unwrap();
        nfa.add_transition("3", EPSILON, "2").unwrap();
        nfa
    }

    #[test]
    fn epsilon_closure_includes_self_and_reachable() {
        let nfa = sample_nfa();
        let closure = nfa.epsilon_closure("1");
        assert_eq!(closure, BTreeSet::from(["1".to_string(), "2".to_string()]));
    }

    #[test]
    fn add_transition_rejects_unknown_states() {
        let mut nfa: Nfa<()> = Nfa::new();
        nfa.add_state("0", (), false);
        assert_eq!(nfa.add_transition("0", "a", "1"), Err(FaError::UnknownState("1".to_string())));
    }

    #[test]
    fn subset_construction_is_deterministic_and_accepts_abcbc() {
        let nfa = sample_nfa();
        let dfa = nfa.to_dfa().unwrap();
        // Deterministic start = eps-closure({0}) = {0}.
        let start = dfa.start().unwrap().to_string();
        assert_eq!(start, "0");
        let s1 = dfa.transition(&start, "a").unwrap().to_string();
        assert!(dfa.is_accepting(&s1));
        // from s1, "b" then "c" then "b" stay in the same (accepting) subset
        let s2 = dfa.transition(&s1, "b").unwrap().to_string();
        assert_eq!(s2, s1);
        let s3 = dfa.transition(&s2, "c").unwrap().to_string();
        assert_eq!(s3, s1);
        // rebuilding gives the same canonical state names (determinism)
        let dfa2 = nfa.to_dfa().unwrap();
        assert_eq!(dfa.state_names().collect::<BTreeSet<_>>(), dfa2.state_names().collect::<BTreeSet<_>>());
    }

    #[test]
    fn to_dfa_fails_without_start_state() {
        let nfa: Nfa<()> = Nfa::new();
        assert_eq!(nfa.to_dfa().unwrap_err(), FaError::NoStartState);
    }
}
