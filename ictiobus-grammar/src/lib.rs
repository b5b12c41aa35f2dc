//! Context-free grammar representation and normalisation (C2): the data
//! model, `validate`, ε- and unit-production elimination, and reachability
//! analysis.

pub mod production;
pub mod symbol;
pub mod text;

use ictiobus_collections::OrderedMap;
use production::{Production, Rule};
use std::collections::BTreeSet;
use std::fmt;
use symbol::{is_epsilon, is_non_terminal_name, is_terminal_name, is_valid_head_name, is_valid_symbol, is_valid_terminal_name, TokenClass};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    InvalidHeadName(String),
    InvalidSymbolName(String),
    InvalidTerminalName(String),
    UndefinedClass(String),
    DuplicateClass(String),
    Invalid(String),
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GrammarError::InvalidHeadName(s) => write!(f, "'{s}' is not a valid non-terminal name"),
            GrammarError::InvalidSymbolName(s) => write!(f, "'{s}' is not a valid production symbol"),
            GrammarError::InvalidTerminalName(s) => write!(f, "'{s}' is not a valid terminal name"),
            GrammarError::UndefinedClass(s) => write!(f, "token class '{s}' is not defined"),
            GrammarError::DuplicateClass(s) => write!(f, "token class '{s}' is already mapped by another terminal"),
            GrammarError::Invalid(s) => write!(f, "{s}"),
        }
    }
}

impl std::error::Error for GrammarError {}

/// The CFG data model: an insertion-ordered non-terminal→`Rule` mapping, an
/// injective terminal→`TokenClass` mapping, and a designated start symbol.
#[derive(Debug, Clone)]
pub struct Grammar {
    start: String,
    rules: OrderedMap<String, Rule>,
    terminals: OrderedMap<String, TokenClass>,
}

impl Grammar {
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            rules: OrderedMap::new(),
            terminals: OrderedMap::new(),
        }
    }

    pub fn start_symbol(&self) -> &str {
        &self.start
    }

    /// Appends a new alternative production to `head`'s rule, creating the
    /// rule if this is its first alternative.
    pub fn add_rule(&mut self, head: &str, production: &[&str]) -> Result<(), GrammarError> {
        if !is_valid_head_name(head) {
            return Err(GrammarError::InvalidHeadName(head.to_string()));
        }
        if production.len() > 1 {
            for sym in production {
                if !is_valid_symbol(sym) {
                    return Err(GrammarError::InvalidSymbolName(sym.to_string()));
                }
            }
        } else if let Some(sym) = production.first() {
            if !is_epsilon(sym) && !is_valid_symbol(sym) {
                return Err(GrammarError::InvalidSymbolName(sym.to_string()));
            }
        }
        let prod = Production::new(production.iter().map(|s| s.to_string()).collect());
        if !self.rules.contains_key(head) {
            self.rules.insert(head.to_string(), Rule::new(head));
        }
        self.rules.get_mut(head).unwrap().alternatives.push(prod);
        Ok(())
    }

    /// Registers a terminal symbol, mapped to `class`. `class`'s ID must be
    /// distinct (case-insensitively) from every other terminal's class.
    pub fn add_term(&mut self, name: &str, class: TokenClass) -> Result<(), GrammarError> {
        if !is_valid_terminal_name(name) {
            return Err(GrammarError::InvalidTerminalName(name.to_string()));
        }
        if class.is_undefined() {
            return Err(GrammarError::UndefinedClass(class.id().to_string()));
        }
        if self.terminals.values().any(|c| c == &class) {
            return Err(GrammarError::DuplicateClass(class.id().to_string()));
        }
        self.terminals.insert(name.to_string(), class);
        Ok(())
    }

    pub fn rule(&self, non_terminal: &str) -> Option<&Rule> {
        self.rules.get(&non_terminal.to_string())
    }

    pub fn term(&self, terminal: &str) -> Option<&TokenClass> {
        self.terminals.get(&terminal.to_string())
    }

    pub fn non_terminals(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(|s| s.as_str())
    }

    pub fn terminals(&self) -> impl Iterator<Item = &str> {
        self.terminals.keys().map(|s| s.as_str())
    }

    pub fn is_non_terminal(&self, sym: &str) -> bool {
        self.rules.contains_key(&sym.to_string())
    }

    pub fn is_terminal(&self, sym: &str) -> bool {
        self.terminals.contains_key(&sym.to_string())
    }

    /// Every `(head, alternative)` pair where the alternative is a unit
    /// production.
    pub fn unit_productions(&self) -> Vec<(String, Production)> {
        let mut out = Vec::new();
        for head in self.rules.keys() {
            let rule = self.rules.get(head).unwrap();
            for alt in rule.alternatives() {
                if alt.is_unit() {
                    out.push((head.clone(), alt.clone()));
                }
            }
        }
        out
    }

    /// Non-terminals not reachable from the start symbol by any derivation.
    pub fn unreachable_non_terminals(&self) -> Vec<String> {
        let mut reached: BTreeSet<String> = BTreeSet::new();
        let mut frontier = vec![self.start.clone()];
        while let Some(nt) = frontier.pop() {
            if !reached.insert(nt.clone()) {
                continue;
            }
            if let Some(rule) = self.rules.get(&nt) {
                for alt in rule.alternatives() {
                    for sym in alt.symbols() {
                        if is_non_terminal_name(sym) && !reached.contains(sym) {
                            frontier.push(sym.clone());
                        }
                    }
                }
            }
        }
        self.non_terminals()
            .filter(|nt| !reached.contains(*nt))
            .map(|s| s.to_string())
            .collect()
    }

    /// Removes a rule entirely, compacting declaration order.
    pub fn remove_rule(&mut self, non_terminal: &str) {
        self.rules.remove(&non_terminal.to_string());
    }

    /// All the structural invariants in one pass; every violation found is
    /// reported, not just the first.
    pub fn validate(&self) -> Result<(), GrammarError> {
        let mut problems = Vec::new();

        if self.rules.is_empty() {
            problems.push("grammar has no rules".to_string());
        }

        if !self.rules.contains_key(&self.start) {
            problems.push(format!("start symbol '{}' is not defined", self.start));
        }

        let mut produced: BTreeSet<String> = BTreeSet::new();
        for head in self.rules.keys() {
            let rule = self.rules.get(head).unwrap();
            for alt in rule.alternatives() {
                for sym in alt.symbols() {
                    if !is_epsilon(sym) {
                        produced.insert(sym.clone());
                    }
                }
            }
        }

        for sym in &produced {
            if !self.is_non_terminal(sym) && !self.is_terminal(sym) {
                problems.push(format!("symbol '{sym}' is produced but neither a non-terminal nor a terminal is defined for it"));
            }
        }

        for nt in self.non_terminals() {
            if nt != self.start && !produced.contains(nt) {
                problems.push(format!("non-terminal '{nt}' is defined but never produced"));
            }
        }

        for t in self.terminals() {
            if !produced.contains(t) {
                problems.push(format!("terminal '{t}' is defined but never produced"));
            }
        }

        let mut seen_classes: Vec<&TokenClass> = Vec::new();
        for t in self.terminals() {
            let class = self.term(t).unwrap();
            if seen_classes.iter().any(|c| *c == class) {
                problems.push(format!("token class '{}' is mapped by more than one terminal", class.id()));
            } else {
                seen_classes.push(class);
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(GrammarError::Invalid(problems.join("\n")))
        }
    }

    /// Returns a fresh non-terminal name derived from `base`, not currently
    /// present in the grammar. Used to augment the start symbol for LR
    /// automaton construction (`S` → `S'`).
    pub fn generate_unique_name(&self, base: &str) -> String {
        let mut name = format!("{base}'");
        while self.is_non_terminal(&name) || self.is_terminal(&name) {
            name.push('\'');
        }
        name
    }

    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// For each non-terminal with an ε-production, expand every occurrence
    /// of it in other productions via the 2ⁿ keep/drop bitmask over its `n`
    /// occurrences, then drop the ε-production itself.
    pub fn remove_epsilons(&mut self) {
        loop {
            let a = match self
                .non_terminals()
                .find(|nt| self.rules.get(&nt.to_string()).unwrap().alternatives().iter().any(|p| p.is_epsilon()))
                .map(|s| s.to_string())
            {
                Some(a) => a,
                None => break,
            };
            let a_has_non_epsilon = self
                .rules
                .get(&a)
                .unwrap()
                .alternatives()
                .iter()
                .any(|p| !p.is_epsilon());

            let heads: Vec<String> = self.non_terminals().map(|s| s.to_string()).collect();
            for head in &heads {
                let alternatives = self.rules.get(head).unwrap().alternatives().to_vec();
                let mut new_alts: Vec<Production> = Vec::new();
                for alt in &alternatives {
                    if alt.is_epsilon() {
                        push_unique(&mut new_alts, alt.clone());
                        continue;
                    }
                    let positions: Vec<usize> = alt
                        .symbols()
                        .iter()
                        .enumerate()
                        .filter(|(_, s)| *s == &a)
                        .map(|(i, _)| i)
                        .collect();
                    if positions.is_empty() {
                        push_unique(&mut new_alts, alt.clone());
                        continue;
                    }
                    if !a_has_non_epsilon {
                        let kept: Vec<String> = alt
                            .symbols()
                            .iter()
                            .enumerate()
                            .filter(|(i, _)| !positions.contains(i))
                            .map(|(_, s)| s.clone())
                            .collect();
                        push_unique(&mut new_alts, to_production(kept));
                    } else {
                        let n = positions.len();
                        for mask in 0u32..(1 << n) {
                            let mut kept = Vec::new();
                            for (i, sym) in alt.symbols().iter().enumerate() {
                                if let Some(pos_idx) = positions.iter().position(|&p| p == i) {
                                    if (mask >> pos_idx) & 1 == 1 {
                                        kept.push(sym.clone());
                                    }
                                } else {
                                    kept.push(sym.clone());
                                }
                            }
                            push_unique(&mut new_alts, to_production(kept));
                        }
                    }
                }
                self.rules.get_mut(head).unwrap().alternatives = new_alts;
            }

            let rule = self.rules.get_mut(&a).unwrap();
            rule.alternatives.retain(|p| !p.is_epsilon());
            if rule.alternatives.is_empty() {
                self.remove_rule(&a);
            }
        }
    }

    /// Replaces each unit alternative `A → B` with `B`'s current
    /// alternatives, skipping ones already present on `A`, self-loops, and
    /// symbols already resolved earlier in the same pass; prunes unreachable
    /// non-terminals afterwards.
    pub fn remove_unit_productions(&mut self) {
        let heads: Vec<String> = self.non_terminals().map(|s| s.to_string()).collect();
        for a in heads {
            if !self.rules.contains_key(&a) {
                continue;
            }
            let mut resolved: BTreeSet<String> = BTreeSet::new();
            loop {
                let unit_b = {
                    let rule = self.rules.get(&a).unwrap();
                    rule.alternatives()
                        .iter()
                        .find(|p| p.is_unit() && !resolved.contains(&p.symbols()[0]))
                        .map(|p| p.symbols()[0].clone())
                };
                let b = match unit_b {
                    Some(b) => b,
                    None => break,
                };
                resolved.insert(b.clone());
                {
                    let rule = self.rules.get_mut(&a).unwrap();
                    rule.alternatives.retain(|p| !(p.is_unit() && p.symbols()[0] == b));
                }
                if b == a {
                    continue;
                }
                let b_alts: Vec<Production> = self
                    .rules
                    .get(&b)
                    .map(|r| r.alternatives().to_vec())
                    .unwrap_or_default();
                let rule = self.rules.get_mut(&a).unwrap();
                for alt in b_alts {
                    if !rule.alternatives.contains(&alt) {
                        rule.alternatives.push(alt);
                    }
                }
            }
        }
        for nt in self.unreachable_non_terminals() {
            self.remove_rule(&nt);
        }
    }
}

fn to_production(symbols: Vec<String>) -> Production {
    if symbols.is_empty() {
        Production::epsilon()
    } else {
        Production::new(symbols)
    }
}

fn push_unique(alts: &mut Vec<Production>, prod: Production) {
    if !alts.contains(&prod) {
        alts.push(prod);
    }
}


/// Property tests for invariants 4 and 5 (§8): ε- and unit-production
/// elimination must not change the language, modulo the empty string that
/// ε-elimination necessarily drops (the classic transform keeps no way to
/// derive ε once every ε-alternative is gone).
#[cfg(test)]
mod language_preservation {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn symbol_strategy() -> impl Strategy<Value = String> {
        prop_oneof![Just("x".to_string()), Just("y".to_string()), Just("S".to_string()), Just("A".to_string())]
    }

    fn production_strategy() -> impl Strategy<Value = Vec<String>> {
        prop_oneof![Just(vec![String::new()]), prop::collection::vec(symbol_strategy(), 1..=3)]
    }

    fn rule_strategy() -> impl Strategy<Value = Vec<Vec<String>>> {
        prop::collection::vec(production_strategy(), 1..=3)
    }

    fn build_grammar(s_alts: &[Vec<String>], a_alts: &[Vec<String>]) -> Grammar {
        let mut g = Grammar::new("S");
        g.add_term("x", TokenClass::new("x", "x", 0)).unwrap();
        g.add_term("y", TokenClass::new("y", "y", 0)).unwrap();
        for alt in s_alts {
            let refs: Vec<&str> = alt.iter().map(String::as_str).collect();
            g.add_rule("S", &refs).unwrap();
        }
        for alt in a_alts {
            let refs: Vec<&str> = alt.iter().map(String::as_str).collect();
            g.add_rule("A", &refs).unwrap();
        }
        g
    }

    /// Every terminal string derivable from the start symbol in at most
    /// `max_len` symbols, found by bounded breadth-first expansion of
    /// sentential forms (leftmost non-terminal first).
    fn derivable_strings(grammar: &Grammar, max_len: usize, max_states: usize) -> BTreeSet<Vec<String>> {
        let mut results = BTreeSet::new();
        let mut visited: BTreeSet<Vec<String>> = BTreeSet::new();
        let mut frontier = vec![vec![grammar.start_symbol().to_string()]];
        let mut explored = 0usize;
        while let Some(form) = frontier.pop() {
            if explored >= max_states {
                break;
            }
            explored += 1;
            if !visited.insert(form.clone()) {
                continue;
            }
            match form.iter().position(|s| grammar.is_non_terminal(s)) {
                None => {
                    results.insert(form);
                }
                Some(idx) => {
                    let Some(rule) = grammar.rule(&form[idx]) else { continue };
                    for prod in rule.alternatives() {
                        let mut next = form[..idx].to_vec();
                        if !prod.is_epsilon() {
                            next.extend(prod.symbols().iter().cloned());
                        }
                        next.extend(form[idx + 1..].iter().cloned());
                        if next.len() <= max_len {
                            frontier.push(next);
                        }
                    }
                }
            }
        }
        results
    }

    proptest! {
        #[test]
        fn remove_epsilons_preserves_the_non_empty_language(s_alts in rule_strategy(), a_alts in rule_strategy()) {
            let grammar = build_grammar(&s_alts, &a_alts);
            let before: BTreeSet<Vec<String>> = derivable_strings(&grammar, 4, 3000)
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect();
            let mut after_grammar = grammar.clone();
            after_grammar.remove_epsilons();
            let after = derivable_strings(&after_grammar, 4, 3000);
            prop_assert_eq!(before, after);
        }

        #[test]
        fn remove_unit_productions_preserves_the_language(s_alts in rule_strategy(), a_alts in rule_strategy()) {
            let grammar = build_grammar(&s_alts, &a_alts);
            let before = derivable_strings(&grammar, 4, 3000);
            let mut after_grammar = grammar.clone();
            after_grammar.remove_unit_productions();
            let after = derivable_strings(&after_grammar, 4, 3000);
            prop_assert_eq!(before, after);
        }
    }
}
