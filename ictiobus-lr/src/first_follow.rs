//! FIRST and FOLLOW set computation (C5), by fixed-point iteration over the
//! grammar's productions.

use ictiobus_grammar::symbol::is_epsilon;
use ictiobus_grammar::Grammar;
use std::collections::{BTreeMap, BTreeSet};

pub type SymbolSet = BTreeSet<String>;

/// `FIRST(X)` for every terminal and non-terminal `X`. A non-terminal's set
/// contains `""` iff it is nullable (derives ε).
#[derive(Debug, Clone)]
pub struct FirstSets(BTreeMap<String, SymbolSet>);

impl FirstSets {
    /// FIRST of a single grammar symbol. Symbols not tracked by `compute_first`
    /// (the `$` end marker, or any other out-of-grammar look-ahead terminal)
    /// are treated as ordinary terminals whose own FIRST set is themselves.
    pub fn of(&self, symbol: &str) -> SymbolSet {
        match self.0.get(symbol) {
            Some(set) => set.clone(),
            None => SymbolSet::from([symbol.to_string()]),
        }
    }

    pub fn is_nullable(&self, non_terminal: &str) -> bool {
        self.0.get(non_terminal).map_or(false, |s| s.contains(""))
    }

    /// FIRST of a symbol sequence, e.g. the tail of a production following
    /// the dot, possibly followed by a look-ahead terminal. Returns the set
    /// of terminals that can begin it, plus whether the whole sequence is
    /// nullable.
    pub fn of_sequence(&self, symbols: &[&str]) -> (SymbolSet, bool) {
        let mut result = SymbolSet::new();
        for sym in symbols {
            if is_epsilon(sym) {
                continue;
            }
            let first = self.of(sym);
            result.extend(first.iter().filter(|s| !s.is_empty()).cloned());
            if !first.contains("") {
                return (result, false);
            }
        }
        (result, true)
    }
}

pub fn compute_first(grammar: &Grammar) -> FirstSets {
    let mut sets: BTreeMap<String, SymbolSet> = BTreeMap::new();
    for t in grammar.terminals() {
        sets.insert(t.to_string(), SymbolSet::from([t.to_string()]));
    }
    for nt in grammar.non_terminals() {
        sets.insert(nt.to_string(), SymbolSet::new());
    }

    let mut changed = true;
    while changed {
        changed = false;
        for nt in grammar.non_terminals() {
            let rule = grammar.rule(nt).unwrap();
            for alt in rule.alternatives() {
                if alt.is_epsilon() {
                    let set = sets.get_mut(nt).unwrap();
                    if set.insert(String::new()) {
                        changed = true;
                    }
                    continue;
                }
                let mut all_nullable = true;
                for sym in alt.symbols() {
                    let sym_first = sets.get(sym).cloned().unwrap_or_default();
                    let set = sets.get_mut(nt).unwrap();
                    let before = set.len();
                    set.extend(sym_first.iter().filter(|s| !s.is_empty()).cloned());
                    if set.len() != before {
                        changed = true;
                    }
                    if !sym_first.contains("") {
                        all_nullable = false;
                        break;
                    }
                }
                if all_nullable {
                    let set = sets.get_mut(nt).unwrap();
                    if set.insert(String::new()) {
                        changed = true;
                    }
                }
            }
        }
    }
    FirstSets(sets)
}

/// `FOLLOW(A)` for every non-terminal `A`; the grammar's end-marker `$` is
/// seeded into `FOLLOW(start_symbol)`.
pub fn compute_follow(grammar: &Grammar, first: &FirstSets) -> BTreeMap<String, SymbolSet> {
    let mut follow: BTreeMap<String, SymbolSet> =
        grammar.non_terminals().map(|nt| (nt.to_string(), SymbolSet::new())).collect();
    follow.get_mut(grammar.start_symbol()).unwrap().insert("$".to_string());

    let mut changed = true;
    while changed {
        changed = false;
        for nt in grammar.non_terminals() {
            let rule = grammar.rule(nt).unwrap();
            for alt in rule.alternatives() {
                if alt.is_epsilon() {
                    continue;
                }
                let symbols = alt.symbols();
                for (i, b) in symbols.iter().enumerate() {
                    if !grammar.is_non_terminal(b) {
                        continue;
                    }
                    let rest: Vec<&str> = symbols[i + 1..].iter().map(|s| s.as_str()).collect();
                    let (rest_first, rest_nullable) = first.of_sequence(&rest);
                    let follow_b = follow.get_mut(b).unwrap();
                    let before = follow_b.len();
                    follow_b.extend(rest_first);
                    if rest_nullable {
                        let nt_follow = follow.get(nt).cloned().unwrap_or_default();
                        follow.get_mut(b).unwrap().extend(nt_follow);
                    }
                    if follow.get(b).unwrap().len() != before {
                        changed = true;
                    }
                }
            }
        }
    }
    follow
}

#[cfg(test)]
mod tests {
    use super::*;
    use ictiobus_grammar::text::parse_grammar_text;

    fn dragon_book_grammar() -> ictiobus_grammar::Grammar {
        parse_grammar_text("E", "E -> E plus T | T; T -> T star F | F; F -> lparen E rparen | id;").unwrap()
    }

    #[test]
    fn first_of_non_terminals() {
        let g = dragon_book_grammar();
        let first = compute_first(&g);
        for nt in ["E", "T", "F"] {
            assert_eq!(first.of(nt), SymbolSet::from(["lparen".to_string(), "id".to_string()]));
        }
    }

    #[test]
    fn nullable_non_terminal_contributes_epsilon() {
        let mut g = ictiobus_grammar::Grammar::new("S");
        g.add_rule("S", &["a", "B"]).unwrap();
        g.add_rule("B", &["b"]).unwrap();
        g.add_rule("B", &[""]).unwrap();
        g.add_term("a", ictiobus_grammar::symbol::TokenClass::new("a", "a", 0)).unwrap();
        g.add_term("b", ictiobus_grammar::symbol::TokenClass::new("b", "b", 0)).unwrap();
        let first = compute_first(&g);
        assert!(first.is_nullable("B"));
        assert!(!first.is_nullable("S"));
    }

    #[test]
    fn follow_of_dragon_book_grammar() {
        let g = dragon_book_grammar();
        let first = compute_first(&g);
        let follow = compute_follow(&g, &first);
        assert_eq!(
            follow["E"],
            SymbolSet::from(["plus".to_string(), "rparen".to_string(), "$".to_string()])
        );
        assert_eq!(
            follow["T"],
            SymbolSet::from(["plus".to_string(), "star".to_string(), "rparen".to_string(), "$".to_string()])
        );
        assert_eq!(
            follow["F"],
            SymbolSet::from(["plus".to_string(), "star".to_string(), "rparen".to_string(), "$".to_string()])
        );
    }
}
