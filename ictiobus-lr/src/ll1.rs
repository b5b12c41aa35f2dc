//! LL(1) prediction-table construction (C5): for each non-terminal
//! alternative, the set of terminals (and possibly the grammar's `$`
//! end-marker, via FOLLOW) that predict it.

use crate::first_follow::{compute_first, compute_follow, FirstSets};
use ictiobus_grammar::Grammar;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LL1Conflict {
    pub non_terminal: String,
    pub terminal: String,
    pub existing_alternative: usize,
    pub new_alternative: usize,
}

impl fmt::Display for LL1Conflict {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "grammar is not LL(1): '{}' alternatives #{} and #{} both predict on '{}'",
            self.non_terminal, self.existing_alternative, self.new_alternative, self.terminal
        )
    }
}

impl std::error::Error for LL1Conflict {}

#[derive(Debug, Clone)]
pub struct LL1Table {
    entries: BTreeMap<(String, String), usize>,
}

impl LL1Table {
    pub fn predict(&self, non_terminal: &str, terminal: &str) -> Option<usize> {
        self.entries.get(&(non_terminal.to_string(), terminal.to_string())).copied()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, usize)> {
        self.entries.iter().map(|((nt, t), alt)| (nt.as_str(), t.as_str(), *alt))
    }
}

pub fn build_ll1(grammar: &Grammar) -> Result<LL1Table, LL1Conflict> {
    let first: FirstSets = compute_first(grammar);
    let follow = compute_follow(grammar, &first);
    let mut entries: BTreeMap<(String, String), usize> = BTreeMap::new();

    for nt in grammar.non_terminals() {
        let rule = grammar.rule(nt).unwrap();
        for (alt_index, alt) in rule.alternatives().iter().enumerate() {
            let symbols: Vec<&str> = alt.symbols().iter().map(|s| s.as_str()).collect();
            let (mut predict_set, nullable) = first.of_sequence(&symbols);
            if nullable {
                predict_set.extend(follow.get(nt).cloned().unwrap_or_default());
            }
            for terminal in predict_set {
                if let Some(&existing) = entries.get(&(nt.to_string(), terminal.clone())) {
                    if existing != alt_index {
                        return Err(LL1Conflict {
                            non_terminal: nt.to_string(),
                            terminal,
                            existing_alternative: existing,
                            new_alternative: alt_index,
                        });
                    }
                } else {
                    entries.insert((nt.to_string(), terminal), alt_index);
                }
            }
        }
    }

    Ok(LL1Table { entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ictiobus_grammar::text::parse_grammar_text;

    #[test]
    fn builds_table_for_non_left_recursive_grammar() {
        // E -> T E2 ; E2 -> plus T E2 | ε ; T -> F T2 ; T2 -> star F T2 | ε ; F -> lparen E rparen | id
        let g = parse_grammar_text(
            "E",
            "E -> T E2; E2 -> plus T E2 | ; T -> F T2; T2 -> star F T2 | ; F -> lparen E rparen | id;",
        )
        .unwrap();
        let table = build_ll1(&g).unwrap();
        assert_eq!(table.predict("E", "id"), Some(0));
        assert_eq!(table.predict("E2", "plus"), Some(0));
        assert_eq!(table.predict("E2", "$"), Some(1));
        assert_eq!(table.predict("E2", "rparen"), Some(1));
    }

    #[test]
    fn left_recursive_grammar_is_rejected() {
        let g = parse_grammar_text("E", "E -> E plus T | T; T -> id;").unwrap();
        assert!(build_ll1(&g).is_err());
    }
}
