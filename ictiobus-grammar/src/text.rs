//! A compact textual grammar syntax (§6 external interface): rules
//! separated by `;`, head and alternatives separated by `->`, alternatives
//! separated by `|`, symbols space-separated, `ε` (or the literal word
//! `epsilon`) accepted for the ε-production.
//!
//! This is a convenience reader for tests and small embedded grammars, not a
//! general-purpose file format; terminals mentioned in the text are
//! auto-registered with a default `TokenClass` (same id and label, `lbp` 0)
//! unless the caller has already called `add_term` for them.

use crate::symbol::{is_terminal_name, TokenClass};
use crate::{Grammar, GrammarError};

pub fn parse_grammar_text(start: &str, text: &str) -> Result<Grammar, GrammarError> {
    let mut grammar = Grammar::new(start);

    for rule_text in text.split(';') {
        let rule_text = rule_text.trim();
        if rule_text.is_empty() {
            continue;
        }
        let (head, alts_text) = rule_text
            .split_once("->")
            .ok_or_else(|| GrammarError::Invalid(format!("missing '->' in rule: {rule_text}")))?;
        let head = head.trim();
        for alt_text in alts_text.split('|') {
            let alt_text = alt_text.trim();
            let symbols: Vec<&str> = if alt_text == "\u{3b5}" || alt_text.eq_ignore_ascii_case("epsilon") || alt_text.is_empty() {
                vec![""]
            } else {
                alt_text.split_whitespace().collect()
            };
            grammar.add_rule(head, &symbols)?;
        }
    }

    let to_register: Vec<String> = grammar
        .non_terminals()
        .map(|s| s.to_string())
        .flat_map(|nt| {
            grammar
                .rule(&nt)
                .unwrap()
                .alternatives()
                .iter()
                .flat_map(|p| p.symbols().to_vec())
                .collect::<Vec<_>>()
        })
        .filter(|sym| is_terminal_name(sym) && !grammar.is_terminal(sym))
        .collect();

    for name in to_register {
        if grammar.is_terminal(&name) {
            continue;
        }
        grammar.add_term(&name, TokenClass::new(&name, &name, 0))?;
    }

    Ok(grammar)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dragon_book_grammar() {
        let g = parse_grammar_text(
            "E",
            "E -> E plus T | T; T -> T star F | F; F -> lparen E rparen | id;",
        )
        .unwrap();
        assert!(g.validate().is_ok());
        assert_eq!(g.rule("E").unwrap().alternatives().len(), 2);
        assert!(g.term("id").is_some());
    }

    #[test]
    fn accepts_epsilon_marker() {
        let g = parse_grammar_text("S", "S -> a S | \u{3b5};").unwrap();
        let alts = g.rule("S").unwrap().alternatives();
        assert!(alts.iter().any(|p| p.is_epsilon()));
    }
}
