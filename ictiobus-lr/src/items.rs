//! LR items and the item-set closure/goto operations (C4) shared by the
//! LR(0)/SLR(1) and canonical-LR(1) automaton builders. An item carries a
//! look-ahead set that is simply left empty for the LR(0) flavour.

use crate::first_follow::FirstSets;
use crate::prod::{all_productions, prod_len, symbol_at, ProdId};
use ictiobus_grammar::Grammar;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Item {
    pub prod: ProdId,
    pub dot: usize,
    pub lookahead: BTreeSet<String>,
}

impl Item {
    pub fn start(prod: ProdId) -> Self {
        Self { prod, dot: 0, lookahead: BTreeSet::new() }
    }

    pub fn next_symbol<'g>(&self, grammar: &'g Grammar) -> Option<&'g str> {
        symbol_at(grammar, &self.prod, self.dot)
    }

    pub fn is_reduce(&self, grammar: &Grammar) -> bool {
        self.dot >= prod_len(grammar, &self.prod)
    }

    fn advanced(&self) -> Self {
        Self { prod: self.prod.clone(), dot: self.dot + 1, lookahead: self.lookahead.clone() }
    }
}

pub type ItemSet = BTreeSet<Item>;

/// LR(0) closure: lookahead sets are ignored (stay empty).
pub fn closure_lr0(grammar: &Grammar, mut items: ItemSet) -> ItemSet {
    loop {
        let mut additions = Vec::new();
        for item in &items {
            if let Some(sym) = item.next_symbol(grammar) {
                if grammar.is_non_terminal(sym) {
                    for prod in all_productions(grammar).into_iter().filter(|p| p.head == sym) {
                        let candidate = Item::start(prod);
                        if !items.contains(&candidate) {
                            additions.push(candidate);
                        }
                    }
                }
            }
        }
        if additions.is_empty() {
            return items;
        }
        items.extend(additions);
    }
}

/// Canonical-LR(1) closure: for `A -> a . B b, L`, adds `B -> . g, FIRST(b L)`
/// for every `B` production, merging look-ahead into existing items.
pub fn closure_lr1(grammar: &Grammar, first: &FirstSets, mut items: ItemSet) -> ItemSet {
    loop {
        let mut changed = false;
        let snapshot: Vec<Item> = items.iter().cloned().collect();
        for item in &snapshot {
            let Some(sym) = item.next_symbol(grammar) else { continue };
            if !grammar.is_non_terminal(sym) {
                continue;
            }
            let symbols = crate::prod::prod_symbols(grammar, &item.prod);
            let beta: Vec<&str> = symbols[item.dot + 1..].iter().map(|s| s.as_str()).collect();
            for look_ahead in &item.lookahead {
                let mut seq = beta.clone();
                seq.push(look_ahead.as_str());
                let (mut la, nullable) = first.of_sequence(&seq);
                if nullable {
                    la.insert(look_ahead.clone());
                }
                for prod in all_productions(grammar).into_iter().filter(|p| p.head == sym) {
                    if let Some(existing) = items.iter().find(|i| i.prod == prod && i.dot == 0).cloned() {
                        let mut merged = existing.lookahead.clone();
                        let before = merged.len();
                        merged.extend(la.iter().cloned());
                        if merged.len() != before {
                            items.remove(&existing);
                            items.insert(Item { prod: prod.clone(), dot: 0, lookahead: merged });
                            changed = true;
                        }
                    } else {
                        items.insert(Item { prod: prod.clone(), dot: 0, lookahead: la.clone() });
                        changed = true;
                    }
                }
            }
        }
        if !changed {
            return items;
        }
    }
}

/// The (un-closed) kernel reached by shifting `symbol` from `items`.
pub fn goto_kernel(grammar: &Grammar, items: &ItemSet, symbol: &str) -> ItemSet {
    items
        .iter()
        .filter(|item| item.next_symbol(grammar) == Some(symbol))
        .map(Item::advanced)
        .collect()
}

/// Every grammar symbol that appears immediately after some item's dot.
pub fn transition_symbols(grammar: &Grammar, items: &ItemSet) -> BTreeSet<String> {
    items.iter().filter_map(|item| item.next_symbol(grammar)).map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::first_follow::compute_first;
    use crate::prod::all_productions;
    use ictiobus_grammar::text::parse_grammar_text;

    fn augmented() -> (ictiobus_grammar::Grammar, String) {
        let mut g = parse_grammar_text("E", "E -> E plus T | T; T -> T star F | F; F -> lparen E rparen | id;").unwrap();
        let start = g.generate_unique_name("E");
        g.add_rule(&start, &["E"]).unwrap();
        (g, start)
    }

    #[test]
    fn lr0_closure_adds_all_alternatives_of_next_non_terminal() {
        let (g, start) = augmented();
        let start_prod = all_productions(&g).into_iter().find(|p| p.head == start).unwrap();
        let kernel = ItemSet::from([Item::start(start_prod)]);
        let closed = closure_lr0(&g, kernel);
        // E -> .E+T, E -> .T, T -> .T*F, T -> .F, F -> .(E), F -> .id, plus the start item
        assert_eq!(closed.len(), 7);
    }

    #[test]
    fn lr1_closure_propagates_lookahead_to_dollar() {
        let (g, start) = augmented();
        let first = compute_first(&g);
        let start_prod = all_productions(&g).into_iter().find(|p| p.head == start).unwrap();
        let kernel = ItemSet::from([Item { prod: start_prod, dot: 0, lookahead: BTreeSet::from(["$".to_string()]) }]);
        let closed = closure_lr1(&g, &first, kernel);
        let e_to_t = closed.iter().find(|i| i.prod.head == "E" && i.prod.index == 1).unwrap();
        assert!(e_to_t.lookahead.contains("plus"));
        assert!(e_to_t.lookahead.contains("$"));
    }
}
