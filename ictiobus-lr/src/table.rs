//! SLR(1) and canonical-LR(1) item-set automaton and parse-table
//! construction (C4/C5): the canonical collection of states, shift/goto
//! transitions, and the resulting action/goto table with conflict
//! detection.

use crate::first_follow::{compute_first, compute_follow, FirstSets};
use crate::items::{closure_lr0, closure_lr1, goto_kernel, transition_symbols, Item, ItemSet};
use crate::prod::ProdId;
use ictiobus_grammar::Grammar;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMethod {
    Slr1,
    CanonicalLr1,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Shift(usize),
    Reduce(ProdId),
    Accept,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    ShiftReduceConflict { state: usize, terminal: String, shift_to: usize, reduce: ProdId },
    ReduceReduceConflict { state: usize, terminal: String, first: ProdId, second: ProdId },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TableError::ShiftReduceConflict { state, terminal, shift_to, reduce } => write!(
                f,
                "shift/reduce conflict in state {state} on '{terminal}': shift to {shift_to} or reduce by {reduce}"
            ),
            TableError::ReduceReduceConflict { state, terminal, first, second } => write!(
                f,
                "reduce/reduce conflict in state {state} on '{terminal}': reduce by {first} or {second}"
            ),
        }
    }
}

impl std::error::Error for TableError {}

/// A state's item set plus its outgoing (terminal or non-terminal)
/// transitions, keyed by the canonically sorted rendering of its kernel so
/// that state identity is stable and deterministic.
struct Automaton {
    states: Vec<ItemSet>,
    transitions: BTreeMap<(usize, String), usize>,
}

fn kernel_key(items: &ItemSet, augmented_start: &ProdId) -> String {
    // the augmented start item is always present in state 0's kernel only;
    // every other state's kernel is exactly its non-start items
    let mut rendered: Vec<String> = items
        .iter()
        .filter(|i| i.dot > 0 || &i.prod == augmented_start)
        .map(|i| format!("{}@{}:{}", i.prod, i.dot, i.lookahead.iter().cloned().collect::<Vec<_>>().join(",")))
        .collect();
    rendered.sort();
    rendered.join("|")
}

fn build_automaton(grammar: &Grammar, method: BuildMethod, augmented_start: &ProdId, first: &FirstSets) -> Automaton {
    let start_item = match method {
        BuildMethod::Slr1 => Item::start(augmented_start.clone()),
        BuildMethod::CanonicalLr1 => {
            let mut item = Item::start(augmented_start.clone());
            item.lookahead.insert("$".to_string());
            item
        }
    };
    let close = |items: ItemSet| match method {
        BuildMethod::Slr1 => closure_lr0(grammar, items),
        BuildMethod::CanonicalLr1 => closure_lr1(grammar, first, items),
    };

    let start_state = close(ItemSet::from([start_item]));
    let mut states = vec![start_state];
    let mut keys: Vec<String> = vec![kernel_key(&states[0], augmented_start)];
    let mut transitions = BTreeMap::new();

    let mut frontier = vec![0usize];
    while let Some(state_idx) = frontier.pop() {
        let symbols = transition_symbols(grammar, &states[state_idx]);
        for symbol in symbols {
            let kernel = goto_kernel(grammar, &states[state_idx], &symbol);
            if kernel.is_empty() {
                continue;
            }
            let closed = close(kernel);
            let key = kernel_key(&closed, augmented_start);
            let target = match keys.iter().position(|k| k == &key) {
                Some(idx) => idx,
                None => {
                    states.push(closed);
                    keys.push(key);
                    frontier.push(states.len() - 1);
                    states.len() - 1
                }
            };
            transitions.insert((state_idx, symbol), target);
        }
    }

    Automaton { states, transitions }
}

#[derive(Debug, Clone)]
pub struct ParseTable {
    pub action: BTreeMap<(usize, String), Action>,
    pub goto: BTreeMap<(usize, String), usize>,
    pub start_state: usize,
    pub state_count: usize,
}

impl ParseTable {
    /// A deterministic, sorted textual rendering -- suitable for golden-file
    /// tests or `.describe()`-style diagnostics.
    pub fn string(&self) -> String {
        let mut lines = Vec::new();
        lines.push(format!("start: {}", self.start_state));
        let mut action_keys: Vec<&(usize, String)> = self.action.keys().collect();
        action_keys.sort();
        for key in action_keys {
            let action = &self.action[key];
            let rendered = match action {
                Action::Shift(s) => format!("shift {s}"),
                Action::Reduce(p) => format!("reduce {p}"),
                Action::Accept => "accept".to_string(),
            };
            lines.push(format!("action ({}, {}) -> {}", key.0, key.1, rendered));
        }
        let mut goto_keys: Vec<&(usize, String)> = self.goto.keys().collect();
        goto_keys.sort();
        for key in goto_keys {
            lines.push(format!("goto ({}, {}) -> {}", key.0, key.1, self.goto[key]));
        }
        lines.join("\n")
    }
}

/// Builds the canonical collection and resolves it into an action/goto
/// table. `grammar`'s own start symbol is augmented internally (`S'` -> `S`);
/// the caller's grammar is not modified.
pub fn build_parse_table(grammar: &Grammar, method: BuildMethod) -> Result<ParseTable, TableError> {
    let mut augmented = grammar.copy();
    let augmented_start_name = augmented.generate_unique_name(grammar.start_symbol());
    augmented.add_rule(&augmented_start_name, &[grammar.start_symbol()]).unwrap();
    let augmented_start = ProdId { head: augmented_start_name.clone(), index: 0 };

    let first = compute_first(&augmented);
    let follow = compute_follow(&augmented, &first);

    let automaton = build_automaton(&augmented, method, &augmented_start, &first);

    let mut action: BTreeMap<(usize, String), Action> = BTreeMap::new();
    let mut goto: BTreeMap<(usize, String), usize> = BTreeMap::new();

    for ((state, symbol), target) in &automaton.transitions {
        if augmented.is_terminal(symbol) {
            insert_action(&mut action, *state, symbol.clone(), Action::Shift(*target))?;
        } else {
            goto.insert((*state, symbol.clone()), *target);
        }
    }

    for (state_idx, items) in automaton.states.iter().enumerate() {
        for item in items {
            if !item.is_reduce(&augmented) {
                continue;
            }
            if item.prod == augmented_start {
                insert_action(&mut action, state_idx, "$".to_string(), Action::Accept)?;
                continue;
            }
            let lookaheads: Vec<String> = match method {
                BuildMethod::Slr1 => follow.get(&item.prod.head).cloned().unwrap_or_default().into_iter().collect(),
                BuildMethod::CanonicalLr1 => item.lookahead.iter().cloned().collect(),
            };
            for terminal in lookaheads {
                insert_action(&mut action, state_idx, terminal, Action::Reduce(item.prod.clone()))?;
            }
        }
    }

    Ok(ParseTable { action, goto, start_state: 0, state_count: automaton.states.len() })
}

fn insert_action(
    action: &mut BTreeMap<(usize, String), Action>,
    state: usize,
    terminal: String,
    new: Action,
) -> Result<(), TableError> {
    if let Some(existing) = action.get(&(state, terminal.clone())) {
        if existing == &new {
            return Ok(());
        }
        return Err(match (existing, &new) {
            (Action::Shift(to), Action::Reduce(p)) | (Action::Reduce(p), Action::Shift(to)) => {
                TableError::ShiftReduceConflict { state, terminal, shift_to: *to, reduce: p.clone() }
            }
            (Action::Reduce(a), Action::Reduce(b)) => {
                TableError::ReduceReduceConflict { state, terminal, first: a.clone(), second: b.clone() }
            }
            _ => TableError::ReduceReduceConflict {
                state,
                terminal,
                first: match existing {
                    Action::Reduce(p) => p.clone(),
                    _ => unreachable!(),
                },
                second: match &new {
                    Action::Reduce(p) => p.clone(),
                    _ => unreachable!(),
                },
            },
        });
    }
    action.insert((state, terminal), new);
    Ok(())
}
