//! Attribute binding registration (C8): synthesised and inherited
//! `SDDBinding`s keyed by `(head, production)`, with the validation the
//! spec requires at `bind_*` time.

use crate::error::SdtError;
use ictiobus_grammar::symbol::{is_non_terminal_name, is_terminal_name};
use ictiobus_parse::{AttrRef, AttrValue, NodeRelation};
use std::collections::BTreeMap;

/// `(symbol, attrName, args) -> value`. Setters are pure: no access to
/// anything but their arguments.
pub type Setter = Box<dyn Fn(&str, &str, &[AttrValue]) -> Result<AttrValue, SdtError>>;

pub struct SDDBinding {
    pub head: String,
    pub production: Vec<String>,
    pub synthesised: bool,
    pub dest: AttrRef,
    pub requires: Vec<AttrRef>,
    pub setter: Setter,
}

fn effective_symbols(production: &[String]) -> &[String] {
    if production.len() == 1 && production[0].is_empty() {
        &[]
    } else {
        production
    }
}

/// Is `relation` a valid reference against `production`'s symbols -- i.e.
/// does its index fall within range for its relation kind?
pub fn valid_for(production: &[String], relation: &NodeRelation) -> bool {
    let symbols = effective_symbols(production);
    match relation {
        NodeRelation::Head => true,
        NodeRelation::Symbol(i) => *i < symbols.len(),
        NodeRelation::Terminal(i) => symbols.iter().filter(|s| is_terminal_name(s)).count() > *i,
        NodeRelation::NonTerminal(i) => symbols.iter().filter(|s| is_non_terminal_name(s)).count() > *i,
    }
}

fn production_key(production: &[String]) -> String {
    production.join(" ")
}

/// A syntax-directed definition: an ordered, head-keyed registry of
/// `SDDBinding`s built up via `bind_synthesised`/`bind_inherited`.
#[derive(Default)]
pub struct SDD {
    bindings: BTreeMap<(String, String), Vec<SDDBinding>>,
}

impl SDD {
    pub fn new() -> Self {
        Self { bindings: BTreeMap::new() }
    }

    pub fn bindings_for(&self, head: &str, production: &[String]) -> Option<&[SDDBinding]> {
        self.bindings.get(&(head.to_string(), production_key(production))).map(|v| v.as_slice())
    }

    /// Registers a synthesised binding: writes `attr` on the rule's head.
    pub fn bind_synthesised<F>(
        &mut self,
        head: &str,
        production: &[&str],
        attr: &str,
        setter: F,
        requires: Vec<AttrRef>,
    ) -> Result<(), SdtError>
    where
        F: Fn(&str, &str, &[AttrValue]) -> Result<AttrValue, SdtError> + 'static,
    {
        let production: Vec<String> = production.iter().map(|s| s.to_string()).collect();
        for dep in &requires {
            if !valid_for(&production, &dep.relation) {
                return Err(SdtError::Misbinding(format!(
                    "requirement {:?} is out of range for '{}' -> {}",
                    dep.relation,
                    head,
                    production.join(" ")
                )));
            }
        }
        let binding = SDDBinding {
            head: head.to_string(),
            production: production.clone(),
            synthesised: true,
            dest: AttrRef::new(NodeRelation::Head, attr),
            requires,
            setter: Box::new(setter),
        };
        self.bindings.entry((head.to_string(), production_key(&production))).or_default().push(binding);
        Ok(())
    }

    /// Registers an inherited binding: writes `attr` on `for_relation`, one
    /// of the rule's direct children (never `Head`).
    pub fn bind_inherited<F>(
        &mut self,
        head: &str,
        production: &[&str],
        attr: &str,
        setter: F,
        requires: Vec<AttrRef>,
        for_relation: NodeRelation,
    ) -> Result<(), SdtError>
    where
        F: Fn(&str, &str, &[AttrValue]) -> Result<AttrValue, SdtError> + 'static,
    {
        if for_relation == NodeRelation::Head {
            return Err(SdtError::Misbinding("inherited binding's destination must not be Head".to_string()));
        }
        let production: Vec<String> = production.iter().map(|s| s.to_string()).collect();
        if !valid_for(&production, &for_relation) {
            return Err(SdtError::Misbinding(format!(
                "destination {:?} is out of range for '{}' -> {}",
                for_relation,
                head,
                production.join(" ")
            )));
        }
        for dep in &requires {
            if !valid_for(&production, &dep.relation) {
                return Err(SdtError::Misbinding(format!(
                    "requirement {:?} is out of range for '{}' -> {}",
                    dep.relation,
                    head,
                    production.join(" ")
                )));
            }
        }
        let binding = SDDBinding {
            head: head.to_string(),
            production: production.clone(),
            synthesised: false,
            dest: AttrRef::new(for_relation, attr),
            requires,
            setter: Box::new(setter),
        };
        self.bindings.entry((head.to_string(), production_key(&production))).or_default().push(binding);
        Ok(())
    }
}
