use crate::symbol::{is_epsilon, is_non_terminal_name};
use std::fmt;

/// An ordered sequence of symbols forming one alternative of a rule. A
/// production with exactly one element, the empty string, is the
/// ε-production; a production with exactly one non-terminal element is a
/// unit production.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Production(Vec<String>);

impl Production {
    pub fn new(symbols: Vec<String>) -> Self {
        Self(symbols)
    }

    pub fn epsilon() -> Self {
        Self(vec![String::new()])
    }

    pub fn symbols(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty_symbols(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_epsilon(&self) -> bool {
        self.0.len() == 1 && is_epsilon(&self.0[0])
    }

    pub fn is_unit(&self) -> bool {
        self.0.len() == 1 && is_non_terminal_name(&self.0[0])
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_epsilon() {
            write!(f, "\u{3b5}")
        } else {
            write!(f, "{}", self.0.join(" "))
        }
    }
}

/// A non-terminal (the head) and its ordered, priority-significant
/// alternatives.
#[derive(Debug, Clone, Default)]
pub struct Rule {
    pub(crate) head: String,
    pub(crate) alternatives: Vec<Production>,
}

impl Rule {
    pub fn new(head: impl Into<String>) -> Self {
        Self {
            head: head.into(),
            alternatives: Vec::new(),
        }
    }

    pub fn head(&self) -> &str {
        &self.head
    }

    pub fn alternatives(&self) -> &[Production] {
        &self.alternatives
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epsilon_and_unit_detection() {
        assert!(Production::epsilon().is_epsilon());
        let unit = Production::new(vec!["EXPR".to_string()]);
        assert!(unit.is_unit());
        assert!(!unit.is_epsilon());
        let normal = Production::new(vec!["id".to_string(), "PLUS".to_string()]);
        assert!(!normal.is_unit());
    }
}
