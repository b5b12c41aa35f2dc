use std::fmt;

/// Errors raised by binding registration and SDT evaluation (C8).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdtError {
    /// A binding's destination or a requirement does not match the rule it
    /// was declared against -- raised at `bind_*` time.
    Misbinding(String),
    /// The dependency graph has a cycle over this tree.
    Circular,
    /// The dependency graph is not a single connected component.
    Disconnected,
    /// An attribute a setter asked for was not yet defined at evaluation
    /// time; indicates the dependency graph was built incorrectly.
    EvaluatorInvariant(String),
    /// A tree node carried ID zero, which is reserved for "not annotated".
    IdNotSet,
    /// Raised by a user-supplied setter.
    Setter(String),
}

impl fmt::Display for SdtError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SdtError::Misbinding(msg) => write!(f, "misbound SDD binding: {msg}"),
            SdtError::Circular => write!(f, "dependency graph has a cycle"),
            SdtError::Disconnected => write!(f, "dependency graph is not a single connected component"),
            SdtError::EvaluatorInvariant(msg) => write!(f, "evaluator invariant violated: {msg}"),
            SdtError::IdNotSet => write!(f, "tree node has no assigned ID"),
            SdtError::Setter(msg) => write!(f, "setter failed: {msg}"),
        }
    }
}

impl std::error::Error for SdtError {}
