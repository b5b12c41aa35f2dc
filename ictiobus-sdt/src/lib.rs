//! Syntax-directed translation (C8): attribute binding registration,
//! dependency-graph construction over an annotated parse tree, and
//! Kahn-ordered evaluation.

pub mod binding;
pub mod depgraph;
pub mod error;
pub mod eval;

pub use binding::{valid_for, SDDBinding, Setter, SDD};
pub use depgraph::{DepGraph, DepNode, Owner};
pub use error::SdtError;
pub use eval::evaluate;
