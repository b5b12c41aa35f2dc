//! Collections shared by the rest of the toolkit (C1): a plain stack, an
//! insertion-ordered set/map pair, a 2D matrix, and a directed graph with
//! cycle detection and Kahn's topological sort.

mod graph;
mod matrix;
mod ordered;
mod stack;

pub use graph::{DirectedGraph, GraphError, NodeId};
pub use matrix::Matrix2D;
pub use ordered::{OrderedMap, OrderedSet};
pub use stack::Stack;
