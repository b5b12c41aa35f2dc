//! Table-driven LL(1) and shift-reduce parsers producing parse trees, plus
//! the parse-tree/annotated-tree representation (C6/C7).

pub mod ll1;
pub mod shift_reduce;
pub mod tree;

pub use ll1::Ll1Parser;
pub use shift_reduce::ShiftReduceParser;
pub use tree::{AnnotatedNode, AnnotatedTree, AttrRef, AttrValue, InteriorNode, NodeRelation, ParseNode, TerminalNode};
