//! Concrete parse trees and their annotated form (C7): a tagged-sum node
//! (terminal leaf vs. interior), an ASCII pretty-printer, and node-ID /
//! attribute annotation.

use ictiobus_lexan::{Location, Token};
use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalNode {
    pub class: String,
    pub lexeme: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteriorNode {
    pub head: String,
    pub children: Vec<ParseNode>,
}

/// Either a terminal leaf carrying its source token, or an interior node
/// carrying its head non-terminal and ordered children. The ε-leaf is
/// represented as a `Terminal` with an empty class and lexeme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseNode {
    Terminal(TerminalNode),
    Interior(InteriorNode),
}

impl ParseNode {
    pub fn terminal(token: &Token<String>) -> Self {
        ParseNode::Terminal(TerminalNode {
            class: token.class().clone(),
            lexeme: token.lexeme().to_string(),
            location: token.location().clone(),
        })
    }

    pub fn epsilon() -> Self {
        ParseNode::Terminal(TerminalNode { class: String::new(), lexeme: String::new(), location: Location::unknown() })
    }

    pub fn interior(head: &str, children: Vec<ParseNode>) -> Self {
        ParseNode::Interior(InteriorNode { head: head.to_string(), children })
    }

    pub fn is_epsilon(&self) -> bool {
        matches!(self, ParseNode::Terminal(t) if t.class.is_empty())
    }

    /// The left-to-right sequence of non-ε terminal leaves (invariant 2 of
    /// §8: equals the input token stream with the trailing `$` omitted).
    pub fn leaves(&self) -> Vec<&TerminalNode> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a TerminalNode>) {
        match self {
            ParseNode::Terminal(t) => {
                if !t.class.is_empty() {
                    out.push(t);
                }
            }
            ParseNode::Interior(i) => {
                for child in &i.children {
                    child.collect_leaves(out);
                }
            }
        }
    }

    /// ASCII-tree rendering (§4.6): depth-first, last child prefixed with
    /// `\---:`, others with `|---:`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, "", true);
        out
    }

    fn render_into(&self, out: &mut String, prefix: &str, is_root: bool) {
        match self {
            ParseNode::Terminal(t) => {
                if t.class.is_empty() {
                    out.push_str("\u{3b5}\n");
                } else {
                    out.push_str(&format!("{}[{}]\n", t.class, t.lexeme));
                }
            }
            ParseNode::Interior(i) => {
                out.push_str(&i.head);
                out.push('\n');
                let n = i.children.len();
                for (idx, child) in i.children.iter().enumerate() {
                    let is_last = idx + 1 == n;
                    out.push_str(prefix);
                    out.push_str(if is_last { "\\---:" } else { "|---:" });
                    let child_prefix =
                        if is_last { format!("{}        ", prefix) } else { format!("{}|   ", prefix) };
                    child.render_into(out, &child_prefix, false);
                }
            }
        }
        let _ = is_root;
    }

    /// Structural equality defined as equal renderings (§4.6/§8 invariant 7).
    pub fn equal(&self, other: &ParseNode) -> bool {
        self.render() == other.render()
    }
}

impl fmt::Display for ParseNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum NodeRelation {
    Head,
    Symbol(usize),
    Terminal(usize),
    NonTerminal(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct AttrRef {
    pub relation: NodeRelation,
    pub attribute: String,
}

impl AttrRef {
    pub fn new(relation: NodeRelation, attribute: impl Into<String>) -> Self {
        Self { relation, attribute: attribute.into() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Str(String),
    Int(i64),
    Bool(bool),
    List(Vec<AttrValue>),
    Map(BTreeMap<String, AttrValue>),
}

/// A parse-tree node plus a non-zero 64-bit ID and a bag of named
/// attribute values. `$id` and (for terminals) `$text` are auto-attributes
/// populated by `AnnotatedTree::from_parse_tree`.
#[derive(Debug, Clone)]
pub struct AnnotatedNode {
    pub id: u64,
    pub head: Option<String>,
    pub terminal: Option<TerminalNode>,
    pub children: Vec<AnnotatedNode>,
    pub attributes: BTreeMap<String, AttrValue>,
}

impl AnnotatedNode {
    pub fn is_terminal(&self) -> bool {
        self.terminal.is_some()
    }

    pub fn symbol(&self) -> &str {
        self.head.as_deref().or(self.terminal.as_ref().map(|t| t.class.as_str())).unwrap_or("")
    }
}

/// An annotated parse tree: node IDs are assigned by a per-tree counter
/// (never a process-global), per the §9 redesign note.
#[derive(Debug)]
pub struct AnnotatedTree {
    pub root: AnnotatedNode,
    next_id: Cell<u64>,
}

impl AnnotatedTree {
    pub fn from_parse_tree(tree: &ParseNode) -> Self {
        let next_id = Cell::new(1);
        let root = Self::annotate(tree, &next_id);
        Self { root, next_id }
    }

    fn annotate(node: &ParseNode, next_id: &Cell<u64>) -> AnnotatedNode {
        let id = next_id.get();
        next_id.set(id + 1);
        let mut attributes = BTreeMap::new();
        attributes.insert("$id".to_string(), AttrValue::Int(id as i64));
        match node {
            ParseNode::Terminal(t) => {
                attributes.insert("$text".to_string(), AttrValue::Str(t.lexeme.clone()));
                AnnotatedNode { id, head: None, terminal: Some(t.clone()), children: Vec::new(), attributes }
            }
            ParseNode::Interior(i) => {
                let children = i.children.iter().map(|c| Self::annotate(c, next_id)).collect();
                AnnotatedNode { id, head: Some(i.head.clone()), terminal: None, children, attributes }
            }
        }
    }

    pub fn find_mut(&mut self, id: u64) -> Option<&mut AnnotatedNode> {
        fn search(node: &mut AnnotatedNode, id: u64) -> Option<&mut AnnotatedNode> {
            if node.id == id {
                return Some(node);
            }
            for child in &mut node.children {
                if let Some(found) = search(child, id) {
                    return Some(found);
                }
            }
            None
        }
        search(&mut self.root, id)
    }

    pub fn find(&self, id: u64) -> Option<&AnnotatedNode> {
        fn search(node: &AnnotatedNode, id: u64) -> Option<&AnnotatedNode> {
            if node.id == id {
                return Some(node);
            }
            node.children.iter().find_map(|c| search(c, id))
        }
        search(&self.root, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ictiobus_lexan::Location;

    fn tok(class: &str, lexeme: &str) -> Token<String> {
        Token::new(lexeme, class.to_string(), Location::unknown())
    }

    #[test]
    fn leaves_skip_epsilon_and_preserve_order() {
        let tree = ParseNode::interior(
            "S",
            vec![ParseNode::terminal(&tok("id", "x")), ParseNode::epsilon(), ParseNode::terminal(&tok("plus", "+"))],
        );
        let rendered: Vec<&str> = tree.leaves().iter().map(|t| t.class.as_str()).collect();
        assert_eq!(rendered, vec!["id", "plus"]);
    }

    #[test]
    fn equal_trees_have_equal_renderings() {
        let a = ParseNode::interior("S", vec![ParseNode::terminal(&tok("id", "x"))]);
        let b = ParseNode::interior("S", vec![ParseNode::terminal(&tok("id", "x"))]);
        let c = ParseNode::interior("S", vec![ParseNode::terminal(&tok("id", "y"))]);
        assert!(a.equal(&b));
        assert!(!a.equal(&c));
    }

    #[test]
    fn annotate_assigns_unique_non_zero_ids_and_text() {
        let tree = ParseNode::interior(
            "S",
            vec![ParseNode::terminal(&tok("id", "x")), ParseNode::terminal(&tok("plus", "+"))],
        );
        let annotated = AnnotatedTree::from_parse_tree(&tree);
        let mut ids = Vec::new();
        fn collect(node: &AnnotatedNode, ids: &mut Vec<u64>) {
            ids.push(node.id);
            for c in &node.children {
                collect(c, ids);
            }
        }
        collect(&annotated.root, &mut ids);
        assert!(ids.iter().all(|&id| id != 0));
        let unique: std::collections::BTreeSet<u64> = ids.iter().cloned().collect();
        assert_eq!(unique.len(), ids.len());
        let child = &annotated.root.children[0];
        assert_eq!(child.attributes.get("$text"), Some(&AttrValue::Str("x".to_string())));
    }
}
