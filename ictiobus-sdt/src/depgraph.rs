//! Dependency-graph construction over an annotated parse tree (C8): one
//! preorder walk creates a graph node per `(tree-node-id, attribute)` pair
//! that a binding reads or writes, with an edge from each requirement to
//! the destination it feeds.

use crate::binding::SDD;
use crate::error::SdtError;
use ictiobus_collections::{DirectedGraph, NodeId};
use ictiobus_parse::{AnnotatedNode, NodeRelation};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct DepNode {
    pub tree_node_id: u64,
    pub attribute: String,
}

/// Identifies the binding responsible for writing a destination graph node:
/// which rule it belongs to, which node invoked it (the parent, for an
/// inherited binding; the node itself, for a synthesised one), and its
/// position in that rule's binding list.
#[derive(Debug, Clone)]
pub struct Owner {
    pub invocation_node_id: u64,
    pub head: String,
    pub production: Vec<String>,
    pub binding_index: usize,
}

pub struct DepGraph {
    pub graph: DirectedGraph<DepNode>,
    pub owners: BTreeMap<NodeId, Owner>,
    index: BTreeMap<(u64, String), NodeId>,
}

pub fn resolve_relation<'a>(node: &'a AnnotatedNode, relation: &NodeRelation) -> Option<&'a AnnotatedNode> {
    match relation {
        NodeRelation::Head => Some(node),
        NodeRelation::Symbol(i) => node.children.get(*i),
        NodeRelation::Terminal(i) => node.children.iter().filter(|c| c.is_terminal()).nth(*i),
        NodeRelation::NonTerminal(i) => node.children.iter().filter(|c| !c.is_terminal()).nth(*i),
    }
}

impl DepGraph {
    pub fn build(sdd: &SDD, root: &AnnotatedNode) -> Result<Self, SdtError> {
        let mut graph = DirectedGraph::new();
        let mut index = BTreeMap::new();
        let mut owners = BTreeMap::new();
        visit(root, sdd, &mut graph, &mut index, &mut owners)?;
        Ok(Self { graph, owners, index })
    }

    pub fn node_for(&self, tree_node_id: u64, attribute: &str) -> Option<NodeId> {
        self.index.get(&(tree_node_id, attribute.to_string())).copied()
    }
}

fn get_or_create(
    graph: &mut DirectedGraph<DepNode>,
    index: &mut BTreeMap<(u64, String), NodeId>,
    tree_node_id: u64,
    attribute: &str,
) -> NodeId {
    *index
        .entry((tree_node_id, attribute.to_string()))
        .or_insert_with(|| graph.add_node(DepNode { tree_node_id, attribute: attribute.to_string() }))
}

fn visit(
    node: &AnnotatedNode,
    sdd: &SDD,
    graph: &mut DirectedGraph<DepNode>,
    index: &mut BTreeMap<(u64, String), NodeId>,
    owners: &mut BTreeMap<NodeId, Owner>,
) -> Result<(), SdtError> {
    if node.id == 0 {
        return Err(SdtError::IdNotSet);
    }
    if let Some(head) = &node.head {
        let production: Vec<String> = node.children.iter().map(|c| c.symbol().to_string()).collect();
        if let Some(bindings) = sdd.bindings_for(head, &production) {
            for (binding_index, binding) in bindings.iter().enumerate() {
                let dest_node = resolve_relation(node, &binding.dest.relation).ok_or_else(|| {
                    SdtError::EvaluatorInvariant(format!(
                        "binding destination {:?} does not resolve on node {}",
                        binding.dest.relation, node.id
                    ))
                })?;
                if dest_node.id == 0 {
                    return Err(SdtError::IdNotSet);
                }
                let dest_key = get_or_create(graph, index, dest_node.id, &binding.dest.attribute);
                owners.insert(
                    dest_key,
                    Owner {
                        invocation_node_id: node.id,
                        head: head.clone(),
                        production: production.clone(),
                        binding_index,
                    },
                );
                for dep in &binding.requires {
                    let dep_node = resolve_relation(node, &dep.relation).ok_or_else(|| {
                        SdtError::EvaluatorInvariant(format!(
                            "requirement {:?} does not resolve on node {}",
                            dep.relation, node.id
                        ))
                    })?;
                    if dep_node.id == 0 {
                        return Err(SdtError::IdNotSet);
                    }
                    let dep_key = get_or_create(graph, index, dep_node.id, &dep.attribute);
                    graph.link_to(dep_key, dest_key);
                }
            }
        }
    }
    for child in &node.children {
        visit(child, sdd, graph, index, owners)?;
    }
    Ok(())
}
