//! SDT evaluation (C8): Kahn-sort the dependency graph built by
//! [`crate::depgraph`] and invoke each destination's binding in that order.

use crate::binding::SDD;
use crate::depgraph::{resolve_relation, DepGraph};
use crate::error::SdtError;
use ictiobus_parse::{AnnotatedTree, AttrRef, AttrValue};

pub fn evaluate(sdd: &SDD, tree: &mut AnnotatedTree, wanted: &[AttrRef]) -> Result<Vec<AttrValue>, SdtError> {
    let dep_graph = DepGraph::build(sdd, &tree.root)?;

    let components = dep_graph.graph.weak_components();
    if dep_graph.graph.len() > 0 && components.len() > 1 {
        return Err(SdtError::Disconnected);
    }

    let order = dep_graph.graph.kahn_sort().map_err(|_| SdtError::Circular)?;

    for node_id in order {
        let Some(owner) = dep_graph.owners.get(&node_id) else {
            continue;
        };
        let dep = dep_graph.graph.data(node_id).clone();
        let binding = sdd
            .bindings_for(&owner.head, &owner.production)
            .and_then(|bindings| bindings.get(owner.binding_index))
            .ok_or_else(|| SdtError::EvaluatorInvariant("owner references a binding that no longer exists".to_string()))?;

        let invocation = tree
            .find(owner.invocation_node_id)
            .ok_or_else(|| SdtError::EvaluatorInvariant("invocation node missing from tree".to_string()))?;

        let mut args = Vec::with_capacity(binding.requires.len());
        for req in &binding.requires {
            let src = resolve_relation(invocation, &req.relation).ok_or_else(|| {
                SdtError::EvaluatorInvariant(format!("requirement {:?} no longer resolves", req.relation))
            })?;
            let value = src.attributes.get(&req.attribute).cloned().ok_or_else(|| {
                SdtError::EvaluatorInvariant(format!(
                    "attribute '{}' was not yet defined on node {}",
                    req.attribute, src.id
                ))
            })?;
            args.push(value);
        }

        let target_symbol = tree
            .find(dep.tree_node_id)
            .ok_or_else(|| SdtError::EvaluatorInvariant("destination node missing from tree".to_string()))?
            .symbol()
            .to_string();

        let value = (binding.setter)(&target_symbol, &dep.attribute, &args)?;

        let target = tree
            .find_mut(dep.tree_node_id)
            .ok_or_else(|| SdtError::EvaluatorInvariant("destination node missing from tree".to_string()))?;
        target.attributes.insert(dep.attribute.clone(), value);
    }

    let mut out = Vec::with_capacity(wanted.len());
    for attr_ref in wanted {
        let node = resolve_relation(&tree.root, &attr_ref.relation)
            .ok_or_else(|| SdtError::EvaluatorInvariant(format!("requested relation {:?} does not resolve", attr_ref.relation)))?;
        let value = node.attributes.get(&attr_ref.attribute).cloned().ok_or_else(|| {
            SdtError::EvaluatorInvariant(format!("requested attribute '{}' was never set", attr_ref.attribute))
        })?;
        out.push(value);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::SDD;
    use ictiobus_lexan::{Location, Token};
    use ictiobus_parse::{AnnotatedTree, NodeRelation, ParseNode};

    fn tok(class: &str, lexeme: &str) -> Token<String> {
        Token::new(lexeme, class.to_string(), Location::unknown())
    }

    fn number_value(lexeme: &str) -> AttrValue {
        AttrValue::Int(lexeme.parse().unwrap())
    }

    /// E -> T plus T ; synthesised `val` on `E` sums the two `T` children's
    /// own `val`, each of which synthesises from its `number` leaf's `$text`.
    fn build_sdd() -> SDD {
        let mut sdd = SDD::new();
        sdd.bind_synthesised(
            "T",
            &["number"],
            "val",
            |_, _, args| match &args[0] {
                AttrValue::Str(s) => Ok(number_value(s)),
                _ => Err(SdtError::EvaluatorInvariant("expected string $text".to_string())),
            },
            vec![AttrRef::new(NodeRelation::Symbol(0), "$text")],
        )
        .unwrap();

        sdd.bind_synthesised(
            "E",
            &["T", "plus", "T"],
            "val",
            |_, _, args| match (&args[0], &args[1]) {
                (AttrValue::Int(a), AttrValue::Int(b)) => Ok(AttrValue::Int(a + b)),
                _ => Err(SdtError::EvaluatorInvariant("expected two ints".to_string())),
            },
            vec![AttrRef::new(NodeRelation::Symbol(0), "val"), AttrRef::new(NodeRelation::Symbol(2), "val")],
        )
        .unwrap();
        sdd
    }

    fn build_tree() -> AnnotatedTree {
        let tree = ParseNode::interior(
            "E",
            vec![
                ParseNode::interior("T", vec![ParseNode::terminal(&tok("number", "2"))]),
                ParseNode::terminal(&tok("plus", "+")),
                ParseNode::interior("T", vec![ParseNode::terminal(&tok("number", "3"))]),
            ],
        );
        AnnotatedTree::from_parse_tree(&tree)
    }

    #[test]
    fn evaluates_synthesised_attributes_bottom_up() {
        let sdd = build_sdd();
        let mut tree = build_tree();
        let result = evaluate(&sdd, &mut tree, &[AttrRef::new(NodeRelation::Head, "val")]).unwrap();
        assert_eq!(result, vec![AttrValue::Int(5)]);
    }

    #[test]
    fn tree_with_zero_id_is_rejected() {
        let sdd = build_sdd();
        let mut tree = build_tree();
        tree.root.children[0].id = 0;
        let err = evaluate(&sdd, &mut tree, &[AttrRef::new(NodeRelation::Head, "val")]).unwrap_err();
        assert_eq!(err, SdtError::IdNotSet);
    }
}
