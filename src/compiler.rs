//! Bucket rule compilation
//!
//! Walks every subclass of a scheme's root class and lowers its
//! `has_member` axiom expression into an immutable `RuleTree`. The
//! compiled map is what the evaluator runs and what the disk cache stores.

use crate::ontology::{Expr, OntologyGraph};
use crate::rules::RuleTree;
use rustc_hash::FxHashMap;
use tracing::debug;

/// Compile the rule tree for every subclass of `root` that carries an
/// axiom. Returns bucket-id -> rule.
pub fn compile_buckets(graph: &OntologyGraph, root: &str) -> FxHashMap<String, RuleTree> {
    let mut rules = FxHashMap::default();
    for class in graph.subclasses_of(root) {
        if let Some(axiom) = &class.axiom {
            let rule = compile_expr(axiom);
            debug!(bucket = %class.id, "compiled bucket rule");
            rules.insert(class.id.clone(), rule);
        }
    }
    rules
}

/// Compile every class in the graph that carries an axiom, for configs
/// that name an ontology without a root class.
pub fn compile_all(graph: &OntologyGraph) -> FxHashMap<String, RuleTree> {
    let mut rules = FxHashMap::default();
    for class in graph.classes.values() {
        if let Some(axiom) = &class.axiom {
            rules.insert(class.id.clone(), compile_expr(axiom));
        }
    }
    rules
}

/// Lower one axiom expression to a rule node.
///
/// `unionOf` compiles to a multi-child `Some`: the union's contribution is
/// its intersection with the candidate set, which is exactly what `Some`
/// yields over the members.
pub fn compile_expr(expr: &Expr) -> RuleTree {
    match expr {
        Expr::Class(id) => RuleTree::Leaf(id.clone()),
        Expr::SomeValuesFrom(inner) => RuleTree::Some(vec![compile_expr(inner)]),
        Expr::IntersectionOf(members) => {
            RuleTree::All(members.iter().map(compile_expr).collect())
        }
        Expr::UnionOf(members) => RuleTree::Some(members.iter().map(compile_expr).collect()),
        Expr::ComplementOf(inner) => RuleTree::None(Box::new(compile_expr(inner))),
        Expr::Exactly(n, inner) => RuleTree::Exact(*n, Box::new(compile_expr(inner))),
        Expr::AtLeast(n, inner) => RuleTree::Min(*n, Box::new(compile_expr(inner))),
        Expr::AtMost(n, inner) => RuleTree::Max(*n, Box::new(compile_expr(inner))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::OntologyClass;
    use crate::rules::{evaluate, Evidence};
    use rustc_hash::FxHashSet;

    #[test]
    fn test_compile_expr_shapes() {
        let expr = Expr::SomeValuesFrom(Box::new(Expr::IntersectionOf(vec![
            Expr::Class("a".to_string()),
            Expr::UnionOf(vec![Expr::Class("b".to_string()), Expr::Class("c".to_string())]),
            Expr::ComplementOf(Box::new(Expr::Class("d".to_string()))),
        ])));

        let rule = compile_expr(&expr);
        let expected = RuleTree::Some(vec![RuleTree::All(vec![
            RuleTree::Leaf("a".to_string()),
            RuleTree::Some(vec![
                RuleTree::Leaf("b".to_string()),
                RuleTree::Leaf("c".to_string()),
            ]),
            RuleTree::None(Box::new(RuleTree::Leaf("d".to_string()))),
        ])]);
        assert_eq!(rule, expected);
    }

    #[test]
    fn test_compile_cardinality() {
        let expr = Expr::Exactly(2, Box::new(Expr::Class("a".to_string())));
        assert_eq!(
            compile_expr(&expr),
            RuleTree::Exact(2, Box::new(RuleTree::Leaf("a".to_string())))
        );
        let expr = Expr::AtLeast(1, Box::new(Expr::Class("a".to_string())));
        assert!(matches!(compile_expr(&expr), RuleTree::Min(1, _)));
        let expr = Expr::AtMost(3, Box::new(Expr::Class("a".to_string())));
        assert!(matches!(compile_expr(&expr), RuleTree::Max(3, _)));
    }

    #[test]
    fn test_compile_buckets_under_root() {
        let mut graph = OntologyGraph::default();
        graph.insert(OntologyClass {
            id: "scheme_root".to_string(),
            label: "narms buckets".to_string(),
            ..Default::default()
        });
        graph.insert(OntologyClass {
            id: "lexmapr_0000073".to_string(),
            label: "turkey bucket".to_string(),
            parents: vec!["scheme_root".to_string()],
            axiom: Some(Expr::SomeValuesFrom(Box::new(Expr::Class(
                "foodon_03411347".to_string(),
            )))),
            ..Default::default()
        });
        // subclass with no axiom compiles to nothing
        graph.insert(OntologyClass {
            id: "lexmapr_0000099".to_string(),
            label: "plain bucket".to_string(),
            parents: vec!["scheme_root".to_string()],
            ..Default::default()
        });
        // class outside the root is ignored
        graph.insert(OntologyClass {
            id: "stranger".to_string(),
            label: "stranger".to_string(),
            axiom: Some(Expr::Class("x".to_string())),
            ..Default::default()
        });

        let rules = compile_buckets(&graph, "scheme_root");
        assert_eq!(rules.len(), 1);

        let candidates: FxHashSet<String> =
            ["foodon_03411347".to_string()].into_iter().collect();
        let evidence = evaluate(&rules["lexmapr_0000073"], &candidates).unwrap();
        assert!(evidence.contains(&Evidence::Id("foodon_03411347".to_string())));
    }
}
