//! Fetched-ontology contract model
//!
//! The RDF/XML ingestion itself lives outside this crate; an external
//! fetcher hands over, per class, its preferred label, synonyms, parent ids,
//! and any `has_member` boolean axiom with RDF list structures already
//! flattened into the `Expr` tree below. Everything here derives serde so a
//! fetched graph can be snapshotted to disk.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A boolean class expression under a `has_member` restriction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    /// A bare class iri/id.
    Class(String),
    /// `someValuesFrom`.
    SomeValuesFrom(Box<Expr>),
    /// `intersectionOf` over flattened list members.
    IntersectionOf(Vec<Expr>),
    /// `unionOf` over flattened list members.
    UnionOf(Vec<Expr>),
    /// `complementOf`.
    ComplementOf(Box<Expr>),
    /// `qualifiedCardinality n` with the target under `onClass`.
    Exactly(u32, Box<Expr>),
    /// `minQualifiedCardinality n`.
    AtLeast(u32, Box<Expr>),
    /// `maxQualifiedCardinality n`.
    AtMost(u32, Box<Expr>),
}

/// One ontology class as delivered by the fetcher.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OntologyClass {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub parents: Vec<String>,
    /// The class's `equivalentClass has_member` axiom, if any.
    #[serde(default)]
    pub axiom: Option<Expr>,
}

/// The fetched class graph, keyed by class id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OntologyGraph {
    pub classes: FxHashMap<String, OntologyClass>,
}

impl OntologyGraph {
    pub fn get(&self, id: &str) -> Option<&OntologyClass> {
        self.classes.get(id)
    }

    pub fn insert(&mut self, class: OntologyClass) {
        self.classes.insert(class.id.clone(), class);
    }

    /// All transitive subclasses of `root`, excluding `root` itself.
    /// Order is deterministic (sorted by id) so downstream rule compilation
    /// is stable across runs.
    pub fn subclasses_of(&self, root: &str) -> Vec<&OntologyClass> {
        let mut below: Vec<&OntologyClass> = self
            .classes
            .values()
            .filter(|c| c.id != root && self.is_descendant(&c.id, root))
            .collect();
        below.sort_by(|a, b| a.id.cmp(&b.id));
        below
    }

    fn is_descendant(&self, id: &str, root: &str) -> bool {
        let mut stack: Vec<&str> = vec![id];
        let mut seen = rustc_hash::FxHashSet::default();
        while let Some(node) = stack.pop() {
            if !seen.insert(node.to_string()) {
                continue;
            }
            if let Some(class) = self.classes.get(node) {
                for parent in &class.parents {
                    if parent == root {
                        return true;
                    }
                    stack.push(parent);
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(id: &str, parents: &[&str]) -> OntologyClass {
        OntologyClass {
            id: id.to_string(),
            label: id.replace('_', " "),
            parents: parents.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_subclasses_transitive() {
        let mut graph = OntologyGraph::default();
        graph.insert(class("root", &[]));
        graph.insert(class("a", &["root"]));
        graph.insert(class("b", &["a"]));
        graph.insert(class("other", &[]));

        let below: Vec<&str> = graph
            .subclasses_of("root")
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(below, vec!["a", "b"]);
    }

    #[test]
    fn test_expr_serde_round_trip() {
        let expr = Expr::IntersectionOf(vec![
            Expr::Class("foodon_1".to_string()),
            Expr::ComplementOf(Box::new(Expr::Class("foodon_2".to_string()))),
        ]);
        let json = serde_json::to_string(&expr).unwrap();
        let back: Expr = serde_json::from_str(&json).unwrap();
        assert_eq!(expr, back);
    }
}
