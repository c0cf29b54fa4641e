//! Parent DAG and root-ward hierarchy enumeration
//!
//! The ontology's subclass graph allows multiple parents, so a resource can
//! reach a root along several distinct paths. Bucket classification depends
//! on reaching specific ancestors, so every path is enumerated rather than
//! collapsing the DAG to a tree.

use crate::error::MapError;
use crate::lexicon::read_rows;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use std::path::Path;
use tracing::info;

/// Adjacency from resource id to its ordered parent ids.
#[derive(Debug, Clone, Default)]
pub struct ParentIndex {
    parents: FxHashMap<String, Vec<String>>,
}

impl ParentIndex {
    /// Build from `(child, parent)` pairs. A child appearing on several
    /// rows accumulates parents in row order. Self-loops and cycles are
    /// rejected.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, MapError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut parents: FxHashMap<String, Vec<String>> = FxHashMap::default();
        for (child, parent) in pairs {
            if parent.is_empty() {
                continue;
            }
            if child == parent {
                return Err(MapError::CycleDetected(child));
            }
            let list = parents.entry(child).or_default();
            if !list.contains(&parent) {
                list.push(parent);
            }
        }
        let index = ParentIndex { parents };
        index.check_acyclic()?;
        info!(nodes = index.parents.len(), "built parent index");
        Ok(index)
    }

    /// Load from a `child,parent` CSV file.
    pub fn from_file(path: &Path) -> Result<Self, MapError> {
        Self::from_pairs(read_rows(path)?)
    }

    pub fn parents_of(&self, id: &str) -> &[String] {
        self.parents.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.parents.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.parents.keys().map(String::as_str)
    }

    /// All root-ward chains starting at `id`. Each chain begins with `id`
    /// and ends at a node with no parent in the index. A node with k
    /// parents splits its chain into k chains.
    pub fn hierarchies(&self, id: &str) -> Vec<Vec<String>> {
        let mut finished = Vec::new();
        let mut frontier: VecDeque<Vec<String>> = VecDeque::new();
        frontier.push_back(vec![id.to_string()]);

        while let Some(chain) = frontier.pop_front() {
            let last = chain.last().expect("chains are never empty");
            let parents = self.parents_of(last);
            if parents.is_empty() {
                finished.push(chain);
                continue;
            }
            for parent in parents {
                let mut extended = chain.clone();
                extended.push(parent.clone());
                frontier.push_back(extended);
            }
        }

        finished
    }

    /// Every ancestor of `id` (excluding `id` itself).
    pub fn ancestors(&self, id: &str) -> FxHashSet<String> {
        let mut seen = FxHashSet::default();
        let mut stack: Vec<&str> = self.parents_of(id).iter().map(String::as_str).collect();
        while let Some(node) = stack.pop() {
            if seen.insert(node.to_string()) {
                stack.extend(self.parents_of(node).iter().map(String::as_str));
            }
        }
        seen
    }

    /// Depth-first three-color check over the whole index.
    fn check_acyclic(&self) -> Result<(), MapError> {
        const WHITE: u8 = 0;
        const GRAY: u8 = 1;
        const BLACK: u8 = 2;

        let mut color: FxHashMap<&str, u8> = FxHashMap::default();
        for start in self.parents.keys() {
            if color.get(start.as_str()).copied().unwrap_or(WHITE) != WHITE {
                continue;
            }
            // iterative DFS with an explicit exit marker per node
            let mut stack: Vec<(&str, bool)> = vec![(start.as_str(), false)];
            while let Some((node, exiting)) = stack.pop() {
                if exiting {
                    color.insert(node, BLACK);
                    continue;
                }
                match color.get(node).copied().unwrap_or(WHITE) {
                    BLACK => continue,
                    GRAY => return Err(MapError::CycleDetected(node.to_string())),
                    _ => {}
                }
                color.insert(node, GRAY);
                stack.push((node, true));
                for parent in self.parents_of(node) {
                    match color.get(parent.as_str()).copied().unwrap_or(WHITE) {
                        GRAY => return Err(MapError::CycleDetected(parent.clone())),
                        WHITE => stack.push((parent.as_str(), false)),
                        _ => {}
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(rows: &[(&str, &str)]) -> Vec<(String, String)> {
        rows.iter()
            .map(|(c, p)| (c.to_string(), p.to_string()))
            .collect()
    }

    #[test]
    fn test_single_chain() {
        let index = ParentIndex::from_pairs(pairs(&[
            ("turkey", "poultry"),
            ("poultry", "meat"),
            ("meat", "food"),
        ]))
        .unwrap();

        let chains = index.hierarchies("turkey");
        assert_eq!(chains, vec![vec!["turkey", "poultry", "meat", "food"]]);
    }

    #[test]
    fn test_multi_parent_splits_chains() {
        let index = ParentIndex::from_pairs(pairs(&[
            ("egg yolk", "egg"),
            ("egg yolk", "animal product"),
            ("egg", "food"),
            ("animal product", "food"),
        ]))
        .unwrap();

        let chains = index.hierarchies("egg yolk");
        assert_eq!(chains.len(), 2);
        assert!(chains.contains(&vec![
            "egg yolk".to_string(),
            "egg".to_string(),
            "food".to_string()
        ]));
        assert!(chains.contains(&vec![
            "egg yolk".to_string(),
            "animal product".to_string(),
            "food".to_string()
        ]));
    }

    #[test]
    fn test_chains_start_with_query_id() {
        let index = ParentIndex::from_pairs(pairs(&[("a", "b"), ("b", "c")])).unwrap();
        for id in ["a", "b"] {
            for chain in index.hierarchies(id) {
                assert_eq!(chain[0], id);
            }
        }
    }

    #[test]
    fn test_unknown_id_is_its_own_root() {
        let index = ParentIndex::from_pairs(pairs(&[("a", "b")])).unwrap();
        assert_eq!(index.hierarchies("zzz"), vec![vec!["zzz".to_string()]]);
    }

    #[test]
    fn test_ancestors() {
        let index = ParentIndex::from_pairs(pairs(&[
            ("a", "b"),
            ("a", "c"),
            ("b", "d"),
            ("c", "d"),
        ]))
        .unwrap();
        let ancestors = index.ancestors("a");
        assert_eq!(ancestors.len(), 3);
        assert!(ancestors.contains("d"));
        assert!(!ancestors.contains("a"));
    }

    #[test]
    fn test_self_loop_rejected() {
        let err = ParentIndex::from_pairs(pairs(&[("a", "a")])).unwrap_err();
        assert!(matches!(err, MapError::CycleDetected(_)));
    }

    #[test]
    fn test_cycle_rejected() {
        let err =
            ParentIndex::from_pairs(pairs(&[("a", "b"), ("b", "c"), ("c", "a")])).unwrap_err();
        assert!(matches!(err, MapError::CycleDetected(_)));
    }

    #[test]
    fn test_empty_parent_rows_skipped() {
        let index = ParentIndex::from_pairs(pairs(&[("a", "b"), ("b", "")])).unwrap();
        assert_eq!(index.parents_of("b"), &[] as &[String]);
    }
}
