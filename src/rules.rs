//! Bucket membership rule trees and their evaluator
//!
//! A compiled rule is a recursive boolean expression over resource ids.
//! Evaluation against a candidate set returns the satisfying subset rather
//! than a bare boolean, so diagnostics can report which evidence triggered
//! which bucket. The distinguished `None` result means the rule failed; a
//! satisfied complement contributes the `Satisfied` sentinel.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// A compiled bucket membership rule. Immutable once built; serializes to
/// JSON for the on-disk rule cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleTree {
    /// A single resource id that must be present.
    Leaf(String),
    /// At least one child evaluates non-FALSE; yields the union of the
    /// surviving children. `unionOf` axioms compile to a multi-child Some.
    Some(Vec<RuleTree>),
    /// Every child must evaluate non-FALSE; yields the union.
    All(Vec<RuleTree>),
    /// The child must evaluate FALSE.
    None(Box<RuleTree>),
    /// The child's evidence must have exactly n elements.
    Exact(u32, Box<RuleTree>),
    /// At least n elements.
    Min(u32, Box<RuleTree>),
    /// At most n elements.
    Max(u32, Box<RuleTree>),
}

/// One piece of evidence that a rule was satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Evidence {
    /// A candidate-set member that the rule required.
    Id(String),
    /// A complement that held vacuously (nothing forbidden was present).
    Satisfied,
}

/// Evaluate `rule` against the candidate set. `None` is the FALSE result;
/// any `Some(..)` set means the bucket is triggered.
pub fn evaluate(rule: &RuleTree, candidates: &FxHashSet<String>) -> Option<FxHashSet<Evidence>> {
    match rule {
        RuleTree::Leaf(id) => {
            if candidates.contains(id) {
                let mut set = FxHashSet::default();
                set.insert(Evidence::Id(id.clone()));
                Some(set)
            } else {
                None
            }
        }
        RuleTree::Some(children) => {
            let mut union = FxHashSet::default();
            let mut any = false;
            for child in children {
                if let Some(result) = evaluate(child, candidates) {
                    union.extend(result);
                    any = true;
                }
            }
            if any && !union.is_empty() {
                Some(union)
            } else {
                None
            }
        }
        RuleTree::All(children) => {
            let mut union = FxHashSet::default();
            for child in children {
                union.extend(evaluate(child, candidates)?);
            }
            Some(union)
        }
        RuleTree::None(child) => {
            if evaluate(child, candidates).is_none() {
                let mut set = FxHashSet::default();
                set.insert(Evidence::Satisfied);
                Some(set)
            } else {
                None
            }
        }
        RuleTree::Exact(n, child) => {
            let result = evaluate(child, candidates)?;
            (result.len() as u32 == *n).then_some(result)
        }
        RuleTree::Min(n, child) => {
            let result = evaluate(child, candidates)?;
            (result.len() as u32 >= *n).then_some(result)
        }
        RuleTree::Max(n, child) => {
            let result = evaluate(child, candidates)?;
            (result.len() as u32 <= *n).then_some(result)
        }
    }
}
