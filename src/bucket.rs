//! Bucket schemes and parent-chain bucket lookup
//!
//! A bucket scheme maps agency bucket labels to bucket class ids. A matched
//! resource is classified by walking its root-ward hierarchies and taking
//! the deepest ancestor that is a bucket (bucket level 1 is the match
//! itself, increasing toward the roots).

use crate::error::MapError;
use crate::hierarchy::ParentIndex;
use crate::lexicon::read_rows;
use crate::normalize::singularize;
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::Path;

/// One scheme's bucket-label -> bucket-id mapping.
#[derive(Debug, Clone, Default)]
pub struct BucketScheme {
    label_to_id: FxHashMap<String, String>,
    ids: FxHashSet<String>,
}

impl BucketScheme {
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut scheme = BucketScheme::default();
        for (label, id) in pairs {
            if id.is_empty() {
                continue;
            }
            scheme.ids.insert(id.clone());
            scheme.label_to_id.insert(label, id);
        }
        scheme
    }

    /// Load from a `label,id` CSV file.
    pub fn from_file(path: &Path) -> Result<Self, MapError> {
        Ok(Self::from_pairs(read_rows(path)?))
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn id_for_label(&self, label: &str) -> Option<&str> {
        self.label_to_id.get(label).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// For each matched resource, find the buckets at the lowest bucket level
/// reachable along any of its hierarchies. Returns the union over all
/// matched ids, deduplicated, in first-seen order.
pub fn deepest_buckets(
    matched_ids: &[String],
    parents: &ParentIndex,
    scheme: &BucketScheme,
) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for id in matched_ids {
        let mut best_level = usize::MAX;
        let mut best: Vec<&str> = Vec::new();
        let hierarchies = parents.hierarchies(id);
        for chain in &hierarchies {
            // level 1 is the matched resource itself
            let hit = chain
                .iter()
                .enumerate()
                .find(|(_, node)| scheme.contains_id(node));
            if let Some((idx, node)) = hit {
                let level = idx + 1;
                if level < best_level {
                    best_level = level;
                    best.clear();
                }
                if level == best_level && !best.contains(&node.as_str()) {
                    best.push(node.as_str());
                }
            }
        }
        for bucket in best {
            if !out.iter().any(|b| b == bucket) {
                out.push(bucket.to_string());
            }
        }
    }
    out
}

/// Default-label fallback: an entry applies when every singularized token
/// of its key occurs in the sample. Entries are checked in file order.
pub fn default_labels(sample: &str, defaults: &[(String, String)]) -> Vec<String> {
    let exceptions = FxHashSet::default();
    let tokens: FxHashSet<String> = sample
        .to_lowercase()
        .split_whitespace()
        .map(|t| singularize(t, &exceptions))
        .collect();

    let mut labels = Vec::new();
    for (key, label) in defaults {
        let applies = key
            .split_whitespace()
            .map(|t| singularize(t, &exceptions))
            .all(|t| tokens.contains(&t));
        if applies && !labels.contains(label) {
            labels.push(label.clone());
        }
    }
    labels
}
