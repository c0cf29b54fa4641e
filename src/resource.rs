//! Resource term table with precomputed permutation indices
//!
//! Short specimen descriptions often invert modifier order relative to the
//! ontology's canonical label ("broccoli raw" vs "raw broccoli"). Checking
//! every ordering at query time would be O(n!), so all permutations of short
//! labels are enumerated once at load and stored as extra keys pointing back
//! at the resource id.

use crate::error::MapError;
use crate::lexicon::read_rows;
use rustc_hash::FxHashMap;
use std::path::Path;
use tracing::info;

/// Labels with more tokens than this are left out of the permutation
/// indices; 7! keys per label is past the point of diminishing returns.
pub const MAX_PERMUTED_TOKENS: usize = 6;

/// Id prefixes excluded from permutation indexing. The NCBI taxonomy alone
/// would contribute millions of keys.
const LARGE_TAXONOMY_PREFIXES: &[&str] = &["ncbitaxon"];

/// Mapping between canonical labels and resource ids, with permutation and
/// bracketed-permutation side indices.
#[derive(Debug, Clone, Default)]
pub struct ResourceTable {
    label_to_id: FxHashMap<String, String>,
    id_to_label: FxHashMap<String, String>,
    permutations: FxHashMap<String, String>,
    bracketed_permutations: FxHashMap<String, String>,
}

impl ResourceTable {
    /// Build a table from `(label, id)` rows. Rows are expected to be
    /// normalized already (lowercase, punctuation-cleaned labels).
    pub fn build<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut table = ResourceTable::default();
        for (label, id) in rows {
            table.add(label, id);
        }
        info!(
            labels = table.label_to_id.len(),
            permutations = table.permutations.len(),
            bracketed = table.bracketed_permutations.len(),
            "built resource table"
        );
        table
    }

    /// Load from a `label,id` CSV file.
    pub fn from_file(path: &Path) -> Result<Self, MapError> {
        let rows = read_rows(path)?;
        for (label, id) in &rows {
            if id.is_empty() {
                return Err(MapError::resource(
                    path,
                    format!("resource label {label:?} has no id"),
                ));
            }
        }
        Ok(Self::build(rows))
    }

    fn add(&mut self, label: String, id: String) {
        self.id_to_label.entry(id.clone()).or_insert(label.clone());
        self.label_to_id.insert(label.clone(), id.clone());

        if LARGE_TAXONOMY_PREFIXES.iter().any(|p| id.starts_with(p)) {
            return;
        }

        // Bracket-carrying labels index only under the bracketed table;
        // queries are punctuation-cleaned, so parenthesized permutation
        // keys would never be hit anyway.
        if let Some(reordered) = bracket_reorder(&label) {
            let tokens: Vec<&str> = reordered.split_whitespace().collect();
            if tokens.len() <= MAX_PERMUTED_TOKENS {
                for permuted in permutations(&tokens) {
                    self.bracketed_permutations
                        .entry(permuted)
                        .or_insert(id.clone());
                }
            }
        } else {
            let tokens: Vec<&str> = label.split_whitespace().collect();
            if tokens.len() <= MAX_PERMUTED_TOKENS {
                for permuted in permutations(&tokens) {
                    self.permutations.entry(permuted).or_insert(id.clone());
                }
            }
        }
    }

    pub fn get_id(&self, label: &str) -> Option<&str> {
        self.label_to_id.get(label).map(String::as_str)
    }

    pub fn get_label(&self, id: &str) -> Option<&str> {
        self.id_to_label.get(id).map(String::as_str)
    }

    pub fn get_permuted(&self, phrase: &str) -> Option<&str> {
        self.permutations.get(phrase).map(String::as_str)
    }

    pub fn get_bracketed_permuted(&self, phrase: &str) -> Option<&str> {
        self.bracketed_permutations.get(phrase).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.label_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.label_to_id.is_empty()
    }

    /// Iterate over all `(permuted phrase, id)` keys of the permutation
    /// index. Exposed for the round-trip invariant checks.
    pub fn permutation_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.permutations
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Enumerate every ordering of `tokens`, space-joined.
pub fn permutations(tokens: &[&str]) -> Vec<String> {
    let mut work: Vec<&str> = tokens.to_vec();
    let mut out = Vec::new();
    permute_into(&mut work, 0, &mut out);
    out
}

fn permute_into(tokens: &mut Vec<&str>, start: usize, out: &mut Vec<String>) {
    if start == tokens.len() {
        out.push(tokens.join(" "));
        return;
    }
    for i in start..tokens.len() {
        tokens.swap(start, i);
        permute_into(tokens, start + 1, out);
        tokens.swap(start, i);
    }
}

/// For a label of the form `unbracketed (bracketed)`, move the bracketed
/// segment to the front (commas inside the brackets become spaces) and drop
/// the brackets. Returns `None` when the label has no bracketed segment.
fn bracket_reorder(label: &str) -> Option<String> {
    let open = label.find('(')?;
    let close = label.rfind(')')?;
    if close <= open {
        return None;
    }
    let inner = label[open + 1..close].replace(',', " ");
    let outer = format!("{} {}", &label[..open], &label[close + 1..]);
    let reordered: Vec<&str> = inner
        .split_whitespace()
        .chain(outer.split_whitespace())
        .collect();
    if reordered.is_empty() {
        return None;
    }
    Some(reordered.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ResourceTable {
        ResourceTable::build(vec![
            ("chicken breast".to_string(), "foodon_00002703".to_string()),
            ("(raw) broccoli".to_string(), "foodon_03301816".to_string()),
            (
                "egg yolk (raw)".to_string(),
                "foodon_03301439".to_string(),
            ),
        ])
    }

    #[test]
    fn test_direct_lookup() {
        let t = table();
        assert_eq!(t.get_id("chicken breast"), Some("foodon_00002703"));
        assert_eq!(t.get_label("foodon_00002703"), Some("chicken breast"));
        assert_eq!(t.get_id("beef"), None);
    }

    #[test]
    fn test_permutation_lookup() {
        let t = table();
        assert_eq!(t.get_permuted("breast chicken"), Some("foodon_00002703"));
        assert_eq!(t.get_permuted("chicken breast"), Some("foodon_00002703"));
    }

    #[test]
    fn test_bracketed_permutation_lookup() {
        let t = table();
        // "egg yolk (raw)" reorders to "raw egg yolk" before permuting
        assert_eq!(
            t.get_bracketed_permuted("raw egg yolk"),
            Some("foodon_03301439")
        );
        assert_eq!(
            t.get_bracketed_permuted("yolk egg raw"),
            Some("foodon_03301439")
        );
    }

    #[test]
    fn test_large_taxonomy_excluded() {
        let t = ResourceTable::build(vec![(
            "meleagris gallopavo".to_string(),
            "ncbitaxon_9103".to_string(),
        )]);
        assert_eq!(t.get_id("meleagris gallopavo"), Some("ncbitaxon_9103"));
        assert_eq!(t.get_permuted("gallopavo meleagris"), None);
    }

    #[test]
    fn test_long_labels_not_permuted() {
        let label = "a b c d e f g";
        let t = ResourceTable::build(vec![(label.to_string(), "x_1".to_string())]);
        assert_eq!(t.get_id(label), Some("x_1"));
        assert_eq!(t.get_permuted("g f e d c b a"), None);
    }

    #[test]
    fn test_permutations_count() {
        assert_eq!(permutations(&["a"]).len(), 1);
        assert_eq!(permutations(&["a", "b", "c"]).len(), 6);
    }

    #[test]
    fn test_bracket_reorder() {
        assert_eq!(
            bracket_reorder("egg yolk (raw)").as_deref(),
            Some("raw egg yolk")
        );
        assert_eq!(
            bracket_reorder("milk (cow, whole)").as_deref(),
            Some("cow whole milk")
        );
        assert_eq!(bracket_reorder("plain label"), None);
    }

    #[test]
    fn test_permutation_round_trip() {
        // every permutation key maps to an id whose canonical label is a
        // token-permutation of the key
        let t = table();
        for (key, id) in t.permutation_entries() {
            let label = t.get_label(id).unwrap();
            let mut key_tokens: Vec<&str> = key.split_whitespace().collect();
            let mut label_tokens: Vec<&str> = label.split_whitespace().collect();
            key_tokens.sort_unstable();
            label_tokens.sort_unstable();
            assert_eq!(key_tokens, label_tokens);
        }
    }
}
