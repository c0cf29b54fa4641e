//! Full-phrase term mapping
//!
//! `map_term` tries a fixed chain of strategies against the resource table,
//! first hit wins: exact label, case-folded label, permutation index,
//! bracketed-permutation index, suffix extension, and finally the synonym
//! lexicon (which retries the whole chain on the replacement phrase). Each
//! strategy leaves its own provenance tag.

use crate::lexicon::Lexicon;
use crate::resource::ResourceTable;
use crate::status::Status;

/// A successful term match: the canonical label of the matched resource, its
/// id, and the ordered strategy tags that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    pub term: String,
    pub id: String,
    pub status: Vec<Status>,
}

impl Mapping {
    fn new(table: &ResourceTable, id: &str, status: Vec<Status>) -> Self {
        // Contract: report the canonical label of the matched id, not the
        // query phrase it was found under.
        let term = table.get_label(id).unwrap_or(id).to_string();
        Mapping {
            term,
            id: id.to_string(),
            status,
        }
    }

    /// Render as the `label:id` pair used in output records.
    pub fn pair(&self) -> String {
        format!("{}:{}", self.term, self.id)
    }
}

/// Map a phrase to a resource term, or `None` when no strategy matches.
pub fn map_term(
    phrase: &str,
    table: &ResourceTable,
    lexicon: &Lexicon,
    consider_suffixes: bool,
) -> Option<Mapping> {
    if let Some(mapping) = map_direct(phrase, table, lexicon, consider_suffixes) {
        return Some(mapping);
    }

    // Synonym fallback retries the whole chain on the replacement.
    if let Some(replacement) = lexicon.synonyms.get(phrase) {
        if let Some(mut mapping) = map_direct(replacement, table, lexicon, consider_suffixes) {
            mapping.status.push(Status::SynonymUsage);
            return Some(mapping);
        }
    }

    None
}

fn map_direct(
    phrase: &str,
    table: &ResourceTable,
    lexicon: &Lexicon,
    consider_suffixes: bool,
) -> Option<Mapping> {
    if let Some(id) = table.get_id(phrase) {
        return Some(Mapping::new(table, id, vec![Status::DirectMatch]));
    }

    let folded = phrase.to_lowercase();
    if folded != phrase {
        if let Some(id) = table.get_id(&folded) {
            return Some(Mapping::new(table, id, vec![Status::ChangeOfCase]));
        }
    }

    if let Some(id) = table.get_permuted(phrase) {
        return Some(Mapping::new(table, id, vec![Status::PermutationMatch]));
    }

    if let Some(id) = table.get_bracketed_permuted(phrase) {
        return Some(Mapping::new(
            table,
            id,
            vec![Status::BracketedPermutationMatch],
        ));
    }

    if consider_suffixes {
        for suffix in &lexicon.suffixes {
            let extended = format!("{phrase} {suffix}");
            if let Some(id) = table.get_id(&extended) {
                return Some(Mapping::new(
                    table,
                    id,
                    vec![Status::SuffixAddition(suffix.clone())],
                ));
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> (ResourceTable, Lexicon) {
        let table = ResourceTable::build(vec![
            ("chicken breast".to_string(), "foodon_00002703".to_string()),
            ("egg yolk (raw)".to_string(), "foodon_03301439".to_string()),
            (
                "turkey meat food product".to_string(),
                "foodon_00002587".to_string(),
            ),
            ("peanut food product".to_string(), "foodon_03306867".to_string()),
        ]);
        let mut lexicon = Lexicon::default();
        lexicon.suffixes.push("food product".to_string());
        lexicon
            .synonyms
            .insert("yolk of egg raw".to_string(), "raw egg yolk".to_string());
        (table, lexicon)
    }

    #[test]
    fn test_exact_match() {
        let (table, lexicon) = fixtures();
        let mapping = map_term("chicken breast", &table, &lexicon, false).unwrap();
        assert_eq!(mapping.id, "foodon_00002703");
        assert_eq!(mapping.term, "chicken breast");
        assert_eq!(mapping.status, vec![Status::DirectMatch]);
    }

    #[test]
    fn test_case_folded_match() {
        let (table, lexicon) = fixtures();
        let mapping = map_term("Chicken Breast", &table, &lexicon, false).unwrap();
        assert_eq!(mapping.id, "foodon_00002703");
        assert_eq!(mapping.status, vec![Status::ChangeOfCase]);
    }

    #[test]
    fn test_permutation_match() {
        let (table, lexicon) = fixtures();
        let mapping = map_term("breast chicken", &table, &lexicon, false).unwrap();
        assert_eq!(mapping.id, "foodon_00002703");
        assert_eq!(mapping.status, vec![Status::PermutationMatch]);
        // canonical label comes back, not the query permutation
        assert_eq!(mapping.term, "chicken breast");
    }

    #[test]
    fn test_bracketed_permutation_match() {
        let (table, lexicon) = fixtures();
        let mapping = map_term("raw egg yolk", &table, &lexicon, false).unwrap();
        assert_eq!(mapping.id, "foodon_03301439");
        assert_eq!(mapping.status, vec![Status::BracketedPermutationMatch]);
    }

    #[test]
    fn test_suffix_addition() {
        let (table, lexicon) = fixtures();
        assert!(map_term("peanut", &table, &lexicon, false).is_none());
        let mapping = map_term("peanut", &table, &lexicon, true).unwrap();
        assert_eq!(mapping.id, "foodon_03306867");
        assert_eq!(
            mapping.status,
            vec![Status::SuffixAddition("food product".to_string())]
        );
    }

    #[test]
    fn test_synonym_fallback() {
        let (table, lexicon) = fixtures();
        let mapping = map_term("yolk of egg raw", &table, &lexicon, false).unwrap();
        assert_eq!(mapping.id, "foodon_03301439");
        assert_eq!(
            mapping.status,
            vec![Status::BracketedPermutationMatch, Status::SynonymUsage]
        );
    }

    #[test]
    fn test_no_match() {
        let (table, lexicon) = fixtures();
        assert!(map_term("granite countertop", &table, &lexicon, true).is_none());
    }
}
