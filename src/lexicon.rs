//! Lexicon tables: small key/value dictionaries used during cleaning
//!
//! Each table is loaded from a two-column CSV (`key,value`, first row is a
//! header) and lowercased on the way in, so lookups never need to case-fold
//! the table side.

use crate::error::MapError;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fs::File;
use std::path::Path;
use tracing::info;

/// The bundle of fixed dictionaries consulted by the normalizer, the term
/// mapper, and the component matcher.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    /// Phrase -> preferred replacement phrase.
    pub synonyms: FxHashMap<String, String>,
    /// Abbreviation or acronym -> expansion. Consulted per token and again
    /// on the whole cleaned phrase (multi-word acronyms).
    pub abbreviations: FxHashMap<String, String>,
    /// Non-English word -> English replacement.
    pub non_english: FxHashMap<String, String>,
    /// Misspelling -> correction.
    pub spelling_mistakes: FxHashMap<String, String>,
    /// Tokens the singularizer must leave untouched.
    pub inflection_exceptions: FxHashSet<String>,
    /// Tokens dropped from the cleaned phrase.
    pub stop_words: FxHashSet<String>,
    /// Suffixes tried by the mapper (`phrase + " " + suffix`).
    pub suffixes: Vec<String>,
    /// Semantic tags consulted for 1- and 2-gram component fallback.
    pub qualities: FxHashMap<String, String>,
    /// Process terms consulted for 1-gram component fallback only.
    pub processes: FxHashMap<String, String>,
}

impl Lexicon {
    /// Load every table from its conventional file under `dir`. Missing
    /// files are resource errors; the profile decides what must exist.
    pub fn from_dir(dir: &Path) -> Result<Self, MapError> {
        let lexicon = Lexicon {
            synonyms: load_map(&dir.join("synonyms.csv"))?,
            abbreviations: load_map(&dir.join("abbreviations.csv"))?,
            non_english: load_map(&dir.join("non-english.csv"))?,
            spelling_mistakes: load_map(&dir.join("spelling-mistakes.csv"))?,
            inflection_exceptions: load_set(&dir.join("inflection-exceptions.csv"))?,
            stop_words: load_set(&dir.join("stop-words.csv"))?,
            suffixes: load_keys(&dir.join("suffixes.csv"))?,
            qualities: load_map(&dir.join("qualities.csv"))?,
            processes: load_map(&dir.join("processes.csv"))?,
        };
        info!(
            synonyms = lexicon.synonyms.len(),
            abbreviations = lexicon.abbreviations.len(),
            non_english = lexicon.non_english.len(),
            spelling = lexicon.spelling_mistakes.len(),
            stop_words = lexicon.stop_words.len(),
            suffixes = lexicon.suffixes.len(),
            "loaded lexicon tables"
        );
        Ok(lexicon)
    }

    /// Look a token up in `map` directly, then case-folded.
    pub fn lookup<'a>(map: &'a FxHashMap<String, String>, token: &str) -> Option<&'a str> {
        map.get(token)
            .or_else(|| map.get(token.to_lowercase().as_str()))
            .map(String::as_str)
    }
}

/// Read a two-column CSV into a lowercased map. The first row is a header
/// and is skipped. Rows with an empty key are rejected.
pub fn load_map(path: &Path) -> Result<FxHashMap<String, String>, MapError> {
    let mut map = FxHashMap::default();
    for (key, value) in read_rows(path)? {
        if key.is_empty() {
            return Err(MapError::resource(path, "empty key in resource file"));
        }
        map.insert(key, value);
    }
    Ok(map)
}

/// Read a CSV whose values are irrelevant into a lowercased key set.
pub fn load_set(path: &Path) -> Result<FxHashSet<String>, MapError> {
    Ok(read_rows(path)?.into_iter().map(|(k, _)| k).collect())
}

/// Read a CSV keeping only the key column, in file order.
pub fn load_keys(path: &Path) -> Result<Vec<String>, MapError> {
    Ok(read_rows(path)?.into_iter().map(|(k, _)| k).collect())
}

/// Read `(key, value)` rows, lowercased and trimmed. Values may be empty;
/// rows with fewer than one field are skipped.
pub fn read_rows(path: &Path) -> Result<Vec<(String, String)>, MapError> {
    let file = File::open(path).map_err(|e| MapError::resource(path, e.to_string()))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let key = record.get(0).unwrap_or("").trim().to_lowercase();
        if key.is_empty() {
            continue;
        }
        let value = record.get(1).unwrap_or("").trim().to_lowercase();
        rows.push((key, value));
    }
    Ok(rows)
}
