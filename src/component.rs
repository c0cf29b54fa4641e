//! Component matching for phrases with no full-term match
//!
//! Searches 1..5-token chunks of the cleaned phrase for resource matches,
//! longest chunks first so specific phrases win over the pieces they
//! contain. Short phrases are searched as unordered token combinations;
//! phrases of 15+ tokens fall back to contiguous n-grams to keep the
//! enumeration bounded.

use crate::lexicon::Lexicon;
use crate::mapper::{map_term, Mapping};
use crate::resource::ResourceTable;
use crate::status::Status;
use rustc_hash::FxHashSet;

/// Largest chunk size searched.
pub const MAX_NGRAM: usize = 5;

/// Phrases with at least this many tokens are searched with contiguous
/// n-grams instead of unordered combinations.
pub const COMBINATION_TOKEN_LIMIT: usize = 15;

/// One partial match: the mapping plus the input tokens it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentMatch {
    pub mapping: Mapping,
    pub tokens: Vec<String>,
}

impl ComponentMatch {
    fn token_set(&self) -> FxHashSet<&str> {
        self.tokens.iter().map(String::as_str).collect()
    }
}

/// Result of a component search over one cleaned phrase.
#[derive(Debug, Clone, Default)]
pub struct ComponentResult {
    /// Every chunk match found, longest chunks first.
    pub matches: Vec<ComponentMatch>,
    /// Input tokens not covered by any match, in input order.
    pub remaining: Vec<String>,
}

impl ComponentResult {
    /// Apply the retention rule: drop any match whose tokens all appear in
    /// a strictly longer match.
    pub fn retained(&self) -> Vec<&ComponentMatch> {
        self.matches
            .iter()
            .filter(|m| {
                let mine = m.token_set();
                !self.matches.iter().any(|other| {
                    other.tokens.len() > m.tokens.len()
                        && mine.iter().all(|t| other.token_set().contains(t))
                })
            })
            .collect()
    }
}

/// Search all 1..=5 token chunks of `cleaned` for component matches.
pub fn match_components(
    cleaned: &str,
    table: &ResourceTable,
    lexicon: &Lexicon,
) -> ComponentResult {
    let tokens: Vec<&str> = cleaned.split_whitespace().collect();
    if tokens.is_empty() {
        return ComponentResult::default();
    }

    let mut matches: Vec<ComponentMatch> = Vec::new();
    let mut covered: FxHashSet<String> = FxHashSet::default();

    for n in (1..=MAX_NGRAM.min(tokens.len())).rev() {
        let chunks = if tokens.len() < COMBINATION_TOKEN_LIMIT {
            combinations(&tokens, n)
        } else {
            ngrams(&tokens, n)
        };

        for chunk in chunks {
            let phrase = chunk.join(" ");
            let mapping = map_term(&phrase, table, lexicon, false)
                .or_else(|| map_term(&phrase, table, lexicon, true))
                .or_else(|| {
                    if n <= 2 {
                        fallback(&phrase, &lexicon.qualities, Status::QualityTag)
                    } else {
                        None
                    }
                })
                .or_else(|| {
                    if n == 1 {
                        fallback(&phrase, &lexicon.processes, Status::ProcessTag)
                    } else {
                        None
                    }
                });

            if let Some(mapping) = mapping {
                let chunk_tokens: Vec<String> = chunk.iter().map(|t| t.to_string()).collect();
                let duplicate = matches
                    .iter()
                    .any(|m| m.mapping.id == mapping.id && m.tokens == chunk_tokens);
                if !duplicate {
                    covered.extend(chunk_tokens.iter().cloned());
                    matches.push(ComponentMatch {
                        mapping,
                        tokens: chunk_tokens,
                    });
                }
            }
        }
    }

    let remaining = tokens
        .iter()
        .filter(|t| !covered.contains(**t))
        .map(|t| t.to_string())
        .collect();

    ComponentResult { matches, remaining }
}

/// Fallback lookup against the qualities/processes lexicons.
fn fallback(
    phrase: &str,
    map: &rustc_hash::FxHashMap<String, String>,
    tag: Status,
) -> Option<Mapping> {
    map.get(phrase).map(|id| Mapping {
        term: phrase.to_string(),
        id: id.clone(),
        status: vec![tag],
    })
}

/// All unordered n-combinations of `tokens`, each in input order.
fn combinations<'a>(tokens: &[&'a str], n: usize) -> Vec<Vec<&'a str>> {
    let mut out = Vec::new();
    let mut current = Vec::with_capacity(n);
    combine_into(tokens, n, 0, &mut current, &mut out);
    out
}

fn combine_into<'a>(
    tokens: &[&'a str],
    n: usize,
    start: usize,
    current: &mut Vec<&'a str>,
    out: &mut Vec<Vec<&'a str>>,
) {
    if current.len() == n {
        out.push(current.clone());
        return;
    }
    let needed = n - current.len();
    for i in start..=tokens.len().saturating_sub(needed) {
        current.push(tokens[i]);
        combine_into(tokens, n, i + 1, current, out);
        current.pop();
    }
}

/// Contiguous n-grams of `tokens`.
fn ngrams<'a>(tokens: &[&'a str], n: usize) -> Vec<Vec<&'a str>> {
    tokens.windows(n).map(|w| w.to_vec()).collect()
}
