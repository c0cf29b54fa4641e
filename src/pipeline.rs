//! Per-sample classification pipeline
//!
//! Glues the normalizer, term mapper, component matcher, hierarchy service,
//! and bucket machinery into one engine. Classification of a sample never
//! fails: samples that match nothing are emitted with `Sorry No Match` and
//! whatever partial information was gathered.

use crate::bucket::{default_labels, deepest_buckets, BucketScheme};
use crate::component::{match_components, ComponentResult};
use crate::config::Profile;
use crate::error::MapError;
use crate::hierarchy::ParentIndex;
use crate::lexicon::{load_map, read_rows, Lexicon};
use crate::mapper::{map_term, Mapping};
use crate::normalize::{is_number, normalize, CleanedSample};
use crate::refine::Refiner;
use crate::resource::ResourceTable;
use crate::rules::{evaluate, RuleTree};
use crate::samples::{Record, Sample};
use crate::status::{join_statuses, MacroStatus, Status};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

/// Placeholder for cells with nothing to report.
const EMPTY_CELL: &str = "--";

/// Everything the per-sample loop needs, immutable after load.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    pub lexicon: Lexicon,
    pub table: ResourceTable,
    pub parents: ParentIndex,
    pub lexmapr_scheme: BucketScheme,
    pub ifsac_scheme: BucketScheme,
    /// Bucket id -> human-readable label.
    pub bucket_labels: FxHashMap<String, String>,
    pub refiner: Refiner,
    pub defaults: Vec<(String, String)>,
    /// Boolean membership rules per lexmapr bucket, when an ontology
    /// provided them. Empty means parent-chain lookup only.
    pub rules: FxHashMap<String, RuleTree>,
}

/// The matcher outcome for one sample, before record formatting.
#[derive(Debug, Clone)]
pub struct ClassificationResult {
    pub cleaned: CleanedSample,
    pub full_match: Option<Mapping>,
    pub components: ComponentResult,
    pub lexmapr_buckets: Vec<String>,
    pub ifsac_buckets: Vec<String>,
    pub ifsac_labels: Vec<String>,
}

impl Engine {
    /// Load every table a profile names. Fatal on any missing or corrupt
    /// resource file, and on parent-graph cycles.
    pub fn load(profile: &Profile) -> Result<Self, MapError> {
        Ok(Engine {
            lexicon: Lexicon::from_dir(profile.dir())?,
            table: ResourceTable::from_file(&profile.resource_terms())?,
            parents: ParentIndex::from_file(&profile.resource_parents())?,
            lexmapr_scheme: BucketScheme::from_file(&profile.lexmapr_buckets())?,
            ifsac_scheme: BucketScheme::from_file(&profile.ifsac_buckets())?,
            bucket_labels: load_map(&profile.bucket_labels())?,
            refiner: Refiner::from_file(&profile.refinements())?,
            defaults: read_rows(&profile.default_labels())?,
            rules: FxHashMap::default(),
        })
    }

    /// Attach compiled boolean bucket rules (from the ontology cache).
    pub fn with_rules(mut self, rules: FxHashMap<String, RuleTree>) -> Self {
        self.rules = rules;
        self
    }

    /// Classify one sample into the match/bucket outcome.
    pub fn classify(&self, sample: &Sample) -> ClassificationResult {
        let cleaned = normalize(&sample.description, &self.lexicon);

        // Full-phrase match: raw description first, cleaned phrase second.
        let full_match = map_term(sample.description.trim(), &self.table, &self.lexicon, true)
            .or_else(|| map_term(&cleaned.phrase, &self.table, &self.lexicon, true));

        let components = if full_match.is_some() || cleaned.phrase.is_empty() {
            ComponentResult::default()
        } else {
            match_components(&cleaned.phrase, &self.table, &self.lexicon)
        };

        let matched_ids = self.matched_ids(&full_match, &components);
        let candidates = self.candidate_set(&matched_ids);
        debug!(
            sample = %sample.id,
            full = full_match.is_some(),
            components = components.matches.len(),
            candidates = candidates.len(),
            "classified sample"
        );

        let lexmapr_buckets = self.lexmapr_buckets(&matched_ids, &candidates);
        let ifsac_buckets = deepest_buckets(&matched_ids, &self.parents, &self.ifsac_scheme);
        let ifsac_labels = self.ifsac_labels(&ifsac_buckets, &sample.description);

        ClassificationResult {
            cleaned,
            full_match,
            components,
            lexmapr_buckets,
            ifsac_buckets,
            ifsac_labels,
        }
    }

    /// Classify and format one output record.
    pub fn classify_record(&self, sample: &Sample) -> Record {
        if sample.description.trim().is_empty() {
            return Record {
                sample_id: sample.id.clone(),
                sample_desc: sample.description.clone(),
                cleaned_sample: EMPTY_CELL.to_string(),
                matched_term: EMPTY_CELL.to_string(),
                macro_status: Some(MacroStatus::EmptySample),
                micro_status: Status::EmptySample.to_string(),
                ..Default::default()
            };
        }

        let result = self.classify(sample);
        self.format_record(sample, &result)
    }

    fn matched_ids(
        &self,
        full_match: &Option<Mapping>,
        components: &ComponentResult,
    ) -> Vec<String> {
        match full_match {
            Some(mapping) => vec![mapping.id.clone()],
            None => components
                .retained()
                .iter()
                .map(|m| m.mapping.id.clone())
                .collect(),
        }
    }

    /// Matched ids plus every ancestor reachable through the parent DAG.
    fn candidate_set(&self, matched_ids: &[String]) -> FxHashSet<String> {
        let mut candidates: FxHashSet<String> = matched_ids.iter().cloned().collect();
        for id in matched_ids {
            candidates.extend(self.parents.ancestors(id));
        }
        candidates
    }

    fn lexmapr_buckets(
        &self,
        matched_ids: &[String],
        candidates: &FxHashSet<String>,
    ) -> Vec<String> {
        if self.rules.is_empty() {
            return deepest_buckets(matched_ids, &self.parents, &self.lexmapr_scheme);
        }
        let mut triggered: Vec<String> = self
            .rules
            .iter()
            .filter(|(_, rule)| evaluate(rule, candidates).is_some())
            .map(|(bucket, _)| bucket.clone())
            .collect();
        triggered.sort_unstable();
        triggered
    }

    fn ifsac_labels(&self, ifsac_buckets: &[String], description: &str) -> Vec<String> {
        let mut labels: Vec<String> = ifsac_buckets
            .iter()
            .filter_map(|id| self.bucket_labels.get(id).cloned())
            .collect();

        // Fall back to the default-label lexicon when classification only
        // produced the catch-all.
        if labels.is_empty() || labels == ["food"] {
            let defaulted = default_labels(description, &self.defaults);
            if !defaulted.is_empty() {
                labels = defaulted;
            }
        }

        self.refiner.refine(labels, description)
    }

    fn format_record(&self, sample: &Sample, result: &ClassificationResult) -> Record {
        let retained = result.components.retained();
        let (macro_status, matched_term, mut micro) = match &result.full_match {
            Some(mapping) => (
                MacroStatus::FullTermMatch,
                mapping.pair(),
                mapping.status.clone(),
            ),
            None if !retained.is_empty() => {
                let statuses: Vec<Status> = retained
                    .iter()
                    .flat_map(|m| m.mapping.status.iter().cloned())
                    .collect();
                (MacroStatus::ComponentMatch, EMPTY_CELL.to_string(), statuses)
            }
            None => (
                MacroStatus::NoMatch,
                EMPTY_CELL.to_string(),
                vec![Status::SorryNoMatch],
            ),
        };

        let mut trail = result.cleaned.status.clone();
        trail.append(&mut micro);

        // On a full-term match the matched pair doubles as the retained set.
        let (all_matches, retained_pairs, component_count) = match &result.full_match {
            Some(mapping) => (mapping.pair(), mapping.pair(), 1),
            None => (
                join_pairs(result.components.matches.iter().map(|m| &m.mapping)),
                join_pairs(retained.iter().map(|m| &m.mapping)),
                retained.len(),
            ),
        };
        let components = retained
            .iter()
            .map(|m| format!("{}=>{}", m.tokens.join(" "), m.mapping.pair()))
            .collect::<Vec<_>>()
            .join(" | ");

        let (pos_tagged, candidate_phrase) = self.tag_phrase(&result.cleaned.phrase);

        Record {
            sample_id: sample.id.clone(),
            sample_desc: sample.description.clone(),
            cleaned_sample: result.cleaned.phrase.clone(),
            pos_tagged,
            candidate_phrase,
            matched_term,
            all_matches: or_empty(all_matches),
            retained: or_empty(retained_pairs),
            component_count,
            macro_status: Some(macro_status),
            micro_status: join_statuses(&trail),
            remaining_tokens: or_empty(result.components.remaining.join(" ")),
            components: or_empty(components),
            lexmapr_buckets: or_empty(result.lexmapr_buckets.join("|")),
            ifsac_buckets: or_empty(result.ifsac_buckets.join("|")),
            ifsac_labels: or_empty(result.ifsac_labels.join("|")),
        }
    }

    /// Deterministic stand-in tagger for the full output format: quality
    /// tokens tag as JJ, numerals as CD, everything else as NN. The
    /// candidate noun phrase is the cleaned phrase minus quality tokens.
    fn tag_phrase(&self, cleaned: &str) -> (String, String) {
        let mut tagged = Vec::new();
        let mut nouns = Vec::new();
        for token in cleaned.split_whitespace() {
            let tag = if self.lexicon.qualities.contains_key(token) {
                "JJ"
            } else if is_number(token) {
                "CD"
            } else {
                nouns.push(token);
                "NN"
            };
            tagged.push(format!("{token}/{tag}"));
        }
        (tagged.join(" "), nouns.join(" "))
    }
}

fn join_pairs<'a, I>(mappings: I) -> String
where
    I: Iterator<Item = &'a Mapping>,
{
    mappings.map(|m| m.pair()).collect::<Vec<_>>().join(" | ")
}

fn or_empty(text: String) -> String {
    if text.is_empty() {
        EMPTY_CELL.to_string()
    } else {
        text
    }
}
