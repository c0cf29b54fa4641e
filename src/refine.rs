//! Deterministic refinement of IFSAC label sets
//!
//! Post-processing that resolves conflicts between coarse labels ("beef"
//! vs "cow" vs "dairy") with a fixed, ordered ruleset. Every rule either
//! adds or removes labels; the whole pass is idempotent, so running the
//! refiner on its own output changes nothing.

use crate::error::MapError;
use crate::lexicon::read_rows;
use crate::normalize::singularize;
use rustc_hash::FxHashSet;
use std::path::Path;

/// Parent category -> child categories. A parent label is dropped when any
/// of its children is also present.
const CATEGORY_CHILDREN: &[(&str, &[&str])] = &[
    (
        "animal",
        &[
            "beef", "dairy", "eggs", "fish", "game", "meat", "other meat", "pork", "poultry",
            "shellfish", "chicken", "turkey", "cow",
        ],
    ),
    (
        "plant",
        &[
            "fruits",
            "vegetables",
            "fruits and vegetables",
            "grains",
            "beans",
            "nuts",
            "seeds",
            "oils",
            "sugars",
        ],
    ),
    ("fruits and vegetables", &["fruits", "vegetables"]),
    (
        "environmental",
        &[
            "environmental-animal housing",
            "environmental-farm",
            "environmental-factory",
            "environmental-restaurant",
            "environmental-retail",
            "environmental-water",
        ],
    ),
];

/// Labels that, when present, clear every other label.
const EXCLUSIVE_LABELS: &[&str] = &["animal feed", "multi-ingredient"];

/// The ordered refinement engine. The table-driven rules come from the
/// refinement lexicon file; the conflict rules are fixed.
#[derive(Debug, Clone, Default)]
pub struct Refiner {
    /// `(key phrase, label to add)` in file order.
    refinements: Vec<(String, String)>,
}

impl Refiner {
    pub fn new(refinements: Vec<(String, String)>) -> Self {
        Refiner { refinements }
    }

    /// Load the refinement table from a `key,value` CSV.
    pub fn from_file(path: &Path) -> Result<Self, MapError> {
        Ok(Self::new(read_rows(path)?))
    }

    /// Apply every rule, in order, to `labels` for the given raw sample.
    pub fn refine(&self, labels: Vec<String>, sample: &str) -> Vec<String> {
        let exceptions = FxHashSet::default();
        let sample_tokens: FxHashSet<String> = sample
            .to_lowercase()
            .split_whitespace()
            .map(|t| singularize(t.trim_matches(|c: char| !c.is_alphanumeric()), &exceptions))
            .collect();

        let mut labels = labels;

        // Table rules: add the value when every key token is in the sample.
        for (key, value) in &self.refinements {
            let applies = key
                .split_whitespace()
                .map(|t| singularize(t, &exceptions))
                .all(|t| sample_tokens.contains(&t));
            if applies && !labels.iter().any(|l| l == value) {
                labels.push(value.clone());
            }
        }

        // equipment + structure => environmental
        if has(&labels, "equipment") && has(&labels, "structure") && !has(&labels, "environmental")
        {
            labels.push("environmental".to_string());
        }

        // dairy + cow => drop cow
        if has(&labels, "dairy") && has(&labels, "cow") {
            drop_label(&mut labels, "cow");
        }

        // beef + dairy with an explicit milk mention => drop beef
        if has(&labels, "beef") && has(&labels, "dairy") && sample_tokens.contains("milk") {
            drop_label(&mut labels, "beef");
        }

        // shellfish + fish => drop fish
        if has(&labels, "shellfish") && has(&labels, "fish") {
            drop_label(&mut labels, "fish");
        }

        // environmental + fecal mention => clinical/research
        if has(&labels, "environmental")
            && ["feces", "fecal", "stool"]
                .iter()
                .any(|t| sample_tokens.contains(*t))
        {
            drop_label(&mut labels, "environmental");
            if !has(&labels, "clinical/research") {
                labels.push("clinical/research".to_string());
            }
        }

        // drop parent categories shadowed by a present child
        for (parent, children) in CATEGORY_CHILDREN {
            if has(&labels, parent) && children.iter().any(|c| has(&labels, c)) {
                drop_label(&mut labels, parent);
            }
        }

        // exclusive labels clear everything else
        if EXCLUSIVE_LABELS.iter().any(|l| has(&labels, l)) {
            labels.retain(|l| EXCLUSIVE_LABELS.contains(&l.as_str()));
        }

        labels
    }
}

fn has(labels: &[String], label: &str) -> bool {
    labels.iter().any(|l| l == label)
}

fn drop_label(labels: &mut Vec<String>, label: &str) {
    labels.retain(|l| l != label);
}
