//! Provenance tags for cleaning and matching
//!
//! Every transformation the normalizer applies and every strategy the mapper
//! tries leaves a tag. The ordered tag list is part of each output record, so
//! the exact display strings are a stable contract.

use std::fmt;

/// One entry in a status trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Full phrase matched a canonical label verbatim.
    DirectMatch,
    /// Matched after case folding.
    ChangeOfCase,
    /// Matched through the precomputed label-permutation index.
    PermutationMatch,
    /// Matched through the bracketed-label permutation index.
    BracketedPermutationMatch,
    /// Matched after appending the given suffix to the phrase.
    SuffixAddition(String),
    /// Matched after replacing the phrase by its synonym.
    SynonymUsage,
    /// Matched through the qualities (semantic tag) lexicon.
    QualityTag,
    /// Matched through the processes lexicon.
    ProcessTag,
    PunctuationTreatment,
    PossessiveRemoval,
    InflectionTreatment,
    SpellingCorrection,
    AbbreviationTreatment,
    NonEnglishTreatment,
    StopWordsTreatment,
    DuplicateTokensRemoved,
    EmptySample,
    SorryNoMatch,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::DirectMatch => write!(f, "A Direct Match"),
            Status::ChangeOfCase => write!(f, "Change of Case in Input Data"),
            Status::PermutationMatch => {
                write!(f, "Permutation of Tokens in Resource Term")
            }
            Status::BracketedPermutationMatch => {
                write!(f, "Permutation of Tokens in Bracketed Resource Term")
            }
            Status::SuffixAddition(suffix) => write!(f, "Suffix Addition- {suffix}"),
            Status::SynonymUsage => write!(f, "Synonym Usage"),
            Status::QualityTag => write!(f, "Using Semantic Tagging Resources"),
            Status::ProcessTag => write!(f, "Using Candidate Processes"),
            Status::PunctuationTreatment => write!(f, "Punctuation Treatment"),
            Status::PossessiveRemoval => write!(f, "Possessive Term Removal"),
            Status::InflectionTreatment => write!(f, "Inflection (Plural) Treatment"),
            Status::SpellingCorrection => write!(f, "Spelling Correction Treatment"),
            Status::AbbreviationTreatment => write!(f, "Abbreviation-Acronym Treatment"),
            Status::NonEnglishTreatment => {
                write!(f, "Non English Language Words Treatment")
            }
            Status::StopWordsTreatment => write!(f, "Stop Words Treatment"),
            Status::DuplicateTokensRemoved => write!(f, "Duplicate Tokens Removed"),
            Status::EmptySample => write!(f, "Empty Sample"),
            Status::SorryNoMatch => write!(f, "Sorry No Match"),
        }
    }
}

/// Coarse outcome of a whole sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroStatus {
    FullTermMatch,
    ComponentMatch,
    NoMatch,
    EmptySample,
}

impl fmt::Display for MacroStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacroStatus::FullTermMatch => write!(f, "Full Term Match"),
            MacroStatus::ComponentMatch => write!(f, "GComponent Match"),
            MacroStatus::NoMatch => write!(f, "Sorry No Match"),
            MacroStatus::EmptySample => write!(f, "Empty Sample"),
        }
    }
}

/// Render a status trail as a single output-cell string.
pub fn join_statuses(statuses: &[Status]) -> String {
    statuses
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_strings() {
        assert_eq!(Status::DirectMatch.to_string(), "A Direct Match");
        assert_eq!(
            Status::ChangeOfCase.to_string(),
            "Change of Case in Input Data"
        );
        assert_eq!(
            Status::BracketedPermutationMatch.to_string(),
            "Permutation of Tokens in Bracketed Resource Term"
        );
        assert_eq!(MacroStatus::ComponentMatch.to_string(), "GComponent Match");
    }

    #[test]
    fn test_join() {
        let trail = vec![Status::ChangeOfCase, Status::SynonymUsage];
        assert_eq!(
            join_statuses(&trail),
            "Change of Case in Input Data; Synonym Usage"
        );
    }
}
