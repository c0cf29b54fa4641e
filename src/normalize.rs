//! Deterministic text-cleaning pipeline
//!
//! Turns a raw specimen description into a canonical cleaned phrase plus a
//! status trail of every transformation applied. The pipeline is a pure
//! function of the phrase and the lexicon tables, and is idempotent: cleaning
//! an already-clean phrase changes nothing.

use crate::lexicon::Lexicon;
use crate::status::Status;
use chrono::NaiveDate;
use rustc_hash::FxHashSet;

/// Characters replaced by a space during punctuation treatment.
const PUNCTUATION: &[char] = &['-', '_', '(', ')', ';', '/', ':', '%'];

/// Date formats accepted by the date-token exemption.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%d-%m-%Y", "%m-%d-%Y", "%Y/%m/%d", "%d/%m/%Y", "%m/%d/%Y", "%Y.%m.%d",
    "%d.%m.%Y", "%d %b %Y", "%b %d %Y",
];

/// A cleaned phrase together with its provenance trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedSample {
    pub phrase: String,
    pub status: Vec<Status>,
}

/// Run the full cleaning pipeline over `phrase`.
pub fn normalize(phrase: &str, lexicon: &Lexicon) -> CleanedSample {
    let mut status = Vec::new();

    // Case folding comes first so every later lookup sees lowercase.
    let lowered = phrase.to_lowercase();
    if lowered != phrase {
        status.push(Status::ChangeOfCase);
    }

    let mut tokens: Vec<String> = lowered.split_whitespace().map(str::to_string).collect();

    // 1. Punctuation substitution, with numbers and dates exempt.
    let mut changed = false;
    let mut depunct = Vec::new();
    for token in &tokens {
        if is_number(token) || is_date(token) {
            depunct.push(token.clone());
            continue;
        }
        let replaced: String = token
            .chars()
            .map(|c| if PUNCTUATION.contains(&c) { ' ' } else { c })
            .collect();
        if replaced != *token {
            changed = true;
        }
        depunct.extend(replaced.split_whitespace().map(str::to_string));
    }
    tokens = depunct;
    if changed {
        status.push(Status::PunctuationTreatment);
    }

    // 2. Possessives and trailing punctuation.
    let mut changed = false;
    for token in &mut tokens {
        let stripped = strip_trailing(token);
        if stripped != *token {
            *token = stripped;
            changed = true;
        }
    }
    tokens.retain(|t| !t.is_empty());
    if changed {
        status.push(Status::PossessiveRemoval);
    }

    // 3. Singularization.
    let mut changed = false;
    for token in &mut tokens {
        let singular = singularize(token, &lexicon.inflection_exceptions);
        if singular != *token {
            *token = singular;
            changed = true;
        }
    }
    if changed {
        status.push(Status::InflectionTreatment);
    }

    // 4-6. Token substitutions from the lexicons, in fixed order.
    for (map, tag) in [
        (&lexicon.spelling_mistakes, Status::SpellingCorrection),
        (&lexicon.abbreviations, Status::AbbreviationTreatment),
        (&lexicon.non_english, Status::NonEnglishTreatment),
    ] {
        let mut changed = false;
        let mut substituted = Vec::new();
        for token in &tokens {
            match Lexicon::lookup(map, token) {
                Some(replacement) if replacement != token => {
                    substituted.extend(replacement.split_whitespace().map(str::to_string));
                    changed = true;
                }
                _ => substituted.push(token.clone()),
            }
        }
        tokens = substituted;
        if changed {
            status.push(tag);
        }
    }

    // 7. Stop-word removal.
    let before = tokens.len();
    tokens.retain(|t| !lexicon.stop_words.contains(t));
    if tokens.len() != before {
        status.push(Status::StopWordsTreatment);
    }

    let mut cleaned = tokens.join(" ");

    // Whole-phrase recheck for multi-word acronyms and foreign phrases.
    if let Some(expanded) = Lexicon::lookup(&lexicon.abbreviations, &cleaned) {
        if expanded != cleaned {
            cleaned = expanded.to_string();
            status.push(Status::AbbreviationTreatment);
        }
    }
    if let Some(translated) = Lexicon::lookup(&lexicon.non_english, &cleaned) {
        if translated != cleaned {
            cleaned = translated.to_string();
            status.push(Status::NonEnglishTreatment);
        }
    }

    CleanedSample {
        phrase: cleaned,
        status,
    }
}

/// Strip a trailing `'s`, comma, or period from one token.
fn strip_trailing(token: &str) -> String {
    let mut t = token.trim_end_matches([',', '.']);
    if let Some(stripped) = t.strip_suffix("'s") {
        t = stripped;
    }
    t.trim_end_matches('\'').to_string()
}

/// Deterministic singularization. Tokens ending in `us`, `ia`, or `ta`,
/// and tokens listed in the inflection-exceptions lexicon, pass through.
pub fn singularize(token: &str, exceptions: &FxHashSet<String>) -> String {
    if exceptions.contains(token)
        || token.ends_with("us")
        || token.ends_with("ia")
        || token.ends_with("ta")
    {
        return token.to_string();
    }
    if let Some(stem) = token.strip_suffix("ies") {
        if stem.len() > 1 {
            return format!("{stem}y");
        }
    }
    if let Some(stem) = token.strip_suffix("es") {
        if stem.ends_with("ss")
            || stem.ends_with('x')
            || stem.ends_with('z')
            || stem.ends_with("ch")
            || stem.ends_with("sh")
        {
            return stem.to_string();
        }
    }
    if token.len() > 1 && token.ends_with('s') && !token.ends_with("ss") && !token.ends_with("is")
    {
        return token[..token.len() - 1].to_string();
    }
    token.to_string()
}

/// Collapse repeated tokens, keeping first occurrences. Not part of the
/// main cleaning path; callers that want it apply it after `normalize`.
pub fn remove_duplicate_tokens(phrase: &str) -> (String, bool) {
    let mut seen = FxHashSet::default();
    let mut kept = Vec::new();
    let mut removed = false;
    for token in phrase.split_whitespace() {
        if seen.insert(token) {
            kept.push(token);
        } else {
            removed = true;
        }
    }
    (kept.join(" "), removed)
}

/// True for tokens that parse as plain numbers.
pub fn is_number(token: &str) -> bool {
    !token.is_empty() && token.parse::<f64>().is_ok()
}

/// True for tokens that parse as a date in any of the accepted formats.
pub fn is_date(token: &str) -> bool {
    DATE_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(token, fmt).is_ok())
}
