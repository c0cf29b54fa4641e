//! Property checks for the invariants the pipeline leans on.

use ontomap::component::{ComponentMatch, ComponentResult};
use ontomap::mapper::Mapping;
use ontomap::normalize::normalize;
use ontomap::refine::Refiner;
use ontomap::resource::{permutations, ResourceTable};
use ontomap::status::Status;
use ontomap::Lexicon;
use proptest::prelude::*;
use rustc_hash::FxHashSet;

fn lexicon() -> Lexicon {
    let mut lexicon = Lexicon::default();
    lexicon
        .spelling_mistakes
        .insert("chiken".to_string(), "chicken".to_string());
    lexicon
        .abbreviations
        .insert("spp".to_string(), "species".to_string());
    for word in ["of", "the", "a"] {
        lexicon.stop_words.insert(word.to_string());
    }
    for word in ["species", "feces", "mucus"] {
        lexicon.inflection_exceptions.insert(word.to_string());
    }
    lexicon
}

fn phrase_strategy() -> impl Strategy<Value = String> {
    // words of the rough shape real sample descriptions have, plus the
    // punctuation the cleaner is expected to strip
    let word = prop::string::string_regex("[a-zA-Z]{1,10}").unwrap();
    prop::collection::vec(word, 0..6).prop_map(|words| words.join(" ; "))
}

proptest! {
    #[test]
    fn normalize_is_idempotent(phrase in phrase_strategy()) {
        let lexicon = lexicon();
        let once = normalize(&phrase, &lexicon);
        let twice = normalize(&once.phrase, &lexicon);
        prop_assert_eq!(&twice.phrase, &once.phrase);
    }

    #[test]
    fn normalize_output_is_lowercase(phrase in phrase_strategy()) {
        let lexicon = lexicon();
        let cleaned = normalize(&phrase, &lexicon);
        prop_assert!(!cleaned.phrase.chars().any(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn permutation_index_round_trips(
        tokens in prop::collection::hash_set("[a-z]{2,6}", 1..5)
    ) {
        let tokens: Vec<String> = tokens.into_iter().collect();
        let label = tokens.join(" ");
        let table = ResourceTable::build(vec![(label.clone(), "x_1".to_string())]);

        let refs: Vec<&str> = tokens.iter().map(String::as_str).collect();
        for permuted in permutations(&refs) {
            prop_assert_eq!(table.get_permuted(&permuted), Some("x_1"));
        }
    }

    #[test]
    fn retained_matches_are_subset_free(
        token_sets in prop::collection::vec(
            prop::collection::hash_set("[a-d]", 1..4),
            1..6,
        )
    ) {
        let matches: Vec<ComponentMatch> = token_sets
            .into_iter()
            .enumerate()
            .map(|(i, set)| ComponentMatch {
                mapping: Mapping {
                    term: format!("term {i}"),
                    id: format!("x_{i}"),
                    status: vec![Status::DirectMatch],
                },
                tokens: set.into_iter().collect(),
            })
            .collect();
        let result = ComponentResult {
            matches,
            remaining: Vec::new(),
        };

        let retained = result.retained();
        for kept in &retained {
            let mine: FxHashSet<&str> =
                kept.tokens.iter().map(String::as_str).collect();
            for other in &retained {
                if other.tokens.len() > kept.tokens.len() {
                    let theirs: FxHashSet<&str> =
                        other.tokens.iter().map(String::as_str).collect();
                    prop_assert!(!mine.is_subset(&theirs));
                }
            }
        }
    }

    #[test]
    fn refine_is_idempotent(
        labels in prop::collection::vec(
            prop::sample::select(vec![
                "food", "animal", "cow", "dairy", "beef", "fish",
                "shellfish", "equipment", "structure", "environmental",
                "clinical/research", "animal feed", "pig", "milk",
            ]),
            0..6,
        ),
        sample in prop::sample::select(vec![
            "ground beef", "raw cow milk", "fecal swab", "oyster meat",
        ])
    ) {
        let refiner = Refiner::new(Vec::new());
        let labels: Vec<String> =
            labels.into_iter().map(str::to_string).collect();
        let once = refiner.refine(labels, sample);
        let twice = refiner.refine(once.clone(), sample);
        prop_assert_eq!(twice, once);
    }
}
