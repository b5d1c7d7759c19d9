use proptest::prelude::*;

use super::*;

fn preprocess(query: &str) -> (String, QueryTransformation) {
    QueryPreprocessor::default().preprocess(query)
}

#[test]
fn how_to_query_expands_product_and_appends_guide_phrase() {
    let (enhanced, transformation) = preprocess("how to create cja segment");

    assert!(enhanced.contains("Customer Journey Analytics"));
    assert!(enhanced.ends_with("step-by-step guide tutorial"));
    assert_eq!(transformation.changes.len(), 2);
    assert_eq!(transformation.abbreviation_expansions, 1);
    assert_eq!(transformation.contextual_enhancements, 1);
    assert!(transformation.was_modified);
    assert!(transformation.rejection.is_none());

    match &transformation.changes[0] {
        QueryChange::Abbreviation {
            original,
            replacement,
            position,
        } => {
            assert_eq!(original, "cja");
            assert_eq!(replacement, "Customer Journey Analytics");
            assert_eq!(&enhanced[*position..*position + replacement.len()], replacement);
        }
        other => panic!("expected abbreviation change, got {other:?}"),
    }
    assert!(matches!(
        &transformation.changes[1],
        QueryChange::Context {
            category: IntentCategory::HowTo,
            ..
        }
    ));
}

#[test]
fn quoted_text_is_left_byte_identical() {
    let (enhanced, transformation) = preprocess(r#"compare "cja" and cja"#);

    assert!(enhanced.starts_with(r#"compare "cja" and Customer Journey Analytics"#));
    assert_eq!(transformation.abbreviation_expansions, 1);
}

#[test]
fn curly_and_single_quotes_protect_their_contents() {
    let (enhanced, _) = preprocess("find \u{201C}aep schema\u{201D} in 'rs' docs");

    assert!(enhanced.contains("\u{201C}aep schema\u{201D}"));
    assert!(enhanced.contains("'rs'"));
}

#[test]
fn apostrophes_do_not_open_quoted_spans() {
    let (enhanced, _) = preprocess("what's the aep limit");

    assert!(enhanced.contains("Adobe Experience Platform"));
}

#[test]
fn expansion_already_present_is_not_repeated() {
    let (enhanced, transformation) = preprocess("Customer Journey Analytics vs cja");

    assert!(enhanced.contains("vs cja"));
    assert_eq!(transformation.abbreviation_expansions, 0);
}

#[test]
fn repeated_abbreviation_is_expanded_once() {
    let (enhanced, transformation) = preprocess("cja reports and cja exports");

    assert_eq!(enhanced.matches("Customer Journey Analytics").count(), 1);
    assert_eq!(transformation.abbreviation_expansions, 1);
}

#[test]
fn longest_abbreviation_wins_over_its_prefix() {
    let (enhanced, transformation) = preprocess("calc metric rounding");

    assert_eq!(enhanced, "calculated metric rounding");
    assert_eq!(transformation.abbreviation_expansions, 1);
}

#[test]
fn abbreviation_inside_a_longer_word_is_ignored() {
    let (enhanced, transformation) = preprocess("seasonality trends");

    assert_eq!(enhanced, "seasonality trends");
    assert!(!transformation.was_modified);
}

#[test]
fn non_word_abbreviation_matches_at_end_of_query() {
    let (enhanced, _) = preprocess("when does s.t() fire");

    assert!(enhanced.contains("s.t() page view tracking"));
}

#[test]
fn expansions_are_not_rescanned_for_other_abbreviations() {
    let (enhanced, transformation) = preprocess("conversion rate report");

    assert_eq!(enhanced, "conversion event rate report");
    assert_eq!(transformation.abbreviation_expansions, 1);
}

#[test]
fn first_matching_intent_wins() {
    let (enhanced, transformation) = preprocess("how to fix tracking error");

    assert!(enhanced.ends_with("step-by-step guide tutorial"));
    assert!(!enhanced.contains("troubleshooting fix"));
    assert_eq!(transformation.contextual_enhancements, 1);
}

#[test]
fn intent_phrase_mostly_present_is_not_appended() {
    let (enhanced, transformation) = preprocess("create a tutorial: step-by-step guide");

    assert_eq!(enhanced, "create a tutorial: step-by-step guide");
    assert_eq!(transformation.contextual_enhancements, 0);
}

#[test]
fn query_without_intent_or_abbreviation_is_untouched() {
    let (enhanced, transformation) = preprocess("  workspace panels  ");

    assert_eq!(enhanced, "workspace panels");
    assert!(!transformation.was_modified);
    assert!(transformation.changes.is_empty());
}

#[test]
fn empty_query_is_returned_unchanged_with_note() {
    let (enhanced, transformation) = preprocess("   ");

    assert_eq!(enhanced, "   ");
    assert!(!transformation.was_modified);
    assert_eq!(transformation.rejection, Some(QueryRejection::Empty));
}

#[test]
fn oversized_query_is_returned_unchanged_with_note() {
    let preprocessor = QueryPreprocessor::new(10);
    let query = "how to create cja segment";

    let (enhanced, transformation) = preprocessor.preprocess(query);

    assert_eq!(enhanced, query);
    assert!(!transformation.was_modified);
    assert_eq!(
        transformation.rejection,
        Some(QueryRejection::TooLong {
            length: query.chars().count(),
            max_length: 10,
        })
    );
}

#[test]
fn custom_abbreviation_is_applied_and_sorted() {
    let mut preprocessor = QueryPreprocessor::default();
    preprocessor
        .add_custom_abbreviation("AJO", "Adobe Journey Optimizer")
        .expect("custom abbreviation should compile");

    let (enhanced, _) = preprocessor.preprocess("ajo journeys");
    assert_eq!(enhanced, "Adobe Journey Optimizer journeys");

    let table = preprocessor.abbreviations();
    let lengths = table
        .iter()
        .map(|(abbreviation, _)| abbreviation.chars().count())
        .collect::<Vec<usize>>();
    assert!(lengths.windows(2).all(|pair| pair[0] >= pair[1]));
}

#[test]
fn custom_abbreviation_replaces_existing_entry() {
    let mut preprocessor = QueryPreprocessor::default();
    preprocessor
        .add_custom_abbreviation("rs", "reporting source")
        .expect("custom abbreviation should compile");

    let (enhanced, _) = preprocessor.preprocess("rs settings");
    assert_eq!(enhanced, "reporting source settings");
    assert_eq!(
        preprocessor
            .abbreviations()
            .iter()
            .filter(|(abbreviation, _)| *abbreviation == "rs")
            .count(),
        1
    );
}

#[test]
fn malformed_custom_abbreviation_is_rejected_without_side_effects() {
    let mut preprocessor = QueryPreprocessor::default();
    let before = preprocessor.abbreviations().len();

    assert!(preprocessor.add_custom_abbreviation("  ", "nothing").is_err());
    assert!(preprocessor.add_custom_abbreviation("xyz", "").is_err());
    assert_eq!(preprocessor.abbreviations().len(), before);
}

#[test]
fn intents_are_evaluated_in_fixed_order() {
    let preprocessor = QueryPreprocessor::default();
    let order = preprocessor
        .intents()
        .iter()
        .map(|rule| rule.category())
        .collect::<Vec<IntentCategory>>();

    assert_eq!(
        order,
        vec![
            IntentCategory::HowTo,
            IntentCategory::Comparison,
            IntentCategory::Troubleshooting,
            IntentCategory::BestPractices,
            IntentCategory::Definition,
        ]
    );
}

#[test]
fn validate_reports_short_and_abbreviated_queries() {
    let preprocessor = QueryPreprocessor::default();

    let short = preprocessor.validate("hi");
    assert!(!short.valid);
    assert_eq!(short.error.as_deref(), Some("query too short"));

    let valid = preprocessor.validate(r#"aep vs "cja" data"#);
    assert!(valid.valid);
    assert!(valid.potential_abbreviations.contains(&"aep".to_string()));
    assert!(!valid.potential_abbreviations.contains(&"cja".to_string()));
}

#[test]
fn token_overlap_ignores_case_and_punctuation() {
    assert_eq!(token_overlap("troubleshooting fix", "Fix, TROUBLESHOOTING!"), 1.0);
    assert_eq!(token_overlap("comparison explanation", "comparison of tools"), 0.5);
}

const EXPANDABLE: &[&str] = &[
    "cja", "aep", "aam", "acp", "aem", "rs", "dv", "ds", "rtcdp", "cdp", "dmp", "seg", "dim",
];
const INTENT_OPENERS: &[&str] = &["how to", "compare", "error in", "optimize", "what is", ""];
const FILLER: &[&str] = &[
    "numbers", "monthly", "users", "export", "latest", "my", "with", "show", "for", "panels",
];

fn filler_words() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(prop::sample::select(FILLER), 0..5)
}

proptest! {
    #[test]
    fn standalone_abbreviation_is_replaced_by_expansion(
        abbreviation in prop::sample::select(EXPANDABLE),
        upper in any::<bool>(),
        before in filler_words(),
        after in filler_words(),
    ) {
        let token = if upper { abbreviation.to_uppercase() } else { abbreviation.to_string() };
        let mut words = before.iter().copied().collect::<Vec<&str>>();
        words.push(token.as_str());
        words.extend(after.iter().copied());
        let query = words.join(" ");

        let preprocessor = QueryPreprocessor::default();
        let (enhanced, _) = preprocessor.preprocess(&query);
        let expansion = preprocessor
            .abbreviations()
            .into_iter()
            .find(|(key, _)| *key == abbreviation)
            .map(|(_, expansion)| expansion.to_string())
            .expect("abbreviation is in the default table");

        prop_assert!(enhanced.contains(&expansion));
        prop_assert!(
            enhanced
                .split_whitespace()
                .all(|word| !word.eq_ignore_ascii_case(abbreviation))
        );
    }

    #[test]
    fn quoted_substring_survives_preprocessing(
        abbreviation in prop::sample::select(EXPANDABLE),
        before in filler_words(),
        after in filler_words(),
    ) {
        let quoted = format!("\"{abbreviation} how to\"");
        let query = format!("{} {quoted} {} {abbreviation}", before.join(" "), after.join(" "));

        let (enhanced, _) = preprocess(&query);

        prop_assert!(enhanced.contains(&quoted));
    }

    #[test]
    fn preprocessing_is_stable_on_its_own_output(
        abbreviation in prop::sample::select(EXPANDABLE),
        intent in prop::sample::select(INTENT_OPENERS),
        words in filler_words(),
    ) {
        let query = format!("{intent} {abbreviation} {}", words.join(" "));
        let preprocessor = QueryPreprocessor::default();

        let (first, _) = preprocessor.preprocess(&query);
        let (second, transformation) = preprocessor.preprocess(&first);

        prop_assert_eq!(&second, &first);
        prop_assert!(!transformation.was_modified);
    }
}
