//! Property tests for the rule-based pipeline over generated dictation

use std::collections::HashSet;

use note_categorizer::*;
use proptest::prelude::*;

const WORDS: &[&str] = &[
    "patient", "complains", "of", "headache", "nausea", "bp", "140/90", "88", "bpm", "follow-up",
    "in", "two", "weeks", "recheck", "blood", "pressure", "prescribed", "amoxicillin", "500", "mg",
    "assessment", "migraine", "history", "diabetes", "abdomen", "tender", "lungs", "clear", "the",
    "and", "discussed", "questions", "answered", "severe", "emergency", "return", "better", "injection",
    "Dr", "x", "résumé", "naïve",
];

const TERMINATORS: &[&str] = &[" ", " ", " ", ". ", "! ", "? ", ", "];

fn dictation() -> impl Strategy<Value = String> {
    prop::collection::vec(
        (prop::sample::select(WORDS), prop::sample::select(TERMINATORS)),
        0..60,
    )
    .prop_map(|tokens| {
        tokens
            .into_iter()
            .map(|(word, sep)| format!("{word}{sep}"))
            .collect::<String>()
    })
}

proptest! {
    #[test]
    fn confidences_stay_in_range(text in dictation()) {
        let categorizer = Categorizer::default();
        let template = templates::general_consultation();

        for group in categorizer.categorize(&text, &template.sections) {
            prop_assert!(group.confidence > 0.3);
            prop_assert!(group.confidence <= 1.0);
        }
    }

    #[test]
    fn short_fragments_never_classified(text in dictation()) {
        let categorizer = Categorizer::default();
        let template = templates::general_consultation();

        for result in categorizer.classify_fragments(&text, &template.sections) {
            prop_assert!(result.suggested_content.chars().count() > 10);
            prop_assert!(!result.suggested_content.contains(['.', '!', '?']));
        }
    }

    #[test]
    fn groups_are_unique_and_known(text in dictation()) {
        let categorizer = Categorizer::default();
        let template = templates::general_consultation();

        let groups = categorizer.categorize(&text, &template.sections);
        let ids: HashSet<&str> = groups.iter().map(|g| g.section_id.as_str()).collect();
        prop_assert_eq!(ids.len(), groups.len());
        for id in ids {
            prop_assert!(template.section(id).is_some());
        }
    }

    #[test]
    fn categorization_is_deterministic(text in dictation()) {
        let categorizer = Categorizer::default();
        let template = templates::follow_up();

        prop_assert_eq!(
            categorizer.categorize(&text, &template.sections),
            categorizer.categorize(&text, &template.sections)
        );
    }

    #[test]
    fn groups_follow_first_appearance(text in dictation()) {
        let categorizer = Categorizer::default();
        let template = templates::general_consultation();

        let mut first_seen: Vec<String> = Vec::new();
        for result in categorizer.classify_fragments(&text, &template.sections) {
            if !first_seen.contains(&result.section_id) {
                first_seen.push(result.section_id);
            }
        }

        let order: Vec<String> = categorizer
            .categorize(&text, &template.sections)
            .into_iter()
            .map(|g| g.section_id)
            .collect();
        prop_assert_eq!(order, first_seen);
    }

    #[test]
    fn suggestions_clear_threshold(text in dictation()) {
        let matcher = TemplateMatcher::default();

        if let Some(suggestion) = matcher.suggest_template(&text, &templates::default_templates()) {
            prop_assert!(suggestion.confidence > 0.2);
            prop_assert!(suggestion.confidence <= 1.0);
            prop_assert!(!suggestion.reasoning.is_empty());
            prop_assert!(templates::find(&suggestion.template_id).is_some());
        }
    }

    #[test]
    fn scores_bounded_for_arbitrary_text(text in ".{0,200}") {
        let scorer = SectionScorer::default();
        for section in templates::general_consultation().sections {
            let score = scorer.score(&text, &section);
            prop_assert!((0.0..=1.0).contains(&score));
        }
    }
}
