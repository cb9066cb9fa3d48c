use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::lexicon::Lexicon;
use crate::template::{ClassificationResult, SectionType, TemplateSection};

lazy_static! {
    static ref RATIO_PATTERN: Regex = Regex::new(r"\d+/\d+").unwrap();
    static ref MEASUREMENT_PATTERN: Regex = Regex::new(r"\d+\s*(?:bpm|mmhg|degrees|kg|lbs)").unwrap();
}

/// Scoring constants shared by the scorer, aggregator and template matcher
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    /// Keyword found as a whole, space-delimited word
    pub exact_match: f64,
    /// Keyword found only as a substring
    pub partial_match: f64,
    /// Section-type trigger phrase present
    pub context_bonus: f64,
    /// Raw scores are divided by `max(keyword_count * keyword_normalizer, 1)`
    pub keyword_normalizer: f64,
    pub min_fragment_chars: usize,
    /// Fragments must score strictly above this to be kept
    pub fragment_threshold: f64,
    /// Template suggestions must score strictly above this
    pub template_threshold: f64,
    pub template_trigger_bonus: f64,
    pub coverage_weight: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            exact_match: 3.0,
            partial_match: 2.0,
            context_bonus: 1.0,
            keyword_normalizer: 0.1,
            min_fragment_chars: 10,
            fragment_threshold: 0.3,
            template_threshold: 0.2,
            template_trigger_bonus: 0.4,
            coverage_weight: 0.3,
        }
    }
}

/// Per-type contextual trigger that earns the bonus
enum ContextRule {
    AnyOf(&'static [&'static str]),
    Measurement,
    Unsupported,
}

fn context_rule(section_type: SectionType) -> ContextRule {
    match section_type {
        SectionType::Symptoms => ContextRule::AnyOf(&["complain", "report", "feel", "experience"]),
        SectionType::Diagnosis => ContextRule::AnyOf(&["assess", "diagnos", "condition", "impression"]),
        SectionType::Treatment => ContextRule::AnyOf(&["recommend", "prescrib", "treat", "therapy"]),
        SectionType::Examination => ContextRule::AnyOf(&["exam", "find", "appear", "normal"]),
        SectionType::Plan => ContextRule::AnyOf(&["follow", "return", "next", "continue"]),
        SectionType::Vitals => ContextRule::Measurement,
        SectionType::History | SectionType::Notes => ContextRule::Unsupported,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeywordMatch {
    WholeWord,
    Partial,
}

/// Classify how `keyword` occurs in `text`, preferring a whole-word hit
fn keyword_match(text: &str, keyword: &str) -> Option<KeywordMatch> {
    let mut found = None;
    for (start, matched) in text.match_indices(keyword) {
        let end = start + matched.len();
        let before_ok = text[..start].is_empty() || text[..start].ends_with(' ');
        let after_ok = text[end..].is_empty() || text[end..].starts_with(' ');
        if before_ok && after_ok {
            return Some(KeywordMatch::WholeWord);
        }
        found = Some(KeywordMatch::Partial);
    }
    found
}

/// Affinity of a fragment to a template section, in `[0, 1]`
#[derive(Debug, Clone)]
pub struct SectionScorer {
    lexicon: Arc<Lexicon>,
    weights: ScoringWeights,
}

impl SectionScorer {
    pub fn new(lexicon: Arc<Lexicon>, weights: ScoringWeights) -> Self {
        Self { lexicon, weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Lexicon keywords for the section type followed by the section's own,
    /// lower-cased and de-duplicated
    pub fn candidate_keywords(&self, section: &TemplateSection) -> Vec<String> {
        let mut keywords: Vec<String> = self.lexicon.keywords(section.section_type).to_vec();
        for keyword in &section.keywords {
            let keyword = keyword.trim().to_lowercase();
            if !keyword.is_empty() && !keywords.contains(&keyword) {
                keywords.push(keyword);
            }
        }
        keywords
    }

    pub fn score(&self, fragment: &str, section: &TemplateSection) -> f64 {
        let normalized = fragment.trim().to_lowercase();
        if normalized.is_empty() {
            return 0.0;
        }

        let keywords = self.candidate_keywords(section);
        let mut raw = 0.0;
        for keyword in &keywords {
            match keyword_match(&normalized, keyword) {
                Some(KeywordMatch::WholeWord) => raw += self.weights.exact_match,
                Some(KeywordMatch::Partial) => raw += self.weights.partial_match,
                None => {}
            }
        }

        if has_context_trigger(section.section_type, &normalized) {
            raw += self.weights.context_bonus;
        }

        let divisor = (keywords.len() as f64 * self.weights.keyword_normalizer).max(1.0);
        (raw / divisor).clamp(0.0, 1.0)
    }

    /// Best-scoring section for a fragment. Ties keep the earlier section;
    /// a best score of zero yields `None`.
    pub fn classify(&self, fragment: &str, sections: &[TemplateSection]) -> Option<ClassificationResult> {
        let mut best: Option<(&TemplateSection, f64)> = None;
        for section in sections {
            let score = self.score(fragment, section);
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((section, score));
            }
        }

        match best {
            Some((section, confidence)) if confidence > 0.0 => Some(ClassificationResult {
                section_id: section.id.clone(),
                confidence,
                suggested_content: fragment.trim().to_string(),
            }),
            _ => None,
        }
    }
}

impl Default for SectionScorer {
    fn default() -> Self {
        Self::new(Arc::new(Lexicon::clinical()), ScoringWeights::default())
    }
}

/// Whether the lower-cased fragment fires the contextual rule for `section_type`
pub fn has_context_trigger(section_type: SectionType, normalized: &str) -> bool {
    match context_rule(section_type) {
        ContextRule::AnyOf(terms) => terms.iter().any(|term| normalized.contains(term)),
        ContextRule::Measurement => {
            RATIO_PATTERN.is_match(normalized) || MEASUREMENT_PATTERN.is_match(normalized)
        }
        ContextRule::Unsupported => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_scorer(section_type: SectionType, keywords: Vec<&str>) -> SectionScorer {
        let lexicon = Lexicon::empty().with_keywords(section_type, keywords);
        SectionScorer::new(Arc::new(lexicon), ScoringWeights::default())
    }

    #[test]
    fn test_keyword_match_kinds() {
        assert_eq!(keyword_match("mild headache today", "headache"), Some(KeywordMatch::WholeWord));
        assert_eq!(keyword_match("headache", "headache"), Some(KeywordMatch::WholeWord));
        assert_eq!(keyword_match("headaches since monday", "headache"), Some(KeywordMatch::Partial));
        assert_eq!(keyword_match("nausea, headache", "nausea"), Some(KeywordMatch::Partial));
        assert_eq!(keyword_match("no complaints", "headache"), None);
    }

    #[test]
    fn test_whole_word_found_after_partial_occurrence() {
        assert_eq!(
            keyword_match("painful joints with pain at night", "pain"),
            Some(KeywordMatch::WholeWord)
        );
    }

    #[test]
    fn test_exact_and_partial_weights() {
        // Fewer than ten keywords keeps the divisor at 1
        let scorer = bare_scorer(SectionType::History, vec!["smoker", "asthma"]);
        let section = TemplateSection::new("h", "History", SectionType::History);

        assert_eq!(scorer.score("former smoker of ten years", &section), 1.0);
        assert_eq!(scorer.score("nonsmoker household", &section), 1.0);
        assert_eq!(scorer.score("no relevant background", &section), 0.0);
    }

    #[test]
    fn test_normalization_by_keyword_count() {
        let keywords: Vec<String> = (0..30).map(|i| format!("term{i:02}")).collect();
        let lexicon = Lexicon::empty().with_keywords(SectionType::Notes, keywords);
        let scorer = SectionScorer::new(Arc::new(lexicon), ScoringWeights::default());
        let section = TemplateSection::new("n", "Notes", SectionType::Notes);

        // one exact hit (3) over a divisor of 30 * 0.1
        let score = scorer.score("remember term07 later", &section);
        assert!((score - 1.0).abs() < 1e-9);

        let score = scorer.score("remember xterm07x later", &section);
        assert!((score - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_context_bonus_only() {
        let scorer = bare_scorer(SectionType::Plan, vec![]);
        let section = TemplateSection::new("p", "Plan", SectionType::Plan);
        assert_eq!(scorer.score("continue current regimen", &section), 1.0);
    }

    #[test]
    fn test_history_and_notes_have_no_context_rule() {
        for section_type in [SectionType::History, SectionType::Notes] {
            assert!(!has_context_trigger(section_type, "patient reports follow up exam 120/80"));
        }
    }

    #[test]
    fn test_vitals_measurement_triggers() {
        assert!(has_context_trigger(SectionType::Vitals, "bp 120/80"));
        assert!(has_context_trigger(SectionType::Vitals, "pulse 72 bpm"));
        assert!(has_context_trigger(SectionType::Vitals, "weight 80kg"));
        assert!(has_context_trigger(SectionType::Vitals, "temperature 101 degrees"));
        assert!(!has_context_trigger(SectionType::Vitals, "feeling better overall"));
    }

    #[test]
    fn test_user_keywords_are_case_insensitive() {
        let scorer = bare_scorer(SectionType::Symptoms, vec![]);
        let section = TemplateSection::new("s", "Symptoms", SectionType::Symptoms)
            .with_keywords(["Tinnitus"]);
        assert_eq!(scorer.score("Intermittent tinnitus in left ear", &section), 1.0);
    }

    #[test]
    fn test_classify_prefers_first_on_tie() {
        let scorer = SectionScorer::default();
        let sections = vec![
            TemplateSection::new("first", "Plan A", SectionType::Plan),
            TemplateSection::new("second", "Plan B", SectionType::Plan),
        ];
        let result = scorer.classify("Return to clinic next month", &sections).unwrap();
        assert_eq!(result.section_id, "first");
    }

    #[test]
    fn test_classify_discards_zero_evidence() {
        let scorer = SectionScorer::default();
        let sections = vec![TemplateSection::new("v", "Vitals", SectionType::Vitals)];
        assert!(scorer.classify("Wife accompanied him today", &sections).is_none());
        assert!(scorer.classify("Anything at all here", &[]).is_none());
    }
}
