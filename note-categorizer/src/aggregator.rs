use std::sync::Arc;

use tracing::debug;

use crate::lexicon::Lexicon;
use crate::scorer::{ScoringWeights, SectionScorer};
use crate::segmenter::SentenceSegmenter;
use crate::template::{CategorizationGroup, ClassificationResult, TemplateSection};

/// Rule-based categorizer: segment, score, then merge per section.
///
/// Pure and synchronous; a single instance can be shared across threads.
#[derive(Debug, Clone)]
pub struct Categorizer {
    segmenter: SentenceSegmenter,
    scorer: SectionScorer,
}

impl Categorizer {
    pub fn new(lexicon: Arc<Lexicon>, weights: ScoringWeights) -> Self {
        Self {
            segmenter: SentenceSegmenter::new(weights.min_fragment_chars),
            scorer: SectionScorer::new(lexicon, weights),
        }
    }

    pub fn scorer(&self) -> &SectionScorer {
        &self.scorer
    }

    /// Every fragment that clears the confidence floor, in source order
    pub fn classify_fragments(&self, text: &str, sections: &[TemplateSection]) -> Vec<ClassificationResult> {
        if sections.is_empty() {
            return Vec::new();
        }

        let threshold = self.scorer.weights().fragment_threshold;
        self.segmenter
            .segment(text)
            .into_iter()
            .filter_map(|fragment| self.scorer.classify(fragment, sections))
            .filter(|result| result.confidence > threshold)
            .collect()
    }

    /// Route fragments of `text` into sections.
    ///
    /// Groups appear in the order their first fragment appeared; within a
    /// group fragments are joined with a single space in source order and the
    /// confidence is the maximum over the group.
    pub fn categorize(&self, text: &str, sections: &[TemplateSection]) -> Vec<CategorizationGroup> {
        let mut groups: Vec<CategorizationGroup> = Vec::new();

        for result in self.classify_fragments(text, sections) {
            match groups.iter_mut().find(|g| g.section_id == result.section_id) {
                Some(group) => {
                    group.confidence = group.confidence.max(result.confidence);
                    group.suggested_content.push(' ');
                    group.suggested_content.push_str(&result.suggested_content);
                }
                None => groups.push(result.into()),
            }
        }

        debug!(
            sections = sections.len(),
            groups = groups.len(),
            "Rule-based categorization complete"
        );

        groups
    }
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::new(Arc::new(Lexicon::clinical()), ScoringWeights::default())
    }
}
