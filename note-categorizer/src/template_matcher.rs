use std::sync::Arc;

use tracing::debug;

use crate::lexicon::Lexicon;
use crate::scorer::ScoringWeights;
use crate::template::{Template, TemplateSuggestion};

/// Fixed keyword check tied to a well-known template identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateTrigger {
    pub template_id: String,
    pub keywords: Vec<String>,
    /// Human-readable label used in the suggestion reasoning
    pub label: String,
}

impl TemplateTrigger {
    pub fn new<K: Into<String>>(template_id: &str, keywords: Vec<K>, label: &str) -> Self {
        Self {
            template_id: normalize_template_id(template_id),
            keywords: keywords.into_iter().map(|k| k.into().to_lowercase()).collect(),
            label: label.to_string(),
        }
    }

    /// Trigger words found in already lower-cased text
    fn matched<'a>(&'a self, lower_text: &str) -> Vec<&'a str> {
        self.keywords
            .iter()
            .filter(|keyword| lower_text.contains(keyword.as_str()))
            .map(String::as_str)
            .collect()
    }
}

/// Triggers for the built-in emergency, follow-up, physical-exam and procedure templates
pub fn default_triggers() -> Vec<TemplateTrigger> {
    vec![
        TemplateTrigger::new(
            "emergency",
            vec!["emergency", "urgent", "severe", "acute"],
            "Emergency indicators",
        ),
        TemplateTrigger::new(
            "follow-up",
            vec!["follow", "return", "progress", "better"],
            "Follow-up indicators",
        ),
        TemplateTrigger::new(
            "physical-exam",
            vec!["examination", "physical", "inspect", "palpat"],
            "Physical examination indicators",
        ),
        TemplateTrigger::new(
            "procedure",
            vec!["procedure", "surgery", "operation", "inject"],
            "Procedure indicators",
        ),
    ]
}

fn normalize_template_id(id: &str) -> String {
    id.trim().to_lowercase().replace('_', "-")
}

/// Recommends the template that best fits a whole transcription
#[derive(Debug, Clone)]
pub struct TemplateMatcher {
    lexicon: Arc<Lexicon>,
    weights: ScoringWeights,
    triggers: Vec<TemplateTrigger>,
}

impl TemplateMatcher {
    pub fn new(lexicon: Arc<Lexicon>, weights: ScoringWeights) -> Self {
        Self {
            lexicon,
            weights,
            triggers: default_triggers(),
        }
    }

    pub fn with_triggers(mut self, triggers: Vec<TemplateTrigger>) -> Self {
        self.triggers = triggers;
        self
    }

    /// Combined identity and coverage score for one template, without thresholding
    pub fn score_template(&self, text: &str, template: &Template) -> TemplateSuggestion {
        let lower_text = text.to_lowercase();
        let mut score = 0.0;
        let mut reasoning = Vec::new();

        let template_id = normalize_template_id(&template.id);
        if let Some(trigger) = self.triggers.iter().find(|t| t.template_id == template_id) {
            let matched = trigger.matched(&lower_text);
            if !matched.is_empty() {
                score += self.weights.template_trigger_bonus;
                reasoning.push(format!("{} detected: {}", trigger.label, matched.join(", ")));
            }
        }

        let total = template.sections.len();
        if total > 0 {
            let covered = template
                .sections
                .iter()
                .filter(|section| self.lexicon.mentions(section.section_type, &lower_text))
                .count();
            if covered > 0 {
                score += (covered as f64 / total as f64) * self.weights.coverage_weight;
                reasoning.push(format!("Content matches {covered} of {total} template sections"));
            }
        }

        TemplateSuggestion {
            template_id: template.id.clone(),
            confidence: score.clamp(0.0, 1.0),
            reasoning,
        }
    }

    /// Highest-scoring template if it clears the acceptance threshold.
    ///
    /// Ties keep the template listed first. There is no fallback template.
    pub fn suggest_template(&self, text: &str, templates: &[Template]) -> Option<TemplateSuggestion> {
        if text.trim().is_empty() {
            return None;
        }

        let mut best: Option<TemplateSuggestion> = None;
        for template in templates {
            let candidate = self.score_template(text, template);
            debug!(
                template_id = %candidate.template_id,
                score = candidate.confidence,
                "Scored template"
            );
            if best
                .as_ref()
                .map_or(true, |current| candidate.confidence > current.confidence)
            {
                best = Some(candidate);
            }
        }

        best.filter(|suggestion| suggestion.confidence > self.weights.template_threshold)
    }
}

impl Default for TemplateMatcher {
    fn default() -> Self {
        Self::new(Arc::new(Lexicon::clinical()), ScoringWeights::default())
    }
}
