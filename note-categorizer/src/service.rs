use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::aggregator::Categorizer;
use crate::config::{CategorizationStrategy, CategorizerConfig};
use crate::error::{CategorizerError, CategorizerResult};
use crate::lexicon::Lexicon;
use crate::llm::{
    categorize_until as run_until_cancelled, clamp_confidence, create_categorizer, LlmCategorizationResponse,
    LlmCategorizer,
};
use crate::scorer::ScoringWeights;
use crate::template::{CategorizationGroup, Icd10Code, Template, TemplateSuggestion};
use crate::template_matcher::TemplateMatcher;
use crate::usage::{TracingUsageTracker, UsageTracker};

/// Which path produced a categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategorizationSource {
    Rules,
    Llm,
}

/// Content routed into one template section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizedSection {
    pub section_id: String,
    pub content: String,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub icd10_codes: Vec<Icd10Code>,
}

/// Result of categorizing one transcription against one template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteCategorization {
    pub id: Uuid,
    pub template_id: String,
    pub source: CategorizationSource,
    /// Ordered by the template's section order
    pub sections: Vec<CategorizedSection>,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NoteCategorization {
    fn new(template: &Template, source: CategorizationSource, mut sections: Vec<CategorizedSection>, summary: Option<String>) -> Self {
        sections.sort_by_key(|s| template.position(&s.section_id).unwrap_or(usize::MAX));
        Self {
            id: Uuid::new_v4(),
            template_id: template.id.clone(),
            source,
            sections,
            summary,
            created_at: Utc::now(),
        }
    }

    pub fn from_groups(template: &Template, groups: Vec<CategorizationGroup>) -> Self {
        let sections = groups
            .into_iter()
            .map(|group| CategorizedSection {
                section_id: group.section_id,
                content: group.suggested_content,
                confidence: group.confidence,
                icd10_codes: Vec::new(),
            })
            .collect();
        Self::new(template, CategorizationSource::Rules, sections, None)
    }

    /// Normalise model output against the template: unknown sections are
    /// dropped, confidences clamped, and ICD-10 codes kept only where the
    /// section type supports them. Repeated section ids are merged like
    /// rule-based groups: content joined with a space, maximum confidence.
    pub fn from_llm(template: &Template, response: LlmCategorizationResponse) -> Self {
        let mut sections: Vec<CategorizedSection> = Vec::with_capacity(response.categorizations.len());
        for item in response.categorizations {
            let Some(section) = template.section(&item.section_id) else {
                warn!(
                    template_id = %template.id,
                    section_id = %item.section_id,
                    "Dropping LLM categorization for unknown section"
                );
                continue;
            };

            let confidence = clamp_confidence(item.confidence);
            let content = item.content.trim().to_string();

            let icd10_codes = if section.section_type.supports_icd10() {
                item.icd10_codes.unwrap_or_default()
            } else {
                Vec::new()
            };

            if let Some(existing) = sections.iter_mut().find(|s| s.section_id == item.section_id) {
                existing.confidence = existing.confidence.max(confidence);
                if !content.is_empty() {
                    if !existing.content.is_empty() {
                        existing.content.push(' ');
                    }
                    existing.content.push_str(&content);
                }
                for code in icd10_codes {
                    if !existing.icd10_codes.iter().any(|c| c.code == code.code) {
                        existing.icd10_codes.push(code);
                    }
                }
                continue;
            }

            sections.push(CategorizedSection {
                section_id: item.section_id,
                content,
                confidence,
                icd10_codes,
            });
        }

        let summary = Some(response.summary.trim().to_string()).filter(|s| !s.is_empty());
        Self::new(template, CategorizationSource::Llm, sections, summary)
    }
}

/// Entry point combining the rule-based pipeline, the template matcher and
/// the optional LLM categorizer under one precedence policy
pub struct CategorizationService {
    strategy: CategorizationStrategy,
    categorizer: Categorizer,
    matcher: TemplateMatcher,
    llm: Option<Box<dyn LlmCategorizer>>,
}

impl CategorizationService {
    /// Create a service reporting LLM usage through tracing
    pub fn new(config: CategorizerConfig) -> CategorizerResult<Self> {
        Self::with_usage_tracker(config, Arc::new(TracingUsageTracker))
    }

    pub fn with_usage_tracker(config: CategorizerConfig, usage: Arc<dyn UsageTracker>) -> CategorizerResult<Self> {
        let lexicon = Arc::new(Lexicon::clinical());
        let weights = ScoringWeights::default();

        let llm = match config.strategy {
            CategorizationStrategy::Rules => None,
            _ if config.llm.has_api_key() => Some(create_categorizer(&config, usage)?),
            _ => {
                warn!(
                    strategy = ?config.strategy,
                    "No LLM API key configured; LLM categorization unavailable"
                );
                None
            }
        };

        info!(strategy = ?config.strategy, llm_enabled = llm.is_some(), "Categorization service created");

        Ok(Self {
            strategy: config.strategy,
            categorizer: Categorizer::new(lexicon.clone(), weights),
            matcher: TemplateMatcher::new(lexicon, weights),
            llm,
        })
    }

    /// Replace the scoring knowledge base for both rule-based components
    pub fn with_lexicon(mut self, lexicon: Lexicon, weights: ScoringWeights) -> Self {
        let lexicon = Arc::new(lexicon);
        self.categorizer = Categorizer::new(lexicon.clone(), weights);
        self.matcher = TemplateMatcher::new(lexicon, weights);
        self
    }

    /// Use a specific LLM categorizer
    pub fn with_llm(mut self, llm: Box<dyn LlmCategorizer>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn strategy(&self) -> CategorizationStrategy {
        self.strategy
    }

    pub fn has_llm(&self) -> bool {
        self.llm.is_some()
    }

    pub fn categorizer(&self) -> &Categorizer {
        &self.categorizer
    }

    /// Deterministic path; never fails
    pub fn categorize_rules(&self, text: &str, template: &Template) -> NoteCategorization {
        let groups = self.categorizer.categorize(text, &template.sections);
        NoteCategorization::from_groups(template, groups)
    }

    /// LLM path only, regardless of strategy
    pub async fn categorize_llm(&self, text: &str, template: &Template) -> CategorizerResult<NoteCategorization> {
        let llm = self.llm.as_deref().ok_or_else(|| {
            CategorizerError::Configuration("LLM categorization requires an API key".to_string())
        })?;
        let response = llm.categorize(text, template).await?;
        Ok(NoteCategorization::from_llm(template, response))
    }

    /// Categorize according to the configured strategy
    pub async fn categorize(&self, text: &str, template: &Template) -> CategorizerResult<NoteCategorization> {
        self.categorize_until(text, template, std::future::pending()).await
    }

    /// Categorize, abandoning any in-flight LLM call once `cancel` resolves
    pub async fn categorize_until<C>(
        &self,
        text: &str,
        template: &Template,
        cancel: C,
    ) -> CategorizerResult<NoteCategorization>
    where
        C: Future<Output = ()> + Send,
    {
        match self.strategy {
            CategorizationStrategy::Rules => Ok(self.categorize_rules(text, template)),
            CategorizationStrategy::Llm => {
                let llm = self.llm.as_deref().ok_or_else(|| {
                    CategorizerError::Configuration("LLM categorization requires an API key".to_string())
                })?;
                let response = run_until_cancelled(llm, text, template, cancel).await?;
                Ok(NoteCategorization::from_llm(template, response))
            }
            CategorizationStrategy::LlmWithFallback => {
                let Some(llm) = self.llm.as_deref() else {
                    debug!("No LLM configured, using rule-based categorization");
                    return Ok(self.categorize_rules(text, template));
                };

                match run_until_cancelled(llm, text, template, cancel).await {
                    Ok(response) => Ok(NoteCategorization::from_llm(template, response)),
                    Err(e) if e.is_fallback_eligible() => {
                        warn!(
                            error_kind = e.kind(),
                            error = %e,
                            template_id = %template.id,
                            "LLM categorization failed, falling back to rule-based"
                        );
                        Ok(self.categorize_rules(text, template))
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }

    pub fn suggest_template(&self, text: &str, templates: &[Template]) -> Option<TemplateSuggestion> {
        self.matcher.suggest_template(text, templates)
    }
}
