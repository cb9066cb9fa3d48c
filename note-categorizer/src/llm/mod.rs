pub mod chat_completion;
pub mod prompt;

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::CategorizerConfig;
use crate::error::{CategorizerError, CategorizerResult};
use crate::template::{Icd10Code, Template};
use crate::usage::UsageTracker;

pub use chat_completion::ChatCompletionCategorizer;

/// One section assignment as returned by the model.
///
/// Field names are part of the prompt contract and must not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmCategorization {
    pub section_id: String,
    pub content: String,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icd10_codes: Option<Vec<Icd10Code>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmCategorizationResponse {
    pub categorizations: Vec<LlmCategorization>,
    pub summary: String,
}

impl LlmCategorizationResponse {
    /// Clamp every confidence into `[0, 1]`
    pub fn clamped(mut self) -> Self {
        for item in &mut self.categorizations {
            item.confidence = clamp_confidence(item.confidence);
        }
        self
    }
}

/// Model confidences outside `[0, 1]` are clamped; non-finite values count as 0
pub fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_finite() {
        confidence.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// LLM-backed categorization of a whole transcription
#[async_trait]
pub trait LlmCategorizer: Send + Sync {
    /// One request, no retry. Errors are typed per failure category.
    async fn categorize(
        &self,
        transcription: &str,
        template: &Template,
    ) -> CategorizerResult<LlmCategorizationResponse>;

    fn model(&self) -> &str;
}

/// Create the chat-completion categorizer for `config`, redacting logged
/// excerpts according to `config.logging`.
///
/// Fails with a configuration error when no API key is set.
pub fn create_categorizer(
    config: &CategorizerConfig,
    usage: Arc<dyn UsageTracker>,
) -> CategorizerResult<Box<dyn LlmCategorizer>> {
    let categorizer = ChatCompletionCategorizer::new(&config.llm, usage)?
        .with_redactor(logger_redacted::redactor_for(&config.logging))
        .with_language(&config.language);
    Ok(Box::new(categorizer))
}

/// Shared boundary checks for LLM requests
pub fn validate_request(transcription: &str, template: &Template) -> CategorizerResult<()> {
    if transcription.trim().is_empty() {
        return Err(CategorizerError::Validation(
            "Transcription cannot be empty".to_string(),
        ));
    }
    template.validate()
}

/// Run `categorizer` until it completes or `cancel` resolves.
///
/// Cancellation drops the in-flight request; nothing is persisted, so there
/// is no partial state to clean up.
pub async fn categorize_until<C>(
    categorizer: &dyn LlmCategorizer,
    transcription: &str,
    template: &Template,
    cancel: C,
) -> CategorizerResult<LlmCategorizationResponse>
where
    C: Future<Output = ()> + Send,
{
    tokio::select! {
        biased;
        _ = cancel => Err(CategorizerError::Cancelled),
        result = categorizer.categorize(transcription, template) => result,
    }
}
