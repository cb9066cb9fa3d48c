//! OpenAI-compatible chat-completion categorizer
//!
//! Sends one request per call with the prompt from [`super::prompt`] and
//! parses the model's message content as the categorization JSON contract.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use logger_redacted::PiiRedactor;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{max_tokens_for_model, LlmConfig, DEFAULT_LANGUAGE};
use crate::error::{CategorizerError, CategorizerResult};
use crate::llm::prompt::build_categorization_prompt;
use crate::llm::{validate_request, LlmCategorizationResponse, LlmCategorizer};
use crate::template::Template;
use crate::usage::{UsageRecord, UsageTracker};

/// Low temperature keeps routing close to deterministic
pub const TEMPERATURE: f32 = 0.1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

pub struct ChatCompletionCategorizer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    language: String,
    usage: Arc<dyn UsageTracker>,
    redactor: PiiRedactor,
}

impl ChatCompletionCategorizer {
    pub fn new(config: &LlmConfig, usage: Arc<dyn UsageTracker>) -> CategorizerResult<Self> {
        let api_key = config.api_key().ok_or_else(|| {
            CategorizerError::Configuration("LLM API key is not configured".to_string())
        })?;

        let api_url = config.api_url.trim().to_string();
        let parsed = reqwest::Url::parse(&api_url).map_err(|e| {
            CategorizerError::Configuration(format!("Invalid LLM API URL '{}': {}", api_url, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CategorizerError::Configuration(format!(
                "LLM API URL must use http or https, got: {}",
                parsed.scheme()
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| {
                CategorizerError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        info!(model = %config.model, "Chat-completion categorizer configured");

        Ok(Self {
            client,
            api_url,
            api_key: api_key.to_string(),
            model: config.model.clone(),
            language: DEFAULT_LANGUAGE.to_string(),
            usage,
            redactor: PiiRedactor::default(),
        })
    }

    /// Redactor applied to response excerpts before they are logged or
    /// returned in an API error
    pub fn with_redactor(mut self, redactor: PiiRedactor) -> Self {
        self.redactor = redactor;
        self
    }

    /// Language the model is asked to write section content in
    pub fn with_language(mut self, language: &str) -> Self {
        if !language.trim().is_empty() {
            self.language = language.trim().to_string();
        }
        self
    }

    fn build_request(&self, transcription: &str, template: &Template) -> ChatCompletionRequest<'_> {
        ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: build_categorization_prompt(transcription, template, &self.language),
            }],
            temperature: TEMPERATURE,
            max_tokens: max_tokens_for_model(&self.model),
        }
    }

    fn parse_body(&self, body: &str) -> CategorizerResult<LlmCategorizationResponse> {
        let completion: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| {
            warn!(excerpt = %self.redactor.excerpt(body), "Chat-completion body is not valid JSON");
            CategorizerError::Parse(format!("Invalid chat-completion response: {}", e))
        })?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| CategorizerError::Parse("Chat-completion response has no choices".to_string()))?;

        let parsed: LlmCategorizationResponse = serde_json::from_str(content.trim()).map_err(|e| {
            warn!(
                excerpt = %self.redactor.excerpt(&content),
                "Model output does not match the categorization schema"
            );
            CategorizerError::Parse(format!("Invalid categorization JSON: {}", e))
        })?;

        Ok(parsed.clamped())
    }
}

#[async_trait]
impl LlmCategorizer for ChatCompletionCategorizer {
    async fn categorize(
        &self,
        transcription: &str,
        template: &Template,
    ) -> CategorizerResult<LlmCategorizationResponse> {
        validate_request(transcription, template)?;

        let request = self.build_request(transcription, template);
        debug!(
            template_id = %template.id,
            model = %self.model,
            max_tokens = request.max_tokens,
            "Sending categorization request"
        );

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = self.redactor.excerpt(&body);
            warn!(status = status.as_u16(), body = %message, "Chat-completion request failed");
            return Err(CategorizerError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let result = self.parse_body(&body)?;

        let record = UsageRecord {
            characters: transcription.chars().count() as u64,
            model: self.model.clone(),
            template_id: template.id.clone(),
        };
        if let Err(e) = self.usage.record_usage(record).await {
            warn!(error = %e, "Failed to record LLM usage");
        }

        info!(
            template_id = %template.id,
            categorizations = result.categorizations.len(),
            "LLM categorization complete"
        );

        Ok(result)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
