use logger_redacted::LoggerConfig;
use serde::{Deserialize, Serialize};

use crate::error::{CategorizerError, CategorizerResult};

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_LANGUAGE: &str = "en";

/// Which categorization path the service runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CategorizationStrategy {
    /// Deterministic keyword scoring only
    Rules,
    /// LLM only; failures propagate to the caller
    Llm,
    /// LLM when it succeeds, rule-based result otherwise
    #[default]
    LlmWithFallback,
}

impl CategorizationStrategy {
    pub fn parse(value: &str) -> CategorizerResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "rules" | "rule-based" => Ok(Self::Rules),
            "llm" | "ai" => Ok(Self::Llm),
            "llm-with-fallback" | "fallback" => Ok(Self::LlmWithFallback),
            other => Err(CategorizerError::Configuration(format!(
                "Unknown categorization strategy: {}",
                other
            ))),
        }
    }
}

/// Chat-completion endpoint settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    pub api_url: String,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    pub request_timeout_secs: u64,
}

impl LlmConfig {
    /// API key if configured and non-blank
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    /// Completion budget for the configured model; smaller models get a smaller cap
    pub fn max_tokens(&self) -> u32 {
        max_tokens_for_model(&self.model)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

pub fn max_tokens_for_model(model: &str) -> u32 {
    let model = model.to_lowercase();
    let small = ["mini", "3.5", "haiku", "small"]
        .iter()
        .any(|marker| model.contains(marker));
    if small {
        2000
    } else {
        4000
    }
}

/// Categorizer service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CategorizerConfig {
    pub llm: LlmConfig,
    pub strategy: CategorizationStrategy,
    /// Language the LLM writes section content in; rule-based scoring is
    /// tuned for English dictation regardless
    pub language: String,
    /// Log redaction settings applied to LLM response excerpts
    #[serde(default)]
    pub logging: LoggerConfig,
}

impl Default for CategorizerConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            strategy: CategorizationStrategy::default(),
            language: DEFAULT_LANGUAGE.to_string(),
            logging: LoggerConfig::default(),
        }
    }
}

impl CategorizerConfig {
    /// Rule-based only, no network access
    pub fn rules_only() -> Self {
        Self {
            strategy: CategorizationStrategy::Rules,
            ..Self::default()
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> CategorizerResult<Self> {
        let api_url = std::env::var("CATEGORIZER_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let api_key = resolve_api_key(|name| std::env::var(name).ok());

        let model = std::env::var("CATEGORIZER_MODEL")
            .unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let request_timeout_secs = std::env::var("CATEGORIZER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let strategy = match std::env::var("CATEGORIZER_STRATEGY") {
            Ok(value) => CategorizationStrategy::parse(&value)?,
            Err(_) => CategorizationStrategy::default(),
        };

        let language = std::env::var("CATEGORIZER_LANGUAGE")
            .ok()
            .filter(|lang| !lang.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        Ok(Self {
            llm: LlmConfig {
                api_url,
                api_key,
                model,
                request_timeout_secs,
            },
            strategy,
            language,
            logging: LoggerConfig::from_env(),
        })
    }
}

/// First non-blank of `CATEGORIZER_API_KEY` and `OPENAI_API_KEY`
fn resolve_api_key<F>(lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    ["CATEGORIZER_API_KEY", "OPENAI_API_KEY"]
        .into_iter()
        .find_map(|name| lookup(name).filter(|key| !key.trim().is_empty()))
}
