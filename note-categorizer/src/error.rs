use thiserror::Error;

#[derive(Error, Debug)]
pub enum CategorizerError {
    /// Empty or malformed transcription/template at a call boundary
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing API credential or unusable settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response from the chat-completion endpoint
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Categorization cancelled")]
    Cancelled,
}

impl CategorizerError {
    /// Stable category code for reporting
    pub fn kind(&self) -> &'static str {
        match self {
            CategorizerError::Validation(_) => "validation",
            CategorizerError::Configuration(_) => "configuration",
            CategorizerError::Transport(_) => "transport",
            CategorizerError::Api { .. } => "api",
            CategorizerError::Parse(_) => "parse",
            CategorizerError::Cancelled => "cancelled",
        }
    }

    /// Whether the rule-based pipeline may stand in for a failed LLM call.
    ///
    /// Bad caller input and caller-driven cancellation are surfaced instead.
    pub fn is_fallback_eligible(&self) -> bool {
        !matches!(
            self,
            CategorizerError::Validation(_) | CategorizerError::Cancelled
        )
    }
}

impl From<serde_json::Error> for CategorizerError {
    fn from(err: serde_json::Error) -> Self {
        CategorizerError::Parse(err.to_string())
    }
}

pub type CategorizerResult<T> = Result<T, CategorizerError>;
