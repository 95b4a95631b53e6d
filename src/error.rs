// src/error.rs
use thiserror::Error;

/// Status string the provider uses for quota exhaustion.
pub const RESOURCE_EXHAUSTED: &str = "RESOURCE_EXHAUSTED";

pub const RATE_LIMIT_MESSAGE: &str =
    "API Rate limit exceeded. The system is retrying or cooling down. Please wait a moment.";
pub const LINK_FAILED_MESSAGE: &str =
    "Intelligence link failed. Check your network or API key permissions.";

/// Failures surfaced by a search model.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// Non-success answer from the provider API.
    #[error("provider returned {code}: {message}")]
    Api {
        code: u16,
        status: Option<String>,
        message: String,
    },

    /// The request never produced an HTTP answer.
    #[error("transport error: {0}")]
    Transport(String),

    /// The provider answered with a body we could not decode.
    #[error("undecodable provider response: {0}")]
    Decode(String),

    #[error("provider not configured: {0}")]
    Config(String),
}

impl ProviderError {
    /// True for HTTP 429 and for the provider's resource-exhausted status.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            ProviderError::Api {
                code,
                status,
                message,
            } => {
                *code == 429
                    || status.as_deref() == Some(RESOURCE_EXHAUSTED)
                    || message.contains("429")
            }
            ProviderError::Transport(msg) => msg.contains("429"),
            ProviderError::Decode(_) | ProviderError::Config(_) => false,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ProviderError::Decode(e.to_string())
        } else {
            ProviderError::Transport(e.to_string())
        }
    }
}

/// Error returned from `RegionAnalyzer::analyze_region`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnalyzeError {
    #[error("region id must not be empty")]
    InvalidRegion,

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl AnalyzeError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AnalyzeError::Provider(e) if e.is_rate_limited())
    }

    /// Dashboard guidance: rate limits get their own hint, the rest collapse
    /// into "link failed".
    pub fn user_message(&self) -> &'static str {
        if self.is_rate_limited() {
            RATE_LIMIT_MESSAGE
        } else {
            LINK_FAILED_MESSAGE
        }
    }
}
