//! Language-model gateway abstraction
//!
//! The rest of the service talks to the hosted completion API only through
//! `CompletionClient`.

use crate::models::ApiErrorBody;

pub mod groq;

pub use groq::GroqClient;

/// Failures of a single completion call
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Gateway returned status {status_code}: {body}")]
    Upstream { status_code: u16, body: String },

    #[error("Gateway request timed out")]
    Timeout,

    #[error("Gateway network error: {0}")]
    Network(String),

    #[error("Gateway response contained no completion")]
    EmptyResponse,

    #[error("All candidate models failed: {}", attempted.join(", "))]
    AllModelsExhausted { attempted: Vec<String> },
}

/// Parameters of one completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    /// `None` uses the client's configured model
    pub model: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: None,
            temperature: 0.7,
            max_tokens: 500,
        }
    }

    /// Pins the first model tried; fallbacks still follow the client's list.
    /// Without it the client starts from its configured default.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Trait for hosted completion providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    /// Sends the prompt and returns the text of the first choice
    async fn complete(&self, request: CompletionRequest) -> Result<String, GatewayError>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Decides whether a failed call should be retried with the next fallback model
pub trait FallbackPolicy: Send + Sync {
    fn should_try_next(&self, error: &GatewayError) -> bool;
}

/// Falls back when the upstream error carries one of a known set of codes
///
/// The structured `error.code` field is preferred; bodies that are not the
/// expected JSON shape are checked for the code as a substring.
#[derive(Debug, Clone)]
pub struct ErrorCodePolicy {
    codes: Vec<String>,
}

impl ErrorCodePolicy {
    pub fn new(codes: Vec<String>) -> Self {
        Self { codes }
    }
}

impl FallbackPolicy for ErrorCodePolicy {
    fn should_try_next(&self, error: &GatewayError) -> bool {
        let GatewayError::Upstream { body, .. } = error else {
            return false;
        };

        match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(parsed) => parsed
                .error
                .code
                .map(|code| self.codes.iter().any(|c| *c == code))
                .unwrap_or(false),
            Err(_) => self.codes.iter().any(|c| body.contains(c.as_str())),
        }
    }
}

/// Never falls back
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFallback;

impl FallbackPolicy for NoFallback {
    fn should_try_next(&self, _error: &GatewayError) -> bool {
        false
    }
}
