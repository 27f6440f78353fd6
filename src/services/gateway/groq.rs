//! Groq chat-completions client
//!
//! Sends one OpenAI-compatible request per call. The only retry path is the
//! model fallback: when the configured `FallbackPolicy` accepts the error of
//! the first attempt, each fallback model is tried once in order.

use crate::{
    config::Config,
    models::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage},
    services::gateway::{
        CompletionClient, CompletionRequest, ErrorCodePolicy, FallbackPolicy, GatewayError,
        NoFallback,
    },
};
use reqwest::Client as HttpClient;
use std::sync::Arc;
use std::time::Duration;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = "TravelShare/1.0";

#[derive(Clone)]
pub struct GroqClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
    fallback_models: Vec<String>,
    fallback_policy: Arc<dyn FallbackPolicy>,
}

impl GroqClient {
    /// Creates a client without any model fallback
    pub fn new(
        api_key: String,
        api_url: String,
        model: String,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        if api_key.trim().is_empty() {
            tracing::error!("Groq API key is empty; every completion will be rejected");
        }

        let http_client = HttpClient::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url,
            model,
            fallback_models: Vec::new(),
            fallback_policy: Arc::new(NoFallback),
        })
    }

    /// Creates the production client: fixed timeout, configured fallback list
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = Self::new(
            config.groq_api_key.clone(),
            config.groq_api_url.clone(),
            config.groq_model.clone(),
            REQUEST_TIMEOUT,
        )?
        .with_fallback(
            config.groq_fallback_models.clone(),
            Arc::new(ErrorCodePolicy::new(config.groq_fallback_error_codes.clone())),
        );

        tracing::info!(
            model = %client.model,
            fallback_models = client.fallback_models.len(),
            "Groq client configured"
        );

        Ok(client)
    }

    pub fn with_fallback(
        mut self,
        models: Vec<String>,
        policy: Arc<dyn FallbackPolicy>,
    ) -> Self {
        self.fallback_models = models;
        self.fallback_policy = policy;
        self
    }

    /// Issues exactly one HTTP request against `model`
    async fn send_once(
        &self,
        model: &str,
        request: &CompletionRequest,
    ) -> Result<String, GatewayError> {
        let body = ChatCompletionRequest {
            model: model.to_string(),
            messages: vec![ChatMessage::user(request.prompt.clone())],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
        };

        let response = self
            .http_client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                model = %model,
                status = status.as_u16(),
                body = %body,
                "Groq API returned an error status"
            );
            return Err(GatewayError::Upstream {
                status_code: status.as_u16(),
                body,
            });
        }

        let response_text = response.text().await.map_err(map_transport_error)?;
        let parsed: ChatCompletionResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                tracing::warn!(
                    error = %e,
                    response = %response_text,
                    "Failed to deserialize Groq response"
                );
                GatewayError::EmptyResponse
            })?;

        if let Some(usage) = &parsed.usage {
            tracing::debug!(
                model = %model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Groq usage"
            );
        }

        let content = parsed.into_content().ok_or(GatewayError::EmptyResponse)?;

        tracing::info!(model = %model, length = content.len(), "Groq completion received");

        Ok(content)
    }
}

fn map_transport_error(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        tracing::error!("Groq request timed out");
        GatewayError::Timeout
    } else {
        tracing::error!(error = %error, "Groq request failed");
        GatewayError::Network(error.to_string())
    }
}

#[async_trait::async_trait]
impl CompletionClient for GroqClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, GatewayError> {
        let primary = request.model.clone().unwrap_or_else(|| self.model.clone());

        let error = match self.send_once(&primary, &request).await {
            Ok(content) => return Ok(content),
            Err(e) => e,
        };

        if self.fallback_models.is_empty() || !self.fallback_policy.should_try_next(&error) {
            return Err(error);
        }

        tracing::info!(model = %primary, "Primary model rejected, trying fallback models");

        let mut attempted = vec![primary.clone()];
        for model in self.fallback_models.iter().filter(|m| **m != primary) {
            attempted.push(model.clone());
            match self.send_once(model, &request).await {
                Ok(content) => {
                    tracing::info!(model = %model, "Fallback model succeeded");
                    return Ok(content);
                }
                Err(e) => {
                    tracing::debug!(model = %model, error = %e, "Fallback model failed");
                }
            }
        }

        Err(GatewayError::AllModelsExhausted { attempted })
    }

    fn name(&self) -> &'static str {
        "groq"
    }
}
