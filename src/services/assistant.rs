use std::sync::Arc;

use crate::services::gateway::{CompletionClient, CompletionRequest, GatewayError};

const PROBE_PROMPT: &str = "Hello, are you working? Respond in one sentence.";

/// Free-text travel answers from the language model
///
/// Unlike the recommender, nothing here is checked against the catalog, and
/// gateway failures are returned to the caller.
#[derive(Clone)]
pub struct Assistant {
    gateway: Arc<dyn CompletionClient>,
}

impl Assistant {
    pub fn new(gateway: Arc<dyn CompletionClient>) -> Self {
        Self { gateway }
    }

    pub async fn travel_ideas(&self, query: &str) -> Result<String, GatewayError> {
        let prompt = format!(
            r#"You are a professional travel advisor. The user asks: '{}'

Provide 3-5 travel recommendations with:
• Destination name
• Why it's good for this query
• Best time to visit
• Key attractions

Format as bullet points. Keep it practical and helpful."#,
            query.trim()
        );
        self.ask(prompt).await
    }

    pub async fn chat(&self, message: &str) -> Result<String, GatewayError> {
        let prompt = format!(
            r#"You are a friendly, knowledgeable travel expert. A traveler asks: '{}'

Respond helpfully with:
1. Acknowledge their question
2. Provide specific, useful advice
3. Be enthusiastic but accurate
4. Use a friendly tone

Keep it conversational and under 150 words."#,
            message.trim()
        );
        self.ask(prompt).await
    }

    pub async fn summarize_review(&self, review_text: &str) -> Result<String, GatewayError> {
        let prompt = format!(
            r#"Summarize this travel review in 2-3 sentences:

{}

Highlight:
• Overall experience
• Key positive points
• Any criticisms
• Would they recommend it?"#,
            review_text.trim()
        );
        self.ask(prompt).await
    }

    pub async fn similar_places(
        &self,
        place_name: &str,
        location: &str,
        description: &str,
    ) -> Result<String, GatewayError> {
        let prompt = format!(
            r#"Suggest 3 places similar to {place_name} in {location}.

Based on: {description}

For each place, provide:
• Name
• Similarity to {place_name}
• Unique feature"#
        );
        self.ask(prompt).await
    }

    pub async fn travel_tips(&self, destination: &str) -> Result<String, GatewayError> {
        let prompt = format!(
            r#"Provide 5 practical travel tips for visiting {}:

1. Best time to visit
2. Cultural etiquette
3. Transportation tips
4. Safety advice
5. Must-try food

Make it concise and actionable."#,
            destination.trim()
        );
        self.ask(prompt).await
    }

    /// One-sentence round trip to check the gateway is reachable
    pub async fn probe(&self) -> Result<String, GatewayError> {
        self.ask(PROBE_PROMPT.to_string()).await
    }

    async fn ask(&self, prompt: String) -> Result<String, GatewayError> {
        let answer = self.gateway.complete(CompletionRequest::new(prompt)).await;

        match &answer {
            Ok(text) => tracing::debug!(
                provider = self.gateway.name(),
                length = text.len(),
                "Assistant answered"
            ),
            Err(e) => tracing::error!(
                provider = self.gateway.name(),
                error = %e,
                "Assistant request failed"
            ),
        }

        answer
    }
}
