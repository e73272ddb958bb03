use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::AnthropicConfig;
use crate::error::{AgentError, Result};

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    messages: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    max_tokens: u32,
    temperature: f32,
}

/// What the upstream Messages API answered.
#[derive(Debug, Clone, PartialEq)]
pub enum ForwardOutcome {
    Success(Value),
    Upstream { status: u16, text: String },
}

/// Forwards chat requests to the Anthropic Messages API with the server-held key.
#[derive(Clone)]
pub struct AnthropicForwarder {
    client: reqwest::Client,
    config: AnthropicConfig,
}

impl AnthropicForwarder {
    pub fn new(config: AnthropicConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub async fn forward(&self, messages: &Value, system: Option<&str>) -> Result<ForwardOutcome> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AgentError::Config("API key missing".to_string()))?;

        let body = MessagesRequest {
            model: &self.config.model,
            messages,
            system,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!(model = %self.config.model, "forwarding chat request upstream");

        let response = self
            .client
            .post(&self.config.api_url)
            .header("x-api-key", api_key)
            .header("anthropic-version", &self.config.api_version)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %text, "Claude API error");
            return Ok(ForwardOutcome::Upstream {
                status: status.as_u16(),
                text,
            });
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| AgentError::Serialization(e.to_string()))?;
        Ok(ForwardOutcome::Success(value))
    }
}
