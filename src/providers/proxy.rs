use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ProxyConfig;
use crate::domains::message::Message;
use crate::error::{AgentError, Result};
use crate::interfaces::proxy::LlmProxy;

#[derive(Serialize)]
struct ProxyRequest<'a> {
    messages: &'a [Message],
    system: &'a str,
}

/// Client for the chat proxy (`POST {base}/api/claude`).
#[derive(Clone)]
pub struct ProxyClient {
    client: reqwest::Client,
    url: String,
}

impl ProxyClient {
    pub fn new(config: &ProxyConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("{}{}", config.base_url.trim_end_matches('/'), config.path),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn extract_text(body: &Value) -> Option<String> {
        body.get("content")
            .and_then(|content| content.get(0))
            .and_then(|block| block.get("text"))
            .and_then(|text| text.as_str())
            .filter(|text| !text.is_empty())
            .map(|text| text.to_string())
    }
}

#[async_trait]
impl LlmProxy for ProxyClient {
    async fn complete(&self, messages: &[Message], system: &str) -> Result<String> {
        debug!(url = %self.url, turns = messages.len(), "sending conversation to proxy");

        let response = self
            .client
            .post(&self.url)
            .json(&ProxyRequest { messages, system })
            .send()
            .await
            .map_err(|e| AgentError::Http(format!("Claude API transport failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %text, "proxy returned an error");
            return Err(AgentError::Http(format!(
                "Claude API error: {} - {text}",
                status.as_u16()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|_| AgentError::UnexpectedResponse)?;

        Self::extract_text(&body).ok_or(AgentError::UnexpectedResponse)
    }
}
