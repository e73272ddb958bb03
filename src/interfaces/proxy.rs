use async_trait::async_trait;

use crate::domains::message::Message;
use crate::error::Result;

/// The HTTP endpoint that forwards a conversation to the model.
#[async_trait]
pub trait LlmProxy: Send + Sync {
    /// Returns the text of the model's first content block.
    async fn complete(&self, messages: &[Message], system: &str) -> Result<String>;
}
