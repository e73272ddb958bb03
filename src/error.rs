use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("{0}")]
    Http(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("Unexpected Claude API response format")]
    UnexpectedResponse,
    #[error("{0}")]
    Wallet(String),
    #[error("{0}")]
    Rpc(String),
    #[error("runtime error: {0}")]
    Runtime(String),
    #[error("a previous request is still being processed")]
    Busy,
}

impl AgentError {
    /// Reason text suitable for an assistant message.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

pub use crate::Result;
