pub mod chain;
pub mod config;
pub mod daemon;
pub mod domains;
pub mod error;
pub mod interfaces;
pub mod logging;
pub mod prompt;
pub mod protocol;
pub mod providers;
pub mod runtime_paths;
pub mod scheduler;
pub mod services;
pub mod solana_rpc;
pub mod wallet;

pub type Result<T> = std::result::Result<T, error::AgentError>;

pub use domains::action::{Action, ActionKind, ExtractionResult};
pub use domains::message::{Message, Role};
pub use services::session::ChatSession;
