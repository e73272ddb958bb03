use std::fmt;
use std::sync::Arc;

use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Checking,
    Connected,
    Error,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConnectionStatus::Checking => "checking",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Error => "error",
        };
        f.write_str(label)
    }
}

/// Last known wallet and chain state, shown to the model every turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainSnapshot {
    pub wallet_connected: bool,
    pub public_key: Option<String>,
    pub wallet_balance: Option<f64>,
    pub connection_status: ConnectionStatus,
    pub current_slot: Option<u64>,
}

impl ChainSnapshot {
    pub fn clear_wallet(&mut self) {
        self.wallet_connected = false;
        self.public_key = None;
        self.wallet_balance = None;
    }
}

pub type SharedSnapshot = Arc<RwLock<ChainSnapshot>>;
