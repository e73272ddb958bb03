use async_trait::async_trait;

use crate::error::Result;

/// Read-only chain queries that do not need a wallet.
#[async_trait]
pub trait ChainQuery: Send + Sync {
    async fn get_current_slot(&self) -> Result<u64>;
    async fn get_account_balance(&self, address: &str) -> Result<f64>;
}
