use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::wallet::fee::FeeBreakdown;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub signature: String,
    pub fee: Option<FeeBreakdown>,
}

/// The user's wallet. Amounts are in SOL.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Whether a wallet exists at all (an extension is installed, a keypair is configured).
    fn is_available(&self) -> bool {
        true
    }
    async fn connect(&self) -> Result<String>;
    async fn disconnect(&self) -> Result<()>;
    async fn is_connected(&self) -> bool;
    async fn public_key(&self) -> Option<String>;
    async fn get_balance(&self) -> Result<f64>;
    fn is_valid_address(&self, address: &str) -> bool;
    async fn transfer_sol(
        &self,
        recipient: &str,
        amount: f64,
        charge_fee: bool,
    ) -> Result<TransferReceipt>;
    fn calculate_fee(&self, amount: f64) -> FeeBreakdown;
}
