use std::str::FromStr;

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;

use crate::config::SolanaRpcConfig;
use crate::error::{AgentError, Result};
use crate::interfaces::chain::ChainQuery;
use crate::wallet::fee::lamports_to_sol;

/// JSON-RPC backed chain queries.
#[derive(Debug, Clone)]
pub struct RpcChainClient {
    endpoint: String,
    commitment: String,
}

impl RpcChainClient {
    pub fn new(rpc: &SolanaRpcConfig) -> Self {
        Self {
            endpoint: rpc.endpoint.clone(),
            commitment: rpc.commitment.clone(),
        }
    }
}

#[async_trait]
impl ChainQuery for RpcChainClient {
    async fn get_current_slot(&self) -> Result<u64> {
        crate::solana_rpc::get_slot(&self.endpoint, &self.commitment).await
    }

    async fn get_account_balance(&self, address: &str) -> Result<f64> {
        Pubkey::from_str(address)
            .map_err(|e| AgentError::Wallet(format!("Invalid public key input: {e}")))?;
        let lamports =
            crate::solana_rpc::get_balance(&self.endpoint, address, &self.commitment).await?;
        Ok(lamports_to_sol(lamports))
    }
}
