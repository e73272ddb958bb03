use std::fs;
use std::path::PathBuf;

use async_trait::async_trait;
use solana_sdk::signature::{Keypair, Signer};
use tokio::sync::RwLock;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::config::{Config, SolanaRpcConfig};
use crate::error::{AgentError, Result};
use crate::interfaces::wallet::{TransferReceipt, WalletProvider};
use crate::solana_rpc::TransferLeg;
use crate::wallet::address::is_valid_solana_address;
use crate::wallet::fee::{calculate_fee, lamports_to_sol, sol_to_lamports, FeeBreakdown, FeePolicy};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// Solana CLI keypair file: JSON array of 64 (or 32) bytes.
    File(PathBuf),
    /// Environment variable holding a base58 encoded seed.
    EnvSeed(String),
}

impl KeySource {
    fn is_present(&self) -> bool {
        match self {
            KeySource::File(path) => path.exists(),
            KeySource::EnvSeed(var) => std::env::var(var)
                .map(|value| !value.trim().is_empty())
                .unwrap_or(false),
        }
    }

    fn load_seed(&self) -> Result<Zeroizing<[u8; 32]>> {
        let bytes = match self {
            KeySource::File(path) => {
                let raw = Zeroizing::new(fs::read_to_string(path).map_err(|e| {
                    AgentError::Wallet(format!("cannot read keypair {}: {e}", path.display()))
                })?);
                let bytes: Vec<u8> = serde_json::from_str(raw.trim()).map_err(|_| {
                    AgentError::Wallet(format!(
                        "keypair {} is not a JSON byte array",
                        path.display()
                    ))
                })?;
                Zeroizing::new(bytes)
            }
            KeySource::EnvSeed(var) => {
                let raw = Zeroizing::new(std::env::var(var).map_err(|_| {
                    AgentError::Wallet(format!("wallet seed variable {var} is not set"))
                })?);
                Zeroizing::new(bs58::decode(raw.trim()).into_vec().map_err(|_| {
                    AgentError::Wallet("invalid base58 wallet seed".to_string())
                })?)
            }
        };

        if bytes.len() != 32 && bytes.len() != 64 {
            return Err(AgentError::Wallet(
                "wallet seed must be 32 bytes (or a 64 byte keypair)".to_string(),
            ));
        }
        let mut seed = Zeroizing::new([0u8; 32]);
        seed.copy_from_slice(&bytes[..32]);
        Ok(seed)
    }
}

struct LoadedKey {
    seed: Zeroizing<[u8; 32]>,
    address: String,
}

/// Wallet backed by a local ed25519 keypair. `connect` loads the key,
/// `disconnect` drops it and wipes the seed.
pub struct KeypairWallet {
    sources: Vec<KeySource>,
    rpc: SolanaRpcConfig,
    fee: FeePolicy,
    key: RwLock<Option<LoadedKey>>,
}

impl KeypairWallet {
    pub fn new(sources: Vec<KeySource>, rpc: SolanaRpcConfig, fee: FeePolicy) -> Self {
        Self {
            sources,
            rpc,
            fee,
            key: RwLock::new(None),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut sources = Vec::new();
        match &config.wallet.keypair_path {
            Some(path) => sources.push(KeySource::File(PathBuf::from(path))),
            None => sources.push(KeySource::File(crate::runtime_paths::default_keypair_path())),
        }
        sources.push(KeySource::EnvSeed(config.wallet.seed_env.clone()));
        Self::new(sources, config.solana.clone(), config.fee.clone())
    }

    fn first_present_source(&self) -> Option<&KeySource> {
        self.sources.iter().find(|source| source.is_present())
    }

    async fn connected_seed(&self) -> Result<(Zeroizing<[u8; 32]>, String)> {
        let guard = self.key.read().await;
        let key = guard
            .as_ref()
            .ok_or_else(|| AgentError::Wallet("Wallet not connected".to_string()))?;
        Ok((key.seed.clone(), key.address.clone()))
    }
}

#[async_trait]
impl WalletProvider for KeypairWallet {
    fn is_available(&self) -> bool {
        self.first_present_source().is_some()
    }

    async fn connect(&self) -> Result<String> {
        let source = self.first_present_source().ok_or_else(|| {
            AgentError::Wallet("No wallet keypair is configured".to_string())
        })?;
        let seed = source.load_seed()?;
        let address = Keypair::new_from_array(*seed).pubkey().to_string();

        let mut guard = self.key.write().await;
        *guard = Some(LoadedKey {
            seed,
            address: address.clone(),
        });
        info!(%address, "wallet connected");
        Ok(address)
    }

    async fn disconnect(&self) -> Result<()> {
        let mut guard = self.key.write().await;
        if guard.take().is_some() {
            info!("wallet disconnected");
        }
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.key.read().await.is_some()
    }

    async fn public_key(&self) -> Option<String> {
        self.key.read().await.as_ref().map(|key| key.address.clone())
    }

    async fn get_balance(&self) -> Result<f64> {
        let (_, address) = self.connected_seed().await?;
        let lamports =
            crate::solana_rpc::get_balance(&self.rpc.endpoint, &address, &self.rpc.commitment)
                .await?;
        Ok(lamports_to_sol(lamports))
    }

    fn is_valid_address(&self, address: &str) -> bool {
        is_valid_solana_address(address)
    }

    async fn transfer_sol(
        &self,
        recipient: &str,
        amount: f64,
        charge_fee: bool,
    ) -> Result<TransferReceipt> {
        let (seed, from_address) = self.connected_seed().await?;

        if !self.is_valid_address(recipient) {
            return Err(AgentError::Wallet(
                "Invalid recipient address. Please enter a valid Solana address".to_string(),
            ));
        }
        let total_lamports = sol_to_lamports(amount)
            .filter(|lamports| *lamports > 0)
            .ok_or_else(|| {
                AgentError::Wallet("Transfer amount must be a positive number".to_string())
            })?;

        let (legs, fee) = if charge_fee {
            let fee = self.calculate_fee(amount);
            let legs = vec![
                TransferLeg {
                    to: recipient.to_string(),
                    lamports: fee.recipient_lamports,
                },
                TransferLeg {
                    to: self.fee.fee_collector_address.clone(),
                    lamports: fee.fee_lamports,
                },
            ];
            (legs, Some(fee))
        } else {
            let legs = vec![TransferLeg {
                to: recipient.to_string(),
                lamports: total_lamports,
            }];
            (legs, None)
        };

        let blockhash =
            crate::solana_rpc::get_latest_blockhash(&self.rpc.endpoint, &self.rpc.commitment)
                .await?;
        let (tx_base64, _) = crate::solana_rpc::build_transfer_transaction_base64(
            &seed,
            &legs,
            &blockhash,
            &self.rpc.compute_budget,
        )?;

        debug!(from = %from_address, to = %recipient, lamports = total_lamports, "submitting transfer");
        let signature =
            crate::solana_rpc::send_transaction(&self.rpc.endpoint, &tx_base64, &self.rpc.send)
                .await?;
        crate::solana_rpc::confirm_transaction(
            &self.rpc.endpoint,
            &signature,
            &self.rpc.commitment,
            &self.rpc.confirmation,
        )
        .await?;

        info!(%signature, "transfer confirmed");
        Ok(TransferReceipt { signature, fee })
    }

    fn calculate_fee(&self, amount: f64) -> FeeBreakdown {
        calculate_fee(amount, &self.fee)
    }
}
