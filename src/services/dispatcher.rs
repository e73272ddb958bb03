//! Side-effecting half of the action protocol. Each handler reports its
//! outcome as assistant messages and never returns an error to the caller.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::domains::action::Action;
use crate::domains::snapshot::SharedSnapshot;
use crate::error::Result;
use crate::interfaces::chain::ChainQuery;
use crate::interfaces::wallet::{TransferReceipt, WalletProvider};
use crate::services::slot_refresh::refresh_slot;
use crate::services::transcript::Transcript;
use crate::wallet::address::format_address;

pub const INVALID_ADDRESS: &str =
    "That doesn't appear to be a valid Solana address. Please check and try again.";
pub const CONNECT_FOR_BALANCE: &str =
    "You need to connect your wallet first to check its balance.";
pub const CONNECT_FOR_TRANSFER: &str = "You need to connect your wallet first to make transfers.";
pub const TRANSFER_NEEDS_BOTH: &str =
    "I need both a recipient address and an amount to make a transfer.";
pub const AMOUNT_NOT_POSITIVE: &str = "The amount must be a positive number.";
pub const DISCONNECTED: &str = "Wallet disconnected successfully.";

pub struct ActionDispatcher {
    wallet: Arc<dyn WalletProvider>,
    chain: Arc<dyn ChainQuery>,
}

impl ActionDispatcher {
    pub fn new(wallet: Arc<dyn WalletProvider>, chain: Arc<dyn ChainQuery>) -> Self {
        Self { wallet, chain }
    }

    pub async fn execute(
        &self,
        action: &Action,
        snapshot: &SharedSnapshot,
        transcript: &mut Transcript,
    ) {
        debug!(action = action.kind().tag_name(), "dispatching action");
        match action {
            Action::ConnectWallet => self.connect_wallet(snapshot, transcript).await,
            Action::DisconnectWallet => self.disconnect_wallet(snapshot, transcript).await,
            Action::CheckBalance { address } => {
                self.check_balance(address.as_deref(), snapshot, transcript)
                    .await
            }
            Action::TransferSol {
                recipient_address,
                amount,
            } => {
                self.transfer_sol(recipient_address, *amount, snapshot, transcript)
                    .await
            }
            Action::CheckSlot => self.check_slot(snapshot, transcript).await,
        }
    }

    pub async fn refresh_wallet_balance(&self, snapshot: &SharedSnapshot) -> Result<f64> {
        let balance = self.wallet.get_balance().await?;
        snapshot.write().await.wallet_balance = Some(balance);
        Ok(balance)
    }

    async fn refresh_balance_quietly(&self, snapshot: &SharedSnapshot) {
        if let Err(err) = self.refresh_wallet_balance(snapshot).await {
            warn!("Error fetching wallet balance: {err}");
        }
    }

    pub async fn connect_wallet(&self, snapshot: &SharedSnapshot, transcript: &mut Transcript) {
        let already = snapshot.read().await.wallet_connected;
        if already && self.wallet.is_connected().await {
            self.refresh_balance_quietly(snapshot).await;
            let address = match self.wallet.public_key().await {
                Some(address) => address,
                None => snapshot.read().await.public_key.clone().unwrap_or_default(),
            };
            transcript.push_assistant(format!(
                "Your wallet is already connected: {}",
                format_address(&address)
            ));
            return;
        }

        match self.wallet.connect().await {
            Ok(public_key) => {
                {
                    let mut state = snapshot.write().await;
                    state.wallet_connected = true;
                    state.public_key = Some(public_key.clone());
                }
                self.refresh_balance_quietly(snapshot).await;
                transcript.push_assistant(format!(
                    "Wallet connected successfully! Your address: {}",
                    format_address(&public_key)
                ));
            }
            Err(err) => {
                error!("Connection error: {err}");
                transcript.push_assistant(format!("Failed to connect wallet: {}", err.reason()));
            }
        }
    }

    pub async fn disconnect_wallet(&self, snapshot: &SharedSnapshot, transcript: &mut Transcript) {
        match self.wallet.disconnect().await {
            Ok(()) => {
                snapshot.write().await.clear_wallet();
                transcript.push_assistant(DISCONNECTED);
            }
            Err(err) => {
                error!("Disconnect error: {err}");
                transcript.push_assistant(format!("Failed to disconnect: {}", err.reason()));
            }
        }
    }

    pub async fn check_balance(
        &self,
        address: Option<&str>,
        snapshot: &SharedSnapshot,
        transcript: &mut Transcript,
    ) {
        let outcome = match address.map(str::trim).filter(|value| !value.is_empty()) {
            Some(address) => {
                if !self.wallet.is_valid_address(address) {
                    transcript.push_assistant(INVALID_ADDRESS);
                    return;
                }
                self.chain
                    .get_account_balance(address)
                    .await
                    .map(|balance| {
                        format!(
                            "The address {} has a balance of {balance:.6} SOL.",
                            format_address(address)
                        )
                    })
            }
            None => {
                if !snapshot.read().await.wallet_connected {
                    transcript.push_assistant(CONNECT_FOR_BALANCE);
                    return;
                }
                self.refresh_wallet_balance(snapshot)
                    .await
                    .map(|balance| format!("Your wallet balance is {balance:.6} SOL."))
            }
        };

        match outcome {
            Ok(message) => transcript.push_assistant(message),
            Err(err) => {
                error!("Balance check error: {err}");
                transcript.push_assistant(format!("Error checking balance: {}", err.reason()));
            }
        }
    }

    /// Every guard runs before the wallet is asked to sign anything.
    pub async fn transfer_sol(
        &self,
        recipient: &str,
        amount: f64,
        snapshot: &SharedSnapshot,
        transcript: &mut Transcript,
    ) {
        let (connected, balance) = {
            let state = snapshot.read().await;
            (state.wallet_connected, state.wallet_balance)
        };

        if !connected {
            transcript.push_assistant(CONNECT_FOR_TRANSFER);
            return;
        }
        let recipient = recipient.trim();
        if recipient.is_empty() {
            transcript.push_assistant(TRANSFER_NEEDS_BOTH);
            return;
        }
        if !amount.is_finite() || amount <= 0.0 {
            transcript.push_assistant(AMOUNT_NOT_POSITIVE);
            return;
        }
        if !self.wallet.is_valid_address(recipient) {
            transcript.push_assistant(INVALID_ADDRESS);
            return;
        }
        if let Some(balance) = balance {
            if amount > balance {
                transcript.push_assistant(format!(
                    "Insufficient balance. You're trying to send {amount:.6} SOL but your wallet only has {balance:.6} SOL."
                ));
                return;
            }
        }

        transcript.push_assistant(format!(
            "Preparing to send {amount} SOL to {}...",
            format_address(recipient)
        ));

        match self.wallet.transfer_sol(recipient, amount, true).await {
            Ok(receipt) => {
                info!(signature = %receipt.signature, "transfer succeeded");
                transcript.push_assistant(transfer_success_message(&receipt));
                self.refresh_balance_quietly(snapshot).await;
            }
            Err(err) => {
                error!("Transfer error: {err}");
                transcript.push_assistant(format!("Transaction failed: {}", err.reason()));
            }
        }
    }

    pub async fn check_slot(&self, snapshot: &SharedSnapshot, transcript: &mut Transcript) {
        match refresh_slot(self.chain.as_ref(), snapshot).await {
            Ok(slot) => transcript.push_assistant(format!("The current Solana slot is {slot}.")),
            Err(err) => {
                transcript.push_assistant(format!("Error checking current slot: {}", err.reason()))
            }
        }
    }
}

fn transfer_success_message(receipt: &TransferReceipt) -> String {
    let mut message = format!(
        "Transaction successful! ✅\nSignature: {}",
        receipt.signature
    );
    if let Some(fee) = &receipt.fee {
        message.push_str(&format!(
            "\n\nRecipient received: {:.6} SOL\nService fee: {:.6} SOL ({}%)",
            fee.recipient_sol, fee.fee_sol, fee.fee_percentage
        ));
    }
    message
}
