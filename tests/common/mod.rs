#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::RwLock;

use sol_agent::domains::snapshot::{ChainSnapshot, SharedSnapshot};
use sol_agent::error::{AgentError, Result};
use sol_agent::interfaces::chain::ChainQuery;
use sol_agent::interfaces::proxy::LlmProxy;
use sol_agent::interfaces::wallet::{TransferReceipt, WalletProvider};
use sol_agent::services::transcript::Transcript;
use sol_agent::wallet::{calculate_fee, is_valid_solana_address, FeeBreakdown, FeePolicy};
use sol_agent::Message;

pub const WALLET_ADDRESS: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
pub const RECIPIENT: &str = "7VfiZzdzFA9E6SvXfCLbe8EMWCMW1ycmVstgo42WYo4g";

/// Answers proxy calls from a queue and records the conversation it was sent.
pub struct QueueProxy {
    replies: Mutex<VecDeque<Result<String>>>,
    pub seen: Mutex<Vec<(Vec<Message>, String)>>,
}

impl QueueProxy {
    pub fn new(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProxy for QueueProxy {
    async fn complete(&self, messages: &[Message], system: &str) -> Result<String> {
        self.seen
            .lock()
            .unwrap()
            .push((messages.to_vec(), system.to_string()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("Okay.".to_string()))
    }
}

/// In-memory wallet with call counters.
pub struct FakeWallet {
    pub available: bool,
    pub connected: Mutex<bool>,
    pub balance: Mutex<f64>,
    pub connect_error: Option<String>,
    pub transfer_error: Option<String>,
    pub balance_error: Option<String>,
    pub disconnect_error: Option<String>,
    pub balance_calls: AtomicUsize,
    pub transfer_calls: AtomicUsize,
    pub connect_calls: AtomicUsize,
}

impl FakeWallet {
    pub fn with_balance(balance: f64) -> Self {
        Self {
            available: true,
            connected: Mutex::new(false),
            balance: Mutex::new(balance),
            connect_error: None,
            transfer_error: None,
            balance_error: None,
            disconnect_error: None,
            balance_calls: AtomicUsize::new(0),
            transfer_calls: AtomicUsize::new(0),
            connect_calls: AtomicUsize::new(0),
        }
    }

    pub fn balance_calls(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
    }

    pub fn transfer_calls(&self) -> usize {
        self.transfer_calls.load(Ordering::SeqCst)
    }

    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletProvider for FakeWallet {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn connect(&self) -> Result<String> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.connect_error {
            return Err(AgentError::Wallet(reason.clone()));
        }
        *self.connected.lock().unwrap() = true;
        Ok(WALLET_ADDRESS.to_string())
    }

    async fn disconnect(&self) -> Result<()> {
        if let Some(reason) = &self.disconnect_error {
            return Err(AgentError::Wallet(reason.clone()));
        }
        *self.connected.lock().unwrap() = false;
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        *self.connected.lock().unwrap()
    }

    async fn public_key(&self) -> Option<String> {
        self.is_connected()
            .await
            .then(|| WALLET_ADDRESS.to_string())
    }

    async fn get_balance(&self) -> Result<f64> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.balance_error {
            return Err(AgentError::Rpc(reason.clone()));
        }
        Ok(*self.balance.lock().unwrap())
    }

    fn is_valid_address(&self, address: &str) -> bool {
        is_valid_solana_address(address)
    }

    async fn transfer_sol(
        &self,
        _recipient: &str,
        amount: f64,
        charge_fee: bool,
    ) -> Result<TransferReceipt> {
        self.transfer_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.transfer_error {
            return Err(AgentError::Wallet(reason.clone()));
        }
        *self.balance.lock().unwrap() -= amount;
        Ok(TransferReceipt {
            signature: "5fakeSignature".to_string(),
            fee: charge_fee.then(|| self.calculate_fee(amount)),
        })
    }

    fn calculate_fee(&self, amount: f64) -> FeeBreakdown {
        calculate_fee(amount, &FeePolicy::default())
    }
}

pub struct FakeChain {
    pub slot: Option<u64>,
    pub account_balance: f64,
    pub balance_error: Option<String>,
    pub balance_calls: AtomicUsize,
    pub slot_calls: AtomicUsize,
}

impl FakeChain {
    pub fn new(slot: Option<u64>, account_balance: f64) -> Self {
        Self {
            slot,
            account_balance,
            balance_error: None,
            balance_calls: AtomicUsize::new(0),
            slot_calls: AtomicUsize::new(0),
        }
    }

    pub fn balance_calls(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainQuery for FakeChain {
    async fn get_current_slot(&self) -> Result<u64> {
        self.slot_calls.fetch_add(1, Ordering::SeqCst);
        self.slot
            .ok_or_else(|| AgentError::Rpc("connection refused".to_string()))
    }

    async fn get_account_balance(&self, _address: &str) -> Result<f64> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.balance_error {
            return Err(AgentError::Rpc(reason.clone()));
        }
        Ok(self.account_balance)
    }
}

pub fn connected_snapshot(balance: f64) -> SharedSnapshot {
    Arc::new(RwLock::new(ChainSnapshot {
        wallet_connected: true,
        public_key: Some(WALLET_ADDRESS.to_string()),
        wallet_balance: Some(balance),
        ..ChainSnapshot::default()
    }))
}

pub fn transcript() -> Transcript {
    let (events, _) = tokio::sync::broadcast::channel(16);
    Transcript::new(events)
}

pub fn contents(transcript: &Transcript) -> Vec<String> {
    transcript
        .messages()
        .iter()
        .map(|message| message.content.clone())
        .collect()
}
