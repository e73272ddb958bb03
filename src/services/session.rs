use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use crate::domains::action::Action;
use crate::domains::message::Message;
use crate::domains::snapshot::{ChainSnapshot, SharedSnapshot};
use crate::error::{AgentError, Result};
use crate::interfaces::chain::ChainQuery;
use crate::interfaces::proxy::LlmProxy;
use crate::interfaces::wallet::WalletProvider;
use crate::prompt::synthesize_system_prompt;
use crate::protocol::extract_action;
use crate::services::dispatcher::ActionDispatcher;
use crate::services::slot_refresh::{refresh_slot, SlotRefreshJob};
use crate::services::transcript::Transcript;
use crate::services::turn::TurnGate;

pub const GREETING: &str = "Hello! I'm your Solana AI assistant. I can help with Solana blockchain operations like checking balances and making transfers. To get started, connect your wallet with the /connect command, or simply ask me to connect your wallet in chat. What would you like to do today?";

pub const NO_WALLET_NOTICE: &str = "I notice you don't have a wallet keypair configured. You'll need one to perform Solana transfers. Point `wallet.keypair_path` at a Solana CLI keypair file or set the seed environment variable.";

pub const UNEXPECTED_RESPONSE_NOTICE: &str =
    "I received an unexpected response from the assistant service. Please try again.";

const EVENT_CAPACITY: usize = 64;

/// One chat conversation: history, live chain snapshot and the collaborators
/// that act on tags the model emits.
pub struct ChatSession {
    proxy: Arc<dyn LlmProxy>,
    wallet: Arc<dyn WalletProvider>,
    chain: Arc<dyn ChainQuery>,
    dispatcher: ActionDispatcher,
    snapshot: SharedSnapshot,
    transcript: Mutex<Transcript>,
    events: broadcast::Sender<Message>,
    gate: TurnGate,
}

impl ChatSession {
    pub fn new(
        proxy: Arc<dyn LlmProxy>,
        wallet: Arc<dyn WalletProvider>,
        chain: Arc<dyn ChainQuery>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let mut transcript = Transcript::new(events.clone());
        transcript.push_assistant(GREETING);

        Self {
            dispatcher: ActionDispatcher::new(Arc::clone(&wallet), Arc::clone(&chain)),
            proxy,
            wallet,
            chain,
            snapshot: SharedSnapshot::default(),
            transcript: Mutex::new(transcript),
            events,
            gate: TurnGate::new(),
        }
    }

    /// Startup checks: wallet availability, an already connected wallet, and
    /// the first slot reading.
    pub async fn start(&self) -> Vec<Message> {
        let mut transcript = self.transcript.lock().await;
        let start = transcript.len();

        if !self.wallet.is_available() {
            transcript.push_assistant(NO_WALLET_NOTICE);
        } else if self.wallet.is_connected().await {
            self.dispatcher
                .connect_wallet(&self.snapshot, &mut transcript)
                .await;
        }

        if let Err(err) = refresh_slot(self.chain.as_ref(), &self.snapshot).await {
            debug!("startup slot read failed: {err}");
        }

        transcript.since(start)
    }

    /// Runs one conversational turn and returns every message it appended,
    /// starting with the user's own.
    pub async fn submit(&self, input: &str) -> Result<Vec<Message>> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Vec::new());
        }
        let _turn = self.gate.try_begin().ok_or(AgentError::Busy)?;

        let mut transcript = self.transcript.lock().await;
        let start = transcript.len();
        transcript.push(Message::user(input));

        let system = synthesize_system_prompt(&*self.snapshot.read().await);
        let completion = self.proxy.complete(transcript.messages(), &system).await;
        let reply = match completion {
            Ok(reply) => reply,
            Err(AgentError::UnexpectedResponse) => {
                error!("proxy answered with an unexpected response shape");
                transcript.push_assistant(UNEXPECTED_RESPONSE_NOTICE);
                return Ok(transcript.since(start));
            }
            Err(err) => {
                error!("Error sending message: {err}");
                transcript.push_assistant(format!(
                    "I'm sorry, I encountered an error processing your request ({err}). Please try again."
                ));
                return Ok(transcript.since(start));
            }
        };

        let extracted = extract_action(&reply);
        if !extracted.ignored.is_empty() {
            let ignored: Vec<&str> = extracted
                .ignored
                .iter()
                .map(|kind| kind.tag_name())
                .collect();
            warn!(?ignored, "reply carried more than one action tag; only the first runs");
        }
        if !extracted.cleaned_text.is_empty() {
            transcript.push_assistant(extracted.cleaned_text);
        }
        if let Some(action) = &extracted.action {
            self.dispatcher
                .execute(action, &self.snapshot, &mut transcript)
                .await;
        }

        debug!(appended = transcript.len() - start, "turn settled");
        Ok(transcript.since(start))
    }

    /// Connect when disconnected, disconnect when connected.
    pub async fn toggle_wallet(&self) -> Result<Vec<Message>> {
        let action = if self.snapshot.read().await.wallet_connected {
            Action::DisconnectWallet
        } else {
            Action::ConnectWallet
        };
        self.perform(&action).await
    }

    /// Runs one action directly, outside a model turn.
    pub async fn perform(&self, action: &Action) -> Result<Vec<Message>> {
        let _turn = self.gate.try_begin().ok_or(AgentError::Busy)?;
        let mut transcript = self.transcript.lock().await;
        let start = transcript.len();
        self.dispatcher
            .execute(action, &self.snapshot, &mut transcript)
            .await;
        Ok(transcript.since(start))
    }

    pub async fn history(&self) -> Vec<Message> {
        self.transcript.lock().await.messages().to_vec()
    }

    pub async fn snapshot(&self) -> ChainSnapshot {
        self.snapshot.read().await.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Message> {
        self.events.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }

    pub fn slot_refresh_job(&self, interval: Duration) -> SlotRefreshJob {
        SlotRefreshJob::new(Arc::clone(&self.chain), Arc::clone(&self.snapshot), interval)
    }

    pub async fn shutdown(&self) {
        if !self.wallet.is_connected().await {
            return;
        }
        match self.wallet.disconnect().await {
            Ok(()) => {
                self.snapshot.write().await.clear_wallet();
                info!("wallet disconnected on shutdown");
            }
            Err(err) => warn!("Error disconnecting wallet on shutdown: {err}"),
        }
    }
}
