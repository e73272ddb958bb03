use serde::Serialize;

/// Tag names of the inline action protocol, in dispatch precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    ConnectWallet,
    DisconnectWallet,
    CheckBalance,
    TransferSol,
    CheckSlot,
}

impl ActionKind {
    pub const PRECEDENCE: [ActionKind; 5] = [
        ActionKind::ConnectWallet,
        ActionKind::DisconnectWallet,
        ActionKind::CheckBalance,
        ActionKind::TransferSol,
        ActionKind::CheckSlot,
    ];

    pub fn tag_name(self) -> &'static str {
        match self {
            ActionKind::ConnectWallet => "connect_wallet",
            ActionKind::DisconnectWallet => "disconnect_wallet",
            ActionKind::CheckBalance => "check_balance",
            ActionKind::TransferSol => "transfer_sol",
            ActionKind::CheckSlot => "check_slot",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    ConnectWallet,
    DisconnectWallet,
    CheckBalance {
        address: Option<String>,
    },
    TransferSol {
        #[serde(rename = "recipientAddress")]
        recipient_address: String,
        amount: f64,
    },
    CheckSlot,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::ConnectWallet => ActionKind::ConnectWallet,
            Action::DisconnectWallet => ActionKind::DisconnectWallet,
            Action::CheckBalance { .. } => ActionKind::CheckBalance,
            Action::TransferSol { .. } => ActionKind::TransferSol,
            Action::CheckSlot => ActionKind::CheckSlot,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    pub cleaned_text: String,
    pub action: Option<Action>,
    /// Well-formed tags present in the reply that lost to `action` on precedence.
    pub ignored: Vec<ActionKind>,
}

impl ExtractionResult {
    pub fn plain(text: &str) -> Self {
        Self {
            cleaned_text: text.to_string(),
            action: None,
            ignored: Vec::new(),
        }
    }
}
