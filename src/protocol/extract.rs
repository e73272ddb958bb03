//! Inline action tags embedded by the model in its free-text reply.
//!
//! Five patterns are recognised. Every well-formed occurrence of every pattern
//! is stripped from the text shown to the user, but only the first kind in
//! [`ActionKind::PRECEDENCE`] is turned into an [`Action`].

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::domains::action::{Action, ActionKind, ExtractionResult};

static CONNECT_WALLET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<connect_wallet>").unwrap());
static DISCONNECT_WALLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<disconnect_wallet>").unwrap());
static CHECK_BALANCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<check_balance:([^>]*)>").unwrap());
static TRANSFER_SOL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<transfer_sol:([^,>]*),([^>]*)>").unwrap());
static CHECK_SLOT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<check_slot>").unwrap());
static AMOUNT_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").unwrap());

fn pattern(kind: ActionKind) -> &'static Regex {
    match kind {
        ActionKind::ConnectWallet => &CONNECT_WALLET_RE,
        ActionKind::DisconnectWallet => &DISCONNECT_WALLET_RE,
        ActionKind::CheckBalance => &CHECK_BALANCE_RE,
        ActionKind::TransferSol => &TRANSFER_SOL_RE,
        ActionKind::CheckSlot => &CHECK_SLOT_RE,
    }
}

fn build_action(kind: ActionKind, caps: &Captures<'_>) -> Action {
    match kind {
        ActionKind::ConnectWallet => Action::ConnectWallet,
        ActionKind::DisconnectWallet => Action::DisconnectWallet,
        ActionKind::CheckBalance => {
            let address = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
            Action::CheckBalance {
                address: (!address.is_empty()).then(|| address.to_string()),
            }
        }
        ActionKind::TransferSol => Action::TransferSol {
            recipient_address: caps
                .get(1)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default(),
            amount: caps.get(2).map(|m| parse_amount(m.as_str())).unwrap_or(f64::NAN),
        },
        ActionKind::CheckSlot => Action::CheckSlot,
    }
}

/// Leading-prefix float parse: `"1.5 SOL"` is 1.5, `"abc"` is NaN.
pub fn parse_amount(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.strip_prefix('+').unwrap_or(trimmed).starts_with("Infinity") {
        return f64::INFINITY;
    }
    if trimmed.starts_with("-Infinity") {
        return f64::NEG_INFINITY;
    }
    AMOUNT_PREFIX_RE
        .find(trimmed)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

pub fn extract_action(reply: &str) -> ExtractionResult {
    let mut action = None;
    let mut ignored = Vec::new();

    for kind in ActionKind::PRECEDENCE {
        let re = pattern(kind);
        let Some(caps) = re.captures(reply) else {
            continue;
        };
        if action.is_none() {
            action = Some(build_action(kind, &caps));
        } else {
            ignored.push(kind);
        }
    }

    if action.is_none() {
        return ExtractionResult::plain(reply);
    }

    let mut cleaned = reply.to_string();
    for kind in ActionKind::PRECEDENCE {
        cleaned = pattern(kind).replace_all(&cleaned, "").into_owned();
    }

    ExtractionResult {
        cleaned_text: cleaned.trim().to_string(),
        action,
        ignored,
    }
}
