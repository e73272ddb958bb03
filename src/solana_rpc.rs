use std::str::FromStr;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};
use solana_compute_budget_interface::ComputeBudgetInstruction;
use solana_sdk::{
    hash::Hash,
    message::Message,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::Transaction,
};
use solana_system_interface::instruction as system_instruction;

use crate::config::{ComputeBudgetConfig, ConfirmationConfig, SendConfig};
use crate::error::{AgentError, Result};

fn normalize_rpc_result(value: Value, method: &str) -> Result<Value> {
    if let Some(error) = value.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .map(|m| m.to_string())
            .unwrap_or_else(|| error.to_string());
        return Err(AgentError::Rpc(format!("solana rpc {method} error: {message}")));
    }

    value
        .get("result")
        .cloned()
        .ok_or_else(|| AgentError::Rpc(format!("solana rpc {method} missing result")))
}

pub async fn rpc_call(endpoint: &str, method: &str, params: Value) -> Result<Value> {
    let request = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": method,
        "params": params,
    });

    tracing::debug!(method, "solana rpc call");

    let response = reqwest::Client::new()
        .post(endpoint)
        .json(&request)
        .send()
        .await
        .map_err(|e| AgentError::Rpc(format!("Solana connection failed: {e}")))?;

    let status = response.status();
    let body: Value = response
        .json()
        .await
        .map_err(|e| AgentError::Rpc(format!("solana rpc decode failure: {e}")))?;

    if !status.is_success() {
        return Err(AgentError::Rpc(format!("solana rpc http {status}: {body}")));
    }

    normalize_rpc_result(body, method)
}

pub async fn get_slot(endpoint: &str, commitment: &str) -> Result<u64> {
    let result = rpc_call(endpoint, "getSlot", json!([{ "commitment": commitment }])).await?;
    result
        .as_u64()
        .ok_or_else(|| AgentError::Rpc("solana rpc getSlot returned a non-integer".to_string()))
}

pub async fn get_balance(endpoint: &str, address: &str, commitment: &str) -> Result<u64> {
    let result = rpc_call(
        endpoint,
        "getBalance",
        json!([address, {"commitment": commitment}]),
    )
    .await?;

    result
        .get("value")
        .and_then(|value| value.as_u64())
        .ok_or_else(|| AgentError::Rpc("solana rpc getBalance missing value".to_string()))
}

pub async fn get_latest_blockhash(endpoint: &str, commitment: &str) -> Result<String> {
    let result = rpc_call(
        endpoint,
        "getLatestBlockhash",
        json!([{ "commitment": commitment }]),
    )
    .await?;

    result
        .get("value")
        .and_then(|value| value.get("blockhash"))
        .and_then(|value| value.as_str())
        .map(|value| value.to_string())
        .ok_or_else(|| {
            AgentError::Rpc("solana rpc getLatestBlockhash missing blockhash".to_string())
        })
}

/// One system transfer leg: destination address and lamports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferLeg {
    pub to: String,
    pub lamports: u64,
}

/// Builds and signs a transaction paying every leg from the seed's account.
/// Returns the base64 wire encoding and the payer address.
pub fn build_transfer_transaction_base64(
    from_seed: &[u8; 32],
    legs: &[TransferLeg],
    latest_blockhash: &str,
    budget: &ComputeBudgetConfig,
) -> Result<(String, String)> {
    let signer = Keypair::new_from_array(*from_seed);

    let recent_blockhash = Hash::from_str(latest_blockhash)
        .map_err(|e| AgentError::Rpc(format!("invalid blockhash: {e}")))?;

    let mut instructions = vec![
        ComputeBudgetInstruction::set_compute_unit_limit(budget.unit_limit),
        ComputeBudgetInstruction::set_compute_unit_price(budget.unit_price_microlamports),
    ];
    for leg in legs.iter().filter(|leg| leg.lamports > 0) {
        let destination = Pubkey::from_str(&leg.to)
            .map_err(|e| AgentError::Wallet(format!("invalid destination pubkey: {e}")))?;
        instructions.push(system_instruction::transfer(
            &signer.pubkey(),
            &destination,
            leg.lamports,
        ));
    }

    let message = Message::new(&instructions, Some(&signer.pubkey()));
    let tx = Transaction::new(&[&signer], message, recent_blockhash);

    let bytes = wincode::serialize(&tx)
        .map_err(|e| AgentError::Serialization(format!("failed to serialize tx: {e}")))?;

    Ok((STANDARD.encode(bytes), signer.pubkey().to_string()))
}

pub async fn send_transaction(endpoint: &str, tx_base64: &str, send: &SendConfig) -> Result<String> {
    let send_once = |skip_preflight: bool| async move {
        rpc_call(
            endpoint,
            "sendTransaction",
            json!([
                tx_base64,
                {
                    "encoding": "base64",
                    "skipPreflight": skip_preflight,
                    "preflightCommitment": send.preflight_commitment,
                    "maxRetries": send.max_retries,
                }
            ]),
        )
        .await
    };

    let result = match send_once(send.skip_preflight).await {
        Ok(value) => value,
        Err(err)
            if !send.skip_preflight
                && err
                    .to_string()
                    .to_ascii_lowercase()
                    .contains("preflight check is not supported") =>
        {
            tracing::warn!(
                "Solana RPC does not support preflight checks; resending with skipPreflight=true"
            );
            send_once(true).await?
        }
        Err(err) => return Err(err),
    };

    result
        .as_str()
        .map(|value| value.to_string())
        .ok_or_else(|| AgentError::Rpc("solana rpc sendTransaction missing signature".to_string()))
}

pub async fn get_signature_status(endpoint: &str, signature: &str) -> Result<Value> {
    rpc_call(
        endpoint,
        "getSignatureStatuses",
        json!([[signature], {"searchTransactionHistory": true}]),
    )
    .await
}

fn commitment_rank(level: &str) -> u8 {
    match level {
        "processed" => 1,
        "confirmed" => 2,
        "finalized" => 3,
        _ => 0,
    }
}

/// Polls signature status until it reaches `commitment`, fails on-chain, or
/// the poll budget runs out.
pub async fn confirm_transaction(
    endpoint: &str,
    signature: &str,
    commitment: &str,
    confirmation: &ConfirmationConfig,
) -> Result<()> {
    let wanted = commitment_rank(commitment);
    for _ in 0..confirmation.max_polls {
        let result = get_signature_status(endpoint, signature).await?;
        let status = result
            .get("value")
            .and_then(|value| value.as_array())
            .and_then(|entries| entries.first())
            .filter(|entry| !entry.is_null());

        if let Some(status) = status {
            if let Some(err) = status.get("err").filter(|err| !err.is_null()) {
                return Err(AgentError::Rpc(format!(
                    "transaction {signature} failed: {err}"
                )));
            }
            let reached = status
                .get("confirmationStatus")
                .and_then(|value| value.as_str())
                .map(commitment_rank)
                .unwrap_or(0);
            if reached >= wanted {
                return Ok(());
            }
        }

        tokio::time::sleep(Duration::from_millis(confirmation.poll_interval_ms)).await;
    }

    Err(AgentError::Rpc(format!(
        "transaction {signature} was not confirmed in time"
    )))
}
