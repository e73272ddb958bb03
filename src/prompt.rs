//! System prompt sent with every turn: live chain context followed by the
//! fixed rules of the action tag protocol.

use crate::domains::snapshot::ChainSnapshot;

const CAPABILITIES: &str = "You can help users with the following Solana operations:
1. Connect wallet
2. Disconnect wallet
3. Check wallet balance
4. Check balance of any Solana address
5. Transfer SOL to another address
6. Check current Solana blockchain slot";

const INSTRUCTIONS: &str = "IMPORTANT INSTRUCTIONS:
- When a user wants to perform an action, identify the intent and include <action> tags in your response.
- Valid actions are: <connect_wallet>, <disconnect_wallet>, <check_balance:address?>, <transfer_sol:recipientAddress,amount>, <check_slot>
- For balance checks, include the address parameter if a specific address was provided, otherwise leave it empty.
- For transfers, always include both recipient address and amount.
- Only include ONE action tag per response.
- Example: \"I'll check your balance. <check_balance:>\"
- Example: \"I'll send 1 SOL to that address. <transfer_sol:8xrt45...zQ9,1.0>\"
- If the user wants to check a specific address balance: \"I'll check that address. <check_balance:8xrt45...zQ9>\"
- Do NOT include action tags if the user is just asking general questions.
- Respond conversationally and briefly. Don't overexplain basic concepts unless asked.";

pub fn synthesize_system_prompt(snapshot: &ChainSnapshot) -> String {
    let mut context = vec![format!(
        "- Wallet connected: {}",
        if snapshot.wallet_connected { "Yes" } else { "No" }
    )];
    if snapshot.wallet_connected {
        if let Some(address) = &snapshot.public_key {
            context.push(format!("- Wallet address: {address}"));
        }
    }
    if let Some(balance) = snapshot.wallet_balance {
        context.push(format!("- Wallet balance: {balance:.6} SOL"));
    }
    context.push(format!(
        "- Blockchain connection: {}",
        snapshot.connection_status
    ));
    if let Some(slot) = snapshot.current_slot {
        context.push(format!("- Current slot: {slot}"));
    }

    format!(
        "You are an AI assistant specializing in Solana blockchain operations.\n\n\
         Current Solana context:\n{}\n\n{CAPABILITIES}\n\n{INSTRUCTIONS}",
        context.join("\n")
    )
}
