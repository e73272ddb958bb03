mod common;

use std::sync::Arc;

use sol_agent::domains::snapshot::{ConnectionStatus, SharedSnapshot};
use sol_agent::services::dispatcher::{
    ActionDispatcher, AMOUNT_NOT_POSITIVE, CONNECT_FOR_BALANCE, CONNECT_FOR_TRANSFER,
    INVALID_ADDRESS, TRANSFER_NEEDS_BOTH,
};
use sol_agent::Action;

use common::{
    connected_snapshot, contents, transcript, FakeChain, FakeWallet, RECIPIENT, WALLET_ADDRESS,
};

fn dispatcher(wallet: &Arc<FakeWallet>, chain: &Arc<FakeChain>) -> ActionDispatcher {
    ActionDispatcher::new(wallet.clone(), chain.clone())
}

fn transfer(recipient: &str, amount: f64) -> Action {
    Action::TransferSol {
        recipient_address: recipient.to_string(),
        amount,
    }
}

#[tokio::test]
async fn transfer_rejects_non_positive_amounts_without_calling_wallet() {
    let wallet = Arc::new(FakeWallet::with_balance(5.0));
    let chain = Arc::new(FakeChain::new(Some(1), 0.0));
    let dispatcher = dispatcher(&wallet, &chain);
    let snapshot = connected_snapshot(5.0);

    for amount in [0.0, -1.0, f64::NAN] {
        let mut out = transcript();
        dispatcher
            .execute(&transfer(RECIPIENT, amount), &snapshot, &mut out)
            .await;
        assert_eq!(contents(&out), vec![AMOUNT_NOT_POSITIVE.to_string()]);
    }
    assert_eq!(wallet.transfer_calls(), 0);
}

#[tokio::test]
async fn transfer_over_balance_names_both_amounts() {
    let wallet = Arc::new(FakeWallet::with_balance(1.0));
    let chain = Arc::new(FakeChain::new(Some(1), 0.0));
    let snapshot = connected_snapshot(1.0);
    let mut out = transcript();

    dispatcher(&wallet, &chain)
        .execute(&transfer(RECIPIENT, 10.0), &snapshot, &mut out)
        .await;

    assert_eq!(
        contents(&out),
        vec![
            "Insufficient balance. You're trying to send 10.000000 SOL but your wallet only has 1.000000 SOL."
                .to_string()
        ]
    );
    assert_eq!(wallet.transfer_calls(), 0);
}

#[tokio::test]
async fn transfer_guards_run_in_order() {
    let wallet = Arc::new(FakeWallet::with_balance(1.0));
    let chain = Arc::new(FakeChain::new(Some(1), 0.0));
    let dispatcher = dispatcher(&wallet, &chain);

    let disconnected = SharedSnapshot::default();
    let mut out = transcript();
    dispatcher
        .execute(&transfer("", 0.0), &disconnected, &mut out)
        .await;
    assert_eq!(contents(&out), vec![CONNECT_FOR_TRANSFER.to_string()]);

    let snapshot = connected_snapshot(1.0);
    let mut out = transcript();
    dispatcher
        .execute(&transfer("  ", 0.5), &snapshot, &mut out)
        .await;
    assert_eq!(contents(&out), vec![TRANSFER_NEEDS_BOTH.to_string()]);

    let mut out = transcript();
    dispatcher
        .execute(&transfer("not-an-address", 0.5), &snapshot, &mut out)
        .await;
    assert_eq!(contents(&out), vec![INVALID_ADDRESS.to_string()]);

    assert_eq!(wallet.transfer_calls(), 0);
}

#[tokio::test]
async fn successful_transfer_reports_fee_and_refreshes_balance() {
    let wallet = Arc::new(FakeWallet::with_balance(2.0));
    let chain = Arc::new(FakeChain::new(Some(1), 0.0));
    let snapshot = connected_snapshot(2.0);
    let mut out = transcript();

    dispatcher(&wallet, &chain)
        .execute(&transfer(RECIPIENT, 1.0), &snapshot, &mut out)
        .await;

    let messages = contents(&out);
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0], "Preparing to send 1 SOL to 7VfiZz...Yo4g...");
    assert!(messages[1].starts_with("Transaction successful! ✅\nSignature: 5fakeSignature"));
    assert!(messages[1].contains("Recipient received: 0.975000 SOL"));
    assert!(messages[1].contains("Service fee: 0.025000 SOL (2.5%)"));

    assert_eq!(wallet.transfer_calls(), 1);
    assert_eq!(snapshot.read().await.wallet_balance, Some(1.0));
}

#[tokio::test]
async fn failed_transfer_surfaces_wallet_reason() {
    let mut fake = FakeWallet::with_balance(2.0);
    fake.transfer_error = Some("User rejected the request.".to_string());
    let wallet = Arc::new(fake);
    let chain = Arc::new(FakeChain::new(Some(1), 0.0));
    let snapshot = connected_snapshot(2.0);
    let mut out = transcript();

    dispatcher(&wallet, &chain)
        .execute(&transfer(RECIPIENT, 0.5), &snapshot, &mut out)
        .await;

    assert_eq!(
        contents(&out).last().map(String::as_str),
        Some("Transaction failed: User rejected the request.")
    );
}

#[tokio::test]
async fn invalid_address_balance_check_skips_network() {
    let wallet = Arc::new(FakeWallet::with_balance(1.0));
    let chain = Arc::new(FakeChain::new(Some(1), 3.0));
    let snapshot = connected_snapshot(1.0);
    let mut out = transcript();

    dispatcher(&wallet, &chain)
        .execute(
            &Action::CheckBalance {
                address: Some("definitely-not-base58!".to_string()),
            },
            &snapshot,
            &mut out,
        )
        .await;

    assert_eq!(contents(&out), vec![INVALID_ADDRESS.to_string()]);
    assert_eq!(chain.balance_calls(), 0);
    assert_eq!(wallet.balance_calls(), 0);
}

#[tokio::test]
async fn balance_check_for_other_address_uses_chain() {
    let wallet = Arc::new(FakeWallet::with_balance(1.0));
    let chain = Arc::new(FakeChain::new(Some(1), 3.25));
    let mut out = transcript();

    dispatcher(&wallet, &chain)
        .execute(
            &Action::CheckBalance {
                address: Some(RECIPIENT.to_string()),
            },
            &SharedSnapshot::default(),
            &mut out,
        )
        .await;

    assert_eq!(
        contents(&out),
        vec!["The address 7VfiZz...Yo4g has a balance of 3.250000 SOL.".to_string()]
    );
    assert_eq!(chain.balance_calls(), 1);
}

#[tokio::test]
async fn own_balance_requires_connection() {
    let wallet = Arc::new(FakeWallet::with_balance(1.0));
    let chain = Arc::new(FakeChain::new(Some(1), 0.0));
    let mut out = transcript();

    dispatcher(&wallet, &chain)
        .execute(
            &Action::CheckBalance { address: None },
            &SharedSnapshot::default(),
            &mut out,
        )
        .await;

    assert_eq!(contents(&out), vec![CONNECT_FOR_BALANCE.to_string()]);
    assert_eq!(wallet.balance_calls(), 0);
}

#[tokio::test]
async fn connect_then_disconnect_updates_snapshot() {
    let wallet = Arc::new(FakeWallet::with_balance(4.0));
    let chain = Arc::new(FakeChain::new(Some(1), 0.0));
    let dispatcher = dispatcher(&wallet, &chain);
    let snapshot = SharedSnapshot::default();
    let mut out = transcript();

    dispatcher
        .execute(&Action::ConnectWallet, &snapshot, &mut out)
        .await;
    {
        let state = snapshot.read().await;
        assert!(state.wallet_connected);
        assert_eq!(state.public_key.as_deref(), Some(WALLET_ADDRESS));
        assert_eq!(state.wallet_balance, Some(4.0));
    }

    dispatcher
        .execute(&Action::DisconnectWallet, &snapshot, &mut out)
        .await;
    let state = snapshot.read().await;
    assert!(!state.wallet_connected);
    assert_eq!(state.public_key, None);
    assert_eq!(state.wallet_balance, None);

    assert_eq!(
        contents(&out),
        vec![
            "Wallet connected successfully! Your address: 9WzDXw...AWWM".to_string(),
            "Wallet disconnected successfully.".to_string(),
        ]
    );
}

#[tokio::test]
async fn connect_failure_keeps_wallet_disconnected() {
    let mut fake = FakeWallet::with_balance(4.0);
    fake.connect_error = Some("User rejected the request.".to_string());
    let wallet = Arc::new(fake);
    let chain = Arc::new(FakeChain::new(Some(1), 0.0));
    let snapshot = SharedSnapshot::default();
    let mut out = transcript();

    dispatcher(&wallet, &chain)
        .execute(&Action::ConnectWallet, &snapshot, &mut out)
        .await;

    assert_eq!(
        contents(&out),
        vec!["Failed to connect wallet: User rejected the request.".to_string()]
    );
    assert!(!snapshot.read().await.wallet_connected);
}

#[tokio::test]
async fn slot_check_reports_and_records_status() {
    let wallet = Arc::new(FakeWallet::with_balance(0.0));
    let chain = Arc::new(FakeChain::new(Some(245_000_123), 0.0));
    let snapshot = SharedSnapshot::default();
    let mut out = transcript();

    dispatcher(&wallet, &chain)
        .execute(&Action::CheckSlot, &snapshot, &mut out)
        .await;

    assert_eq!(
        contents(&out),
        vec!["The current Solana slot is 245000123.".to_string()]
    );
    let state = snapshot.read().await;
    assert_eq!(state.current_slot, Some(245_000_123));
    assert_eq!(state.connection_status, ConnectionStatus::Connected);
}

#[tokio::test]
async fn slot_check_failure_marks_error() {
    let wallet = Arc::new(FakeWallet::with_balance(0.0));
    let chain = Arc::new(FakeChain::new(None, 0.0));
    let snapshot = SharedSnapshot::default();
    let mut out = transcript();

    dispatcher(&wallet, &chain)
        .execute(&Action::CheckSlot, &snapshot, &mut out)
        .await;

    assert_eq!(
        contents(&out),
        vec!["Error checking current slot: connection refused".to_string()]
    );
    assert_eq!(
        snapshot.read().await.connection_status,
        ConnectionStatus::Error
    );
}

#[tokio::test]
async fn connect_twice_refreshes_balance_without_reconnecting() {
    let wallet = Arc::new(FakeWallet::with_balance(4.0));
    let chain = Arc::new(FakeChain::new(Some(1), 0.0));
    let dispatcher = dispatcher(&wallet, &chain);
    let snapshot = SharedSnapshot::default();
    let mut out = transcript();

    dispatcher
        .execute(&Action::ConnectWallet, &snapshot, &mut out)
        .await;
    *wallet.balance.lock().unwrap() = 6.5;
    dispatcher
        .execute(&Action::ConnectWallet, &snapshot, &mut out)
        .await;

    assert_eq!(wallet.connect_calls(), 1);
    assert_eq!(wallet.balance_calls(), 2);
    assert_eq!(snapshot.read().await.wallet_balance, Some(6.5));
    assert_eq!(
        contents(&out),
        vec![
            "Wallet connected successfully! Your address: 9WzDXw...AWWM".to_string(),
            "Your wallet is already connected: 9WzDXw...AWWM".to_string(),
        ]
    );
}

#[tokio::test]
async fn balance_lookup_failures_are_reported() {
    let wallet = Arc::new(FakeWallet::with_balance(1.0));
    let mut fake_chain = FakeChain::new(Some(1), 0.0);
    fake_chain.balance_error = Some("rpc down".to_string());
    let chain = Arc::new(fake_chain);
    let mut out = transcript();

    dispatcher(&wallet, &chain)
        .execute(
            &Action::CheckBalance {
                address: Some(RECIPIENT.to_string()),
            },
            &SharedSnapshot::default(),
            &mut out,
        )
        .await;
    assert_eq!(contents(&out), vec!["Error checking balance: rpc down".to_string()]);

    let mut fake_wallet = FakeWallet::with_balance(1.0);
    fake_wallet.balance_error = Some("node unhealthy".to_string());
    let wallet = Arc::new(fake_wallet);
    let chain = Arc::new(FakeChain::new(Some(1), 0.0));
    let snapshot = connected_snapshot(1.0);
    let mut out = transcript();

    dispatcher(&wallet, &chain)
        .execute(&Action::CheckBalance { address: None }, &snapshot, &mut out)
        .await;
    assert_eq!(
        contents(&out),
        vec!["Error checking balance: node unhealthy".to_string()]
    );
    assert_eq!(snapshot.read().await.wallet_balance, Some(1.0));
}

#[tokio::test]
async fn disconnect_failure_keeps_wallet_state() {
    let mut fake = FakeWallet::with_balance(1.0);
    fake.disconnect_error = Some("wallet locked".to_string());
    let wallet = Arc::new(fake);
    let chain = Arc::new(FakeChain::new(Some(1), 0.0));
    let snapshot = connected_snapshot(1.0);
    let mut out = transcript();

    dispatcher(&wallet, &chain)
        .execute(&Action::DisconnectWallet, &snapshot, &mut out)
        .await;

    assert_eq!(
        contents(&out),
        vec!["Failed to disconnect: wallet locked".to_string()]
    );
    let state = snapshot.read().await;
    assert!(state.wallet_connected);
    assert_eq!(state.public_key.as_deref(), Some(WALLET_ADDRESS));
}
