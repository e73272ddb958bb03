use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;

use sol_agent::chain::RpcChainClient;
use sol_agent::config::Config;
use sol_agent::error::{AgentError, Result};
use sol_agent::providers::ProxyClient;
use sol_agent::scheduler::{seconds, Scheduler};
use sol_agent::wallet::KeypairWallet;
use sol_agent::{Action, ChatSession, Message, Role};

#[derive(Parser, Debug)]
#[command(name = "sol-agent")]
#[command(about = "Chat with a Solana wallet assistant")]
struct Cli {
    #[arg(long, env = "SOL_AGENT_CONFIG", default_value_os_t = sol_agent::runtime_paths::default_config_path())]
    config: PathBuf,

    /// Overrides `proxy.base_url` from the config file.
    #[arg(long)]
    proxy_url: Option<String>,

    /// Write the effective configuration to `--config` and exit.
    #[arg(long, default_value_t = false)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    sol_agent::logging::init_tracing("sol_agent_cli", true);
    let cli = Cli::parse();

    if cli.init_config {
        let mut config = Config::load_file(&cli.config)?;
        if let Some(url) = cli.proxy_url {
            config.proxy.base_url = url;
        }
        config.save(&cli.config)?;
        println!("Wrote {}", cli.config.display());
        return Ok(());
    }

    let mut config = Config::load(&cli.config)?;
    if let Some(url) = cli.proxy_url {
        config.proxy.base_url = url;
    }

    let session = Arc::new(ChatSession::new(
        Arc::new(ProxyClient::new(&config.proxy)),
        Arc::new(KeypairWallet::from_config(&config)),
        Arc::new(RpcChainClient::new(&config.solana)),
    ));

    for message in session.history().await {
        render(&message);
    }
    let printer = tokio::spawn(print_events(session.subscribe()));
    session.start().await;

    let mut scheduler = Scheduler::new();
    scheduler.register_job(Arc::new(
        session.slot_refresh_job(seconds(config.slot_refresh_secs)),
    ));
    scheduler.start();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.map_err(|e| AgentError::Runtime(e.to_string()))?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        let outcome = match line.trim() {
            "/quit" | "/exit" => break,
            "/connect" => session.perform(&Action::ConnectWallet).await.map(|_| ()),
            "/disconnect" => session.perform(&Action::DisconnectWallet).await.map(|_| ()),
            "/wallet" => session.toggle_wallet().await.map(|_| ()),
            "/status" => {
                let snapshot = session.snapshot().await;
                println!(
                    "wallet: {} | balance: {} | rpc: {} | slot: {}",
                    snapshot.public_key.as_deref().unwrap_or("not connected"),
                    snapshot
                        .wallet_balance
                        .map(|b| format!("{b:.6} SOL"))
                        .unwrap_or_else(|| "unknown".to_string()),
                    snapshot.connection_status,
                    snapshot
                        .current_slot
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "unknown".to_string()),
                );
                Ok(())
            }
            input => session.submit(input).await.map(|_| ()),
        };
        if let Err(err) = outcome {
            eprintln!("{err}");
        }
    }

    scheduler.stop().await;
    session.shutdown().await;
    printer.abort();
    Ok(())
}

async fn print_events(mut events: broadcast::Receiver<Message>) {
    loop {
        match events.recv().await {
            Ok(message) => render(&message),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "transcript printer fell behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

fn render(message: &Message) {
    // The user's own line is already on screen.
    if message.role == Role::Assistant {
        println!("assistant> {}\n", message.content);
    }
}
