use std::path::PathBuf;

use clap::Parser;
use sol_agent::config::Config;
use sol_agent::daemon;
use sol_agent::error::Result;

#[derive(Parser, Debug)]
#[command(name = "sol-agentd")]
#[command(about = "Claude API proxy for sol-agent")]
struct Cli {
    #[arg(long, env = "SOL_AGENT_CONFIG", default_value_os_t = sol_agent::runtime_paths::default_config_path())]
    config: PathBuf,

    /// Overrides `server.bind`, e.g. `0.0.0.0:3001`.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    sol_agent::logging::init_tracing("sol_agentd", false);
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?;
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }

    daemon::run(&config).await
}
