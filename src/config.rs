use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{AgentError, Result};
use crate::wallet::fee::FeePolicy;

pub const PUBLIC_MAINNET_RPC: &str = "https://api.mainnet-beta.solana.com";

/// Where the chat client sends conversations.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub base_url: String,
    pub path: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001".to_string(),
            path: "/api/claude".to_string(),
        }
    }
}

/// Upstream settings used by the proxy daemon only.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnthropicConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_url: String,
    pub api_version: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "claude-3-haiku-20240307".to_string(),
            api_url: "https://api.anthropic.com/v1/messages".to_string(),
            api_version: "2023-06-01".to_string(),
            max_tokens: 1000,
            temperature: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3001".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ComputeBudgetConfig {
    pub unit_limit: u32,
    pub unit_price_microlamports: u64,
}

impl Default for ComputeBudgetConfig {
    fn default() -> Self {
        Self {
            unit_limit: 200_000,
            unit_price_microlamports: 2_500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SendConfig {
    pub skip_preflight: bool,
    pub preflight_commitment: String,
    pub max_retries: usize,
}

impl Default for SendConfig {
    fn default() -> Self {
        Self {
            skip_preflight: false,
            preflight_commitment: "confirmed".to_string(),
            max_retries: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    pub poll_interval_ms: u64,
    pub max_polls: u32,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            max_polls: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SolanaRpcConfig {
    pub endpoint: String,
    pub commitment: String,
    pub compute_budget: ComputeBudgetConfig,
    pub send: SendConfig,
    pub confirmation: ConfirmationConfig,
}

impl Default for SolanaRpcConfig {
    fn default() -> Self {
        Self {
            endpoint: PUBLIC_MAINNET_RPC.to_string(),
            commitment: "confirmed".to_string(),
            compute_budget: ComputeBudgetConfig::default(),
            send: SendConfig::default(),
            confirmation: ConfirmationConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Solana CLI keypair file (JSON array of 64 bytes).
    pub keypair_path: Option<String>,
    /// Environment variable holding a base58 32-byte seed.
    pub seed_env: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            keypair_path: None,
            seed_env: "SOL_AGENT_WALLET_SEED".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub proxy: ProxyConfig,
    pub anthropic: AnthropicConfig,
    pub server: ServerConfig,
    pub solana: SolanaRpcConfig,
    pub fee: FeePolicy,
    pub wallet: WalletConfig,
    pub slot_refresh_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            proxy: ProxyConfig::default(),
            anthropic: AnthropicConfig::default(),
            server: ServerConfig::default(),
            solana: SolanaRpcConfig::default(),
            fee: FeePolicy::default(),
            wallet: WalletConfig::default(),
            slot_refresh_secs: 30,
        }
    }
}

impl Config {
    pub fn convention_defaults() -> Self {
        Self::default()
    }

    /// Reads the JSON file at `path` (defaults when it does not exist), then
    /// layers process environment overrides and normalizes the result.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_file(path)?
            .apply_env(|key| std::env::var(key).ok())
            .normalize()
    }

    /// File contents only, normalized. Environment secrets never pass
    /// through here, so the result is safe to write back with [`Config::save`].
    pub fn load_file(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let raw = fs::read_to_string(path).map_err(|e| {
                AgentError::Config(format!("failed to read {}: {e}", path.display()))
            })?;
            serde_json::from_str::<Config>(&raw)
                .map_err(|e| AgentError::Config(format!("{}: {e}", path.display())))?
        } else {
            tracing::debug!(path = %path.display(), "config file missing, using defaults");
            Self::convention_defaults()
        };
        config.normalize()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| AgentError::Config(e.to_string()))?;
        }
        let body = serde_json::to_string_pretty(self)
            .map_err(|e| AgentError::Serialization(e.to_string()))?;
        fs::write(path, body).map_err(|e| AgentError::Config(e.to_string()))
    }

    pub fn apply_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(key) = lookup("CLAUDE_API_KEY") {
            self.anthropic.api_key = Some(key);
        }
        if let Some(model) = lookup("CLAUDE_MODEL") {
            self.anthropic.model = model;
        }
        if let Some(url) = lookup("CLAUDE_API_URL") {
            self.anthropic.api_url = url;
        }
        if let Some(version) = lookup("ANTHROPIC_VERSION") {
            self.anthropic.api_version = version;
        }
        if let Some(port) = lookup("PORT") {
            let host = self
                .server
                .bind
                .rsplit_once(':')
                .map(|(host, _)| host.to_string())
                .unwrap_or_else(|| "127.0.0.1".to_string());
            self.server.bind = format!("{host}:{}", port.trim());
        }
        if let Some(helius_key) = lookup("HELIUS_API_KEY") {
            self.solana.endpoint = format!("https://mainnet.helius-rpc.com/?api-key={helius_key}");
        }
        if let Some(endpoint) = lookup("SOLANA_RPC_URL") {
            self.solana.endpoint = endpoint;
        }
        if let Some(base_url) = lookup("SOL_AGENT_PROXY_URL") {
            self.proxy.base_url = base_url;
        }
        self
    }

    pub fn normalize(mut self) -> Result<Self> {
        if self.proxy.base_url.trim().is_empty() {
            return Err(AgentError::Config("proxy.base_url must not be empty".to_string()));
        }
        if !self.proxy.path.starts_with('/') {
            self.proxy.path = format!("/{}", self.proxy.path);
        }
        if self.solana.endpoint.trim().is_empty() {
            return Err(AgentError::Config(
                "solana.endpoint must be configured for Solana RPC".to_string(),
            ));
        }

        self.solana.commitment = normalize_commitment(&self.solana.commitment)?;
        self.solana.send.preflight_commitment =
            normalize_commitment(&self.solana.send.preflight_commitment)?;
        self.solana.compute_budget.unit_limit =
            normalize_unit_limit(self.solana.compute_budget.unit_limit as u64)?;
        self.solana.compute_budget.unit_price_microlamports =
            normalize_unit_price_microlamports(self.solana.compute_budget.unit_price_microlamports)?;
        self.solana.send.max_retries = normalize_max_retries(self.solana.send.max_retries as u64)?;
        if self.solana.confirmation.max_polls == 0 {
            return Err(AgentError::Config(
                "solana.confirmation.max_polls must be greater than zero".to_string(),
            ));
        }

        if !(0.0..100.0).contains(&self.fee.fee_percentage) {
            return Err(AgentError::Config(
                "fee.fee_percentage must be in [0, 100)".to_string(),
            ));
        }
        if self.fee.min_fee_lamports > self.fee.max_fee_lamports {
            return Err(AgentError::Config(
                "fee.min_fee_lamports must not exceed fee.max_fee_lamports".to_string(),
            ));
        }
        if !crate::wallet::address::is_valid_solana_address(&self.fee.fee_collector_address) {
            return Err(AgentError::Config(
                "fee.fee_collector_address is not a valid Solana address".to_string(),
            ));
        }

        self.slot_refresh_secs = self.slot_refresh_secs.max(1);
        Ok(self)
    }
}

fn normalize_commitment(value: &str) -> Result<String> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "processed" | "confirmed" | "finalized" => Ok(normalized),
        _ => Err(AgentError::Config(
            "commitment must be one of processed, confirmed, finalized".to_string(),
        )),
    }
}

fn normalize_unit_limit(value: u64) -> Result<u32> {
    if value == 0 {
        return Err(AgentError::Config(
            "compute_budget.unit_limit must be greater than zero".to_string(),
        ));
    }
    Ok(value.clamp(200_000, 1_400_000) as u32)
}

fn normalize_unit_price_microlamports(value: u64) -> Result<u64> {
    if value == 0 {
        return Err(AgentError::Config(
            "compute_budget.unit_price_microlamports must be greater than zero".to_string(),
        ));
    }
    Ok(value.clamp(1, 1_000_000))
}

fn normalize_max_retries(value: u64) -> Result<usize> {
    if value > 100 {
        return Err(AgentError::Config(
            "send.max_retries must be less than or equal to 100".to_string(),
        ));
    }
    Ok(value as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn convention_defaults_point_at_local_proxy_and_public_rpc() {
        let config = Config::convention_defaults().normalize().unwrap();
        assert_eq!(config.proxy.base_url, "http://localhost:3001");
        assert_eq!(config.proxy.path, "/api/claude");
        assert_eq!(config.solana.endpoint, PUBLIC_MAINNET_RPC);
        assert_eq!(config.solana.commitment, "confirmed");
        assert_eq!(config.slot_refresh_secs, 30);
        assert_eq!(config.fee.fee_percentage, 2.5);
    }

    #[test]
    fn partial_json_keeps_defaults_and_normalizes_overrides() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.json");
        fs::write(
            &path,
            r#"{
                "proxy": {"base_url": "http://127.0.0.1:9000", "path": "chat"},
                "solana": {
                    "commitment": "Finalized",
                    "compute_budget": {"unit_limit": 5000000, "unit_price_microlamports": 9999999}
                }
            }"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.proxy.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.proxy.path, "/chat");
        assert_eq!(config.solana.commitment, "finalized");
        assert_eq!(config.solana.compute_budget.unit_limit, 1_400_000);
        assert_eq!(config.solana.compute_budget.unit_price_microlamports, 1_000_000);
        assert_eq!(config.solana.send.max_retries, 5);
        assert_eq!(config.anthropic.max_tokens, 1000);
    }

    #[test]
    fn rejects_invalid_commitment() {
        let mut config = Config::convention_defaults();
        config.solana.commitment = "recent".to_string();
        let err = config.normalize().unwrap_err();
        assert!(err
            .to_string()
            .contains("commitment must be one of processed, confirmed, finalized"));
    }

    #[test]
    fn rejects_inverted_fee_bounds() {
        let mut config = Config::convention_defaults();
        config.fee.min_fee_lamports = 10;
        config.fee.max_fee_lamports = 1;
        assert!(config.normalize().is_err());
    }

    #[test]
    fn env_overrides_take_precedence() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("CLAUDE_API_KEY", "sk-test"),
            ("CLAUDE_MODEL", "claude-3-5-haiku-latest"),
            ("PORT", "4010"),
            ("HELIUS_API_KEY", "hk"),
            ("SOL_AGENT_PROXY_URL", "http://proxy.local"),
            ("ANTHROPIC_VERSION", "  "),
        ]);
        let config = Config::convention_defaults()
            .apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.anthropic.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.anthropic.model, "claude-3-5-haiku-latest");
        assert_eq!(config.anthropic.api_version, "2023-06-01");
        assert_eq!(config.server.bind, "127.0.0.1:4010");
        assert_eq!(
            config.solana.endpoint,
            "https://mainnet.helius-rpc.com/?api-key=hk"
        );
        assert_eq!(config.proxy.base_url, "http://proxy.local");
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("nested").join("config.json");
        let mut config = Config::convention_defaults();
        config.wallet.keypair_path = Some("/tmp/id.json".to_string());
        config.save(&path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let reloaded: Config = serde_json::from_str(&raw).unwrap();
        assert_eq!(reloaded.wallet.keypair_path.as_deref(), Some("/tmp/id.json"));
    }

    #[test]
    fn saving_file_config_never_persists_env_secrets() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.json");
        std::env::set_var("CLAUDE_API_KEY", "sk-from-env");

        let with_env = Config::load(&path).unwrap();
        Config::load_file(&path).unwrap().save(&path).unwrap();
        std::env::remove_var("CLAUDE_API_KEY");

        assert_eq!(with_env.anthropic.api_key.as_deref(), Some("sk-from-env"));
        let raw = fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("sk-from-env"));
        let reloaded: Config = serde_json::from_str(&raw).unwrap();
        assert_eq!(reloaded.anthropic.api_key, None);
    }
}
