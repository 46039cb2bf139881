use std::{path::PathBuf, str::FromStr, time::Duration};

use anyhow::{anyhow, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub rpc_url: String,
    pub program_id: String,
    pub keypair_path: String,
    /// Overrides the derived vault PDA when set.
    #[serde(default)]
    pub vault: Option<String>,
    pub commitment: String,
    pub confirm_timeout_secs: u64,
    pub poll_interval_ms: u64,
}

impl AppConfig {
    /// Built-in defaults, then `path` if it exists, then `VAULT_*` environment variables.
    pub fn load(path: &str) -> Result<Self> {
        let settings = Config::builder()
            .set_default("rpc_url", "http://localhost:8899")?
            .set_default("keypair_path", "~/.config/solana/id.json")?
            .set_default("commitment", "confirmed")?
            .set_default("confirm_timeout_secs", 30_i64)?
            .set_default("poll_interval_ms", 100_i64)?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("VAULT").try_parsing(true))
            .build()?;
        settings
            .try_deserialize()
            .with_context(|| format!("invalid configuration in {path}"))
    }

    pub fn program_id(&self) -> Result<Pubkey> {
        Pubkey::from_str(&self.program_id)
            .with_context(|| format!("invalid program_id: {:?}", self.program_id))
    }

    pub fn vault(&self) -> Result<Option<Pubkey>> {
        self.vault
            .as_deref()
            .map(|vault| Pubkey::from_str(vault).with_context(|| format!("invalid vault: {vault:?}")))
            .transpose()
    }

    pub fn commitment(&self) -> Result<CommitmentConfig> {
        CommitmentConfig::from_str(&self.commitment)
            .map_err(|_| anyhow!("invalid commitment level: {:?}", self.commitment))
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_secs(self.confirm_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Key file path with a leading `~` expanded from `$HOME`.
    pub fn keypair_path(&self) -> PathBuf {
        match (self.keypair_path.strip_prefix("~/"), std::env::var_os("HOME")) {
            (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
            _ => PathBuf::from(&self.keypair_path),
        }
    }
}
