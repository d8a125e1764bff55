use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, anyhow};

use bounty_chain::{Address, SupportedChain};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub backup_path: PathBuf,
    pub chain: SupportedChain,
    pub rpc_url: String,
    pub contract: Address,
    pub io_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source. Unset and empty values take the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let port: u16 = or("BOUNTY_PORT", "3001")
            .parse()
            .context("BOUNTY_PORT must be a port number")?;

        let chain: SupportedChain = or("BOUNTY_CHAIN", SupportedChain::ArbitrumSepolia.name())
            .parse()
            .map_err(|e: String| anyhow!("BOUNTY_CHAIN: {}", e))?;
        let rpc_url = var("BOUNTY_RPC_URL").unwrap_or_else(|| chain.default_rpc_url().to_string());

        let contract: Address = var("BOUNTY_CONTRACT_ADDRESS")
            .context("BOUNTY_CONTRACT_ADDRESS is not set")?
            .trim()
            .parse()
            .map_err(|e| anyhow!("BOUNTY_CONTRACT_ADDRESS is not a 20-byte hex address: {}", e))?;
        if contract.is_zero() {
            return Err(anyhow!("BOUNTY_CONTRACT_ADDRESS must not be the zero address"));
        }

        let timeout_secs: u64 = or("BOUNTY_IO_TIMEOUT_SECS", "10")
            .parse()
            .context("BOUNTY_IO_TIMEOUT_SECS must be a whole number of seconds")?;
        if timeout_secs == 0 {
            return Err(anyhow!("BOUNTY_IO_TIMEOUT_SECS must be at least 1"));
        }

        Ok(Self {
            host: or("BOUNTY_HOST", "0.0.0.0"),
            port,
            db_path: or("BOUNTY_DB_PATH", "bounty.db").into(),
            backup_path: or("BOUNTY_BACKUP_PATH", "bounty-backup.db").into(),
            chain,
            rpc_url,
            contract,
            io_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}
