use anyhow::{anyhow, Context, Result};
use kin_sdk::{Network, ServiceProvider};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const HORIZON_TEST_URL: &str = "https://horizon-testnet.stellar.org";
const HORIZON_MAIN_URL: &str = "https://horizon.stellar.org";

/// Wallet configuration, read from `config.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Network to use (main or test)
    #[serde(default)]
    pub network: Network,
    /// Horizon server; the network's public server when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizon_url: Option<String>,
    /// Test network faucet, called with the public address appended
    #[serde(default = "default_faucet_url")]
    pub faucet_url: String,
    /// Keystore file; `~/.kin-wallet/keystore.json` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keystore_path: Option<PathBuf>,
    /// Kin issuer override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kin_issuer: Option<String>,
}

fn default_faucet_url() -> String {
    "http://kin-faucet.rounds.video/send?public_address=".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: Network::default(),
            horizon_url: None,
            faucet_url: default_faucet_url(),
            keystore_path: None,
            kin_issuer: None,
        }
    }
}

impl Config {
    /// Load config from a file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Load config from a file, falling back to defaults if it is missing
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save config to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// The Horizon server to talk to
    pub fn horizon_url(&self) -> &str {
        match (&self.horizon_url, self.network) {
            (Some(url), _) => url,
            (None, Network::Main) => HORIZON_MAIN_URL,
            (None, Network::Test) => HORIZON_TEST_URL,
        }
    }

    pub fn service_provider(&self) -> ServiceProvider {
        let provider = ServiceProvider::new(self.horizon_url(), self.network);
        match &self.kin_issuer {
            Some(issuer) => provider.with_kin_issuer(issuer.clone()),
            None => provider,
        }
    }

    pub fn keystore_path(&self) -> Result<PathBuf> {
        match &self.keystore_path {
            Some(path) => Ok(path.clone()),
            None => Ok(default_data_dir()?.join("keystore.json")),
        }
    }
}

/// Get the default data directory path
pub fn default_data_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".kin-wallet"))
        .ok_or_else(|| anyhow!("Could not determine home directory"))
}

/// Get the default config file path
pub fn default_config_path() -> Result<PathBuf> {
    Ok(default_data_dir()?.join("config.toml"))
}
